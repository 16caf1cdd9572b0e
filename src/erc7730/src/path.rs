//! Dotted-path navigation over decoded call arguments
//!
//! A descriptor field path such as `params.tokenIn` or `0.path.1` is split on
//! `.` and walked segment by segment. `params` on the argument sequence means
//! "the first positional argument", all-digit segments index sequences and
//! anything else looks a field up by name. When the ABI parameters are known
//! the top-level arguments can be named too (`recipient`). A path that cannot
//! be followed yields `None`.

use alloy_json_abi::Param;

use crate::value::ArgValue;

const FIRST_ARGUMENT: &str = "params";

/// Position reached while walking a path
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// The top-level argument list
    Sequence(&'a [ArgValue]),
    /// The top-level argument list alongside the ABI inputs that name it
    Arguments {
        values: &'a [ArgValue],
        params: &'a [Param],
    },
    Value(&'a ArgValue),
}

impl<'a> Node<'a> {
    /// Follows `path` from this node
    pub fn resolve(self, path: &str) -> Option<&'a ArgValue> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.step(segment)?;
        }
        match current {
            Node::Value(value) => Some(value),
            Node::Sequence(_) | Node::Arguments { .. } => None,
        }
    }

    fn step(self, segment: &str) -> Option<Node<'a>> {
        let unnamed: &[Param] = &[];
        let (items, params) = match self {
            Node::Sequence(items) => (items, unnamed),
            Node::Arguments { values, params } => (values, params),
            Node::Value(ArgValue::Array(items)) => (items.as_slice(), unnamed),
            Node::Value(ArgValue::Record(fields)) => {
                return fields
                    .get(segment)
                    .or_else(|| index(segment).and_then(|i| fields.get_index(i).map(|(_, v)| v)))
                    .map(Node::Value);
            }
            Node::Value(_) => return None,
        };

        if segment == FIRST_ARGUMENT && !items.is_empty() {
            return items.first().map(Node::Value);
        }
        index(segment)
            .or_else(|| {
                params
                    .iter()
                    .position(|p| !p.name.is_empty() && p.name == segment)
            })
            .and_then(|i| items.get(i))
            .map(Node::Value)
    }
}

fn index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Resolves `path` against the full decoded argument list
pub fn resolve<'a>(args: &'a [ArgValue], path: &str) -> Option<&'a ArgValue> {
    Node::Sequence(args).resolve(path)
}

/// Like [`resolve`], but top-level segments may also name an ABI input
pub fn resolve_arguments<'a>(
    args: &'a [ArgValue],
    params: &'a [Param],
    path: &str,
) -> Option<&'a ArgValue> {
    Node::Arguments {
        values: args,
        params,
    }
    .resolve(path)
}

/// Resolves `path` relative to an already-resolved value
pub fn resolve_in<'a>(value: &'a ArgValue, path: &str) -> Option<&'a ArgValue> {
    Node::Value(value).resolve(path)
}
