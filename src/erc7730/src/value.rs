//! Decoded call-argument tree
//!
//! Calldata decoded against a contract ABI is turned into an [`ArgValue`] tree:
//! scalars at the leaves, arrays for positional sequences and records for
//! named structs. The formatter and the path resolver only ever read this
//! tree, they never see raw ABI types.

use std::fmt;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Param;
use alloy_primitives::{Address, Bytes, I256, U256};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A single decoded argument or a nested part of one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Explicit null (present but empty)
    Null,
    Bool(bool),
    /// Small unsigned integer (ABI width of 64 bits or less)
    Number(u64),
    /// Wide unsigned integer, usually a token amount
    BigInt(U256),
    Int(I256),
    /// Text, including addresses rendered as checksummed `0x` strings
    String(String),
    Bytes(Bytes),
    Array(Vec<ArgValue>),
    /// Named struct fields in declaration order
    Record(IndexMap<String, ArgValue>),
}

impl ArgValue {
    /// Builds a record from `(name, value)` pairs, keeping their order
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ArgValue)>,
    {
        ArgValue::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts an ABI-decoded value, using `param` to name tuple components
    pub fn from_dyn(value: &DynSolValue, param: Option<&Param>) -> Self {
        match value {
            DynSolValue::Bool(b) => ArgValue::Bool(*b),
            DynSolValue::Address(addr) => ArgValue::String(addr.to_checksum(None)),
            DynSolValue::Uint(u, bits) if *bits <= 64 => u64::try_from(*u)
                .map(ArgValue::Number)
                .unwrap_or(ArgValue::BigInt(*u)),
            DynSolValue::Uint(u, _) => ArgValue::BigInt(*u),
            DynSolValue::Int(i, _) => ArgValue::Int(*i),
            DynSolValue::String(s) => ArgValue::String(s.clone()),
            DynSolValue::Bytes(b) => ArgValue::Bytes(Bytes::copy_from_slice(b)),
            DynSolValue::FixedBytes(word, size) => {
                ArgValue::Bytes(Bytes::copy_from_slice(&word[..(*size).min(32)]))
            }
            DynSolValue::Function(f) => ArgValue::Bytes(Bytes::copy_from_slice(f.as_slice())),
            // Array elements share the element type, so they share the components too.
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
                ArgValue::Array(items.iter().map(|v| ArgValue::from_dyn(v, param)).collect())
            }
            DynSolValue::Tuple(items) => {
                let components = param.map(|p| p.components.as_slice()).unwrap_or_default();
                let named = components.len() == items.len()
                    && components.iter().all(|c| !c.name.is_empty());
                if named {
                    ArgValue::Record(
                        components
                            .iter()
                            .zip(items)
                            .map(|(c, v)| (c.name.clone(), ArgValue::from_dyn(v, Some(c))))
                            .collect(),
                    )
                } else {
                    ArgValue::Array(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, v)| ArgValue::from_dyn(v, components.get(i)))
                            .collect(),
                    )
                }
            }
            #[allow(unreachable_patterns)]
            _ => ArgValue::Null,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => write!(f, "null"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Number(n) => write!(f, "{n}"),
            ArgValue::BigInt(u) => write!(f, "{u}"),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::String(s) => write!(f, "{s}"),
            ArgValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            ArgValue::Array(items) => write_joined(f, items.iter()),
            ArgValue::Record(fields) => write_joined(f, fields.values()),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a ArgValue>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// Integers wider than JSON numbers are written as decimal strings.
impl Serialize for ArgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ArgValue::Null => serializer.serialize_none(),
            ArgValue::Bool(b) => serializer.serialize_bool(*b),
            ArgValue::Number(n) => serializer.serialize_u64(*n),
            ArgValue::BigInt(u) => serializer.serialize_str(&u.to_string()),
            ArgValue::Int(i) => serializer.serialize_str(&i.to_string()),
            ArgValue::String(s) => serializer.serialize_str(s),
            ArgValue::Bytes(b) => serializer.serialize_str(&format!("0x{}", hex::encode(b))),
            ArgValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ArgValue::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl From<u64> for ArgValue {
    fn from(n: u64) -> Self {
        ArgValue::Number(n)
    }
}

impl From<U256> for ArgValue {
    fn from(u: U256) -> Self {
        ArgValue::BigInt(u)
    }
}

impl From<Address> for ArgValue {
    fn from(addr: Address) -> Self {
        ArgValue::String(addr.to_checksum(None))
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<Vec<ArgValue>> for ArgValue {
    fn from(items: Vec<ArgValue>) -> Self {
        ArgValue::Array(items)
    }
}
