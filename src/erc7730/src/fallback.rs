//! Fallback formatter for calls the descriptor does not cover
//!
//! Without a descriptor rule there is no declared format for any argument,
//! so each value's kind is guessed from its shape: address-looking strings,
//! wide integers as token amounts and small integers in a plausible Unix
//! timestamp range as dates. The result is a degraded but readable preview.

use alloy_json_abi::Function;
use alloy_primitives::U256;

use crate::format::{
    FormatHints, FormatKind, NOT_AVAILABLE, ValueFormatter, as_unsigned, format_address,
    format_amount, parse_address,
};
use crate::formatter::FormattedField;
use crate::value::ArgValue;

/// Integers strictly inside this range are taken to be Unix timestamps
/// (roughly September 2020 to May 2033)
const TIMESTAMP_RANGE: (u64, u64) = (1_600_000_000, 2_000_000_000);

/// Shape-based formatter used when no descriptor message matches
#[derive(Debug, Clone, Default)]
pub struct HeuristicFormatter {
    values: ValueFormatter,
}

impl HeuristicFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: ValueFormatter) -> Self {
        Self { values }
    }

    /// Formats every argument as one field
    ///
    /// A single struct argument is flattened into one field per member;
    /// otherwise each positional argument becomes a field labelled from the
    /// ABI parameter name (or `Param N`).
    pub fn format_arguments(
        &self,
        args: &[ArgValue],
        function: Option<&Function>,
    ) -> Vec<FormattedField> {
        if let [ArgValue::Record(members)] = args {
            return members
                .iter()
                .map(|(name, value)| self.field(humanize(name), value))
                .collect();
        }

        args.iter()
            .enumerate()
            .map(|(index, value)| {
                let label = function
                    .and_then(|f| f.inputs.get(index))
                    .map(|input| input.name.as_str())
                    .filter(|name| !name.is_empty())
                    .map(capitalize)
                    .unwrap_or_else(|| format!("Param {index}"));
                self.field(label, value)
            })
            .collect()
    }

    fn field(&self, label: String, value: &ArgValue) -> FormattedField {
        FormattedField {
            label,
            value: self.infer(value),
            raw_value: Some(value.clone()),
            format: None,
        }
    }

    /// Renders a value by its shape alone
    pub fn infer(&self, value: &ArgValue) -> String {
        match value {
            ArgValue::Null => NOT_AVAILABLE.to_string(),
            ArgValue::String(s) if parse_address(s).is_some() => format_address(value, None),
            ArgValue::Number(_) | ArgValue::BigInt(_) if looks_like_timestamp(value) => {
                self.values.format(Some(value), Some(&FormatKind::Date), FormatHints::default())
            }
            ArgValue::BigInt(_) => format_amount(value, None),
            _ => value.to_string(),
        }
    }
}

/// Integer strictly inside [`TIMESTAMP_RANGE`], whatever its ABI width
fn looks_like_timestamp(value: &ArgValue) -> bool {
    let (low, high) = TIMESTAMP_RANGE;
    as_unsigned(value).is_some_and(|n| n > U256::from(low) && n < U256::from(high))
}

/// Free-function form of [`HeuristicFormatter::format_arguments`]
pub fn format_arguments_heuristically(
    args: &[ArgValue],
    function: Option<&Function>,
) -> Vec<FormattedField> {
    HeuristicFormatter::new().format_arguments(args, function)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `minAmountOut` -> `Min Amount Out`
fn humanize(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else {
            if c.is_ascii_uppercase() {
                label.push(' ');
            }
            label.push(c);
        }
    }
    label
}
