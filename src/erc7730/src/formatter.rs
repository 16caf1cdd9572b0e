//! Descriptor-driven transaction formatting
//!
//! Looks up the descriptor message for a decoded function, resolves each of
//! its fields against the decoded arguments and renders them for display.
//! When the descriptor has no rule for the function the heuristic fallback in
//! [`crate::fallback`] takes over.

use std::sync::Arc;

use alloy_json_abi::Function;
use serde::Serialize;
use tracing::debug;

use crate::calldata::DecodedCall;
use crate::descriptor::{Descriptor, Field};
use crate::fallback::HeuristicFormatter;
use crate::format::{Clock, FormatHints, FormatKind, ValueFormatter, parse_address};
use crate::path::Node;
use crate::registry::KnownTokens;
use crate::value::ArgValue;

/// One rendered field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedField {
    pub label: String,
    /// Final display string
    pub value: String,
    /// Source value; `None` when the field's path did not resolve
    pub raw_value: Option<ArgValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Human-readable rendering of one function call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTransaction {
    pub intent: String,
    pub function_name: String,
    pub fields: Vec<FormattedField>,
}

/// Formats decoded calls with an ERC-7730 descriptor
#[derive(Debug, Clone)]
pub struct Erc7730Formatter {
    descriptor: Arc<Descriptor>,
    values: ValueFormatter,
}

impl Erc7730Formatter {
    pub fn new(descriptor: Arc<Descriptor>) -> Self {
        Self {
            descriptor,
            values: ValueFormatter::new(),
        }
    }

    /// Uses `clock` as "now" for relative dates
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.values = ValueFormatter::with_clock(clock);
        self
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Formats a call using the descriptor's rules
    ///
    /// Returns `None` when the descriptor has no message for `function_name`;
    /// that is not an error, callers fall back to heuristics.
    pub fn format_transaction(
        &self,
        function_name: &str,
        args: &[ArgValue],
    ) -> Option<FormattedTransaction> {
        self.format_from(function_name, Node::Sequence(args))
    }

    /// Like [`Self::format_transaction`], with top-level paths also matching
    /// the names of `function`'s inputs
    pub fn format_function(
        &self,
        function: &Function,
        args: &[ArgValue],
    ) -> Option<FormattedTransaction> {
        let root = Node::Arguments {
            values: args,
            params: &function.inputs,
        };
        self.format_from(&function.name, root)
    }

    fn format_from(&self, function_name: &str, root: Node<'_>) -> Option<FormattedTransaction> {
        let message = self.descriptor.find_message(function_name)?;

        let mut fields = Vec::with_capacity(message.fields.len());
        for field in &message.fields {
            let value = root.resolve(&field.path);

            let nested = field
                .nested
                .as_deref()
                .and_then(|name| self.descriptor.definition(name));
            match nested {
                Some(definition) => {
                    // Sub-field paths are relative to this field's own value.
                    for sub_field in &definition.fields {
                        let scope = value.map(Node::Value);
                        let sub_value = scope.and_then(|s| s.resolve(&sub_field.path));
                        fields.push(self.format_field(sub_field, sub_value, scope));
                    }
                }
                None => {
                    if let Some(name) = &field.nested {
                        debug!(nested = %name, label = %field.label, "nested definition not found");
                    }
                    fields.push(self.format_field(field, value, Some(root)));
                }
            }
        }

        Some(FormattedTransaction {
            intent: message.intent.clone(),
            function_name: function_name.to_string(),
            fields,
        })
    }

    /// Formats a call, falling back to heuristics when no descriptor rule matches
    ///
    /// `function` supplies ABI parameter names for positional labels.
    pub fn format_or_fallback(
        &self,
        function_name: &str,
        args: &[ArgValue],
        function: Option<&Function>,
    ) -> FormattedTransaction {
        let described = match function {
            Some(function) if function.name == function_name => {
                self.format_function(function, args)
            }
            _ => self.format_transaction(function_name, args),
        };
        if let Some(formatted) = described {
            return formatted;
        }
        debug!(function = function_name, "no descriptor rule, using heuristic formatting");

        let heuristic = HeuristicFormatter::with_values(self.values.clone());
        FormattedTransaction {
            intent: format!("Execute {function_name}"),
            function_name: function_name.to_string(),
            fields: heuristic.format_arguments(args, function),
        }
    }

    /// Formats decoded calldata
    pub fn format_call(&self, call: &DecodedCall) -> FormattedTransaction {
        self.format_or_fallback(call.name(), &call.args, Some(&call.function))
    }

    fn format_field(
        &self,
        field: &Field,
        value: Option<&ArgValue>,
        scope: Option<Node<'_>>,
    ) -> FormattedField {
        FormattedField {
            label: field.label.clone(),
            value: self.render(field, value, scope),
            raw_value: value.cloned(),
            format: field.format.clone(),
        }
    }

    fn render(&self, field: &Field, value: Option<&ArgValue>, scope: Option<Node<'_>>) -> String {
        let Some(format) = field.format.as_deref() else {
            return self.values.format(value, None, FormatHints::default());
        };

        // A definition whose type is not understood defers to the format name.
        let definition = self
            .descriptor
            .format_definition(format)
            .and_then(|def| Some((def, FormatKind::from_definition_type(&def.ty)?)));
        let kind = match definition {
            Some((_, kind)) => kind,
            None => FormatKind::from_synonym(format),
        };

        let decimals = match kind {
            FormatKind::Amount => token_decimals(field, scope),
            _ => None,
        };
        let hints = FormatHints {
            prefix: definition.and_then(|(d, _)| d.prefix.as_deref()),
            decimals,
        };
        self.values.format(value, Some(&kind), hints)
    }
}

/// Decimals of the known token named by the field's `params.tokenPath`
fn token_decimals(field: &Field, scope: Option<Node<'_>>) -> Option<u8> {
    let token_path = field.params.as_ref()?.token_path.as_deref()?;
    let token = scope?.resolve(token_path)?.as_str()?;
    KnownTokens::decimals(&parse_address(token)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FixedClock;
    use alloy_primitives::U256;

    const NOW: i64 = 1_760_000_000;

    const DESCRIPTOR: &str = r#"{
        "messages": {
            "swapExactTokensForTokens": {
                "intent": "Swap tokens",
                "fields": [
                    {"path": "params.tokenIn", "label": "Token In", "format": "address"},
                    {"path": "params.amountIn", "label": "Amount In", "format": "amount"},
                    {"path": "params.deadline", "label": "Deadline", "format": "timestamp"},
                    {"path": "params.memo", "label": "Memo"},
                    {"path": "params.missing", "label": "Missing", "format": "amount"}
                ]
            },
            "batch": {
                "intent": "Batch",
                "fields": [
                    {"path": "params.leg", "label": "Leg", "nested": "leg"},
                    {"path": "params.other", "label": "Other", "nested": "undefinedDef"}
                ]
            },
            "simpleTransfer": {
                "intent": "Transfer tokens",
                "fields": [
                    {"path": "token", "label": "Token", "format": "addressName"},
                    {"path": "recipient", "label": "To", "format": "addressName"},
                    {"path": "amount", "label": "Amount", "format": "tokenAmount", "params": {"tokenPath": "token"}}
                ]
            },
            "send": {
                "intent": "Send",
                "fields": [
                    {"path": "0", "label": "To", "format": "recipientAddress"},
                    {"path": "1", "label": "Note", "format": "opaque"}
                ]
            },
            "pay": {
                "intent": "Pay",
                "fields": [
                    {"path": "0", "label": "To", "format": "payee"},
                    {"path": "1", "label": "Amount", "format": "usd"},
                    {"path": "2", "label": "Weth", "format": "tokenAmount", "params": {"tokenPath": "3"}}
                ]
            }
        },
        "display": {
            "formats": {
                "payee": {"type": "address", "prefix": "to "},
                "usd": {"type": "amount", "denomination": "USD"},
                "recipientAddress": {"type": "enum", "prefix": "to "},
                "opaque": {"type": "enum"},
                "legacyTransfer(address,uint256)": {
                    "intent": "Legacy transfer",
                    "fields": [{"path": "1", "label": "Amount", "format": "tokenAmount"}]
                }
            },
            "definitions": {
                "leg": {"fields": [
                    {"path": "a", "label": "A"},
                    {"path": "b", "label": "B", "format": "amount"}
                ]}
            }
        }
    }"#;

    fn formatter() -> Erc7730Formatter {
        let descriptor = Descriptor::from_json(DESCRIPTOR).unwrap();
        Erc7730Formatter::new(Arc::new(descriptor))
            .with_clock(Arc::new(FixedClock::at_unix(NOW)))
    }

    fn swap_args() -> Vec<ArgValue> {
        vec![ArgValue::record([
            ("tokenIn", ArgValue::from("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
            ("amountIn", ArgValue::BigInt(U256::from(1_000_000_000u64))),
            ("deadline", ArgValue::Number((NOW + 1800) as u64)),
            ("memo", ArgValue::from("gm")),
        ])]
    }

    #[test]
    fn formats_fields_in_message_order() {
        let tx = formatter()
            .format_transaction("swapExactTokensForTokens", &swap_args())
            .unwrap();

        assert_eq!(tx.intent, "Swap tokens");
        assert_eq!(tx.function_name, "swapExactTokensForTokens");
        let rendered: Vec<(&str, &str)> = tx
            .fields
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("Token In", "USDC Token"),
                ("Amount In", "1.00K"),
                ("Deadline", "in 30 minutes"),
                ("Memo", "gm"),
                ("Missing", "N/A"),
            ]
        );
    }

    #[test]
    fn raw_values_are_preserved() {
        let tx = formatter()
            .format_transaction("swapExactTokensForTokens", &swap_args())
            .unwrap();
        assert_eq!(
            tx.fields[1].raw_value,
            Some(ArgValue::BigInt(U256::from(1_000_000_000u64)))
        );
        assert_eq!(tx.fields[1].format.as_deref(), Some("amount"));
        assert_eq!(tx.fields[4].raw_value, None);
    }

    #[test]
    fn unknown_function_returns_none() {
        assert!(formatter().format_transaction("burn", &[]).is_none());
    }

    #[test]
    fn nested_definition_expands_into_sub_fields() {
        let args = vec![ArgValue::record([(
            "leg",
            ArgValue::record([("a", ArgValue::from(1u64)), ("b", ArgValue::from(2u64))]),
        )])];
        let tx = formatter().format_transaction("batch", &args).unwrap();

        // two sub-fields from `leg`, then `Other` rendered directly
        assert_eq!(tx.fields.len(), 3);
        assert_eq!(tx.fields[0].label, "A");
        assert_eq!(tx.fields[0].value, "1");
        assert_eq!(tx.fields[1].label, "B");
        assert_eq!(tx.fields[1].raw_value, Some(ArgValue::Number(2)));
        assert_eq!(tx.fields[2].label, "Other");
        assert_eq!(tx.fields[2].value, "N/A");
    }

    #[test]
    fn nested_fields_of_missing_parent_are_not_available() {
        let tx = formatter().format_transaction("batch", &[ArgValue::record([("x", ArgValue::Null)])]).unwrap();
        assert_eq!(tx.fields[0].value, "N/A");
        assert_eq!(tx.fields[1].value, "N/A");
    }

    #[test]
    fn named_definitions_take_precedence() {
        let args = vec![
            ArgValue::from("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
            ArgValue::BigInt(U256::from(5_000_000u64)),
            ArgValue::BigInt(U256::from(500_000_000_000u64)),
            ArgValue::from("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        ];
        let tx = formatter().format_transaction("pay", &args).unwrap();
        assert_eq!(tx.fields[0].value, "to 0xd8dA...6045");
        assert_eq!(tx.fields[1].value, "5");
        // WETH decimals come from the token table; magnitude alone would say "500.00K"
        assert_eq!(tx.fields[2].value, "5.00e-7");
    }

    fn simple_transfer_fn() -> Function {
        serde_json::from_str(
            r#"{
                "type": "function",
                "name": "simpleTransfer",
                "inputs": [
                    {"name": "token", "type": "address"},
                    {"name": "recipient", "type": "address"},
                    {"name": "amount", "type": "uint256"}
                ],
                "outputs": [],
                "stateMutability": "nonpayable"
            }"#,
        )
        .unwrap()
    }

    fn transfer_args() -> Vec<ArgValue> {
        vec![
            ArgValue::from("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            ArgValue::from("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
            ArgValue::BigInt(U256::from(500_000_000_000u64)),
        ]
    }

    #[test]
    fn flat_arguments_resolve_by_input_name() {
        let function = simple_transfer_fn();
        let tx = formatter()
            .format_function(&function, &transfer_args())
            .unwrap();
        let rendered: Vec<(&str, &str)> = tx
            .fields
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect();
        // tokenPath "token" is also a name, so WETH decimals apply
        assert_eq!(
            rendered,
            vec![
                ("Token", "WETH Token"),
                ("To", "0xd8dA...6045"),
                ("Amount", "5.00e-7"),
            ]
        );

        let via_fallback_entry = formatter().format_or_fallback(
            "simpleTransfer",
            &transfer_args(),
            Some(&function),
        );
        assert_eq!(via_fallback_entry, tx);
    }

    #[test]
    fn flat_argument_names_need_the_abi() {
        let tx = formatter()
            .format_transaction("simpleTransfer", &transfer_args())
            .unwrap();
        assert!(tx.fields.iter().all(|f| f.value == "N/A"));
    }

    #[test]
    fn unrecognized_definition_type_uses_format_name() {
        let args = vec![
            ArgValue::from("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
            ArgValue::from(42u64),
        ];
        let tx = formatter().format_transaction("send", &args).unwrap();
        // `recipientAddress` is an address synonym; the definition's prefix is not applied
        assert_eq!(tx.fields[0].value, "0xd8dA...6045");
        assert_eq!(tx.fields[1].value, "42");
    }

    #[test]
    fn legacy_formats_are_found_by_signature_prefix() {
        let args = vec![
            ArgValue::from("0x0000000000000000000000000000000000000001"),
            ArgValue::BigInt(U256::from(250_000_000u64)),
        ];
        let tx = formatter().format_transaction("legacyTransfer", &args).unwrap();
        assert_eq!(tx.intent, "Legacy transfer");
        assert_eq!(tx.fields[0].value, "250");
    }

    #[test]
    fn fallback_used_when_no_rule() {
        let args = vec![ArgValue::from("0x6B175474E89094C44Da98b954EedeAC495271d0F")];
        let tx = formatter().format_or_fallback("burn", &args, None);
        assert_eq!(tx.intent, "Execute burn");
        assert_eq!(tx.fields[0].label, "Param 0");
        assert_eq!(tx.fields[0].value, "DAI Token");
    }

    #[test]
    fn serializes_camel_case() {
        let tx = formatter()
            .format_transaction("swapExactTokensForTokens", &swap_args())
            .unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["functionName"], "swapExactTokensForTokens");
        assert_eq!(json["fields"][1]["rawValue"], "1000000000");
        assert_eq!(json["fields"][4]["rawValue"], serde_json::Value::Null);
        assert!(json["fields"][3].get("format").is_none());
    }
}
