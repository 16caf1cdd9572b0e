//! ERC-7730 descriptor model
//!
//! Parses the on-disk descriptor shape:
//!
//! ```json
//! {
//!   "context":  { "contract": { "abi": [...], "deployments": [...] } },
//!   "metadata": { "owner": "...", "info": {...}, "constants": {...} },
//!   "messages": { "<function>": { "intent": "...", "fields": [...] } },
//!   "display":  { "formats": {...}, "definitions": {...} }
//! }
//! ```
//!
//! Every map keeps document order, since legacy lookups take the first match.

use alloy_json_abi::JsonAbi;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::loader::DescriptorError;

/// Root ERC-7730 document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    pub context: Option<Context>,
    pub metadata: Option<Metadata>,
    /// Function name to message definition
    pub messages: IndexMap<String, Message>,
    pub display: Display,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub contract: ContractContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractContext {
    pub abi: JsonAbi,
    pub deployments: Vec<Deployment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// CAIP-2 style chain id, e.g. `eip155:1`
    pub chain_id: String,
    pub address: String,
}

/// Free-form provenance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub owner: Option<String>,
    pub info: Option<MetadataInfo>,
    pub constants: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetadataInfo {
    pub legal_name: Option<String>,
    pub last_update: Option<String>,
    pub url: Option<String>,
}

/// Legacy `display` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Display {
    /// Function signatures or shared format names
    pub formats: IndexMap<String, FormatEntry>,
    /// Nested-field definitions referenced by `Field::nested`
    pub definitions: IndexMap<String, NestedDefinition>,
}

/// What a function call means and which fields to show
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// One displayed value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Dot-separated path into the decoded arguments
    pub path: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<FieldParams>,
    /// Name of a `display.definitions` entry to expand this field's value with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<String>,
}

/// Extra per-field formatting parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldParams {
    /// Path to the token address an amount is denominated in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Shared, named formatting rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDefinition {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedDefinition {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A `display.formats` entry: either a legacy function-level message or a
/// shared format definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormatEntry {
    Message(Message),
    Definition(FormatDefinition),
}

impl FormatEntry {
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            FormatEntry::Message(m) => Some(m),
            FormatEntry::Definition(_) => None,
        }
    }

    pub fn as_definition(&self) -> Option<&FormatDefinition> {
        match self {
            FormatEntry::Definition(d) => Some(d),
            FormatEntry::Message(_) => None,
        }
    }
}

// `fields` marks a message, `type` marks a definition; anything else is rejected.
impl<'de> Deserialize<'de> for FormatEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let Some(object) = raw.as_object() else {
            return Err(D::Error::custom("format entry must be an object"));
        };

        if object.contains_key("fields") {
            serde_json::from_value(raw)
                .map(FormatEntry::Message)
                .map_err(D::Error::custom)
        } else if object.contains_key("type") {
            serde_json::from_value(raw)
                .map(FormatEntry::Definition)
                .map_err(D::Error::custom)
        } else {
            Err(D::Error::custom(
                "format entry has neither `fields` nor `type`",
            ))
        }
    }
}

impl Descriptor {
    /// Parses a descriptor from JSON text
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        serde_json::from_str(json).map_err(DescriptorError::Parse)
    }

    /// Contract ABI from `context.contract.abi`, empty if absent
    pub fn abi(&self) -> JsonAbi {
        self.context
            .as_ref()
            .map(|c| c.contract.abi.clone())
            .unwrap_or_default()
    }

    /// Finds the message describing `function_name`
    ///
    /// Checks `messages` by exact name first, then the first legacy
    /// `display.formats` key that starts with or contains the name
    /// (e.g. `swap(tuple)` for `swap`).
    pub fn find_message(&self, function_name: &str) -> Option<&Message> {
        if let Some(message) = self.messages.get(function_name) {
            return Some(message);
        }
        if function_name.is_empty() {
            return None;
        }

        let found = self.display.formats.iter().find_map(|(key, entry)| {
            let message = entry.as_message()?;
            (key.starts_with(function_name) || key.contains(function_name))
                .then_some((key, message))
        });

        match found {
            Some((key, message)) => {
                debug!(function = function_name, key = %key, "matched legacy format entry");
                Some(message)
            }
            None => None,
        }
    }

    /// Named format definition, if `name` refers to one
    pub fn format_definition(&self, name: &str) -> Option<&FormatDefinition> {
        self.display.formats.get(name)?.as_definition()
    }

    /// Nested-field definition by name
    pub fn definition(&self, name: &str) -> Option<&NestedDefinition> {
        self.display.definitions.get(name)
    }
}

impl std::str::FromStr for Descriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}
