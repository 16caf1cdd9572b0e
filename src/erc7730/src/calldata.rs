//! ABI-based calldata decoder
//!
//! Decodes raw call input against the descriptor's contract ABI into the
//! function being called and its arguments as an [`ArgValue`] tree.

use std::sync::Arc;

use alloy_dyn_abi::JsonAbiExt;
use alloy_json_abi::{Function, JsonAbi};

use crate::descriptor::Descriptor;
use crate::value::ArgValue;

/// Length of a `0x`-prefixed 32-byte hash
const TX_HASH_HEX_LEN: usize = 66;

#[derive(Debug, thiserror::Error)]
pub enum CalldataError {
    #[error(
        "This looks like a transaction hash. Provide the transaction calldata/input data instead"
    )]
    LooksLikeTransactionHash,
    #[error("Calldata is too short. It should include at least the function selector (4 bytes)")]
    TooShort,
    #[error("Invalid hex in calldata: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Function selector 0x{0} not found in ABI")]
    UnknownSelector(String),
    #[error("Failed to decode input: {0}")]
    Decode(String),
}

/// A function call decoded from calldata
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCall {
    pub function: Function,
    pub args: Vec<ArgValue>,
}

impl DecodedCall {
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        self.function.signature()
    }
}

/// Decodes calldata using a JSON ABI
#[derive(Debug, Clone)]
pub struct CalldataDecoder {
    abi: Arc<JsonAbi>,
}

impl CalldataDecoder {
    pub fn new(abi: Arc<JsonAbi>) -> Self {
        Self { abi }
    }

    /// Decoder over the descriptor's `context.contract.abi`
    pub fn from_descriptor(descriptor: &Descriptor) -> Self {
        Self::new(Arc::new(descriptor.abi()))
    }

    fn find_function_by_selector(&self, selector: &[u8]) -> Option<&Function> {
        self.abi
            .functions()
            .find(|f| f.selector().as_slice() == selector)
    }

    /// Decodes hex calldata, with or without a `0x` prefix
    pub fn decode_hex(&self, calldata: &str) -> Result<DecodedCall, CalldataError> {
        let trimmed = calldata.trim();
        let normalized = if trimmed.starts_with("0x") {
            trimmed.to_string()
        } else {
            format!("0x{trimmed}")
        };

        if normalized.len() == TX_HASH_HEX_LEN {
            return Err(CalldataError::LooksLikeTransactionHash);
        }
        // 0x plus the 4-byte selector
        if normalized.len() < 10 {
            return Err(CalldataError::TooShort);
        }

        let bytes = hex::decode(&normalized[2..])?;
        self.decode(&bytes)
    }

    /// Decodes calldata including its 4-byte selector
    pub fn decode(&self, calldata: &[u8]) -> Result<DecodedCall, CalldataError> {
        if calldata.len() < 4 {
            return Err(CalldataError::TooShort);
        }

        let (selector, input) = calldata.split_at(4);
        let function = self
            .find_function_by_selector(selector)
            .ok_or_else(|| CalldataError::UnknownSelector(hex::encode(selector)))?;

        let decoded = function
            .abi_decode_input(input)
            .map_err(|e| CalldataError::Decode(e.to_string()))?;

        let args = function
            .inputs
            .iter()
            .zip(&decoded)
            .map(|(param, value)| ArgValue::from_dyn(value, Some(param)))
            .collect();

        Ok(DecodedCall {
            function: function.clone(),
            args,
        })
    }
}
