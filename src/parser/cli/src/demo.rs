//! Example calls against the demo router, for trying the formatter without a wallet

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_primitives::{Address, U256, address};
use anyhow::{Context, Result, bail};
use clearsign_erc7730::Descriptor;
use std::str::FromStr;

const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
const USDT: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
const RECIPIENT: Address = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

/// Seconds until the example deadline
const DEADLINE_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoCall {
    Swap,
    AddLiquidity,
    Transfer,
}

impl DemoCall {
    pub const NAMES: [&'static str; 3] = ["swap", "addLiquidity", "transfer"];

    fn function_name(self) -> &'static str {
        match self {
            DemoCall::Swap => "swapExactTokensForTokens",
            DemoCall::AddLiquidity => "addLiquidity",
            DemoCall::Transfer => "simpleTransfer",
        }
    }

    fn arguments(self, deadline: u64) -> Vec<DynSolValue> {
        let token = |a: Address| DynSolValue::Address(a);
        let units = |whole: u64, decimals: u8| {
            DynSolValue::Uint(U256::from(whole) * U256::from(10u64).pow(U256::from(decimals)), 256)
        };
        let deadline = DynSolValue::Uint(U256::from(deadline), 256);

        match self {
            DemoCall::Swap => vec![DynSolValue::Tuple(vec![
                token(USDC),
                token(USDT),
                units(1000, 6),
                units(990, 6),
                token(RECIPIENT),
                deadline,
            ])],
            DemoCall::AddLiquidity => vec![DynSolValue::Tuple(vec![
                token(USDC),
                token(DAI),
                units(5000, 6),
                units(5000, 18),
                token(RECIPIENT),
                deadline,
            ])],
            DemoCall::Transfer => vec![token(USDC), token(RECIPIENT), units(100, 6)],
        }
    }

    /// `0x`-prefixed calldata encoded with the descriptor's ABI
    pub fn encode(self, descriptor: &Descriptor, now: u64) -> Result<String> {
        let abi = descriptor.abi();
        let function = abi
            .function(self.function_name())
            .and_then(|overloads| overloads.first())
            .with_context(|| format!("Descriptor ABI has no function {}", self.function_name()))?;

        let calldata = function
            .abi_encode_input(&self.arguments(now + DEADLINE_SECS))
            .with_context(|| format!("Failed to encode {}", self.function_name()))?;
        Ok(format!("0x{}", hex::encode(calldata)))
    }
}

impl FromStr for DemoCall {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "swap" => Ok(DemoCall::Swap),
            "addLiquidity" => Ok(DemoCall::AddLiquidity),
            "transfer" => Ok(DemoCall::Transfer),
            other => bail!("Unknown example type '{other}'"),
        }
    }
}
