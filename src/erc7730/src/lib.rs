//! ERC-7730 clear-signing formatter
//!
//! Turns decoded EVM calldata into human-readable fields using an ERC-7730
//! descriptor, with a shape-based fallback for functions the descriptor does
//! not cover.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clearsign_erc7730::{CalldataDecoder, DescriptorCache, Erc7730Formatter};
//!
//! let cache = DescriptorCache::well_known();
//! let descriptor = cache.load().await?;
//! let call = CalldataDecoder::from_descriptor(&descriptor).decode_hex(calldata)?;
//! let preview = Erc7730Formatter::new(descriptor).format_call(&call);
//! ```

pub mod calldata;
pub mod descriptor;
pub mod fallback;
pub mod format;
pub mod formatter;
pub mod loader;
pub mod path;
pub mod registry;
pub mod review;
pub mod value;

pub use calldata::{CalldataDecoder, CalldataError, DecodedCall};
pub use descriptor::{
    Descriptor, Field, FieldParams, FormatDefinition, FormatEntry, Message, NestedDefinition,
};
pub use fallback::{HeuristicFormatter, format_arguments_heuristically};
pub use format::{Clock, FixedClock, FormatHints, FormatKind, SystemClock, ValueFormatter};
pub use formatter::{Erc7730Formatter, FormattedField, FormattedTransaction};
pub use loader::{DescriptorCache, DescriptorError, DescriptorSource, load_descriptor_from};
pub use path::{resolve, resolve_in};
pub use review::{ReviewError, ReviewSession, ReviewState, Screen};
pub use value::ArgValue;
