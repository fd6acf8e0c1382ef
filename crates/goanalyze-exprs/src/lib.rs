#![warn(rust_2024_compatibility, clippy::all)]

//! Type-driven expression and declaration inspections.
//!
//! - [`operators`]: `binary-unary`, operands an operator is not defined on
//! - [`arguments`]: `types-compatibility`, call arguments against parameters
//! - [`calls`]: `function-call`, argument counts of calls and conversions
//! - [`duplicates`]: `duplicate-function`, functions and methods declared twice
//! - [`string_index`]: `string-index-is-byte`, `s[i] == "x"`
//! - [`loop_address`]: `address-of-loop-variable`, `&v` of a range variable
//! - [`receiver`]: `assignment-to-receiver`, assignments lost on return
//! - [`slices`]: `redundant-slice-index`, `x[a:len(x)]`

pub mod arguments;
mod callee;
pub mod calls;
mod constants;
pub mod duplicates;
pub mod loop_address;
pub mod operators;
pub mod receiver;
pub mod slices;
pub mod string_index;

pub use arguments::{ArgumentTypes, ArgumentsConfig};
pub use calls::{ArgumentCounts, CallsConfig};
pub use duplicates::{DuplicateFunctions, DuplicatesConfig};
pub use loop_address::{AddressOfLoopVariable, LoopAddressConfig};
pub use operators::{OperandTypes, OperatorsConfig};
pub use receiver::{AssignmentToReceiver, ReceiverConfig};
pub use slices::{RedundantSliceIndex, SlicesConfig};
pub use string_index::{StringIndexConfig, StringIndexIsByte};
