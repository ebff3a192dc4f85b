//! The transfer pipeline, one module per stage.

mod instruction;
pub use instruction::*;

mod assembler;
pub use assembler::*;

mod signing;
pub use signing::*;

mod submission;
pub use submission::*;

mod verifier;
pub use verifier::*;

mod account_locks;
pub use account_locks::*;

mod flow;
pub use flow::*;
