//! # Domain Module
//!
//! Core logic of the harness:
//!
//! * Transfer pipeline (build, assemble, sign, submit, confirm, verify)
//! * Account funding

pub mod transfer;
pub use transfer::*;

mod funding;
pub use funding::*;
