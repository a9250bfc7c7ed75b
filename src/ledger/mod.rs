//! Ledger module - Records of the image tag changes made during a run.

mod modification;

pub use modification::*;
