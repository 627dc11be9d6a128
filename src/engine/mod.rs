//! Set-profit engine: catalog → candidates → priced, ranked sets.

pub mod catalog;
pub mod evaluator;
pub mod pricing;
pub mod scanner;

pub use scanner::{ScanSummary, SetProfitEngine};
