//! Pharmacovigilance signal detection: contingency tables, PRR/ROR/IC
//! disproportionality statistics and a parallel batch detector over case corpora.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod signals;

pub use error::SignalError;
