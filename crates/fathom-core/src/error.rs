//! Error types for Fathom
//!
//! The analytics passes are pure and infallible: data-quality conditions
//! degrade output flags instead of failing, and malformed input is normalized
//! to safe defaults at the normalizer boundary. Errors exist only for the
//! alert subsystem, where a state-store collaborator can fail and a caller
//! can hand us a rule that violates its contract.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Alert store error: {0}")]
    Store(String),

    #[error("Invalid alert rule: {0}")]
    InvalidRule(String),
}

pub type Result<T> = std::result::Result<T, Error>;
