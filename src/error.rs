//! Centralized error type for the tutti-ump umbrella crate.
//!
//! Wraps the conversion layer's errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Ump(#[from] tutti_ump_core::Error),

    #[error("Invalid bridge configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
