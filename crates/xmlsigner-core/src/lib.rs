#![forbid(unsafe_code)]

//! Core types shared by every xmlsigner crate: the error enum and the
//! namespace / algorithm URI tables.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, Result};
