#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// Store location settings
pub mod config;
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Functions for reading and writing the ledger file and stock reports
pub mod io;
/// Business logic for appending transactions and totalling stock
mod ops;
/// Data types used throughout the inventory ledger
pub mod types;
