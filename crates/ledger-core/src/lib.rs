// ledger-core/src/lib.rs

//! Shared primitives for the issuance ledger
//!
//! This crate carries the types every other component agrees on:
//! - addresses and caller-supplied millisecond timestamps
//! - UTC day-number arithmetic for daily rate limits
//! - checked (overflow-rejecting) u64 arithmetic

pub mod safemath;
pub mod types;

pub use safemath::{MathError, MathResult};
pub use types::{day_number, Address, Timestamp, MS_PER_DAY};
