//! Core domain entities
//!
//! Pure data structures and algorithms - no I/O. Randomness is always
//! supplied by the caller.

mod account;
pub mod card_number;
pub mod result;

pub use account::{mask_number, Account};
