//! Data models for the Tokidex card collection.
//!
//! Field names match the JSON written to the backing file and returned by the API.

mod card;

pub use card::*;
