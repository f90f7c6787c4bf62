//! `stockbook-parties` — customers and suppliers.
//!
//! Parties are plain lookup records: the order builders only need existence
//! checks and reference attachment.

pub mod party;

pub use party::{ContactInfo, Party, PartyId, PartyKind};
