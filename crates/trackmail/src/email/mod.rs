//! Email normalization and fingerprinting.
//!
//! Converts raw inbound email parts into a canonical [`EmailContent`]
//! and derives the deduplication fingerprint from it.

pub mod content;
pub mod error;
pub mod fingerprint;

pub use content::{html_to_text, EmailContent};
pub use error::{EmailError, Result};
pub use fingerprint::fingerprint;
