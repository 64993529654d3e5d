//! Shared test utilities for trackmail integration tests.
//!
//! Provides builders for email content and a helper for assembling a
//! pipeline over an in-memory database with the AI path pinned off.

pub mod builders;

pub use builders::*;
