//! Dispatch end-to-end tests against in-memory ledgers.

mod cases;
mod environment;

pub use environment::*;
