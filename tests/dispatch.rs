//! Dispatch integration tests.
#![allow(missing_docs)]

mod e2e;
