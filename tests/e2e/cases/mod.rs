//! Dispatch end-to-end test cases.

mod claim;
mod reward;
mod storage;
