//! Shared primitive types.

mod account;
pub use account::*;

mod asset;
pub use asset::*;

mod record;
pub use record::*;

mod transfer;
pub use transfer::*;
