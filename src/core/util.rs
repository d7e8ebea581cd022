//! General helper functions shared across the crate.

mod uuid;

pub use self::uuid::*;
