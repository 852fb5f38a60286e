//! Decoding of binary Ion data.

pub mod v1_1;
