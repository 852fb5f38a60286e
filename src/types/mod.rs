//! This module provides the value types produced by the Ion 1.1 binary reader, following
//! [the Ion Data Model](https://amazon-ion.github.io/ion-docs/docs/spec.html#the-ion-data-model).

pub type SymbolId = usize;

mod decimal;
mod integer;
mod timestamp;

pub use decimal::{Decimal, Sign};
pub use integer::Int;
pub use timestamp::{Precision, Timestamp};

use std::fmt;

/// Represents the Ion data type of a given value. To learn more about each data type,
/// read [the Ion Data Model](https://amazon-ion.github.io/ion-docs/docs/spec.html#the-ion-data-model)
/// section of the spec.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub enum IonType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Clob,
    Blob,
    List,
    SExp,
    Struct,
}

impl fmt::Display for IonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IonType::Null => "null",
                IonType::Bool => "bool",
                IonType::Int => "int",
                IonType::Float => "float",
                IonType::Decimal => "decimal",
                IonType::Timestamp => "timestamp",
                IonType::Symbol => "symbol",
                IonType::String => "string",
                IonType::Clob => "clob",
                IonType::Blob => "blob",
                IonType::List => "list",
                IonType::SExp => "sexp",
                IonType::Struct => "struct",
            }
        )
    }
}

impl IonType {
    pub fn is_container(&self) -> bool {
        use IonType::*;
        matches!(self, List | SExp | Struct)
    }

    /// Maps the byte that follows a typed null opcode (`0xEB`) to the null's type.
    pub(crate) const fn from_typed_null_byte(byte: u8) -> Option<IonType> {
        use IonType::*;
        let ion_type = match byte {
            0x00 => Bool,
            0x01 => Int,
            0x02 => Float,
            0x03 => Decimal,
            0x04 => Timestamp,
            0x05 => String,
            0x06 => Symbol,
            0x07 => Blob,
            0x08 => Clob,
            0x09 => List,
            0x0A => SExp,
            0x0B => Struct,
            _ => return None,
        };
        Some(ion_type)
    }
}
