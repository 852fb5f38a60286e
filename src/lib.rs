//! A pooled, zero-copy decoder for the [Ion 1.1](https://amazon-ion.github.io/ion-docs/) binary
//! encoding.
//!
//! Reading begins with a [`ResourcePool`] over the source bytes. The pool creates the top-level
//! [`ValueReader`] and recycles the child readers that are opened for containers, annotations and
//! e-expression arguments.
//!
//! ```
//! use ion_binary_1_1::{IonResult, ReadConfig, ResourcePool, TokenType};
//!
//! # fn main() -> IonResult<()> {
//! // ["a", true]
//! let bytes = [0xB3, 0x91, b'a', 0x6E];
//! let mut pool = ResourcePool::new(&bytes);
//! let mut reader = pool.stream_reader(&ReadConfig::new());
//! assert_eq!(reader.next_token()?, TokenType::List);
//! let mut list = reader.list_value(&mut pool)?;
//! assert_eq!(list.next_token()?, TokenType::String);
//! assert_eq!(list.string_value()?, "a");
//! assert_eq!(list.next_token()?, TokenType::Bool);
//! assert!(list.bool_value()?);
//! assert_eq!(list.next_token()?, TokenType::End);
//! reader.close_child(list, &mut pool)?;
//! assert_eq!(reader.next_token()?, TokenType::End);
//! # Ok(())
//! # }
//! ```

pub mod binary;
pub mod constants;
pub mod macro_table;
mod position;
pub mod read_config;
pub mod result;
pub mod symbol_table;
pub mod types;

pub use binary::v1_1::{
    seek_to_end_of_delimited_container, skip, AnnotationsIterator, FixedInt, FixedUInt, FlexInt,
    FlexSym, FlexSymValue, FlexUInt, RawAnnotation, ResourcePool, TokenType, ValueReader,
};
pub use macro_table::{Cardinality, MacroAddress, MacroDef, MacroTable, Parameter};
pub use position::Position;
pub use read_config::{ReadConfig, MAX_DELIMITED_DEPTH};
pub use result::{IonError, IonResult};
pub use symbol_table::SymbolTable;
pub use types::{Decimal, Int, IonType, Precision, Sign, SymbolId, Timestamp};
