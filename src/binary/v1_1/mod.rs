//! Readers and encoding primitives for the Ion 1.1 binary format.

pub mod annotations_iterator;
pub mod e_expression;
pub mod fixed_int;
pub mod fixed_uint;
pub mod flex_int;
pub mod flex_sym;
pub mod flex_uint;
mod float16;
pub mod opcode;
pub mod pool;
pub mod reader;
mod sequence;
pub mod skip;
mod r#struct;
mod timestamp;

pub use annotations_iterator::{AnnotationsIterator, RawAnnotation};
pub use fixed_int::FixedInt;
pub use fixed_uint::FixedUInt;
pub use flex_int::FlexInt;
pub use flex_sym::{FlexSym, FlexSymValue};
pub use flex_uint::FlexUInt;
pub use opcode::{LengthClass, Opcode, TokenType};
pub use pool::ResourcePool;
pub use reader::ValueReader;
pub use skip::{seek_to_end_of_delimited_container, skip};
