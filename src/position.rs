use std::fmt::{Display, Error};

/// Position represents the location within an Ion 1.1 binary stream where an error has been
/// identified. `byte_offset` is the number of bytes between the start of the source buffer and
/// the byte that could not be processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub(crate) byte_offset: usize,
}

impl Position {
    /// Creates a new Position with the provided offset in bytes.
    pub fn with_offset(offset: usize) -> Self {
        Position {
            byte_offset: offset,
        }
    }

    /// Returns the offset from the start of the Ion stream in bytes.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.byte_offset)
    }
}

impl From<usize> for Position {
    fn from(offset: usize) -> Self {
        Position::with_offset(offset)
    }
}
