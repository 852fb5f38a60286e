use std::fmt::Debug;

use crate::position::Position;
use crate::result::decoding_error::DecodingError;
use crate::result::illegal_operation::IllegalOperation;
use crate::result::incomplete::Incomplete;
use thiserror::Error;

pub mod decoding_error;
pub mod illegal_operation;
pub mod incomplete;

/// A unified Result type representing the outcome of method calls that may fail.
pub type IonResult<T> = Result<T, IonError>;

/// Represents the different types of high-level failures that might occur when reading Ion 1.1
/// binary data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum IonError {
    /// Indicates that the input buffer did not contain enough data to perform the requested read
    /// operation. The decoder never waits for more data; callers that can obtain a larger buffer
    /// may retry from a higher layer.
    #[error("{0}")]
    Incomplete(#[from] Incomplete),

    /// Indicates that the data stream being read contained illegal or otherwise unreadable data.
    #[error("{0}")]
    Decoding(#[from] DecodingError),

    /// Returned when the user has performed an illegal operation (for example: reading a string
    /// while the reader is positioned on an int, or returning a reader to its pool twice.)
    #[error("{0}")]
    IllegalOperation(#[from] IllegalOperation),
}

impl IonError {
    /// Returns `true` if this error was caused by running out of input.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, IonError::Incomplete(_))
    }
}

/// Constructors for each error kind that are available both on [`IonError`] itself and on
/// [`IonResult`], so a failing branch can be written as `return IonResult::decoding_error(..)`.
pub(crate) trait IonFailure {
    fn incomplete(label: &'static str, position: impl Into<Position>) -> Self;
    fn decoding_error<S: Into<String>>(description: S) -> Self;
    fn illegal_operation<S: Into<String>>(operation: S) -> Self;
}

impl IonFailure for IonError {
    #[inline(never)]
    fn incomplete(label: &'static str, position: impl Into<Position>) -> Self {
        Incomplete::new(label, position).into()
    }

    #[inline(never)]
    fn decoding_error<S: Into<String>>(description: S) -> Self {
        DecodingError::new(description.into()).into()
    }

    #[inline(never)]
    fn illegal_operation<S: Into<String>>(operation: S) -> Self {
        IllegalOperation::new(operation.into()).into()
    }
}

impl<T> IonFailure for IonResult<T> {
    #[inline(never)]
    fn incomplete(label: &'static str, position: impl Into<Position>) -> Self {
        Err(IonError::incomplete(label, position))
    }

    #[inline(never)]
    fn decoding_error<S: Into<String>>(description: S) -> Self {
        Err(IonError::decoding_error(description))
    }

    #[inline(never)]
    fn illegal_operation<S: Into<String>>(operation: S) -> Self {
        Err(IonError::illegal_operation(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_constructors_produce_matching_variants() {
        let incomplete: IonResult<()> = IonResult::incomplete("a FlexUInt", 12);
        assert!(matches!(incomplete, Err(IonError::Incomplete(_))));
        assert!(incomplete.unwrap_err().is_incomplete());

        let decoding = IonError::decoding_error("found reserved opcode 0x69");
        assert_eq!(decoding.to_string(), "found reserved opcode 0x69");

        let illegal: IonResult<()> = IonResult::illegal_operation("bool_value() on a string");
        assert!(matches!(illegal, Err(IonError::IllegalOperation(_))));
    }

    #[test]
    fn incomplete_error_reports_position() {
        let error = IonError::incomplete("a FixedInt", 7);
        assert_eq!(error.to_string(), "ran out of input while reading a FixedInt at offset 7");
    }
}
