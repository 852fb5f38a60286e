use crate::position::Position;
use std::borrow::Cow;
use thiserror::Error;

/// Indicates that there was not enough data available in the input buffer to complete the
/// requested action.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("ran out of input while reading {label} at offset {position}")]
pub struct Incomplete {
    label: Cow<'static, str>,
    position: Position,
}

impl Incomplete {
    pub(crate) fn new(label: impl Into<Cow<'static, str>>, position: impl Into<Position>) -> Self {
        Incomplete {
            label: label.into(),
            position: position.into(),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_ref()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
}
