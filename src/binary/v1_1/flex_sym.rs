use std::cmp::Ordering;

use crate::binary::v1_1::flex_int::FlexInt;
use crate::constants::SYSTEM_SYMBOL_COUNT;
use crate::result::IonFailure;
use crate::types::SymbolId;
use crate::{IonError, IonResult};

/// The byte that follows a FlexSym zero to select system symbol `$0`. Escapes for the other
/// system symbols count up from here.
pub(crate) const SYSTEM_SYMBOL_ESCAPE_BIAS: u8 = 0x60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexSymValue<'a> {
    /// A positive FlexSym: a symbol ID to resolve against the active symbol table.
    SymbolId(SymbolId),
    /// A negative FlexSym: inline UTF-8 text.
    Text(&'a str),
    /// A FlexSym zero followed by an escape byte: the address of a system symbol. Address `0` is
    /// `$0`, which has no text.
    SystemSymbol(usize),
}

/// An Ion 1.1 encoding primitive that can compactly represent a symbol ID or inline text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexSym<'a> {
    value: FlexSymValue<'a>,
    size_in_bytes: usize,
}

impl<'a> FlexSym<'a> {
    /// A FlexSym-encoded logical zero: the byte `0x01u8`
    pub const ZERO: u8 = 0x01;

    /// Reads a [`FlexSym`] from the beginning of `input`.
    ///
    /// `input` is the byte slice from which to read a [`FlexSym`].
    /// `offset` is the position of the slice in some larger input stream. It is only used to
    ///          populate an appropriate error message if reading fails.
    pub fn read(input: &'a [u8], offset: usize) -> IonResult<FlexSym<'a>> {
        let flex_int = FlexInt::read(input, offset)?;
        let flex_int_len = flex_int.size_in_bytes();
        let sym_value = flex_int.value();
        let (value, size_in_bytes) = match sym_value.cmp(&0) {
            Ordering::Greater => (FlexSymValue::SymbolId(sym_value as usize), flex_int_len),
            Ordering::Less => {
                let len = sym_value.unsigned_abs() as usize;
                let flex_sym_end = flex_int_len + len;
                let bytes = match input.get(flex_int_len..flex_sym_end) {
                    Some(bytes) => bytes,
                    None => return IonResult::incomplete("a FlexSym", offset),
                };
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    IonError::decoding_error(format!(
                        "found FlexSym with invalid UTF-8 data at offset {offset}"
                    ))
                })?;
                (FlexSymValue::Text(text), flex_sym_end)
            }
            Ordering::Equal => {
                let escape = match input.get(flex_int_len) {
                    Some(byte) => *byte,
                    None => return IonResult::incomplete("a FlexSym escape", offset),
                };
                let address = Self::system_symbol_address(escape, offset)?;
                (FlexSymValue::SystemSymbol(address), flex_int_len + 1)
            }
        };
        Ok(Self {
            value,
            size_in_bytes,
        })
    }

    /// Reads a [`FlexSym`] that begins at `position` in `source`.
    #[inline]
    pub fn read_at(source: &'a [u8], position: usize) -> IonResult<FlexSym<'a>> {
        match source.get(position..) {
            Some(input) => Self::read(input, position),
            None => IonResult::incomplete("a FlexSym", position),
        }
    }

    /// Returns the encoded size of the FlexSym that begins at `position` without validating
    /// its text.
    pub fn encoded_size_at(source: &[u8], position: usize) -> IonResult<usize> {
        let flex_int = FlexInt::read_at(source, position)?;
        let size = match flex_int.value().cmp(&0) {
            Ordering::Greater => flex_int.size_in_bytes(),
            Ordering::Less => flex_int.size_in_bytes() + flex_int.value().unsigned_abs() as usize,
            Ordering::Equal => flex_int.size_in_bytes() + 1,
        };
        if source.len() < position + size {
            return IonResult::incomplete("a FlexSym", position);
        }
        Ok(size)
    }

    /// Maps a FlexSym escape byte to a system symbol address.
    pub(crate) fn system_symbol_address(escape: u8, offset: usize) -> IonResult<usize> {
        match escape.checked_sub(SYSTEM_SYMBOL_ESCAPE_BIAS) {
            Some(address) if (address as usize) <= SYSTEM_SYMBOL_COUNT => Ok(address as usize),
            _ => IonResult::decoding_error(format!(
                "found invalid FlexSym escape byte 0x{escape:02X} at offset {offset}"
            )),
        }
    }

    /// Writes `sid` as a positive FlexSym. Symbol ID `0` cannot be written this way and is
    /// encoded with the system symbol escape instead.
    pub fn write_symbol_id(output: &mut Vec<u8>, sid: SymbolId) -> IonResult<usize> {
        if sid == 0 {
            return Self::write_system_symbol(output, 0);
        }
        FlexInt::write_i64(output, sid as i64)
    }

    /// Writes `text` as a negative FlexSym followed by its UTF-8 bytes.
    ///
    /// A zero-length FlexSym is the escape prefix, so empty text cannot be written inline.
    pub fn write_text(output: &mut Vec<u8>, text: &str) -> IonResult<usize> {
        if text.is_empty() {
            return IonResult::illegal_operation("cannot write empty text as an inline FlexSym");
        }
        let prefix_size = FlexInt::write_i64(output, -(text.len() as i64))?;
        output.extend_from_slice(text.as_bytes());
        Ok(prefix_size + text.len())
    }

    /// Writes a FlexSym zero followed by the escape byte for the system symbol at `address`.
    pub fn write_system_symbol(output: &mut Vec<u8>, address: usize) -> IonResult<usize> {
        if address > SYSTEM_SYMBOL_COUNT {
            return IonResult::illegal_operation(format!(
                "there is no system symbol with address {address}"
            ));
        }
        output.extend_from_slice(&[FlexSym::ZERO, SYSTEM_SYMBOL_ESCAPE_BIAS + address as u8]);
        Ok(2)
    }

    pub fn value(&self) -> FlexSymValue<'a> {
        self.value
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}
