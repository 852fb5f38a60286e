use std::fmt::{Debug, Formatter};

use log::debug;

use crate::binary::v1_1::e_expression::EExpArguments;
use crate::binary::v1_1::fixed_int::FixedInt;
use crate::binary::v1_1::flex_int::FlexInt;
use crate::binary::v1_1::flex_uint::FlexUInt;
use crate::binary::v1_1::float16::f16_bits_to_f32;
use crate::binary::v1_1::opcode::{opcode_for, LengthClass, TokenType};
use crate::binary::v1_1::pool::ResourcePool;
use crate::binary::v1_1::skip::{as_usize, skip_value_body, value_length, SkipContext};
use crate::binary::v1_1::timestamp::{read_long_timestamp, read_short_timestamp};
use crate::macro_table::MacroTable;
use crate::read_config::ReadConfig;
use crate::result::IonFailure;
use crate::symbol_table::{system_symbol_text, SymbolTable};
use crate::types::{Decimal, Int, IonType, SymbolId, Timestamp};
use crate::{IonError, IonResult};

/// Where a [`ValueReader`] is in its token cycle.
///
/// `Opcode` holds the opcode of the current value; its body begins at the reader's position.
/// The other variants are pseudo-states that do not correspond to an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReaderState {
    /// No token has been read, or the last one was consumed.
    Unset,
    Opcode(u8),
    /// Annotations were read or skipped; the next token is the annotated value.
    AfterAnnotations,
    OnFieldName,
    /// A field name was read or skipped; the next token is the field's value.
    AfterFieldName,
    ExpressionGroup,
    AbsentArgument,
    End,
}

/// The container (or argument list) a [`ValueReader`] is iterating over.
#[derive(Debug)]
pub(crate) enum ReaderKind<'a> {
    TopLevel,
    /// A length-prefixed list or s-expression.
    Sequence,
    /// A length-prefixed struct. Field names begin as FlexUInt symbol IDs; a symbol ID of `0`
    /// switches the struct to FlexSym field names for the rest of its fields.
    Struct { flex_sym_mode: bool },
    DelimitedSequence,
    DelimitedStruct,
    EExpArguments(EExpArguments<'a>),
}

impl ReaderKind<'_> {
    pub(crate) fn is_delimited(&self) -> bool {
        matches!(
            self,
            ReaderKind::DelimitedSequence | ReaderKind::DelimitedStruct
        )
    }
}

/// A cursor over Ion 1.1 binary data.
///
/// A `ValueReader` is driven by calling [`next_token`](Self::next_token) and then exactly one
/// accessor (such as [`string_value`](Self::string_value)) or [`skip`](Self::skip) for each
/// token. Calling `next_token` while a token is still unread skips it. Containers, annotations
/// and e-expression arguments are read by child readers that come from a [`ResourcePool`] and are
/// handed back to it with [`close_child`](Self::close_child) or [`ResourcePool::close`].
///
/// Every reader for a stream shares the same source bytes; text and lob values are returned as
/// slices of them.
pub struct ValueReader<'a> {
    pub(crate) source: &'a [u8],
    pub(crate) position: usize,
    pub(crate) limit: usize,
    pub(crate) state: ReaderState,
    pub(crate) config: ReadConfig<'a>,
    pub(crate) kind: ReaderKind<'a>,
    pub(crate) in_pool: bool,
}

impl Debug for ValueReader<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueReader")
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("state", &self.state)
            .finish()
    }
}

impl<'a> ValueReader<'a> {
    pub(crate) fn new(
        source: &'a [u8],
        position: usize,
        limit: usize,
        config: ReadConfig<'a>,
        kind: ReaderKind<'a>,
    ) -> Self {
        ValueReader {
            source,
            position,
            limit,
            state: ReaderState::Unset,
            config,
            kind,
            in_pool: false,
        }
    }

    #[inline]
    pub(crate) fn context(&self) -> SkipContext<'a> {
        SkipContext::new(&self.config)
    }

    /// Advances to the next token, skipping the current one if it has not been read.
    pub fn next_token(&mut self) -> IonResult<TokenType> {
        if self.is_token_set() {
            self.skip()?;
        }
        if let ReaderKind::EExpArguments(_) = self.kind {
            return self.next_argument_token();
        }
        match self.state {
            ReaderState::End => Ok(TokenType::End),
            ReaderState::Unset
                if matches!(
                    self.kind,
                    ReaderKind::Struct { .. } | ReaderKind::DelimitedStruct
                ) =>
            {
                self.next_field_name_token()
            }
            _ => self.read_opcode(),
        }
    }

    /// Reads the opcode at the current position and makes it the current token.
    pub(crate) fn read_opcode(&mut self) -> IonResult<TokenType> {
        if self.position >= self.limit {
            if self.state == ReaderState::Unset
                && matches!(self.kind, ReaderKind::TopLevel | ReaderKind::Sequence)
            {
                self.state = ReaderState::End;
                return Ok(TokenType::End);
            }
            if self.limit >= self.source.len() {
                return IonResult::incomplete("an opcode", self.position);
            }
            return IonResult::decoding_error(format!(
                "expected a value at offset {}, but the enclosing container ended",
                self.position
            ));
        }
        let byte = self.source[self.position];
        let opcode = opcode_for(byte);
        if opcode.token_type == TokenType::End {
            if self.state == ReaderState::Unset && matches!(self.kind, ReaderKind::DelimitedSequence)
            {
                self.position += 1;
                self.limit = self.position;
                self.state = ReaderState::End;
                return Ok(TokenType::End);
            }
            return IonResult::decoding_error(format!(
                "found an unexpected delimited container end (0xF0) at offset {}",
                self.position
            ));
        }
        if opcode.is_reserved() {
            return IonResult::decoding_error(format!(
                "found reserved opcode 0x{byte:02X} at offset {}",
                self.position
            ));
        }
        self.position += 1;
        self.state = ReaderState::Opcode(byte);
        Ok(opcode.token_type)
    }

    /// Skips the current token. Skipping annotations leaves the reader before the annotated
    /// value; skipping a field name leaves it before the field's value.
    pub fn skip(&mut self) -> IonResult<()> {
        match self.state {
            ReaderState::Opcode(byte) => {
                let is_annotations = opcode_for(byte).is_annotations();
                if !is_annotations {
                    if let Some(next_start) = self.next_argument_start() {
                        self.position = next_start;
                        self.value_consumed();
                        return Ok(());
                    }
                }
                let end = skip_value_body(self.source, byte, self.position, self.context())?;
                self.check_end(self.position, end, "a value")?;
                self.position = end;
                if is_annotations {
                    self.state = ReaderState::AfterAnnotations;
                } else {
                    self.value_consumed();
                }
                Ok(())
            }
            ReaderState::OnFieldName => {
                self.skip_field_name()?;
                self.state = ReaderState::AfterFieldName;
                Ok(())
            }
            ReaderState::ExpressionGroup => self.skip_expression_group_argument(),
            ReaderState::AbsentArgument => {
                self.value_consumed();
                Ok(())
            }
            ReaderState::End => Ok(()),
            state => IonResult::illegal_operation(format!(
                "cannot skip; reader is not positioned on a token ({state:?})"
            )),
        }
    }

    /// Marks the current value as read. Argument readers also record where the next argument
    /// begins.
    pub(crate) fn value_consumed(&mut self) {
        self.state = ReaderState::Unset;
        if let ReaderKind::EExpArguments(arguments) = &mut self.kind {
            arguments.record_next_start(self.position);
        }
    }

    /// Returns the start of the next argument if this is an argument reader that already knows it.
    pub(crate) fn next_argument_start(&self) -> Option<usize> {
        match &self.kind {
            ReaderKind::EExpArguments(arguments) => arguments.next_start(),
            _ => None,
        }
    }

    /// Returns the current token, or `None` if no token is set.
    pub fn current_token(&self) -> Option<TokenType> {
        match self.state {
            ReaderState::Opcode(byte) => Some(opcode_for(byte).token_type),
            ReaderState::OnFieldName => Some(TokenType::FieldName),
            ReaderState::ExpressionGroup => Some(TokenType::ExpressionGroup),
            ReaderState::AbsentArgument => Some(TokenType::AbsentArgument),
            ReaderState::End => Some(TokenType::End),
            ReaderState::Unset | ReaderState::AfterAnnotations | ReaderState::AfterFieldName => {
                None
            }
        }
    }

    /// Returns `true` if the reader is positioned on a token that has not been read or skipped.
    pub fn is_token_set(&self) -> bool {
        matches!(
            self.state,
            ReaderState::Opcode(_)
                | ReaderState::OnFieldName
                | ReaderState::ExpressionGroup
                | ReaderState::AbsentArgument
        )
    }

    /// Returns the Ion type of the current value. For a typed null, this is the null's type.
    pub fn ion_type(&self) -> IonResult<Option<IonType>> {
        match self.state {
            ReaderState::Opcode(0xEB) => match self.source.get(self.position) {
                Some(byte) => Ok(Some(self.typed_null_type(*byte)?)),
                None => IonResult::incomplete("a typed null", self.position),
            },
            ReaderState::Opcode(byte) => Ok(opcode_for(byte).token_type.ion_type()),
            _ => Ok(None),
        }
    }

    /// Returns the number of bytes in the current value after its opcode.
    pub fn value_size(&self) -> IonResult<usize> {
        match self.state {
            ReaderState::Opcode(byte) => {
                value_length(self.source, byte, self.position, self.context())
            }
            state => IonResult::illegal_operation(format!(
                "cannot compute a value size; reader positioned on {state:?}"
            )),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the reader to `position`, which must be the start of a token, and clears the current
    /// token.
    pub fn seek_to(&mut self, position: usize) {
        self.position = position;
        self.state = ReaderState::Unset;
    }

    pub fn symbol_table(&self) -> &'a SymbolTable {
        self.config.symbol_table()
    }

    pub fn macro_table(&self) -> &'a MacroTable {
        self.config.macro_table()
    }

    /// Installs the symbol and macro tables used to read the values that follow. Child readers
    /// created afterwards inherit them. The delimited depth bound is unchanged.
    pub fn set_tables(&mut self, symbol_table: &'a SymbolTable, macro_table: &'a MacroTable) {
        self.config = self
            .config
            .with_symbol_table(symbol_table)
            .with_macro_table(macro_table);
    }

    /// Returns a closed child reader to the pool and moves this reader past the child's value.
    pub fn close_child(
        &mut self,
        child: Box<ValueReader<'a>>,
        pool: &mut ResourcePool<'a>,
    ) -> IonResult<()> {
        let end = pool.close(child)?;
        self.position = end;
        self.value_consumed();
        Ok(())
    }

    /// Confirms that the current token is a value of type `expected`, returning its opcode.
    #[inline]
    pub(crate) fn expect_opcode(&self, expected: TokenType) -> IonResult<u8> {
        match self.state {
            ReaderState::Opcode(byte) if opcode_for(byte).token_type == expected => Ok(byte),
            state => IonResult::illegal_operation(format!(
                "cannot read a {expected:?} value; reader positioned on {state:?}"
            )),
        }
    }

    /// Checks that a value body running from `start` to `end` fits in the source and in this
    /// reader's container.
    #[inline]
    pub(crate) fn check_end(&self, start: usize, end: usize, label: &'static str) -> IonResult<()> {
        if end > self.source.len() {
            return IonResult::incomplete(label, start);
        }
        if end > self.limit {
            return IonResult::decoding_error(format!(
                "found {label} at offset {start} that runs past the end of its container (offset {})",
                self.limit
            ));
        }
        Ok(())
    }

    /// Locates the body of the current value, reading its FlexUInt length if it has one. Returns
    /// the body's start offset and length.
    pub(crate) fn value_body(&self, opcode: u8, label: &'static str) -> IonResult<(usize, usize)> {
        let (start, length) = match opcode_for(opcode).length_class {
            LengthClass::Fixed(length) => (self.position, length),
            LengthClass::FlexUIntFollows => {
                let flex_uint = FlexUInt::read_at(self.source, self.position)?;
                (
                    self.position + flex_uint.size_in_bytes(),
                    as_usize(flex_uint.value(), self.position)?,
                )
            }
            _ => {
                return IonResult::illegal_operation(format!(
                    "opcode 0x{opcode:02X} does not have a length-delimited body"
                ))
            }
        };
        self.check_end(start, start + length, label)?;
        Ok((start, length))
    }

    /// Returns the body of the current value as a slice and moves past it.
    #[inline]
    fn consume_body(&mut self, opcode: u8, label: &'static str) -> IonResult<(usize, &'a [u8])> {
        let (start, length) = self.value_body(opcode, label)?;
        let end = start + length;
        self.position = end;
        self.value_consumed();
        Ok((start, &self.source[start..end]))
    }

    fn typed_null_type(&self, byte: u8) -> IonResult<IonType> {
        match IonType::from_typed_null_byte(byte) {
            Some(ion_type) => Ok(ion_type),
            None => IonResult::decoding_error(format!(
                "found invalid typed null byte 0x{byte:02X} at offset {}",
                self.position
            )),
        }
    }

    /// Reads a null, returning its type. An untyped null has type [`IonType::Null`].
    pub fn null_value(&mut self) -> IonResult<IonType> {
        let opcode = self.expect_opcode(TokenType::Null)?;
        let ion_type = if opcode == 0xEB {
            let (_, body) = self.consume_body(opcode, "a typed null")?;
            // `position` is already past the type byte; report the byte's own offset.
            IonType::from_typed_null_byte(body[0]).ok_or_else(|| {
                IonError::decoding_error(format!(
                    "found invalid typed null byte 0x{:02X} at offset {}",
                    body[0],
                    self.position - 1
                ))
            })?
        } else {
            self.value_consumed();
            IonType::Null
        };
        Ok(ion_type)
    }

    pub fn bool_value(&mut self) -> IonResult<bool> {
        let opcode = self.expect_opcode(TokenType::Bool)?;
        self.value_consumed();
        Ok(opcode == 0x6E)
    }

    /// Reads an int that must fit in an `i64`.
    pub fn i64_value(&mut self) -> IonResult<i64> {
        let opcode = self.expect_opcode(TokenType::Int)?;
        let (start, body) = self.consume_body(opcode, "an int")?;
        if opcode == 0xF6 {
            return match FixedInt::read(body, body.len(), start)?.value().as_i64() {
                Some(value) => Ok(value),
                None => IonResult::illegal_operation(format!(
                    "the int at offset {start} does not fit in an i64; use int_value()"
                )),
            };
        }
        FixedInt::read_i64(body, body.len(), start)
    }

    pub fn int_value(&mut self) -> IonResult<Int> {
        let opcode = self.expect_opcode(TokenType::Int)?;
        let (start, body) = self.consume_body(opcode, "an int")?;
        if opcode == 0xF6 {
            return Ok(FixedInt::read(body, body.len(), start)?.into());
        }
        Ok(Int::I64(FixedInt::read_i64(body, body.len(), start)?))
    }

    pub fn float_value(&mut self) -> IonResult<f64> {
        let opcode = self.expect_opcode(TokenType::Float)?;
        let (_, body) = self.consume_body(opcode, "a float")?;
        let value = match *body {
            [] => 0f64,
            [low, high] => f16_bits_to_f32(u16::from_le_bytes([low, high])) as f64,
            [b0, b1, b2, b3] => f32::from_le_bytes([b0, b1, b2, b3]) as f64,
            [b0, b1, b2, b3, b4, b5, b6, b7] => {
                f64::from_le_bytes([b0, b1, b2, b3, b4, b5, b6, b7])
            }
            _ => {
                return IonResult::decoding_error(format!(
                    "found a float with invalid length {}",
                    body.len()
                ))
            }
        };
        Ok(value)
    }

    /// Reads a decimal: a FlexInt exponent followed by a FixedInt coefficient that fills the rest
    /// of the body. A zero-length coefficient is `0`; a coefficient that is encoded as zero is
    /// negative zero.
    pub fn decimal_value(&mut self) -> IonResult<Decimal> {
        let opcode = self.expect_opcode(TokenType::Decimal)?;
        let (start, body) = self.consume_body(opcode, "a decimal")?;
        if body.is_empty() {
            return Ok(Decimal::new(0, 0));
        }
        let exponent = FlexInt::read(body, start)?;
        let coefficient_bytes = match body.get(exponent.size_in_bytes()..) {
            Some(bytes) => bytes,
            None => {
                return IonResult::decoding_error(format!(
                    "found a decimal at offset {start} whose exponent overruns its length"
                ))
            }
        };
        if coefficient_bytes.is_empty() {
            return Ok(Decimal::new(0, exponent.value()));
        }
        let coefficient = Int::from(FixedInt::read(
            coefficient_bytes,
            coefficient_bytes.len(),
            start + exponent.size_in_bytes(),
        )?);
        if coefficient == Int::I64(0) {
            return Ok(Decimal::negative_zero_with_exponent(exponent.value()));
        }
        Ok(Decimal::new(coefficient, exponent.value()))
    }

    pub fn timestamp_value(&mut self) -> IonResult<Timestamp> {
        let opcode = self.expect_opcode(TokenType::Timestamp)?;
        let (start, body) = self.consume_body(opcode, "a timestamp")?;
        if opcode == 0xF8 {
            read_long_timestamp(body, start)
        } else {
            read_short_timestamp(opcode, body, start)
        }
    }

    pub fn string_value(&mut self) -> IonResult<&'a str> {
        let opcode = self.expect_opcode(TokenType::String)?;
        let (start, body) = self.consume_body(opcode, "a string")?;
        utf8_text(body, start)
    }

    /// Reads a symbol value's text. Returns `None` for symbols with unknown text, including `$0`.
    pub fn symbol_value(&mut self) -> IonResult<Option<&'a str>> {
        let opcode = self.expect_opcode(TokenType::Symbol)?;
        match opcode {
            0xE1..=0xE3 => {
                let sid = self.read_symbol_id(opcode)?;
                self.lookup_sid(sid)
            }
            0xEE => {
                let (_, body) = self.consume_body(opcode, "a system symbol")?;
                system_symbol_text(body[0] as usize)
            }
            _ => {
                let (start, body) = self.consume_body(opcode, "a symbol")?;
                utf8_text(body, start).map(Some)
            }
        }
    }

    /// Reads the symbol ID of a symbol value. Symbols with inline text and system symbols have no
    /// symbol ID; for those, this returns `None` and leaves the value unread so its text can be
    /// read with [`symbol_value`](Self::symbol_value).
    pub fn symbol_value_sid(&mut self) -> IonResult<Option<SymbolId>> {
        let opcode = self.expect_opcode(TokenType::Symbol)?;
        match opcode {
            0xE1..=0xE3 => self.read_symbol_id(opcode).map(Some),
            _ => Ok(None),
        }
    }

    fn read_symbol_id(&mut self, opcode: u8) -> IonResult<SymbolId> {
        let start = self.position;
        let (sid, length) = match opcode {
            0xE1 => match self.source.get(start) {
                Some(byte) => (*byte as usize, 1),
                None => return IonResult::incomplete("a symbol ID", start),
            },
            0xE2 => match self.source.get(start..start + 2) {
                Some(bytes) => (u16::from_le_bytes([bytes[0], bytes[1]]) as usize + 256, 2),
                None => return IonResult::incomplete("a symbol ID", start),
            },
            _ => {
                let flex_uint = FlexUInt::read_at(self.source, start)?;
                (
                    as_usize(flex_uint.value(), start)? + 65_792,
                    flex_uint.size_in_bytes(),
                )
            }
        };
        self.check_end(start, start + length, "a symbol ID")?;
        self.position = start + length;
        self.value_consumed();
        Ok(sid)
    }

    /// Returns the text of `sid` in the active symbol table.
    pub fn lookup_sid(&self, sid: SymbolId) -> IonResult<Option<&'a str>> {
        self.config.symbol_table().text_for(sid)
    }

    pub fn blob_value(&mut self) -> IonResult<&'a [u8]> {
        let opcode = self.expect_opcode(TokenType::Blob)?;
        let (_, body) = self.consume_body(opcode, "a blob")?;
        Ok(body)
    }

    pub fn clob_value(&mut self) -> IonResult<&'a [u8]> {
        let opcode = self.expect_opcode(TokenType::Clob)?;
        let (_, body) = self.consume_body(opcode, "a clob")?;
        Ok(body)
    }

    /// Reads an Ion version marker, returning its `(major, minor)` version. The symbol and macro
    /// tables are reset to the system tables.
    pub fn ivm(&mut self) -> IonResult<(u8, u8)> {
        let opcode = self.expect_opcode(TokenType::Ivm)?;
        if !matches!(self.kind, ReaderKind::TopLevel) {
            return IonResult::decoding_error(format!(
                "found an Ion version marker inside a container at offset {}",
                self.position - 1
            ));
        }
        let (start, body) = self.consume_body(opcode, "an Ion version marker")?;
        let (major, minor) = match *body {
            [major, minor, 0xEA] => (major, minor),
            _ => {
                return IonResult::decoding_error(format!(
                    "found a malformed Ion version marker at offset {}",
                    start - 1
                ))
            }
        };
        debug!("Ion version marker v{major}.{minor} at offset {}; resetting to system tables", start - 1);
        self.config = self
            .config
            .with_symbol_table(SymbolTable::system())
            .with_macro_table(MacroTable::system());
        Ok((major, minor))
    }
}

#[inline]
pub(crate) fn utf8_text(bytes: &[u8], offset: usize) -> IonResult<&str> {
    std::str::from_utf8(bytes).map_err(|_| {
        IonError::decoding_error(format!("found invalid UTF-8 text at offset {offset}"))
    })
}
