use crate::binary::v1_1::flex_sym::{FlexSym, FlexSymValue};
use crate::binary::v1_1::flex_uint::FlexUInt;
use crate::binary::v1_1::opcode::{opcode_for, TokenType};
use crate::binary::v1_1::pool::ResourcePool;
use crate::binary::v1_1::reader::{ReaderKind, ReaderState, ValueReader};
use crate::binary::v1_1::skip::as_usize;
use crate::result::IonFailure;
use crate::symbol_table::system_symbol_text;
use crate::types::SymbolId;
use crate::IonResult;

impl<'a> ValueReader<'a> {
    /// Opens a reader over the current struct.
    pub fn struct_value(&mut self, pool: &mut ResourcePool<'a>) -> IonResult<Box<ValueReader<'a>>> {
        let opcode = self.expect_opcode(TokenType::Struct)?;
        if opcode_for(opcode).is_delimited_start() {
            let child = pool.get_delimited_struct(self.position, self.config);
            self.enter_delimited();
            return Ok(child);
        }
        let (start, length) = self.value_body(opcode, "a struct")?;
        let child = pool.get_struct(start, length, self.config);
        self.position = start + length;
        self.value_consumed();
        Ok(child)
    }

    /// Produces the `FieldName` token that precedes each struct field, or `End`.
    pub(crate) fn next_field_name_token(&mut self) -> IonResult<TokenType> {
        if self.position >= self.limit {
            if let ReaderKind::Struct { .. } = self.kind {
                self.state = ReaderState::End;
                return Ok(TokenType::End);
            }
            return IonResult::incomplete("a field name", self.position);
        }
        if let ReaderKind::DelimitedStruct = self.kind {
            // FlexSym zero followed by 0xF0 closes a delimited struct.
            if self.source[self.position] == FlexSym::ZERO {
                match self.source.get(self.position + 1) {
                    Some(0xF0) => {
                        self.position += 2;
                        self.limit = self.position;
                        self.state = ReaderState::End;
                        return Ok(TokenType::End);
                    }
                    Some(_) => {}
                    None => return IonResult::incomplete("a field name", self.position),
                }
            }
        }
        self.state = ReaderState::OnFieldName;
        Ok(TokenType::FieldName)
    }

    fn expect_field_name(&self) -> IonResult<()> {
        match self.state {
            ReaderState::OnFieldName => Ok(()),
            state => IonResult::illegal_operation(format!(
                "cannot read a field name; reader positioned on {state:?}"
            )),
        }
    }

    /// In a struct that is still in symbol ID mode, reads the FlexUInt field name. A symbol ID of
    /// `0` switches the struct to FlexSym mode and is not itself a field name; in that case this
    /// returns `None` and the FlexSym field name follows.
    fn read_field_name_sid_mode(&mut self) -> IonResult<Option<SymbolId>> {
        let flex_uint = FlexUInt::read_at(self.source, self.position)?;
        let sid = as_usize(flex_uint.value(), self.position)?;
        self.check_end(self.position, self.position + flex_uint.size_in_bytes(), "a field name")?;
        self.position += flex_uint.size_in_bytes();
        if sid == 0 {
            self.kind = ReaderKind::Struct {
                flex_sym_mode: true,
            };
            return Ok(None);
        }
        Ok(Some(sid))
    }

    fn in_sid_mode(&self) -> bool {
        matches!(
            self.kind,
            ReaderKind::Struct {
                flex_sym_mode: false
            }
        )
    }

    fn read_flex_sym_field_name(&mut self) -> IonResult<FlexSym<'a>> {
        let flex_sym = FlexSym::read_at(self.source, self.position)?;
        self.check_end(self.position, self.position + flex_sym.size_in_bytes(), "a field name")?;
        Ok(flex_sym)
    }

    /// Reads the current field name's text. Returns `None` for field names with unknown text.
    pub fn field_name(&mut self) -> IonResult<Option<&'a str>> {
        self.expect_field_name()?;
        if self.in_sid_mode() {
            if let Some(sid) = self.read_field_name_sid_mode()? {
                let text = self.lookup_sid(sid)?;
                self.state = ReaderState::AfterFieldName;
                return Ok(text);
            }
        }
        let flex_sym = self.read_flex_sym_field_name()?;
        let text = match flex_sym.value() {
            FlexSymValue::SymbolId(sid) => self.lookup_sid(sid)?,
            FlexSymValue::Text(text) => Some(text),
            FlexSymValue::SystemSymbol(address) => system_symbol_text(address)?,
        };
        self.position += flex_sym.size_in_bytes();
        self.state = ReaderState::AfterFieldName;
        Ok(text)
    }

    /// Reads the current field name's symbol ID.
    ///
    /// Field names with inline text and system symbol escapes other than `$0` have no symbol ID;
    /// for those, this returns `None` and leaves the field name unread so its text can be read
    /// with [`field_name`](Self::field_name).
    pub fn field_name_sid(&mut self) -> IonResult<Option<SymbolId>> {
        self.expect_field_name()?;
        if self.in_sid_mode() {
            if let Some(sid) = self.read_field_name_sid_mode()? {
                self.state = ReaderState::AfterFieldName;
                return Ok(Some(sid));
            }
        }
        let flex_sym = self.read_flex_sym_field_name()?;
        let sid = match flex_sym.value() {
            FlexSymValue::SymbolId(sid) => sid,
            FlexSymValue::SystemSymbol(0) => 0,
            _ => return Ok(None),
        };
        self.position += flex_sym.size_in_bytes();
        self.state = ReaderState::AfterFieldName;
        Ok(Some(sid))
    }

    /// Moves past the current field name without resolving it.
    pub(crate) fn skip_field_name(&mut self) -> IonResult<()> {
        if self.in_sid_mode() && self.read_field_name_sid_mode()?.is_some() {
            return Ok(());
        }
        let size = FlexSym::encoded_size_at(self.source, self.position)?;
        self.check_end(self.position, self.position + size, "a field name")?;
        self.position += size;
        Ok(())
    }
}
