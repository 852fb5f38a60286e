use crate::binary::v1_1::opcode::{opcode_for, TokenType};
use crate::binary::v1_1::pool::ResourcePool;
use crate::binary::v1_1::reader::{ReaderKind, ReaderState, ValueReader};
use crate::binary::v1_1::skip::seek_to_end_of_delimited;
use crate::IonResult;

impl<'a> ValueReader<'a> {
    /// Opens a reader over the current list.
    pub fn list_value(&mut self, pool: &mut ResourcePool<'a>) -> IonResult<Box<ValueReader<'a>>> {
        self.sequence_value(pool, TokenType::List)
    }

    /// Opens a reader over the current s-expression.
    pub fn sexp_value(&mut self, pool: &mut ResourcePool<'a>) -> IonResult<Box<ValueReader<'a>>> {
        self.sequence_value(pool, TokenType::SExp)
    }

    fn sequence_value(
        &mut self,
        pool: &mut ResourcePool<'a>,
        expected: TokenType,
    ) -> IonResult<Box<ValueReader<'a>>> {
        let opcode = self.expect_opcode(expected)?;
        if opcode_for(opcode).is_delimited_start() {
            let child = pool.get_delimited_sequence(self.position, self.config);
            self.enter_delimited();
            return Ok(child);
        }
        let (start, length) = self.value_body(opcode, "a sequence")?;
        let child = pool.get_sequence(start, length, self.config);
        self.position = start + length;
        self.value_consumed();
        Ok(child)
    }

    /// Leaves this reader right after a delimited container's opcode. The child reader finds the
    /// container's end; [`close_child`](Self::close_child) moves this reader past it.
    pub(crate) fn enter_delimited(&mut self) {
        self.state = ReaderState::Unset;
    }

    /// Reads to the end of a delimited container, returning the position after its closing
    /// `0xF0`.
    pub(crate) fn drain_delimited(&mut self) -> IonResult<usize> {
        if self.state == ReaderState::Unset {
            // At an element boundary the scanner can find the end without tracking tokens.
            let is_struct = matches!(self.kind, ReaderKind::DelimitedStruct);
            let end = seek_to_end_of_delimited(self.source, self.position, is_struct, self.context())?;
            self.position = end;
            self.limit = end;
            self.state = ReaderState::End;
            return Ok(end);
        }
        while self.next_token()? != TokenType::End {}
        Ok(self.position)
    }
}
