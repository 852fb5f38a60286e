//! Recycles the child readers that are created while walking a stream.
//!
//! Opening a container, an expression group or an e-expression's arguments requires a new
//! [`ValueReader`]. The pool keeps closed readers on a free list per kind so that reading a large
//! stream does not allocate a reader per container.

use log::trace;

use crate::binary::v1_1::annotations_iterator::AnnotationsIterator;
use crate::binary::v1_1::e_expression::EExpArguments;
use crate::binary::v1_1::reader::{ReaderKind, ReaderState, ValueReader};
use crate::macro_table::MacroDef;
use crate::read_config::ReadConfig;
use crate::result::IonFailure;
use crate::symbol_table::SymbolTable;
use crate::IonResult;

/// Owns the free lists of child readers for a single source.
#[derive(Debug)]
pub struct ResourcePool<'a> {
    source: &'a [u8],
    sequences: Vec<Box<ValueReader<'a>>>,
    structs: Vec<Box<ValueReader<'a>>>,
    delimited_sequences: Vec<Box<ValueReader<'a>>>,
    delimited_structs: Vec<Box<ValueReader<'a>>>,
    eexp_arguments: Vec<Box<ValueReader<'a>>>,
    annotations: Vec<Box<AnnotationsIterator<'a>>>,
}

impl<'a> ResourcePool<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        ResourcePool {
            source,
            sequences: Vec::new(),
            structs: Vec::new(),
            delimited_sequences: Vec::new(),
            delimited_structs: Vec::new(),
            eexp_arguments: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Creates a reader over the top level of the source.
    pub fn stream_reader(&self, config: &ReadConfig<'a>) -> ValueReader<'a> {
        ValueReader::new(
            self.source,
            0,
            self.source.len(),
            *config,
            ReaderKind::TopLevel,
        )
    }

    fn recycle(
        free_list: &mut Vec<Box<ValueReader<'a>>>,
        reader: ValueReader<'a>,
        label: &str,
    ) -> Box<ValueReader<'a>> {
        match free_list.pop() {
            Some(mut recycled) => {
                trace!("reusing a pooled {label} reader at offset {}", reader.position);
                *recycled = reader;
                recycled
            }
            None => {
                trace!("allocating a {label} reader at offset {}", reader.position);
                Box::new(reader)
            }
        }
    }

    /// Returns a reader over the `length` bytes of a list or s-expression body that begins at
    /// `start`.
    pub fn get_sequence(
        &mut self,
        start: usize,
        length: usize,
        config: ReadConfig<'a>,
    ) -> Box<ValueReader<'a>> {
        let reader = ValueReader::new(self.source, start, start + length, config, ReaderKind::Sequence);
        Self::recycle(&mut self.sequences, reader, "sequence")
    }

    /// Returns a reader over the `length` bytes of a struct body that begins at `start`.
    pub fn get_struct(
        &mut self,
        start: usize,
        length: usize,
        config: ReadConfig<'a>,
    ) -> Box<ValueReader<'a>> {
        let reader = ValueReader::new(
            self.source,
            start,
            start + length,
            config,
            ReaderKind::Struct {
                flex_sym_mode: false,
            },
        );
        Self::recycle(&mut self.structs, reader, "struct")
    }

    /// Returns a reader over a delimited list or s-expression whose first child begins at
    /// `start`.
    pub fn get_delimited_sequence(
        &mut self,
        start: usize,
        config: ReadConfig<'a>,
    ) -> Box<ValueReader<'a>> {
        let reader = ValueReader::new(
            self.source,
            start,
            self.source.len(),
            config,
            ReaderKind::DelimitedSequence,
        );
        Self::recycle(&mut self.delimited_sequences, reader, "delimited sequence")
    }

    /// Returns a reader over a delimited struct whose first field begins at `start`.
    pub fn get_delimited_struct(
        &mut self,
        start: usize,
        config: ReadConfig<'a>,
    ) -> Box<ValueReader<'a>> {
        let reader = ValueReader::new(
            self.source,
            start,
            self.source.len(),
            config,
            ReaderKind::DelimitedStruct,
        );
        Self::recycle(&mut self.delimited_structs, reader, "delimited struct")
    }

    /// Returns a reader over the arguments of an invocation of `definition`. `start` is the
    /// position of the presence bitmap and `limit` bounds the arguments.
    pub fn get_eexp_arguments(
        &mut self,
        start: usize,
        limit: usize,
        definition: &'a MacroDef,
        config: ReadConfig<'a>,
    ) -> IonResult<Box<ValueReader<'a>>> {
        let source = self.source;
        match self.eexp_arguments.pop() {
            Some(mut reader) => {
                trace!("reusing a pooled e-expression argument reader at offset {start}");
                // Keep the argument bookkeeping's buffers.
                let first_argument = match &mut reader.kind {
                    ReaderKind::EExpArguments(arguments) => {
                        arguments.reset(source, start, definition)?
                    }
                    kind => {
                        let (arguments, first_argument) =
                            EExpArguments::read(source, start, definition)?;
                        *kind = ReaderKind::EExpArguments(arguments);
                        first_argument
                    }
                };
                reader.source = source;
                reader.position = first_argument;
                reader.limit = limit;
                reader.state = ReaderState::Unset;
                reader.config = config;
                reader.in_pool = false;
                Ok(reader)
            }
            None => {
                trace!("allocating an e-expression argument reader at offset {start}");
                let (arguments, first_argument) = EExpArguments::read(source, start, definition)?;
                Ok(Box::new(ValueReader::new(
                    source,
                    first_argument,
                    limit,
                    config,
                    ReaderKind::EExpArguments(arguments),
                )))
            }
        }
    }

    /// Returns an iterator over the annotations sequence whose opcode is `opcode` and whose
    /// `length` bytes begin at `start`.
    pub fn get_annotations(
        &mut self,
        opcode: u8,
        start: usize,
        length: usize,
        symbols: &'a SymbolTable,
    ) -> IonResult<Box<AnnotationsIterator<'a>>> {
        match self.annotations.pop() {
            Some(mut annotations) => {
                annotations.reset(self.source, opcode, start, length, symbols)?;
                Ok(annotations)
            }
            None => Ok(Box::new(AnnotationsIterator::new(
                self.source,
                opcode,
                start,
                length,
                symbols,
            )?)),
        }
    }

    /// Returns `reader` to the pool, returning the position after the value it was reading.
    ///
    /// Closing a delimited container reader reads to the container's end; closing an argument
    /// reader skips any arguments that were not read.
    pub fn close(&mut self, mut reader: Box<ValueReader<'a>>) -> IonResult<usize> {
        if reader.in_pool {
            return IonResult::illegal_operation("this reader has already been closed");
        }
        let end = match reader.kind {
            ReaderKind::TopLevel => return Ok(reader.position),
            ReaderKind::Sequence | ReaderKind::Struct { .. } => reader.limit,
            ReaderKind::DelimitedSequence | ReaderKind::DelimitedStruct => {
                reader.drain_delimited()?
            }
            ReaderKind::EExpArguments(ref arguments) => {
                let num_parameters = arguments.num_parameters();
                reader.seek_to_before_argument(num_parameters)?
            }
        };
        reader.in_pool = true;
        if let Some(free_list) = self.free_list_for(&reader.kind) {
            free_list.push(reader);
        }
        Ok(end)
    }

    fn free_list_for(&mut self, kind: &ReaderKind) -> Option<&mut Vec<Box<ValueReader<'a>>>> {
        let free_list = match kind {
            ReaderKind::TopLevel => return None,
            ReaderKind::Sequence => &mut self.sequences,
            ReaderKind::Struct { .. } => &mut self.structs,
            ReaderKind::DelimitedSequence => &mut self.delimited_sequences,
            ReaderKind::DelimitedStruct => &mut self.delimited_structs,
            ReaderKind::EExpArguments(_) => &mut self.eexp_arguments,
        };
        Some(free_list)
    }

    pub fn close_annotations(&mut self, mut annotations: Box<AnnotationsIterator<'a>>) -> IonResult<()> {
        if annotations.in_pool {
            return IonResult::illegal_operation("this annotations iterator has already been closed");
        }
        annotations.in_pool = true;
        self.annotations.push(annotations);
        Ok(())
    }

    /// Drops every pooled reader.
    pub fn clear(&mut self) {
        self.sequences.clear();
        self.structs.clear();
        self.delimited_sequences.clear();
        self.delimited_structs.clear();
        self.eexp_arguments.clear();
        self.annotations.clear();
    }

    /// Returns the number of pooled readers and annotation iterators.
    pub fn free_count(&self) -> usize {
        self.sequences.len()
            + self.structs.len()
            + self.delimited_sequences.len()
            + self.delimited_structs.len()
            + self.eexp_arguments.len()
            + self.annotations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::v1_1::opcode::TokenType;
    use crate::IonError;

    #[test]
    fn closed_readers_are_reused() -> IonResult<()> {
        let input = [0xB1, 0x6E, 0xB1, 0x6F];
        let mut pool = ResourcePool::new(&input);
        let mut reader = pool.stream_reader(&ReadConfig::new());

        reader.next_token()?;
        let first = reader.list_value(&mut pool)?;
        let first_address: *const ValueReader = &*first;
        reader.close_child(first, &mut pool)?;
        assert_eq!(pool.free_count(), 1);

        reader.next_token()?;
        let mut second = reader.list_value(&mut pool)?;
        assert!(std::ptr::eq(first_address, &*second));
        assert_eq!(pool.free_count(), 0);
        // The recycled reader reads the second list, not the first.
        assert_eq!(second.next_token()?, TokenType::Bool);
        assert!(!second.bool_value()?);
        reader.close_child(second, &mut pool)?;
        assert_eq!(reader.next_token()?, TokenType::End);
        Ok(())
    }

    #[test]
    fn readers_are_pooled_by_kind() -> IonResult<()> {
        let input = [0xB0, 0xD0, 0xF1, 0xF0];
        let mut pool = ResourcePool::new(&input);
        let mut reader = pool.stream_reader(&ReadConfig::new());
        reader.next_token()?;
        let list = reader.list_value(&mut pool)?;
        reader.close_child(list, &mut pool)?;
        reader.next_token()?;
        let fields = reader.struct_value(&mut pool)?;
        assert!(matches!(fields.kind, ReaderKind::Struct { .. }));
        reader.close_child(fields, &mut pool)?;
        reader.next_token()?;
        let delimited = reader.list_value(&mut pool)?;
        assert!(matches!(delimited.kind, ReaderKind::DelimitedSequence));
        reader.close_child(delimited, &mut pool)?;
        assert_eq!(pool.free_count(), 3);
        assert_eq!(reader.next_token()?, TokenType::End);
        pool.clear();
        assert_eq!(pool.free_count(), 0);
        Ok(())
    }

    #[test]
    fn closing_twice_is_an_illegal_operation() {
        let input = [0xB0];
        let mut pool = ResourcePool::new(&input);
        let mut reader = pool.get_sequence(1, 0, ReadConfig::new());
        reader.in_pool = true;
        assert!(matches!(
            pool.close(reader),
            Err(IonError::IllegalOperation(_))
        ));
    }

    #[test]
    fn closing_a_top_level_reader_returns_its_position() -> IonResult<()> {
        let input = [0x60, 0x60];
        let mut pool = ResourcePool::new(&input);
        let mut reader = Box::new(pool.stream_reader(&ReadConfig::new()));
        reader.next_token()?;
        reader.skip()?;
        assert_eq!(pool.close(reader)?, 1);
        assert_eq!(pool.free_count(), 0);
        Ok(())
    }

    #[test]
    fn closing_arguments_skips_unread_arguments() -> IonResult<()> {
        // (:sum 1 2) followed by true
        let input = [0xEF, 0x07, 0x61, 0x01, 0x61, 0x02, 0x6E];
        let mut pool = ResourcePool::new(&input);
        let mut reader = pool.stream_reader(&ReadConfig::new());
        reader.next_token()?;
        let arguments = reader.macro_invocation(&mut pool)?;
        reader.close_child(arguments, &mut pool)?;
        assert_eq!(reader.position(), 6);
        assert_eq!(reader.next_token()?, TokenType::Bool);

        Ok(())
    }

    #[test]
    fn argument_readers_are_reused() -> IonResult<()> {
        // (:sum 1 2) (:sum 0 0)
        let input = [0xEF, 0x07, 0x61, 0x01, 0x61, 0x02, 0xEF, 0x07, 0x60, 0x60];
        let mut pool = ResourcePool::new(&input);
        let mut reader = pool.stream_reader(&ReadConfig::new());
        reader.next_token()?;
        let mut arguments = reader.macro_invocation(&mut pool)?;
        assert_eq!(arguments.next_token()?, TokenType::Int);
        let first_address: *const ValueReader = &*arguments;
        reader.close_child(arguments, &mut pool)?;

        assert_eq!(reader.next_token()?, TokenType::MacroInvocation);
        let mut arguments = reader.macro_invocation(&mut pool)?;
        assert!(std::ptr::eq(first_address, &*arguments));
        assert_eq!(arguments.next_token()?, TokenType::Int);
        assert_eq!(arguments.i64_value()?, 0);
        assert_eq!(arguments.next_token()?, TokenType::Int);
        assert_eq!(arguments.next_token()?, TokenType::End);
        reader.close_child(arguments, &mut pool)?;
        assert_eq!(reader.next_token()?, TokenType::End);
        Ok(())
    }
}
