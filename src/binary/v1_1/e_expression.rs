//! Reading the arguments of an e-expression (a macro invocation in the data stream).
//!
//! An e-expression is a macro address followed by a presence bitmap and then the arguments. The
//! bitmap has a 2-bit code for every parameter that is not `ExactlyOne`:
//!
//! | Code | Argument                    |
//! |------|-----------------------------|
//! | `0`  | absent                      |
//! | `1`  | a single tagged value       |
//! | `2`  | an expression group         |
//! | `3`  | invalid                     |
//!
//! `ExactlyOne` parameters have no bitmap entry and always take a single value. Argument start
//! offsets are discovered lazily and remembered.

use smallvec::SmallVec;

use crate::binary::v1_1::flex_uint::FlexUInt;
use crate::binary::v1_1::opcode::TokenType;
use crate::binary::v1_1::pool::ResourcePool;
use crate::binary::v1_1::reader::{ReaderKind, ReaderState, ValueReader};
use crate::binary::v1_1::skip::{
    as_usize, presence_code, read_macro_address, resolve_macro, skip_argument,
    skip_expression_group,
};
use crate::macro_table::MacroDef;
use crate::result::IonFailure;
use crate::IonResult;

/// Presence code for an argument that was not supplied.
pub(crate) const PRESENCE_ABSENT: u8 = 0;
/// Presence code for an argument that is a single tagged value.
pub(crate) const PRESENCE_SINGLE: u8 = 1;
/// Presence code for an argument that is an expression group.
pub(crate) const PRESENCE_GROUP: u8 = 2;

/// The bookkeeping an argument reader keeps for its e-expression.
#[derive(Debug)]
pub(crate) struct EExpArguments<'a> {
    pub(crate) definition: &'a MacroDef,
    /// The presence code of each parameter, in signature order.
    pub(crate) presence: SmallVec<[u8; 8]>,
    /// The start offset of each argument, if known. The last entry is the end of the arguments.
    pub(crate) argument_starts: SmallVec<[Option<usize>; 9]>,
    /// The index of the parameter whose argument the next token belongs to.
    pub(crate) next_parameter: usize,
}

impl<'a> EExpArguments<'a> {
    /// Reads the presence bitmap at `position`. Returns the bookkeeping and the offset of the
    /// first argument.
    pub(crate) fn read(
        source: &[u8],
        position: usize,
        definition: &'a MacroDef,
    ) -> IonResult<(Self, usize)> {
        let mut arguments = EExpArguments {
            definition,
            presence: SmallVec::new(),
            argument_starts: SmallVec::new(),
            next_parameter: 0,
        };
        let first_argument = arguments.reset(source, position, definition)?;
        Ok((arguments, first_argument))
    }

    /// Re-initializes recycled bookkeeping in place for a new e-expression.
    pub(crate) fn reset(
        &mut self,
        source: &[u8],
        position: usize,
        definition: &'a MacroDef,
    ) -> IonResult<usize> {
        self.definition = definition;
        self.next_parameter = 0;
        self.presence.clear();
        self.argument_starts.clear();

        let num_presence_bytes = definition.presence_bytes_required();
        let presence_bytes = match source.get(position..position + num_presence_bytes) {
            Some(bytes) => bytes,
            None => return IonResult::incomplete("an e-expression presence bitmap", position),
        };
        let mut presence_index = 0;
        for parameter in definition.signature() {
            let code = if parameter.cardinality().uses_presence_bits() {
                let code = presence_code(presence_bytes, presence_index);
                presence_index += 1;
                code
            } else {
                PRESENCE_SINGLE
            };
            if code > PRESENCE_GROUP {
                return IonResult::decoding_error(format!(
                    "Invalid presence bits value {code} for parameter '{}' at offset {position}",
                    parameter.name()
                ));
            }
            self.presence.push(code);
        }

        let first_argument = position + num_presence_bytes;
        self.argument_starts.resize(self.presence.len() + 1, None);
        self.argument_starts[0] = Some(first_argument);
        Ok(first_argument)
    }

    pub(crate) fn num_parameters(&self) -> usize {
        self.presence.len()
    }

    /// The start of the argument after the current one, if it has been found.
    pub(crate) fn next_start(&self) -> Option<usize> {
        self.argument_starts.get(self.next_parameter).copied().flatten()
    }

    /// Records `position` as the start of the next argument unless it is already known.
    pub(crate) fn record_next_start(&mut self, position: usize) {
        if let Some(start @ None) = self.argument_starts.get_mut(self.next_parameter) {
            *start = Some(position);
        }
    }
}

impl<'a> ValueReader<'a> {
    /// Opens a reader over the arguments of the current e-expression.
    ///
    /// For a length-prefixed e-expression (`0xF5`) this reader moves past it immediately; for the
    /// other forms the end is found by the argument reader and handed back by
    /// [`close_child`](Self::close_child).
    pub fn macro_invocation(
        &mut self,
        pool: &mut ResourcePool<'a>,
    ) -> IonResult<Box<ValueReader<'a>>> {
        let opcode = self.expect_opcode(TokenType::MacroInvocation)?;
        let (address, is_system, mut start) = read_macro_address(self.source, opcode, self.position)?;
        let definition = resolve_macro(self.config.macro_table(), address, is_system, self.position)?;
        if opcode == 0xF5 {
            let length = FlexUInt::read_at(self.source, start)?;
            start += length.size_in_bytes();
            let end = start + as_usize(length.value(), start)?;
            self.check_end(start, end, "e-expression arguments")?;
            let child = pool.get_eexp_arguments(start, end, definition, self.config)?;
            self.position = end;
            self.value_consumed();
            return Ok(child);
        }
        let child = pool.get_eexp_arguments(start, self.limit, definition, self.config)?;
        self.enter_delimited();
        Ok(child)
    }

    fn arguments(&self) -> IonResult<&EExpArguments<'a>> {
        match &self.kind {
            ReaderKind::EExpArguments(arguments) => Ok(arguments),
            _ => IonResult::illegal_operation("this reader is not reading e-expression arguments"),
        }
    }

    fn arguments_mut(&mut self) -> IonResult<&mut EExpArguments<'a>> {
        match &mut self.kind {
            ReaderKind::EExpArguments(arguments) => Ok(arguments),
            _ => IonResult::illegal_operation("this reader is not reading e-expression arguments"),
        }
    }

    /// Returns the definition of the macro whose arguments this reader is reading.
    pub fn macro_definition(&self) -> IonResult<&'a MacroDef> {
        Ok(self.arguments()?.definition)
    }

    /// Produces the token for the next argument according to its presence code.
    pub(crate) fn next_argument_token(&mut self) -> IonResult<TokenType> {
        match self.state {
            ReaderState::End => return Ok(TokenType::End),
            // The annotations belong to the current argument; read the value they annotate.
            ReaderState::AfterAnnotations => return self.read_opcode(),
            _ => {}
        }
        let position = self.position;
        let arguments = self.arguments_mut()?;
        let index = arguments.next_parameter;
        let code = match arguments.presence.get(index) {
            Some(code) => *code,
            None => {
                self.state = ReaderState::End;
                return Ok(TokenType::End);
            }
        };
        arguments.argument_starts[index].get_or_insert(position);
        arguments.next_parameter += 1;
        match code {
            PRESENCE_ABSENT => {
                self.state = ReaderState::AbsentArgument;
                Ok(TokenType::AbsentArgument)
            }
            PRESENCE_GROUP => {
                self.state = ReaderState::ExpressionGroup;
                Ok(TokenType::ExpressionGroup)
            }
            _ => self.read_opcode(),
        }
    }

    /// Opens a reader over the current expression group. An absent argument is read as an empty
    /// group.
    pub fn expression_group(
        &mut self,
        pool: &mut ResourcePool<'a>,
    ) -> IonResult<Box<ValueReader<'a>>> {
        match self.state {
            ReaderState::AbsentArgument => {
                let child = pool.get_sequence(self.position, 0, self.config);
                self.value_consumed();
                Ok(child)
            }
            ReaderState::ExpressionGroup => {
                let length = FlexUInt::read_at(self.source, self.position)?;
                let start = self.position + length.size_in_bytes();
                match as_usize(length.value(), self.position)? {
                    0 => {
                        let child = pool.get_delimited_sequence(start, self.config);
                        self.position = start;
                        self.enter_delimited();
                        Ok(child)
                    }
                    length => {
                        self.check_end(start, start + length, "an expression group")?;
                        let child = pool.get_sequence(start, length, self.config);
                        self.position = start + length;
                        self.value_consumed();
                        Ok(child)
                    }
                }
            }
            state => IonResult::illegal_operation(format!(
                "cannot read an expression group; reader positioned on {state:?}"
            )),
        }
    }

    pub(crate) fn skip_expression_group_argument(&mut self) -> IonResult<()> {
        let end = match self.next_argument_start() {
            Some(end) => end,
            None => skip_expression_group(self.source, self.position, self.context())?,
        };
        self.check_end(self.position, end, "an expression group")?;
        self.position = end;
        self.value_consumed();
        Ok(())
    }

    /// Moves to the start of argument `index` without reading it, returning its offset. Passing
    /// the number of parameters moves to the end of the arguments.
    pub fn seek_to_before_argument(&mut self, index: usize) -> IonResult<usize> {
        let start = self.argument_start(index)?;
        self.position = start;
        self.state = ReaderState::Unset;
        self.arguments_mut()?.next_parameter = index;
        Ok(start)
    }

    /// Moves to argument `index` and reads its token.
    pub fn seek_to_argument(&mut self, index: usize) -> IonResult<TokenType> {
        self.seek_to_before_argument(index)?;
        self.next_token()
    }

    /// Finds the offset where argument `index` begins, skipping over earlier arguments whose
    /// offsets are not yet known.
    fn argument_start(&mut self, index: usize) -> IonResult<usize> {
        let source = self.source;
        let context = self.context();
        let arguments = self.arguments_mut()?;
        if index > arguments.num_parameters() {
            return IonResult::illegal_operation(format!(
                "argument index {index} is out of bounds for a macro with {} parameters",
                arguments.num_parameters()
            ));
        }
        // Walk back to the closest argument whose start is known. The first always is.
        let mut known = index;
        let mut position = loop {
            match arguments.argument_starts[known] {
                Some(position) => break position,
                None => known -= 1,
            }
        };
        while known < index {
            position = skip_argument(source, arguments.presence[known], position, context)?;
            known += 1;
            arguments.argument_starts[known] = Some(position);
        }
        Ok(position)
    }

    /// Returns the offset after the last argument without moving the reader.
    pub fn calculate_end_position(&mut self) -> IonResult<usize> {
        let num_parameters = self.arguments()?.num_parameters();
        let end = self.argument_start(num_parameters)?;
        if end > self.source.len() {
            return IonResult::incomplete("e-expression arguments", self.position);
        }
        self.limit = end;
        Ok(end)
    }
}
