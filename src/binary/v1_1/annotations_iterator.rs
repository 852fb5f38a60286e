use crate::binary::v1_1::flex_sym::{FlexSym, FlexSymValue};
use crate::binary::v1_1::flex_uint::FlexUInt;
use crate::binary::v1_1::opcode::TokenType;
use crate::binary::v1_1::pool::ResourcePool;
use crate::binary::v1_1::reader::{ReaderState, ValueReader};
use crate::binary::v1_1::skip::{as_usize, value_length};
use crate::result::IonFailure;
use crate::symbol_table::{system_symbol_text, SymbolTable};
use crate::types::SymbolId;
use crate::IonResult;

/// A single annotation as it appears in the encoding.
///
/// Annotations encoded as symbol IDs have a `sid` and, if the symbol table knows it, `text`.
/// Annotations with inline text have no `sid`. The symbol `$0` has a `sid` of `0` and no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAnnotation<'a> {
    sid: Option<SymbolId>,
    text: Option<&'a str>,
}

impl<'a> RawAnnotation<'a> {
    pub fn new(sid: Option<SymbolId>, text: Option<&'a str>) -> Self {
        RawAnnotation { sid, text }
    }

    pub fn sid(&self) -> Option<SymbolId> {
        self.sid
    }

    pub fn text(&self) -> Option<&'a str> {
        self.text
    }
}

/// Iterates over the annotations that precede a value.
///
/// Opcodes `0xE4` and `0xE5` hold one and two FlexUInt symbol IDs; `0xE7` and `0xE8` hold one
/// and two FlexSyms. `0xE6` (symbol IDs) and `0xE9` (FlexSyms) begin with a FlexUInt count of
/// the bytes that follow.
#[derive(Debug)]
pub struct AnnotationsIterator<'a> {
    source: &'a [u8],
    opcode: u8,
    position: usize,
    limit: usize,
    symbols: &'a SymbolTable,
    pub(crate) in_pool: bool,
}

impl<'a> AnnotationsIterator<'a> {
    /// Creates an iterator over the annotations sequence whose opcode is `opcode` and whose
    /// `length` bytes begin at `start`.
    pub(crate) fn new(
        source: &'a [u8],
        opcode: u8,
        start: usize,
        length: usize,
        symbols: &'a SymbolTable,
    ) -> IonResult<Self> {
        let mut iterator = AnnotationsIterator {
            source,
            opcode,
            position: start,
            limit: start,
            symbols,
            in_pool: false,
        };
        iterator.reset(source, opcode, start, length, symbols)?;
        Ok(iterator)
    }

    pub(crate) fn reset(
        &mut self,
        source: &'a [u8],
        opcode: u8,
        start: usize,
        length: usize,
        symbols: &'a SymbolTable,
    ) -> IonResult<()> {
        if !matches!(opcode, 0xE4..=0xE9) {
            return IonResult::illegal_operation(format!(
                "opcode 0x{opcode:02X} does not introduce annotations"
            ));
        }
        let position = match opcode {
            0xE6 | 0xE9 => start + FlexUInt::size_at(source, start)?,
            _ => start,
        };
        *self = AnnotationsIterator {
            source,
            opcode,
            position,
            limit: start + length,
            symbols,
            in_pool: false,
        };
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        self.position < self.limit
    }

    /// Reads the next annotation, or returns `None` if there are no more.
    pub fn next_annotation(&mut self) -> IonResult<Option<RawAnnotation<'a>>> {
        match self.read_at(self.position)? {
            Some((annotation, next_position)) => {
                self.position = next_position;
                Ok(Some(annotation))
            }
            None => Ok(None),
        }
    }

    /// Reads the next annotation without advancing.
    pub fn peek(&self) -> IonResult<Option<RawAnnotation<'a>>> {
        Ok(self.read_at(self.position)?.map(|(annotation, _)| annotation))
    }

    /// Consumes the remaining annotations, collecting their text. Annotations with unknown text
    /// are `None`.
    pub fn to_vec(&mut self) -> IonResult<Vec<Option<&'a str>>> {
        let mut texts = Vec::new();
        while let Some(annotation) = self.next_annotation()? {
            texts.push(annotation.text());
        }
        Ok(texts)
    }

    fn read_at(&self, position: usize) -> IonResult<Option<(RawAnnotation<'a>, usize)>> {
        if position >= self.limit {
            return Ok(None);
        }
        let (annotation, size) = match self.opcode {
            0xE4..=0xE6 => {
                let flex_uint = FlexUInt::read_at(self.source, position)?;
                let sid = as_usize(flex_uint.value(), position)?;
                let text = self.symbols.text_for(sid)?;
                (RawAnnotation::new(Some(sid), text), flex_uint.size_in_bytes())
            }
            _ => {
                let flex_sym = FlexSym::read_at(self.source, position)?;
                let annotation = match flex_sym.value() {
                    FlexSymValue::SymbolId(sid) => {
                        RawAnnotation::new(Some(sid), self.symbols.text_for(sid)?)
                    }
                    FlexSymValue::Text(text) => RawAnnotation::new(None, Some(text)),
                    FlexSymValue::SystemSymbol(0) => RawAnnotation::new(Some(0), None),
                    FlexSymValue::SystemSymbol(address) => {
                        RawAnnotation::new(None, system_symbol_text(address)?)
                    }
                };
                (annotation, flex_sym.size_in_bytes())
            }
        };
        let next_position = position + size;
        if next_position > self.limit {
            return IonResult::decoding_error(format!(
                "found an annotation at offset {position} that runs past the end of its sequence"
            ));
        }
        Ok(Some((annotation, next_position)))
    }
}

impl<'a> Iterator for AnnotationsIterator<'a> {
    type Item = IonResult<RawAnnotation<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_annotation().transpose()
    }
}

impl<'a> ValueReader<'a> {
    /// Reads the current annotations token. The reader moves on to the annotated value, which is
    /// produced by the next call to [`next_token`](Self::next_token).
    pub fn annotations(
        &mut self,
        pool: &mut ResourcePool<'a>,
    ) -> IonResult<Box<AnnotationsIterator<'a>>> {
        let opcode = self.expect_opcode(TokenType::Annotations)?;
        let length = value_length(self.source, opcode, self.position, self.context())?;
        self.check_end(self.position, self.position + length, "an annotations sequence")?;
        let annotations =
            pool.get_annotations(opcode, self.position, length, self.config.symbol_table())?;
        self.position += length;
        self.state = ReaderState::AfterAnnotations;
        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IonError, ReadConfig};
    use rstest::rstest;

    fn read_annotations(input: &[u8]) -> IonResult<Vec<RawAnnotation<'_>>> {
        let mut pool = ResourcePool::new(input);
        let mut reader = pool.stream_reader(&ReadConfig::new());
        assert_eq!(reader.next_token()?, TokenType::Annotations);
        let annotations = reader.annotations(&mut pool)?;
        annotations.collect()
    }

    #[rstest]
    #[case::one_sid(&[0xE4, 0x09, 0x6E], &[(Some(4), Some("name"))])]
    #[case::two_sids(&[0xE5, 0x09, 0x0B, 0x6E], &[(Some(4), Some("name")), (Some(5), Some("version"))])]
    #[case::sid_zero(&[0xE4, 0x01, 0x6E], &[(Some(0), None)])]
    #[case::sid_sequence(&[0xE6, 0x07, 0x09, 0x0B, 0x01, 0x6E], &[(Some(4), Some("name")), (Some(5), Some("version")), (Some(0), None)])]
    #[case::one_flex_sym_text(&[0xE7, 0xFB, b'f', b'o', b'o', 0x6E], &[(None, Some("foo"))])]
    #[case::two_flex_syms(&[0xE8, 0x09, 0xFF, b'b', 0x6E], &[(Some(4), Some("name")), (None, Some("b"))])]
    #[case::flex_sym_zero(&[0xE7, 0x01, 0x60, 0x6E], &[(Some(0), None)])]
    #[case::flex_sym_system_symbol(&[0xE7, 0x01, 0x6A, 0x6E], &[(None, Some("$ion_encoding"))])]
    #[case::flex_sym_sequence(&[0xE9, 0x0B, 0xFF, b'a', 0x09, 0xFF, b'b', 0x6E], &[(None, Some("a")), (Some(4), Some("name")), (None, Some("b"))])]
    fn read_annotation_sequences(
        #[case] input: &[u8],
        #[case] expected: &[(Option<SymbolId>, Option<&str>)],
    ) -> IonResult<()> {
        let expected: Vec<_> = expected
            .iter()
            .map(|(sid, text)| RawAnnotation::new(*sid, *text))
            .collect();
        assert_eq!(read_annotations(input)?, expected);
        Ok(())
    }

    #[test]
    fn annotations_are_followed_by_their_value() -> IonResult<()> {
        let input = [0xE7, 0xFF, b'a', 0x61, 0x05];
        let mut pool = ResourcePool::new(&input);
        let mut reader = pool.stream_reader(&ReadConfig::new());
        reader.next_token()?;
        let mut annotations = reader.annotations(&mut pool)?;
        assert!(annotations.has_next());
        assert_eq!(annotations.peek()?, Some(RawAnnotation::new(None, Some("a"))));
        assert_eq!(annotations.to_vec()?, vec![Some("a")]);
        assert!(!annotations.has_next());
        assert_eq!(annotations.next_annotation()?, None);
        assert!(annotations.to_vec()?.is_empty());
        pool.close_annotations(annotations)?;

        assert_eq!(reader.next_token()?, TokenType::Int);
        assert_eq!(reader.i64_value()?, 5);
        Ok(())
    }

    #[test]
    fn skipping_annotations_leaves_the_value() -> IonResult<()> {
        let input = [0xE5, 0x09, 0x0B, 0x91, b'z'];
        let mut pool = ResourcePool::new(&input);
        let mut reader = pool.stream_reader(&ReadConfig::new());
        assert_eq!(reader.next_token()?, TokenType::Annotations);
        assert_eq!(reader.next_token()?, TokenType::String);
        assert_eq!(reader.string_value()?, "z");
        Ok(())
    }

    #[test]
    fn unknown_annotation_sid_is_an_error() -> IonResult<()> {
        let input = [0xE4, 0xF1, 0x6E];
        assert!(matches!(read_annotations(&input), Err(IonError::Decoding(_))));
        Ok(())
    }

    #[test]
    fn annotation_overrunning_its_sequence() {
        // The byte-length prefix covers one byte, but the FlexSym needs two.
        let input = [0xE9, 0x03, 0xFF, b'a', 0x6E];
        assert!(matches!(read_annotations(&input), Err(IonError::Decoding(_))));
    }
}
