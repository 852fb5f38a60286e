//! Computes where an encoded value ends without materializing it.
//!
//! Most opcodes have a length that is either fixed or given by a FlexUInt prefix. The rest
//! (FlexUInt-encoded symbol IDs, annotation sequences, delimited containers and e-expressions)
//! have a length calculator that parses just enough of the encoding to find the end.

use std::cmp::Ordering;

use log::debug;

use crate::binary::v1_1::flex_int::FlexInt;
use crate::binary::v1_1::flex_sym::FlexSym;
use crate::binary::v1_1::flex_uint::FlexUInt;
use crate::binary::v1_1::opcode::{opcode_for, LengthClass, Opcode};
use crate::macro_table::{system_macro, MacroAddress, MacroDef, MacroTable};
use crate::read_config::{ReadConfig, MAX_DELIMITED_DEPTH};
use crate::result::IonFailure;
use crate::IonResult;

/// The settings a length calculator needs: the macros that e-expressions may invoke and the
/// deepest nesting to accept.
///
/// `depth` counts the delimited containers and e-expressions that enclose the bytes being skipped.
/// Both kinds of nesting draw from the same `max_depth` budget.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SkipContext<'a> {
    pub(crate) macros: &'a MacroTable,
    pub(crate) max_depth: usize,
    pub(crate) depth: usize,
}

impl<'a> SkipContext<'a> {
    pub(crate) fn new(config: &ReadConfig<'a>) -> Self {
        SkipContext {
            macros: config.macro_table(),
            max_depth: config.max_delimited_depth().clamp(1, MAX_DELIMITED_DEPTH),
            depth: 0,
        }
    }

    /// Returns a context for bytes nested `levels` deeper than this one.
    fn nested(self, levels: usize, position: usize) -> IonResult<Self> {
        let depth = self.depth + levels;
        if depth > self.max_depth {
            return IonResult::decoding_error(format!(
                "containers and e-expressions nested more than {} levels deep at offset {position}",
                self.max_depth
            ));
        }
        Ok(SkipContext { depth, ..self })
    }
}

/// Given the source, the opcode and the position of the first byte after the opcode, returns
/// the number of bytes in the rest of the value.
pub(crate) type LengthCalculator = fn(&[u8], u8, usize, SkipContext) -> IonResult<usize>;

static LENGTH_CALCULATORS: [LengthCalculator; 256] = init_length_calculators();

const fn init_length_calculators() -> [LengthCalculator; 256] {
    let mut table: [LengthCalculator; 256] = [reserved_opcode as LengthCalculator; 256];
    let mut index: usize = 0;
    while index < 256 {
        table[index] = calculator_for(index as u8);
        index += 1;
    }
    table
}

const fn calculator_for(byte: u8) -> LengthCalculator {
    match byte {
        0xE3 | 0xE4 => one_flex_uint,
        0xE5 => two_flex_uints,
        0xE6 | 0xE9 => flex_uint_length_prefix,
        0xE7 => one_flex_sym,
        0xE8 => two_flex_syms,
        0xF1 | 0xF2 => delimited_sequence,
        0xF3 => delimited_struct,
        0x00..=0x5F | 0xEF | 0xF4 | 0xF5 => e_expression,
        _ => match Opcode::from_byte(byte).length_class {
            LengthClass::Fixed(_) => fixed_length,
            LengthClass::FlexUIntFollows => flex_uint_length_prefix,
            LengthClass::Computed | LengthClass::Invalid => reserved_opcode,
        },
    }
}

fn fixed_length(source: &[u8], opcode: u8, position: usize, context: SkipContext) -> IonResult<usize> {
    match opcode_for(opcode).length_class {
        LengthClass::Fixed(length) => Ok(length),
        _ => reserved_opcode(source, opcode, position, context),
    }
}

fn flex_uint_length_prefix(
    source: &[u8],
    _opcode: u8,
    position: usize,
    _: SkipContext,
) -> IonResult<usize> {
    let length = FlexUInt::read_at(source, position)?;
    Ok(length.size_in_bytes() + as_usize(length.value(), position)?)
}

fn one_flex_uint(source: &[u8], _opcode: u8, position: usize, _: SkipContext) -> IonResult<usize> {
    FlexUInt::size_at(source, position)
}

fn two_flex_uints(source: &[u8], _opcode: u8, position: usize, _: SkipContext) -> IonResult<usize> {
    let first = FlexUInt::size_at(source, position)?;
    let second = FlexUInt::size_at(source, position + first)?;
    Ok(first + second)
}

fn one_flex_sym(source: &[u8], _opcode: u8, position: usize, _: SkipContext) -> IonResult<usize> {
    FlexSym::encoded_size_at(source, position)
}

fn two_flex_syms(source: &[u8], _opcode: u8, position: usize, _: SkipContext) -> IonResult<usize> {
    let first = FlexSym::encoded_size_at(source, position)?;
    let second = FlexSym::encoded_size_at(source, position + first)?;
    Ok(first + second)
}

fn delimited_sequence(
    source: &[u8],
    _opcode: u8,
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    let end = seek_to_end_of_delimited(source, position, false, context)?;
    Ok(end - position)
}

fn delimited_struct(
    source: &[u8],
    _opcode: u8,
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    let end = seek_to_end_of_delimited(source, position, true, context)?;
    Ok(end - position)
}

fn e_expression(
    source: &[u8],
    opcode: u8,
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    let end = skip_macro(source, opcode, position, context)?;
    Ok(end - position)
}

fn reserved_opcode(_source: &[u8], opcode: u8, position: usize, _: SkipContext) -> IonResult<usize> {
    IonResult::decoding_error(format!(
        "found reserved opcode 0x{opcode:02X} before offset {position}"
    ))
}

/// Converts a decoded length to a `usize`.
#[inline]
pub(crate) fn as_usize(value: u64, position: usize) -> IonResult<usize> {
    match usize::try_from(value) {
        Ok(value) => Ok(value),
        Err(_) => IonResult::decoding_error(format!(
            "found a length of {value} at offset {position}, which does not fit in a usize"
        )),
    }
}

/// Returns the number of bytes in the value whose opcode is `opcode`, not counting the opcode
/// itself. `position` is the offset of the first byte after the opcode.
#[inline]
pub(crate) fn value_length(
    source: &[u8],
    opcode: u8,
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    LENGTH_CALCULATORS[opcode as usize](source, opcode, position, context)
}

/// Returns the position after the value whose opcode is `opcode` and whose body begins at
/// `position`.
pub fn skip(source: &[u8], opcode: u8, position: usize, config: &ReadConfig) -> IonResult<usize> {
    skip_value_body(source, opcode, position, SkipContext::new(config))
}

#[inline]
pub(crate) fn skip_value_body(
    source: &[u8],
    opcode: u8,
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    Ok(position + value_length(source, opcode, position, context)?)
}

/// Skips one tagged value that begins with its opcode at `position`, including any annotations
/// that precede it. Returns the position after the value.
pub(crate) fn skip_tagged_value(
    source: &[u8],
    mut position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    loop {
        let opcode = read_byte(source, position, "an opcode")?;
        position = skip_value_body(source, opcode, position + 1, context)?;
        if !opcode_for(opcode).is_annotations() {
            return Ok(position);
        }
    }
}

/// Returns the position after the `0xF0` that closes the delimited container whose first child
/// begins at `position`.
pub fn seek_to_end_of_delimited_container(
    source: &[u8],
    position: usize,
    is_struct: bool,
    config: &ReadConfig,
) -> IonResult<usize> {
    seek_to_end_of_delimited(source, position, is_struct, SkipContext::new(config))
}

pub(crate) fn seek_to_end_of_delimited(
    source: &[u8],
    mut position: usize,
    is_struct: bool,
    context: SkipContext,
) -> IonResult<usize> {
    // Each set bit in `struct_flags` marks a nesting level that is a struct. `depth` has a single
    // set bit for the current level.
    let mut depth: u64 = 1;
    let mut struct_flags: u64 = if is_struct { 1 } else { 0 };
    let levels_available = context.max_depth.saturating_sub(context.depth);
    if levels_available == 0 {
        return IonResult::decoding_error(format!(
            "containers and e-expressions nested more than {} levels deep at offset {position}",
            context.max_depth
        ));
    }
    let deepest_level: u64 = 1 << (levels_available - 1);
    let mut expect_field_name = is_struct;

    loop {
        if expect_field_name {
            let flex_int = FlexInt::read_at(source, position)?;
            position += flex_int.size_in_bytes();
            match flex_int.value().cmp(&0) {
                Ordering::Greater => {}
                Ordering::Less => position += flex_int.value().unsigned_abs() as usize,
                Ordering::Equal => {
                    let escape = read_byte(source, position, "a FlexSym escape")?;
                    position += 1;
                    if escape == 0xF0 {
                        depth >>= 1;
                        if depth == 0 {
                            return Ok(position);
                        }
                        expect_field_name = struct_flags & depth != 0;
                        continue;
                    }
                }
            }
        }

        let opcode = read_byte(source, position, "an opcode")?;
        position += 1;
        match opcode {
            0xF0 => {
                depth >>= 1;
                if depth == 0 {
                    return Ok(position);
                }
            }
            0xF1..=0xF3 => {
                if depth >= deepest_level {
                    return IonResult::decoding_error(format!(
                        "delimited containers nested more than {} levels deep at offset {}",
                        context.max_depth,
                        position - 1
                    ));
                }
                depth <<= 1;
                if opcode == 0xF3 {
                    struct_flags |= depth;
                } else {
                    struct_flags &= !depth;
                }
            }
            0xE4..=0xE9 => {
                // Annotations are followed by their value, not by another field name.
                position = skip_value_body(source, opcode, position, context)?;
                expect_field_name = false;
                continue;
            }
            _ => {
                position += match opcode_for(opcode).length_class {
                    LengthClass::Fixed(length) => length,
                    LengthClass::FlexUIntFollows => {
                        let length = FlexUInt::read_at(source, position)?;
                        length.size_in_bytes() + as_usize(length.value(), position)?
                    }
                    LengthClass::Computed | LengthClass::Invalid => {
                        let levels = depth.trailing_zeros() as usize + 1;
                        value_length(source, opcode, position, context.nested(levels, position)?)?
                    }
                };
            }
        }
        expect_field_name = struct_flags & depth != 0;
    }
}

/// Reads the address of the macro invoked by `opcode`. Returns the address, whether it refers to
/// the system macro table, and the position after the address.
pub(crate) fn read_macro_address(
    source: &[u8],
    opcode: u8,
    position: usize,
) -> IonResult<(MacroAddress, bool, usize)> {
    let address = match opcode {
        0x00..=0x3F => (opcode as usize, false, position),
        0x40..=0x4F => {
            // 12-bit address with a bias
            let bias = (opcode as usize & 0xF) * 256 + 64;
            let unbiased = read_byte(source, position, "a macro address")? as usize;
            (unbiased + bias, false, position + 1)
        }
        0x50..=0x5F => {
            // 20-bit address with a bias
            let bias = (opcode as usize & 0xF) * 65536 + 4160;
            let bytes = match source.get(position..position + 2) {
                Some(bytes) => bytes,
                None => return IonResult::incomplete("a macro address", position),
            };
            let unbiased = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
            (unbiased + bias, false, position + 2)
        }
        0xEF => {
            let address = read_byte(source, position, "a system macro address")? as usize;
            (address, true, position + 1)
        }
        0xF4 | 0xF5 => {
            let flex_uint = FlexUInt::read_at(source, position)?;
            let address = as_usize(flex_uint.value(), position)?;
            (address, false, position + flex_uint.size_in_bytes())
        }
        _ => {
            return IonResult::decoding_error(format!(
                "opcode 0x{opcode:02X} before offset {position} is not an e-expression"
            ))
        }
    };
    Ok(address)
}

/// Finds the definition of the macro at `address`.
pub(crate) fn resolve_macro(
    macros: &MacroTable,
    address: MacroAddress,
    is_system: bool,
    position: usize,
) -> IonResult<&MacroDef> {
    let definition = if is_system {
        system_macro(address)
    } else {
        macros.macro_at_address(address)
    };
    match definition {
        Some(definition) => Ok(definition),
        None => {
            debug!(
                "no {}macro at address {address} (e-expression at offset {position})",
                if is_system { "system " } else { "" }
            );
            IonResult::decoding_error(format!(
                "found an invocation of unknown macro address {address} at offset {position}"
            ))
        }
    }
}

/// Returns the 2-bit presence code for the `index`th parameter that uses presence bits.
#[inline]
pub(crate) fn presence_code(presence_bytes: &[u8], index: usize) -> u8 {
    (presence_bytes[index / 4] >> ((index % 4) * 2)) & 0b11
}

/// Returns the position after the e-expression whose opcode is `opcode` and whose body begins
/// at `position`.
pub(crate) fn skip_macro(
    source: &[u8],
    opcode: u8,
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    let (address, is_system, mut position) = read_macro_address(source, opcode, position)?;
    if opcode == 0xF5 {
        // Length-prefixed arguments
        let length = FlexUInt::read_at(source, position)?;
        return Ok(position + length.size_in_bytes() + as_usize(length.value(), position)?);
    }
    let context = context.nested(1, position)?;
    let definition = resolve_macro(context.macros, address, is_system, position)?;
    let signature = definition.signature();
    if signature.is_empty() {
        return Ok(position);
    }

    let num_presence_bytes = definition.presence_bytes_required();
    let presence_bytes = match source.get(position..position + num_presence_bytes) {
        Some(bytes) => bytes,
        None => return IonResult::incomplete("an e-expression presence bitmap", position),
    };
    position += num_presence_bytes;

    let mut presence_index = 0;
    for parameter in signature {
        let code = if parameter.cardinality().uses_presence_bits() {
            let code = presence_code(presence_bytes, presence_index);
            presence_index += 1;
            code
        } else {
            1
        };
        position = skip_argument(source, code, position, context)?;
    }
    Ok(position)
}

/// Skips one e-expression argument whose presence code is `code`.
pub(crate) fn skip_argument(
    source: &[u8],
    code: u8,
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    match code {
        0 => Ok(position),
        1 => skip_tagged_value(source, position, context),
        2 => skip_expression_group(source, position, context),
        _ => IonResult::decoding_error(format!(
            "Invalid presence bits value {code} for argument at offset {position}"
        )),
    }
}

/// Skips an expression group. A FlexUInt length of zero means the group's values follow
/// without a length and end with `0xF0`.
pub(crate) fn skip_expression_group(
    source: &[u8],
    position: usize,
    context: SkipContext,
) -> IonResult<usize> {
    let length = FlexUInt::read_at(source, position)?;
    let position = position + length.size_in_bytes();
    match length.value() {
        0 => seek_to_end_of_delimited(source, position, false, context),
        length => Ok(position + as_usize(length, position)?),
    }
}

#[inline]
pub(crate) fn read_byte(source: &[u8], position: usize, label: &'static str) -> IonResult<u8> {
    match source.get(position) {
        Some(byte) => Ok(*byte),
        None => IonResult::incomplete(label, position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macro_table::{Cardinality, Parameter};
    use crate::IonError;
    use rstest::rstest;

    fn context() -> SkipContext<'static> {
        SkipContext::new(&ReadConfig::new())
    }

    /// Skips the single value that starts at offset 0 of `input`.
    fn skip_first(input: &[u8]) -> IonResult<usize> {
        skip_value_body(input, input[0], 1, context())
    }

    #[rstest]
    #[case::int_zero(&[0x60])]
    #[case::int_two_bytes(&[0x62, 0x01, 0x02])]
    #[case::half_float(&[0x6B, 0x00, 0x3C])]
    #[case::bool(&[0x6E])]
    #[case::decimal(&[0x72, 0x03, 0x07])]
    #[case::short_timestamp(&[0x83, 0x35, 0x7D, 0x95, 0x06])]
    #[case::string(&[0x93, b'f', b'o', b'o'])]
    #[case::inline_symbol(&[0xA1, b'a'])]
    #[case::list(&[0xB2, 0x91, 0x61])]
    #[case::empty_struct(&[0xD0])]
    #[case::ivm(&[0xE0, 0x01, 0x01, 0xEA])]
    #[case::sid_u8(&[0xE1, 0x04])]
    #[case::sid_u16(&[0xE2, 0x01, 0x00])]
    #[case::sid_flex_uint(&[0xE3, 0x02, 0x01])]
    #[case::one_sid_annotation(&[0xE4, 0x07])]
    #[case::two_sid_annotations(&[0xE5, 0x07, 0x09])]
    #[case::sid_annotation_sequence(&[0xE6, 0x07, 0x07, 0x09, 0x0B])]
    #[case::one_flex_sym_annotation(&[0xE7, 0xFB, b'f', b'o', b'o'])]
    #[case::two_flex_sym_annotations(&[0xE8, 0x07, 0x01, 0x61])]
    #[case::flex_sym_annotation_sequence(&[0xE9, 0x09, 0xFF, b'a', 0x01, 0x61])]
    #[case::typed_null(&[0xEB, 0x05])]
    #[case::nop(&[0xEC])]
    #[case::nop_with_length(&[0xED, 0x05, 0x00, 0x00])]
    #[case::system_symbol(&[0xEE, 0x0A])]
    #[case::delimited_list(&[0xF1, 0x6E, 0x6E, 0xF0])]
    #[case::delimited_sexp_nested(&[0xF2, 0xF1, 0x60, 0xF0, 0xF2, 0xF0, 0xF0])]
    #[case::delimited_struct(&[0xF3, 0x09, 0x6E, 0xFF, b'a', 0x60, 0x01, 0xF0])]
    #[case::delimited_struct_in_list(&[0xF1, 0xF3, 0x09, 0xF1, 0xF0, 0x01, 0xF0, 0xF0])]
    #[case::delimited_struct_annotated_field(&[0xF3, 0x09, 0xE4, 0x07, 0x6E, 0x01, 0xF0])]
    #[case::big_int(&[0xF6, 0x05, 0x01, 0x02])]
    #[case::long_string(&[0xF9, 0x03, b'a'])]
    #[case::blob(&[0xFE, 0x07, 0x01, 0x02, 0x03])]
    #[case::system_macro_none(&[0xEF, 0x00])]
    #[case::system_macro_values_absent(&[0xEF, 0x01, 0x00])]
    #[case::system_macro_values_single(&[0xEF, 0x01, 0x01, 0x6E])]
    #[case::system_macro_values_group(&[0xEF, 0x01, 0x02, 0x05, 0x6E, 0x6F])]
    #[case::system_macro_values_delimited_group(&[0xEF, 0x01, 0x02, 0x01, 0x6E, 0xF1, 0xF0, 0xF0])]
    #[case::system_macro_sum(&[0xEF, 0x07, 0x61, 0x01, 0x61, 0x02])]
    #[case::length_prefixed_e_expression(&[0xF5, 0x03, 0x05, 0x6E, 0x6F])]
    fn skip_lands_after_value(#[case] input: &[u8]) -> IonResult<()> {
        assert_eq!(skip_first(input)?, input.len(), "for input {input:x?}");
        Ok(())
    }

    #[test]
    fn skip_ignores_trailing_bytes() -> IonResult<()> {
        let input = [0xB2, 0x91, 0x61, 0x6E];
        assert_eq!(skip_first(&input)?, 3);
        let delimited = [0xF1, 0x6E, 0x6E, 0xF0, 0x6E];
        assert_eq!(skip_first(&delimited)?, 4);
        Ok(())
    }

    #[test]
    fn delimited_scans_are_idempotent() -> IonResult<()> {
        let input = [0xF1, 0xF3, 0x09, 0xF2, 0x6E, 0xF0, 0x01, 0xF0, 0x61, 0x05, 0xF0];
        let first = seek_to_end_of_delimited(&input, 1, false, context())?;
        let second = seek_to_end_of_delimited(&input, 1, false, context())?;
        assert_eq!(first, input.len());
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn delimited_depth_is_bounded() {
        let config = ReadConfig::new().with_max_delimited_depth(3);
        let context = SkipContext::new(&config);
        let three_levels = [0xF1, 0xF1, 0xF0, 0xF0, 0xF0];
        assert_eq!(
            seek_to_end_of_delimited(&three_levels, 0, false, context).ok(),
            Some(three_levels.len())
        );
        let four_levels = [0xF1, 0xF1, 0xF1, 0xF0, 0xF0, 0xF0, 0xF0];
        assert!(matches!(
            seek_to_end_of_delimited(&four_levels, 0, false, context),
            Err(IonError::Decoding(_))
        ));
    }

    /// Encodes `levels` nested `(:sum ...)` invocations whose innermost arguments are `0`.
    fn nested_sums(levels: usize) -> Vec<u8> {
        let mut input = [0xEF, 0x07].repeat(levels);
        input.extend(std::iter::repeat(0x60).take(levels + 1));
        input
    }

    #[test]
    fn nested_e_expressions_are_bounded() -> IonResult<()> {
        let shallow = nested_sums(10);
        assert_eq!(skip_first(&shallow)?, shallow.len());
        let deep = nested_sums(MAX_DELIMITED_DEPTH + 1);
        assert!(matches!(skip_first(&deep), Err(IonError::Decoding(_))));
        // Far deeper than the call stack could follow
        let very_deep = nested_sums(200_000);
        assert!(matches!(skip_first(&very_deep), Err(IonError::Decoding(_))));
        Ok(())
    }

    /// Encodes `levels` delimited lists, each holding `(:values ...)` whose argument is a delimited
    /// expression group containing the next list.
    fn lists_in_expression_groups(levels: usize) -> Vec<u8> {
        let mut input = [0xF1, 0xEF, 0x01, 0x02, 0x01].repeat(levels);
        input.extend([0xF0, 0xF0].repeat(levels));
        input
    }

    #[test]
    fn expression_groups_share_the_depth_bound() -> IonResult<()> {
        let config = ReadConfig::new().with_max_delimited_depth(3);
        // list > e-expression > group
        let one_level = lists_in_expression_groups(1);
        assert_eq!(skip(&one_level, one_level[0], 1, &config)?, one_level.len());
        let ten_levels = lists_in_expression_groups(10);
        assert!(matches!(
            skip(&ten_levels, ten_levels[0], 1, &config),
            Err(IonError::Decoding(_))
        ));
        // The default bound accepts the same input.
        let default_config = ReadConfig::new();
        assert_eq!(
            skip(&ten_levels, ten_levels[0], 1, &default_config)?,
            ten_levels.len()
        );
        Ok(())
    }

    #[rstest]
    #[case::six_bit(&[0x12], 0x12, 1)]
    #[case::twelve_bit(&[0x41, 0x05], 256 + 64 + 5, 2)]
    #[case::twenty_bit(&[0x52, 0x01, 0x01], 2 * 65536 + 4160 + 257, 3)]
    #[case::flex_uint(&[0xF4, 0x03], 1, 2)]
    fn macro_addresses(
        #[case] input: &[u8],
        #[case] expected_address: usize,
        #[case] expected_end: usize,
    ) -> IonResult<()> {
        let (address, is_system, end) = read_macro_address(input, input[0], 1)?;
        assert_eq!(address, expected_address);
        assert!(!is_system);
        assert_eq!(end, expected_end);
        Ok(())
    }

    #[test]
    fn unknown_macro_address_is_an_error() {
        // The system macro table has no address 100.
        let input = [0xEF, 100];
        assert!(matches!(skip_first(&input), Err(IonError::Decoding(_))));
        // The default macro table has no user macros at address 0x3F.
        let input = [0x3F];
        assert!(matches!(skip_first(&input), Err(IonError::Decoding(_))));
    }

    #[test]
    fn invalid_presence_bits_are_an_error() {
        let input = [0xEF, 0x01, 0x03];
        assert!(matches!(skip_first(&input), Err(IonError::Decoding(_))));
    }

    #[test]
    fn fifth_optional_parameter_reads_the_second_presence_byte() -> IonResult<()> {
        let mut macros = MacroTable::new();
        let parameters = (0..5)
            .map(|i| Parameter::new(format!("p{i}"), Cardinality::ZeroOrOne))
            .collect();
        macros.add_macro(MacroDef::new(Some("five"), parameters));
        let config = ReadConfig::new().with_macro_table(&macros);
        // First four absent, fifth present in the low bits of the second byte.
        let input = [0x00, 0x00, 0x01, 0x6E];
        assert_eq!(skip(&input, input[0], 1, &config)?, input.len());
        Ok(())
    }

    #[rstest]
    #[case::reserved_0x69(&[0x69])]
    #[case::reserved_0x8f(&[0x8F, 0x00])]
    #[case::reserved_0xd1(&[0xD1])]
    fn reserved_opcodes_cannot_be_skipped(#[case] input: &[u8]) {
        assert!(matches!(skip_first(input), Err(IonError::Decoding(_))));
    }

    #[test]
    fn unterminated_delimited_container_is_incomplete() {
        let input = [0xF1, 0x6E, 0x6E];
        assert!(matches!(skip_first(&input), Err(IonError::Incomplete(_))));
    }
}
