use crate::IonType;

/// The kind of item a reader is positioned on after a call to `next_token()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    String,
    Symbol,
    Blob,
    Clob,
    List,
    SExp,
    Struct,
    Annotations,
    FieldName,
    Nop,
    Ivm,
    MacroInvocation,
    ExpressionGroup,
    AbsentArgument,
    End,
    /// The opcode is reserved. Readers report a decoding error instead of producing this token.
    Reserved,
}

impl TokenType {
    /// Returns the Ion data model type of a value token. Typed nulls report `Null` here; use
    /// the reader's `ion_type()` to see the type of the null.
    pub fn ion_type(&self) -> Option<IonType> {
        use TokenType::*;
        let ion_type = match self {
            Null => IonType::Null,
            Bool => IonType::Bool,
            Int => IonType::Int,
            Float => IonType::Float,
            Decimal => IonType::Decimal,
            Timestamp => IonType::Timestamp,
            String => IonType::String,
            Symbol => IonType::Symbol,
            Blob => IonType::Blob,
            Clob => IonType::Clob,
            List => IonType::List,
            SExp => IonType::SExp,
            Struct => IonType::Struct,
            _ => return None,
        };
        Some(ion_type)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, TokenType::List | TokenType::SExp | TokenType::Struct)
    }
}

/// How the number of bytes that follow an opcode is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// The opcode is always followed by this many bytes.
    Fixed(usize),
    /// The opcode is followed by a FlexUInt length and then that many bytes.
    FlexUIntFollows,
    /// The length can only be found by parsing what follows: SIDs and annotations encoded as
    /// FlexUInts or FlexSyms, delimited containers and macro invocations.
    Computed,
    /// The opcode is reserved.
    Invalid,
}

/// The information that can be derived from an opcode byte alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub byte: u8,
    pub token_type: TokenType,
    pub length_class: LengthClass,
}

/// A statically defined array of [`Opcode`]s that allows a reader to map a given byte (`u8`) to
/// its token type and length class without any masking or bit shifting.
pub(crate) static ION_1_1_OPCODES: &[Opcode; 256] = &init_opcode_table();

const DEFAULT_OPCODE: Opcode = Opcode {
    byte: 0,
    token_type: TokenType::Reserved,
    length_class: LengthClass::Invalid,
};

const fn init_opcode_table() -> [Opcode; 256] {
    let mut jump_table = [DEFAULT_OPCODE; 256];
    let mut index: usize = 0;
    while index < 256 {
        jump_table[index] = Opcode::from_byte(index as u8);
        index += 1;
    }
    jump_table
}

/// Body lengths of the short-form timestamps `0x80`-`0x8C`.
const SHORT_TIMESTAMP_LENGTHS: [usize; 13] = [1, 2, 2, 4, 5, 6, 7, 8, 5, 5, 7, 8, 9];

impl Opcode {
    pub const fn from_byte(byte: u8) -> Opcode {
        use LengthClass::*;
        use TokenType::*;
        let low_nibble = (byte & 0x0F) as usize;
        let (token_type, length_class) = match byte {
            0x00..=0x3F => (MacroInvocation, Computed),
            0x40..=0x4F => (MacroInvocation, Computed),
            0x50..=0x5F => (MacroInvocation, Computed),
            0x60..=0x68 => (Int, Fixed(low_nibble)),
            0x69 => (Reserved, Invalid),
            0x6A => (Float, Fixed(0)),
            0x6B => (Float, Fixed(2)),
            0x6C => (Float, Fixed(4)),
            0x6D => (Float, Fixed(8)),
            0x6E | 0x6F => (Bool, Fixed(0)),
            0x70..=0x7F => (Decimal, Fixed(low_nibble)),
            0x80..=0x8C => (Timestamp, Fixed(SHORT_TIMESTAMP_LENGTHS[low_nibble])),
            0x8D..=0x8F => (Reserved, Invalid),
            0x90..=0x9F => (String, Fixed(low_nibble)),
            0xA0..=0xAF => (Symbol, Fixed(low_nibble)),
            0xB0..=0xBF => (List, Fixed(low_nibble)),
            0xC0..=0xCF => (SExp, Fixed(low_nibble)),
            0xD0 => (Struct, Fixed(0)),
            0xD1 => (Reserved, Invalid),
            0xD2..=0xDF => (Struct, Fixed(low_nibble)),
            0xE0 => (Ivm, Fixed(3)),
            0xE1 => (Symbol, Fixed(1)),
            0xE2 => (Symbol, Fixed(2)),
            0xE3 => (Symbol, Computed),
            0xE4..=0xE9 => (Annotations, Computed),
            0xEA => (Null, Fixed(0)),
            0xEB => (Null, Fixed(1)),
            0xEC => (Nop, Fixed(0)),
            0xED => (Nop, FlexUIntFollows),
            0xEE => (Symbol, Fixed(1)),
            0xEF => (MacroInvocation, Computed),
            0xF0 => (End, Fixed(0)),
            0xF1 => (List, Computed),
            0xF2 => (SExp, Computed),
            0xF3 => (Struct, Computed),
            0xF4 | 0xF5 => (MacroInvocation, Computed),
            0xF6 => (Int, FlexUIntFollows),
            0xF7 => (Decimal, FlexUIntFollows),
            0xF8 => (Timestamp, FlexUIntFollows),
            0xF9 => (String, FlexUIntFollows),
            0xFA => (Symbol, FlexUIntFollows),
            0xFB => (List, FlexUIntFollows),
            0xFC => (SExp, FlexUIntFollows),
            0xFD => (Struct, FlexUIntFollows),
            0xFE => (Blob, FlexUIntFollows),
            0xFF => (Clob, FlexUIntFollows),
        };
        Opcode {
            byte,
            token_type,
            length_class,
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.length_class == LengthClass::Invalid
    }

    pub fn is_annotations(&self) -> bool {
        self.token_type == TokenType::Annotations
    }

    pub fn is_delimited_start(&self) -> bool {
        matches!(self.byte, 0xF1..=0xF3)
    }
}

/// Returns the [`Opcode`] for `byte`.
#[inline]
pub fn opcode_for(byte: u8) -> Opcode {
    ION_1_1_OPCODES[byte as usize]
}
