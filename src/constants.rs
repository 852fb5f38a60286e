//! Ion 1.1 system symbols.

use crate::types::SymbolId;
use phf::phf_map;

/// The Ion 1.1 system symbol table's text, indexed by `address - 1`.
///
/// Address `0` is not present; it is the symbol with unknown text.
pub static SYSTEM_SYMBOLS: &[&str] = &[
    // <unknown text>               $0
    "$ion",                     //  $1
    "$ion_1_0",                 //  $2
    "$ion_symbol_table",        //  $3
    "name",                     //  $4
    "version",                  //  $5
    "imports",                  //  $6
    "symbols",                  //  $7
    "max_id",                   //  $8
    "$ion_shared_symbol_table", //  $9
    "$ion_encoding",            // $10
    "$ion_literal",             // $11
    "$ion_shared_module",       // $12
    "macro",                    // $13
    "macro_table",              // $14
    "symbol_table",             // $15
    "module",                   // $16
    "<REMOVE>",                 // $17 (see: ion-docs#345)
    "export",                   // $18
    "<REMOVE>",                 // $19 (see: ion-docs#345)
    "import",                   // $20
    "",                         // $21 (empty text)
    "literal",                  // $22
    "if_none",                  // $23
    "if_some",                  // $24
    "if_single",                // $25
    "if_multi",                 // $26
    "for",                      // $27
    "default",                  // $28
    "values",                   // $29
    "annotate",                 // $30
    "make_string",              // $31
    "make_symbol",              // $32
    "make_blob",                // $33
    "make_decimal",             // $34
    "make_timestamp",           // $35
    "make_list",                // $36
    "make_sexp",                // $37
    "make_struct",              // $38
    "parse_ion",                // $39
    "repeat",                   // $40
    "delta",                    // $41
    "flatten",                  // $42
    "sum",                      // $43
    "set_symbols",              // $44
    "add_symbols",              // $45
    "set_macros",               // $46
    "add_macros",               // $47
    "use",                      // $48
    "meta",                     // $49
    "flex_symbol",              // $50
    "flex_int",                 // $51
    "flex_uint",                // $52
    "uint8",                    // $53
    "uint16",                   // $54
    "uint32",                   // $55
    "uint64",                   // $56
    "int8",                     // $57
    "int16",                    // $58
    "int32",                    // $59
    "int64",                    // $60
    "float16",                  // $61
    "float32",                  // $62
    "float64",                  // $63
    "none",                     // $64
    "make_field",               // $65
];

/// The number of symbols in the Ion 1.1 system symbol table, not counting `$0`.
pub const SYSTEM_SYMBOL_COUNT: usize = 65;

/// A static, read-only map of text to Ion v1.1 system symbol addresses.
/// Because the set of string keys is known at compile time, this map is able to use a
/// perfect hashing function (PHF) to optimize lookup operations for those keys.
pub(crate) static SYSTEM_SYMBOL_TEXT_TO_ID: phf::Map<&str, usize> = phf_map! {
    "$ion"                     =>  1,
    "$ion_1_0"                 =>  2,
    "$ion_symbol_table"        =>  3,
    "name"                     =>  4,
    "version"                  =>  5,
    "imports"                  =>  6,
    "symbols"                  =>  7,
    "max_id"                   =>  8,
    "$ion_shared_symbol_table" =>  9,
    "$ion_encoding"            => 10,
    "$ion_literal"             => 11,
    "$ion_shared_module"       => 12,
    "macro"                    => 13,
    "macro_table"              => 14,
    "symbol_table"             => 15,
    "module"                   => 16,
    // ion-docs#345            => 17,
    "export"                   => 18,
    // ion-docs#345            => 19,
    "import"                   => 20,
    ""                         => 21,
    "literal"                  => 22,
    "if_none"                  => 23,
    "if_some"                  => 24,
    "if_single"                => 25,
    "if_multi"                 => 26,
    "for"                      => 27,
    "default"                  => 28,
    "values"                   => 29,
    "annotate"                 => 30,
    "make_string"              => 31,
    "make_symbol"              => 32,
    "make_blob"                => 33,
    "make_decimal"             => 34,
    "make_timestamp"           => 35,
    "make_list"                => 36,
    "make_sexp"                => 37,
    "make_struct"              => 38,
    "parse_ion"                => 39,
    "repeat"                   => 40,
    "delta"                    => 41,
    "flatten"                  => 42,
    "sum"                      => 43,
    "set_symbols"              => 44,
    "add_symbols"              => 45,
    "set_macros"               => 46,
    "add_macros"               => 47,
    "use"                      => 48,
    "meta"                     => 49,
    "flex_symbol"              => 50,
    "flex_int"                 => 51,
    "flex_uint"                => 52,
    "uint8"                    => 53,
    "uint16"                   => 54,
    "uint32"                   => 55,
    "uint64"                   => 56,
    "int8"                     => 57,
    "int16"                    => 58,
    "int32"                    => 59,
    "int64"                    => 60,
    "float16"                  => 61,
    "float32"                  => 62,
    "float64"                  => 63,
    "none"                     => 64,
    "make_field"               => 65,
};

pub fn address_for_text(text: &str) -> Option<SymbolId> {
    SYSTEM_SYMBOL_TEXT_TO_ID.get(text).copied()
}

/// Returns the text of the system symbol at `address`. Address `0` and addresses beyond the end
/// of the table have no text.
pub fn symbol_text_for_address(address: SymbolId) -> Option<&'static str> {
    address
        .checked_sub(1)
        .and_then(|index| SYSTEM_SYMBOLS.get(index))
        .copied()
}
