use crate::macro_table::MacroTable;
use crate::symbol_table::SymbolTable;

/// The deepest nesting of delimited containers that the delimited-container scanner can track.
pub const MAX_DELIMITED_DEPTH: usize = 63;

/// Provides configuration details for reader construction.
///
/// By default, a stream starts with the Ion 1.1 system symbol and macro tables. Callers that own
/// an encoding context (for example, one that processes encoding directives) can supply their own
/// tables instead.
#[derive(Debug, Clone, Copy)]
pub struct ReadConfig<'a> {
    symbol_table: &'a SymbolTable,
    macro_table: &'a MacroTable,
    max_delimited_depth: usize,
}

impl Default for ReadConfig<'static> {
    fn default() -> Self {
        ReadConfig::new()
    }
}

impl ReadConfig<'static> {
    pub fn new() -> Self {
        ReadConfig {
            symbol_table: SymbolTable::system(),
            macro_table: MacroTable::system(),
            max_delimited_depth: MAX_DELIMITED_DEPTH,
        }
    }
}

impl<'a> ReadConfig<'a> {
    pub fn with_symbol_table<'b>(self, symbol_table: &'b SymbolTable) -> ReadConfig<'b>
    where
        'a: 'b,
    {
        ReadConfig {
            symbol_table,
            macro_table: self.macro_table,
            max_delimited_depth: self.max_delimited_depth,
        }
    }

    pub fn with_macro_table<'b>(self, macro_table: &'b MacroTable) -> ReadConfig<'b>
    where
        'a: 'b,
    {
        ReadConfig {
            symbol_table: self.symbol_table,
            macro_table,
            max_delimited_depth: self.max_delimited_depth,
        }
    }

    /// Sets the deepest nesting of delimited containers that may be skipped. The value is clamped
    /// to `1..=MAX_DELIMITED_DEPTH`.
    pub fn with_max_delimited_depth(mut self, depth: usize) -> Self {
        self.max_delimited_depth = depth.clamp(1, MAX_DELIMITED_DEPTH);
        self
    }

    pub fn symbol_table(&self) -> &'a SymbolTable {
        self.symbol_table
    }

    pub fn macro_table(&self) -> &'a MacroTable {
        self.macro_table
    }

    pub fn max_delimited_depth(&self) -> usize {
        self.max_delimited_depth
    }
}
