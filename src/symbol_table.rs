use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use std::sync::OnceLock;

use crate::constants::{self, SYSTEM_SYMBOLS};
use crate::result::IonFailure;
use crate::types::SymbolId;
use crate::IonResult;

/// Stores the mapping from symbol IDs to (optional) text that is active while reading a stream.
///
/// Slot `0` always exists and never has text. Readers hold a shared reference to the table that
/// was active when they were created; an IVM swaps the reference for [`SymbolTable::system`]
/// rather than modifying a table in place.
// SymbolTable instances always contain `$0`; they are never empty.
#[allow(clippy::len_without_is_empty)]
#[derive(Clone, PartialEq)]
pub struct SymbolTable {
    symbols_by_id: Vec<Option<Cow<'static, str>>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table containing only `$0`.
    pub fn new() -> Self {
        SymbolTable {
            symbols_by_id: vec![None],
        }
    }

    /// Creates a table containing `$0` followed by the Ion 1.1 system symbols. Symbols added to
    /// the returned table are assigned IDs after the last system symbol.
    pub fn with_system_symbols() -> Self {
        let mut symbols_by_id = Vec::with_capacity(SYSTEM_SYMBOLS.len() + 1);
        symbols_by_id.push(None);
        symbols_by_id.extend(SYSTEM_SYMBOLS.iter().map(|text| Some(Cow::Borrowed(*text))));
        SymbolTable { symbols_by_id }
    }

    /// The table installed at the start of a stream and after each IVM.
    pub fn system() -> &'static SymbolTable {
        static SYSTEM_TABLE: OnceLock<SymbolTable> = OnceLock::new();
        SYSTEM_TABLE.get_or_init(SymbolTable::with_system_symbols)
    }

    /// Appends `text` to the table, returning its symbol ID.
    pub fn add_symbol(&mut self, text: impl Into<Cow<'static, str>>) -> SymbolId {
        let sid = self.symbols_by_id.len();
        self.symbols_by_id.push(Some(text.into()));
        sid
    }

    /// Appends a slot with unknown text, returning its symbol ID.
    pub fn add_placeholder(&mut self) -> SymbolId {
        let sid = self.symbols_by_id.len();
        self.symbols_by_id.push(None);
        sid
    }

    /// Returns the number of symbols in the table **including `$0`**.
    pub fn len(&self) -> usize {
        self.symbols_by_id.len()
    }

    /// Returns the text associated with `sid`, or `None` if that slot has unknown text.
    ///
    /// A symbol ID past the end of the table is a decoding error.
    #[inline]
    pub fn text_for(&self, sid: SymbolId) -> IonResult<Option<&str>> {
        match self.symbols_by_id.get(sid) {
            Some(text) => Ok(text.as_deref()),
            None => IonResult::decoding_error(format!(
                "found symbol ID ${sid}, but the symbol table only has {} entries",
                self.symbols_by_id.len()
            )),
        }
    }

    /// Returns the ID of the first symbol whose text is `text`, if any.
    pub fn sid_for(&self, text: &str) -> Option<SymbolId> {
        if std::ptr::eq(self, SymbolTable::system()) {
            return constants::address_for_text(text);
        }
        self.symbols_by_id
            .iter()
            .position(|symbol| symbol.as_deref() == Some(text))
    }
}

impl Debug for SymbolTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymbolTable (len={}) ", self.len())?;
        f.debug_list().entries(self.symbols_by_id.iter()).finish()
    }
}

/// Resolves the text of a system symbol referenced by its address, as done by the `0xEE` opcode
/// and by FlexSym escapes. Address `0` is `$0`.
pub(crate) fn system_symbol_text(address: usize) -> IonResult<Option<&'static str>> {
    if address == 0 {
        return Ok(None);
    }
    match constants::symbol_text_for_address(address) {
        Some(text) => Ok(Some(text)),
        None => IonResult::decoding_error(format!(
            "found system symbol address {address}, but the system symbol table only has {} entries",
            constants::SYSTEM_SYMBOL_COUNT
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_zero_has_no_text() -> IonResult<()> {
        let table = SymbolTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.text_for(0)?, None);
        Ok(())
    }

    #[test]
    fn user_symbols_follow_system_symbols() -> IonResult<()> {
        let mut table = SymbolTable::with_system_symbols();
        let foo = table.add_symbol("foo");
        let unknown = table.add_placeholder();
        assert_eq!(foo, 66);
        assert_eq!(table.text_for(1)?, Some("$ion"));
        assert_eq!(table.text_for(foo)?, Some("foo"));
        assert_eq!(table.text_for(unknown)?, None);
        assert_eq!(table.sid_for("foo"), Some(foo));
        assert!(table.text_for(unknown + 1).is_err());
        Ok(())
    }

    #[test]
    fn system_symbol_addresses() -> IonResult<()> {
        assert_eq!(system_symbol_text(0)?, None);
        assert_eq!(system_symbol_text(10)?, Some("$ion_encoding"));
        assert!(system_symbol_text(200).is_err());
        Ok(())
    }
}
