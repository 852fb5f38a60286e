//! Macro signatures as seen by the binary reader.
//!
//! The reader never expands a macro; it only needs each macro's parameter list to know how many
//! presence bits to read and how many arguments follow an e-expression's address.

use std::borrow::Cow;
use std::sync::OnceLock;

pub type MacroAddress = usize;

/// The number of values that may be passed to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// `!` The argument is always present and never consumes a presence-bitmap entry.
    ExactlyOne,
    /// `?`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Cardinality {
    /// Returns `true` if arguments for parameters with this cardinality are preceded by a
    /// 2-bit entry in the e-expression's presence bitmap.
    #[inline]
    pub const fn uses_presence_bits(&self) -> bool {
        !matches!(self, Cardinality::ExactlyOne)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: Cow<'static, str>,
    cardinality: Cardinality,
}

impl Parameter {
    pub fn new(name: impl Into<Cow<'static, str>>, cardinality: Cardinality) -> Self {
        Parameter {
            name: name.into(),
            cardinality,
        }
    }

    const fn system(name: &'static str, cardinality: Cardinality) -> Self {
        Parameter {
            name: Cow::Borrowed(name),
            cardinality,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }
}

/// A macro's name and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    name: Option<Cow<'static, str>>,
    signature: Cow<'static, [Parameter]>,
    presence_bytes_required: usize,
}

impl MacroDef {
    pub fn new(name: Option<impl Into<Cow<'static, str>>>, signature: Vec<Parameter>) -> Self {
        let presence_bytes_required = presence_bytes_for(&signature);
        MacroDef {
            name: name.map(Into::into),
            signature: Cow::Owned(signature),
            presence_bytes_required,
        }
    }

    const fn system(name: &'static str, signature: &'static [Parameter]) -> Self {
        MacroDef {
            name: Some(Cow::Borrowed(name)),
            signature: Cow::Borrowed(signature),
            presence_bytes_required: presence_bytes_for(signature),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn signature(&self) -> &[Parameter] {
        self.signature.as_ref()
    }

    /// The number of presence-bitmap bytes that precede this macro's arguments in an
    /// e-expression: two bits for each parameter that is not `ExactlyOne`, rounded up to a whole
    /// byte.
    pub fn presence_bytes_required(&self) -> usize {
        self.presence_bytes_required
    }
}

const fn presence_bytes_for(signature: &[Parameter]) -> usize {
    let mut count: usize = 0;
    let mut index = 0;
    while index < signature.len() {
        if signature[index].cardinality.uses_presence_bits() {
            count += 1;
        }
        index += 1;
    }
    (count * 2).div_ceil(8)
}

/// An ordered collection of macros, indexed by address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroTable {
    macros: Vec<MacroDef>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table whose first entries are the system macros, in address order.
    pub fn with_system_macros() -> Self {
        MacroTable {
            macros: SYSTEM_MACROS.to_vec(),
        }
    }

    /// The table installed at the start of a stream and after each IVM.
    pub fn system() -> &'static MacroTable {
        static SYSTEM_TABLE: OnceLock<MacroTable> = OnceLock::new();
        SYSTEM_TABLE.get_or_init(MacroTable::with_system_macros)
    }

    /// Appends `definition` to the table, returning its address.
    pub fn add_macro(&mut self, definition: MacroDef) -> MacroAddress {
        let address = self.macros.len();
        self.macros.push(definition);
        address
    }

    #[inline]
    pub fn macro_at_address(&self, address: MacroAddress) -> Option<&MacroDef> {
        self.macros.get(address)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

/// Returns the system macro invoked by `0xEF` followed by `address`.
#[inline]
pub fn system_macro(address: MacroAddress) -> Option<&'static MacroDef> {
    SYSTEM_MACROS.get(address)
}

use Cardinality::{ExactlyOne as One, ZeroOrMore as Many, ZeroOrOne as Optional};

const NO_PARAMS: &[Parameter] = &[];
const VALUES: &[Parameter] = &[Parameter::system("values", Many)];
const DEFAULT: &[Parameter] = &[
    Parameter::system("expr", Many),
    Parameter::system("default_expr", Many),
];
const META: &[Parameter] = &[Parameter::system("anything", Many)];
const REPEAT: &[Parameter] = &[
    Parameter::system("n", One),
    Parameter::system("value", Many),
];
const SEQUENCES: &[Parameter] = &[Parameter::system("sequences", Many)];
const DELTA: &[Parameter] = &[Parameter::system("deltas", Many)];
const SUM: &[Parameter] = &[Parameter::system("a", One), Parameter::system("b", One)];
const ANNOTATE: &[Parameter] = &[
    Parameter::system("annotations", Many),
    Parameter::system("value", One),
];
const CONTENT: &[Parameter] = &[Parameter::system("content", Many)];
const MAKE_DECIMAL: &[Parameter] = &[
    Parameter::system("coefficient", One),
    Parameter::system("exponent", One),
];
const MAKE_TIMESTAMP: &[Parameter] = &[
    Parameter::system("year", One),
    Parameter::system("month", Optional),
    Parameter::system("day", Optional),
    Parameter::system("hour", Optional),
    Parameter::system("minute", Optional),
    Parameter::system("second", Optional),
    Parameter::system("offset_minutes", Optional),
];
const BYTES: &[Parameter] = &[Parameter::system("bytes", Many)];
const MAKE_FIELD: &[Parameter] = &[
    Parameter::system("field_name", One),
    Parameter::system("value", One),
];
const STRUCTS: &[Parameter] = &[Parameter::system("structs", Many)];
const DATA: &[Parameter] = &[Parameter::system("data", Many)];
const SYMBOLS: &[Parameter] = &[Parameter::system("symbols", Many)];
const MACROS: &[Parameter] = &[Parameter::system("macros", Many)];
const USE: &[Parameter] = &[
    Parameter::system("catalog_key", One),
    Parameter::system("version", Optional),
];

static SYSTEM_MACROS: &[MacroDef] = &[
    MacroDef::system("none", NO_PARAMS),
    MacroDef::system("values", VALUES),
    MacroDef::system("default", DEFAULT),
    MacroDef::system("meta", META),
    MacroDef::system("repeat", REPEAT),
    MacroDef::system("flatten", SEQUENCES),
    MacroDef::system("delta", DELTA),
    MacroDef::system("sum", SUM),
    MacroDef::system("annotate", ANNOTATE),
    MacroDef::system("make_string", CONTENT),
    MacroDef::system("make_symbol", CONTENT),
    MacroDef::system("make_decimal", MAKE_DECIMAL),
    MacroDef::system("make_timestamp", MAKE_TIMESTAMP),
    MacroDef::system("make_blob", BYTES),
    MacroDef::system("make_list", SEQUENCES),
    MacroDef::system("make_sexp", SEQUENCES),
    MacroDef::system("make_field", MAKE_FIELD),
    MacroDef::system("make_struct", STRUCTS),
    MacroDef::system("parse_ion", DATA),
    MacroDef::system("set_symbols", SYMBOLS),
    MacroDef::system("add_symbols", SYMBOLS),
    MacroDef::system("set_macros", MACROS),
    MacroDef::system("add_macros", MACROS),
    MacroDef::system("use", USE),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn optional_params(count: usize) -> Vec<Parameter> {
        (0..count)
            .map(|i| Parameter::new(format!("p{i}"), Cardinality::ZeroOrOne))
            .collect()
    }

    #[rstest]
    #[case::no_params(0, 0)]
    #[case::one_param(1, 1)]
    #[case::four_params(4, 1)]
    #[case::five_params(5, 2)]
    #[case::eight_params(8, 2)]
    #[case::nine_params(9, 3)]
    fn presence_bytes(#[case] optional: usize, #[case] expected_bytes: usize) {
        let definition = MacroDef::new(Some("m"), optional_params(optional));
        assert_eq!(definition.presence_bytes_required(), expected_bytes);
    }

    #[test]
    fn exactly_one_params_do_not_need_presence_bits() {
        let definition = MacroDef::new(
            None::<&'static str>,
            vec![
                Parameter::new("a", Cardinality::ExactlyOne),
                Parameter::new("b", Cardinality::ExactlyOne),
            ],
        );
        assert_eq!(definition.presence_bytes_required(), 0);
    }

    #[rstest]
    #[case::none(0, "none", 0)]
    #[case::values(1, "values", 1)]
    #[case::sum(7, "sum", 2)]
    #[case::make_timestamp(12, "make_timestamp", 7)]
    #[case::use_macro(23, "use", 2)]
    fn system_macro_signatures(
        #[case] address: MacroAddress,
        #[case] name: &str,
        #[case] num_params: usize,
    ) {
        let definition = system_macro(address).unwrap();
        assert_eq!(definition.name(), Some(name));
        assert_eq!(definition.signature().len(), num_params);
        assert_eq!(MacroTable::system().macro_at_address(address), Some(definition));
    }

    #[test]
    fn make_timestamp_needs_two_presence_bytes() {
        // Six optional parameters need twelve bits.
        assert_eq!(system_macro(12).unwrap().presence_bytes_required(), 2);
    }
}
