//! Token types for the VHDL tokenizer and parser.
//!
//! [`Kind`] enumerates every lexical element of the supported dialect
//! versions: the 26 delimiters (simple and compound), identifiers, the
//! abstract/character/string/bit-string literals, and the full reserved-word
//! set. The classification predicates (`is_delimiter`, `is_keyword`, ...)
//! mirror the LRM's lexical-element chapters.

use vhdlsense_base::{Location, Symbol};

/// Supported VHDL language versions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum Version {
    Vhdl87,
    #[default]
    Vhdl93,
    Vhdl02,
    Vhdl08,
}

/// Token kind. The ordering is meaningful only in that every reserved word
/// sorts after [`Kind::KwAbs`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Kind {
    Invalid,
    Eof,

    // LRM93 13.2 delimiters and compound delimiters
    Concat,      // &
    Tick,        // '
    LeftPar,     // (
    RightPar,    // )
    Times,       // *
    Plus,        // +
    Comma,       // ,
    Minus,       // -
    Dot,         // .
    Div,         // /
    Colon,       // :
    Semicolon,   // ;
    Lt,          // <
    Eq,          // =
    Gt,          // >
    Bar,         // |
    LeftSquare,  // [
    RightSquare, // ]
    RightArrow,  // =>
    Pow,         // **
    ColonEq,     // :=
    Ne,          // /=
    Gte,         // >=
    Lte,         // <=
    Box,         // <>

    // LRM93 13.3 identifiers
    Identifier,
    ExtendedIdentifier,

    // LRM93 13.4 abstract literals
    Integer,
    Real,

    // LRM93 13.5 / 13.6 / 13.7
    Character,
    StringLiteral,
    BitString,

    // LRM93 13.9 reserved words
    KwAbs,
    KwAccess,
    KwAfter,
    KwAlias,
    KwAll,
    KwAnd,
    KwArchitecture,
    KwArray,
    KwAssert,
    KwAttribute,
    KwBegin,
    KwBlock,
    KwBody,
    KwBuffer,
    KwBus,
    KwCase,
    KwComponent,
    KwConfiguration,
    KwConstant,
    KwContext,
    KwDefault,
    KwDisconnect,
    KwDownto,
    KwElse,
    KwElsif,
    KwEnd,
    KwEntity,
    KwExit,
    KwFile,
    KwFor,
    KwFunction,
    KwGenerate,
    KwGeneric,
    KwGroup,
    KwGuarded,
    KwIf,
    KwImpure,
    KwIn,
    KwInertial,
    KwInout,
    KwIs,
    KwLabel,
    KwLibrary,
    KwLinkage,
    KwLiteral,
    KwLoop,
    KwMap,
    KwMod,
    KwNand,
    KwNew,
    KwNext,
    KwNor,
    KwNot,
    KwNull,
    KwOf,
    KwOn,
    KwOpen,
    KwOr,
    KwOthers,
    KwOut,
    KwPackage,
    KwPort,
    KwPostponed,
    KwProcedural,
    KwProcedure,
    KwProcess,
    KwProtected,
    KwPure,
    KwRange,
    KwRecord,
    KwReference,
    KwRegister,
    KwReject,
    KwRem,
    KwReport,
    KwReturn,
    KwRol,
    KwRor,
    KwSelect,
    KwSeverity,
    KwShared,
    KwSignal,
    KwSla,
    KwSll,
    KwSra,
    KwSrl,
    KwSubtype,
    KwThen,
    KwTo,
    KwTransport,
    KwType,
    KwUnaffected,
    KwUnits,
    KwUntil,
    KwUse,
    KwVariable,
    KwWait,
    KwWhen,
    KwWhile,
    KwWith,
    KwXnor,
    KwXor,
}

impl Kind {
    pub fn is_delimiter(self) -> bool {
        matches!(
            self,
            Kind::Concat
                | Kind::Tick
                | Kind::LeftPar
                | Kind::RightPar
                | Kind::Times
                | Kind::Plus
                | Kind::Comma
                | Kind::Minus
                | Kind::Dot
                | Kind::Div
                | Kind::Colon
                | Kind::Semicolon
                | Kind::Lt
                | Kind::Eq
                | Kind::Gt
                | Kind::Bar
                | Kind::LeftSquare
                | Kind::RightSquare
                | Kind::RightArrow
                | Kind::Pow
                | Kind::ColonEq
                | Kind::Ne
                | Kind::Gte
                | Kind::Lte
                | Kind::Box
        )
    }

    pub fn is_identifier(self) -> bool {
        matches!(self, Kind::Identifier | Kind::ExtendedIdentifier)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Kind::Integer | Kind::Real | Kind::Character | Kind::StringLiteral | Kind::BitString
        )
    }

    pub fn is_keyword(self) -> bool {
        self >= Kind::KwAbs
    }

    /// Printable form of the kind: the delimiter or keyword text itself, a
    /// class name for the open-ended kinds.
    pub fn text(self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Eof => "",
            Kind::Concat => "&",
            Kind::Tick => "'",
            Kind::LeftPar => "(",
            Kind::RightPar => ")",
            Kind::Times => "*",
            Kind::Plus => "+",
            Kind::Comma => ",",
            Kind::Minus => "-",
            Kind::Dot => ".",
            Kind::Div => "/",
            Kind::Colon => ":",
            Kind::Semicolon => ";",
            Kind::Lt => "<",
            Kind::Eq => "=",
            Kind::Gt => ">",
            Kind::Bar => "|",
            Kind::LeftSquare => "[",
            Kind::RightSquare => "]",
            Kind::RightArrow => "=>",
            Kind::Pow => "**",
            Kind::ColonEq => ":=",
            Kind::Ne => "/=",
            Kind::Gte => ">=",
            Kind::Lte => "<=",
            Kind::Box => "<>",
            Kind::Identifier => "identifier",
            Kind::ExtendedIdentifier => "extended identifier",
            Kind::Integer => "integer",
            Kind::Real => "real",
            Kind::Character => "character",
            Kind::StringLiteral => "string",
            Kind::BitString => "bitstring",
            Kind::KwAbs => "abs",
            Kind::KwAccess => "access",
            Kind::KwAfter => "after",
            Kind::KwAlias => "alias",
            Kind::KwAll => "all",
            Kind::KwAnd => "and",
            Kind::KwArchitecture => "architecture",
            Kind::KwArray => "array",
            Kind::KwAssert => "assert",
            Kind::KwAttribute => "attribute",
            Kind::KwBegin => "begin",
            Kind::KwBlock => "block",
            Kind::KwBody => "body",
            Kind::KwBuffer => "buffer",
            Kind::KwBus => "bus",
            Kind::KwCase => "case",
            Kind::KwComponent => "component",
            Kind::KwConfiguration => "configuration",
            Kind::KwConstant => "constant",
            Kind::KwContext => "context",
            Kind::KwDefault => "default",
            Kind::KwDisconnect => "disconnect",
            Kind::KwDownto => "downto",
            Kind::KwElse => "else",
            Kind::KwElsif => "elsif",
            Kind::KwEnd => "end",
            Kind::KwEntity => "entity",
            Kind::KwExit => "exit",
            Kind::KwFile => "file",
            Kind::KwFor => "for",
            Kind::KwFunction => "function",
            Kind::KwGenerate => "generate",
            Kind::KwGeneric => "generic",
            Kind::KwGroup => "group",
            Kind::KwGuarded => "guarded",
            Kind::KwIf => "if",
            Kind::KwImpure => "impure",
            Kind::KwIn => "in",
            Kind::KwInertial => "inertial",
            Kind::KwInout => "inout",
            Kind::KwIs => "is",
            Kind::KwLabel => "label",
            Kind::KwLibrary => "library",
            Kind::KwLinkage => "linkage",
            Kind::KwLiteral => "literal",
            Kind::KwLoop => "loop",
            Kind::KwMap => "map",
            Kind::KwMod => "mod",
            Kind::KwNand => "nand",
            Kind::KwNew => "new",
            Kind::KwNext => "next",
            Kind::KwNor => "nor",
            Kind::KwNot => "not",
            Kind::KwNull => "null",
            Kind::KwOf => "of",
            Kind::KwOn => "on",
            Kind::KwOpen => "open",
            Kind::KwOr => "or",
            Kind::KwOthers => "others",
            Kind::KwOut => "out",
            Kind::KwPackage => "package",
            Kind::KwPort => "port",
            Kind::KwPostponed => "postponed",
            Kind::KwProcedural => "procedural",
            Kind::KwProcedure => "procedure",
            Kind::KwProcess => "process",
            Kind::KwProtected => "protected",
            Kind::KwPure => "pure",
            Kind::KwRange => "range",
            Kind::KwRecord => "record",
            Kind::KwReference => "reference",
            Kind::KwRegister => "register",
            Kind::KwReject => "reject",
            Kind::KwRem => "rem",
            Kind::KwReport => "report",
            Kind::KwReturn => "return",
            Kind::KwRol => "rol",
            Kind::KwRor => "ror",
            Kind::KwSelect => "select",
            Kind::KwSeverity => "severity",
            Kind::KwShared => "shared",
            Kind::KwSignal => "signal",
            Kind::KwSla => "sla",
            Kind::KwSll => "sll",
            Kind::KwSra => "sra",
            Kind::KwSrl => "srl",
            Kind::KwSubtype => "subtype",
            Kind::KwThen => "then",
            Kind::KwTo => "to",
            Kind::KwTransport => "transport",
            Kind::KwType => "type",
            Kind::KwUnaffected => "unaffected",
            Kind::KwUnits => "units",
            Kind::KwUntil => "until",
            Kind::KwUse => "use",
            Kind::KwVariable => "variable",
            Kind::KwWait => "wait",
            Kind::KwWhen => "when",
            Kind::KwWhile => "while",
            Kind::KwWith => "with",
            Kind::KwXnor => "xnor",
            Kind::KwXor => "xor",
        }
    }

    /// Debug name of the kind. Differs from [`text`] only for delimiters.
    ///
    /// [`text`]: Kind::text
    pub fn name(self) -> &'static str {
        match self {
            Kind::Eof => "eof",
            Kind::Concat => "concat",
            Kind::Tick => "tick",
            Kind::LeftPar => "leftpar",
            Kind::RightPar => "rightpar",
            Kind::Times => "times",
            Kind::Plus => "plus",
            Kind::Comma => "comma",
            Kind::Minus => "minus",
            Kind::Dot => "dot",
            Kind::Div => "div",
            Kind::Colon => "colon",
            Kind::Semicolon => "semicolon",
            Kind::Lt => "lt",
            Kind::Eq => "eq",
            Kind::Gt => "gt",
            Kind::Bar => "bar",
            Kind::LeftSquare => "leftsquare",
            Kind::RightSquare => "rightsquare",
            Kind::RightArrow => "rightarrow",
            Kind::Pow => "pow",
            Kind::ColonEq => "coloneq",
            Kind::Ne => "ne",
            Kind::Gte => "gte",
            Kind::Lte => "lte",
            Kind::Box => "box",
            other => other.text(),
        }
    }
}

/// Map an identifier (already lowercased) to its reserved word, if any.
pub fn keyword_from_str(s: &str) -> Option<Kind> {
    Some(match s {
        "abs" => Kind::KwAbs,
        "access" => Kind::KwAccess,
        "after" => Kind::KwAfter,
        "alias" => Kind::KwAlias,
        "all" => Kind::KwAll,
        "and" => Kind::KwAnd,
        "architecture" => Kind::KwArchitecture,
        "array" => Kind::KwArray,
        "assert" => Kind::KwAssert,
        "attribute" => Kind::KwAttribute,
        "begin" => Kind::KwBegin,
        "block" => Kind::KwBlock,
        "body" => Kind::KwBody,
        "buffer" => Kind::KwBuffer,
        "bus" => Kind::KwBus,
        "case" => Kind::KwCase,
        "component" => Kind::KwComponent,
        "configuration" => Kind::KwConfiguration,
        "constant" => Kind::KwConstant,
        "context" => Kind::KwContext,
        "default" => Kind::KwDefault,
        "disconnect" => Kind::KwDisconnect,
        "downto" => Kind::KwDownto,
        "else" => Kind::KwElse,
        "elsif" => Kind::KwElsif,
        "end" => Kind::KwEnd,
        "entity" => Kind::KwEntity,
        "exit" => Kind::KwExit,
        "file" => Kind::KwFile,
        "for" => Kind::KwFor,
        "function" => Kind::KwFunction,
        "generate" => Kind::KwGenerate,
        "generic" => Kind::KwGeneric,
        "group" => Kind::KwGroup,
        "guarded" => Kind::KwGuarded,
        "if" => Kind::KwIf,
        "impure" => Kind::KwImpure,
        "in" => Kind::KwIn,
        "inertial" => Kind::KwInertial,
        "inout" => Kind::KwInout,
        "is" => Kind::KwIs,
        "label" => Kind::KwLabel,
        "library" => Kind::KwLibrary,
        "linkage" => Kind::KwLinkage,
        "literal" => Kind::KwLiteral,
        "loop" => Kind::KwLoop,
        "map" => Kind::KwMap,
        "mod" => Kind::KwMod,
        "nand" => Kind::KwNand,
        "new" => Kind::KwNew,
        "next" => Kind::KwNext,
        "nor" => Kind::KwNor,
        "not" => Kind::KwNot,
        "null" => Kind::KwNull,
        "of" => Kind::KwOf,
        "on" => Kind::KwOn,
        "open" => Kind::KwOpen,
        "or" => Kind::KwOr,
        "others" => Kind::KwOthers,
        "out" => Kind::KwOut,
        "package" => Kind::KwPackage,
        "port" => Kind::KwPort,
        "postponed" => Kind::KwPostponed,
        "procedural" => Kind::KwProcedural,
        "procedure" => Kind::KwProcedure,
        "process" => Kind::KwProcess,
        "protected" => Kind::KwProtected,
        "pure" => Kind::KwPure,
        "range" => Kind::KwRange,
        "record" => Kind::KwRecord,
        "reference" => Kind::KwReference,
        "register" => Kind::KwRegister,
        "reject" => Kind::KwReject,
        "rem" => Kind::KwRem,
        "report" => Kind::KwReport,
        "return" => Kind::KwReturn,
        "rol" => Kind::KwRol,
        "ror" => Kind::KwRor,
        "select" => Kind::KwSelect,
        "severity" => Kind::KwSeverity,
        "shared" => Kind::KwShared,
        "signal" => Kind::KwSignal,
        "sla" => Kind::KwSla,
        "sll" => Kind::KwSll,
        "sra" => Kind::KwSra,
        "srl" => Kind::KwSrl,
        "subtype" => Kind::KwSubtype,
        "then" => Kind::KwThen,
        "to" => Kind::KwTo,
        "transport" => Kind::KwTransport,
        "type" => Kind::KwType,
        "unaffected" => Kind::KwUnaffected,
        "units" => Kind::KwUnits,
        "until" => Kind::KwUntil,
        "use" => Kind::KwUse,
        "variable" => Kind::KwVariable,
        "wait" => Kind::KwWait,
        "when" => Kind::KwWhen,
        "while" => Kind::KwWhile,
        "with" => Kind::KwWith,
        "xnor" => Kind::KwXnor,
        "xor" => Kind::KwXor,
        _ => return None,
    })
}

/// One lexical element with its classification flags and source range.
#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub kind: Kind,
    pub value: Symbol,
    pub location: Location,
    pub is_delimiter: bool,
    pub is_identifier: bool,
    pub is_literal: bool,
    pub is_keyword: bool,
}

impl Token {
    pub fn new(kind: Kind, value: Symbol, location: Location) -> Self {
        Token {
            kind,
            value,
            location,
            is_delimiter: kind.is_delimiter(),
            is_identifier: kind.is_identifier(),
            is_literal: kind.is_literal(),
            is_keyword: kind.is_keyword(),
        }
    }

    pub fn invalid(location: Location) -> Self {
        Token::new(Kind::Invalid, Symbol::EMPTY, location)
    }

    pub fn eof(location: Location) -> Self {
        Token::new(Kind::Eof, Symbol::EMPTY, location)
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::invalid(Location::default())
    }
}

impl PartialEq<Kind> for Token {
    fn eq(&self, other: &Kind) -> bool {
        self.kind == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_classification() {
        assert!(Kind::Semicolon.is_delimiter());
        assert!(Kind::Box.is_delimiter());
        assert!(!Kind::Identifier.is_delimiter());
        assert!(!Kind::KwAnd.is_delimiter());
    }

    #[test]
    fn keyword_classification_covers_whole_tail() {
        assert!(Kind::KwAbs.is_keyword());
        assert!(Kind::KwXor.is_keyword());
        assert!(!Kind::BitString.is_keyword());
    }

    #[test]
    fn literal_classification() {
        for k in [
            Kind::Integer,
            Kind::Real,
            Kind::Character,
            Kind::StringLiteral,
            Kind::BitString,
        ] {
            assert!(k.is_literal(), "{k:?}");
        }
        assert!(!Kind::Identifier.is_literal());
    }

    #[test]
    fn keyword_lookup_roundtrips_through_text() {
        for k in [Kind::KwArchitecture, Kind::KwDownto, Kind::KwXnor, Kind::KwUnaffected] {
            assert_eq!(keyword_from_str(k.text()), Some(k));
        }
        assert_eq!(keyword_from_str("counter"), None);
    }

    #[test]
    fn compound_delimiter_text() {
        assert_eq!(Kind::RightArrow.text(), "=>");
        assert_eq!(Kind::ColonEq.text(), ":=");
        assert_eq!(Kind::Pow.name(), "pow");
        assert_eq!(Kind::KwMod.name(), "mod");
    }

    #[test]
    fn token_flags_follow_kind() {
        let t = Token::new(Kind::KwSignal, Symbol::EMPTY, Location::default());
        assert!(t.is_keyword);
        assert!(!t.is_delimiter && !t.is_identifier && !t.is_literal);
        let t = Token::new(Kind::StringLiteral, Symbol::EMPTY, Location::default());
        assert!(t.is_literal);
    }
}
