//! Recursive-descent VHDL parser.
//!
//! One function per major non-terminal of the grammar. Productions return
//! `Option<Node>`: `None` means the production could not meet its minimum
//! shape; the caller's recovery driver keeps going either way.
//!
//! Error recovery is state-driven. The parser maintains a bitset of active
//! [`ParseState`]s; the generic [`parse_many`] driver consumes elements while
//! the current token starts one, yields to an enclosing state when that state
//! recognizes the token, and otherwise skips a token with a "Skipping"
//! diagnostic. A monotonic counter reset on every successful consume bounds
//! non-advancing loops: when it trips, the parser feigns end-of-file so every
//! active state unwinds, and a single top-level diagnostic is reported.
//!
//! [`parse_many`]: Parser::parse_many

mod decls;
mod names;
mod stmts;

pub use names::NameOptions;

use vhdlsense_base::{Diagnostic, Location, StringTable};

use crate::lexer::Lexer;
use crate::syntax::*;
use crate::token::{Kind, Token, Version};

pub(crate) const EMPTY_DESIGN_FILE: &str = "Design file is empty";
const PARSER_PROBLEM: &str = "Parser encountered a problem";
const SKIPPING: &str = "Skipping '{}'";
const IGNORING: &str = "Ignoring {}";
const EXPECTED: &str = "Expected '{}'";
const END_NAME_MISSPELLING: &str = "Mispelling, expected {}";
const END_NAME_NOT_ALLOWED_VHDL87: &str = "End names are not allowed in vhdl87";
const EXPECTED_DESIGN_UNIT: &str = "Expected a design unit";
const EXPECTED_LIBRARY_NAME: &str = "Expected library name";
const EXPECTED_USE_NAME: &str = "Expected use name";
pub(crate) const UNEXPECTED_COMMA: &str = "Unexpected comma";

/// Parsing state: the parser's "state of mind", used by the recovery driver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParseState {
    DesignUnitInDesignFile = 0,
    InterfaceLists = 1,
    DeclarativePartBeginEnd = 2,
    DeclarativePartBegin = 3,
    DeclarativePartEnd = 4,
    DeclarativePartFor = 5,
    EntityStatementPart = 6,
    ConcurrentStatements = 7,
    SequentialStatements = 8,
}

const ALL_STATES: [ParseState; 9] = [
    ParseState::DesignUnitInDesignFile,
    ParseState::InterfaceLists,
    ParseState::DeclarativePartBeginEnd,
    ParseState::DeclarativePartBegin,
    ParseState::DeclarativePartEnd,
    ParseState::DeclarativePartFor,
    ParseState::EntityStatementPart,
    ParseState::ConcurrentStatements,
    ParseState::SequentialStatements,
];

const LOOP_GUARD_LIMIT: u32 = 100;

pub struct Parser<'src, 'st> {
    pub(crate) lexer: Lexer<'src, 'st>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) version: Version,
    parsing_states: u16,
    guard: u32,
    aborted: bool,
}

impl<'src, 'st> Parser<'src, 'st> {
    pub fn new(
        src: &'src [u8],
        strings: &'st mut StringTable,
        filename: &str,
        version: Version,
    ) -> Self {
        let mut lexer = Lexer::new(src, strings, filename, version);
        // the very first token slot is invalid; skip it
        lexer.scan();
        Parser {
            lexer,
            diagnostics: Vec::new(),
            version,
            parsing_states: 0,
            guard: 0,
            aborted: false,
        }
    }

    /// Parse a whole design file. Returns the units and every diagnostic,
    /// lexical and syntactic, in source order.
    pub fn parse(mut self) -> (Vec<DesignUnit>, Vec<Diagnostic>) {
        let units = self.parse_design_file();

        if self.aborted {
            self.diagnostics
                .push(Diagnostic::new(PARSER_PROBLEM, self.lexer.current_location()));
        }

        let mut diagnostics = self.lexer.take_diagnostics();
        diagnostics.append(&mut self.diagnostics);
        diagnostics.sort_by_key(|d| (d.location.begin.line, d.location.begin.column));
        (units, diagnostics)
    }

    // ------------------------------------------------------------------------
    // Design file and context clause (LRM93 11.0)
    // ------------------------------------------------------------------------

    fn parse_design_file(&mut self) -> Vec<DesignUnit> {
        if self.current() == Kind::Eof {
            self.diag(EMPTY_DESIGN_FILE);
            return Vec::new();
        }

        self.parse_many(ParseState::DesignUnitInDesignFile, |p| p.parse_design_unit())
    }

    fn parse_design_unit(&mut self) -> Option<DesignUnit> {
        let contexts = self.parse_context_clause();

        let mut unit = match self.current() {
            Kind::KwEntity => self.parse_entity_declaration(),
            Kind::KwArchitecture => self.parse_architecture_body(),
            Kind::KwPackage => {
                if self.peek(1) == Kind::KwBody {
                    self.parse_package_body()
                } else {
                    self.parse_package_declaration()
                }
            }
            Kind::KwConfiguration => self.parse_configuration_declaration(),
            _ => {
                // a context clause with no design unit behind it
                self.diag(EXPECTED_DESIGN_UNIT);
                None
            }
        }?;

        unit.contexts = contexts;
        Some(unit)
    }

    fn parse_context_clause(&mut self) -> Vec<ContextItem> {
        let mut result = Vec::new();

        while self.current() != Kind::Eof {
            let item = match self.current() {
                Kind::KwLibrary => self.parse_library_clause(),
                Kind::KwUse => self.parse_context_use_clause(),
                Kind::KwEntity
                | Kind::KwArchitecture
                | Kind::KwPackage
                | Kind::KwConfiguration => return result,
                _ => {
                    self.skip();
                    None
                }
            };
            if let Some(item) = item {
                result.push(item);
            }
        }

        result
    }

    fn parse_library_clause(&mut self) -> Option<ContextItem> {
        let first = self.lexer.current_location();
        self.consume(Kind::KwLibrary);

        let mut names = Vec::new();
        while self.current() != Kind::Eof {
            if let (t, true) = self.parse_identifier(EXPECTED_LIBRARY_NAME) {
                names.push(t);
            }

            if self.current() == Kind::Semicolon {
                break;
            }
            if self.current() != Kind::Comma {
                break;
            }
            self.consume(Kind::Comma);
            if self.current() == Kind::Semicolon {
                self.diag_at(UNEXPECTED_COMMA, self.lexer.previous_location());
                break;
            }
        }

        if self.current() != Kind::Semicolon {
            self.resync_to_next_semicolon(false);
        }
        self.consume(Kind::Semicolon);

        if names.is_empty() {
            return None;
        }

        Some(ContextItem {
            span: first.span_to(self.lexer.previous_location()),
            kind: ContextItemKind::LibraryClause { names },
        })
    }

    fn parse_context_use_clause(&mut self) -> Option<ContextItem> {
        let first = self.lexer.current_location();
        let names = self.parse_use_clause_names()?;
        Some(ContextItem {
            span: first.span_to(self.lexer.previous_location()),
            kind: ContextItemKind::UseClause { names },
        })
    }

    /// `use name { , name } ;` — shared by context items and declarative
    /// items.
    pub(crate) fn parse_use_clause_names(&mut self) -> Option<Vec<Name>> {
        self.consume(Kind::KwUse);

        let mut names = Vec::new();
        while self.current() != Kind::Eof {
            if self.current() != Kind::Identifier {
                self.diag(EXPECTED_USE_NAME);
                break;
            }

            let options = NameOptions { allow_qifts: false, ..NameOptions::default() };
            if let Some(name) = self.parse_name_with(options) {
                names.push(name);
            }

            if self.current() == Kind::Semicolon {
                break;
            }
            if self.current() != Kind::Comma {
                break;
            }
            self.consume(Kind::Comma);
            if self.current() == Kind::Semicolon {
                self.diag_at(UNEXPECTED_COMMA, self.lexer.previous_location());
                break;
            }
        }

        if self.current() != Kind::Semicolon {
            self.resync_to_next_semicolon(false);
        }
        self.consume(Kind::Semicolon);

        if names.is_empty() {
            return None;
        }
        Some(names)
    }

    // ------------------------------------------------------------------------
    // Lexical helpers (LRM93 13.0)
    // ------------------------------------------------------------------------

    pub(crate) fn parse_identifier(&mut self, message: &'static str) -> (Token, bool) {
        let token = self.lexer.current_token();
        if token.kind != Kind::Identifier && token.kind != Kind::ExtendedIdentifier {
            self.diag(message);
            return (token, false);
        }
        self.skip();
        (token, true)
    }

    pub(crate) fn parse_optional_label(&mut self) -> Option<Token> {
        if self.peek(0) != Kind::Identifier || self.peek(1) != Kind::Colon {
            return None;
        }
        let result = self.lexer.current_token();
        self.skip();
        self.consume(Kind::Colon);
        Some(result)
    }

    pub(crate) fn parse_non_optional_label(&mut self, message: &'static str) -> (Option<Token>, bool) {
        let token = self.lexer.current_token();
        if token.kind != Kind::Identifier {
            self.diag(message);
            self.optional(Kind::Colon);
            return (None, false);
        }
        self.skip();
        self.consume(Kind::Colon);
        (Some(token), true)
    }

    pub(crate) fn parse_designator(&mut self, message: &'static str) -> (Token, bool) {
        let token = self.lexer.current_token();
        if token.kind != Kind::Identifier && token.kind != Kind::StringLiteral {
            self.diag(message);
            return (token, false);
        }
        self.skip();
        (token, true)
    }

    /// `end [ keyword ] [ name ] ;` closing labels are checked, never fatal.
    pub(crate) fn parse_optional_closing_label(&mut self, name: Token) {
        if self.current() == Kind::Identifier {
            if self.version < Version::Vhdl93 {
                self.diag(END_NAME_NOT_ALLOWED_VHDL87);
            }
            let closing = self.lexer.current_token();
            if name.kind == Kind::Identifier && closing.value != name.value {
                let expected = self.resolve(name);
                let d = Diagnostic::new(END_NAME_MISSPELLING, self.lexer.current_location())
                    .arg(expected);
                self.diagnostics.push(d);
            }
            self.skip();
        }
    }

    pub(crate) fn parse_optional_closing_designator(&mut self, designator: Option<Token>) {
        if self.current() == Kind::Identifier || self.current() == Kind::StringLiteral {
            let closing = self.lexer.current_token();
            if let Some(d) = designator {
                if closing.value != d.value && d.kind == closing.kind {
                    let expected = self.resolve(d);
                    let diag = Diagnostic::new(END_NAME_MISSPELLING, self.lexer.current_location())
                        .arg(expected);
                    self.diagnostics.push(diag);
                }
            }
            self.skip();
        }
    }

    pub(crate) fn resolve(&mut self, token: Token) -> String {
        self.lexer.strings().resolve(token.value).to_string()
    }

    // ------------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------------

    pub(crate) fn current(&mut self) -> Kind {
        if self.aborted {
            return Kind::Eof;
        }
        self.guard += 1;
        if self.guard >= LOOP_GUARD_LIMIT {
            self.aborted = true;
            return Kind::Eof;
        }
        self.lexer.current_token().kind
    }

    pub(crate) fn peek(&mut self, nth: usize) -> Kind {
        if self.aborted {
            return Kind::Eof;
        }
        self.lexer.peek(nth).kind
    }

    pub(crate) fn skip(&mut self) {
        self.guard = 0;
        self.lexer.scan();
    }

    pub(crate) fn expecting(&mut self, kind: Kind) -> bool {
        self.expecting_msg(kind, EXPECTED)
    }

    pub(crate) fn expecting_msg(&mut self, kind: Kind, message: &'static str) -> bool {
        if self.lexer.current_token().kind == kind {
            return true;
        }
        let d = Diagnostic::new(message, self.lexer.current_location()).arg(kind.text());
        self.diagnostics.push(d);
        false
    }

    /// Consume `kind` and return its location; on mismatch, diagnose and
    /// return the current location without consuming.
    pub(crate) fn eat(&mut self, kind: Kind) -> Location {
        self.guard = 0;
        if self.expecting(kind) {
            self.lexer.scan();
            return self.lexer.previous_location();
        }
        self.lexer.current_location()
    }

    pub(crate) fn consume(&mut self, kind: Kind) {
        self.guard = 0;
        if self.expecting(kind) {
            self.lexer.scan();
        }
    }

    pub(crate) fn consume_msg(&mut self, kind: Kind, message: &'static str) {
        self.guard = 0;
        if self.expecting_msg(kind, message) {
            self.lexer.scan();
        }
    }

    /// Consume `kind` if present; false otherwise.
    pub(crate) fn optional(&mut self, kind: Kind) -> bool {
        if self.lexer.current_token().kind == kind {
            self.guard = 0;
            self.lexer.scan();
            return true;
        }
        false
    }

    pub(crate) fn diag(&mut self, message: &'static str) {
        let loc = self.lexer.current_location();
        self.diag_at(message, loc);
    }

    pub(crate) fn diag_at(&mut self, message: &'static str, location: Location) {
        self.diagnostics.push(Diagnostic::new(message, location));
    }

    pub(crate) fn diag_arg(&mut self, message: &'static str, arg: String) {
        let loc = self.lexer.current_location();
        self.diagnostics.push(Diagnostic::new(message, loc).arg(arg));
    }

    pub(crate) fn resync_to_next_semicolon(&mut self, consume_the_semicolon: bool) {
        loop {
            self.lexer.scan();
            match self.lexer.current_token().kind {
                Kind::Semicolon => {
                    if consume_the_semicolon {
                        self.consume(Kind::Semicolon);
                    }
                    return;
                }
                Kind::Eof => return,
                _ => {}
            }
        }
    }

    /// Skip whatever is between ( and ). `nests` is the number of ( already
    /// passed; with 0, the current token must be (.
    pub(crate) fn resync_to_end_of_rightpar(&mut self, mut nests: u32) {
        if nests == 0 && self.current() != Kind::LeftPar {
            return;
        }

        loop {
            match self.current() {
                Kind::Eof => return,
                Kind::LeftPar => nests += 1,
                Kind::RightPar => {
                    nests = nests.saturating_sub(1);
                    if nests == 0 {
                        self.skip();
                        return;
                    }
                }
                Kind::KwEnd
                | Kind::KwPort
                | Kind::KwIs
                | Kind::KwBegin
                | Kind::KwSignal
                | Kind::KwVariable
                | Kind::KwConstant
                | Kind::KwFile
                | Kind::KwFunction
                | Kind::KwType
                | Kind::KwPackage
                | Kind::Semicolon => {
                    if nests == 0 {
                        self.skip();
                        return;
                    }
                }
                _ => {}
            }
            self.skip();
        }
    }

    // ------------------------------------------------------------------------
    // State-driven recovery
    // ------------------------------------------------------------------------

    pub(crate) fn parse_many<T>(
        &mut self,
        state: ParseState,
        mut f: impl FnMut(&mut Self) -> Option<T>,
    ) -> Vec<T> {
        let saved = self.parsing_states;
        self.parsing_states |= 1 << state as u16;

        let mut result = Vec::new();
        loop {
            let kind = self.current();
            if self.is_end_of_state(kind, state) {
                break;
            }
            if self.is_begin_of_element_in_state(kind, state) {
                if let Some(element) = f(self) {
                    result.push(element);
                }
                continue;
            }
            if self.is_valid_in_parsing_states(kind) {
                break;
            }

            self.diag_arg(SKIPPING, kind.text().to_string());
            self.skip();
        }

        self.parsing_states = saved;
        result
    }

    pub(crate) fn parse_many_sep<T>(
        &mut self,
        state: ParseState,
        sep: Kind,
        mut f: impl FnMut(&mut Self) -> Option<T>,
    ) -> Vec<T> {
        let saved = self.parsing_states;
        self.parsing_states |= 1 << state as u16;

        let mut result = Vec::new();
        loop {
            let kind = self.current();
            if self.is_end_of_state(kind, state) {
                break;
            }
            if self.is_begin_of_element_in_state(kind, state) {
                if let Some(element) = f(self) {
                    result.push(element);
                }

                let here = self.current();
                let next = self.peek(1);
                if here == sep && self.is_end_of_state(next, state) {
                    // trailing separator right before the end of the state
                    self.diag_arg(IGNORING, sep.text().to_string());
                    self.skip();
                    break;
                }

                let here = self.current();
                if self.is_begin_of_element_in_state(here, state) {
                    self.expecting(sep);
                }

                self.optional(sep);
                continue;
            }
            if self.is_valid_in_parsing_states(kind) {
                break;
            }

            self.diag_arg(SKIPPING, kind.text().to_string());
            self.skip();
        }

        self.parsing_states = saved;
        result
    }

    fn is_begin_of_element_in_state(&self, token: Kind, state: ParseState) -> bool {
        if token == Kind::Eof {
            return false;
        }
        match state {
            ParseState::DesignUnitInDesignFile => matches!(
                token,
                Kind::KwEntity
                    | Kind::KwArchitecture
                    | Kind::KwPackage
                    | Kind::KwConfiguration
                    | Kind::KwLibrary
                    | Kind::KwUse
            ),
            ParseState::InterfaceLists => matches!(
                token,
                Kind::KwConstant
                    | Kind::KwSignal
                    | Kind::KwVariable
                    | Kind::KwFile
                    | Kind::Identifier
                    | Kind::KwPackage
                    | Kind::KwType
                    | Kind::KwProcedure
                    | Kind::KwPure
                    | Kind::KwImpure
                    | Kind::KwFunction
            ),
            ParseState::DeclarativePartBeginEnd
            | ParseState::DeclarativePartBegin
            | ParseState::DeclarativePartEnd
            | ParseState::DeclarativePartFor => matches!(
                token,
                Kind::KwType
                    | Kind::KwSubtype
                    | Kind::KwSignal
                    | Kind::KwConstant
                    | Kind::KwVariable
                    | Kind::KwShared
                    | Kind::KwFile
                    | Kind::KwPure
                    | Kind::KwImpure
                    | Kind::KwFunction
                    | Kind::KwProcedure
                    | Kind::KwAlias
                    | Kind::KwComponent
                    | Kind::KwFor
                    | Kind::KwAttribute
                    | Kind::KwUse
                    | Kind::KwGroup
                    | Kind::KwPackage
                    | Kind::Identifier
            ),
            ParseState::EntityStatementPart => matches!(
                token,
                Kind::Identifier | Kind::KwProcess | Kind::KwAssert | Kind::KwPostponed
            ),
            ParseState::ConcurrentStatements => matches!(
                token,
                Kind::Identifier
                    | Kind::KwProcess
                    | Kind::KwComponent
                    | Kind::KwEntity
                    | Kind::KwConfiguration
                    | Kind::KwWith
                    | Kind::KwAssert
                    | Kind::KwPostponed
                    | Kind::KwBlock
                    | Kind::KwIf
                    | Kind::KwFor
                    | Kind::LeftPar
            ),
            ParseState::SequentialStatements => matches!(
                token,
                Kind::KwWait
                    | Kind::KwAssert
                    | Kind::KwReport
                    | Kind::Identifier
                    | Kind::StringLiteral
                    | Kind::LeftPar
                    | Kind::KwIf
                    | Kind::KwFor
                    | Kind::KwWhile
                    | Kind::KwLoop
                    | Kind::KwCase
                    | Kind::KwNull
                    | Kind::KwNext
                    | Kind::KwExit
                    | Kind::KwReturn
            ),
        }
    }

    fn is_end_of_state(&self, token: Kind, state: ParseState) -> bool {
        if token == Kind::Eof {
            return true;
        }
        match state {
            ParseState::DesignUnitInDesignFile => false,
            ParseState::InterfaceLists => token == Kind::RightPar,
            ParseState::DeclarativePartBeginEnd => {
                token == Kind::KwBegin || token == Kind::KwEnd
            }
            ParseState::DeclarativePartBegin => token == Kind::KwBegin,
            ParseState::DeclarativePartEnd => token == Kind::KwEnd,
            ParseState::DeclarativePartFor => token == Kind::KwFor,
            ParseState::EntityStatementPart | ParseState::ConcurrentStatements => {
                token == Kind::KwEnd
            }
            ParseState::SequentialStatements => matches!(
                token,
                Kind::KwEnd | Kind::KwElse | Kind::KwElsif | Kind::KwWhen
            ),
        }
    }

    fn is_valid_in_parsing_states(&self, token: Kind) -> bool {
        for state in ALL_STATES {
            if self.parsing_states & (1 << state as u16) != 0
                && (self.is_begin_of_element_in_state(token, state)
                    || self.is_end_of_state(token, state))
            {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn parse_str(src: &str) -> (Vec<DesignUnit>, Vec<Diagnostic>) {
        let mut st = StringTable::new();
        let parser = Parser::new(src.as_bytes(), &mut st, "test.vhd", Version::Vhdl93);
        parser.parse()
    }

    #[test]
    fn empty_design_file_diagnoses_and_yields_no_units() {
        let (units, diags) = parse_str("");
        assert!(units.is_empty());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message().contains("empty"));
    }

    #[test]
    fn lone_library_clause_yields_no_units_with_diagnostic() {
        let (units, diags) = parse_str("library ieee;");
        assert!(units.is_empty());
        assert!(!diags.is_empty());
    }

    #[test]
    fn single_entity_parses_without_diagnostics() {
        let src = "entity counter is\n  port ( clk : in bit;\n         q   : out bit );\nend entity counter;\n";
        let (units, diags) = parse_str(src);
        assert_eq!(units.len(), 1, "{diags:?}");
        assert!(diags.is_empty(), "{diags:?}");
        match &units[0].kind {
            DesignUnitKind::Entity(e) => {
                let ports = e.ports.as_ref().expect("ports");
                assert_eq!(ports.items.len(), 2);
            }
            other => panic!("expected entity, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_closing_label_diagnoses_but_parses() {
        let src = "entity a is\nend entity b;\n";
        let (units, diags) = parse_str(src);
        assert_eq!(units.len(), 1);
        assert!(diags.iter().any(|d| d.message().contains("Mispelling")));
    }

    #[test]
    fn garbage_between_units_is_skipped() {
        let src = "entity a is end entity; ??? entity b is end entity;";
        let (units, diags) = parse_str(src);
        assert_eq!(units.len(), 2);
        assert!(!diags.is_empty());
    }

    #[test]
    fn context_clause_attaches_to_following_unit() {
        let src = "library ieee;\nuse ieee.std_logic_1164.all;\nentity a is end entity;\n";
        let (units, diags) = parse_str(src);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(units[0].contexts.len(), 2);
    }

    #[test]
    fn runaway_input_aborts_with_single_top_level_diagnostic() {
        // pathological input that never advances a production
        let src = "architecture";
        let (_, diags) = parse_str(src);
        let count = diags
            .iter()
            .filter(|d| d.message().contains("Parser encountered a problem"))
            .count();
        assert!(count <= 1);
    }
}
