//! Header-only skim of a design file.
//!
//! Walks the token stream without building an AST, recording
//! `(kind, line, column, identifier, identifier2, filename)` for every
//! design-unit header it finds, then resyncing to the next unit. The rows
//! feed the library index directly; indexing routes exclusively through this
//! parser, never through the full parser's AST, so the two are free to
//! disagree about columns in pathological inputs (comments between the
//! keyword and the identifier, extended identifiers).
//!
//! Produces no diagnostics.

use vhdlsense_base::StringTable;

use crate::lexer::Lexer;
use crate::library::{LibraryUnitKind, UnitRow};
use crate::token::{Kind, Version};

pub struct FastParser<'src, 'st> {
    lexer: Lexer<'src, 'st>,
    filename: String,
}

impl<'src, 'st> FastParser<'src, 'st> {
    pub fn new(src: &'src [u8], strings: &'st mut StringTable, filename: &str) -> Self {
        let mut lexer = Lexer::new(src, strings, filename, Version::Vhdl93);
        // first token slot is invalid; skip it
        lexer.scan();
        FastParser {
            lexer,
            filename: filename.to_string(),
        }
    }

    pub fn parse(mut self) -> Vec<UnitRow> {
        let mut result = Vec::new();

        while self.current() != Kind::Eof {
            let unit = match self.current() {
                Kind::KwEntity => self.parse_entity(),
                Kind::KwArchitecture => self.parse_architecture(),
                Kind::KwPackage => {
                    self.scan();
                    if self.current() == Kind::KwBody {
                        self.parse_package_body()
                    } else {
                        self.parse_package()
                    }
                }
                Kind::KwConfiguration => self.parse_configuration(),
                Kind::KwLibrary | Kind::KwUse => {
                    self.scan();
                    self.resync_to_next_unit();
                    None
                }
                _ => {
                    self.resync_to_next_unit();
                    None
                }
            };

            if let Some(unit) = unit {
                result.push(unit);
            }
        }

        result
    }

    fn parse_entity(&mut self) -> Option<UnitRow> {
        let (line, column) = self.here();
        self.scan(); // entity

        if self.current() != Kind::Identifier {
            return None;
        }
        let identifier = self.identifier();
        self.scan();

        Some(UnitRow {
            kind: LibraryUnitKind::Entity,
            line,
            column,
            identifier,
            identifier2: None,
            filename: self.filename.clone(),
            timestamp: 0,
        })
    }

    fn parse_architecture(&mut self) -> Option<UnitRow> {
        let (line, column) = self.here();
        self.scan(); // architecture

        if self.current() != Kind::Identifier {
            return None;
        }
        let identifier = self.identifier();
        self.scan();

        if self.current() != Kind::KwOf {
            return None;
        }
        self.scan();

        if self.current() != Kind::Identifier {
            return None;
        }
        let identifier2 = self.identifier();
        self.scan();

        Some(UnitRow {
            kind: LibraryUnitKind::Architecture,
            line,
            column,
            identifier,
            identifier2: Some(identifier2),
            filename: self.filename.clone(),
            timestamp: 0,
        })
    }

    fn parse_package(&mut self) -> Option<UnitRow> {
        let (line, column) = self.here();

        if self.current() != Kind::Identifier {
            return None;
        }
        let identifier = self.identifier();
        self.scan();

        Some(UnitRow {
            kind: LibraryUnitKind::Package,
            line,
            column,
            identifier,
            identifier2: None,
            filename: self.filename.clone(),
            timestamp: 0,
        })
    }

    fn parse_package_body(&mut self) -> Option<UnitRow> {
        let (line, column) = self.here();
        self.scan(); // body

        if self.current() != Kind::Identifier {
            return None;
        }
        let identifier = self.identifier();
        self.scan();

        Some(UnitRow {
            kind: LibraryUnitKind::PackageBody,
            line,
            column,
            identifier,
            identifier2: None,
            filename: self.filename.clone(),
            timestamp: 0,
        })
    }

    fn parse_configuration(&mut self) -> Option<UnitRow> {
        let (line, column) = self.here();
        self.scan(); // configuration

        if self.current() != Kind::Identifier {
            return None;
        }
        let identifier = self.identifier();
        self.scan();

        if self.current() != Kind::KwOf {
            return None;
        }
        self.scan();

        if self.current() != Kind::Identifier {
            return None;
        }
        let identifier2 = self.identifier();
        self.scan();

        Some(UnitRow {
            kind: LibraryUnitKind::Configuration,
            line,
            column,
            identifier,
            identifier2: Some(identifier2),
            filename: self.filename.clone(),
            timestamp: 0,
        })
    }

    /// Skip until what looks like the start of the next design unit. A
    /// unit-starting keyword straight after `end` is a closing keyword, not
    /// a new unit.
    fn resync_to_next_unit(&mut self) {
        loop {
            self.scan();

            match self.current() {
                Kind::Eof => return,
                Kind::KwLibrary
                | Kind::KwUse
                | Kind::KwArchitecture
                | Kind::KwEntity
                | Kind::KwPackage
                | Kind::KwConfiguration => {
                    if self.lexer.previous_token().kind == Kind::KwEnd {
                        continue;
                    }
                    return;
                }
                _ => {}
            }
        }
    }

    fn here(&self) -> (u32, u32) {
        (self.lexer.current_line(), self.lexer.current_column())
    }

    fn identifier(&mut self) -> String {
        self.lexer.identifier_text()
    }

    fn current(&self) -> Kind {
        self.lexer.current_token().kind
    }

    fn scan(&mut self) {
        self.lexer.scan();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(src: &str) -> Vec<UnitRow> {
        let mut st = StringTable::new();
        FastParser::new(src.as_bytes(), &mut st, "test.vhd").parse()
    }

    #[test]
    fn finds_entity_header() {
        let rows = rows("entity counter is\nend entity counter;");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, LibraryUnitKind::Entity);
        assert_eq!(rows[0].identifier, "counter");
        assert_eq!(rows[0].identifier2, None);
        assert_eq!(rows[0].line, 1);
    }

    #[test]
    fn architecture_records_entity_as_identifier2() {
        let rows = rows("architecture rtl of counter is\nbegin\nend architecture;");
        assert_eq!(rows[0].kind, LibraryUnitKind::Architecture);
        assert_eq!(rows[0].identifier, "rtl");
        assert_eq!(rows[0].identifier2.as_deref(), Some("counter"));
    }

    #[test]
    fn package_and_body_are_distinct_kinds() {
        let rows = rows("package p is\nend package;\npackage body p is\nend package body;");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, LibraryUnitKind::Package);
        assert_eq!(rows[1].kind, LibraryUnitKind::PackageBody);
    }

    #[test]
    fn unit_keyword_after_end_does_not_start_a_unit() {
        // "end entity counter;" must not be mistaken for a new entity
        let rows = rows("entity a is\nend entity a;\nentity b is\nend entity b;");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier, "a");
        assert_eq!(rows[1].identifier, "b");
    }

    #[test]
    fn multiple_units_with_context_clauses() {
        let src = "library ieee;\nuse ieee.std_logic_1164.all;\nentity top is end entity;\narchitecture rtl of top is begin end architecture;";
        let rows = rows(src);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier, "top");
        assert_eq!(rows[1].identifier, "rtl");
    }

    #[test]
    fn line_and_column_point_at_the_keyword() {
        let rows = rows("\n\n  entity late is end entity;");
        assert_eq!(rows[0].line, 3);
        assert!(rows[0].column >= 3);
    }

    #[test]
    fn configuration_header() {
        let rows = rows("configuration cfg of top is\nfor rtl\nend for;\nend configuration;");
        assert_eq!(rows[0].kind, LibraryUnitKind::Configuration);
        assert_eq!(rows[0].identifier, "cfg");
        assert_eq!(rows[0].identifier2.as_deref(), Some("top"));
    }
}
