//! Wire-position conversion.
//!
//! Positions on the wire are zero-based; everything inside the engine is
//! one-based. All conversion happens here, in both directions, so the rest
//! of the code never mixes the two.

use vhdlsense_base::{Location, Position};

pub fn to_wire_position(p: Position) -> lsp_types::Position {
    lsp_types::Position {
        line: p.line.saturating_sub(1),
        character: p.column.saturating_sub(1),
    }
}

pub fn to_wire_range(l: Location) -> lsp_types::Range {
    lsp_types::Range {
        start: to_wire_position(l.begin),
        end: to_wire_position(l.end),
    }
}

pub fn from_wire_position(p: lsp_types::Position) -> Position {
    Position::new(p.line + 1, p.character + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_one_based_to_wire_zero_based() {
        let p = to_wire_position(Position::new(1, 1));
        assert_eq!(p, lsp_types::Position { line: 0, character: 0 });
        let p = to_wire_position(Position::new(10, 4));
        assert_eq!(p, lsp_types::Position { line: 9, character: 3 });
    }

    #[test]
    fn wire_zero_based_to_internal_one_based() {
        let p = from_wire_position(lsp_types::Position { line: 0, character: 0 });
        assert_eq!(p, Position::new(1, 1));
    }

    #[test]
    fn roundtrip() {
        let original = Position::new(42, 17);
        let back = from_wire_position(to_wire_position(original));
        assert_eq!(back, original);
    }
}
