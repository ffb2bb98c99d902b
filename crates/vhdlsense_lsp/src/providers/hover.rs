//! Hover.
//!
//! A guided descent to the name under the cursor, then a one-line markdown
//! summary of its denotation: a declaration summary for a single
//! denotation, the overload count for several, "not found" for none.

use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};
use vhdlsense_base::Position;
use vhdlsense_vhdl::ast::Ast;

use crate::providers::name_at;
use crate::wire::to_wire_range;

pub fn hover(ast: &Ast, position: Position) -> Option<Hover> {
    let name = name_at(ast, position)?;

    let text = name
        .designator()
        .map(|t| ast.strings().resolve(t.value).to_string())
        .unwrap_or_default();

    let value = match name.denotes.len() {
        0 => format!("`{text}`: not found"),
        1 => match ast.entity(name.denotes[0]) {
            Some(entity) => {
                let identifier = ast.strings().resolve(entity.identifier);
                format!("{} `{}`", entity.kind.describe(), identifier)
            }
            None => format!("`{text}`: not found"),
        },
        n => format!("`{text}`: {n} overloads"),
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(to_wire_range(name.span)),
    })
}
