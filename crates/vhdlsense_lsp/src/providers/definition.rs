//! Go to definition.
//!
//! Emits one target per denotation of the name under the cursor, with the
//! declaration's full range and the identifier's selection range.
//! Predefined names (whose declarations have no file) produce no target.

use lsp_types::{LocationLink, Url};
use vhdlsense_base::{Position, Symbol};
use vhdlsense_vhdl::ast::Ast;

use crate::providers::name_at;
use crate::wire::to_wire_range;

pub fn definition(ast: &Ast, position: Position) -> Vec<LocationLink> {
    let mut out = Vec::new();

    let Some(name) = name_at(ast, position) else {
        return out;
    };

    for &denote in &name.denotes {
        let Some(entity) = ast.entity(denote) else {
            continue;
        };
        if entity.decl.file == Symbol::EMPTY {
            continue;
        }

        let path = ast.strings().resolve(entity.decl.file);
        let Ok(target_uri) = Url::from_file_path(path) else {
            continue;
        };

        out.push(LocationLink {
            origin_selection_range: Some(to_wire_range(name.span)),
            target_uri,
            target_range: to_wire_range(entity.decl),
            target_selection_range: to_wire_range(entity.selection),
        });
    }

    out
}
