//! Document symbols.
//!
//! A nested tree rooted at the design units. Containers (units, processes,
//! subprogram bodies) open child emission; leaves close immediately.

use lsp_types::{DocumentSymbol, SymbolKind};
use vhdlsense_base::Location;
use vhdlsense_vhdl::ast::Ast;
use vhdlsense_vhdl::syntax::*;
use vhdlsense_vhdl::token::Token;

use crate::wire::to_wire_range;

pub fn document_symbols(ast: &Ast) -> Vec<DocumentSymbol> {
    let mut out = Vec::new();

    let Some(main) = ast.get_main_file() else {
        return out;
    };

    for &uid in &main.units {
        let Some(unit) = ast.unit(uid) else { continue };
        if let Some(symbol) = unit_symbol(ast, &unit.syntax) {
            out.push(symbol);
        }
    }

    out
}

fn unit_symbol(ast: &Ast, unit: &DesignUnit) -> Option<DocumentSymbol> {
    let (kind, identifier, children) = match &unit.kind {
        DesignUnitKind::Entity(e) => {
            let mut children = Vec::new();
            if let Some(ports) = &e.ports {
                children.extend(interface_symbols(ast, ports));
            }
            if let Some(generics) = &e.generics {
                children.extend(interface_symbols(ast, generics));
            }
            children.extend(decl_symbols(ast, &e.decls));
            children.extend(conc_symbols(ast, &e.stmts));
            (SymbolKind::MODULE, e.identifier, children)
        }
        DesignUnitKind::Architecture(a) => {
            let mut children = decl_symbols(ast, &a.decls);
            children.extend(conc_symbols(ast, &a.stmts));
            (SymbolKind::MODULE, a.identifier, children)
        }
        DesignUnitKind::Package(p) => {
            (SymbolKind::PACKAGE, p.identifier, decl_symbols(ast, &p.decls))
        }
        DesignUnitKind::PackageBody(p) => {
            (SymbolKind::PACKAGE, p.identifier, decl_symbols(ast, &p.decls))
        }
        DesignUnitKind::Configuration(c) => (SymbolKind::MODULE, c.identifier, Vec::new()),
    };

    Some(symbol(ast, identifier, kind, unit.span, children))
}

fn interface_symbols(ast: &Ast, clause: &InterfaceClause) -> Vec<DocumentSymbol> {
    let mut out = Vec::new();
    for item in &clause.items {
        if let DeclKind::Interface(i) = &item.kind {
            let kind = match i.class {
                ObjectClass::Constant => SymbolKind::CONSTANT,
                ObjectClass::Signal => SymbolKind::FIELD,
                ObjectClass::Variable => SymbolKind::VARIABLE,
                ObjectClass::File => SymbolKind::FILE,
            };
            for identifier in &i.identifiers {
                out.push(symbol(ast, *identifier, kind, item.span, Vec::new()));
            }
        }
    }
    out
}

fn decl_symbols(ast: &Ast, decls: &[DeclarativeItem]) -> Vec<DocumentSymbol> {
    let mut out = Vec::new();

    for item in decls {
        match &item.kind {
            DeclKind::Type(t) => {
                let kind = match &t.def {
                    Some(TypeDefinition { kind: TypeDefKind::Enumeration { .. }, .. }) => {
                        SymbolKind::ENUM
                    }
                    Some(TypeDefinition { kind: TypeDefKind::Record { .. }, .. }) => {
                        SymbolKind::STRUCT
                    }
                    _ => SymbolKind::CLASS,
                };
                let mut children = Vec::new();
                if let Some(TypeDefinition {
                    kind: TypeDefKind::Record { elements, .. },
                    ..
                }) = &t.def
                {
                    for element in elements {
                        for identifier in &element.identifiers {
                            children.push(symbol(
                                ast,
                                *identifier,
                                SymbolKind::FIELD,
                                element.span,
                                Vec::new(),
                            ));
                        }
                    }
                }
                out.push(symbol(ast, t.identifier, kind, item.span, children));
            }
            DeclKind::Subtype(s) => {
                out.push(symbol(ast, s.identifier, SymbolKind::CLASS, item.span, Vec::new()));
            }
            DeclKind::Object(o) => {
                let kind = match o.class {
                    ObjectClass::Constant => SymbolKind::CONSTANT,
                    ObjectClass::Signal => SymbolKind::FIELD,
                    ObjectClass::Variable => SymbolKind::VARIABLE,
                    ObjectClass::File => SymbolKind::FILE,
                };
                for identifier in &o.identifiers {
                    out.push(symbol(ast, *identifier, kind, item.span, Vec::new()));
                }
            }
            DeclKind::Interface(i) => {
                for identifier in &i.identifiers {
                    out.push(symbol(ast, *identifier, SymbolKind::VARIABLE, item.span, Vec::new()));
                }
            }
            DeclKind::Alias(a) => {
                out.push(symbol(ast, a.designator, SymbolKind::VARIABLE, item.span, Vec::new()));
            }
            DeclKind::Subprogram(s) => {
                out.push(symbol(
                    ast,
                    s.spec.designator,
                    SymbolKind::FUNCTION,
                    item.span,
                    Vec::new(),
                ));
            }
            DeclKind::SubprogramBody(b) => {
                let children = decl_symbols(ast, &b.decls);
                out.push(symbol(
                    ast,
                    b.spec.designator,
                    SymbolKind::FUNCTION,
                    item.span,
                    children,
                ));
            }
            DeclKind::Component(c) => {
                out.push(symbol(ast, c.identifier, SymbolKind::INTERFACE, item.span, Vec::new()));
            }
            DeclKind::Attribute(a) => {
                out.push(symbol(ast, a.identifier, SymbolKind::PROPERTY, item.span, Vec::new()));
            }
            DeclKind::AttrSpec(_) | DeclKind::ConfigSpec(_) | DeclKind::Use(_) => {}
        }
    }

    out
}

fn conc_symbols(ast: &Ast, stmts: &[ConcurrentStatement]) -> Vec<DocumentSymbol> {
    let mut out = Vec::new();

    for stmt in stmts {
        match &stmt.kind {
            ConcStmt::Process(p) => {
                let children = decl_symbols(ast, &p.decls);
                let name = stmt
                    .label
                    .map(|l| ast.strings().resolve(l.value).to_string())
                    .unwrap_or_else(|| "process".to_string());
                out.push(named_symbol(
                    name,
                    SymbolKind::METHOD,
                    stmt.span,
                    stmt.label.map(|l| l.location).unwrap_or(p.process_kw),
                    children,
                ));
            }
            ConcStmt::Instantiation(_) => {
                if let Some(label) = stmt.label {
                    out.push(symbol(ast, label, SymbolKind::OBJECT, stmt.span, Vec::new()));
                }
            }
            ConcStmt::Block(b) => {
                let mut children = decl_symbols(ast, &b.decls);
                children.extend(conc_symbols(ast, &b.stmts));
                if let Some(label) = stmt.label {
                    out.push(symbol(ast, label, SymbolKind::NAMESPACE, stmt.span, children));
                }
            }
            ConcStmt::ForGenerate(gen) => {
                let mut children = decl_symbols(ast, &gen.decls);
                children.extend(conc_symbols(ast, &gen.stmts));
                if let Some(label) = stmt.label {
                    out.push(symbol(ast, label, SymbolKind::NAMESPACE, stmt.span, children));
                }
            }
            ConcStmt::IfGenerate(gen) => {
                let mut children = decl_symbols(ast, &gen.decls);
                children.extend(conc_symbols(ast, &gen.stmts));
                if let Some(label) = stmt.label {
                    out.push(symbol(ast, label, SymbolKind::NAMESPACE, stmt.span, children));
                }
            }
            _ => {}
        }
    }

    out
}

fn symbol(
    ast: &Ast,
    identifier: Token,
    kind: SymbolKind,
    range: Location,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    named_symbol(
        ast.strings().resolve(identifier.value).to_string(),
        kind,
        range,
        identifier.location,
        children,
    )
}

#[allow(deprecated)]
fn named_symbol(
    name: String,
    kind: SymbolKind,
    range: Location,
    selection: Location,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    DocumentSymbol {
        name,
        detail: None,
        kind,
        tags: None,
        deprecated: None,
        range: to_wire_range(range),
        selection_range: to_wire_range(selection),
        children: if children.is_empty() { None } else { Some(children) },
    }
}
