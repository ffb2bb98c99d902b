//! Folding ranges.
//!
//! Emits one range per structural region whose start and end are at least
//! two lines apart: generic/port lists, declaration regions, statement
//! regions, loops, case alternatives, records and enumerations, generate
//! bodies and instantiation maps. Output lines are zero-based; the fold
//! closes on the line before the terminating keyword.

use lsp_types::FoldingRange;
use vhdlsense_base::Location;
use vhdlsense_vhdl::ast::Ast;
use vhdlsense_vhdl::syntax::*;

pub fn folding_ranges(ast: &Ast) -> Vec<FoldingRange> {
    let mut out = Vec::new();

    let Some(main) = ast.get_main_file() else {
        return out;
    };

    for &uid in &main.units {
        let Some(unit) = ast.unit(uid) else { continue };
        unit_ranges(&unit.syntax, &mut out);
    }

    out
}

fn foldable(from: Location, to: Location, out: &mut Vec<FoldingRange>) {
    if to.begin.line < from.end.line + 2 {
        return;
    }
    out.push(FoldingRange {
        start_line: from.end.line - 1,
        start_character: Some(from.end.column),
        end_line: to.begin.line - 2,
        end_character: Some(to.begin.column),
        ..Default::default()
    });
}

fn foldable_opt(from: Option<Location>, to: Option<Location>, out: &mut Vec<FoldingRange>) {
    if let (Some(from), Some(to)) = (from, to) {
        foldable(from, to, out);
    }
}

/// A zero-width location at the end of `span`, for folds that close where a
/// statement does.
fn at_end(span: Location) -> Location {
    Location::new(span.file, span.end, span.end)
}

fn unit_ranges(unit: &DesignUnit, out: &mut Vec<FoldingRange>) {
    match &unit.kind {
        DesignUnitKind::Entity(e) => {
            interface_ranges(&e.generics, out);
            interface_ranges(&e.ports, out);
            match e.begin_kw {
                Some(begin) => {
                    foldable(e.is_kw, begin, out);
                    foldable(begin, e.end_kw, out);
                }
                None => foldable(e.is_kw, e.end_kw, out),
            }
            decl_list_ranges(&e.decls, out);
            conc_list_ranges(&e.stmts, out);
        }
        DesignUnitKind::Architecture(a) => {
            foldable(a.is_kw, a.begin_kw, out);
            foldable(a.begin_kw, a.end_kw, out);
            decl_list_ranges(&a.decls, out);
            conc_list_ranges(&a.stmts, out);
        }
        DesignUnitKind::Package(p) => {
            foldable(p.is_kw, p.end_kw, out);
            decl_list_ranges(&p.decls, out);
        }
        DesignUnitKind::PackageBody(p) => {
            foldable(p.is_kw, p.end_kw, out);
            decl_list_ranges(&p.decls, out);
        }
        DesignUnitKind::Configuration(c) => {
            foldable(c.is_kw, c.end_kw, out);
            decl_list_ranges(&c.decls, out);
            if let Some(block) = &c.block {
                foldable(block.for_kw, block.end_kw, out);
            }
        }
    }
}

fn interface_ranges(clause: &Option<InterfaceClause>, out: &mut Vec<FoldingRange>) {
    if let Some(clause) = clause {
        foldable(clause.lparen, clause.rparen, out);
        decl_list_ranges(&clause.items, out);
    }
}

fn decl_list_ranges(decls: &[DeclarativeItem], out: &mut Vec<FoldingRange>) {
    for decl in decls {
        decl_ranges(decl, out);
    }
}

fn decl_ranges(decl: &DeclarativeItem, out: &mut Vec<FoldingRange>) {
    match &decl.kind {
        DeclKind::Type(t) => {
            if let Some(def) = &t.def {
                match &def.kind {
                    TypeDefKind::Enumeration { lparen, rparen, .. } => {
                        foldable(*lparen, *rparen, out)
                    }
                    TypeDefKind::Record { record_kw, end_kw, .. } => {
                        foldable(*record_kw, *end_kw, out)
                    }
                    TypeDefKind::Physical { units_kw, end_kw, .. } => {
                        foldable(*units_kw, *end_kw, out)
                    }
                    _ => {}
                }
            }
        }
        DeclKind::Subprogram(s) => {
            foldable_opt(s.spec.lparen, s.spec.rparen, out);
        }
        DeclKind::SubprogramBody(b) => {
            foldable_opt(b.spec.lparen, b.spec.rparen, out);
            foldable(b.is_kw, b.begin_kw, out);
            foldable(b.begin_kw, b.end_kw, out);
            decl_list_ranges(&b.decls, out);
            seq_list_ranges(&b.stmts, out);
        }
        DeclKind::Component(c) => {
            interface_ranges(&c.generics, out);
            interface_ranges(&c.ports, out);
        }
        _ => {}
    }
}

fn seq_list_ranges(stmts: &[SequentialStatement], out: &mut Vec<FoldingRange>) {
    for stmt in stmts {
        seq_ranges(stmt, out);
    }
}

fn seq_ranges(stmt: &SequentialStatement, out: &mut Vec<FoldingRange>) {
    match &stmt.kind {
        SeqStmt::If(chain) => if_ranges(stmt.span, chain, out),
        SeqStmt::ForLoop { loop_kw, body, end_kw, .. }
        | SeqStmt::WhileLoop { loop_kw, body, end_kw, .. } => {
            foldable(*loop_kw, *end_kw, out);
            seq_list_ranges(body, out);
        }
        SeqStmt::Case { is_kw, alternatives, end_kw, .. } => {
            foldable(*is_kw, *end_kw, out);
            for (i, alternative) in alternatives.iter().enumerate() {
                let to = alternatives
                    .get(i + 1)
                    .map(|next| next.when_kw)
                    .unwrap_or(*end_kw);
                foldable(alternative.when_kw, to, out);
                seq_list_ranges(&alternative.stmts, out);
            }
        }
        _ => {}
    }
}

fn if_ranges(span: vhdlsense_base::Location, chain: &IfStatement, out: &mut Vec<FoldingRange>) {
    let close = chain
        .otherwise
        .as_ref()
        .map(|next| next.span)
        .unwrap_or_else(|| at_end(span));
    // fold from `then` down to the next link (or the end of the chain)
    foldable(chain.then_kw, close, out);
    seq_list_ranges(&chain.then_stmts, out);
    if let Some(next) = &chain.otherwise {
        if let SeqStmt::If(inner) = &next.kind {
            if_ranges(next.span, inner, out);
        }
    }
}

fn conc_list_ranges(stmts: &[ConcurrentStatement], out: &mut Vec<FoldingRange>) {
    for stmt in stmts {
        conc_ranges(stmt, out);
    }
}

fn conc_ranges(stmt: &ConcurrentStatement, out: &mut Vec<FoldingRange>) {
    match &stmt.kind {
        ConcStmt::Process(p) => {
            foldable(p.process_kw, p.begin_kw, out);
            foldable(p.begin_kw, p.end_kw, out);
            decl_list_ranges(&p.decls, out);
            seq_list_ranges(&p.stmts, out);
        }
        ConcStmt::Block(b) => {
            foldable(b.block_kw, b.begin_kw, out);
            foldable(b.begin_kw, b.end_kw, out);
            interface_ranges(&b.generics, out);
            interface_ranges(&b.ports, out);
            decl_list_ranges(&b.decls, out);
            conc_list_ranges(&b.stmts, out);
        }
        ConcStmt::Instantiation(inst) => {
            if let Some(kw) = inst.generic_map_kw {
                let to = inst.port_map_kw.unwrap_or_else(|| at_end(stmt.span));
                foldable(kw, to, out);
            }
            if let Some(kw) = inst.port_map_kw {
                foldable(kw, at_end(stmt.span), out);
            }
        }
        ConcStmt::ForGenerate(ForGenerate { generate_kw, decls, stmts, end_kw, .. })
        | ConcStmt::IfGenerate(IfGenerate { generate_kw, decls, stmts, end_kw, .. }) => {
            foldable(*generate_kw, *end_kw, out);
            decl_list_ranges(decls, out);
            conc_list_ranges(stmts, out);
        }
        _ => {}
    }
}
