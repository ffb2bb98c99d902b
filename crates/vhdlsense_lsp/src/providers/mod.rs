//! Read-only AST traversals behind the editor queries.
//!
//! All four providers work off the façade's main file. Hover and definition
//! share the guided descent in [`name_at`]: subtrees whose range does not
//! contain the cursor are pruned, and the innermost name containing the
//! cursor wins.

pub mod definition;
pub mod folding;
pub mod hover;
pub mod symbols;

use vhdlsense_base::Position;
use vhdlsense_vhdl::ast::Ast;
use vhdlsense_vhdl::syntax::*;

/// The innermost name under the cursor, searched across the main file's
/// units.
pub(crate) fn name_at(ast: &Ast, pos: Position) -> Option<&Name> {
    let main = ast.get_main_file()?;
    for &uid in &main.units {
        let Some(unit) = ast.unit(uid) else { continue };
        if !unit.syntax.span.contains(pos) {
            continue;
        }
        if let Some(name) = in_unit(&unit.syntax, pos) {
            return Some(name);
        }
    }
    None
}

fn in_unit(unit: &DesignUnit, pos: Position) -> Option<&Name> {
    for context in &unit.contexts {
        if let ContextItemKind::UseClause { names } = &context.kind {
            if let Some(found) = names.iter().find_map(|n| in_name(n, pos)) {
                return Some(found);
            }
        }
    }

    match &unit.kind {
        DesignUnitKind::Entity(e) => {
            in_interface_clause(&e.generics, pos)
                .or_else(|| in_interface_clause(&e.ports, pos))
                .or_else(|| e.decls.iter().find_map(|d| in_decl(d, pos)))
                .or_else(|| e.stmts.iter().find_map(|s| in_concurrent(s, pos)))
        }
        DesignUnitKind::Architecture(a) => in_name(&a.entity_name, pos)
            .or_else(|| a.decls.iter().find_map(|d| in_decl(d, pos)))
            .or_else(|| a.stmts.iter().find_map(|s| in_concurrent(s, pos))),
        DesignUnitKind::Package(p) => p.decls.iter().find_map(|d| in_decl(d, pos)),
        DesignUnitKind::PackageBody(p) => p.decls.iter().find_map(|d| in_decl(d, pos)),
        DesignUnitKind::Configuration(c) => in_name(&c.entity_name, pos)
            .or_else(|| c.decls.iter().find_map(|d| in_decl(d, pos))),
    }
}

fn in_interface_clause<'a>(
    clause: &'a Option<InterfaceClause>,
    pos: Position,
) -> Option<&'a Name> {
    clause
        .as_ref()?
        .items
        .iter()
        .find_map(|item| in_decl(item, pos))
}

fn in_decl(item: &DeclarativeItem, pos: Position) -> Option<&Name> {
    if !item.span.contains(pos) {
        return None;
    }

    match &item.kind {
        DeclKind::Type(t) => t.def.as_ref().and_then(|d| in_type_def(d, pos)),
        DeclKind::Subtype(s) => in_subtype(&s.indication, pos),
        DeclKind::Object(o) => in_subtype(&o.indication, pos)
            .or_else(|| o.value.as_ref().and_then(|e| in_expr(e, pos)))
            .or_else(|| o.open_kind.as_ref().and_then(|e| in_expr(e, pos)))
            .or_else(|| o.file_name.as_ref().and_then(|e| in_expr(e, pos))),
        DeclKind::Interface(i) => in_subtype(&i.indication, pos)
            .or_else(|| i.value.as_ref().and_then(|e| in_expr(e, pos))),
        DeclKind::Alias(a) => a
            .indication
            .as_ref()
            .and_then(|s| in_subtype(s, pos))
            .or_else(|| in_name(&a.name, pos)),
        DeclKind::Subprogram(s) => in_subprogram_spec(&s.spec, pos),
        DeclKind::SubprogramBody(b) => in_subprogram_spec(&b.spec, pos)
            .or_else(|| b.decls.iter().find_map(|d| in_decl(d, pos)))
            .or_else(|| b.stmts.iter().find_map(|s| in_sequential(s, pos))),
        DeclKind::Component(c) => in_interface_clause(&c.generics, pos)
            .or_else(|| in_interface_clause(&c.ports, pos)),
        DeclKind::Attribute(a) => in_name(&a.type_mark, pos),
        DeclKind::AttrSpec(s) => in_expr(&s.expression, pos),
        DeclKind::ConfigSpec(c) => in_name(&c.component, pos),
        DeclKind::Use(u) => u.names.iter().find_map(|n| in_name(n, pos)),
    }
}

fn in_subprogram_spec(spec: &SubprogramSpec, pos: Position) -> Option<&Name> {
    spec.parameters
        .iter()
        .find_map(|p| in_decl(p, pos))
        .or_else(|| spec.return_mark.as_ref().and_then(|m| in_name(m, pos)))
}

fn in_type_def(def: &TypeDefinition, pos: Position) -> Option<&Name> {
    match &def.kind {
        TypeDefKind::Enumeration { .. } => None,
        TypeDefKind::Integer { range }
        | TypeDefKind::Floating { range }
        | TypeDefKind::Physical { range, .. } => in_range(range, pos),
        TypeDefKind::ConstrainedArray { indices, element } => indices
            .iter()
            .find_map(|r| in_discrete_range(r, pos))
            .or_else(|| in_subtype(element, pos)),
        TypeDefKind::UnconstrainedArray { index_marks, element } => index_marks
            .iter()
            .find_map(|m| in_name(m, pos))
            .or_else(|| in_subtype(element, pos)),
        TypeDefKind::Record { elements, .. } => elements
            .iter()
            .find_map(|e| in_subtype(&e.subtype, pos)),
        TypeDefKind::Access { subtype } => in_subtype(subtype, pos),
        TypeDefKind::File { type_mark } => in_name(type_mark, pos),
    }
}

fn in_subtype(subtype: &Subtype, pos: Position) -> Option<&Name> {
    if !subtype.span.contains(pos) {
        return None;
    }
    subtype
        .resolution
        .as_ref()
        .and_then(|r| in_name(r, pos))
        .or_else(|| in_name(&subtype.mark, pos))
        .or_else(|| match &subtype.constraint {
            Some(Constraint::Range(r)) => in_range(r, pos),
            Some(Constraint::Index(indices)) => {
                indices.iter().find_map(|r| in_discrete_range(r, pos))
            }
            None => None,
        })
}

fn in_range(range: &RangeSpec, pos: Position) -> Option<&Name> {
    match range {
        RangeSpec::Upto { lhs, rhs } | RangeSpec::Downto { lhs, rhs } => {
            in_expr(lhs, pos).or_else(|| in_expr(rhs, pos))
        }
        RangeSpec::Attribute(name) => in_name(name, pos),
    }
}

fn in_discrete_range(range: &DiscreteRange, pos: Position) -> Option<&Name> {
    match range {
        DiscreteRange::Range(r) => in_range(r, pos),
        DiscreteRange::Subtype(s) => in_subtype(s, pos),
    }
}

fn in_expr(expr: &Expression, pos: Position) -> Option<&Name> {
    if !expr.span.contains(pos) {
        return None;
    }

    match &expr.kind {
        ExprKind::Binary { lhs, rhs, .. } => in_expr(lhs, pos).or_else(|| in_expr(rhs, pos)),
        ExprKind::Unary { operand, .. } => in_expr(operand, pos),
        ExprKind::Literal { .. } | ExprKind::Null => None,
        ExprKind::Physical { unit, .. } => in_name(unit, pos),
        ExprKind::Aggregate { elements } => elements.iter().find_map(|e| {
            e.choices
                .iter()
                .find_map(|c| in_choice(c, pos))
                .or_else(|| in_expr(&e.expression, pos))
        }),
        ExprKind::Unresolved { name } => in_name(name, pos),
        ExprKind::Allocator { subtype, qualified } => subtype
            .as_ref()
            .and_then(|s| in_subtype(s, pos))
            .or_else(|| qualified.as_ref().and_then(|q| in_expr(q, pos))),
        ExprKind::Nested { expr } => in_expr(expr, pos),
    }
}

fn in_choice(choice: &Choice, pos: Position) -> Option<&Name> {
    match choice {
        Choice::Expression(e) => in_expr(e, pos),
        Choice::DiscreteRange(r) => in_discrete_range(r, pos),
        Choice::Others(_) => None,
    }
}

fn in_association_list(list: &[AssociationElement], pos: Position) -> Option<&Name> {
    list.iter().find_map(|element| {
        element
            .formal
            .as_ref()
            .and_then(|f| in_name(f, pos))
            .or_else(|| element.actual.as_ref().and_then(|a| in_expr(a, pos)))
    })
}

fn in_sequential(stmt: &SequentialStatement, pos: Position) -> Option<&Name> {
    if !stmt.span.contains(pos) {
        return None;
    }

    match &stmt.kind {
        SeqStmt::Wait { on, until, timeout } => on
            .iter()
            .find_map(|n| in_name(n, pos))
            .or_else(|| until.as_ref().and_then(|e| in_expr(e, pos)))
            .or_else(|| timeout.as_ref().and_then(|e| in_expr(e, pos))),
        SeqStmt::Assertion { condition, report, severity } => in_expr(condition, pos)
            .or_else(|| report.as_ref().and_then(|e| in_expr(e, pos)))
            .or_else(|| severity.as_ref().and_then(|e| in_expr(e, pos))),
        SeqStmt::Report { report, severity } => in_expr(report, pos)
            .or_else(|| severity.as_ref().and_then(|e| in_expr(e, pos))),
        SeqStmt::SignalAssign { target, waveforms, .. } => in_target(target, pos)
            .or_else(|| in_waveforms(waveforms, pos)),
        SeqStmt::VariableAssign { target, value } => {
            in_target(target, pos).or_else(|| in_expr(value, pos))
        }
        SeqStmt::ProcedureCall { procedure } => in_name(procedure, pos),
        SeqStmt::If(chain) => in_if_chain(chain, pos),
        SeqStmt::ForLoop { parameter, body, .. } => {
            in_discrete_range(&parameter.range, pos)
                .or_else(|| body.iter().find_map(|s| in_sequential(s, pos)))
        }
        SeqStmt::WhileLoop { condition, body, .. } => condition
            .as_ref()
            .and_then(|e| in_expr(e, pos))
            .or_else(|| body.iter().find_map(|s| in_sequential(s, pos))),
        SeqStmt::Case { expression, alternatives, .. } => {
            in_expr(expression, pos).or_else(|| {
                alternatives.iter().find_map(|a| {
                    a.choices
                        .iter()
                        .find_map(|c| in_choice(c, pos))
                        .or_else(|| a.stmts.iter().find_map(|s| in_sequential(s, pos)))
                })
            })
        }
        SeqStmt::Next { when, .. } | SeqStmt::Exit { when, .. } => {
            when.as_ref().and_then(|e| in_expr(e, pos))
        }
        SeqStmt::Return { expression } => expression.as_ref().and_then(|e| in_expr(e, pos)),
        SeqStmt::Null => None,
    }
}

fn in_if_chain(chain: &IfStatement, pos: Position) -> Option<&Name> {
    chain
        .condition
        .as_ref()
        .and_then(|e| in_expr(e, pos))
        .or_else(|| chain.then_stmts.iter().find_map(|s| in_sequential(s, pos)))
        .or_else(|| chain.otherwise.as_ref().and_then(|s| in_sequential(s, pos)))
}

fn in_target(target: &Target, pos: Position) -> Option<&Name> {
    match target {
        Target::Name(name) => in_name(name, pos),
        Target::Aggregate(aggregate) => in_expr(aggregate, pos),
    }
}

fn in_waveforms(waveforms: &[WaveformElement], pos: Position) -> Option<&Name> {
    waveforms.iter().find_map(|w| {
        w.value
            .as_ref()
            .and_then(|e| in_expr(e, pos))
            .or_else(|| w.after.as_ref().and_then(|e| in_expr(e, pos)))
    })
}

fn in_concurrent(stmt: &ConcurrentStatement, pos: Position) -> Option<&Name> {
    if !stmt.span.contains(pos) {
        return None;
    }

    match &stmt.kind {
        ConcStmt::Process(p) => p
            .sensitivity
            .iter()
            .find_map(|n| in_name(n, pos))
            .or_else(|| p.decls.iter().find_map(|d| in_decl(d, pos)))
            .or_else(|| p.stmts.iter().find_map(|s| in_sequential(s, pos))),
        ConcStmt::Block(b) => in_interface_clause(&b.generics, pos)
            .or_else(|| in_association_list(&b.generic_map, pos))
            .or_else(|| in_interface_clause(&b.ports, pos))
            .or_else(|| in_association_list(&b.port_map, pos))
            .or_else(|| b.decls.iter().find_map(|d| in_decl(d, pos)))
            .or_else(|| b.stmts.iter().find_map(|s| in_concurrent(s, pos))),
        ConcStmt::Assertion { condition, report, severity } => in_expr(condition, pos)
            .or_else(|| report.as_ref().and_then(|e| in_expr(e, pos)))
            .or_else(|| severity.as_ref().and_then(|e| in_expr(e, pos))),
        ConcStmt::CondAssign { target, waveforms, .. } => {
            in_target(target, pos).or_else(|| {
                waveforms.iter().find_map(|w| {
                    in_waveforms(&w.waveforms, pos)
                        .or_else(|| w.when.as_ref().and_then(|e| in_expr(e, pos)))
                })
            })
        }
        ConcStmt::SelAssign { with_expr, target, waveforms, .. } => in_expr(with_expr, pos)
            .or_else(|| in_target(target, pos))
            .or_else(|| {
                waveforms.iter().find_map(|w| {
                    in_waveforms(&w.waveforms, pos)
                        .or_else(|| w.choices.iter().find_map(|c| in_choice(c, pos)))
                })
            }),
        ConcStmt::ProcedureCall { procedure } => in_name(procedure, pos),
        ConcStmt::Instantiation(inst) => {
            let unit_name = match &inst.unit {
                InstantiatedUnit::Component(n) => in_name(n, pos),
                InstantiatedUnit::Entity { name, .. } => in_name(name, pos),
                InstantiatedUnit::Configuration(n) => in_name(n, pos),
            };
            unit_name
                .or_else(|| in_association_list(&inst.generic_map, pos))
                .or_else(|| in_association_list(&inst.port_map, pos))
        }
        ConcStmt::ForGenerate(gen) => in_discrete_range(&gen.parameter.range, pos)
            .or_else(|| gen.decls.iter().find_map(|d| in_decl(d, pos)))
            .or_else(|| gen.stmts.iter().find_map(|s| in_concurrent(s, pos))),
        ConcStmt::IfGenerate(gen) => in_expr(&gen.condition, pos)
            .or_else(|| gen.decls.iter().find_map(|d| in_decl(d, pos)))
            .or_else(|| gen.stmts.iter().find_map(|s| in_concurrent(s, pos))),
    }
}

/// Descend a name, preferring the innermost sub-name containing the cursor;
/// the name itself wins when no child does.
fn in_name(name: &Name, pos: Position) -> Option<&Name> {
    if !name.span.contains(pos) {
        return None;
    }

    let inner = match &name.kind {
        NameKind::Simple { .. } | NameKind::Error => None,
        NameKind::Selected { prefix, .. } => in_name(prefix, pos),
        NameKind::Slice { prefix, range } => {
            in_name(prefix, pos).or_else(|| in_discrete_range(range, pos))
        }
        NameKind::Ambiguous { prefix, args } => in_name(prefix, pos)
            .or_else(|| args.iter().find_map(|e| in_expr(e, pos))),
        NameKind::Fcall { prefix, args } => {
            in_name(prefix, pos).or_else(|| in_association_list(args, pos))
        }
        NameKind::Attribute { prefix, expression, .. } => in_name(prefix, pos)
            .or_else(|| expression.as_ref().and_then(|e| in_expr(e, pos))),
        NameKind::Qualified { prefix, expression } => {
            in_name(prefix, pos).or_else(|| in_expr(expression, pos))
        }
        NameKind::Signature { prefix, signature } => in_name(prefix, pos)
            .or_else(|| signature.marks.iter().find_map(|m| in_name(m, pos))),
    };

    Some(inner.unwrap_or(name))
}
