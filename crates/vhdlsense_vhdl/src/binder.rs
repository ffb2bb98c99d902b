//! Name resolution.
//!
//! A single pass over one library unit's AST. The binder opens and closes
//! declarative regions as it walks, attaches one named entity per declared
//! identifier, and fills every name occurrence's `denotes` list with the
//! entities reachable under the visibility rules of LRM93 chapter 10:
//!
//! 1. collect matching entities in the current region (falling back to the
//!    potentially visible shapes installed by use clauses),
//! 2. follow `extends` when set (an architecture continues into its
//!    entity), otherwise follow `outer`,
//! 3. repeat until the chain ends.
//!
//! Resolution never prunes by type or arity — overload resolution is
//! deferred to consumers, which see the raw list. Diagnostics accumulate
//! and are never fatal; the pass always finishes so that as many names as
//! possible get annotated.

use vhdlsense_base::{Diagnostic, Location, Symbol};

use crate::ast::Ast;
use crate::node::{
    DirectVisibility, EntityKind, EntityRef, LibraryUnitState, NamedEntity, RegionArena, RegionId,
    RegionKind, UnitId,
};
use crate::syntax::*;
use crate::token::Token;

const LIBRARY_WORK_NOT_ALLOWED: &str = "Library work is not allowed";
const MULTIPLE_ENTITIES: &str = "Multiple entities were found and could not be resolved";
const ENTITY_NOT_FOUND: &str = "Entity {} was not found in library {}";
const MULTIPLE_NAMED_ENTITIES: &str =
    "Multiple named entities {} were found and could not be resolved";
const CANNOT_SELECT: &str = "{} cannot be selected by name";
const UNRESOLVED_NAME: &str = "{} is not declared";

pub struct Binder<'a> {
    ast: &'a mut Ast,
    unit_id: UnitId,
    arena: RegionArena,
    current: Option<RegionId>,
    root: Option<RegionId>,
    self_entity: Option<crate::node::EntityId>,
    dependencies: Vec<UnitId>,
    diagnostics: Vec<Diagnostic>,
    work_symbol: Symbol,
    all_symbol: Symbol,
}

/// Everything a binder run produces, installed into the library unit by the
/// façade.
pub struct BindResult {
    pub arena: RegionArena,
    pub root_region: Option<RegionId>,
    pub self_entity: Option<crate::node::EntityId>,
    pub dependencies: Vec<UnitId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Binder<'a> {
    pub fn new(ast: &'a mut Ast, unit_id: UnitId) -> Self {
        let work_symbol = ast.strings_mut().intern_str("work");
        let all_symbol = ast.strings_mut().intern_str("all");
        Binder {
            ast,
            unit_id,
            arena: RegionArena::new(),
            current: None,
            root: None,
            self_entity: None,
            dependencies: Vec::new(),
            diagnostics: Vec::new(),
            work_symbol,
            all_symbol,
        }
    }

    pub fn bind(mut self, unit: &mut DesignUnit) -> BindResult {
        self.open_region(RegionKind::Root);
        self.root = self.current;
        self.install_standard();

        match &mut unit.kind {
            DesignUnitKind::Entity(e) => {
                let contexts = &mut unit.contexts;
                self.bind_entity_declaration(unit.span, contexts, e);
            }
            DesignUnitKind::Architecture(a) => {
                let contexts = &mut unit.contexts;
                self.bind_architecture_body(unit.span, contexts, a);
            }
            DesignUnitKind::Package(p) => {
                let contexts = &mut unit.contexts;
                self.bind_package_declaration(unit.span, contexts, p);
            }
            DesignUnitKind::PackageBody(p) => {
                let contexts = &mut unit.contexts;
                self.bind_package_body(unit.span, contexts, p);
            }
            DesignUnitKind::Configuration(c) => {
                let contexts = &mut unit.contexts;
                self.bind_configuration_declaration(unit.span, contexts, c);
            }
        }

        BindResult {
            arena: self.arena,
            root_region: self.root,
            self_entity: self.self_entity,
            dependencies: self.dependencies,
            diagnostics: self.diagnostics,
        }
    }

    // ------------------------------------------------------------------------
    // Design units (LRM93 1.0, 2.0)
    // ------------------------------------------------------------------------

    fn bind_entity_declaration(
        &mut self,
        span: Location,
        contexts: &mut [ContextItem],
        e: &mut EntityDecl,
    ) {
        let entity =
            NamedEntity::new(e.identifier.value, EntityKind::Entity, span, e.identifier.location);
        let id = self.add_named_entity(entity);
        self.self_entity = Some(id);

        self.bind_context_clause(contexts);

        self.open_region(RegionKind::Entity);
        e.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        if let Some(generics) = &mut e.generics {
            for decl in &mut generics.items {
                self.bind_declarative_item(decl);
            }
        }
        if let Some(ports) = &mut e.ports {
            for decl in &mut ports.items {
                self.bind_declarative_item(decl);
            }
        }
        for decl in &mut e.decls {
            self.bind_declarative_item(decl);
        }
        for stmt in &mut e.stmts {
            self.bind_concurrent_statement(stmt);
        }

        self.close_region();
    }

    fn bind_architecture_body(
        &mut self,
        span: Location,
        contexts: &mut [ContextItem],
        a: &mut ArchitectureBody,
    ) {
        let entity = NamedEntity::new(
            a.identifier.value,
            EntityKind::Architecture,
            span,
            a.identifier.location,
        );
        let id = self.add_named_entity(entity);
        self.self_entity = Some(id);

        self.bind_context_clause(contexts);

        self.open_region(RegionKind::Architecture);
        a.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        if let Some(extends) = self.resolve_denotes_entity(&mut a.entity_name) {
            let current = self.current.expect("region open");
            self.arena.region_mut(current).extends = Some(extends);
        }

        for decl in &mut a.decls {
            self.bind_declarative_item(decl);
        }
        for stmt in &mut a.stmts {
            self.bind_concurrent_statement(stmt);
        }

        self.close_region();
    }

    fn bind_package_declaration(
        &mut self,
        span: Location,
        contexts: &mut [ContextItem],
        p: &mut PackageDecl,
    ) {
        let entity =
            NamedEntity::new(p.identifier.value, EntityKind::Package, span, p.identifier.location);
        let id = self.add_named_entity(entity);
        self.self_entity = Some(id);

        self.bind_context_clause(contexts);

        self.open_region(RegionKind::Package);
        p.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        for decl in &mut p.decls {
            self.bind_declarative_item(decl);
        }

        self.close_region();
    }

    fn bind_package_body(
        &mut self,
        span: Location,
        contexts: &mut [ContextItem],
        p: &mut PackageBody,
    ) {
        let entity = NamedEntity::new(
            p.identifier.value,
            EntityKind::PackageBody,
            span,
            p.identifier.location,
        );
        let id = self.add_named_entity(entity);
        self.self_entity = Some(id);

        self.bind_context_clause(contexts);

        self.open_region(RegionKind::PackageBody);
        p.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        for decl in &mut p.decls {
            self.bind_declarative_item(decl);
        }

        self.close_region();
    }

    fn bind_configuration_declaration(
        &mut self,
        span: Location,
        contexts: &mut [ContextItem],
        c: &mut ConfigurationDecl,
    ) {
        let entity = NamedEntity::new(
            c.identifier.value,
            EntityKind::Configuration,
            span,
            c.identifier.location,
        );
        let id = self.add_named_entity(entity);
        self.self_entity = Some(id);

        self.bind_context_clause(contexts);

        self.open_region(RegionKind::Configuration);
        c.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        self.close_region();
    }

    // ------------------------------------------------------------------------
    // Context clause (LRM93 11.0)
    // ------------------------------------------------------------------------

    fn bind_context_clause(&mut self, contexts: &mut [ContextItem]) {
        for item in contexts {
            let span = item.span;
            match &mut item.kind {
                ContextItemKind::LibraryClause { names } => {
                    self.bind_library_clause(span, names)
                }
                ContextItemKind::UseClause { names } => self.bind_use_clause(names),
            }
        }
    }

    fn bind_library_clause(&mut self, span: Location, names: &[Token]) {
        for (i, logical_name) in names.iter().enumerate() {
            if logical_name.value == self.work_symbol {
                self.diag(LIBRARY_WORK_NOT_ALLOWED, logical_name.location);
            }

            let entity = NamedEntity::new(
                logical_name.value,
                EntityKind::Library,
                span,
                logical_name.location,
            )
            .with_index(i as u32);
            self.add_named_entity(entity);
        }
    }

    fn bind_use_clause(&mut self, names: &mut [Name]) {
        for name in names {
            if let Some(shape) = self.resolve_use_name(name) {
                let current = self.current.expect("region open");
                self.arena.region_mut(current).potentially_visible.push(shape);
            }
        }
    }

    /// Resolve one use-clause name into a potentially-visible shape.
    ///
    /// `use lib.pkg.all` installs every entity of the package's region;
    /// `use lib.pkg.name` installs exactly what `name` resolved to.
    fn resolve_use_name(&mut self, name: &mut Name) -> Option<DirectVisibility> {
        let NameKind::Selected { identifier, .. } = &name.kind else {
            self.resolve(name);
            return Some(DirectVisibility { entities: name.denotes.clone() });
        };
        let identifier = *identifier;

        if identifier.value != self.all_symbol {
            self.resolve(name);
            return Some(DirectVisibility { entities: name.denotes.clone() });
        }

        // `use prefix.all`
        let NameKind::Selected { prefix, .. } = &mut name.kind else {
            unreachable!()
        };
        self.resolve(prefix);

        let denotes = prefix.denotes.clone();
        match denotes.len() {
            0 => return None,
            1 => {}
            _ => {
                self.diag(MULTIPLE_ENTITIES, identifier.location);
                return None;
            }
        }

        let target = denotes[0];
        let Some(entity) = self.entity(target) else {
            return None;
        };

        match entity.kind {
            EntityKind::Package => {
                let region = entity.region?;
                let entities = self.region_entity_refs(target.unit, region);
                name.denotes = entities.clone();
                Some(DirectVisibility { entities })
            }
            EntityKind::Library => Some(DirectVisibility::default()),
            _ => Some(DirectVisibility::default()),
        }
    }

    /// Resolve an architecture's entity name to the entity's region.
    fn resolve_denotes_entity(&mut self, name: &mut Name) -> Option<(UnitId, RegionId)> {
        let NameKind::Simple { identifier } = &name.kind else {
            return None;
        };
        let identifier = *identifier;

        let candidates = self.ast.load_primary_unit(None, identifier.value, None);
        for candidate in candidates {
            if self.ast.unit_state(candidate) != Some(LibraryUnitState::Analysed) {
                continue;
            }
            let Some(self_entity) = self.ast.unit_self_entity(candidate) else {
                continue;
            };
            let Some(entity) = self.ast.entity(self_entity) else {
                continue;
            };
            if entity.kind != EntityKind::Entity {
                continue;
            }
            self.link_dependency(candidate);
            name.denotes.push(self_entity);
        }

        match name.denotes.len() {
            0 => {
                let text = self.ast.strings().resolve(identifier.value).to_string();
                let work = self.ast.work_library_name().to_string();
                self.diagnostics.push(
                    Diagnostic::new(ENTITY_NOT_FOUND, identifier.location)
                        .arg(text)
                        .arg(work),
                );
                None
            }
            1 => {
                let target = name.denotes[0];
                let region = self.entity(target).and_then(|e| e.region)?;
                Some((target.unit, region))
            }
            _ => {
                let text = self.ast.strings().resolve(identifier.value).to_string();
                self.diagnostics.push(
                    Diagnostic::new(MULTIPLE_NAMED_ENTITIES, identifier.location).arg(text),
                );
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Declarations (LRM93 4.0)
    // ------------------------------------------------------------------------

    fn bind_declarative_item(&mut self, item: &mut DeclarativeItem) {
        let span = item.span;
        match &mut item.kind {
            DeclKind::Type(t) => self.bind_type_declaration(span, t),
            DeclKind::Subtype(s) => self.bind_subtype_declaration(span, s),
            DeclKind::Object(o) => self.bind_object_declaration(span, o),
            DeclKind::Interface(i) => self.bind_interface_declaration(span, i),
            DeclKind::Alias(a) => self.bind_alias_declaration(span, a),
            DeclKind::Subprogram(s) => self.bind_subprogram_declaration(span, s),
            DeclKind::SubprogramBody(b) => self.bind_subprogram_body(span, b),
            DeclKind::Component(c) => self.bind_component_declaration(span, c),
            DeclKind::Attribute(a) => {
                self.resolve(&mut a.type_mark);
            }
            DeclKind::AttrSpec(s) => {
                self.resolve_expression(&mut s.expression);
            }
            DeclKind::ConfigSpec(c) => {
                self.resolve(&mut c.component);
            }
            DeclKind::Use(u) => self.bind_use_clause(&mut u.names),
        }
    }

    fn bind_type_declaration(&mut self, span: Location, t: &mut TypeDeclaration) {
        let entity =
            NamedEntity::new(t.identifier.value, EntityKind::TypeDecl, span, t.identifier.location);
        let id = self.add_named_entity(entity);

        let Some(def) = &mut t.def else {
            // incomplete type
            return;
        };

        let record_region = self.bind_type_definition(def);
        self.arena.entity_mut(id).record_region = record_region;
    }

    fn bind_subtype_declaration(&mut self, span: Location, s: &mut SubtypeDeclaration) {
        let entity = NamedEntity::new(
            s.identifier.value,
            EntityKind::Subtype,
            span,
            s.identifier.location,
        );
        let id = self.add_named_entity(entity);

        let record_region = self.bind_subtype(&mut s.indication);
        self.arena.entity_mut(id).record_region = record_region;
    }

    /// Bind a subtype indication; returns the record region of the denoted
    /// type, when there is one, so object declarations can record it.
    fn bind_subtype(&mut self, subtype: &mut Subtype) -> Option<(UnitId, RegionId)> {
        self.resolve(&mut subtype.mark);

        let mut record_region = None;
        if subtype.mark.denotes.len() == 1 {
            if let Some(entity) = self.entity(subtype.mark.denotes[0]) {
                if matches!(entity.kind, EntityKind::TypeDecl | EntityKind::Subtype) {
                    record_region = entity.record_region;
                }
            }
        }

        if let Some(constraint) = &mut subtype.constraint {
            self.bind_constraint(constraint);
        }

        record_region
    }

    fn bind_constraint(&mut self, constraint: &mut Constraint) {
        match constraint {
            Constraint::Range(range) => self.bind_range(range),
            Constraint::Index(indices) => {
                for index in indices {
                    self.bind_discrete_range(index);
                }
            }
        }
    }

    fn bind_object_declaration(&mut self, span: Location, o: &mut ObjectDeclaration) {
        let kind = match o.class {
            ObjectClass::Constant => EntityKind::Constant,
            ObjectClass::Signal => EntityKind::Signal,
            ObjectClass::Variable => EntityKind::Variable,
            ObjectClass::File => EntityKind::File,
        };

        let mut ids = Vec::new();
        for (i, identifier) in o.identifiers.iter().enumerate() {
            let entity = NamedEntity::new(identifier.value, kind, span, identifier.location)
                .with_index(i as u32);
            ids.push(self.add_named_entity(entity));
        }

        let record_region = self.bind_subtype(&mut o.indication);
        if let Some(record_region) = record_region {
            for id in &ids {
                self.arena.entity_mut(*id).record_region = Some(record_region);
            }
        }

        if let Some(value) = &mut o.value {
            self.resolve_expression(value);
        }
        if let Some(open_kind) = &mut o.open_kind {
            self.resolve_expression(open_kind);
        }
        if let Some(file_name) = &mut o.file_name {
            self.resolve_expression(file_name);
        }
    }

    fn bind_interface_declaration(&mut self, span: Location, i: &mut InterfaceDeclaration) {
        let kind = match i.class {
            ObjectClass::Constant => EntityKind::Constant,
            ObjectClass::Signal => EntityKind::Signal,
            ObjectClass::Variable => EntityKind::Variable,
            ObjectClass::File => EntityKind::File,
        };

        let mut ids = Vec::new();
        for (index, identifier) in i.identifiers.iter().enumerate() {
            let entity = NamedEntity::new(identifier.value, kind, span, identifier.location)
                .with_index(index as u32);
            ids.push(self.add_named_entity(entity));
        }

        let record_region = self.bind_subtype(&mut i.indication);
        if let Some(record_region) = record_region {
            for id in &ids {
                self.arena.entity_mut(*id).record_region = Some(record_region);
            }
        }

        if let Some(value) = &mut i.value {
            self.resolve_expression(value);
        }
    }

    fn bind_alias_declaration(&mut self, span: Location, a: &mut AliasDeclaration) {
        let entity =
            NamedEntity::new(a.designator.value, EntityKind::Alias, span, a.designator.location);
        self.add_named_entity(entity);

        if let Some(indication) = &mut a.indication {
            self.bind_subtype(indication);
        }
        self.resolve(&mut a.name);
    }

    fn bind_subprogram_declaration(&mut self, span: Location, s: &mut SubprogramDeclaration) {
        let kind = match s.spec.kind {
            SubprogramKind::Function => EntityKind::Function,
            SubprogramKind::Procedure => EntityKind::Procedure,
        };
        let entity = NamedEntity::new(
            s.spec.designator.value,
            kind,
            span,
            s.spec.designator.location,
        );
        let id = self.add_named_entity(entity);

        self.open_region(RegionKind::Subprogram);
        s.spec.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        for param in &mut s.spec.parameters {
            self.bind_declarative_item(param);
        }
        if let Some(mark) = &mut s.spec.return_mark {
            self.resolve(mark);
        }

        self.close_region();
    }

    fn bind_subprogram_body(&mut self, span: Location, b: &mut SubprogramBody) {
        let kind = match b.spec.kind {
            SubprogramKind::Function => EntityKind::Function,
            SubprogramKind::Procedure => EntityKind::Procedure,
        };
        let entity = NamedEntity::new(
            b.spec.designator.value,
            kind,
            span,
            b.spec.designator.location,
        );
        let id = self.add_named_entity(entity);

        self.open_region(RegionKind::SubprogramBody);
        b.region = self.current;
        b.spec.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        for param in &mut b.spec.parameters {
            self.bind_declarative_item(param);
        }
        if let Some(mark) = &mut b.spec.return_mark {
            self.resolve(mark);
        }
        for decl in &mut b.decls {
            self.bind_declarative_item(decl);
        }
        for stmt in &mut b.stmts {
            self.bind_sequential_statement(stmt);
        }

        self.close_region();
    }

    fn bind_component_declaration(&mut self, span: Location, c: &mut ComponentDeclaration) {
        let entity = NamedEntity::new(
            c.identifier.value,
            EntityKind::Component,
            span,
            c.identifier.location,
        );
        let id = self.add_named_entity(entity);

        self.open_region(RegionKind::Component);
        c.region = self.current;
        self.arena.entity_mut(id).region = self.current;

        if let Some(generics) = &mut c.generics {
            for decl in &mut generics.items {
                self.bind_declarative_item(decl);
            }
        }
        if let Some(ports) = &mut c.ports {
            for decl in &mut ports.items {
                self.bind_declarative_item(decl);
            }
        }

        self.close_region();
    }

    // ------------------------------------------------------------------------
    // Types (LRM93 3.0)
    // ------------------------------------------------------------------------

    /// Bind a type definition; returns the record region when the definition
    /// is a record.
    fn bind_type_definition(&mut self, def: &mut TypeDefinition) -> Option<(UnitId, RegionId)> {
        let span = def.span;
        match &mut def.kind {
            TypeDefKind::Enumeration { literals, .. } => {
                // enumeration literals land in the enclosing region
                for (i, literal) in literals.iter().enumerate() {
                    let entity = NamedEntity::new(
                        literal.value,
                        EntityKind::EnumLiteral,
                        span,
                        literal.location,
                    )
                    .with_index(i as u32);
                    self.add_named_entity(entity);
                }
                None
            }
            TypeDefKind::Integer { range } | TypeDefKind::Floating { range } => {
                self.bind_range(range);
                None
            }
            TypeDefKind::Physical { range, .. } => {
                self.bind_range(range);
                None
            }
            TypeDefKind::ConstrainedArray { indices, element } => {
                for index in indices {
                    self.bind_discrete_range(index);
                }
                self.bind_subtype(element);
                None
            }
            TypeDefKind::UnconstrainedArray { index_marks, element } => {
                for mark in index_marks {
                    self.resolve(mark);
                }
                self.bind_subtype(element);
                None
            }
            TypeDefKind::Record { elements, region, .. } => {
                self.open_region(RegionKind::Record);
                *region = self.current;

                for element in elements.iter_mut() {
                    let element_span = element.span;
                    let element_type = self.bind_subtype(&mut element.subtype);
                    for (i, identifier) in element.identifiers.iter().enumerate() {
                        let mut entity = NamedEntity::new(
                            identifier.value,
                            EntityKind::Element,
                            element_span,
                            identifier.location,
                        )
                        .with_index(i as u32);
                        entity.record_region = element_type;
                        self.add_named_entity(entity);
                    }
                }

                let record = self.current;
                self.close_region();
                record.map(|r| (self.unit_id, r))
            }
            TypeDefKind::Access { subtype } => {
                self.bind_subtype(subtype);
                None
            }
            TypeDefKind::File { type_mark } => {
                self.resolve(type_mark);
                None
            }
        }
    }

    fn bind_range(&mut self, range: &mut RangeSpec) {
        match range {
            RangeSpec::Upto { lhs, rhs } | RangeSpec::Downto { lhs, rhs } => {
                self.resolve_expression(lhs);
                self.resolve_expression(rhs);
            }
            RangeSpec::Attribute(name) => {
                self.resolve(name);
            }
        }
    }

    fn bind_discrete_range(&mut self, range: &mut DiscreteRange) {
        match range {
            DiscreteRange::Range(r) => self.bind_range(r),
            DiscreteRange::Subtype(s) => {
                self.bind_subtype(s);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Names (LRM93 6.0)
    // ------------------------------------------------------------------------

    pub(crate) fn resolve(&mut self, name: &mut Name) {
        match &mut name.kind {
            NameKind::Simple { .. } => self.lookup_simple_name(name),
            NameKind::Selected { .. } => self.lookup_selected_name(name),
            NameKind::Slice { prefix, range } => {
                self.resolve(prefix);
                self.bind_discrete_range(range);
            }
            NameKind::Ambiguous { prefix, args } => {
                self.resolve(prefix);
                for arg in args {
                    self.resolve_expression(arg);
                }
            }
            NameKind::Fcall { prefix, args } => {
                self.resolve(prefix);
                for arg in args.iter_mut() {
                    if let Some(actual) = &mut arg.actual {
                        self.resolve_expression(actual);
                    }
                }
            }
            NameKind::Attribute { prefix, expression, .. } => {
                self.resolve(prefix);
                if let Some(e) = expression {
                    self.resolve_expression(e);
                }
            }
            NameKind::Qualified { prefix, expression } => {
                self.resolve(prefix);
                self.resolve_expression(expression);
            }
            NameKind::Signature { prefix, .. } => self.resolve(prefix),
            NameKind::Error => {}
        }
    }

    /// §10 visibility walk for a simple name.
    fn lookup_simple_name(&mut self, name: &mut Name) {
        let NameKind::Simple { identifier } = &name.kind else {
            return;
        };
        let identifier = *identifier;

        let mut cursor = self.current.map(|r| (self.unit_id, r));
        while let Some((unit, region)) = cursor {
            let found = self.lookup_in(unit, region, identifier.value);
            name.denotes.extend(found);

            cursor = match self.region_links(unit, region) {
                Some((_, Some(extends))) => Some(extends),
                Some((Some(outer), None)) => Some((unit, outer)),
                _ => None,
            };
        }

        if name.denotes.is_empty() {
            let text = self.ast.strings().resolve(identifier.value).to_string();
            self.diagnostics
                .push(Diagnostic::new(UNRESOLVED_NAME, identifier.location).arg(text));
        }
    }

    fn lookup_selected_name(&mut self, name: &mut Name) {
        let NameKind::Selected { prefix, identifier } = &mut name.kind else {
            return;
        };
        let identifier = *identifier;

        self.resolve(prefix);

        if prefix.denotes.is_empty() {
            return;
        }

        let prefix_denotes = prefix.denotes.clone();
        let mut denotes = Vec::new();

        if prefix_denotes.len() > 1 {
            for target in prefix_denotes {
                self.lookup_expanded_name(target, identifier, &mut denotes);
            }
            name.denotes.extend(denotes);
            return;
        }

        let target = prefix_denotes[0];
        let Some(kind) = self.entity(target).map(|e| e.kind) else {
            return;
        };

        match kind {
            EntityKind::Library
            | EntityKind::Entity
            | EntityKind::Architecture
            | EntityKind::Configuration
            | EntityKind::Package
            | EntityKind::PackageBody
            | EntityKind::Function
            | EntityKind::Procedure => {
                self.lookup_expanded_name(target, identifier, &mut denotes);
            }

            EntityKind::TypeDecl
            | EntityKind::Subtype
            | EntityKind::Alias
            | EntityKind::Component
            | EntityKind::File => {
                let noun = kind.describe().to_string();
                self.diagnostics.push(
                    Diagnostic::new(CANNOT_SELECT, identifier.location).arg(noun),
                );
            }

            EntityKind::Element
            | EntityKind::Constant
            | EntityKind::Signal
            | EntityKind::Variable => {
                self.lookup_selected_element(target, identifier, &mut denotes);
            }

            _ => {}
        }

        name.denotes.extend(denotes);
    }

    /// Expanded name: the prefix denotes a design unit, subprogram or
    /// library; look the suffix up inside it.
    fn lookup_expanded_name(
        &mut self,
        target: EntityRef,
        identifier: Token,
        denotes: &mut Vec<EntityRef>,
    ) {
        let Some(entity) = self.entity(target) else {
            return;
        };

        if entity.kind == EntityKind::Library {
            // demand-load a primary unit of that library
            let library = entity.identifier;
            let candidates = self.ast.load_primary_unit(Some(library), identifier.value, None);
            for candidate in candidates {
                if self.ast.unit_state(candidate) != Some(LibraryUnitState::Analysed) {
                    continue;
                }
                let Some(self_entity) = self.ast.unit_self_entity(candidate) else {
                    continue;
                };
                self.link_dependency(candidate);
                denotes.push(self_entity);
            }
            return;
        }

        let Some(region) = entity.region else {
            return;
        };
        denotes.extend(self.lookup_in(target.unit, region, identifier.value));
    }

    /// Record element selection: the prefix is an object whose type must be
    /// a record.
    fn lookup_selected_element(
        &mut self,
        target: EntityRef,
        identifier: Token,
        denotes: &mut Vec<EntityRef>,
    ) {
        let Some(record_region) = self.entity(target).and_then(|e| e.record_region) else {
            return;
        };
        denotes.extend(self.lookup_in(record_region.0, record_region.1, identifier.value));
    }

    // ------------------------------------------------------------------------
    // Expressions (LRM93 7.0)
    // ------------------------------------------------------------------------

    pub(crate) fn resolve_expression(&mut self, expression: &mut Expression) {
        match &mut expression.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expression(lhs);
                self.resolve_expression(rhs);
            }
            ExprKind::Unary { operand, .. } => self.resolve_expression(operand),
            ExprKind::Literal { .. } | ExprKind::Null => {}
            ExprKind::Physical { unit, .. } => self.resolve(unit),
            ExprKind::Aggregate { elements } => {
                for element in elements {
                    for choice in &mut element.choices {
                        self.bind_choice(choice);
                    }
                    self.resolve_expression(&mut element.expression);
                }
            }
            ExprKind::Unresolved { name } => self.resolve(name),
            ExprKind::Allocator { subtype, qualified } => {
                if let Some(subtype) = subtype {
                    self.bind_subtype(subtype);
                }
                if let Some(qualified) = qualified {
                    self.resolve_expression(qualified);
                }
            }
            ExprKind::Nested { expr } => self.resolve_expression(expr),
        }
    }

    fn bind_choice(&mut self, choice: &mut Choice) {
        match choice {
            Choice::Expression(e) => self.resolve_expression(e),
            Choice::DiscreteRange(r) => self.bind_discrete_range(r),
            Choice::Others(_) => {}
        }
    }

    // ------------------------------------------------------------------------
    // Sequential statements (LRM93 8.0)
    // ------------------------------------------------------------------------

    fn bind_sequential_statement(&mut self, stmt: &mut SequentialStatement) {
        match &mut stmt.kind {
            SeqStmt::Wait { on, until, timeout } => {
                for name in on {
                    self.resolve(name);
                }
                if let Some(until) = until {
                    self.resolve_expression(until);
                }
                if let Some(timeout) = timeout {
                    self.resolve_expression(timeout);
                }
            }
            SeqStmt::Assertion { condition, report, severity } => {
                self.resolve_expression(condition);
                if let Some(report) = report {
                    self.resolve_expression(report);
                }
                if let Some(severity) = severity {
                    self.resolve_expression(severity);
                }
            }
            SeqStmt::Report { report, severity } => {
                self.resolve_expression(report);
                if let Some(severity) = severity {
                    self.resolve_expression(severity);
                }
            }
            SeqStmt::SignalAssign { target, delay, waveforms } => {
                self.bind_target(target);
                if let Some(DelayMechanism::Inertial { reject: Some(reject) }) = delay {
                    self.resolve_expression(reject);
                }
                self.bind_waveform(waveforms);
            }
            SeqStmt::VariableAssign { target, value } => {
                self.bind_target(target);
                self.resolve_expression(value);
            }
            SeqStmt::ProcedureCall { procedure } => self.resolve(procedure),
            SeqStmt::If(chain) => self.bind_if_chain(chain),
            SeqStmt::ForLoop { parameter, body, .. } => {
                self.bind_discrete_range(&mut parameter.range);
                for stmt in body {
                    self.bind_sequential_statement(stmt);
                }
            }
            SeqStmt::WhileLoop { condition, body, .. } => {
                if let Some(condition) = condition {
                    self.resolve_expression(condition);
                }
                for stmt in body {
                    self.bind_sequential_statement(stmt);
                }
            }
            SeqStmt::Case { expression, alternatives, .. } => {
                self.resolve_expression(expression);
                for alternative in alternatives {
                    for choice in &mut alternative.choices {
                        self.bind_choice(choice);
                    }
                    for stmt in &mut alternative.stmts {
                        self.bind_sequential_statement(stmt);
                    }
                }
            }
            SeqStmt::Next { when, .. } | SeqStmt::Exit { when, .. } => {
                if let Some(when) = when {
                    self.resolve_expression(when);
                }
            }
            SeqStmt::Return { expression } => {
                if let Some(expression) = expression {
                    self.resolve_expression(expression);
                }
            }
            SeqStmt::Null => {}
        }
    }

    fn bind_if_chain(&mut self, chain: &mut IfStatement) {
        if let Some(condition) = &mut chain.condition {
            self.resolve_expression(condition);
        }
        for stmt in &mut chain.then_stmts {
            self.bind_sequential_statement(stmt);
        }
        if let Some(otherwise) = &mut chain.otherwise {
            self.bind_sequential_statement(otherwise);
        }
    }

    fn bind_target(&mut self, target: &mut Target) {
        match target {
            Target::Name(name) => self.resolve(name),
            Target::Aggregate(aggregate) => self.resolve_expression(aggregate),
        }
    }

    fn bind_waveform(&mut self, waveforms: &mut [WaveformElement]) {
        for element in waveforms {
            if let Some(value) = &mut element.value {
                self.resolve_expression(value);
            }
            if let Some(after) = &mut element.after {
                self.resolve_expression(after);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Concurrent statements (LRM93 9.0)
    // ------------------------------------------------------------------------

    fn bind_concurrent_statement(&mut self, stmt: &mut ConcurrentStatement) {
        match &mut stmt.kind {
            ConcStmt::Process(process) => {
                self.open_region(RegionKind::Process);
                process.region = self.current;

                for name in &mut process.sensitivity {
                    self.resolve(name);
                }
                for decl in &mut process.decls {
                    self.bind_declarative_item(decl);
                }
                for stmt in &mut process.stmts {
                    self.bind_sequential_statement(stmt);
                }

                self.close_region();
            }
            ConcStmt::Assertion { condition, report, severity } => {
                self.resolve_expression(condition);
                if let Some(report) = report {
                    self.resolve_expression(report);
                }
                if let Some(severity) = severity {
                    self.resolve_expression(severity);
                }
            }
            ConcStmt::CondAssign { target, waveforms, .. } => {
                self.bind_target(target);
                for waveform in waveforms {
                    self.bind_waveform(&mut waveform.waveforms);
                    if let Some(when) = &mut waveform.when {
                        self.resolve_expression(when);
                    }
                }
            }
            ConcStmt::SelAssign { with_expr, target, waveforms, .. } => {
                self.resolve_expression(with_expr);
                self.bind_target(target);
                for waveform in waveforms {
                    self.bind_waveform(&mut waveform.waveforms);
                    for choice in &mut waveform.choices {
                        self.bind_choice(choice);
                    }
                }
            }
            ConcStmt::ProcedureCall { procedure } => self.resolve(procedure),
            ConcStmt::Instantiation(inst) => {
                if let InstantiatedUnit::Component(unit) = &mut inst.unit {
                    self.resolve(unit);
                }

                self.open_region(RegionKind::Instantiation);
                inst.region = self.current;

                self.bind_association_list(&mut inst.generic_map);
                self.bind_association_list(&mut inst.port_map);

                self.close_region();
            }
            ConcStmt::ForGenerate(gen) => {
                self.open_region(RegionKind::ForGenerate);
                gen.region = self.current;

                self.bind_discrete_range(&mut gen.parameter.range);
                for decl in &mut gen.decls {
                    self.bind_declarative_item(decl);
                }
                for stmt in &mut gen.stmts {
                    self.bind_concurrent_statement(stmt);
                }

                self.close_region();
            }
            ConcStmt::IfGenerate(gen) => {
                self.open_region(RegionKind::IfGenerate);
                gen.region = self.current;

                self.resolve_expression(&mut gen.condition);
                for decl in &mut gen.decls {
                    self.bind_declarative_item(decl);
                }
                for stmt in &mut gen.stmts {
                    self.bind_concurrent_statement(stmt);
                }

                self.close_region();
            }
            ConcStmt::Block(_) => {
                // block statements are parsed but not bound
            }
        }
    }

    fn bind_association_list(&mut self, list: &mut [AssociationElement]) {
        for element in list {
            if let Some(actual) = &mut element.actual {
                self.resolve_expression(actual);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Scope and visibility (LRM93 10.0)
    // ------------------------------------------------------------------------

    fn open_region(&mut self, kind: RegionKind) {
        let region = self.arena.alloc_region(kind, self.current);
        self.current = Some(region);
    }

    fn close_region(&mut self) {
        let current = self.current.expect("unbalanced declarative regions");
        self.current = self.arena.region(current).outer;
    }

    fn add_named_entity(&mut self, entity: NamedEntity) -> crate::node::EntityId {
        let current = self.current.expect("no open declarative region");
        let id = self.arena.alloc_entity(entity);
        self.arena.region_mut(current).named_entities.push(id);
        id
    }

    /// Entities named `identifier` visible in one region, directly or via
    /// its potentially visible shapes.
    fn lookup_in(&self, unit: UnitId, region: RegionId, identifier: Symbol) -> Vec<EntityRef> {
        let (direct, potential) = if unit == self.unit_id {
            self.arena.lookup_in_region(unit, region, identifier)
        } else {
            match self.ast.region_arena(unit) {
                Some(arena) => arena.lookup_in_region(unit, region, identifier),
                None => return Vec::new(),
            }
        };

        if direct.is_empty() {
            potential
                .into_iter()
                .filter(|r| {
                    self.entity(*r)
                        .map(|e| e.identifier == identifier)
                        .unwrap_or(false)
                })
                .collect()
        } else {
            direct
        }
    }

    /// (outer, extends) of a region, wherever it lives.
    fn region_links(
        &self,
        unit: UnitId,
        region: RegionId,
    ) -> Option<(Option<RegionId>, Option<(UnitId, RegionId)>)> {
        if unit == self.unit_id {
            let r = self.arena.region(region);
            return Some((r.outer, r.extends));
        }
        let arena = self.ast.region_arena(unit)?;
        let r = arena.region(region);
        Some((r.outer, r.extends))
    }

    fn entity(&self, r: EntityRef) -> Option<&NamedEntity> {
        if r.unit == self.unit_id {
            return Some(self.arena.entity(r.entity));
        }
        self.ast.entity(r)
    }

    fn region_entity_refs(&self, unit: UnitId, region: RegionId) -> Vec<EntityRef> {
        if unit == self.unit_id {
            return self
                .arena
                .region(region)
                .named_entities
                .iter()
                .map(|&entity| EntityRef { unit, entity })
                .collect();
        }
        match self.ast.region_arena(unit) {
            Some(arena) => arena
                .region(region)
                .named_entities
                .iter()
                .map(|&entity| EntityRef { unit, entity })
                .collect(),
            None => Vec::new(),
        }
    }

    fn link_dependency(&mut self, candidate: UnitId) {
        self.ast.add_reference(candidate, self.unit_id);
        if !self.dependencies.contains(&candidate) {
            self.dependencies.push(candidate);
        }
    }

    /// Every design unit implicitly carries `library std; use std.standard.all;`
    /// (LRM93 11.2). The predefined names land in the root region so simple
    /// lookups find them after walking out of the unit's own region.
    fn install_standard(&mut self) {
        const TYPES: &[&str] = &[
            "boolean",
            "bit",
            "character",
            "severity_level",
            "integer",
            "real",
            "time",
            "delay_length",
            "natural",
            "positive",
            "string",
            "bit_vector",
            "file_open_kind",
            "file_open_status",
        ];
        const LITERALS: &[&str] = &[
            "true", "false", "'0'", "'1'", "note", "warning", "error", "failure",
        ];
        const UNITS: &[&str] = &["fs", "ps", "ns", "us", "ms", "sec", "min", "hr"];

        for name in TYPES {
            let sym = self.ast.strings_mut().intern_str(name);
            self.add_named_entity(NamedEntity::new(
                sym,
                EntityKind::TypeDecl,
                Location::default(),
                Location::default(),
            ));
        }
        for name in LITERALS {
            let sym = self.ast.strings_mut().intern_str(name);
            self.add_named_entity(NamedEntity::new(
                sym,
                EntityKind::EnumLiteral,
                Location::default(),
                Location::default(),
            ));
        }
        for name in UNITS {
            let sym = self.ast.strings_mut().intern_str(name);
            self.add_named_entity(NamedEntity::new(
                sym,
                EntityKind::EnumLiteral,
                Location::default(),
                Location::default(),
            ));
        }
    }

    fn diag(&mut self, message: &'static str, location: Location) {
        self.diagnostics.push(Diagnostic::new(message, location));
    }
}
