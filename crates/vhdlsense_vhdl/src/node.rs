//! Analyzer-side nodes: declarative regions, named entities, library units.
//!
//! The binder builds one [`RegionArena`] per library unit. Regions and
//! entities are stored in flat vectors and addressed by index, so the
//! AST ⇄ region ⇄ entity cycles of the source language collapse to plain
//! integers. A reference *across* units is an [`EntityRef`] — a
//! `(unit, entity)` pair the façade validates against its cache at lookup
//! time — never a pointer.

use vhdlsense_base::{Location, Symbol};

use crate::syntax::DesignUnit;

/// Identity of a cached library unit within one façade.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct UnitId(pub u32);

/// Index of a region inside one unit's [`RegionArena`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RegionId(pub u32);

/// Index of a named entity inside one unit's [`RegionArena`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EntityId(pub u32);

/// A cross-unit (or intra-unit) reference to a named entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EntityRef {
    pub unit: UnitId,
    pub entity: EntityId,
}

/// What AST construct opened a region.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RegionKind {
    Root,
    Entity,
    Architecture,
    Package,
    PackageBody,
    Configuration,
    Subprogram,
    SubprogramBody,
    Component,
    Instantiation,
    Process,
    ForGenerate,
    IfGenerate,
    Record,
}

/// The installed effect of a use clause: a bag of entities consulted only
/// after direct visibility fails.
#[derive(Debug, Default)]
pub struct DirectVisibility {
    pub entities: Vec<EntityRef>,
}

/// A named scope.
#[derive(Debug)]
pub struct DeclarativeRegion {
    pub kind: RegionKind,
    /// Enclosing region in the same unit.
    pub outer: Option<RegionId>,
    /// Continuation of the visibility walk in another unit (an architecture
    /// extends its entity).
    pub extends: Option<(UnitId, RegionId)>,
    pub named_entities: Vec<EntityId>,
    pub potentially_visible: Vec<DirectVisibility>,
    pub inner: Vec<RegionId>,
}

/// Kind of a named entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Entity,
    Architecture,
    Configuration,
    Package,
    PackageBody,
    TypeDecl,
    Subtype,
    Constant,
    Signal,
    Variable,
    File,
    Alias,
    Function,
    Procedure,
    Component,
    Element,
    Library,
    EnumLiteral,
}

impl EntityKind {
    /// Lowercase noun used by hover summaries and the CLI.
    pub fn describe(self) -> &'static str {
        match self {
            EntityKind::Entity => "entity",
            EntityKind::Architecture => "architecture",
            EntityKind::Configuration => "configuration",
            EntityKind::Package => "package",
            EntityKind::PackageBody => "package body",
            EntityKind::TypeDecl => "type",
            EntityKind::Subtype => "subtype",
            EntityKind::Constant => "constant",
            EntityKind::Signal => "signal",
            EntityKind::Variable => "variable",
            EntityKind::File => "file",
            EntityKind::Alias => "alias",
            EntityKind::Function => "function",
            EntityKind::Procedure => "procedure",
            EntityKind::Component => "component",
            EntityKind::Element => "element",
            EntityKind::Library => "library",
            EntityKind::EnumLiteral => "enumeration literal",
        }
    }
}

/// An analyzer-side object for one declared name.
#[derive(Debug)]
pub struct NamedEntity {
    pub identifier: Symbol,
    pub kind: EntityKind,
    /// Range of the whole declaration.
    pub decl: Location,
    /// Range of the defining identifier token.
    pub selection: Location,
    /// Declarator index inside a multi-identifier declaration
    /// (`signal a, b, c : bit` gives indices 0, 1, 2).
    pub index: u32,
    /// For design units, subprograms and components: the region this entity
    /// opened, in its owning unit's arena.
    pub region: Option<RegionId>,
    /// For objects and elements whose type is a record (and for record type
    /// declarations themselves): the record's inner region.
    pub record_region: Option<(UnitId, RegionId)>,
}

impl NamedEntity {
    pub fn new(identifier: Symbol, kind: EntityKind, decl: Location, selection: Location) -> Self {
        NamedEntity {
            identifier,
            kind,
            decl,
            selection,
            index: 0,
            region: None,
            record_region: None,
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }
}

/// Flat storage for one unit's regions and entities.
#[derive(Debug, Default)]
pub struct RegionArena {
    regions: Vec<DeclarativeRegion>,
    entities: Vec<NamedEntity>,
}

impl RegionArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_region(&mut self, kind: RegionKind, outer: Option<RegionId>) -> RegionId {
        let id = RegionId(self.regions.len() as u32);
        self.regions.push(DeclarativeRegion {
            kind,
            outer,
            extends: None,
            named_entities: Vec::new(),
            potentially_visible: Vec::new(),
            inner: Vec::new(),
        });
        if let Some(outer) = outer {
            self.region_mut(outer).inner.push(id);
        }
        id
    }

    pub fn alloc_entity(&mut self, entity: NamedEntity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    pub fn region(&self, id: RegionId) -> &DeclarativeRegion {
        &self.regions[id.0 as usize]
    }

    pub fn region_mut(&mut self, id: RegionId) -> &mut DeclarativeRegion {
        &mut self.regions[id.0 as usize]
    }

    pub fn entity(&self, id: EntityId) -> &NamedEntity {
        &self.entities[id.0 as usize]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut NamedEntity {
        &mut self.entities[id.0 as usize]
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities named `identifier` directly declared in `region`; when none
    /// match, the region's potentially visible shapes are consulted instead.
    pub fn lookup_in_region(
        &self,
        unit: UnitId,
        region: RegionId,
        identifier: Symbol,
    ) -> (Vec<EntityRef>, Vec<EntityRef>) {
        let region = self.region(region);
        let mut direct = Vec::new();
        for &eid in &region.named_entities {
            if self.entity(eid).identifier == identifier {
                direct.push(EntityRef { unit, entity: eid });
            }
        }
        let mut potential = Vec::new();
        if direct.is_empty() {
            for shape in &region.potentially_visible {
                potential.extend(shape.entities.iter().copied());
            }
        }
        (direct, potential)
    }
}

/// Monotonic analysis state of one cached library unit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LibraryUnitState {
    Outdated,
    Parsed,
    Analysing,
    Analysed,
}

/// A parsed (and possibly bound) design unit held in a façade's per-library
/// cache.
#[derive(Debug)]
pub struct LibraryUnit {
    pub id: UnitId,
    pub state: LibraryUnitState,
    pub syntax: DesignUnit,
    pub filename: String,
    pub arena: RegionArena,
    pub root_region: Option<RegionId>,
    /// The entity this unit declares for itself in its root region.
    pub self_entity: Option<EntityId>,
    /// Units that loaded this one.
    pub references: Vec<UnitId>,
    /// Units this one loaded.
    pub dependencies: Vec<UnitId>,
}

impl LibraryUnit {
    pub fn new(id: UnitId, syntax: DesignUnit, filename: String) -> Self {
        LibraryUnit {
            id,
            state: LibraryUnitState::Parsed,
            syntax,
            filename,
            arena: RegionArena::new(),
            root_region: None,
            self_entity: None,
            references: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_region_links_inner_to_outer() {
        let mut arena = RegionArena::new();
        let root = arena.alloc_region(RegionKind::Root, None);
        let inner = arena.alloc_region(RegionKind::Entity, Some(root));
        assert_eq!(arena.region(inner).outer, Some(root));
        assert_eq!(arena.region(root).inner, vec![inner]);
    }

    #[test]
    fn lookup_finds_direct_entities_by_identifier() {
        let mut arena = RegionArena::new();
        let root = arena.alloc_region(RegionKind::Root, None);
        let sym = Symbol::EMPTY;
        let e = arena.alloc_entity(NamedEntity::new(
            sym,
            EntityKind::Signal,
            Location::default(),
            Location::default(),
        ));
        arena.region_mut(root).named_entities.push(e);

        let (direct, potential) = arena.lookup_in_region(UnitId(0), root, sym);
        assert_eq!(direct.len(), 1);
        assert!(potential.is_empty());
    }

    #[test]
    fn lookup_falls_back_to_potentially_visible_only_on_miss() {
        let mut arena = RegionArena::new();
        let root = arena.alloc_region(RegionKind::Root, None);
        let shape = DirectVisibility {
            entities: vec![EntityRef { unit: UnitId(7), entity: EntityId(0) }],
        };
        arena.region_mut(root).potentially_visible.push(shape);

        let (direct, potential) = arena.lookup_in_region(UnitId(0), root, Symbol::EMPTY);
        assert!(direct.is_empty());
        assert_eq!(potential.len(), 1);
    }
}
