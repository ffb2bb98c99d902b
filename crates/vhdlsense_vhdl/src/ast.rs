//! The AST façade.
//!
//! One [`Ast`] per open file. It owns the string table, the per-library
//! cache of library units, and the split parse/semantic diagnostic lists,
//! and it drives the parse → bind pipeline on demand. Cross-unit lookups go
//! through [`Ast::load_primary_unit`], which serves from the cache when it
//! can and otherwise consults the library index, reads the recorded file and
//! runs the full pipeline on it.
//!
//! Library units live in a slab of slots addressed by [`UnitId`]. A unit
//! being analysed is temporarily replaced by a `Busy` stub that still
//! answers identity questions, so a recursive demand-load triggered from its
//! own binder run terminates instead of re-reading the file. Evicted units
//! leave an `Empty` slot behind; every cross-unit reference is an index pair
//! validated against the slab at lookup time, so stale `denotes` entries
//! degrade to "unresolved" rather than dangling.

use std::collections::HashMap;
use std::sync::Arc;

use vhdlsense_base::{Diagnostic, StringTable, Symbol};

use crate::binder::Binder;
use crate::library::{LibraryManager, LibraryUnitKind, UnitRow};
use crate::node::{
    EntityRef, LibraryUnit, LibraryUnitState, NamedEntity, RegionArena, UnitId,
};
use crate::parser::Parser;
use crate::syntax::{DesignUnit, DesignUnitKind};
use crate::token::Version;

/// The main file's parsed form: the source bytes plus the ids of the
/// library units that came out of it.
pub struct SourceFile {
    pub filename: String,
    pub src: String,
    pub units: Vec<UnitId>,
}

enum UnitSlot {
    Empty,
    /// The unit is out being analysed; identity stays answerable.
    Busy {
        kind: LibraryUnitKind,
        identifier: Symbol,
        identifier2: Option<Symbol>,
        filename: String,
    },
    Occupied(LibraryUnit),
}

pub struct Ast {
    filename: String,
    work_library: String,
    version: Version,
    strings: StringTable,
    library_manager: Arc<LibraryManager>,

    main_file: Option<SourceFile>,
    parse_errors: Vec<Diagnostic>,
    semantic_errors: Vec<Diagnostic>,

    slots: Vec<UnitSlot>,
    cache: HashMap<String, Vec<UnitId>>,

    invalidated: bool,
}

impl Ast {
    pub fn new(filename: &str, library_manager: Arc<LibraryManager>, work_library: &str) -> Self {
        Ast {
            filename: filename.to_string(),
            work_library: work_library.to_string(),
            version: Version::default(),
            strings: StringTable::new(),
            library_manager,
            main_file: None,
            parse_errors: Vec::new(),
            semantic_errors: Vec::new(),
            slots: Vec::new(),
            cache: HashMap::new(),
            invalidated: true,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn work_library_name(&self) -> &str {
        &self.work_library
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn strings_mut(&mut self) -> &mut StringTable {
        &mut self.strings
    }

    /// Parse and bind the main file if an invalidation is pending.
    ///
    /// Returns `true` when the ast was already up to date and nothing was
    /// done, `false` when it was rebuilt (new diagnostics may be waiting).
    pub fn update(&mut self) -> bool {
        if !self.invalidated {
            return true;
        }

        let Ok(src) = std::fs::read(&self.filename) else {
            self.parse_errors.clear();
            self.semantic_errors.clear();
            self.main_file = None;
            return false;
        };

        let filename = self.filename.clone();
        let (units, diags) = self.parse_source(&filename, &src);
        self.parse_errors = diags;

        let work = self.work_library.clone();
        let fresh = self.insert_units(&work, &filename, units);

        self.main_file = Some(SourceFile {
            filename: filename.clone(),
            src: String::from_utf8_lossy(&src).into_owned(),
            units: fresh.clone(),
        });

        let mut semantic = Vec::new();
        for &uid in &fresh {
            let mut diags = self.bind_unit(uid);
            semantic.append(&mut diags);
        }
        self.semantic_errors = semantic;

        let backend = self.library_manager.get(&work);
        if backend.is_known() {
            for &uid in &fresh {
                if let Some(row) = self.unit_row(uid) {
                    backend.put(&row);
                }
            }
        }

        self.invalidated = false;
        false
    }

    /// Mark the main file as needing a re-parse. Cheap.
    pub fn invalidate_main_file(&mut self) {
        self.invalidated = true;
    }

    /// Mark every cached unit coming from `file` as outdated. Cheap.
    pub fn invalidate_reference_file(&mut self, file: &str) {
        let mut hit = false;
        for slot in &mut self.slots {
            if let UnitSlot::Occupied(unit) = slot {
                if unit.filename == file {
                    unit.state = LibraryUnitState::Outdated;
                    hit = true;
                }
            }
        }
        if hit {
            self.invalidated = true;
        }
    }

    /// True if no invalidation happened since the last `update`.
    pub fn is_uptodate(&self) -> bool {
        !self.invalidated
    }

    /// The parsed main file; `None` when the file did not exist at the last
    /// update. Possibly stale if an invalidation is pending, but still
    /// useful.
    pub fn get_main_file(&self) -> Option<&SourceFile> {
        self.main_file.as_ref()
    }

    /// Current (parse, semantic) diagnostics. Same staleness caveat as
    /// [`get_main_file`].
    ///
    /// [`get_main_file`]: Ast::get_main_file
    pub fn get_diagnostics(&self) -> (&[Diagnostic], &[Diagnostic]) {
        (&self.parse_errors, &self.semantic_errors)
    }

    // ------------------------------------------------------------------------
    // Library-unit cache
    // ------------------------------------------------------------------------

    pub fn unit(&self, uid: UnitId) -> Option<&LibraryUnit> {
        match self.slots.get(uid.0 as usize) {
            Some(UnitSlot::Occupied(unit)) => Some(unit),
            _ => None,
        }
    }

    pub fn unit_state(&self, uid: UnitId) -> Option<LibraryUnitState> {
        match self.slots.get(uid.0 as usize) {
            Some(UnitSlot::Occupied(unit)) => Some(unit.state),
            Some(UnitSlot::Busy { .. }) => Some(LibraryUnitState::Analysing),
            _ => None,
        }
    }

    /// The named entity a unit declares for itself (the entity, package, ...
    /// in the unit's root region).
    pub fn unit_self_entity(&self, uid: UnitId) -> Option<EntityRef> {
        let unit = self.unit(uid)?;
        unit.self_entity.map(|entity| EntityRef { unit: uid, entity })
    }

    /// Resolve a cross-unit entity reference, validating it against the
    /// cache: the unit must still be present and analysed.
    pub fn entity(&self, r: EntityRef) -> Option<&NamedEntity> {
        let unit = self.unit(r.unit)?;
        if unit.state != LibraryUnitState::Analysed {
            return None;
        }
        if (r.entity.0 as usize) >= unit.arena.entity_count() {
            return None;
        }
        Some(unit.arena.entity(r.entity))
    }

    pub fn region_arena(&self, uid: UnitId) -> Option<&RegionArena> {
        self.unit(uid).map(|u| &u.arena)
    }

    pub fn add_reference(&mut self, uid: UnitId, from: UnitId) {
        if let Some(UnitSlot::Occupied(unit)) = self.slots.get_mut(uid.0 as usize) {
            if !unit.references.contains(&from) {
                unit.references.push(from);
            }
        }
    }

    /// Load primary units named `identifier` from `library` (the work
    /// library when `None`).
    ///
    /// Serves analysed cache entries first; entries still in `outdated` or
    /// `parsed` state are skipped (they will be evicted or re-analysed
    /// elsewhere). On a cache miss, consults the library backend, re-parses
    /// the recorded file into fresh units and binds them.
    pub fn load_primary_unit(
        &mut self,
        library: Option<Symbol>,
        identifier: Symbol,
        identifier2: Option<Symbol>,
    ) -> Vec<UnitId> {
        let library_name = match library {
            Some(sym) => self.strings.resolve(sym).to_string(),
            None => self.work_library.clone(),
        };

        let mut candidates = Vec::new();
        if let Some(ids) = self.cache.get(&library_name) {
            for &uid in ids {
                let (kind, unit_identifier, state) = match self.slots.get(uid.0 as usize) {
                    Some(UnitSlot::Occupied(unit)) => (
                        unit_kind(&unit.syntax),
                        unit.syntax.identifier().value,
                        unit.state,
                    ),
                    Some(UnitSlot::Busy { kind, identifier, .. }) => {
                        (*kind, *identifier, LibraryUnitState::Analysing)
                    }
                    _ => continue,
                };

                match state {
                    LibraryUnitState::Outdated | LibraryUnitState::Parsed => continue,
                    _ => {}
                }

                let matches = match kind {
                    LibraryUnitKind::Entity | LibraryUnitKind::Package => {
                        identifier2.is_none() && unit_identifier == identifier
                    }
                    LibraryUnitKind::Configuration => {
                        identifier2.is_some() && unit_identifier == identifier
                    }
                    _ => false,
                };
                if matches {
                    candidates.push(uid);
                }
            }
        }

        if !candidates.is_empty() {
            return candidates;
        }

        let backend = self.library_manager.get(&library_name);
        if !backend.is_known() {
            return candidates;
        }

        let identifier_text = self.strings.resolve(identifier).to_string();
        let identifier2_text = identifier2.map(|s| self.strings.resolve(s).to_string());
        let row = backend.get(&identifier_text, identifier2_text.as_deref());
        if !row.kind.is_primary() {
            return candidates;
        }

        let Ok(src) = std::fs::read(&row.filename) else {
            return candidates;
        };

        let (units, _diags) = self.parse_source(&row.filename, &src);

        let mut fresh = Vec::new();
        for unit in units {
            let kind = unit_kind(&unit);
            let unit_identifier = unit.identifier().value;

            let uid = self.insert_unit(&library_name, &row.filename, unit);
            fresh.push(uid);

            let matches = match kind {
                LibraryUnitKind::Entity => {
                    row.kind == LibraryUnitKind::Entity && unit_identifier == identifier
                }
                LibraryUnitKind::Package => {
                    row.kind == LibraryUnitKind::Package && unit_identifier == identifier
                }
                _ => false,
            };
            if matches {
                candidates.push(uid);
            }
        }

        for uid in fresh {
            // the demand-loaded file's own findings belong to its façade,
            // not this one; only the denotations matter here
            let _ = self.bind_unit(uid);
        }

        candidates
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn parse_source(&mut self, filename: &str, src: &[u8]) -> (Vec<DesignUnit>, Vec<Diagnostic>) {
        let parser = Parser::new(src, &mut self.strings, filename, self.version);
        parser.parse()
    }

    fn insert_units(
        &mut self,
        library: &str,
        filename: &str,
        units: Vec<DesignUnit>,
    ) -> Vec<UnitId> {
        units
            .into_iter()
            .map(|unit| self.insert_unit(library, filename, unit))
            .collect()
    }

    /// Evict cache entries whose syntax equals the fresh unit, then insert
    /// it in state `parsed`.
    fn insert_unit(&mut self, library: &str, filename: &str, unit: DesignUnit) -> UnitId {
        let fresh_kind = unit_kind(&unit);
        let fresh_identifier = unit.identifier().value;
        let fresh_identifier2 = unit.secondary_identifier();

        let ids = self.cache.entry(library.to_string()).or_default();

        let mut evicted = Vec::new();
        ids.retain(|&uid| {
            let same = match self.slots.get(uid.0 as usize) {
                Some(UnitSlot::Occupied(cached)) => cached.syntax.same_unit(&unit),
                Some(UnitSlot::Busy { kind, identifier, identifier2, .. }) => {
                    *kind == fresh_kind
                        && *identifier == fresh_identifier
                        && *identifier2 == fresh_identifier2
                }
                _ => true, // empty slots are stale entries
            };
            if same {
                evicted.push(uid);
            }
            !same
        });
        for uid in evicted {
            if matches!(self.slots.get(uid.0 as usize), Some(UnitSlot::Occupied(_))) {
                self.slots[uid.0 as usize] = UnitSlot::Empty;
            }
        }

        let uid = UnitId(self.slots.len() as u32);
        let library_unit = LibraryUnit::new(uid, unit, filename.to_string());
        self.slots.push(UnitSlot::Occupied(library_unit));
        self.cache.get_mut(library).expect("cache entry").push(uid);
        uid
    }

    /// Run the binder over one freshly parsed unit, moving it through
    /// `analysing` to `analysed`.
    fn bind_unit(&mut self, uid: UnitId) -> Vec<Diagnostic> {
        let slot = &mut self.slots[uid.0 as usize];
        let mut unit = match std::mem::replace(slot, UnitSlot::Empty) {
            UnitSlot::Occupied(unit) => unit,
            other => {
                *slot = other;
                return Vec::new();
            }
        };

        self.slots[uid.0 as usize] = UnitSlot::Busy {
            kind: unit_kind(&unit.syntax),
            identifier: unit.syntax.identifier().value,
            identifier2: unit.syntax.secondary_identifier(),
            filename: unit.filename.clone(),
        };
        unit.state = LibraryUnitState::Analysing;

        let binder = Binder::new(self, uid);
        let result = binder.bind(&mut unit.syntax);

        unit.arena = result.arena;
        unit.root_region = result.root_region;
        unit.self_entity = result.self_entity;
        unit.dependencies.extend(result.dependencies);
        unit.state = LibraryUnitState::Analysed;

        self.slots[uid.0 as usize] = UnitSlot::Occupied(unit);
        result.diagnostics
    }

    fn unit_row(&self, uid: UnitId) -> Option<UnitRow> {
        let unit = self.unit(uid)?;
        let kind = unit_kind(&unit.syntax);
        if kind == LibraryUnitKind::Invalid {
            return None;
        }
        Some(UnitRow {
            kind,
            line: 0,
            column: 0,
            identifier: self.strings.resolve(unit.syntax.identifier().value).to_string(),
            identifier2: unit
                .syntax
                .secondary_identifier()
                .map(|s| self.strings.resolve(s).to_string()),
            filename: unit.filename.clone(),
            timestamp: 0,
        })
    }
}

fn unit_kind(unit: &DesignUnit) -> LibraryUnitKind {
    match unit.kind {
        DesignUnitKind::Entity(_) => LibraryUnitKind::Entity,
        DesignUnitKind::Architecture(_) => LibraryUnitKind::Architecture,
        DesignUnitKind::Package(_) => LibraryUnitKind::Package,
        DesignUnitKind::PackageBody(_) => LibraryUnitKind::PackageBody,
        DesignUnitKind::Configuration(_) => LibraryUnitKind::Configuration,
    }
}

/// File extensions routed to this front-end.
pub fn is_a_vhdl_file(extension: &str) -> bool {
    extension == ".vhd" || extension == ".vhdl"
}

/// File extensions belonging to the parallel dialect's front-end.
pub fn is_an_sv_file(extension: &str) -> bool {
    extension == ".sv"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(content.as_bytes()).expect("write");
        path.to_str().unwrap().to_string()
    }

    fn manager() -> Arc<LibraryManager> {
        Arc::new(LibraryManager::new(None, true))
    }

    #[test]
    fn update_parses_single_entity() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "counter.vhd",
            "entity counter is\n  port ( clk : in bit;\n         q   : out bit );\nend entity counter;\n",
        );

        let mut ast = Ast::new(&path, manager(), "work");
        assert!(!ast.update());

        let main = ast.get_main_file().expect("main file");
        assert_eq!(main.units.len(), 1);

        let unit = ast.unit(main.units[0]).expect("unit");
        assert_eq!(unit.state, LibraryUnitState::Analysed);
        assert!(unit.root_region.is_some());

        let (parse, semantic) = ast.get_diagnostics();
        assert!(parse.is_empty(), "{parse:?}");
        assert!(semantic.is_empty(), "{semantic:?}");
    }

    #[test]
    fn update_twice_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "e.vhd", "entity e is end entity;");

        let mut ast = Ast::new(&path, manager(), "work");
        assert!(!ast.update());
        assert!(ast.update(), "second update should report up-to-date");
    }

    #[test]
    fn missing_file_clears_state() {
        let mut ast = Ast::new("/nonexistent/f.vhd", manager(), "work");
        assert!(!ast.update());
        assert!(ast.get_main_file().is_none());
        let (parse, semantic) = ast.get_diagnostics();
        assert!(parse.is_empty());
        assert!(semantic.is_empty());
    }

    #[test]
    fn invalidate_then_update_reparses() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "e.vhd", "entity e is end entity;");

        let mut ast = Ast::new(&path, manager(), "work");
        ast.update();
        let first = ast.get_main_file().unwrap().units.clone();

        ast.invalidate_main_file();
        assert!(!ast.update());
        let second = ast.get_main_file().unwrap().units.clone();

        assert_eq!(first.len(), second.len());
        assert_ne!(first[0], second[0], "re-parse must produce fresh units");
        // the evicted unit is gone from the slab
        assert!(ast.unit(first[0]).is_none());
    }

    #[test]
    fn unresolved_name_produces_semantic_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "a.vhd",
            "entity e is end entity;\narchitecture a of e is\nbegin\n  undeclared_signal <= '0';\nend architecture;\n",
        );

        let mut ast = Ast::new(&path, manager(), "work");
        ast.update();

        let (parse, semantic) = ast.get_diagnostics();
        assert!(parse.is_empty(), "{parse:?}");
        assert!(
            semantic.iter().any(|d| d.message().contains("undeclared_signal")),
            "{semantic:?}"
        );
    }

    #[test]
    fn predefined_names_resolve_without_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "a.vhd",
            "entity e is end entity;\narchitecture a of e is\n  signal s : bit;\nbegin\n  s <= '1' after 5 ns;\nend architecture;\n",
        );

        let mut ast = Ast::new(&path, manager(), "work");
        ast.update();

        let (_, semantic) = ast.get_diagnostics();
        assert!(semantic.is_empty(), "{semantic:?}");
    }

    #[test]
    fn work_library_rows_are_indexed_after_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "e.vhd", "entity top is end entity;");

        let manager = manager();
        let mut ast = Ast::new(&path, Arc::clone(&manager), "work");
        ast.update();

        let backend = manager.get("work");
        let row = backend.get("top", None);
        assert_eq!(row.kind, LibraryUnitKind::Entity);
        assert_eq!(row.filename, path);
    }

    #[test]
    fn extension_routing() {
        assert!(is_a_vhdl_file(".vhd"));
        assert!(is_a_vhdl_file(".vhdl"));
        assert!(!is_a_vhdl_file(".sv"));
        assert!(is_an_sv_file(".sv"));
    }
}
