//! Persistent library index.
//!
//! One [`LibraryBackend`] per named library, each backed by a sqlite
//! database (`<library>.db` under the configured directory, or an in-memory
//! database for unknown libraries). Rows map a design unit's identity to the
//! file and line it was last seen at; the composite-hash id lets secondary
//! units coexist with primary units of the same simple name.
//!
//! The [`LibraryManager`] is the registry of backends, guarded by a
//! reader-writer lock: lookups take the lock shared, registrations take it
//! exclusive. Backends can be used from several file workers at once; sqlite
//! serializes the actual I/O, so each backend guards its connection with a
//! plain mutex.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use rusqlite::Connection;

/// Kind discriminant stored in the DESIGNUNIT column.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LibraryUnitKind {
    Invalid,
    Entity,
    Architecture,
    Package,
    PackageBody,
    Configuration,
}

impl LibraryUnitKind {
    fn to_column(self) -> i64 {
        match self {
            LibraryUnitKind::Invalid => 0,
            LibraryUnitKind::Entity => 1,
            LibraryUnitKind::Architecture => 2,
            LibraryUnitKind::Package => 3,
            LibraryUnitKind::PackageBody => 4,
            LibraryUnitKind::Configuration => 5,
        }
    }

    fn from_column(v: i64) -> Self {
        match v {
            1 => LibraryUnitKind::Entity,
            2 => LibraryUnitKind::Architecture,
            3 => LibraryUnitKind::Package,
            4 => LibraryUnitKind::PackageBody,
            5 => LibraryUnitKind::Configuration,
            _ => LibraryUnitKind::Invalid,
        }
    }

    pub fn is_primary(self) -> bool {
        matches!(
            self,
            LibraryUnitKind::Entity | LibraryUnitKind::Package | LibraryUnitKind::Configuration
        )
    }
}

/// One row of the LIBRARY_UNITS table.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitRow {
    pub kind: LibraryUnitKind,
    pub line: u32,
    pub column: u32,
    pub identifier: String,
    pub identifier2: Option<String>,
    pub filename: String,
    pub timestamp: i64,
}

/// Composite id: primary/secondary class + identifier + identifier2, so an
/// architecture and an entity of the same name occupy different rows.
fn row_id(kind: LibraryUnitKind, identifier: &str, identifier2: Option<&str>) -> i64 {
    let class = match kind {
        LibraryUnitKind::Entity | LibraryUnitKind::Package | LibraryUnitKind::Configuration => {
            "primary"
        }
        LibraryUnitKind::Architecture | LibraryUnitKind::PackageBody => "secondary",
        LibraryUnitKind::Invalid => return 0,
    };

    let mut h = DefaultHasher::new();
    class.hash(&mut h);
    let h0 = h.finish();

    let mut h = DefaultHasher::new();
    identifier.hash(&mut h);
    let h1 = h.finish();

    let h2 = h0 ^ (h1 << 1);

    let mut h = DefaultHasher::new();
    identifier2.unwrap_or("").hash(&mut h);
    let h3 = h.finish();

    (h3 ^ (h2 << 1)) as i64
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS LIBRARY_UNITS (\
                            ID INT PRIMARY KEY  NOT NULL,\
                            LINENUMBER     INT  NOT NULL,\
                            TIMESTAMP      INT  NOT NULL,\
                            FILENAME       TEXT NOT NULL,\
                            DESIGNUNIT     INT  NOT NULL,\
                            IDENTIFIER     TEXT NOT NULL,\
                            IDENTIFIER2    TEXT)";

struct BackendState {
    db: Option<Connection>,
    has_internal_problem: bool,
}

/// The index of one named library.
pub struct LibraryBackend {
    location: String,
    name: String,
    is_known: bool,
    is_valid: AtomicBool,
    state: Mutex<BackendState>,
}

impl LibraryBackend {
    fn new(location: Option<&str>, name: &str, known: bool) -> Self {
        let location = match location {
            Some(dir) => format!("{dir}/{name}.db"),
            None => ":memory:".to_string(),
        };
        LibraryBackend {
            location,
            name: name.to_string(),
            is_known: known,
            is_valid: AtomicBool::new(true),
            state: Mutex::new(BackendState { db: None, has_internal_problem: false }),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// False once the manager has disowned this backend.
    pub fn is_valid(&self) -> bool {
        self.is_valid.load(Ordering::Relaxed)
    }

    /// True only for libraries named in the project configuration; unknown
    /// backends service lookups in memory but never persist.
    pub fn is_known(&self) -> bool {
        self.is_known
    }

    pub fn has_internal_problem(&self) -> bool {
        self.state.lock().expect("backend lock").has_internal_problem
    }

    /// Look up one unit. Returns a row of kind `Invalid` when nothing
    /// matches or the backend is unusable.
    pub fn get(&self, identifier: &str, identifier2: Option<&str>) -> UnitRow {
        let missing = UnitRow {
            kind: LibraryUnitKind::Invalid,
            line: 0,
            column: 0,
            identifier: identifier.to_string(),
            identifier2: identifier2.map(str::to_string),
            filename: String::new(),
            timestamp: 0,
        };

        let mut state = self.state.lock().expect("backend lock");
        if !self.connect(&mut state) {
            return missing;
        }
        let db = state.db.as_ref().expect("connected");

        let sql = "SELECT LINENUMBER, TIMESTAMP, FILENAME, DESIGNUNIT \
                   FROM LIBRARY_UNITS \
                   WHERE IDENTIFIER = ?1 \
                   AND (IDENTIFIER2 = ?2 OR (?2 IS NULL AND IDENTIFIER2 IS NULL)) \
                   LIMIT 1";

        let row = db.query_row(sql, rusqlite::params![identifier, identifier2], |row| {
            Ok(UnitRow {
                kind: LibraryUnitKind::from_column(row.get(3)?),
                line: row.get::<_, i64>(0)? as u32,
                column: 0,
                identifier: identifier.to_string(),
                identifier2: identifier2.map(str::to_string),
                filename: row.get(2)?,
                timestamp: row.get(1)?,
            })
        });

        match row {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => missing,
            Err(e) => {
                log::warn!("library {}: lookup failed: {e}", self.name);
                missing
            }
        }
    }

    /// Insert or replace one unit row.
    pub fn put(&self, unit: &UnitRow) -> bool {
        let mut state = self.state.lock().expect("backend lock");
        if !self.connect(&mut state) {
            return false;
        }
        let db = state.db.as_ref().expect("connected");

        let identifier2 = match unit.kind {
            LibraryUnitKind::Architecture | LibraryUnitKind::Configuration => {
                unit.identifier2.clone()
            }
            LibraryUnitKind::Invalid => return false,
            _ => None,
        };

        let sql = "INSERT OR REPLACE INTO LIBRARY_UNITS \
                   (ID, LINENUMBER, TIMESTAMP, FILENAME, DESIGNUNIT, IDENTIFIER, IDENTIFIER2) \
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

        let id = row_id(unit.kind, &unit.identifier, unit.identifier2.as_deref());
        let result = db.execute(
            sql,
            rusqlite::params![
                id,
                unit.line as i64,
                unit.timestamp,
                unit.filename,
                unit.kind.to_column(),
                unit.identifier,
                identifier2,
            ],
        );

        match result {
            Ok(_) => true,
            Err(e) => {
                log::warn!("library {}: insert failed: {e}", self.name);
                false
            }
        }
    }

    /// Delete every row.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("backend lock");
        if !self.connect(&mut state) {
            return;
        }
        let db = state.db.as_ref().expect("connected");
        if let Err(e) = db.execute("DELETE FROM LIBRARY_UNITS", []) {
            log::warn!("library {}: clear failed: {e}", self.name);
        }
    }

    /// All rows, optionally limited and filtered by identifier.
    pub fn all(&self, limit: usize, filter: Option<&str>) -> Vec<UnitRow> {
        let mut result = Vec::new();

        let mut state = self.state.lock().expect("backend lock");
        if !self.connect(&mut state) {
            return result;
        }
        let db = state.db.as_ref().expect("connected");

        let mut sql = String::from(
            "SELECT LINENUMBER, TIMESTAMP, FILENAME, DESIGNUNIT, IDENTIFIER, IDENTIFIER2 \
             FROM LIBRARY_UNITS",
        );
        if filter.is_some() {
            sql.push_str(" WHERE IDENTIFIER = ?1 OR IDENTIFIER2 = ?1");
        }
        if limit != 0 {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let map_row = |row: &rusqlite::Row<'_>| {
            let kind = LibraryUnitKind::from_column(row.get(3)?);
            let identifier2: Option<String> = match kind {
                LibraryUnitKind::Architecture | LibraryUnitKind::Configuration => row.get(5)?,
                _ => None,
            };
            Ok(UnitRow {
                kind,
                line: row.get::<_, i64>(0)? as u32,
                column: 0,
                identifier: row.get(4)?,
                identifier2,
                filename: row.get(2)?,
                timestamp: row.get(1)?,
            })
        };

        let query = match db.prepare(&sql) {
            Ok(mut stmt) => {
                let rows = if let Some(f) = filter {
                    stmt.query_map(rusqlite::params![f], map_row)
                } else {
                    stmt.query_map([], map_row)
                };
                match rows {
                    Ok(rows) => rows.filter_map(Result::ok).collect(),
                    Err(_) => Vec::new(),
                }
            }
            Err(_) => Vec::new(),
        };
        result.extend(query);
        result
    }

    fn connect(&self, state: &mut BackendState) -> bool {
        if state.has_internal_problem || !self.is_valid() {
            return false;
        }

        if state.db.is_none() {
            match Connection::open(&self.location) {
                Ok(db) => state.db = Some(db),
                Err(e) => {
                    log::warn!("library {}: cannot open {}: {e}", self.name, self.location);
                    return false;
                }
            }
        }

        let db = state.db.as_ref().expect("just connected");
        if let Err(e) = db.execute(CREATE_TABLE, []) {
            log::error!("library {}: cannot create table: {e}", self.name);
            state.has_internal_problem = true;
            return false;
        }

        true
    }
}

/// Registry of library backends.
///
/// Before lookups happen the manager is either given a directory where
/// libraries persist, or `initialise`d with the set of names the project
/// declares. There should only ever be one manager per project; enforcing
/// the singleton is the caller's job.
pub struct LibraryManager {
    inner: RwLock<ManagerInner>,
    fully_populated: AtomicBool,
}

struct ManagerInner {
    is_initialised: bool,
    location: Option<String>,
    backends: HashMap<String, Arc<LibraryBackend>>,
}

impl LibraryManager {
    pub fn new(location: Option<String>, populated: bool) -> Self {
        LibraryManager {
            inner: RwLock::new(ManagerInner {
                is_initialised: false,
                location,
                backends: HashMap::new(),
            }),
            fully_populated: AtomicBool::new(populated),
        }
    }

    /// Invalidate and drop every current backend, then pre-register `names`
    /// as known, non-persistent libraries.
    pub fn initialise(&self, names: Vec<String>) {
        let mut inner = self.inner.write().expect("manager lock");
        for backend in inner.backends.values() {
            backend.is_valid.store(false, Ordering::Relaxed);
        }
        inner.backends.clear();
        inner.location = None;
        inner.is_initialised = true;

        for name in names {
            if !inner.backends.contains_key(&name) {
                let backend = Arc::new(LibraryBackend::new(None, &name, true));
                inner.backends.insert(name, backend);
            }
        }
    }

    /// Invalidate and drop every backend.
    pub fn destroy(&self) {
        let mut inner = self.inner.write().expect("manager lock");
        for backend in inner.backends.values() {
            backend.is_valid.store(false, Ordering::Relaxed);
        }
        inner.backends.clear();
    }

    /// Names of the known, valid libraries.
    pub fn list(&self) -> Vec<String> {
        let inner = self.inner.read().expect("manager lock");
        inner
            .backends
            .values()
            .filter(|b| b.is_valid() && b.is_known())
            .map(|b| b.name().to_string())
            .collect()
    }

    /// The backend for `name`, creating one lazily. After `initialise`, a
    /// lazily-created backend is unknown (non-persistent); before it, the
    /// backend persists at the configured location.
    pub fn get(&self, name: &str) -> Arc<LibraryBackend> {
        {
            let inner = self.inner.read().expect("manager lock");
            if let Some(backend) = inner.backends.get(name) {
                return Arc::clone(backend);
            }
        }

        let mut inner = self.inner.write().expect("manager lock");
        if let Some(backend) = inner.backends.get(name) {
            return Arc::clone(backend);
        }
        let known = !inner.is_initialised;
        let backend = Arc::new(LibraryBackend::new(inner.location.as_deref(), name, known));
        inner.backends.insert(name.to_string(), Arc::clone(&backend));
        backend
    }

    /// Advisory flag: consumers may show a "still indexing" notice until the
    /// initial bulk index completes.
    pub fn set_fully_populated(&self, value: bool) {
        self.fully_populated.store(value, Ordering::Relaxed);
    }

    pub fn is_fully_populated(&self) -> bool {
        self.fully_populated.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_row(name: &str, file: &str) -> UnitRow {
        UnitRow {
            kind: LibraryUnitKind::Entity,
            line: 3,
            column: 0,
            identifier: name.to_string(),
            identifier2: None,
            filename: file.to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn put_then_get_roundtrips_in_memory() {
        let backend = LibraryBackend::new(None, "work", true);
        assert!(backend.put(&entity_row("alu", "alu.vhd")));

        let row = backend.get("alu", None);
        assert_eq!(row.kind, LibraryUnitKind::Entity);
        assert_eq!(row.filename, "alu.vhd");
        assert_eq!(row.line, 3);
    }

    #[test]
    fn get_of_unknown_unit_is_invalid() {
        let backend = LibraryBackend::new(None, "work", true);
        let row = backend.get("missing", None);
        assert_eq!(row.kind, LibraryUnitKind::Invalid);
    }

    #[test]
    fn secondary_unit_coexists_with_primary_of_same_name() {
        let backend = LibraryBackend::new(None, "work", true);
        backend.put(&entity_row("alu", "alu.vhd"));
        backend.put(&UnitRow {
            kind: LibraryUnitKind::Architecture,
            line: 10,
            column: 0,
            identifier: "alu".to_string(),
            identifier2: Some("alu".to_string()),
            filename: "alu.vhd".to_string(),
            timestamp: 0,
        });

        assert_eq!(backend.get("alu", None).kind, LibraryUnitKind::Entity);
        assert_eq!(
            backend.get("alu", Some("alu")).kind,
            LibraryUnitKind::Architecture
        );
    }

    #[test]
    fn put_replaces_row_with_same_identity() {
        let backend = LibraryBackend::new(None, "work", true);
        backend.put(&entity_row("alu", "old.vhd"));
        backend.put(&entity_row("alu", "new.vhd"));

        assert_eq!(backend.get("alu", None).filename, "new.vhd");
        assert_eq!(backend.all(0, None).len(), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let backend = LibraryBackend::new(None, "work", true);
        backend.put(&entity_row("a", "a.vhd"));
        backend.put(&entity_row("b", "b.vhd"));
        backend.clear();
        assert!(backend.all(0, None).is_empty());
    }

    #[test]
    fn all_respects_limit_and_filter() {
        let backend = LibraryBackend::new(None, "work", true);
        backend.put(&entity_row("a", "a.vhd"));
        backend.put(&entity_row("b", "b.vhd"));

        assert_eq!(backend.all(1, None).len(), 1);
        let filtered = backend.all(0, Some("b"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].identifier, "b");
    }

    #[test]
    fn persistent_backend_writes_a_db_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().to_str().unwrap().to_string();
        {
            let backend = LibraryBackend::new(Some(&path), "work", true);
            backend.put(&entity_row("alu", "alu.vhd"));
        }
        assert!(dir.path().join("work.db").exists());

        let backend = LibraryBackend::new(Some(&path), "work", true);
        assert_eq!(backend.get("alu", None).kind, LibraryUnitKind::Entity);
    }

    #[test]
    fn manager_returns_same_backend_for_same_name() {
        let manager = LibraryManager::new(None, true);
        let a = manager.get("work");
        let b = manager.get("work");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn initialise_invalidates_previous_backends() {
        let manager = LibraryManager::new(None, true);
        let old = manager.get("work");
        assert!(old.is_valid());

        manager.initialise(vec!["ieee".to_string()]);
        assert!(!old.is_valid());
        assert_eq!(manager.list(), vec!["ieee".to_string()]);
    }

    #[test]
    fn backend_created_after_initialise_is_unknown() {
        let manager = LibraryManager::new(None, true);
        manager.initialise(vec![]);
        let backend = manager.get("stray");
        assert!(!backend.is_known());
    }

    #[test]
    fn fully_populated_flag_is_settable() {
        let manager = LibraryManager::new(None, false);
        assert!(!manager.is_fully_populated());
        manager.set_fully_populated(true);
        assert!(manager.is_fully_populated());
    }
}
