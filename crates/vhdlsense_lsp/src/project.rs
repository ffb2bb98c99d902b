//! The shared project handle.
//!
//! Every working file holds a reference to one [`Project`]. It owns the
//! current library manager, the loaded-version counter that working files
//! compare against before servicing a task, and the file-to-library mapping.
//! Parsing a project configuration file is the host's job; the handle is
//! populated programmatically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use vhdlsense_base::StringTable;
use vhdlsense_vhdl::fast_parser::FastParser;
use vhdlsense_vhdl::LibraryManager;

pub struct Project {
    manager: RwLock<Arc<LibraryManager>>,
    loaded_version: AtomicU64,
    file_libraries: Mutex<HashMap<String, Vec<String>>>,
}

impl Project {
    pub fn new() -> Self {
        Project {
            manager: RwLock::new(Arc::new(LibraryManager::new(None, false))),
            loaded_version: AtomicU64::new(0),
            file_libraries: Mutex::new(HashMap::new()),
        }
    }

    /// Install a new library manager and file mapping, bumping the loaded
    /// version so every façade rebuilds on its next task.
    pub fn load(
        &self,
        manager: Arc<LibraryManager>,
        file_libraries: HashMap<String, Vec<String>>,
    ) {
        {
            let old = self.manager.read().expect("project lock");
            old.destroy();
        }
        *self.manager.write().expect("project lock") = manager;
        *self.file_libraries.lock().expect("project lock") = file_libraries;
        self.loaded_version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get_current_library_manager(&self) -> Arc<LibraryManager> {
        Arc::clone(&self.manager.read().expect("project lock"))
    }

    pub fn get_loaded_version(&self) -> u64 {
        self.loaded_version.load(Ordering::SeqCst)
    }

    pub fn libraries_have_been_populated(&self) -> bool {
        self.manager.read().expect("project lock").is_fully_populated()
    }

    pub fn set_libraries_populated(&self, value: bool) {
        self.manager
            .read()
            .expect("project lock")
            .set_fully_populated(value);
    }

    pub fn get_libraries_this_file_is_part_of(&self, file: &str) -> Vec<String> {
        self.file_libraries
            .lock()
            .expect("project lock")
            .get(file)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_libraries_for_file(&self, file: &str, libraries: Vec<String>) {
        self.file_libraries
            .lock()
            .expect("project lock")
            .insert(file.to_string(), libraries);
    }

    /// Index one file into `library`: fast-parse its unit headers and write
    /// the rows. Indexing routes exclusively through the fast parser.
    pub fn index_file(&self, library: &str, path: &str) -> bool {
        let Ok(src) = std::fs::read(path) else {
            log::warn!("index: cannot read {path}");
            return false;
        };

        let mut strings = StringTable::new();
        let rows = FastParser::new(&src, &mut strings, path).parse();

        let manager = self.get_current_library_manager();
        let backend = manager.get(library);
        let mut ok = true;
        for row in rows {
            ok &= backend.put(&row);
        }
        ok
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_bumps_version() {
        let project = Project::new();
        let v0 = project.get_loaded_version();
        project.load(Arc::new(LibraryManager::new(None, true)), HashMap::new());
        assert_eq!(project.get_loaded_version(), v0 + 1);
    }

    #[test]
    fn load_invalidates_previous_manager_backends() {
        let project = Project::new();
        let old_manager = project.get_current_library_manager();
        let backend = old_manager.get("work");
        assert!(backend.is_valid());

        project.load(Arc::new(LibraryManager::new(None, true)), HashMap::new());
        assert!(!backend.is_valid());
    }

    #[test]
    fn file_library_mapping() {
        let project = Project::new();
        assert!(project.get_libraries_this_file_is_part_of("a.vhd").is_empty());
        project.set_libraries_for_file("a.vhd", vec!["work".to_string()]);
        assert_eq!(
            project.get_libraries_this_file_is_part_of("a.vhd"),
            vec!["work".to_string()]
        );
    }

    #[test]
    fn populated_flag_reflects_manager() {
        let project = Project::new();
        assert!(!project.libraries_have_been_populated());
        project.set_libraries_populated(true);
        assert!(project.libraries_have_been_populated());
    }
}
