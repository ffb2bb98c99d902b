//! The incremental coordinator.
//!
//! One [`WorkingFiles`] per session, one working file per open document.
//! Each working file is bound to at most one worker thread (or runs its
//! tasks inline); within a file, tasks execute strictly in submission order,
//! and enqueueing a task marks everything already queued as superseded so a
//! burst of edits collapses to one real rebuild. A superseded task still
//! runs, but short-circuits after honoring its reply handle, which keeps
//! request/response bookkeeping balanced without preemption.
//!
//! Cross-file coordination is asynchronous: when a file is updated, every
//! *other* working file is told the file may have been a dependency; its own
//! next update propagates the invalidation into its façade.

use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use lsp_types::{DiagnosticSeverity, DocumentSymbol, FoldingRange, Hover, LocationLink};

use vhdlsense_vhdl::ast::Ast;
use vhdlsense_vhdl::{is_a_vhdl_file, is_an_sv_file};

use crate::project::Project;
use crate::providers;
use crate::wire::{from_wire_position, to_wire_range};

const FILE_NOT_FOUND: &str = "{} not found.";
const NO_PROJECT: &str =
    "To enjoy full vhdl language services, make sure there is a valid project configuration.";
const STILL_INDEXING: &str = "Indexer is still running. Ignoring {} errors.";
const NOT_IN_PROJECT: &str =
    "To enjoy full vhdl language services, please add this file to the project configuration.";

/// A one-shot reply handle; invoked exactly once per request.
pub type Reply<T> = Box<dyn FnOnce(T) + Send>;

/// The editor-facing sink for fire-and-forget notifications.
pub trait Client: Send + Sync {
    fn send_diagnostics(&self, file: &str, diagnostics: Vec<lsp_types::Diagnostic>);
}

/// The seam between the coordinator and a dialect front-end. The VHDL
/// implementation lives here; the parallel dialect ships its own.
pub trait FileWorker: Send {
    fn update(&self);
    fn folding_ranges(&self, reply: Reply<Vec<FoldingRange>>);
    fn symbols(&self, reply: Reply<Vec<DocumentSymbol>>);
    fn hover(&self, position: lsp_types::Position, reply: Reply<Option<Hover>>);
    fn definition(&self, position: lsp_types::Position, reply: Reply<Vec<LocationLink>>);
    fn invalidate_potentially_referenced_file(&self, file: &str);
    fn stop(&self);
    fn join(&mut self);
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    RunOnMainThread,
    RunOnWorkerThread,
}

struct Task {
    name: &'static str,
    superseded: bool,
    action: Box<dyn FnOnce(bool) + Send>,
}

struct TaskQueue {
    queue: Mutex<VecDeque<Task>>,
    available: Condvar,
    stopped: AtomicBool,
}

impl TaskQueue {
    fn new() -> Self {
        TaskQueue {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            stopped: AtomicBool::new(false),
        }
    }
}

struct FileState {
    file: String,
    ast: Option<Ast>,
    current_project_version: u64,
    library_fully_loaded: bool,
    work_libraries: Vec<String>,
}

/// The VHDL working file: a task queue, a lazily built façade, and the list
/// of referenced files other workers have invalidated behind our back.
pub struct VhdlWorkingFile {
    file: String,
    policy: Policy,
    queue: Arc<TaskQueue>,
    state: Arc<Mutex<FileState>>,
    invalid_files: Arc<Mutex<Vec<String>>>,
    project: Arc<Project>,
    client: Arc<dyn Client>,
    thread: Option<JoinHandle<()>>,
}

impl VhdlWorkingFile {
    pub fn new(
        file: &str,
        policy: Policy,
        project: Arc<Project>,
        client: Arc<dyn Client>,
    ) -> Self {
        let queue = Arc::new(TaskQueue::new());

        let thread = match policy {
            Policy::RunOnMainThread => None,
            Policy::RunOnWorkerThread => {
                let queue = Arc::clone(&queue);
                let name = file.to_string();
                Some(std::thread::spawn(move || {
                    log::info!("{name}: started");
                    forever_loop(&queue, &name);
                    log::info!("{name}: done");
                }))
            }
        };

        VhdlWorkingFile {
            file: file.to_string(),
            policy,
            queue,
            state: Arc::new(Mutex::new(FileState {
                file: file.to_string(),
                ast: None,
                current_project_version: 0,
                library_fully_loaded: false,
                work_libraries: Vec::new(),
            })),
            invalid_files: Arc::new(Mutex::new(Vec::new())),
            project,
            client,
            thread,
        }
    }

    fn add_task(&self, name: &'static str, action: Box<dyn FnOnce(bool) + Send>) {
        if self.policy == Policy::RunOnMainThread {
            action(false);
            return;
        }

        let mut queue = self.queue.queue.lock().expect("task queue");
        // anything still waiting is now stale
        for task in queue.iter_mut() {
            task.superseded = true;
        }
        queue.push_back(Task { name, superseded: false, action });
        self.queue.available.notify_one();
    }

    /// Queue a task that brings the façade up to date and hands it to
    /// `f`. A superseded task replies with the default value immediately.
    fn run_with_ast<T, F>(&self, reply: Reply<T>, f: F)
    where
        T: Default + Send + 'static,
        F: FnOnce(&Ast) -> T + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let invalid_files = Arc::clone(&self.invalid_files);
        let project = Arc::clone(&self.project);
        let client = Arc::clone(&self.client);
        let queue = Arc::clone(&self.queue);

        self.add_task(
            "run_with_ast",
            Box::new(move |is_superseded| {
                if is_superseded {
                    reply(T::default());
                    return;
                }

                let mut state = state.lock().expect("file state");
                make_sure_this_is_latest_project_version(&mut state, &project);
                drain_invalidations(&mut state, &invalid_files);

                let was_already_uptodate = match state.ast.as_mut() {
                    Some(ast) => ast.update(),
                    None => true,
                };
                if !was_already_uptodate {
                    send_diagnostics_back_to_client_if_needed(&state, &queue, &*client);
                }

                match state.ast.as_ref() {
                    Some(ast) => reply(f(ast)),
                    None => reply(T::default()),
                }
            }),
        );
    }
}

impl FileWorker for VhdlWorkingFile {
    fn update(&self) {
        let state = Arc::clone(&self.state);
        let invalid_files = Arc::clone(&self.invalid_files);
        let project = Arc::clone(&self.project);
        let client = Arc::clone(&self.client);
        let queue = Arc::clone(&self.queue);

        self.add_task(
            "update",
            Box::new(move |is_superseded| {
                if is_superseded {
                    return;
                }

                let mut state = state.lock().expect("file state");
                make_sure_this_is_latest_project_version(&mut state, &project);
                drain_invalidations(&mut state, &invalid_files);

                if let Some(ast) = state.ast.as_mut() {
                    ast.invalidate_main_file();
                    ast.update();
                }

                send_diagnostics_back_to_client_if_needed(&state, &queue, &*client);
            }),
        );
    }

    fn folding_ranges(&self, reply: Reply<Vec<FoldingRange>>) {
        self.run_with_ast(reply, |ast| providers::folding::folding_ranges(ast));
    }

    fn symbols(&self, reply: Reply<Vec<DocumentSymbol>>) {
        self.run_with_ast(reply, |ast| providers::symbols::document_symbols(ast));
    }

    fn hover(&self, position: lsp_types::Position, reply: Reply<Option<Hover>>) {
        let position = from_wire_position(position);
        self.run_with_ast(reply, move |ast| providers::hover::hover(ast, position));
    }

    fn definition(&self, position: lsp_types::Position, reply: Reply<Vec<LocationLink>>) {
        let position = from_wire_position(position);
        self.run_with_ast(reply, move |ast| {
            providers::definition::definition(ast, position)
        });
    }

    fn invalidate_potentially_referenced_file(&self, file: &str) {
        self.invalid_files
            .lock()
            .expect("invalid files")
            .push(file.to_string());
    }

    fn stop(&self) {
        self.queue.stopped.store(true, Ordering::SeqCst);
        self.queue.available.notify_all();
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("{}: worker thread panicked", self.file);
            }
        }
    }
}

fn forever_loop(queue: &TaskQueue, file: &str) {
    loop {
        let task = {
            let mut guard = queue.queue.lock().expect("task queue");
            loop {
                if queue.stopped.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(task) = guard.pop_front() {
                    break task;
                }
                guard = queue.available.wait(guard).expect("task queue");
            }
        };

        log::debug!("{file}: running '{}' (superseded: {})", task.name, task.superseded);

        let superseded = task.superseded;
        let action = task.action;
        if std::panic::catch_unwind(AssertUnwindSafe(move || action(superseded))).is_err() {
            log::error!("caught panic while working on {file}");
        }
    }
}

fn drain_invalidations(state: &mut FileState, invalid_files: &Mutex<Vec<String>>) {
    let pending: Vec<String> = invalid_files.lock().expect("invalid files").drain(..).collect();
    if pending.is_empty() {
        return;
    }
    if let Some(ast) = state.ast.as_mut() {
        for file in &pending {
            ast.invalidate_reference_file(file);
        }
    }
}

/// A project reload (or the indexer finishing) is authoritative: the façade
/// is rebuilt from scratch against the current library manager, discarding
/// its unit cache and any stale use-clause shapes.
fn make_sure_this_is_latest_project_version(state: &mut FileState, project: &Project) {
    let version = project.get_loaded_version();
    let populated = project.libraries_have_been_populated();

    if state.ast.is_some()
        && state.current_project_version == version
        && state.library_fully_loaded == populated
    {
        return;
    }

    state.current_project_version = version;
    state.library_fully_loaded = populated;
    state.work_libraries = project.get_libraries_this_file_is_part_of(&state.file);

    let work = state
        .work_libraries
        .first()
        .cloned()
        .unwrap_or_else(|| "work".to_string());
    state.ast = Some(Ast::new(
        &state.file,
        project.get_current_library_manager(),
        &work,
    ));
}

fn send_diagnostics_back_to_client_if_needed(
    state: &FileState,
    queue: &TaskQueue,
    client: &dyn Client,
) {
    if queue.stopped.load(Ordering::SeqCst) {
        return;
    }
    let Some(ast) = state.ast.as_ref() else {
        return;
    };

    let (parse_errors, semantic_errors) = ast.get_diagnostics();
    let mut diagnostics = Vec::with_capacity(parse_errors.len() + 2);

    let notice = |message: String| lsp_types::Diagnostic {
        range: lsp_types::Range::default(),
        severity: Some(DiagnosticSeverity::WARNING),
        message,
        source: Some("vhdlsense".to_string()),
        ..Default::default()
    };

    if ast.get_main_file().is_none() {
        diagnostics.push(notice(FILE_NOT_FOUND.replace("{}", &state.file)));
    }

    if state.current_project_version == 0 {
        diagnostics.push(notice(NO_PROJECT.to_string()));
    } else if !state.library_fully_loaded {
        diagnostics.push(notice(
            STILL_INDEXING.replace("{}", &semantic_errors.len().to_string()),
        ));
    } else if state.work_libraries.is_empty() {
        diagnostics.push(notice(NOT_IN_PROJECT.to_string()));
    }

    for diagnostic in parse_errors {
        diagnostics.push(lsp_types::Diagnostic {
            range: to_wire_range(diagnostic.location),
            severity: Some(DiagnosticSeverity::ERROR),
            message: diagnostic.message(),
            source: Some("vhdlsense".to_string()),
            ..Default::default()
        });
    }

    // semantic findings are withheld until the index is complete; before
    // that they are mostly noise about units that simply are not indexed yet
    if state.library_fully_loaded {
        for diagnostic in semantic_errors {
            diagnostics.push(lsp_types::Diagnostic {
                range: to_wire_range(diagnostic.location),
                severity: Some(DiagnosticSeverity::ERROR),
                message: diagnostic.message(),
                source: Some("vhdlsense".to_string()),
                ..Default::default()
            });
        }
    }

    client.send_diagnostics(&state.file, diagnostics);
}

/// The registry of working files.
pub struct WorkingFiles {
    files: HashMap<String, Box<dyn FileWorker>>,
    project: Arc<Project>,
    client: Arc<dyn Client>,
    everything_on_main_thread: bool,
}

impl WorkingFiles {
    pub fn new(
        project: Arc<Project>,
        client: Arc<dyn Client>,
        everything_on_main_thread: bool,
    ) -> Self {
        WorkingFiles {
            files: HashMap::new(),
            project,
            client,
            everything_on_main_thread,
        }
    }

    /// Parse and bind `file`, creating its working file on first sight, then
    /// tell every other working file that `file` may be a dependency of
    /// theirs. Returns true when a new working file was created.
    pub fn update(&mut self, file: &str) -> bool {
        let mut new_file = false;

        if !self.files.contains_key(file) {
            let extension = file
                .rfind('.')
                .map(|i| &file[i..])
                .unwrap_or_default();

            if is_an_sv_file(extension) {
                // the parallel dialect's front-end plugs in through the
                // FileWorker seam; this build ships only the VHDL one
                log::warn!("{file}: no front-end for this dialect");
                return false;
            }
            if !is_a_vhdl_file(extension) {
                log::warn!("{file}: not a vhdl file");
                return false;
            }

            let policy = if self.everything_on_main_thread {
                Policy::RunOnMainThread
            } else {
                Policy::RunOnWorkerThread
            };
            let worker = VhdlWorkingFile::new(
                file,
                policy,
                Arc::clone(&self.project),
                Arc::clone(&self.client),
            );
            self.files.insert(file.to_string(), Box::new(worker));
            new_file = true;
        }

        for (name, worker) in &self.files {
            if name.as_str() == file {
                worker.update();
            } else {
                worker.invalidate_potentially_referenced_file(file);
            }
        }

        new_file
    }

    /// Tear down one working file (editor closed it).
    pub fn remove(&mut self, file: &str) {
        if let Some(mut worker) = self.files.remove(file) {
            worker.stop();
            worker.join();
        }
    }

    /// Re-queue an update for every open file (project reload).
    pub fn update_all_files(&self) {
        for worker in self.files.values() {
            worker.update();
        }
    }

    pub fn folding_ranges(&self, file: &str, reply: Reply<Vec<FoldingRange>>) {
        match self.files.get(file) {
            Some(worker) => worker.folding_ranges(reply),
            None => reply(Vec::new()),
        }
    }

    pub fn symbols(&self, file: &str, reply: Reply<Vec<DocumentSymbol>>) {
        match self.files.get(file) {
            Some(worker) => worker.symbols(reply),
            None => reply(Vec::new()),
        }
    }

    pub fn hover(&self, file: &str, position: lsp_types::Position, reply: Reply<Option<Hover>>) {
        match self.files.get(file) {
            Some(worker) => worker.hover(position, reply),
            None => reply(None),
        }
    }

    pub fn definition(
        &self,
        file: &str,
        position: lsp_types::Position,
        reply: Reply<Vec<LocationLink>>,
    ) {
        match self.files.get(file) {
            Some(worker) => worker.definition(position, reply),
            None => reply(Vec::new()),
        }
    }

    /// Signal every worker to stop, then join them. Workers notice the stop
    /// flag at their next wakeup, so joining is prompt; working files stay
    /// cheap to destroy for exactly this reason.
    pub fn shutdown(&mut self) {
        for worker in self.files.values() {
            worker.stop();
        }
        for worker in self.files.values_mut() {
            worker.join();
        }
        self.files.clear();
    }
}

impl Drop for WorkingFiles {
    fn drop(&mut self) {
        self.shutdown();
    }
}
