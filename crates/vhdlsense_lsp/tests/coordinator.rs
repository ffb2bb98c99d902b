//! End-to-end coordinator scenarios: queries through working files,
//! invalidation cascades across files, diagnostics to the client sink.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use vhdlsense_lsp::{Client, Project, WorkingFiles};
use vhdlsense_vhdl::LibraryManager;

#[derive(Default)]
struct RecordingClient {
    diagnostics: Mutex<Vec<(String, Vec<lsp_types::Diagnostic>)>>,
}

impl Client for RecordingClient {
    fn send_diagnostics(&self, file: &str, diagnostics: Vec<lsp_types::Diagnostic>) {
        self.diagnostics
            .lock()
            .unwrap()
            .push((file.to_string(), diagnostics));
    }
}

impl RecordingClient {
    fn last_for(&self, file: &str) -> Option<Vec<lsp_types::Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(f, _)| f == file)
            .map(|(_, d)| d.clone())
    }
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).expect("create");
    f.write_all(content.as_bytes()).expect("write");
    path.to_str().unwrap().to_string()
}

/// A project whose library manager is loaded and marked fully populated,
/// with every given file mapped into the work library.
fn loaded_project(files: &[&str]) -> Arc<Project> {
    let project = Arc::new(Project::new());
    let manager = Arc::new(LibraryManager::new(None, true));
    let mut mapping = HashMap::new();
    for file in files {
        mapping.insert(file.to_string(), vec!["work".to_string()]);
    }
    project.load(manager, mapping);
    project
}

fn capture<T: Send + 'static>() -> (
    Arc<Mutex<Option<T>>>,
    Box<dyn FnOnce(T) + Send>,
) {
    let slot: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
    let writer = Arc::clone(&slot);
    (
        slot,
        Box::new(move |value| {
            *writer.lock().unwrap() = Some(value);
        }),
    )
}

const PACKAGE_SRC: &str = "package p is constant k : integer := 7; end package;\n";

const ARCH_SRC: &str = "\
entity top is end entity;
library work;
use work.p.all;
architecture rtl of top is
  signal s : integer;
begin
  s <= k;
end architecture;
";

#[test]
fn document_symbols_for_single_entity() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "counter.vhd",
        "entity counter is\n  port ( clk : in bit;\n         q   : out bit );\nend entity counter;\n",
    );

    let project = loaded_project(&[&path]);
    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client.clone(), true);

    assert!(files.update(&path));

    let (slot, reply) = capture();
    files.symbols(&path, reply);
    let symbols = slot.lock().unwrap().take().expect("symbols replied");

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "counter");
    let children = symbols[0].children.as_ref().expect("ports as children");
    let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
    assert!(names.contains(&"clk"));
    assert!(names.contains(&"q"));

    // update published a diagnostics notification (empty for clean source)
    let diags = client.last_for(&path).expect("diagnostics published");
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn folding_ranges_for_architecture_regions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "a.vhd",
        "entity e is end entity;\narchitecture a of e is\n  signal s : bit;\n  signal t : bit;\nbegin\n  s <= t;\n  t <= s;\nend architecture;\n",
    );

    let project = loaded_project(&[&path]);
    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client, true);
    files.update(&path);

    let (slot, reply) = capture();
    files.folding_ranges(&path, reply);
    let ranges = slot.lock().unwrap().take().expect("folding replied");

    // declaration region: is on line 2 (wire 1) .. begin on line 5 (wire 4)
    assert!(
        ranges.iter().any(|r| r.start_line == 1 && r.end_line == 3),
        "{ranges:?}"
    );
    // statement region: begin line 5 .. end line 8
    assert!(
        ranges.iter().any(|r| r.start_line == 4 && r.end_line == 6),
        "{ranges:?}"
    );
    // never a fold whose start and end are closer than two lines apart
    for r in &ranges {
        assert!(r.end_line > r.start_line, "{r:?}");
    }
}

#[test]
fn hover_reports_single_denotation() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = write_file(&dir, "p.vhd", PACKAGE_SRC);
    let arch = write_file(&dir, "top.vhd", ARCH_SRC);

    let project = loaded_project(&[&pkg, &arch]);
    project.index_file("work", &pkg);

    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client, true);
    files.update(&arch);

    // the k reference on wire line 6, character 7
    let (slot, reply) = capture();
    files.hover(
        &arch,
        lsp_types::Position { line: 6, character: 7 },
        reply,
    );
    let hover = slot.lock().unwrap().take().expect("hover replied");

    let hover = hover.expect("hover hit");
    let lsp_types::HoverContents::Markup(markup) = hover.contents else {
        panic!("expected markup");
    };
    assert!(markup.value.contains("constant"), "{}", markup.value);
    assert!(markup.value.contains("k"), "{}", markup.value);
}

#[test]
fn definition_resolves_into_other_file() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = write_file(&dir, "p.vhd", PACKAGE_SRC);
    let arch = write_file(&dir, "top.vhd", ARCH_SRC);

    let project = loaded_project(&[&pkg, &arch]);
    project.index_file("work", &pkg);

    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client, true);
    files.update(&arch);

    let (slot, reply) = capture();
    files.definition(
        &arch,
        lsp_types::Position { line: 6, character: 7 },
        reply,
    );
    let links = slot.lock().unwrap().take().expect("definition replied");

    assert_eq!(links.len(), 1, "{links:?}");
    assert!(links[0].target_uri.path().ends_with("p.vhd"));
}

#[test]
fn invalidation_cascade_unresolves_renamed_constant() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = write_file(&dir, "p.vhd", PACKAGE_SRC);
    let arch = write_file(&dir, "top.vhd", ARCH_SRC);

    let project = loaded_project(&[&pkg, &arch]);
    project.index_file("work", &pkg);

    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(
        Arc::clone(&project),
        Arc::clone(&client) as Arc<dyn Client>,
        true,
    );
    files.update(&arch);

    let (slot, reply) = capture();
    files.definition(&arch, lsp_types::Position { line: 6, character: 7 }, reply);
    assert_eq!(slot.lock().unwrap().take().unwrap().len(), 1);

    // rename k to kk in the package, re-index and update file 1; the
    // coordinator must propagate the invalidation into file 2's worker
    std::fs::write(&pkg, "package p is constant kk : integer := 7; end package;\n").unwrap();
    project.index_file("work", &pkg);
    files.update(&pkg);

    // file 2's next query re-binds and the reference no longer resolves
    let (slot, reply) = capture();
    files.definition(&arch, lsp_types::Position { line: 6, character: 7 }, reply);
    let links = slot.lock().unwrap().take().expect("definition replied");
    assert!(links.is_empty(), "{links:?}");

    // and the re-bind surfaced a semantic diagnostic for the dangling name
    let diags = client.last_for(&arch).expect("diagnostics published");
    assert!(
        diags.iter().any(|d| d.message == "k is not declared"),
        "{diags:?}"
    );
}

#[test]
fn syntax_errors_are_published_to_the_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.vhd", "entity broken is\n");

    let project = loaded_project(&[&path]);
    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client.clone(), true);
    files.update(&path);

    let diags = client.last_for(&path).expect("diagnostics published");
    assert!(!diags.is_empty());
}

#[test]
fn query_on_unknown_file_replies_empty() {
    let project = loaded_project(&[]);
    let client = Arc::new(RecordingClient::default());
    let files = WorkingFiles::new(project, client, true);

    let (slot, reply) = capture();
    files.folding_ranges("/no/such/file.vhd", reply);
    assert_eq!(slot.lock().unwrap().take(), Some(Vec::new()));
}

#[test]
fn non_vhdl_files_are_rejected() {
    let project = loaded_project(&[]);
    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client, true);

    assert!(!files.update("design.sv"));
    assert!(!files.update("README.md"));
}

#[test]
fn worker_thread_services_queries_and_joins_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "e.vhd", "entity e is end entity;\n");

    let project = loaded_project(&[&path]);
    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client, false);
    files.update(&path);

    let (tx, rx) = std::sync::mpsc::channel();
    files.symbols(
        &path,
        Box::new(move |symbols| {
            let _ = tx.send(symbols);
        }),
    );

    let symbols = rx
        .recv_timeout(std::time::Duration::from_secs(10))
        .expect("worker replied in time");
    assert_eq!(symbols.len(), 1);

    files.shutdown();
}

#[test]
fn superseded_queries_still_reply() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "e.vhd", "entity e is end entity;\n");

    let project = loaded_project(&[&path]);
    let client = Arc::new(RecordingClient::default());
    let mut files = WorkingFiles::new(project, client, false);
    files.update(&path);

    // queue a burst; each request's reply must fire exactly once whether or
    // not it was superseded by the next
    let mut receivers = Vec::new();
    for _ in 0..5 {
        let (tx, rx) = std::sync::mpsc::channel();
        files.symbols(
            &path,
            Box::new(move |symbols| {
                let _ = tx.send(symbols);
            }),
        );
        receivers.push(rx);
    }

    for rx in receivers {
        rx.recv_timeout(std::time::Duration::from_secs(10))
            .expect("every reply fires");
    }

    files.shutdown();
}
