//! Cross-unit resolution through the library index.

use std::io::Write;
use std::sync::Arc;

use vhdlsense_vhdl::ast::Ast;
use vhdlsense_vhdl::fast_parser::FastParser;
use vhdlsense_vhdl::library::LibraryManager;
use vhdlsense_vhdl::node::{EntityKind, LibraryUnitState};
use vhdlsense_vhdl::syntax::{ConcStmt, DesignUnitKind, ExprKind, SeqStmt, Target};
use vhdlsense_base::StringTable;

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).expect("create");
    f.write_all(content.as_bytes()).expect("write");
    path.to_str().unwrap().to_string()
}

/// Index a file the way the project scanner would: fast-parse and put rows.
fn index_file(manager: &LibraryManager, library: &str, path: &str) {
    let src = std::fs::read(path).expect("read");
    let mut strings = StringTable::new();
    let rows = FastParser::new(&src, &mut strings, path).parse();
    let backend = manager.get(library);
    for row in rows {
        backend.put(&row);
    }
}

const PACKAGE_SRC: &str = "package p is constant k : integer := 7; end package;\n";

// the context clause sits between the units so it attaches to the
// architecture, which is the unit that uses the package
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

/// Pull the denotes list of the `k` reference out of file 2's architecture.
fn denotes_of_k(ast: &Ast) -> Vec<vhdlsense_vhdl::EntityRef> {
    let main = ast.get_main_file().expect("main file");
    for &uid in &main.units {
        let Some(unit) = ast.unit(uid) else { continue };
        let DesignUnitKind::Architecture(arch) = &unit.syntax.kind else {
            continue;
        };
        for stmt in &arch.stmts {
            let ConcStmt::CondAssign { waveforms, .. } = &stmt.kind else {
                continue;
            };
            let value = waveforms[0].waveforms[0].value.as_ref().expect("value");
            let ExprKind::Unresolved { name } = &value.kind else {
                panic!("expected name expression, got {:?}", value.kind);
            };
            return name.denotes.clone();
        }
    }
    panic!("no assignment found");
}

#[test]
fn use_clause_resolves_constant_from_indexed_package() {
    let dir = tempfile::tempdir().unwrap();
    let pkg_path = write_file(&dir, "p.vhd", PACKAGE_SRC);
    let arch_path = write_file(&dir, "top.vhd", ARCH_SRC);

    let manager = Arc::new(LibraryManager::new(None, true));
    index_file(&manager, "work", &pkg_path);

    let mut ast = Ast::new(&arch_path, Arc::clone(&manager), "work");
    ast.update();

    let denotes = denotes_of_k(&ast);
    assert_eq!(denotes.len(), 1, "k should denote exactly one entity");

    let entity = ast.entity(denotes[0]).expect("entity resolvable");
    assert_eq!(entity.kind, EntityKind::Constant);
    assert_eq!(ast.strings().resolve(entity.identifier), "k");

    // the architecture's unit depends on the demand-loaded package unit
    let main = ast.get_main_file().unwrap();
    let arch_unit = main
        .units
        .iter()
        .find_map(|&uid| {
            let unit = ast.unit(uid)?;
            matches!(unit.syntax.kind, DesignUnitKind::Architecture(_)).then_some(unit)
        })
        .expect("architecture unit");
    assert!(
        arch_unit.dependencies.contains(&denotes[0].unit),
        "dependencies {:?} should contain {:?}",
        arch_unit.dependencies,
        denotes[0].unit
    );

    // and the package unit holds a back-reference
    let pkg_unit = ast.unit(denotes[0].unit).expect("package unit");
    assert_eq!(pkg_unit.state, LibraryUnitState::Analysed);
    assert!(pkg_unit.references.contains(&arch_unit.id));
}

#[test]
fn unresolved_after_reference_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let pkg_path = write_file(&dir, "p.vhd", PACKAGE_SRC);
    let arch_path = write_file(&dir, "top.vhd", ARCH_SRC);

    let manager = Arc::new(LibraryManager::new(None, true));
    index_file(&manager, "work", &pkg_path);

    let mut ast = Ast::new(&arch_path, Arc::clone(&manager), "work");
    ast.update();
    assert_eq!(denotes_of_k(&ast).len(), 1);

    // rename k to kk in the package and re-index
    std::fs::write(&pkg_path, "package p is constant kk : integer := 7; end package;\n")
        .expect("rewrite");
    index_file(&manager, "work", &pkg_path);

    // propagate the invalidation and rebuild
    ast.invalidate_reference_file(&pkg_path);
    assert!(!ast.is_uptodate());
    ast.update();

    let denotes = denotes_of_k(&ast);
    assert!(denotes.is_empty(), "k must no longer resolve: {denotes:?}");

    let (_, semantic) = ast.get_diagnostics();
    assert!(
        semantic.iter().any(|d| d.message() == "k is not declared"),
        "{semantic:?}"
    );
}

#[test]
fn architecture_extends_its_entity_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let entity_path = write_file(
        &dir,
        "gate.vhd",
        "entity gate is\n  port ( a : in bit; b : out bit );\nend entity gate;\n",
    );
    let arch_path = write_file(
        &dir,
        "gate_rtl.vhd",
        "architecture rtl of gate is\nbegin\n  b <= a;\nend architecture;\n",
    );

    let manager = Arc::new(LibraryManager::new(None, true));
    index_file(&manager, "work", &entity_path);

    let mut ast = Ast::new(&arch_path, Arc::clone(&manager), "work");
    ast.update();

    // the ports a and b come from the entity in the other file; with the
    // extends link in place they resolve and nothing is diagnosed
    let (parse, semantic) = ast.get_diagnostics();
    assert!(parse.is_empty(), "{parse:?}");
    assert!(semantic.is_empty(), "{semantic:?}");
}

#[test]
fn missing_entity_for_architecture_is_diagnosed() {
    let dir = tempfile::tempdir().unwrap();
    let arch_path = write_file(
        &dir,
        "orphan.vhd",
        "architecture rtl of ghost is\nbegin\nend architecture;\n",
    );

    let manager = Arc::new(LibraryManager::new(None, true));
    let mut ast = Ast::new(&arch_path, manager, "work");
    ast.update();

    let (_, semantic) = ast.get_diagnostics();
    assert!(
        semantic.iter().any(|d| d.message().contains("ghost")),
        "{semantic:?}"
    );
}

#[test]
fn fast_parser_agrees_with_full_parser_on_headers() {
    let src = "entity alpha is end entity;\narchitecture beta of alpha is begin end architecture;\npackage gamma is end package;\n";

    let mut strings = StringTable::new();
    let rows = FastParser::new(src.as_bytes(), &mut strings, "x.vhd").parse();

    let mut strings2 = StringTable::new();
    let parser = vhdlsense_vhdl::parser::Parser::new(
        src.as_bytes(),
        &mut strings2,
        "x.vhd",
        vhdlsense_vhdl::Version::Vhdl93,
    );
    let (units, diags) = parser.parse();
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(rows.len(), units.len());

    for (row, unit) in rows.iter().zip(&units) {
        assert_eq!(row.identifier, strings2.resolve(unit.identifier().value));
        assert_eq!(
            row.identifier2.as_deref(),
            unit.secondary_identifier().map(|s| strings2.resolve(s)),
        );
        assert_eq!(row.line, unit.identifier().location.begin.line);
    }
}

#[test]
fn signal_assignment_target_resolves_to_port_entity() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "c.vhd",
        "entity c is\n  port ( q : out bit );\nend entity;\narchitecture a of c is\nbegin\n  p0 : process begin\n    q <= '0';\n  end process;\nend architecture;\n",
    );

    let manager = Arc::new(LibraryManager::new(None, true));
    let mut ast = Ast::new(&path, manager, "work");
    ast.update();

    let (parse, semantic) = ast.get_diagnostics();
    assert!(parse.is_empty(), "{parse:?}");
    assert!(semantic.is_empty(), "{semantic:?}");

    // dig out the q target's denotes
    let main = ast.get_main_file().unwrap();
    let arch = main
        .units
        .iter()
        .find_map(|&uid| {
            let unit = ast.unit(uid)?;
            match &unit.syntax.kind {
                DesignUnitKind::Architecture(a) => Some(a),
                _ => None,
            }
        })
        .expect("architecture");

    let ConcStmt::Process(process) = &arch.stmts[0].kind else { panic!() };
    let SeqStmt::SignalAssign { target, .. } = &process.stmts[0].kind else {
        panic!()
    };
    let Target::Name(name) = target else { panic!() };
    assert_eq!(name.denotes.len(), 1);
    let entity = ast.entity(name.denotes[0]).expect("resolved");
    assert_eq!(entity.kind, EntityKind::Signal);
}
