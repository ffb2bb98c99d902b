//! Debug driver.
//!
//! Runs the front-end over one file from the command line:
//!
//! ```text
//! vhdlsense --tokens design.vhd      dump the token stream
//! vhdlsense --ast design.vhd         parse + bind, print units and diagnostics
//! vhdlsense --stats design.vhd       add counts and timings
//! vhdlsense --work mylib design.vhd  name the work library
//! ```
//!
//! Exit code 0 on success; bit 2 is set when parse diagnostics were
//! produced; 1 on configuration or I/O errors.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser as ClapParser;

use vhdlsense_base::StringTable;
use vhdlsense_vhdl::ast::Ast;
use vhdlsense_vhdl::lexer::Lexer;
use vhdlsense_vhdl::library::LibraryManager;
use vhdlsense_vhdl::token::Kind;
use vhdlsense_vhdl::{is_a_vhdl_file, Version};

#[derive(ClapParser)]
#[command(name = "vhdlsense", version, about = "vhdlsense debug driver")]
struct Args {
    /// Dump the token stream.
    #[arg(long)]
    tokens: bool,

    /// Parse and bind, printing design units and diagnostics (the default).
    #[arg(long)]
    ast: bool,

    /// Print counts and timings.
    #[arg(long)]
    stats: bool,

    /// Work library name.
    #[arg(long, default_value = "work")]
    work: String,

    /// The file to analyse.
    file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}: not a vhdl file")]
    NotAVhdlFile(String),
    #[error("cannot read {0}: {1}")]
    Io(String, std::io::Error),
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, CliError> {
    let path = args.file.display().to_string();

    let extension = args
        .file
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    if !is_a_vhdl_file(&extension) {
        return Err(CliError::NotAVhdlFile(path));
    }

    if args.tokens {
        return debug_tokens(args, &path);
    }

    debug_ast(args, &path)
}

fn debug_tokens(args: &Args, path: &str) -> Result<ExitCode, CliError> {
    let src = std::fs::read(&args.file).map_err(|e| CliError::Io(path.to_string(), e))?;

    let started = Instant::now();
    let mut strings = StringTable::new();
    let mut lexer = Lexer::new(&src, &mut strings, path, Version::Vhdl93);
    lexer.scan();

    let mut count = 0usize;
    loop {
        let token = lexer.current_token();
        if token.kind == Kind::Eof {
            break;
        }
        count += 1;
        println!(
            "{:>5}.{:<3} {:<20} {}",
            token.location.begin.line,
            token.location.begin.column,
            token.kind.name(),
            lexer.strings().resolve(token.value),
        );
        lexer.scan();
    }

    let diagnostics = lexer.take_diagnostics();
    for diagnostic in &diagnostics {
        eprintln!("{diagnostic}");
    }

    if args.stats {
        println!(
            "-- {count} tokens, {} diagnostics, {:?}",
            diagnostics.len(),
            started.elapsed()
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn debug_ast(args: &Args, path: &str) -> Result<ExitCode, CliError> {
    if !args.file.exists() {
        return Err(CliError::Io(
            path.to_string(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        ));
    }

    let started = Instant::now();
    let manager = Arc::new(LibraryManager::new(None, true));
    let mut ast = Ast::new(path, manager, &args.work);
    ast.update();
    let elapsed = started.elapsed();

    let mut unit_count = 0usize;
    if let Some(main) = ast.get_main_file() {
        for &uid in &main.units {
            let Some(unit) = ast.unit(uid) else { continue };
            unit_count += 1;
            let identifier = ast.strings().resolve(unit.syntax.identifier().value);
            let kind = match &unit.syntax.kind {
                vhdlsense_vhdl::syntax::DesignUnitKind::Entity(_) => "entity",
                vhdlsense_vhdl::syntax::DesignUnitKind::Architecture(_) => "architecture",
                vhdlsense_vhdl::syntax::DesignUnitKind::Package(_) => "package",
                vhdlsense_vhdl::syntax::DesignUnitKind::PackageBody(_) => "package body",
                vhdlsense_vhdl::syntax::DesignUnitKind::Configuration(_) => "configuration",
            };
            println!("{kind} {identifier}");
            if args.stats {
                println!(
                    "  {} regions, {} named entities",
                    unit.arena.region_count(),
                    unit.arena.entity_count()
                );
            }
        }
    }

    let (parse_errors, semantic_errors) = ast.get_diagnostics();
    for diagnostic in parse_errors {
        eprintln!("parse: {diagnostic}");
    }
    for diagnostic in semantic_errors {
        eprintln!("semantic: {diagnostic}");
    }

    if args.stats {
        println!(
            "-- {unit_count} units, {} parse / {} semantic diagnostics, {elapsed:?}",
            parse_errors.len(),
            semantic_errors.len()
        );
    }

    if !parse_errors.is_empty() {
        // bit 2 flags parse problems
        return Ok(ExitCode::from(4));
    }

    Ok(ExitCode::SUCCESS)
}
