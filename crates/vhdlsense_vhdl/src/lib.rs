//! VHDL front-end: tokenizer, parser, binder, library index and the
//! incremental AST façade.
//!
//! The pipeline is `&[u8]` → [`lexer::Lexer`] → [`parser::Parser`] → AST +
//! parse diagnostics → [`binder::Binder`] → declarative regions, `denotes`
//! annotations and semantic diagnostics. [`ast::Ast`] owns one pipeline per
//! open file and the per-library cache that mediates cross-file lookups;
//! [`library::LibraryManager`] hands out the persistent indexes that make
//! demand-loading possible.

pub mod ast;
pub mod binder;
pub mod chars;
pub mod fast_parser;
pub mod lexer;
pub mod library;
pub mod node;
pub mod parser;
pub mod syntax;
pub mod token;

pub use ast::{is_a_vhdl_file, is_an_sv_file, Ast, SourceFile};
pub use library::{LibraryBackend, LibraryManager, LibraryUnitKind, UnitRow};
pub use node::{EntityKind, EntityRef, LibraryUnitState, NamedEntity, UnitId};
pub use token::Version;
