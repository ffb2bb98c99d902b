//! Structural atoms shared by every vhdlsense crate.
//!
//! This crate has no dependencies and no opinions about VHDL. It provides:
//!
//! - [`StringTable`] / [`Symbol`]: page-arena string interning
//! - [`Position`] / [`Location`]: 1-based source coordinates and ranges
//! - [`Diagnostic`]: format + arguments + range records

mod diag;
mod intern;
mod location;
mod position;

pub use diag::{DiagArg, Diagnostic};
pub use intern::{StringTable, Symbol};
pub use location::Location;
pub use position::Position;
