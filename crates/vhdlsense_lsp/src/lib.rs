//! Editor-facing layer over the VHDL front-end.
//!
//! [`WorkingFiles`] is the incremental coordinator: one façade per open
//! file, per-file task queues with supersede-on-enqueue, and invalidation
//! propagation between files. The `providers` module holds the read-only
//! traversals behind folding ranges, document symbols, hover and go-to-
//! definition; `wire` converts between the engine's one-based positions and
//! the zero-based wire format. The protocol transport itself is the host's
//! concern — everything here speaks plain `lsp-types` values through
//! one-shot reply handles.

pub mod project;
pub mod providers;
pub mod wire;
pub mod working_files;

pub use project::Project;
pub use working_files::{Client, FileWorker, Policy, Reply, VhdlWorkingFile, WorkingFiles};
