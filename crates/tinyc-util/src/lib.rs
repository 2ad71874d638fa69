//! Foundation types shared by every pipeline stage: interned strings,
//! source spans, typed index vectors, and diagnostics.
//!
//! Nothing in this crate knows about tokens, grammars, or types — it
//! only provides the compact, comparable handles the later stages
//! build their own domain types out of.

pub mod def_id;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{Category, Diagnostic, DiagnosticCode, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
