//! Lexical analysis (§4.1-§4.3): a hand-assembled DFA with a
//! partition-refinement minimizer for the teaching artifact, and a
//! pragmatic hand-dispatched driver for production tokenization.
//!
//! `dfa`/`minimizer`/`optimizer` exist to demonstrate and validate that
//! the token language is recognizable by a single deterministic
//! automaton; `lexer` is the scanner that actually runs, per §4.1's
//! note on the "pragmatic split" between the two.

pub mod cursor;
pub mod dfa;
pub mod lexer;
pub mod minimizer;
pub mod optimizer;
pub mod token;

pub use dfa::{Dfa, DfaBuilder, StateId, StateKind};
pub use lexer::{LexError, Lexer, LexicalError, LexicalResult};
pub use minimizer::{DfaMinimizer, MinimizationStats};
pub use optimizer::DfaOptimizer;
pub use token::{Token, TokenKind};
