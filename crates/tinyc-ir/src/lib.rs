//! tinyc-ir — the three-address-code generator (§4.10-§4.11).
//!
//! [`generate`] lowers a parsed, semantically-valid program into a flat
//! [`IrProgram`] of [`Instruction`]s; [`blocks`] partitions that flat
//! stream into a basic-block view with a control-flow graph on top;
//! [`fold`] runs a constant-folding peephole pass over the result.

pub mod blocks;
pub mod fold;
pub mod generate;
pub mod ir;

pub use blocks::{build_basic_blocks, BasicBlock};
pub use fold::{constant_fold, dead_code_elimination};
pub use generate::{generate, generate_with_diagnostics, CodeGenResult, IrGenerator};
pub use ir::{
    Instruction, IrProgram, IrType, OpCode, Operand, OperandKind, Statistics, TempAllocator,
};
