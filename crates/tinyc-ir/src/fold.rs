//! Constant folding (§4.11) and the declared-but-inert dead-code pass.
//!
//! Grounded on `original_source/src/codegen/intermediate_code.h`'s
//! `IntermediateCode::constantFolding`/`deadCodeElimination`.

use tinyc_util::Symbol;

use crate::ir::{IrType, Operand, OpCode};

/// Rewrites every instruction whose `arg1`/`arg2` are both integer
/// constants and whose opcode is `+ - * / %` into a plain `ASSIGN` of
/// the computed constant, in place. Division/modulo by a constant zero
/// is left untouched — the semantic analyzer already flagged it, and
/// folding it here would require picking an arbitrary placeholder
/// value for something that is already a compile error.
pub fn constant_fold(instructions: &mut [crate::ir::Instruction]) {
    for instr in instructions.iter_mut() {
        let Some(folded_op) = foldable_op(instr.op) else { continue };
        let (Some(arg1), Some(arg2)) = (&instr.arg1, &instr.arg2) else { continue };
        if !arg1.is_constant() || !arg2.is_constant() {
            continue;
        }
        let (Some(a), Some(b)) = (parse_int(arg1), parse_int(arg2)) else { continue };
        if matches!(folded_op, OpCode::Div | OpCode::Mod) && b == 0 {
            continue;
        }
        let value = match folded_op {
            OpCode::Add => a.wrapping_add(b),
            OpCode::Sub => a.wrapping_sub(b),
            OpCode::Mul => a.wrapping_mul(b),
            OpCode::Div => a / b,
            OpCode::Mod => a % b,
            _ => continue,
        };
        let text = Symbol::intern(&value.to_string());
        instr.op = OpCode::Assign;
        instr.arg1 = Some(Operand::constant(text, text, IrType::Int));
        instr.arg2 = None;
        instr.comment = Some("constant-folded".to_string());
    }
}

fn foldable_op(op: OpCode) -> Option<OpCode> {
    matches!(op, OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Mod).then_some(op)
}

fn parse_int(operand: &Operand) -> Option<i64> {
    operand.value.and_then(|v| v.as_str().parse::<i64>().ok())
}

/// The original declares `deadCodeElimination()` but the header gives
/// no hint of a dataflow analysis backing it anywhere else in the
/// codegen module; kept here as a named, documented no-op rather than
/// inventing a liveness analysis nothing else here requires (§9 Open
/// Questions, resolved: inert by design).
pub fn dead_code_elimination(_instructions: &mut [crate::ir::Instruction]) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Instruction;

    fn int_const(v: i64) -> Operand {
        let sym = Symbol::intern(&v.to_string());
        Operand::constant(sym, sym, IrType::Int)
    }

    #[test]
    fn folds_a_constant_addition_into_an_assign() {
        let result = Operand::temporary(Symbol::intern("t0"), IrType::Int);
        let mut instrs = vec![Instruction::binary_op(OpCode::Add, result, int_const(2), int_const(3), 1)];
        constant_fold(&mut instrs);
        assert_eq!(instrs[0].op, OpCode::Assign);
        assert_eq!(instrs[0].arg1.as_ref().unwrap().value.unwrap().as_str(), "5");
        assert!(instrs[0].arg2.is_none());
    }

    #[test]
    fn does_not_fold_division_by_a_constant_zero() {
        let result = Operand::temporary(Symbol::intern("t0"), IrType::Int);
        let mut instrs = vec![Instruction::binary_op(OpCode::Div, result, int_const(1), int_const(0), 1)];
        constant_fold(&mut instrs);
        assert_eq!(instrs[0].op, OpCode::Div);
    }

    #[test]
    fn leaves_non_constant_operands_untouched() {
        let result = Operand::temporary(Symbol::intern("t0"), IrType::Int);
        let var = Operand::variable(Symbol::intern("x"), IrType::Int);
        let mut instrs = vec![Instruction::binary_op(OpCode::Add, result, var, int_const(1), 1)];
        constant_fold(&mut instrs);
        assert_eq!(instrs[0].op, OpCode::Add);
    }
}
