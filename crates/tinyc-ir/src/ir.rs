//! Three-address-code IR model (§3 IR operand/instruction, §4.10).
//!
//! Grounded on `original_source/src/codegen/intermediate_code.h`'s
//! `Operand`/`ThreeAddressCode`/`IntermediateCode`/`TempManager`
//! quartet. The C++ copy/move constructors that exist only to deep-copy
//! `unique_ptr<Operand>` fields are not ported — `Operand`/`Instruction`
//! hold their fields by value and `#[derive(Clone)]` does the same job
//! for free (noted as an idiom substitution, not a dropped feature).

use std::fmt;

use tinyc_util::Symbol;

/// Ports `OpType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    Load,
    Store,
    Goto,
    IfFalse,
    IfTrue,
    Label,
    Call,
    Param,
    Return,
    ArrayRef,
    ArraySet,
    Cast,
    Nop,
}

impl OpCode {
    /// The infix spelling for a binary opcode, or the prefix spelling
    /// for a unary one. Supersedes the original's `getOpString`, which
    /// only covers `+ - * / % =` and falls back to `"?"` for every
    /// comparison, logical, and unary opcode (`original_source/src/
    /// codegen/intermediate_code.cpp`) — §6's IR textual form spells
    /// out the full operator set, so every opcode renders its own
    /// symbol instead of falling back to `"?"`.
    fn symbol(self) -> &'static str {
        match self {
            OpCode::Add => "+",
            OpCode::Sub => "-",
            OpCode::Mul => "*",
            OpCode::Div => "/",
            OpCode::Mod => "%",
            OpCode::Neg => "-",
            OpCode::Not => "!",
            OpCode::And => "&&",
            OpCode::Or => "||",
            OpCode::Eq => "==",
            OpCode::Ne => "!=",
            OpCode::Lt => "<",
            OpCode::Le => "<=",
            OpCode::Gt => ">",
            OpCode::Ge => ">=",
            _ => "?",
        }
    }

    fn is_unary(self) -> bool {
        matches!(self, OpCode::Neg | OpCode::Not)
    }
}

/// Ports `OperandType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    Variable,
    Constant,
    Temporary,
    Label,
    Function,
}

/// Ports `IRDataType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrType {
    Void,
    Int,
    Float,
    Bool,
    Char,
    Str,
    Pointer,
    Unknown,
}

impl IrType {
    /// The original's `DataType` and `IRDataType` are separate enums
    /// with an implicit 1:1 mapping everywhere a value crosses from
    /// the AST/symbol-table side into codegen; this makes that mapping
    /// explicit instead of leaving it to be inferred at each call site.
    pub fn from_data_type(ty: tinyc_sem::DataType) -> Self {
        use tinyc_sem::DataType;
        match ty {
            DataType::Void => IrType::Void,
            DataType::Int => IrType::Int,
            DataType::Float | DataType::Double => IrType::Float,
            DataType::Bool => IrType::Bool,
            DataType::Char => IrType::Char,
            DataType::Str => IrType::Str,
            DataType::Array | DataType::Pointer | DataType::FunctionType => IrType::Pointer,
            DataType::Unknown => IrType::Unknown,
        }
    }
}

/// Ports `Operand`. `value` carries a constant's literal spelling;
/// `name` carries a variable/temporary/label/function's identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Operand {
    pub kind: OperandKind,
    pub ty: IrType,
    pub name: Symbol,
    pub value: Option<Symbol>,
}

impl Operand {
    pub fn variable(name: Symbol, ty: IrType) -> Self {
        Operand { kind: OperandKind::Variable, ty, name, value: None }
    }

    pub fn temporary(name: Symbol, ty: IrType) -> Self {
        Operand { kind: OperandKind::Temporary, ty, name, value: None }
    }

    pub fn constant(name: Symbol, value: Symbol, ty: IrType) -> Self {
        Operand { kind: OperandKind::Constant, ty, name, value: Some(value) }
    }

    pub fn label(name: Symbol) -> Self {
        Operand { kind: OperandKind::Label, ty: IrType::Void, name, value: None }
    }

    pub fn function(name: Symbol) -> Self {
        Operand { kind: OperandKind::Function, ty: IrType::Unknown, name, value: None }
    }

    pub fn is_constant(&self) -> bool {
        self.kind == OperandKind::Constant
    }

    pub fn is_temporary(&self) -> bool {
        self.kind == OperandKind::Temporary
    }

    pub fn is_variable(&self) -> bool {
        self.kind == OperandKind::Variable
    }

    pub fn is_label(&self) -> bool {
        self.kind == OperandKind::Label
    }
}

impl fmt::Display for Operand {
    /// A constant renders as its literal spelling; every other operand
    /// kind renders as its name (§6 "Operands render as their name ...
    /// or their literal value").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{}", v.as_str()),
            None => write!(f, "{}", self.name.as_str()),
        }
    }
}

/// Ports `ThreeAddressCode`. `Nop` with a `comment` doubles as a
/// stand-alone comment instruction (§4.10 "Comments", §9 "Comment
/// instructions").
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub op: OpCode,
    pub result: Option<Operand>,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
    pub line: u32,
    pub comment: Option<String>,
}

impl Instruction {
    pub fn new(op: OpCode, line: u32) -> Self {
        Instruction { op, result: None, arg1: None, arg2: None, line, comment: None }
    }

    pub fn binary_op(op: OpCode, result: Operand, arg1: Operand, arg2: Operand, line: u32) -> Self {
        Instruction { op, result: Some(result), arg1: Some(arg1), arg2: Some(arg2), line, comment: None }
    }

    pub fn unary_op(op: OpCode, result: Operand, arg1: Operand, line: u32) -> Self {
        Instruction { op, result: Some(result), arg1: Some(arg1), arg2: None, line, comment: None }
    }

    pub fn assign(result: Operand, arg1: Operand, line: u32) -> Self {
        Instruction { op: OpCode::Assign, result: Some(result), arg1: Some(arg1), arg2: None, line, comment: None }
    }

    pub fn goto_label(label: Operand, line: u32) -> Self {
        Instruction { op: OpCode::Goto, result: None, arg1: Some(label), arg2: None, line, comment: None }
    }

    pub fn conditional_jump(op: OpCode, condition: Operand, label: Operand, line: u32) -> Self {
        debug_assert!(matches!(op, OpCode::IfFalse | OpCode::IfTrue));
        Instruction { op, result: None, arg1: Some(condition), arg2: Some(label), line, comment: None }
    }

    pub fn label(label: Operand, line: u32) -> Self {
        Instruction { op: OpCode::Label, result: None, arg1: Some(label), arg2: None, line, comment: None }
    }

    pub fn ret(value: Option<Operand>, line: u32) -> Self {
        Instruction { op: OpCode::Return, result: None, arg1: value, arg2: None, line, comment: None }
    }

    pub fn call(result: Option<Operand>, function: Operand, line: u32) -> Self {
        Instruction { op: OpCode::Call, result, arg1: Some(function), arg2: None, line, comment: None }
    }

    pub fn param(value: Operand, line: u32) -> Self {
        Instruction { op: OpCode::Param, result: None, arg1: Some(value), arg2: None, line, comment: None }
    }

    pub fn comment(text: impl Into<String>, line: u32) -> Self {
        Instruction { op: OpCode::Nop, result: None, arg1: None, arg2: None, line, comment: Some(text.into()) }
    }

    pub fn is_jump(&self) -> bool {
        matches!(self.op, OpCode::Goto | OpCode::IfFalse | OpCode::IfTrue)
    }

    pub fn is_label(&self) -> bool {
        self.op == OpCode::Label
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

impl fmt::Display for Instruction {
    /// Renders one instruction per §6's IR textual form. A bare `Nop`
    /// carrying only a comment (§4.10 "Comments", §9 "Comment
    /// instructions") prints as a stand-alone `// comment` line;
    /// every other instruction appends `  // comment` when one is
    /// attached.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.op {
            OpCode::Label => format!("{}:", self.arg1.as_ref().expect("label instruction always carries its name")),
            OpCode::Goto => format!("goto {}", self.arg1.as_ref().expect("goto instruction always carries its target")),
            OpCode::Return => match &self.arg1 {
                Some(v) => format!("return {v}"),
                None => "return".to_string(),
            },
            OpCode::IfTrue => format!(
                "if {} goto {}",
                self.arg1.as_ref().expect("if-true carries its condition"),
                self.arg2.as_ref().expect("if-true carries its target label"),
            ),
            OpCode::IfFalse => format!(
                "ifFalse {} goto {}",
                self.arg1.as_ref().expect("if-false carries its condition"),
                self.arg2.as_ref().expect("if-false carries its target label"),
            ),
            OpCode::Call => match &self.result {
                Some(r) => format!("call {r} = {}", self.arg1.as_ref().expect("call carries its callee")),
                None => format!("call {}", self.arg1.as_ref().expect("call carries its callee")),
            },
            OpCode::Param => format!("param {}", self.arg1.as_ref().expect("param carries its argument")),
            OpCode::Nop => String::new(),
            OpCode::ArrayRef => format!(
                "{} = {}[{}]",
                self.result.as_ref().expect("array-ref carries its destination"),
                self.arg1.as_ref().expect("array-ref carries its base"),
                self.arg2.as_ref().expect("array-ref carries its index"),
            ),
            OpCode::ArraySet => format!(
                "{}[{}] = {}",
                self.result.as_ref().expect("array-set carries its base"),
                self.arg1.as_ref().expect("array-set carries its index"),
                self.arg2.as_ref().expect("array-set carries its value"),
            ),
            OpCode::Cast => format!(
                "{} = ({})",
                self.result.as_ref().expect("cast carries its destination"),
                self.arg1.as_ref().expect("cast carries its source"),
            ),
            OpCode::Assign => format!(
                "{} = {}",
                self.result.as_ref().expect("assign carries its destination"),
                self.arg1.as_ref().expect("assign carries its source"),
            ),
            op if op.is_unary() => format!(
                "{} = {}{}",
                self.result.as_ref().expect("unary op carries its destination"),
                op.symbol(),
                self.arg1.as_ref().expect("unary op carries its operand"),
            ),
            op => format!(
                "{} = {} {} {}",
                self.result.as_ref().expect("binary op carries its destination"),
                self.arg1.as_ref().expect("binary op carries its left operand"),
                op.symbol(),
                self.arg2.as_ref().expect("binary op carries its right operand"),
            ),
        };

        match (&self.comment, body.is_empty()) {
            (Some(c), true) => write!(f, "// {c}"),
            (Some(c), false) => write!(f, "{body}  // {c}"),
            (None, _) => write!(f, "{body}"),
        }
    }
}

/// Ports `TempManager`'s two counters.
#[derive(Debug, Default)]
pub struct TempAllocator {
    temp_count: u32,
    label_count: u32,
}

impl TempAllocator {
    pub fn new() -> Self {
        TempAllocator::default()
    }

    pub fn new_temp(&mut self) -> Symbol {
        let sym = Symbol::intern(&format!("t{}", self.temp_count));
        self.temp_count += 1;
        sym
    }

    pub fn new_label(&mut self) -> Symbol {
        let sym = Symbol::intern(&format!("L{}", self.label_count));
        self.label_count += 1;
        sym
    }

    pub fn temp_count(&self) -> u32 {
        self.temp_count
    }

    pub fn label_count(&self) -> u32 {
        self.label_count
    }
}

/// Statistics ported from `IntermediateCode::Statistics`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Statistics {
    pub instruction_count: usize,
    pub basic_block_count: usize,
    pub temporary_count: u32,
    pub label_count: u32,
}

/// Ports `IntermediateCode`: the flat instruction stream plus the
/// counters that mint fresh temporary/label names into it.
#[derive(Debug, Default)]
pub struct IrProgram {
    pub instructions: Vec<Instruction>,
    allocator: TempAllocator,
}

impl IrProgram {
    pub fn new() -> Self {
        IrProgram::default()
    }

    pub fn push(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn new_temp(&mut self) -> Symbol {
        self.allocator.new_temp()
    }

    pub fn new_label(&mut self) -> Symbol {
        self.allocator.new_label()
    }

    pub fn clear(&mut self) {
        self.instructions.clear();
        self.allocator = TempAllocator::new();
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            instruction_count: self.instructions.len(),
            basic_block_count: crate::blocks::build_basic_blocks(&self.instructions).len(),
            temporary_count: self.allocator.temp_count(),
            label_count: self.allocator.label_count(),
        }
    }
}
