//! Semantic analyzer: scope-checked, type-checked AST walk (§4.9).
//!
//! Grounded on `original_source/src/semantic/semantic_analyzer.h`'s
//! `SemanticAnalyzer`/`SemanticAnalyzerConfig`/`SemanticAnalysisResult`
//! trio. The analyzer owns a [`SymbolTable`] for the duration of one
//! `analyze` call and walks declarations, then statements, then
//! expressions, collecting errors and warnings as it goes rather than
//! aborting at the first one.

use std::time::Instant;

use tinyc_par::ast::{
    AssignOp, BinOp, Decl, Expr, FuncDecl, LiteralValue, Program, Stmt, SwitchCase, UnaryOp,
};
use tinyc_util::{Category, Diagnostic, FxHashSet, Level, Span, Symbol};

use crate::symbol_table::{SymbolInfo, SymbolKind, SymbolTable};
use crate::types::{
    are_types_compatible, binary_result_type, can_implicitly_convert, data_type_to_string,
    is_numeric, unary_result_type, DataType,
};

/// §4.9 "Error taxonomy". Carries the original's seventeen kinds
/// verbatim, plus `UnusedVariable`: the original's
/// `checkUnusedVariables()` is declared but its `SemanticErrorType`
/// enum has no dedicated member for it, so this crate adds one rather
/// than overloading an unrelated kind (documented in `DESIGN.md`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SemanticErrorKind {
    UndefinedVariable,
    UndefinedFunction,
    RedefinedVariable,
    RedefinedFunction,
    TypeMismatch,
    InvalidAssignment,
    InvalidOperation,
    FunctionCallError,
    ParameterCountMismatch,
    ParameterTypeMismatch,
    ReturnTypeMismatch,
    UninitializedVariable,
    UnreachableCode,
    MissingReturn,
    DivisionByZero,
    ArrayIndexError,
    ScopeError,
    UnusedVariable,
}

#[derive(Clone, Debug)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub message: String,
    pub span: Span,
}

impl SemanticError {
    fn new(kind: SemanticErrorKind, message: impl Into<String>, span: Span) -> Self {
        SemanticError { kind, message: message.into(), span }
    }

    /// Renders this error as a unified [`Diagnostic`] under
    /// `Category::Semantic` (§6), at the given severity — callers
    /// decide the level since `SemanticError` itself does not know
    /// whether it came from `analyzer.errors` or `analyzer.warnings`.
    pub fn to_diagnostic(&self, level: Level) -> Diagnostic {
        Diagnostic::new(level, Category::Semantic, self.message.clone(), self.span)
    }
}

/// Ports `ExpressionType`: every expression-analysis call returns one
/// of these instead of a bare `DataType`, so callers that need to
/// reject a non-lvalue assignment target or fold a constant expression
/// don't have to re-derive that information from the AST node itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpressionType {
    pub data_type: DataType,
    pub is_lvalue: bool,
    pub is_constant: bool,
}

impl ExpressionType {
    fn rvalue(data_type: DataType) -> Self {
        ExpressionType { data_type, is_lvalue: false, is_constant: false }
    }

    fn constant(data_type: DataType) -> Self {
        ExpressionType { data_type, is_lvalue: false, is_constant: true }
    }

    fn lvalue(data_type: DataType) -> Self {
        ExpressionType { data_type, is_lvalue: true, is_constant: false }
    }
}

/// Ports `SemanticAnalyzerConfig`'s seven toggles and
/// `SemanticAnalyzerFactory`'s three presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SemanticAnalyzerConfig {
    pub check_unused_variables: bool,
    pub check_uninitialized_vars: bool,
    pub check_type_conversion: bool,
    pub check_function_calls: bool,
    pub check_array_bounds: bool,
    pub warnings_as_errors: bool,
    pub strict_type_checking: bool,
}

impl SemanticAnalyzerConfig {
    /// The original's default-constructed config.
    pub fn standard() -> Self {
        SemanticAnalyzerConfig {
            check_unused_variables: true,
            check_uninitialized_vars: true,
            check_type_conversion: true,
            check_function_calls: true,
            check_array_bounds: false,
            warnings_as_errors: false,
            strict_type_checking: false,
        }
    }

    /// Every check on, warnings promoted to errors, implicit numeric
    /// widening narrowed to exact-type matches only.
    pub fn strict() -> Self {
        SemanticAnalyzerConfig {
            check_unused_variables: true,
            check_uninitialized_vars: true,
            check_type_conversion: true,
            check_function_calls: true,
            check_array_bounds: true,
            warnings_as_errors: true,
            strict_type_checking: true,
        }
    }

    /// Only the checks that catch a program that cannot possibly run
    /// (undefined names, call-arity mismatches) stay on.
    pub fn permissive() -> Self {
        SemanticAnalyzerConfig {
            check_unused_variables: false,
            check_uninitialized_vars: false,
            check_type_conversion: false,
            check_function_calls: true,
            check_array_bounds: false,
            warnings_as_errors: false,
            strict_type_checking: false,
        }
    }
}

impl Default for SemanticAnalyzerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Ports `SemanticAnalysisResult`.
#[derive(Debug)]
pub struct SemanticAnalysisResult {
    pub success: bool,
    pub errors: Vec<SemanticError>,
    pub warnings: Vec<SemanticError>,
    pub symbol_table: SymbolTable,
    pub total_symbols: usize,
    pub total_scopes: usize,
    pub analysis_time_ms: f64,
}

pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    config: SemanticAnalyzerConfig,
    errors: Vec<SemanticError>,
    warnings: Vec<SemanticError>,
    current_function_return_type: DataType,
    in_function: bool,
    has_return_statement: bool,
    loop_depth: u32,
    switch_depth: u32,
    labels_defined: FxHashSet<Symbol>,
    labels_referenced: Vec<(Symbol, Span)>,
}

impl SemanticAnalyzer {
    pub fn new(config: SemanticAnalyzerConfig) -> Self {
        SemanticAnalyzer {
            symbols: SymbolTable::new(),
            config,
            errors: Vec::new(),
            warnings: Vec::new(),
            current_function_return_type: DataType::Void,
            in_function: false,
            has_return_statement: false,
            loop_depth: 0,
            switch_depth: 0,
            labels_defined: FxHashSet::default(),
            labels_referenced: Vec::new(),
        }
    }

    fn error(&mut self, kind: SemanticErrorKind, message: impl Into<String>, span: Span) {
        self.errors.push(SemanticError::new(kind, message, span));
    }

    fn warn(&mut self, kind: SemanticErrorKind, message: impl Into<String>, span: Span) {
        if self.config.warnings_as_errors {
            self.errors.push(SemanticError::new(kind, message, span));
        } else {
            self.warnings.push(SemanticError::new(kind, message, span));
        }
    }

    /// Walks `program` to completion and consumes `self` into a
    /// [`SemanticAnalysisResult`], mirroring the original's one-shot
    /// "construct, then call `analyze` once" usage.
    pub fn analyze(mut self, program: &Program) -> SemanticAnalysisResult {
        let start = Instant::now();

        for decl in &program.decls {
            if let Decl::Function(f) = decl {
                self.register_function_signature(f);
            }
        }
        for decl in &program.decls {
            self.analyze_decl(decl);
        }

        if self.config.check_unused_variables {
            let unused: Vec<(Symbol, Span)> = self
                .symbols
                .unused_variables()
                .into_iter()
                .map(|s| (s.name, Span::point(s.line, s.column)))
                .collect();
            for (name, span) in unused {
                self.warn(
                    SemanticErrorKind::UnusedVariable,
                    format!("variable '{}' is never used", name.as_str()),
                    span,
                );
            }
        }

        let success = self.errors.is_empty();
        let total_symbols = self.symbols.symbol_count();
        let total_scopes = self.symbols.scope_count();
        let analysis_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        SemanticAnalysisResult {
            success,
            errors: self.errors,
            warnings: self.warnings,
            symbol_table: self.symbols,
            total_symbols,
            total_scopes,
            analysis_time_ms,
        }
    }

    fn register_function_signature(&mut self, f: &FuncDecl) {
        if self.symbols.is_locally_defined(f.name) {
            self.error(
                SemanticErrorKind::RedefinedFunction,
                format!("function '{}' is already defined", f.name.as_str()),
                f.span,
            );
            return;
        }
        let mut info = SymbolInfo::new(
            f.name,
            SymbolKind::Function,
            f.return_type,
            f.span.line,
            f.span.column,
            self.symbols.current_scope_level(),
        );
        info.initialized = true;
        info.used = true;
        info.return_type = f.return_type;
        info.param_types = f.params.iter().map(|p| p.ty).collect();
        self.symbols.add_symbol(info);
    }

    fn analyze_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Variable(v) => {
                let init_type = v.init.as_ref().map(|e| self.analyze_expr(e));
                self.declare_variable(v.name, v.declared_type, v.init.is_some(), v.span, init_type);
            }
            Decl::Function(f) => self.analyze_function(f),
        }
    }

    fn declare_variable(
        &mut self,
        name: Symbol,
        declared_type: DataType,
        has_init: bool,
        span: Span,
        init_type: Option<ExpressionType>,
    ) {
        if self.symbols.is_locally_defined(name) {
            self.error(
                SemanticErrorKind::RedefinedVariable,
                format!("variable '{}' is already defined in this scope", name.as_str()),
                span,
            );
            return;
        }
        if let Some(init) = init_type {
            if self.config.check_type_conversion {
                let ok = if self.config.strict_type_checking {
                    init.data_type == declared_type || init.data_type == DataType::Unknown
                } else {
                    can_implicitly_convert(init.data_type, declared_type)
                };
                if !ok {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!(
                            "cannot initialize '{}' of type {} with a value of type {}",
                            name.as_str(),
                            data_type_to_string(declared_type),
                            data_type_to_string(init.data_type)
                        ),
                        span,
                    );
                }
            }
        }
        let mut info = SymbolInfo::new(
            name,
            SymbolKind::Variable,
            declared_type,
            span.line,
            span.column,
            self.symbols.current_scope_level(),
        );
        info.initialized = has_init;
        self.symbols.add_symbol(info);
    }

    fn analyze_function(&mut self, f: &FuncDecl) {
        self.symbols.enter_scope();
        for param in &f.params {
            let mut info = SymbolInfo::new(
                param.name,
                SymbolKind::Parameter,
                param.ty,
                param.span.line,
                param.span.column,
                self.symbols.current_scope_level(),
            );
            info.initialized = true;
            if self.symbols.is_locally_defined(param.name) {
                self.error(
                    SemanticErrorKind::RedefinedVariable,
                    format!("parameter '{}' is already defined", param.name.as_str()),
                    param.span,
                );
            } else {
                self.symbols.add_symbol(info);
            }
        }

        let outer_return_type = self.current_function_return_type;
        let outer_in_function = self.in_function;
        let outer_has_return = self.has_return_statement;
        self.current_function_return_type = f.return_type;
        self.in_function = true;
        self.has_return_statement = false;
        self.labels_defined.clear();
        self.labels_referenced.clear();

        self.analyze_block_stmts(&f.body);

        if f.return_type != DataType::Void && !self.has_return_statement {
            self.error(
                SemanticErrorKind::MissingReturn,
                format!("function '{}' must return a value of type {}", f.name.as_str(), data_type_to_string(f.return_type)),
                f.span,
            );
        }
        for (label, span) in &self.labels_referenced {
            if !self.labels_defined.contains(label) {
                self.error(
                    SemanticErrorKind::ScopeError,
                    format!("goto target '{}' is not defined in this function", label.as_str()),
                    *span,
                );
            }
        }

        self.current_function_return_type = outer_return_type;
        self.in_function = outer_in_function;
        self.has_return_statement = outer_has_return;
        self.symbols.exit_scope();
    }

    fn analyze_block_stmts(&mut self, stmts: &[Stmt]) {
        let mut terminated_at: Option<Span> = None;
        for stmt in stmts {
            if let Some(_term_span) = terminated_at {
                if !matches!(stmt, Stmt::Label { .. }) {
                    self.warn(
                        SemanticErrorKind::UnreachableCode,
                        "unreachable code after a terminating statement",
                        stmt.span(),
                    );
                    terminated_at = None;
                }
            }
            self.analyze_stmt(stmt);
            if is_terminating(stmt) {
                terminated_at = Some(stmt.span());
            }
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(v) => {
                let init_type = v.init.as_ref().map(|e| self.analyze_expr(e));
                self.declare_variable(v.name, v.declared_type, v.init.is_some(), v.span, init_type);
            }
            Stmt::Assign { op, target, value, span } => self.analyze_assign(*op, target, value, *span),
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.check_condition(cond);
                self.analyze_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.analyze_stmt(else_branch);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.check_condition(cond);
                self.loop_depth += 1;
                self.analyze_stmt(body);
                self.loop_depth -= 1;
            }
            Stmt::DoWhile { body, cond, .. } => {
                self.loop_depth += 1;
                self.analyze_stmt(body);
                self.loop_depth -= 1;
                self.check_condition(cond);
            }
            Stmt::For { init, cond, update, body, .. } => {
                self.symbols.enter_scope();
                if let Some(init) = init {
                    self.analyze_stmt(init);
                }
                if let Some(cond) = cond {
                    self.check_condition(cond);
                }
                if let Some(update) = update {
                    self.analyze_stmt(update);
                }
                self.loop_depth += 1;
                self.analyze_stmt(body);
                self.loop_depth -= 1;
                self.symbols.exit_scope();
            }
            Stmt::Block { stmts, .. } => {
                self.symbols.enter_scope();
                self.analyze_block_stmts(stmts);
                self.symbols.exit_scope();
            }
            Stmt::Return { value, span } => {
                self.has_return_statement = self.has_return_statement || value.is_some();
                if !self.in_function {
                    self.error(SemanticErrorKind::ScopeError, "return statement outside of any function", *span);
                    return;
                }
                match (value, self.current_function_return_type) {
                    (None, DataType::Void) => {}
                    (None, expected) => {
                        self.error(
                            SemanticErrorKind::ReturnTypeMismatch,
                            format!("missing return value of type {}", data_type_to_string(expected)),
                            *span,
                        );
                    }
                    (Some(expr), DataType::Void) => {
                        self.analyze_expr(expr);
                        self.error(SemanticErrorKind::ReturnTypeMismatch, "void function must not return a value", *span);
                    }
                    (Some(expr), expected) => {
                        let actual = self.analyze_expr(expr);
                        if self.config.check_type_conversion && !can_implicitly_convert(actual.data_type, expected) {
                            self.error(
                                SemanticErrorKind::ReturnTypeMismatch,
                                format!(
                                    "returned value of type {} is not compatible with declared return type {}",
                                    data_type_to_string(actual.data_type),
                                    data_type_to_string(expected)
                                ),
                                *span,
                            );
                        }
                    }
                }
            }
            Stmt::Break { span } => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    self.error(SemanticErrorKind::ScopeError, "'break' outside of a loop or switch", *span);
                }
            }
            Stmt::Continue { span } => {
                if self.loop_depth == 0 {
                    self.error(SemanticErrorKind::ScopeError, "'continue' outside of a loop", *span);
                }
            }
            Stmt::Goto { label, span } => {
                self.labels_referenced.push((*label, *span));
            }
            Stmt::Label { name, stmt, .. } => {
                self.labels_defined.insert(*name);
                if let Some(inner) = stmt {
                    self.analyze_stmt(inner);
                }
            }
            Stmt::Switch { selector, cases, default, .. } => self.analyze_switch(selector, cases, default),
            Stmt::ExprStmt { expr, .. } => {
                self.analyze_expr(expr);
            }
        }
    }

    fn analyze_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr, span: Span) {
        let target_name = match target {
            Expr::Identifier { name, .. } => Some(*name),
            _ => None,
        };
        let target_type = self.analyze_expr(target);
        if !target_type.is_lvalue {
            self.error(SemanticErrorKind::InvalidAssignment, "left-hand side of an assignment is not assignable", span);
        }
        let value_type = self.analyze_expr(value);

        let effective_value_type = match op {
            AssignOp::Assign => value_type.data_type,
            _ => binary_result_type(target_type.data_type, value_type.data_type),
        };

        if self.config.check_type_conversion
            && target_type.data_type != DataType::Unknown
            && !can_implicitly_convert(effective_value_type, target_type.data_type)
        {
            self.error(
                SemanticErrorKind::TypeMismatch,
                format!(
                    "cannot assign a value of type {} to a target of type {}",
                    data_type_to_string(effective_value_type),
                    data_type_to_string(target_type.data_type)
                ),
                span,
            );
        }

        if let Some(name) = target_name {
            self.symbols.mark_initialized(name);
        }
    }

    fn check_condition(&mut self, cond: &Expr) {
        let ty = self.analyze_expr(cond);
        if ty.data_type != DataType::Unknown && !is_numeric(ty.data_type) && ty.data_type != DataType::Bool {
            self.error(
                SemanticErrorKind::TypeMismatch,
                format!("condition must be boolean or numeric, found {}", data_type_to_string(ty.data_type)),
                cond.span(),
            );
        }
    }

    fn analyze_switch(&mut self, selector: &Expr, cases: &[SwitchCase], default: &Option<Vec<Stmt>>) {
        let sel_type = self.analyze_expr(selector);
        if sel_type.data_type != DataType::Unknown && !is_numeric(sel_type.data_type) {
            self.error(
                SemanticErrorKind::TypeMismatch,
                format!("switch selector must be numeric, found {}", data_type_to_string(sel_type.data_type)),
                selector.span(),
            );
        }
        self.switch_depth += 1;
        for case in cases {
            let case_type = self.analyze_expr(&case.value);
            if !case_type.is_constant {
                self.warn(SemanticErrorKind::InvalidOperation, "case value is not a compile-time constant", case.value.span());
            }
            self.analyze_block_stmts(&case.body);
        }
        if let Some(default) = default {
            self.analyze_block_stmts(default);
        }
        self.switch_depth -= 1;
    }

    fn analyze_expr(&mut self, expr: &Expr) -> ExpressionType {
        match expr {
            Expr::Literal { value, .. } => ExpressionType::constant(literal_data_type(value)),
            Expr::Identifier { name, span } => {
                if self.symbols.is_defined(*name) {
                    if self.config.check_uninitialized_vars {
                        let uninitialized = self
                            .symbols
                            .find_symbol(*name)
                            .map(|s| s.kind == SymbolKind::Variable && !s.initialized)
                            .unwrap_or(false);
                        if uninitialized {
                            self.warn(
                                SemanticErrorKind::UninitializedVariable,
                                format!("variable '{}' is used before being initialized", name.as_str()),
                                *span,
                            );
                        }
                    }
                    self.symbols.mark_used(*name);
                    let ty = self.symbols.find_symbol(*name).map(|s| s.data_type).unwrap_or(DataType::Unknown);
                    ExpressionType::lvalue(ty)
                } else {
                    self.error(SemanticErrorKind::UndefinedVariable, format!("undefined variable '{}'", name.as_str()), *span);
                    ExpressionType::lvalue(DataType::Unknown)
                }
            }
            Expr::Unary { op, operand, span } => {
                let ot = self.analyze_expr(operand);
                let ty = unary_result_type(ot.data_type, matches!(op, UnaryOp::Not));
                if *op != UnaryOp::Not && ot.data_type != DataType::Unknown && !is_numeric(ot.data_type) {
                    self.error(
                        SemanticErrorKind::InvalidOperation,
                        format!("unary operator cannot be applied to {}", data_type_to_string(ot.data_type)),
                        *span,
                    );
                }
                ExpressionType::rvalue(ty)
            }
            Expr::Binary { op, left, right, span } => self.analyze_binary(*op, left, right, *span),
            Expr::Call { callee, args, span } => self.analyze_call(*callee, args, *span),
            Expr::Index { base, index, span } => {
                let base_ty = self.analyze_expr(base);
                let index_ty = self.analyze_expr(index);
                if self.config.check_array_bounds
                    && index_ty.data_type != DataType::Unknown
                    && !is_numeric(index_ty.data_type)
                {
                    self.error(SemanticErrorKind::ArrayIndexError, "array index must be numeric", *span);
                }
                if base_ty.data_type != DataType::Unknown
                    && base_ty.data_type != DataType::Array
                    && base_ty.data_type != DataType::Pointer
                {
                    self.error(
                        SemanticErrorKind::ArrayIndexError,
                        format!("cannot index into a value of type {}", data_type_to_string(base_ty.data_type)),
                        *span,
                    );
                }
                ExpressionType::lvalue(DataType::Unknown)
            }
        }
    }

    fn analyze_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> ExpressionType {
        let lt = self.analyze_expr(left);
        let rt = self.analyze_expr(right);

        if matches!(op, BinOp::Div | BinOp::Mod) && is_zero_literal(right) {
            self.error(SemanticErrorKind::DivisionByZero, "division by a constant zero", span);
        }

        match op {
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                if lt.data_type != DataType::Unknown
                    && rt.data_type != DataType::Unknown
                    && !are_types_compatible(lt.data_type, rt.data_type)
                {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!(
                            "cannot compare {} with {}",
                            data_type_to_string(lt.data_type),
                            data_type_to_string(rt.data_type)
                        ),
                        span,
                    );
                }
                ExpressionType { data_type: DataType::Bool, is_lvalue: false, is_constant: lt.is_constant && rt.is_constant }
            }
            BinOp::And | BinOp::Or => {
                ExpressionType { data_type: DataType::Bool, is_lvalue: false, is_constant: lt.is_constant && rt.is_constant }
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let result = binary_result_type(lt.data_type, rt.data_type);
                if result == DataType::Unknown && lt.data_type != DataType::Unknown && rt.data_type != DataType::Unknown {
                    self.error(
                        SemanticErrorKind::InvalidOperation,
                        format!(
                            "arithmetic operator is not defined for {} and {}",
                            data_type_to_string(lt.data_type),
                            data_type_to_string(rt.data_type)
                        ),
                        span,
                    );
                }
                ExpressionType { data_type: result, is_lvalue: false, is_constant: lt.is_constant && rt.is_constant }
            }
        }
    }

    fn analyze_call(&mut self, callee: Symbol, args: &[Expr], span: Span) -> ExpressionType {
        let arg_types: Vec<ExpressionType> = args.iter().map(|a| self.analyze_expr(a)).collect();

        let Some(info) = self.symbols.find_symbol(callee) else {
            self.error(SemanticErrorKind::UndefinedFunction, format!("undefined function '{}'", callee.as_str()), span);
            return ExpressionType::rvalue(DataType::Unknown);
        };
        if info.kind != SymbolKind::Function {
            self.error(SemanticErrorKind::FunctionCallError, format!("'{}' is not callable", callee.as_str()), span);
            return ExpressionType::rvalue(DataType::Unknown);
        }
        let return_type = info.return_type;
        let param_types = info.param_types.clone();
        self.symbols.mark_used(callee);

        if self.config.check_function_calls {
            if param_types.len() != arg_types.len() {
                self.error(
                    SemanticErrorKind::ParameterCountMismatch,
                    format!(
                        "function '{}' expects {} argument(s), found {}",
                        callee.as_str(),
                        param_types.len(),
                        arg_types.len()
                    ),
                    span,
                );
            } else {
                for (index, (expected, actual)) in param_types.iter().zip(arg_types.iter()).enumerate() {
                    if actual.data_type != DataType::Unknown && !can_implicitly_convert(actual.data_type, *expected) {
                        self.error(
                            SemanticErrorKind::ParameterTypeMismatch,
                            format!(
                                "argument {} to '{}' expects {}, found {}",
                                index + 1,
                                callee.as_str(),
                                data_type_to_string(*expected),
                                data_type_to_string(actual.data_type)
                            ),
                            span,
                        );
                    }
                }
            }
        }

        ExpressionType::rvalue(return_type)
    }
}

fn literal_data_type(value: &LiteralValue) -> DataType {
    match value {
        LiteralValue::Int(_) => DataType::Int,
        LiteralValue::Real(_) => DataType::Float,
        LiteralValue::Str(_) => DataType::Str,
        LiteralValue::Bool(_) => DataType::Bool,
    }
}

fn is_zero_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Literal { value: LiteralValue::Int(0), .. } => true,
        Expr::Literal { value: LiteralValue::Real(r), .. } => *r == 0.0,
        _ => false,
    }
}

fn is_terminating(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Return { .. } | Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Goto { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyc_par::parse;

    fn analyze_source(source: &str, config: SemanticAnalyzerConfig) -> SemanticAnalysisResult {
        let parsed = parse(source);
        assert!(parsed.success, "parse failed: {:?}", parsed.diagnostics);
        SemanticAnalyzer::new(config).analyze(&parsed.ast.unwrap())
    }

    #[test]
    fn well_formed_program_has_no_errors() {
        let result = analyze_source(
            "int add(int a, int b) { return a + b; }",
            SemanticAnalyzerConfig::standard(),
        );
        assert!(result.success, "errors: {:?}", result.errors);
    }

    #[test]
    fn undefined_variable_is_reported() {
        let result = analyze_source("int main() { return y; }", SemanticAnalyzerConfig::standard());
        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.kind == SemanticErrorKind::UndefinedVariable));
    }

    #[test]
    fn redefining_a_variable_in_the_same_scope_is_an_error() {
        let result = analyze_source(
            "int main() { int x = 1; int x = 2; return x; }",
            SemanticAnalyzerConfig::standard(),
        );
        assert!(result.errors.iter().any(|e| e.kind == SemanticErrorKind::RedefinedVariable));
    }

    #[test]
    fn shadowing_in_a_nested_scope_is_allowed() {
        let result = analyze_source(
            "int main() { int x = 1; { int x = 2; } return x; }",
            SemanticAnalyzerConfig::standard(),
        );
        assert!(result.success, "errors: {:?}", result.errors);
    }

    #[test]
    fn missing_return_on_a_non_void_function_is_an_error() {
        let result = analyze_source("int main() { int x = 1; }", SemanticAnalyzerConfig::standard());
        assert!(result.errors.iter().any(|e| e.kind == SemanticErrorKind::MissingReturn));
    }

    #[test]
    fn division_by_a_literal_zero_is_flagged() {
        let result = analyze_source("int main() { return 1 / 0; }", SemanticAnalyzerConfig::standard());
        assert!(result.errors.iter().any(|e| e.kind == SemanticErrorKind::DivisionByZero));
    }

    #[test]
    fn wrong_argument_count_is_a_parameter_count_mismatch() {
        let result = analyze_source(
            "int add(int a, int b) { return a + b; } int main() { return add(1); }",
            SemanticAnalyzerConfig::standard(),
        );
        assert!(result.errors.iter().any(|e| e.kind == SemanticErrorKind::ParameterCountMismatch));
    }

    #[test]
    fn forward_reference_to_a_later_function_is_allowed() {
        let result = analyze_source(
            "int main() { return helper(); } int helper() { return 1; }",
            SemanticAnalyzerConfig::standard(),
        );
        assert!(result.success, "errors: {:?}", result.errors);
    }

    #[test]
    fn break_outside_a_loop_is_a_scope_error() {
        let result = analyze_source("int main() { break; return 0; }", SemanticAnalyzerConfig::standard());
        assert!(result.errors.iter().any(|e| e.kind == SemanticErrorKind::ScopeError));
    }

    #[test]
    fn permissive_config_does_not_warn_about_unused_locals() {
        let result = analyze_source(
            "int main() { int unused = 1; return 0; }",
            SemanticAnalyzerConfig::permissive(),
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn standard_config_warns_about_an_unused_local() {
        let result = analyze_source(
            "int main() { int unused = 1; return 0; }",
            SemanticAnalyzerConfig::standard(),
        );
        assert!(result.warnings.iter().any(|w| w.kind == SemanticErrorKind::UnusedVariable));
    }
}
