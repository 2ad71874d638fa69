//! Table-driven shift/reduce parser loop (§4.6 "Driver").
//!
//! Grounded on `original_source/src/parser/parser.cpp`'s `Parser::parse`
//! main loop, re-expressed over the `ParseTable`/`GrammarDef` built in
//! [`crate::table`] and [`crate::build`]. Maintains three parallel
//! stacks — states, semantic values, and spans — and keeps the span
//! stack exactly as tall as the value stack at every point so a reduce
//! can always find its popped children's spans.

use std::time::Instant;

use tinyc_lex::{Lexer, Token, TokenKind};
use tinyc_util::{Category, Diagnostic, Span};

use crate::ast::Program;
use crate::build::{define_grammar, GrammarDef, Value};
use crate::grammar::Grammar;
use crate::lalr::{LalrBuilder, LrAutomaton, StateId};
use crate::table::{build_table, Action, Conflict, ParseTable};

/// Everything a completed parse produced, mirroring §6's reporting
/// contract: an optional AST (present iff at least a partial parse
/// happened), every diagnostic raised along the way, and the counters
/// a caller needs to print a summary line without re-walking the tree.
#[derive(Debug)]
pub struct ParseResult {
    pub ast: Option<Program>,
    pub diagnostics: Vec<Diagnostic>,
    pub success: bool,
    pub num_tokens: usize,
    pub parse_time_ms: f64,
    pub ast_node_count: usize,
}

/// Owns the grammar, automaton, and parse table so they are built once
/// and reused across any number of `parse` calls.
pub struct Parser {
    grammar: Grammar,
    automaton: LrAutomaton,
    table: ParseTable,
    builders: Vec<crate::build::Builder>,
}

impl Parser {
    pub fn new() -> Self {
        let GrammarDef { mut grammar, builders } = define_grammar();
        grammar.compute_first();
        grammar.compute_follow();
        let automaton = LalrBuilder::new(&grammar).build();
        let table = build_table(&grammar, &automaton);
        Parser { grammar, automaton, table, builders }
    }

    /// Grammar conflicts discovered while building the table (§4.6
    /// "conflicts are reported, not silently resolved away"). An empty
    /// slice means the grammar is genuinely LALR(1).
    pub fn conflicts(&self) -> &[Conflict] {
        &self.table.conflicts
    }

    pub fn num_states(&self) -> usize {
        self.automaton.states.len()
    }

    /// Parses a complete token stream (as produced by [`Lexer::analyze`],
    /// `Eof`-terminated) into a [`ParseResult`].
    pub fn parse(&self, tokens: &[Token]) -> ParseResult {
        let start_time = Instant::now();
        let num_tokens = tokens.len();

        let mut state_stack: Vec<StateId> = vec![StateId(0)];
        let mut value_stack: Vec<Value> = Vec::new();
        let mut span_stack: Vec<Span> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let mut pos = 0usize;
        let mut success = false;

        loop {
            let token = &tokens[pos];
            let state = *state_stack.last().expect("state stack is never empty");

            let symbol = match self.grammar.terminal_for_token(token.kind) {
                Some(s) => s,
                None => {
                    diagnostics.push(unexpected_token_diagnostic(token));
                    if token.kind == TokenKind::Eof {
                        break;
                    }
                    pos += 1;
                    continue;
                }
            };

            match self.table.action(state, symbol) {
                Some(Action::Shift(target)) => {
                    value_stack.push(Value::Token(token.clone()));
                    span_stack.push(token.span);
                    state_stack.push(target);
                    pos += 1;
                }
                Some(Action::Reduce(prod_id)) => {
                    let prod = self.grammar.production(prod_id);
                    let arity = prod.rhs.len();
                    let base = value_stack.len() - arity;

                    let merged_span = span_stack[base..]
                        .iter()
                        .copied()
                        .reduce(Span::merge)
                        .unwrap_or(token.span);

                    let mut children = value_stack.split_off(base);
                    span_stack.truncate(base);

                    let builder = self.builders[prod_id.0 as usize];
                    let value = builder(&mut children, merged_span);
                    value_stack.push(value);
                    span_stack.push(merged_span);

                    for _ in 0..arity {
                        state_stack.pop();
                    }
                    let top = *state_stack.last().expect("state stack is never empty");
                    let goto_state = self
                        .table
                        .goto(top, prod.lhs)
                        .expect("a valid reduce always has a goto on its own LHS");
                    state_stack.push(goto_state);
                }
                Some(Action::Accept) => {
                    success = true;
                    break;
                }
                None => {
                    diagnostics.push(unexpected_token_diagnostic(token));
                    if token.kind == TokenKind::Eof {
                        break;
                    }
                    pos += 1;
                }
            }
        }

        let ast = if success {
            match value_stack.pop() {
                Some(Value::Program(p)) => Some(p),
                _ => None,
            }
        } else {
            None
        };

        let ast_node_count = ast.as_ref().map(count_program_nodes).unwrap_or(0);
        let parse_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        ParseResult {
            ast,
            diagnostics,
            success: success,
            num_tokens,
            parse_time_ms,
            ast_node_count,
        }
    }

    /// Lexes `source` and parses the resulting token stream in one
    /// step, for callers that do not need the intermediate
    /// [`tinyc_lex::LexicalResult`].
    pub fn parse_source(&self, source: &str) -> ParseResult {
        let lex = Lexer::new(source).analyze();
        self.parse(&lex.tokens)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected_token_diagnostic(token: &Token) -> Diagnostic {
    let message = if token.kind == TokenKind::Eof {
        "unexpected end of input".to_string()
    } else {
        format!("unexpected token '{}'", token.lexeme.as_str())
    };
    Diagnostic::error(Category::Syntax, message, token.span)
}

fn count_program_nodes(program: &Program) -> usize {
    1 + program.decls.iter().map(count_decl_nodes).sum::<usize>()
}

fn count_decl_nodes(decl: &crate::ast::Decl) -> usize {
    use crate::ast::Decl;
    match decl {
        Decl::Variable(v) => 1 + v.init.as_ref().map(count_expr_nodes).unwrap_or(0),
        Decl::Function(f) => {
            1 + f.params.len() + f.body.iter().map(count_stmt_nodes).sum::<usize>()
        }
    }
}

fn count_stmt_nodes(stmt: &crate::ast::Stmt) -> usize {
    use crate::ast::Stmt;
    1 + match stmt {
        Stmt::Assign { target, value, .. } => count_expr_nodes(target) + count_expr_nodes(value),
        Stmt::If { cond, then_branch, else_branch, .. } => {
            count_expr_nodes(cond)
                + count_stmt_nodes(then_branch)
                + else_branch.as_ref().map(|s| count_stmt_nodes(s)).unwrap_or(0)
        }
        Stmt::While { cond, body, .. } => count_expr_nodes(cond) + count_stmt_nodes(body),
        Stmt::DoWhile { body, cond, .. } => count_stmt_nodes(body) + count_expr_nodes(cond),
        Stmt::For { init, cond, update, body, .. } => {
            init.as_ref().map(|s| count_stmt_nodes(s)).unwrap_or(0)
                + cond.as_ref().map(count_expr_nodes).unwrap_or(0)
                + update.as_ref().map(|s| count_stmt_nodes(s)).unwrap_or(0)
                + count_stmt_nodes(body)
        }
        Stmt::Block { stmts, .. } => stmts.iter().map(count_stmt_nodes).sum(),
        Stmt::Return { value, .. } => value.as_ref().map(count_expr_nodes).unwrap_or(0),
        Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Goto { .. } => 0,
        Stmt::Label { stmt, .. } => stmt.as_ref().map(|s| count_stmt_nodes(s)).unwrap_or(0),
        Stmt::Switch { selector, cases, default, .. } => {
            count_expr_nodes(selector)
                + cases
                    .iter()
                    .map(|c| 1 + count_expr_nodes(&c.value) + c.body.iter().map(count_stmt_nodes).sum::<usize>())
                    .sum::<usize>()
                + default
                    .as_ref()
                    .map(|b| b.iter().map(count_stmt_nodes).sum())
                    .unwrap_or(0)
        }
        Stmt::ExprStmt { expr, .. } => count_expr_nodes(expr),
        Stmt::VarDecl(v) => v.init.as_ref().map(count_expr_nodes).unwrap_or(0),
    }
}

fn count_expr_nodes(expr: &crate::ast::Expr) -> usize {
    use crate::ast::Expr;
    1 + match expr {
        Expr::Binary { left, right, .. } => count_expr_nodes(left) + count_expr_nodes(right),
        Expr::Unary { operand, .. } => count_expr_nodes(operand),
        Expr::Identifier { .. } | Expr::Literal { .. } => 0,
        Expr::Call { args, .. } => args.iter().map(count_expr_nodes).sum(),
        Expr::Index { base, index, .. } => count_expr_nodes(base) + count_expr_nodes(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_variable_declaration() {
        let parser = Parser::new();
        let result = parser.parse_source("int x = 1;");
        assert!(result.success, "diagnostics: {:?}", result.diagnostics);
        let ast = result.ast.expect("successful parse has an ast");
        assert_eq!(ast.decls.len(), 1);
    }

    #[test]
    fn parses_a_function_with_control_flow() {
        let parser = Parser::new();
        let src = r#"
            int fib(int n) {
                if (n < 2) {
                    return n;
                }
                return fib(n - 1) + fib(n - 2);
            }
        "#;
        let result = parser.parse_source(src);
        assert!(result.success, "diagnostics: {:?}", result.diagnostics);
        assert_eq!(result.ast.unwrap().decls.len(), 1);
    }

    #[test]
    fn reports_a_diagnostic_and_fails_on_malformed_input() {
        let parser = Parser::new();
        let result = parser.parse_source("int x = ;");
        assert!(!result.success);
        assert!(!result.diagnostics.is_empty());
    }

    #[test]
    fn dangling_else_attaches_to_the_nearest_if() {
        let parser = Parser::new();
        let src = r#"
            int f(int a, int b) {
                if (a)
                    if (b)
                        return 1;
                    else
                        return 2;
                return 0;
            }
        "#;
        let result = parser.parse_source(src);
        assert!(result.success, "diagnostics: {:?}", result.diagnostics);
        assert!(parser.conflicts().is_empty() || parser.conflicts().iter().all(|c| matches!(c.kept, Action::Shift(_))));
    }
}
