//! AST builders for productions (§4.7) and the grammar definition that
//! pairs each production with one.
//!
//! `Value` is the semantic-value stack's element type (§4.6 "a
//! semantic-value stack... one per grammar symbol ever shifted or
//! reduced"): every shifted terminal is pushed as a raw token sentinel,
//! and it is the production that eventually consumes it — `primary ->
//! IDENT`, `primary -> INT`, and so on — that builds the corresponding
//! leaf node, recovering whichever concrete token (and, for compound
//! assignment, whichever operator — §9's resolved Open Question)
//! actually matched. Builders themselves do no type checking or symbol
//! lookup (§4.7).
//!
//! A builder's `Span` argument is always the merged span of every
//! symbol the reduce just popped (the driver tracks a span stack in
//! lockstep with the value stack and folds it with `Span::merge`
//! before calling in), so a builder that wants "the full extent of
//! what I just matched" simply uses it as-is.

use tinyc_lex::Token;
use tinyc_util::Span;

use crate::ast::*;
use crate::grammar::{Grammar, ProdId, SymbolId};

#[derive(Clone, Debug)]
pub enum Value {
    /// Sentinel for a shifted terminal that builds no node of its own
    /// (operators, punctuators, keywords other than `true`/`false`).
    Token(Token),
    Expr(Expr),
    Stmt(Stmt),
    OptStmt(Option<Box<Stmt>>),
    StmtList(Vec<Stmt>),
    Decl(Decl),
    DeclList(Vec<Decl>),
    Param(Param),
    ParamList(Vec<Param>),
    ArgList(Vec<Expr>),
    Case(SwitchCase),
    CaseList(Vec<SwitchCase>),
    DefaultBody(Option<Vec<Stmt>>),
    Type(DataType),
    AssignOp(AssignOp),
    Program(Program),
    /// Produced only by a `ε`-right-hand-side production.
    Empty,
}

pub type Builder = fn(&mut Vec<Value>, Span) -> Value;

/// Pops `n` values off the tail of `children` in right-to-left order,
/// then returns them in left-to-right (production) order. Every
/// builder below starts by calling this with its production's arity.
fn pop_n(children: &mut Vec<Value>, n: usize) -> Vec<Value> {
    let start = children.len() - n;
    children.split_off(start)
}

/// Registers a grammar together with the builder that fires on each
/// production's reduce, keeping the two perfectly in step: `prod`
/// pushes the builder at the exact index `add_production` assigns the
/// new `ProdId`, so `builders[prod_id]` is always the right function.
pub struct GrammarDef {
    pub grammar: Grammar,
    pub builders: Vec<Builder>,
}

impl GrammarDef {
    fn prod(&mut self, lhs: SymbolId, rhs: Vec<SymbolId>, builder: Builder) -> ProdId {
        let id = self.grammar.add_production(lhs, rhs);
        assert_eq!(id.0 as usize, self.builders.len());
        self.builders.push(builder);
        id
    }
}

fn take_expr(v: Value) -> Expr {
    match v {
        Value::Expr(e) => e,
        _ => panic!("builder expected Expr on the semantic stack"),
    }
}

fn take_stmt(v: Value) -> Stmt {
    match v {
        Value::Stmt(s) => s,
        _ => panic!("builder expected Stmt on the semantic stack"),
    }
}

fn take_token(v: Value) -> Token {
    match v {
        Value::Token(t) => t,
        _ => panic!("builder expected a token sentinel on the semantic stack"),
    }
}

/// Builds the full grammar of §1's accepted language, pairing every
/// production with its builder in one place so the two can never
/// drift apart.
pub fn define_grammar() -> GrammarDef {
    use tinyc_lex::TokenKind as Tk;

    let mut def = GrammarDef {
        grammar: Grammar::new(),
        builders: Vec::new(),
    };
    let g = &mut def.grammar;

    macro_rules! term {
        ($name:expr, $tk:expr) => {
            g.terminal($name, Some($tk))
        };
    }

    let ident = term!("IDENT", Tk::Identifier);
    let int_lit = term!("INT", Tk::Int);
    let real_lit = term!("REAL", Tk::Real);
    let str_lit = term!("STR", Tk::Str);
    let kw_if = term!("KW_IF", Tk::KwIf);
    let kw_else = term!("KW_ELSE", Tk::KwElse);
    let kw_while = term!("KW_WHILE", Tk::KwWhile);
    let kw_for = term!("KW_FOR", Tk::KwFor);
    let kw_do = term!("KW_DO", Tk::KwDo);
    let kw_break = term!("KW_BREAK", Tk::KwBreak);
    let kw_continue = term!("KW_CONTINUE", Tk::KwContinue);
    let kw_return = term!("KW_RETURN", Tk::KwReturn);
    let kw_int = term!("KW_INT", Tk::KwInt);
    let kw_float = term!("KW_FLOAT", Tk::KwFloat);
    let kw_bool = term!("KW_BOOL", Tk::KwBool);
    let kw_true = term!("KW_TRUE", Tk::KwTrue);
    let kw_false = term!("KW_FALSE", Tk::KwFalse);
    let kw_switch = term!("KW_SWITCH", Tk::KwSwitch);
    let kw_case = term!("KW_CASE", Tk::KwCase);
    let kw_default = term!("KW_DEFAULT", Tk::KwDefault);
    let kw_goto = term!("KW_GOTO", Tk::KwGoto);
    let plus = term!("PLUS", Tk::Plus);
    let minus = term!("MINUS", Tk::Minus);
    let star = term!("STAR", Tk::Star);
    let slash = term!("SLASH", Tk::Slash);
    let percent = term!("PERCENT", Tk::Percent);
    let assign = term!("ASSIGN", Tk::Assign);
    let plus_assign = term!("PLUS_ASSIGN", Tk::PlusAssign);
    let minus_assign = term!("MINUS_ASSIGN", Tk::MinusAssign);
    let star_assign = term!("STAR_ASSIGN", Tk::StarAssign);
    let slash_assign = term!("SLASH_ASSIGN", Tk::SlashAssign);
    let percent_assign = term!("PERCENT_ASSIGN", Tk::PercentAssign);
    let eqeq = term!("EQ", Tk::Eq);
    let neq = term!("NEQ", Tk::NotEq);
    let lt = term!("LT", Tk::Lt);
    let le = term!("LE", Tk::LtEq);
    let gt = term!("GT", Tk::Gt);
    let ge = term!("GE", Tk::GtEq);
    let andand = term!("ANDAND", Tk::AndAnd);
    let oror = term!("OROR", Tk::OrOr);
    let not = term!("NOT", Tk::Not);
    let semi = term!("SEMI", Tk::Semi);
    let comma = term!("COMMA", Tk::Comma);
    let lparen = term!("LPAREN", Tk::LParen);
    let rparen = term!("RPAREN", Tk::RParen);
    let lbrace = term!("LBRACE", Tk::LBrace);
    let rbrace = term!("RBRACE", Tk::RBrace);
    let lbracket = term!("LBRACKET", Tk::LBracket);
    let rbracket = term!("RBRACKET", Tk::RBracket);
    let colon = term!("COLON", Tk::Colon);

    let program = g.non_terminal("Program");
    let decl_list = g.non_terminal("DeclList");
    let decl = g.non_terminal("Decl");
    let var_decl = g.non_terminal("VarDecl");
    let var_decl_no_semi = g.non_terminal("VarDeclNoSemi");
    let func_decl = g.non_terminal("FuncDecl");
    let param_list_opt = g.non_terminal("ParamListOpt");
    let param_list = g.non_terminal("ParamList");
    let param = g.non_terminal("Param");
    let ty = g.non_terminal("Type");
    let block = g.non_terminal("Block");
    let stmt_list = g.non_terminal("StmtList");
    let stmt = g.non_terminal("Stmt");
    let if_stmt = g.non_terminal("IfStmt");
    let while_stmt = g.non_terminal("WhileStmt");
    let do_while_stmt = g.non_terminal("DoWhileStmt");
    let for_stmt = g.non_terminal("ForStmt");
    let for_init = g.non_terminal("ForInit");
    let for_cond_opt = g.non_terminal("ForCondOpt");
    let for_update_opt = g.non_terminal("ForUpdateOpt");
    let assign_no_semi = g.non_terminal("AssignNoSemi");
    let assign_op = g.non_terminal("AssignOp");
    let switch_stmt = g.non_terminal("SwitchStmt");
    let case_list = g.non_terminal("CaseList");
    let case = g.non_terminal("Case");
    let default_opt = g.non_terminal("DefaultOpt");
    let expr = g.non_terminal("Expr");
    let logic_or = g.non_terminal("LogicOr");
    let logic_and = g.non_terminal("LogicAnd");
    let equality = g.non_terminal("Equality");
    let relational = g.non_terminal("Relational");
    let additive = g.non_terminal("Additive");
    let multiplicative = g.non_terminal("Multiplicative");
    let unary = g.non_terminal("Unary");
    let postfix = g.non_terminal("Postfix");
    let primary = g.non_terminal("Primary");
    let arg_list_opt = g.non_terminal("ArgListOpt");
    let arg_list = g.non_terminal("ArgList");

    def.grammar.set_start(program);

    // ---- Program / declarations -----------------------------------
    def.prod(program, vec![decl_list], |c, sp| {
        let decls = match pop_n(c, 1).remove(0) {
            Value::DeclList(d) => d,
            _ => unreachable!(),
        };
        Value::Program(Program { decls, span: sp })
    });

    def.prod(decl_list, vec![decl_list, decl], |c, _| {
        let mut kids = pop_n(c, 2);
        let d = match kids.remove(1) {
            Value::Decl(d) => d,
            _ => unreachable!(),
        };
        let mut list = match kids.remove(0) {
            Value::DeclList(l) => l,
            _ => unreachable!(),
        };
        list.push(d);
        Value::DeclList(list)
    });
    def.prod(decl_list, vec![], |_, _| Value::DeclList(Vec::new()));

    def.prod(decl, vec![var_decl], |c, _| {
        let v = match pop_n(c, 1).remove(0) {
            Value::Stmt(Stmt::VarDecl(v)) => v,
            _ => unreachable!(),
        };
        Value::Decl(Decl::Variable(v))
    });
    def.prod(decl, vec![func_decl], |c, _| pop_n(c, 1).remove(0));

    // ---- Variable declarations --------------------------------------
    def.prod(var_decl, vec![var_decl_no_semi, semi], |c, sp| {
        let mut kids = pop_n(c, 2);
        kids.truncate(1);
        let mut v = match kids.remove(0) {
            Value::Stmt(Stmt::VarDecl(v)) => v,
            _ => unreachable!(),
        };
        v.span = sp;
        Value::Stmt(Stmt::VarDecl(v))
    });

    def.prod(var_decl_no_semi, vec![ty, ident], |c, sp| {
        let mut kids = pop_n(c, 2);
        let name_tok = take_token(kids.remove(1));
        let declared_type = match kids.remove(0) {
            Value::Type(t) => t,
            _ => unreachable!(),
        };
        Value::Stmt(Stmt::VarDecl(VarDecl {
            name: name_tok.lexeme,
            declared_type,
            init: None,
            span: sp,
        }))
    });
    def.prod(
        var_decl_no_semi,
        vec![ty, ident, assign, expr],
        |c, sp| {
            let mut kids = pop_n(c, 4);
            let init = take_expr(kids.remove(3));
            kids.remove(2); // '='
            let name_tok = take_token(kids.remove(1));
            let declared_type = match kids.remove(0) {
                Value::Type(t) => t,
                _ => unreachable!(),
            };
            Value::Stmt(Stmt::VarDecl(VarDecl {
                name: name_tok.lexeme,
                declared_type,
                init: Some(init),
                span: sp,
            }))
        },
    );

    def.prod(ty, vec![kw_int], |_, _| Value::Type(DataType::Int));
    def.prod(ty, vec![kw_float], |_, _| Value::Type(DataType::Float));
    def.prod(ty, vec![kw_bool], |_, _| Value::Type(DataType::Bool));

    // ---- Functions ----------------------------------------------------
    def.prod(
        func_decl,
        vec![ty, ident, lparen, param_list_opt, rparen, block],
        |c, sp| {
            let mut kids = pop_n(c, 6);
            let body = match kids.remove(5) {
                Value::StmtList(s) => s,
                _ => unreachable!(),
            };
            kids.remove(4); // ')'
            let params = match kids.remove(3) {
                Value::ParamList(p) => p,
                _ => unreachable!(),
            };
            kids.remove(2); // '('
            let name_tok = take_token(kids.remove(1));
            let return_type = match kids.remove(0) {
                Value::Type(t) => t,
                _ => unreachable!(),
            };
            Value::Decl(Decl::Function(FuncDecl {
                name: name_tok.lexeme,
                return_type,
                params,
                body,
                span: sp,
            }))
        },
    );

    def.prod(param_list_opt, vec![param_list], |c, _| pop_n(c, 1).remove(0));
    def.prod(param_list_opt, vec![], |_, _| Value::ParamList(Vec::new()));
    def.prod(param_list, vec![param], |c, _| {
        let p = match pop_n(c, 1).remove(0) {
            Value::Param(p) => p,
            _ => unreachable!(),
        };
        Value::ParamList(vec![p])
    });
    def.prod(param_list, vec![param_list, comma, param], |c, _| {
        let mut kids = pop_n(c, 3);
        let p = match kids.remove(2) {
            Value::Param(p) => p,
            _ => unreachable!(),
        };
        kids.remove(1); // ','
        let mut list = match kids.remove(0) {
            Value::ParamList(l) => l,
            _ => unreachable!(),
        };
        list.push(p);
        Value::ParamList(list)
    });
    def.prod(param, vec![ty, ident], |c, sp| {
        let mut kids = pop_n(c, 2);
        let name_tok = take_token(kids.remove(1));
        let t = match kids.remove(0) {
            Value::Type(t) => t,
            _ => unreachable!(),
        };
        Value::Param(Param {
            name: name_tok.lexeme,
            ty: t,
            span: sp,
        })
    });

    // ---- Blocks and statement lists -----------------------------------
    def.prod(block, vec![lbrace, stmt_list, rbrace], |c, _| {
        let mut kids = pop_n(c, 3);
        kids.remove(2); // '}'
        let list = match kids.remove(1) {
            Value::StmtList(l) => l,
            _ => unreachable!(),
        };
        kids.remove(0); // '{'
        Value::StmtList(list)
    });
    def.prod(stmt_list, vec![stmt_list, stmt], |c, _| {
        let mut kids = pop_n(c, 2);
        let s = take_stmt(kids.remove(1));
        let mut list = match kids.remove(0) {
            Value::StmtList(l) => l,
            _ => unreachable!(),
        };
        list.push(s);
        Value::StmtList(list)
    });
    def.prod(stmt_list, vec![], |_, _| Value::StmtList(Vec::new()));

    // ---- Statements -----------------------------------------------------
    def.prod(stmt, vec![var_decl], |c, _| pop_n(c, 1).remove(0));
    def.prod(stmt, vec![assign_no_semi, semi], |c, sp| {
        let mut kids = pop_n(c, 2);
        kids.truncate(1);
        let mut s = take_stmt(kids.remove(0));
        if let Stmt::Assign { span, .. } = &mut s {
            *span = sp;
        }
        Value::Stmt(s)
    });
    def.prod(stmt, vec![expr, semi], |c, sp| {
        let mut kids = pop_n(c, 2);
        kids.truncate(1);
        let e = take_expr(kids.remove(0));
        Value::Stmt(Stmt::ExprStmt { expr: e, span: sp })
    });
    def.prod(stmt, vec![if_stmt], |c, _| pop_n(c, 1).remove(0));
    def.prod(stmt, vec![while_stmt], |c, _| pop_n(c, 1).remove(0));
    def.prod(stmt, vec![do_while_stmt], |c, _| pop_n(c, 1).remove(0));
    def.prod(stmt, vec![for_stmt], |c, _| pop_n(c, 1).remove(0));
    def.prod(stmt, vec![block], |c, sp| {
        let list = match pop_n(c, 1).remove(0) {
            Value::StmtList(l) => l,
            _ => unreachable!(),
        };
        Value::Stmt(Stmt::Block { stmts: list, span: sp })
    });
    def.prod(stmt, vec![kw_return, semi], |c, sp| {
        pop_n(c, 2);
        Value::Stmt(Stmt::Return { value: None, span: sp })
    });
    def.prod(stmt, vec![kw_return, expr, semi], |c, sp| {
        let mut kids = pop_n(c, 3);
        kids.truncate(2);
        let e = take_expr(kids.remove(1));
        Value::Stmt(Stmt::Return { value: Some(e), span: sp })
    });
    def.prod(stmt, vec![kw_break, semi], |c, sp| {
        pop_n(c, 2);
        Value::Stmt(Stmt::Break { span: sp })
    });
    def.prod(stmt, vec![kw_continue, semi], |c, sp| {
        pop_n(c, 2);
        Value::Stmt(Stmt::Continue { span: sp })
    });
    def.prod(stmt, vec![kw_goto, ident, semi], |c, sp| {
        let mut kids = pop_n(c, 3);
        kids.truncate(2);
        let label_tok = take_token(kids.remove(1));
        Value::Stmt(Stmt::Goto { label: label_tok.lexeme, span: sp })
    });
    def.prod(stmt, vec![ident, colon, stmt], |c, sp| {
        let mut kids = pop_n(c, 3);
        let inner = take_stmt(kids.remove(2));
        kids.remove(1); // ':'
        let name_tok = take_token(kids.remove(0));
        Value::Stmt(Stmt::Label {
            name: name_tok.lexeme,
            stmt: Some(Box::new(inner)),
            span: sp,
        })
    });
    def.prod(stmt, vec![switch_stmt], |c, _| pop_n(c, 1).remove(0));

    def.prod(
        if_stmt,
        vec![kw_if, lparen, expr, rparen, stmt],
        |c, sp| {
            let mut kids = pop_n(c, 5);
            let then_branch = Box::new(take_stmt(kids.remove(4)));
            kids.remove(3); // ')'
            let cond = take_expr(kids.remove(2));
            Value::Stmt(Stmt::If {
                cond,
                then_branch,
                else_branch: None,
                span: sp,
            })
        },
    );
    def.prod(
        if_stmt,
        vec![kw_if, lparen, expr, rparen, stmt, kw_else, stmt],
        |c, sp| {
            let mut kids = pop_n(c, 7);
            let else_branch = Some(Box::new(take_stmt(kids.remove(6))));
            kids.remove(5); // 'else'
            let then_branch = Box::new(take_stmt(kids.remove(4)));
            kids.remove(3); // ')'
            let cond = take_expr(kids.remove(2));
            Value::Stmt(Stmt::If {
                cond,
                then_branch,
                else_branch,
                span: sp,
            })
        },
    );

    def.prod(
        while_stmt,
        vec![kw_while, lparen, expr, rparen, stmt],
        |c, sp| {
            let mut kids = pop_n(c, 5);
            let body = Box::new(take_stmt(kids.remove(4)));
            kids.remove(3);
            let cond = take_expr(kids.remove(2));
            Value::Stmt(Stmt::While { cond, body, span: sp })
        },
    );

    def.prod(
        do_while_stmt,
        vec![kw_do, stmt, kw_while, lparen, expr, rparen, semi],
        |c, sp| {
            let mut kids = pop_n(c, 7);
            kids.truncate(6);
            let cond = take_expr(kids.remove(4));
            kids.remove(3);
            kids.remove(2); // 'while'
            let body = Box::new(take_stmt(kids.remove(1)));
            Value::Stmt(Stmt::DoWhile { body, cond, span: sp })
        },
    );

    def.prod(
        for_stmt,
        vec![
            kw_for,
            lparen,
            for_init,
            semi,
            for_cond_opt,
            semi,
            for_update_opt,
            rparen,
            stmt,
        ],
        |c, sp| {
            let mut kids = pop_n(c, 9);
            let body = Box::new(take_stmt(kids.remove(8)));
            kids.remove(7); // ')'
            let update = match kids.remove(6) {
                Value::OptStmt(o) => o,
                _ => unreachable!(),
            };
            kids.remove(5); // ';'
            let cond = match kids.remove(4) {
                Value::Expr(e) => Some(e),
                Value::Empty => None,
                _ => unreachable!(),
            };
            kids.remove(3); // ';'
            let init = match kids.remove(2) {
                Value::OptStmt(o) => o,
                _ => unreachable!(),
            };
            Value::Stmt(Stmt::For { init, cond, update, body, span: sp })
        },
    );
    def.prod(for_init, vec![var_decl_no_semi], |c, _| {
        let s = take_stmt(pop_n(c, 1).remove(0));
        Value::OptStmt(Some(Box::new(s)))
    });
    def.prod(for_init, vec![assign_no_semi], |c, _| {
        let s = take_stmt(pop_n(c, 1).remove(0));
        Value::OptStmt(Some(Box::new(s)))
    });
    def.prod(for_init, vec![], |_, _| Value::OptStmt(None));
    def.prod(for_cond_opt, vec![expr], |c, _| pop_n(c, 1).remove(0));
    def.prod(for_cond_opt, vec![], |_, _| Value::Empty);
    def.prod(for_update_opt, vec![assign_no_semi], |c, _| {
        let s = take_stmt(pop_n(c, 1).remove(0));
        Value::OptStmt(Some(Box::new(s)))
    });
    def.prod(for_update_opt, vec![expr], |c, sp| {
        let e = take_expr(pop_n(c, 1).remove(0));
        Value::OptStmt(Some(Box::new(Stmt::ExprStmt { expr: e, span: sp })))
    });
    def.prod(for_update_opt, vec![], |_, _| Value::OptStmt(None));

    def.prod(assign_no_semi, vec![ident, assign_op, expr], |c, sp| {
        let mut kids = pop_n(c, 3);
        let value = take_expr(kids.remove(2));
        let op = match kids.remove(1) {
            Value::AssignOp(o) => o,
            _ => unreachable!(),
        };
        let name_tok = take_token(kids.remove(0));
        Value::Stmt(Stmt::Assign {
            op,
            target: Expr::Identifier { name: name_tok.lexeme, span: name_tok.span },
            value,
            span: sp,
        })
    });
    def.prod(assign_op, vec![assign], |_, _| Value::AssignOp(AssignOp::Assign));
    def.prod(assign_op, vec![plus_assign], |_, _| {
        Value::AssignOp(AssignOp::AddAssign)
    });
    def.prod(assign_op, vec![minus_assign], |_, _| {
        Value::AssignOp(AssignOp::SubAssign)
    });
    def.prod(assign_op, vec![star_assign], |_, _| {
        Value::AssignOp(AssignOp::MulAssign)
    });
    def.prod(assign_op, vec![slash_assign], |_, _| {
        Value::AssignOp(AssignOp::DivAssign)
    });
    def.prod(assign_op, vec![percent_assign], |_, _| {
        Value::AssignOp(AssignOp::ModAssign)
    });

    def.prod(
        switch_stmt,
        vec![
            kw_switch,
            lparen,
            expr,
            rparen,
            lbrace,
            case_list,
            default_opt,
            rbrace,
        ],
        |c, sp| {
            let mut kids = pop_n(c, 8);
            kids.remove(7); // '}'
            let default = match kids.remove(6) {
                Value::DefaultBody(d) => d,
                _ => unreachable!(),
            };
            let cases = match kids.remove(5) {
                Value::CaseList(l) => l,
                _ => unreachable!(),
            };
            kids.remove(4); // '{'
            kids.remove(3); // ')'
            let selector = take_expr(kids.remove(2));
            Value::Stmt(Stmt::Switch { selector, cases, default, span: sp })
        },
    );
    def.prod(case_list, vec![case_list, case], |c, _| {
        let mut kids = pop_n(c, 2);
        let cs = match kids.remove(1) {
            Value::Case(c) => c,
            _ => unreachable!(),
        };
        let mut list = match kids.remove(0) {
            Value::CaseList(l) => l,
            _ => unreachable!(),
        };
        list.push(cs);
        Value::CaseList(list)
    });
    def.prod(case_list, vec![], |_, _| Value::CaseList(Vec::new()));
    def.prod(case, vec![kw_case, expr, colon, stmt_list], |c, sp| {
        let mut kids = pop_n(c, 4);
        let body = match kids.remove(3) {
            Value::StmtList(l) => l,
            _ => unreachable!(),
        };
        kids.remove(2); // ':'
        let value = take_expr(kids.remove(1));
        Value::Case(SwitchCase { value, body, span: sp })
    });
    def.prod(default_opt, vec![kw_default, colon, stmt_list], |c, _| {
        let mut kids = pop_n(c, 3);
        let body = match kids.remove(2) {
            Value::StmtList(l) => l,
            _ => unreachable!(),
        };
        Value::DefaultBody(Some(body))
    });
    def.prod(default_opt, vec![], |_, _| Value::DefaultBody(None));

    // ---- Expressions: precedence-climbing ladder -----------------------
    def.prod(expr, vec![logic_or], |c, _| pop_n(c, 1).remove(0));

    def.prod(logic_or, vec![logic_or, oror, logic_and], |c, sp| {
        binary_prod(c, BinOp::Or, sp)
    });
    def.prod(logic_or, vec![logic_and], |c, _| pop_n(c, 1).remove(0));

    def.prod(logic_and, vec![logic_and, andand, equality], |c, sp| {
        binary_prod(c, BinOp::And, sp)
    });
    def.prod(logic_and, vec![equality], |c, _| pop_n(c, 1).remove(0));

    def.prod(equality, vec![equality, eqeq, relational], |c, sp| {
        binary_prod(c, BinOp::Eq, sp)
    });
    def.prod(equality, vec![equality, neq, relational], |c, sp| {
        binary_prod(c, BinOp::Ne, sp)
    });
    def.prod(equality, vec![relational], |c, _| pop_n(c, 1).remove(0));

    def.prod(relational, vec![relational, lt, additive], |c, sp| {
        binary_prod(c, BinOp::Lt, sp)
    });
    def.prod(relational, vec![relational, le, additive], |c, sp| {
        binary_prod(c, BinOp::Le, sp)
    });
    def.prod(relational, vec![relational, gt, additive], |c, sp| {
        binary_prod(c, BinOp::Gt, sp)
    });
    def.prod(relational, vec![relational, ge, additive], |c, sp| {
        binary_prod(c, BinOp::Ge, sp)
    });
    def.prod(relational, vec![additive], |c, _| pop_n(c, 1).remove(0));

    def.prod(additive, vec![additive, plus, multiplicative], |c, sp| {
        binary_prod(c, BinOp::Add, sp)
    });
    def.prod(additive, vec![additive, minus, multiplicative], |c, sp| {
        binary_prod(c, BinOp::Sub, sp)
    });
    def.prod(additive, vec![multiplicative], |c, _| pop_n(c, 1).remove(0));

    def.prod(multiplicative, vec![multiplicative, star, unary], |c, sp| {
        binary_prod(c, BinOp::Mul, sp)
    });
    def.prod(multiplicative, vec![multiplicative, slash, unary], |c, sp| {
        binary_prod(c, BinOp::Div, sp)
    });
    def.prod(
        multiplicative,
        vec![multiplicative, percent, unary],
        |c, sp| binary_prod(c, BinOp::Mod, sp),
    );
    def.prod(multiplicative, vec![unary], |c, _| pop_n(c, 1).remove(0));

    def.prod(unary, vec![plus, unary], |c, sp| unary_prod(c, UnaryOp::Pos, sp));
    def.prod(unary, vec![minus, unary], |c, sp| unary_prod(c, UnaryOp::Neg, sp));
    def.prod(unary, vec![not, unary], |c, sp| unary_prod(c, UnaryOp::Not, sp));
    def.prod(unary, vec![postfix], |c, _| pop_n(c, 1).remove(0));

    def.prod(
        postfix,
        vec![postfix, lbracket, expr, rbracket],
        |c, sp| {
            let mut kids = pop_n(c, 4);
            kids.remove(3); // ']'
            let index = take_expr(kids.remove(2));
            kids.remove(1); // '['
            let base = take_expr(kids.remove(0));
            Value::Expr(Expr::Index {
                base: Box::new(base),
                index: Box::new(index),
                span: sp,
            })
        },
    );
    def.prod(
        postfix,
        vec![postfix, lparen, arg_list_opt, rparen],
        |c, sp| {
            let mut kids = pop_n(c, 4);
            kids.remove(3); // ')'
            let args = match kids.remove(2) {
                Value::ArgList(a) => a,
                _ => unreachable!(),
            };
            kids.remove(1); // '('
            let callee_expr = take_expr(kids.remove(0));
            let callee = match callee_expr {
                Expr::Identifier { name, .. } => name,
                _ => panic!("call target must be an identifier"),
            };
            Value::Expr(Expr::Call { callee, args, span: sp })
        },
    );
    def.prod(postfix, vec![primary], |c, _| pop_n(c, 1).remove(0));

    def.prod(primary, vec![ident], |c, _| {
        let t = take_token(pop_n(c, 1).remove(0));
        Value::Expr(Expr::Identifier { name: t.lexeme, span: t.span })
    });
    def.prod(primary, vec![int_lit], |c, _| {
        let t = take_token(pop_n(c, 1).remove(0));
        let n = t.lexeme.as_str().parse::<i64>().unwrap_or(0);
        Value::Expr(Expr::Literal { value: LiteralValue::Int(n), span: t.span })
    });
    def.prod(primary, vec![real_lit], |c, _| {
        let t = take_token(pop_n(c, 1).remove(0));
        let n = t.lexeme.as_str().parse::<f64>().unwrap_or(0.0);
        Value::Expr(Expr::Literal { value: LiteralValue::Real(n), span: t.span })
    });
    def.prod(primary, vec![str_lit], |c, _| {
        let t = take_token(pop_n(c, 1).remove(0));
        Value::Expr(Expr::Literal { value: LiteralValue::Str(t.lexeme), span: t.span })
    });
    def.prod(primary, vec![kw_true], |c, _| {
        let t = take_token(pop_n(c, 1).remove(0));
        Value::Expr(Expr::Literal { value: LiteralValue::Bool(true), span: t.span })
    });
    def.prod(primary, vec![kw_false], |c, _| {
        let t = take_token(pop_n(c, 1).remove(0));
        Value::Expr(Expr::Literal { value: LiteralValue::Bool(false), span: t.span })
    });
    def.prod(primary, vec![lparen, expr, rparen], |c, _| {
        let mut kids = pop_n(c, 3);
        kids.remove(2);
        let e = take_expr(kids.remove(1));
        Value::Expr(e)
    });

    def.prod(arg_list_opt, vec![arg_list], |c, _| pop_n(c, 1).remove(0));
    def.prod(arg_list_opt, vec![], |_, _| Value::ArgList(Vec::new()));
    def.prod(arg_list, vec![expr], |c, _| {
        let e = take_expr(pop_n(c, 1).remove(0));
        Value::ArgList(vec![e])
    });
    def.prod(arg_list, vec![arg_list, comma, expr], |c, _| {
        let mut kids = pop_n(c, 3);
        let e = take_expr(kids.remove(2));
        kids.remove(1);
        let mut list = match kids.remove(0) {
            Value::ArgList(l) => l,
            _ => unreachable!(),
        };
        list.push(e);
        Value::ArgList(list)
    });

    def
}

fn binary_prod(children: &mut Vec<Value>, op: BinOp, sp: Span) -> Value {
    let mut kids = pop_n(children, 3);
    let right = take_expr(kids.remove(2));
    kids.remove(1); // operator sentinel
    let left = take_expr(kids.remove(0));
    Value::Expr(Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span: sp,
    })
}

fn unary_prod(children: &mut Vec<Value>, op: UnaryOp, sp: Span) -> Value {
    let mut kids = pop_n(children, 2);
    let operand = take_expr(kids.remove(1));
    Value::Expr(Expr::Unary {
        op,
        operand: Box::new(operand),
        span: sp,
    })
}
