//! Grammar model and FIRST/FOLLOW computation (§4.4).
//!
//! Grounded on `original_source/src/parser/grammar.h`'s `Symbol`/
//! `Production`/`Grammar` triad, reshaped around `tinyc-util`'s
//! `IndexVec`/`define_idx` idiom instead of raw pointers. Clients
//! register terminals (optionally bound to a `TokenKind`) and
//! non-terminals, then productions over those symbols; `$` and `ε`
//! are synthesized once, up front.

use tinyc_util::{define_idx, FxHashMap, FxHashSet, IndexVec};

use tinyc_lex::TokenKind;

define_idx!(SymbolId);
define_idx!(ProdId);

/// `(name, kind, optional bound-token-kind)` — §3 "Grammar".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    Epsilon,
}

#[derive(Clone, Debug)]
pub struct GrammarSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub token_kind: Option<TokenKind>,
}

/// `(id, left-hand-side non-terminal, right-hand-side sequence)`.
#[derive(Clone, Debug)]
pub struct Production {
    pub id: ProdId,
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
}

/// The context-free grammar plus its derived analysis sets.
pub struct Grammar {
    symbols: IndexVec<SymbolId, GrammarSymbol>,
    by_name: FxHashMap<String, SymbolId>,
    token_to_symbol: FxHashMap<TokenKind, SymbolId>,
    productions: IndexVec<ProdId, Production>,
    prods_of: FxHashMap<SymbolId, Vec<ProdId>>,
    pub start: SymbolId,
    pub end: SymbolId,
    pub epsilon: SymbolId,
    first: FxHashMap<SymbolId, FxHashSet<SymbolId>>,
    follow: FxHashMap<SymbolId, FxHashSet<SymbolId>>,
}

impl Grammar {
    /// A fresh grammar with only `$` and `ε` registered.
    pub fn new() -> Self {
        let mut symbols = IndexVec::new();
        let mut by_name = FxHashMap::default();

        let epsilon = symbols.push(GrammarSymbol {
            name: "ε".to_string(),
            kind: SymbolKind::Epsilon,
            token_kind: None,
        });
        by_name.insert("ε".to_string(), epsilon);

        let end = symbols.push(GrammarSymbol {
            name: "$".to_string(),
            kind: SymbolKind::Terminal,
            token_kind: None,
        });
        by_name.insert("$".to_string(), end);

        Grammar {
            symbols,
            by_name,
            token_to_symbol: FxHashMap::default(),
            productions: IndexVec::new(),
            prods_of: FxHashMap::default(),
            start: end, // placeholder until `set_start`
            end,
            epsilon,
            first: FxHashMap::default(),
            follow: FxHashMap::default(),
        }
    }

    pub fn terminal(&mut self, name: &str, token_kind: Option<TokenKind>) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.symbols.push(GrammarSymbol {
            name: name.to_string(),
            kind: SymbolKind::Terminal,
            token_kind,
        });
        self.by_name.insert(name.to_string(), id);
        if let Some(tk) = token_kind {
            self.token_to_symbol.insert(tk, id);
        }
        id
    }

    pub fn non_terminal(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.symbols.push(GrammarSymbol {
            name: name.to_string(),
            kind: SymbolKind::NonTerminal,
            token_kind: None,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn set_start(&mut self, start: SymbolId) {
        self.start = start;
    }

    pub fn add_production(&mut self, lhs: SymbolId, rhs: Vec<SymbolId>) -> ProdId {
        let id = ProdId(self.productions.len() as u32);
        let prod = Production { id, lhs, rhs };
        self.productions.push(prod);
        self.prods_of.entry(lhs).or_default().push(id);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &GrammarSymbol {
        &self.symbols[id]
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        &self.symbols[id].name
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.symbols[id].kind == SymbolKind::Terminal
    }

    pub fn is_non_terminal(&self, id: SymbolId) -> bool {
        self.symbols[id].kind == SymbolKind::NonTerminal
    }

    pub fn production(&self, id: ProdId) -> &Production {
        &self.productions[id]
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.productions.as_slice().iter()
    }

    pub fn productions_of(&self, nt: SymbolId) -> &[ProdId] {
        self.prods_of.get(&nt).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Terminal symbol bound to this token kind, if the grammar uses
    /// it. `Eof` always maps to `$` once the grammar has it registered.
    pub fn terminal_for_token(&self, kind: TokenKind) -> Option<SymbolId> {
        if kind == TokenKind::Eof {
            return Some(self.end);
        }
        self.token_to_symbol.get(&kind).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// §4.4 validation errors: bad start symbol, terminal on a
    /// production's left-hand side, or an orphan non-terminal with no
    /// production at all (a non-terminal that can never derive
    /// anything is a defect, not merely unreachable).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.is_terminal(self.start) {
            errors.push("start symbol is a terminal".to_string());
        }
        if self.productions_of(self.start).is_empty() {
            errors.push("start symbol has no production".to_string());
        }
        for prod in self.productions() {
            if self.is_terminal(prod.lhs) {
                errors.push(format!(
                    "production {} has a terminal left-hand side: {}",
                    prod.id.0,
                    self.symbol_name(prod.lhs)
                ));
            }
        }
        for (id, sym) in self.symbols.iter_enumerated() {
            if sym.kind == SymbolKind::NonTerminal && self.productions_of(id).is_empty() {
                errors.push(format!("undefined symbol: non-terminal {}", sym.name));
            }
        }
        errors
    }

    /// FIRST(X) for terminal/epsilon/non-terminal `X`, per §4.4.
    pub fn first(&self, sym: SymbolId) -> &FxHashSet<SymbolId> {
        self.first.get(&sym).expect("compute_first not yet run")
    }

    /// FIRST of a symbol string followed by a trailing lookahead
    /// terminal; used directly by the LALR closure step (§4.5).
    pub fn first_of_seq(&self, seq: &[SymbolId], trailing: SymbolId) -> FxHashSet<SymbolId> {
        let mut result = FxHashSet::default();
        let mut all_epsilon = true;
        for &sym in seq {
            let f = self.first(sym);
            for &t in f {
                if t != self.epsilon {
                    result.insert(t);
                }
            }
            if !f.contains(&self.epsilon) {
                all_epsilon = false;
                break;
            }
        }
        if all_epsilon {
            result.insert(trailing);
        }
        result
    }

    pub fn follow(&self, sym: SymbolId) -> &FxHashSet<SymbolId> {
        self.follow.get(&sym).expect("compute_follow not yet run")
    }

    /// Fixed-point computation of FIRST for every symbol (§4.4).
    pub fn compute_first(&mut self) {
        let mut first: FxHashMap<SymbolId, FxHashSet<SymbolId>> = FxHashMap::default();
        for (id, sym) in self.symbols.iter_enumerated() {
            let mut set = FxHashSet::default();
            match sym.kind {
                SymbolKind::Terminal => {
                    set.insert(id);
                }
                SymbolKind::Epsilon => {
                    set.insert(id);
                }
                SymbolKind::NonTerminal => {}
            }
            first.insert(id, set);
        }

        loop {
            let mut changed = false;
            for prod in self.productions() {
                let added = Self::extend_first_for_production(&mut first, prod, self.epsilon);
                changed |= added;
            }
            if !changed {
                break;
            }
        }
        self.first = first;
    }

    fn extend_first_for_production(
        first: &mut FxHashMap<SymbolId, FxHashSet<SymbolId>>,
        prod: &Production,
        epsilon: SymbolId,
    ) -> bool {
        let mut changed = false;
        let mut all_epsilon = true;
        let mut to_add: Vec<SymbolId> = Vec::new();
        for &sym in &prod.rhs {
            let f = first.get(&sym).cloned().unwrap_or_default();
            for t in f.iter().copied() {
                if t != epsilon {
                    to_add.push(t);
                }
            }
            if !f.contains(&epsilon) {
                all_epsilon = false;
                break;
            }
        }
        if prod.rhs.is_empty() {
            all_epsilon = true;
        }
        let entry = first.entry(prod.lhs).or_default();
        for t in to_add {
            changed |= entry.insert(t);
        }
        if all_epsilon {
            changed |= entry.insert(epsilon);
        }
        changed
    }

    /// Fixed-point computation of FOLLOW for every non-terminal (§4.4).
    /// Requires `compute_first` to have already run.
    pub fn compute_follow(&mut self) {
        let mut follow: FxHashMap<SymbolId, FxHashSet<SymbolId>> = FxHashMap::default();
        for (id, sym) in self.symbols.iter_enumerated() {
            if sym.kind == SymbolKind::NonTerminal {
                follow.insert(id, FxHashSet::default());
            }
        }
        follow.entry(self.start).or_default().insert(self.end);

        loop {
            let mut changed = false;
            for prod in self.productions() {
                for (i, &b) in prod.rhs.iter().enumerate() {
                    if !self.is_non_terminal(b) {
                        continue;
                    }
                    let beta = &prod.rhs[i + 1..];
                    let first_beta = self.first_of_seq_during_follow(beta);
                    let entry = follow.entry(b).or_default();
                    let mut local_changed = false;
                    for &t in &first_beta {
                        if t != self.epsilon {
                            local_changed |= entry.insert(t);
                        }
                    }
                    let beta_nullable =
                        beta.is_empty() || first_beta.contains(&self.epsilon);
                    changed |= local_changed;
                    if beta_nullable {
                        let follow_a = follow.get(&prod.lhs).cloned().unwrap_or_default();
                        let entry = follow.entry(b).or_default();
                        for &t in &follow_a {
                            changed |= entry.insert(t);
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        self.follow = follow;
    }

    fn first_of_seq_during_follow(&self, seq: &[SymbolId]) -> FxHashSet<SymbolId> {
        let mut result = FxHashSet::default();
        let mut all_epsilon = true;
        for &sym in seq {
            let f = self.first(sym);
            for &t in f {
                result.insert(t);
            }
            if !f.contains(&self.epsilon) {
                all_epsilon = false;
                break;
            }
        }
        if all_epsilon {
            result.insert(self.epsilon);
        }
        result
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `E -> E + T | T`, `T -> id`. Classic textbook grammar used to
    /// sanity-check FIRST/FOLLOW against hand-computed sets.
    fn expr_grammar() -> Grammar {
        let mut g = Grammar::new();
        let e = g.non_terminal("E");
        let t = g.non_terminal("T");
        let plus = g.terminal("+", None);
        let id = g.terminal("id", None);
        g.set_start(e);
        g.add_production(e, vec![e, plus, t]);
        g.add_production(e, vec![t]);
        g.add_production(t, vec![id]);
        g
    }

    #[test]
    fn first_sets_match_hand_computation() {
        let mut g = expr_grammar();
        g.compute_first();
        let id = g.lookup("id").unwrap();
        let e = g.lookup("E").unwrap();
        let t = g.lookup("T").unwrap();
        assert_eq!(g.first(e).len(), 1);
        assert!(g.first(e).contains(&id));
        assert!(g.first(t).contains(&id));
    }

    #[test]
    fn follow_sets_match_hand_computation() {
        let mut g = expr_grammar();
        g.compute_first();
        g.compute_follow();
        let e = g.lookup("E").unwrap();
        let t = g.lookup("T").unwrap();
        let plus = g.lookup("+").unwrap();
        assert!(g.follow(e).contains(&g.end));
        assert!(g.follow(t).contains(&g.end));
        assert!(g.follow(t).contains(&plus));
    }

    #[test]
    fn fixed_point_is_idempotent() {
        let mut g = expr_grammar();
        g.compute_first();
        let e = g.lookup("E").unwrap();
        let before: Vec<_> = {
            let mut v: Vec<_> = g.first(e).iter().copied().collect();
            v.sort();
            v
        };
        g.compute_first();
        let after: Vec<_> = {
            let mut v: Vec<_> = g.first(e).iter().copied().collect();
            v.sort();
            v
        };
        assert_eq!(before, after);
    }

    #[test]
    fn validation_flags_terminal_start_symbol() {
        let mut g = Grammar::new();
        let bad_start = g.terminal("bad", None);
        g.set_start(bad_start);
        let errors = g.validate();
        assert!(errors.iter().any(|e| e.contains("terminal")));
    }
}
