//! ACTION/GOTO table construction (§4.6 "Parse-table construction").
//!
//! Grounded on `original_source/src/parser/lalr.h`'s `LALRAction`/
//! `LALRTable`/`LALRConflictResolver` triad. Every shift implied by an
//! automaton transition is installed before any reduce is considered
//! for the same `(state, terminal)` cell, which is what makes the
//! classic dangling-`else` ambiguity resolve to "attach to the nearest
//! unmatched `if`" without a grammar rewrite (§9 Open Questions):
//! shifting `else` always wins over reducing the shorter `if` form.

use tinyc_util::FxHashMap;

use crate::grammar::{Grammar, ProdId, SymbolId};
use crate::lalr::{LrAutomaton, StateId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(ProdId),
    Accept,
}

/// A cell that received more than one candidate action; §4.6 requires
/// these be reported, not silently swallowed.
#[derive(Clone, Debug)]
pub struct Conflict {
    pub state: StateId,
    pub symbol: SymbolId,
    pub kept: Action,
    pub discarded: Action,
}

pub struct ParseTable {
    pub action: FxHashMap<(StateId, SymbolId), Action>,
    pub goto_table: FxHashMap<(StateId, SymbolId), StateId>,
    pub conflicts: Vec<Conflict>,
}

impl ParseTable {
    pub fn action(&self, state: StateId, symbol: SymbolId) -> Option<Action> {
        self.action.get(&(state, symbol)).copied()
    }

    pub fn goto(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        self.goto_table.get(&(state, symbol)).copied()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

pub fn build_table(grammar: &Grammar, automaton: &LrAutomaton) -> ParseTable {
    let mut action: FxHashMap<(StateId, SymbolId), Action> = FxHashMap::default();
    let mut goto_table: FxHashMap<(StateId, SymbolId), StateId> = FxHashMap::default();
    let mut conflicts = Vec::new();

    for (state_id, state) in automaton.states.iter_enumerated() {
        for (&symbol, &target) in &state.transitions {
            if grammar.is_non_terminal(symbol) {
                goto_table.insert((state_id, symbol), target);
            } else {
                action.insert((state_id, symbol), Action::Shift(target));
            }
        }
    }

    for (state_id, state) in automaton.states.iter_enumerated() {
        for (&(prod_id, dot), lookaheads) in &state.items {
            let prod = grammar.production(prod_id);
            if dot < prod.rhs.len() {
                continue;
            }
            let is_accept = prod.lhs == grammar.start && lookaheads.contains(&grammar.end);
            for &symbol in lookaheads {
                let candidate = if is_accept && symbol == grammar.end {
                    Action::Accept
                } else {
                    Action::Reduce(prod_id)
                };
                install(&mut action, &mut conflicts, state_id, symbol, candidate);
            }
        }
    }

    ParseTable { action, goto_table, conflicts }
}

/// Installs `candidate` into `(state, symbol)`, keeping whatever is
/// already there if it is a shift (shift-wins policy) or the
/// lower-numbered production on a reduce/reduce clash, and recording a
/// `Conflict` either way so callers can surface it as a diagnostic.
fn install(
    action: &mut FxHashMap<(StateId, SymbolId), Action>,
    conflicts: &mut Vec<Conflict>,
    state: StateId,
    symbol: SymbolId,
    candidate: Action,
) {
    match action.get(&(state, symbol)).copied() {
        None => {
            action.insert((state, symbol), candidate);
        }
        Some(existing @ Action::Shift(_)) => {
            if candidate != existing {
                conflicts.push(Conflict {
                    state,
                    symbol,
                    kept: existing,
                    discarded: candidate,
                });
            }
        }
        Some(existing) => {
            if candidate == existing {
                return;
            }
            let keep_candidate = match (existing, candidate) {
                (Action::Reduce(a), Action::Reduce(b)) => b.0 < a.0,
                (Action::Accept, Action::Reduce(_)) => false,
                (Action::Reduce(_), Action::Accept) => true,
                _ => false,
            };
            if keep_candidate {
                action.insert((state, symbol), candidate);
                conflicts.push(Conflict {
                    state,
                    symbol,
                    kept: candidate,
                    discarded: existing,
                });
            } else {
                conflicts.push(Conflict {
                    state,
                    symbol,
                    kept: existing,
                    discarded: candidate,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lalr::LalrBuilder;
    use tinyc_util::Idx;

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
        g.compute_first();
        g.compute_follow();
        g
    }

    #[test]
    fn accepts_the_start_symbol_at_end_of_input() {
        let g = expr_grammar();
        let automaton = LalrBuilder::new(&g).build();
        let table = build_table(&g, &automaton);
        assert!(table
            .action
            .values()
            .any(|a| matches!(a, Action::Accept)));
    }

    #[test]
    fn unambiguous_grammar_produces_no_conflicts() {
        let g = expr_grammar();
        let automaton = LalrBuilder::new(&g).build();
        let table = build_table(&g, &automaton);
        assert!(!table.has_conflicts());
    }

    #[test]
    fn every_shift_target_is_a_valid_state() {
        let g = expr_grammar();
        let automaton = LalrBuilder::new(&g).build();
        let table = build_table(&g, &automaton);
        let num_states = automaton.states.len();
        for action in table.action.values() {
            if let Action::Shift(target) = action {
                assert!(target.index() < num_states);
            }
        }
    }
}
