//! LALR(1) automaton construction (§4.5).
//!
//! Grounded on `original_source/src/parser/lalr.h`'s `LRItem`/
//! `LRItemSet`/`LALRAutomaton` triad; built as true canonical LR(1)
//! followed by a same-core merge, resolving the original's
//! LR(0)-then-patch shortcut into genuine LR(1) lookaheads (§9 Open
//! Questions).
//!
//! An LR item's lookahead is stored as a *set* directly on the item
//! (§3 "LR item"), so within one state two occurrences of the same
//! core naturally collapse into a single item with the union of their
//! lookaheads — this is what makes the "LR1-then-merge" route produce
//! exact LALR(1) tables without a separate propagation phase doing any
//! real work; §4.5 step 4 is kept here as a fixed-point correctness
//! net rather than load-bearing machinery.

use tinyc_util::{define_idx, FxHashMap, FxHashSet, IndexVec};

use crate::grammar::{Grammar, ProdId, SymbolId};

define_idx!(StateId);

/// `(production-id, dot-position)`, ignoring lookahead — the *core*
/// of an item (§3, GLOSSARY).
pub type Core = (ProdId, usize);

/// One canonical-collection state: a core-keyed map of lookahead sets
/// plus its outgoing transitions.
#[derive(Clone, Debug, Default)]
pub struct LrState {
    pub items: FxHashMap<Core, FxHashSet<SymbolId>>,
    pub transitions: FxHashMap<SymbolId, StateId>,
}

pub struct LrAutomaton {
    pub states: IndexVec<StateId, LrState>,
}

/// §4.5 `closure(I)`: repeatedly add, for every item
/// `[A -> α · Bβ, L]` with `B` a non-terminal, the items
/// `[B -> · γ, FIRST(βL)]` for every production `B -> γ`.
pub fn closure(grammar: &Grammar, items: &mut FxHashMap<Core, FxHashSet<SymbolId>>) {
    loop {
        let mut changed = false;
        let snapshot: Vec<(Core, FxHashSet<SymbolId>)> =
            items.iter().map(|(c, l)| (*c, l.clone())).collect();
        for ((prod_id, dot), lookaheads) in snapshot {
            let prod = grammar.production(prod_id);
            if dot >= prod.rhs.len() {
                continue;
            }
            let b = prod.rhs[dot];
            if !grammar.is_non_terminal(b) {
                continue;
            }
            let beta = &prod.rhs[dot + 1..];
            for &la in &lookaheads {
                let first_beta_la = grammar.first_of_seq(beta, la);
                for &b_prod in grammar.productions_of(b) {
                    let entry = items.entry((b_prod, 0)).or_default();
                    for &t in &first_beta_la {
                        if entry.insert(t) {
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
}

/// §4.5 / GLOSSARY `goto(I, X)`: advance every item with `X`
/// immediately after the dot, then close the result.
pub fn goto(
    grammar: &Grammar,
    items: &FxHashMap<Core, FxHashSet<SymbolId>>,
    x: SymbolId,
) -> FxHashMap<Core, FxHashSet<SymbolId>> {
    let mut result: FxHashMap<Core, FxHashSet<SymbolId>> = FxHashMap::default();
    for (&(prod_id, dot), lookaheads) in items {
        let prod = grammar.production(prod_id);
        if dot < prod.rhs.len() && prod.rhs[dot] == x {
            let entry = result.entry((prod_id, dot + 1)).or_default();
            for &t in lookaheads {
                entry.insert(t);
            }
        }
    }
    closure(grammar, &mut result);
    result
}

/// Core (ignoring lookahead) of an item set, as a sorted vector — the
/// stable key used both for LR(1) state deduplication and for the
/// same-core merge (§4.5 step 3, GLOSSARY "core of an LR state").
fn core_key(items: &FxHashMap<Core, FxHashSet<SymbolId>>) -> Vec<Core> {
    let mut v: Vec<Core> = items.keys().copied().collect();
    v.sort();
    v
}

/// Full item-set key (core *and* lookaheads) used to detect that a
/// `goto` target is identical to an already-registered LR(1) state
/// during canonical-collection construction (§3 "item-set equality
/// uses full item equality").
fn full_key(items: &FxHashMap<Core, FxHashSet<SymbolId>>) -> Vec<(Core, Vec<SymbolId>)> {
    let mut v: Vec<(Core, Vec<SymbolId>)> = items
        .iter()
        .map(|(c, l)| {
            let mut la: Vec<SymbolId> = l.iter().copied().collect();
            la.sort();
            (*c, la)
        })
        .collect();
    v.sort_by(|a, b| a.0.cmp(&b.0));
    v
}

pub struct LalrBuilder<'g> {
    grammar: &'g Grammar,
}

impl<'g> LalrBuilder<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        LalrBuilder { grammar }
    }

    /// Runs all four build steps of §4.5 in order and returns the
    /// merged LALR automaton.
    pub fn build(&self) -> LrAutomaton {
        let canonical = self.build_canonical_collection();
        let merged = self.merge_same_core_states(canonical);
        self.propagate_lookaheads(merged)
    }

    /// Step 1-2: augment/seed and build the canonical LR(1) collection.
    fn build_canonical_collection(&self) -> LrAutomaton {
        let g = self.grammar;
        let mut seed: FxHashMap<Core, FxHashSet<SymbolId>> = FxHashMap::default();
        for &p in g.productions_of(g.start) {
            seed.entry((p, 0)).or_default().insert(g.end);
        }
        closure(g, &mut seed);

        let mut states: IndexVec<StateId, LrState> = IndexVec::new();
        let mut index_of: FxHashMap<Vec<(Core, Vec<SymbolId>)>, StateId> = FxHashMap::default();
        let start_id = states.push(LrState {
            items: seed.clone(),
            transitions: FxHashMap::default(),
        });
        index_of.insert(full_key(&seed), start_id);

        let mut worklist = vec![start_id];
        while let Some(state_id) = worklist.pop() {
            let items = states[state_id].items.clone();
            let mut symbols_after_dot: FxHashSet<SymbolId> = FxHashSet::default();
            for &(prod_id, dot) in items.keys() {
                let prod = g.production(prod_id);
                if dot < prod.rhs.len() {
                    symbols_after_dot.insert(prod.rhs[dot]);
                }
            }
            for x in symbols_after_dot {
                let target_items = goto(g, &items, x);
                if target_items.is_empty() {
                    continue;
                }
                let key = full_key(&target_items);
                let target_id = if let Some(&existing) = index_of.get(&key) {
                    existing
                } else {
                    let id = states.push(LrState {
                        items: target_items,
                        transitions: FxHashMap::default(),
                    });
                    index_of.insert(key, id);
                    worklist.push(id);
                    id
                };
                states[state_id].transitions.insert(x, target_id);
            }
        }

        LrAutomaton { states }
    }

    /// Step 3: collapse states sharing a core into one, union their
    /// lookaheads, and re-route every transition to the representative.
    fn merge_same_core_states(&self, canonical: LrAutomaton) -> LrAutomaton {
        let mut groups: FxHashMap<Vec<Core>, Vec<StateId>> = FxHashMap::default();
        for (id, state) in canonical.states.iter_enumerated() {
            groups.entry(core_key(&state.items)).or_default().push(id);
        }

        // old state id -> merged state's new index
        let mut remap: FxHashMap<StateId, usize> = FxHashMap::default();
        let mut merged_items: Vec<FxHashMap<Core, FxHashSet<SymbolId>>> = Vec::new();
        let mut merged_old_members: Vec<Vec<StateId>> = Vec::new();

        for members in groups.values() {
            let new_index = merged_items.len();
            let mut union_items: FxHashMap<Core, FxHashSet<SymbolId>> = FxHashMap::default();
            for &old_id in members {
                for (core, la) in &canonical.states[old_id].items {
                    let entry = union_items.entry(*core).or_default();
                    for &t in la {
                        entry.insert(t);
                    }
                }
                remap.insert(old_id, new_index);
            }
            merged_items.push(union_items);
            merged_old_members.push(members.clone());
        }

        let mut states: IndexVec<StateId, LrState> = IndexVec::new();
        for items in merged_items {
            states.push(LrState {
                items,
                transitions: FxHashMap::default(),
            });
        }
        for (new_index, members) in merged_old_members.iter().enumerate() {
            let mut transitions: FxHashMap<SymbolId, StateId> = FxHashMap::default();
            for &old_id in members {
                for (&sym, &old_target) in &canonical.states[old_id].transitions {
                    let new_target = StateId(remap[&old_target] as u32);
                    transitions.insert(sym, new_target);
                }
            }
            states[StateId(new_index as u32)].transitions = transitions;
        }

        LrAutomaton { states }
    }

    /// Step 4: fixed-point lookahead propagation, a safety net over
    /// the merge above (see module docs) — recomputes each state's
    /// internal closure (now that its own lookaheads may have grown)
    /// and ensures every `goto` target's lookaheads are a superset of
    /// what a fresh `goto` from the (possibly-grown) source produces.
    fn propagate_lookaheads(&self, mut automaton: LrAutomaton) -> LrAutomaton {
        let g = self.grammar;
        loop {
            let mut changed = false;
            for state in automaton.states.as_mut_slice() {
                let before = state.items.clone();
                closure(g, &mut state.items);
                if state.items.len() != before.len()
                    || state.items.iter().any(|(c, l)| {
                        before.get(c).map(|b| b.len() != l.len()).unwrap_or(true)
                    })
                {
                    changed = true;
                }
            }
            let transitions: Vec<(StateId, SymbolId, StateId)> = automaton
                .states
                .iter_enumerated()
                .flat_map(|(id, s)| s.transitions.iter().map(move |(&x, &t)| (id, x, t)))
                .collect();
            for (src, x, dst) in transitions {
                let fresh = goto(g, &automaton.states[src].items, x);
                let target = &mut automaton.states[dst];
                for (core, la) in fresh {
                    let entry = target.items.entry(core).or_default();
                    for t in la {
                        if entry.insert(t) {
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        automaton
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
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
    fn builds_a_nonempty_automaton_with_well_formed_transitions() {
        let g = expr_grammar();
        let automaton = LalrBuilder::new(&g).build();
        assert!(!automaton.states.is_empty());
        let num_states = automaton.states.len();
        for state in automaton.states.as_slice() {
            for &target in state.transitions.values() {
                assert!(target.index() < num_states);
            }
        }
    }

    #[test]
    fn start_state_contains_seed_items_for_every_start_production() {
        let g = expr_grammar();
        let automaton = LalrBuilder::new(&g).build();
        let start = &automaton.states[StateId(0)];
        let start_prods = g.productions_of(g.start);
        for &p in start_prods {
            assert!(start.items.contains_key(&(p, 0)));
        }
    }

    #[test]
    fn merge_never_increases_state_count_beyond_canonical() {
        let g = expr_grammar();
        let builder = LalrBuilder::new(&g);
        let canonical = builder.build_canonical_collection();
        let canonical_count = canonical.states.len();
        let merged = builder.merge_same_core_states(canonical);
        assert!(merged.states.len() <= canonical_count);
    }
}
