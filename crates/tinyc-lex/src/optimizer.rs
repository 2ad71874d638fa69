//! Pre-minimization DFA cleanup (§4.2 "DFAOptimizer").
//!
//! Grounded on `original_source/src/lexer/minimizer.h`'s
//! `DFAOptimizer::dfsReachable`/`dfsUseful`: the original ships these
//! as a richer pass than partition refinement alone, run first.

use tinyc_util::{FxHashMap, FxHashSet};

use crate::dfa::{Dfa, StateId, StateKind};

pub struct DfaOptimizer;

impl DfaOptimizer {
    /// Runs unreachable-state removal followed by dead-state removal.
    pub fn optimize(dfa: &Dfa) -> Dfa {
        let reachable = Self::remove_unreachable_states(dfa);
        Self::remove_dead_states(&reachable)
    }

    /// Forward DFS from the start state; states never reached by any
    /// input are dropped. Ported from `dfsReachable`.
    pub fn remove_unreachable_states(dfa: &Dfa) -> Dfa {
        let mut visited = FxHashSet::default();
        let mut stack = vec![dfa.start_state()];
        while let Some(state) = stack.pop() {
            if !visited.insert(state) {
                continue;
            }
            for &target in dfa.state(state).transitions.values() {
                if !visited.contains(&target) {
                    stack.push(target);
                }
            }
        }
        Self::rebuild_keeping(dfa, &visited)
    }

    /// Backward DFS over the reverse transition graph starting from
    /// every accepting state; states that can never reach an accept
    /// state are dead ends and are dropped. Ported from `dfsUseful`.
    pub fn remove_dead_states(dfa: &Dfa) -> Dfa {
        let mut reverse: FxHashMap<StateId, Vec<StateId>> = FxHashMap::default();
        for (id, state) in dfa.states().iter_enumerated() {
            for &target in state.transitions.values() {
                reverse.entry(target).or_default().push(id);
            }
        }

        let mut visited = FxHashSet::default();
        let mut stack: Vec<StateId> = dfa
            .states()
            .iter_enumerated()
            .filter(|(_, state)| state.classification == StateKind::Accepting)
            .map(|(id, _)| id)
            .collect();
        while let Some(state) = stack.pop() {
            if !visited.insert(state) {
                continue;
            }
            if let Some(preds) = reverse.get(&state) {
                for &pred in preds {
                    if !visited.contains(&pred) {
                        stack.push(pred);
                    }
                }
            }
        }
        // The start state is always kept even if it cannot itself
        // reach an accepting state (an empty-language DFA is still a
        // valid, well-formed automaton).
        visited.insert(dfa.start_state());
        Self::rebuild_keeping(dfa, &visited)
    }

    fn rebuild_keeping(dfa: &Dfa, keep: &FxHashSet<StateId>) -> Dfa {
        let mut ordered: Vec<StateId> = dfa
            .states()
            .indices()
            .filter(|state| keep.contains(state))
            .collect();
        if let Some(pos) = ordered.iter().position(|&s| s == dfa.start_state()) {
            ordered.swap(0, pos);
        }
        let index_of: FxHashMap<StateId, usize> = ordered
            .iter()
            .enumerate()
            .map(|(i, &s)| (s, i))
            .collect();

        let mut out = Dfa::new();
        let mut mapped = vec![out.start_state()];
        for _ in 1..ordered.len() {
            mapped.push(out.new_state());
        }

        for (i, &original_id) in ordered.iter().enumerate() {
            let original_state = dfa.state(original_id);
            if original_state.classification == StateKind::Accepting {
                out.mark_accepting(mapped[i], original_state.token_kind.unwrap());
            }
            for (&byte, &target) in &original_state.transitions {
                if let Some(&target_index) = index_of.get(&target) {
                    out.add_transition(mapped[i], byte, mapped[target_index]);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::DfaBuilder;
    use crate::minimizer::DfaMinimizer;

    #[test]
    fn optimized_dfa_still_validates_and_recognizes_tokens() {
        let dfa = DfaBuilder::build_lexer_dfa();
        let optimized = DfaOptimizer::optimize(&dfa);
        assert!(optimized.validate().is_ok());
        assert!(DfaMinimizer::validate_equivalence(
            &dfa,
            &optimized,
            &["if", "x", "42", "3.14", "+=", "\"s\"", "// c"]
        ));
    }

    #[test]
    fn unreachable_removal_never_grows_state_count() {
        let dfa = DfaBuilder::build_lexer_dfa();
        let reduced = DfaOptimizer::remove_unreachable_states(&dfa);
        assert!(reduced.state_count() <= dfa.state_count());
    }

    #[test]
    fn optimized_dfa_minimizes_to_the_same_result() {
        let dfa = DfaBuilder::build_lexer_dfa();
        let optimized = DfaOptimizer::optimize(&dfa);
        let (min_a, stats_a) = DfaMinimizer::minimize(&dfa);
        let (min_b, stats_b) = DfaMinimizer::minimize(&optimized);
        assert_eq!(stats_a.minimized_states, stats_b.minimized_states);
        assert_eq!(min_a.tokenize("return x;"), min_b.tokenize("return x;"));
    }
}
