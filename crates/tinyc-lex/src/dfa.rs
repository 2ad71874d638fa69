//! The hand-assembled recognizer (§4.1).
//!
//! Grounded on `original_source/src/lexer/dfa.h`'s `DFAState`/`DFA`/
//! `DFABuilder`. States are addressed by a typed index rather than the
//! original's raw pointers (§9 "State representation in the automaton").

use tinyc_util::{define_idx, FxHashMap, IndexVec};

use crate::token::{TokenKind, KEYWORD_SPELLINGS};

define_idx!(StateId);

/// Whether a state is a plain transit state, accepts a token, or is a
/// dead end with no useful outgoing transitions. Ports `DFAStateType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    Normal,
    Accepting,
    Error,
}

/// One automaton state: its classification, the token kind it accepts
/// (if any), and a byte-keyed transition map. Ports `DFAState`.
#[derive(Clone, Debug)]
pub struct DfaState {
    pub id: StateId,
    pub classification: StateKind,
    pub token_kind: Option<TokenKind>,
    pub transitions: FxHashMap<u8, StateId>,
}

impl DfaState {
    fn new(id: StateId) -> Self {
        Self {
            id,
            classification: StateKind::Normal,
            token_kind: None,
            transitions: FxHashMap::default(),
        }
    }

    fn mark_accepting(&mut self, kind: TokenKind) {
        self.classification = StateKind::Accepting;
        self.token_kind = Some(kind);
    }
}

/// The composed recognizer: an arena of states plus a distinguished
/// start state and a cursor (`current`) used while feeding bytes. Ports
/// `DFA`.
#[derive(Clone, Debug)]
pub struct Dfa {
    states: IndexVec<StateId, DfaState>,
    start: StateId,
    current: StateId,
}

impl Dfa {
    pub fn new() -> Self {
        let mut states = IndexVec::new();
        let start = states.push(DfaState::new(StateId::from_usize(0)));
        Self {
            states,
            start,
            current: start,
        }
    }

    pub fn start_state(&self) -> StateId {
        self.start
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateId) -> &DfaState {
        &self.states[id]
    }

    pub fn states(&self) -> &IndexVec<StateId, DfaState> {
        &self.states
    }

    /// Allocates a fresh, unclassified state.
    pub fn new_state(&mut self) -> StateId {
        let id = StateId::from_usize(self.states.len());
        self.states.push(DfaState::new(id))
    }

    pub fn mark_accepting(&mut self, state: StateId, kind: TokenKind) {
        self.states[state].mark_accepting(kind);
    }

    pub fn mark_error(&mut self, state: StateId) {
        self.states[state].classification = StateKind::Error;
    }

    /// Adds a single-byte transition, ported from `DFAState::addTransition`.
    pub fn add_transition(&mut self, from: StateId, byte: u8, to: StateId) {
        self.states[from].transitions.insert(byte, to);
    }

    /// Adds a transition for every byte in `lo..=hi`, ported from
    /// `DFAState::addRangeTransition`.
    pub fn add_range_transition(&mut self, from: StateId, lo: u8, hi: u8, to: StateId) {
        for b in lo..=hi {
            self.add_transition(from, b, to);
        }
    }

    /// Follows (or lazily creates) the transition chain for `text`
    /// starting at `from`, reusing any state already wired for a
    /// shared prefix, and marks the final state accepting with `kind`.
    /// Ported from `DFAState::addStringTransition`.
    pub fn add_string_transition(&mut self, from: StateId, text: &str, kind: TokenKind) -> StateId {
        let mut current = from;
        for byte in text.bytes() {
            current = match self.states[current].transitions.get(&byte) {
                Some(&next) => next,
                None => {
                    let next = self.new_state();
                    self.add_transition(current, byte, next);
                    next
                }
            };
        }
        self.mark_accepting(current, kind);
        current
    }

    /// Resets the feed cursor to the start state.
    pub fn reset(&mut self) {
        self.current = self.start;
    }

    /// Attempts to follow the transition for `byte` from the current
    /// state. Returns whether a transition existed; if so the cursor
    /// advances, otherwise it is left unchanged (§4.1 contract).
    pub fn feed(&mut self, byte: u8) -> bool {
        match self.states[self.current].transitions.get(&byte) {
            Some(&next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.states[self.current].classification == StateKind::Accepting
    }

    pub fn current_token_kind(&self) -> Option<TokenKind> {
        self.states[self.current].token_kind
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Runs maximal-munch tokenization of `source` using this DFA
    /// alone, applying the §4.1 longest-accepting-prefix edge policy
    /// and skipping ASCII whitespace between lexemes. Bytes that match
    /// no accepting prefix are skipped one at a time. Used only by the
    /// minimizer's equivalence check and its property tests — the
    /// pragmatic `Lexer` driver (§4.3) does not route through this.
    pub fn tokenize(&mut self, source: &str) -> Vec<TokenKind> {
        let bytes = source.as_bytes();
        let mut out = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i].is_ascii_whitespace() {
                i += 1;
                continue;
            }
            self.reset();
            let mut last_accept: Option<(usize, TokenKind)> = None;
            let mut j = i;
            while j < bytes.len() && self.feed(bytes[j]) {
                j += 1;
                if self.is_accepting() {
                    last_accept = Some((j, self.current_token_kind().unwrap()));
                }
            }
            match last_accept {
                Some((end, kind)) => {
                    out.push(kind);
                    i = end;
                }
                None => i += 1,
            }
        }
        out
    }

    /// Confirms every transition target is a valid state index and
    /// every accepting state carries a token kind. Ports `DFA::validate`.
    pub fn validate(&self) -> Result<(), String> {
        for (id, state) in self.states.iter_enumerated() {
            if state.classification == StateKind::Accepting && state.token_kind.is_none() {
                return Err(format!("state {:?} is accepting but has no token kind", id));
            }
            for (&byte, &target) in &state.transitions {
                if self.states.get(target).is_none() {
                    return Err(format!(
                        "state {:?} transitions on byte {byte} to out-of-range state {:?}",
                        id, target
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

const IDENT_START: (u8, u8) = (b'a', b'z');
const IDENT_START_UPPER: (u8, u8) = (b'A', b'Z');
const DIGIT: (u8, u8) = (b'0', b'9');

/// Assembles the sub-automata of §4.1 into one composed `Dfa`. Ports
/// `DFABuilder`/`DFA::buildStandardDFA`.
pub struct DfaBuilder {
    dfa: Dfa,
}

impl DfaBuilder {
    pub fn new() -> Self {
        Self { dfa: Dfa::new() }
    }

    /// Builds the full lexer DFA: identifiers (with the keyword
    /// spellings overlaid), numbers, operators, punctuators, string
    /// literals, and line comments, all sharing the single start state.
    pub fn build_lexer_dfa() -> Dfa {
        let mut builder = Self::new();
        builder.build_identifier_automaton();
        builder.build_number_automaton();
        builder.build_operator_and_punctuator_automaton();
        builder.build_string_automaton();
        builder.build_comment_automaton();
        debug_assert!(builder.dfa.validate().is_ok());
        builder.dfa
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, with every keyword spelling overlaid
    /// as a dedicated path through the same states (§4.1 "Keyword
    /// spellings are overlaid as dedicated paths").
    fn build_identifier_automaton(&mut self) {
        let start = self.dfa.start_state();
        let ident_loop = self.dfa.new_state();
        self.dfa.mark_accepting(ident_loop, TokenKind::Identifier);
        for (lo, hi) in [IDENT_START, IDENT_START_UPPER, DIGIT] {
            self.dfa.add_range_transition(ident_loop, lo, hi, ident_loop);
        }
        self.dfa.add_transition(ident_loop, b'_', ident_loop);

        // Overlay keyword spellings as a trie rooted at `start`,
        // reusing shared-prefix states (e.g. "if"/"int" both begin at
        // the same post-'i' state).
        for &(spelling, kind) in KEYWORD_SPELLINGS {
            self.dfa.add_string_transition(start, spelling, kind);
        }

        // Every trie state synthesized above (and the start state
        // itself) needs a fallback into the generic identifier loop
        // for any identifier-continuation byte the trie doesn't
        // already cover — otherwise "iffy" would have no transition
        // past the shared "if" prefix.
        let trie_states: Vec<StateId> = self.dfa.states.indices().collect();
        for state in trie_states {
            if state == ident_loop {
                continue;
            }
            for (lo, hi) in [IDENT_START, IDENT_START_UPPER, DIGIT] {
                for byte in lo..=hi {
                    self.dfa.states[state]
                        .transitions
                        .entry(byte)
                        .or_insert(ident_loop);
                }
            }
            self.dfa.states[state]
                .transitions
                .entry(b'_')
                .or_insert(ident_loop);
        }

        // `start` itself must not fall back into the identifier loop
        // for bytes already claimed by other sub-automata (digits are
        // the start of a number, not an identifier) — only letters and
        // `_` may begin an identifier.
        self.dfa.states[start].transitions.retain(|&byte, &mut target| {
            target != ident_loop || byte.is_ascii_alphabetic() || byte == b'_'
        });
    }

    /// Digits, optional `.` then digits → `Int` or `Real`.
    fn build_number_automaton(&mut self) {
        let start = self.dfa.start_state();
        let int_state = self.dfa.new_state();
        self.dfa.mark_accepting(int_state, TokenKind::Int);
        self.dfa.add_range_transition(start, DIGIT.0, DIGIT.1, int_state);
        self.dfa.add_range_transition(int_state, DIGIT.0, DIGIT.1, int_state);

        let dot_state = self.dfa.new_state();
        self.dfa.add_transition(int_state, b'.', dot_state);

        let real_state = self.dfa.new_state();
        self.dfa.mark_accepting(real_state, TokenKind::Real);
        self.dfa.add_range_transition(dot_state, DIGIT.0, DIGIT.1, real_state);
        self.dfa.add_range_transition(real_state, DIGIT.0, DIGIT.1, real_state);
    }

    /// Single- and double-character operators and the nine punctuators.
    fn build_operator_and_punctuator_automaton(&mut self) {
        let start = self.dfa.start_state();

        let mut simple = |dfa: &mut Dfa, byte: u8, kind: TokenKind| {
            let s = dfa.new_state();
            dfa.mark_accepting(s, kind);
            dfa.add_transition(start, byte, s);
        };
        for (byte, kind) in [
            (b';', TokenKind::Semi),
            (b',', TokenKind::Comma),
            (b'(', TokenKind::LParen),
            (b')', TokenKind::RParen),
            (b'{', TokenKind::LBrace),
            (b'}', TokenKind::RBrace),
            (b'[', TokenKind::LBracket),
            (b']', TokenKind::RBracket),
            (b'.', TokenKind::Dot),
            (b':', TokenKind::Colon),
        ] {
            simple(&mut self.dfa, byte, kind);
        }

        let mut maybe_assign = |dfa: &mut Dfa, byte: u8, alone: TokenKind, with_eq: TokenKind| {
            let plain = dfa.new_state();
            dfa.mark_accepting(plain, alone);
            dfa.add_transition(start, byte, plain);
            let assigned = dfa.new_state();
            dfa.mark_accepting(assigned, with_eq);
            dfa.add_transition(plain, b'=', assigned);
        };
        maybe_assign(&mut self.dfa, b'+', TokenKind::Plus, TokenKind::PlusAssign);
        maybe_assign(&mut self.dfa, b'-', TokenKind::Minus, TokenKind::MinusAssign);
        maybe_assign(&mut self.dfa, b'*', TokenKind::Star, TokenKind::StarAssign);
        maybe_assign(&mut self.dfa, b'%', TokenKind::Percent, TokenKind::PercentAssign);
        maybe_assign(&mut self.dfa, b'=', TokenKind::Assign, TokenKind::Eq);
        maybe_assign(&mut self.dfa, b'!', TokenKind::Not, TokenKind::NotEq);
        maybe_assign(&mut self.dfa, b'<', TokenKind::Lt, TokenKind::LtEq);
        maybe_assign(&mut self.dfa, b'>', TokenKind::Gt, TokenKind::GtEq);

        // `&&` / `||`: the single character alone is not a token of
        // this language, so the intermediate state is not accepting.
        let amp = self.dfa.new_state();
        self.dfa.add_transition(start, b'&', amp);
        let andand = self.dfa.new_state();
        self.dfa.mark_accepting(andand, TokenKind::AndAnd);
        self.dfa.add_transition(amp, b'&', andand);

        let pipe = self.dfa.new_state();
        self.dfa.add_transition(start, b'|', pipe);
        let oror = self.dfa.new_state();
        self.dfa.mark_accepting(oror, TokenKind::OrOr);
        self.dfa.add_transition(pipe, b'|', oror);
    }

    /// Double-quoted, no embedded newline; only the closing quote
    /// accepts. An unterminated string is simply not accepted by this
    /// automaton — the driver's dedicated string scanner (§4.3) is
    /// responsible for the `unterminated string literal` diagnostic.
    fn build_string_automaton(&mut self) {
        let start = self.dfa.start_state();
        let open = self.dfa.new_state();
        self.dfa.add_transition(start, b'"', open);
        for byte in 0u8..=255 {
            if byte != b'"' && byte != b'\n' {
                self.dfa.add_transition(open, byte, open);
            }
        }
        let closed = self.dfa.new_state();
        self.dfa.mark_accepting(closed, TokenKind::Str);
        self.dfa.add_transition(open, b'"', closed);
    }

    /// `//` to end of line.
    fn build_comment_automaton(&mut self) {
        let start = self.dfa.start_state();
        let slash_owner = self
            .dfa
            .states
            .get(start)
            .and_then(|s| s.transitions.get(&b'/'))
            .copied();
        let slash_state = slash_owner.unwrap_or_else(|| {
            let s = self.dfa.new_state();
            self.dfa.add_transition(start, b'/', s);
            s
        });
        if self.dfa.state(slash_state).token_kind.is_none() {
            self.dfa.mark_accepting(slash_state, TokenKind::Slash);
        }

        let comment = self.dfa.new_state();
        self.dfa.mark_accepting(comment, TokenKind::Comment);
        self.dfa.add_transition(slash_state, b'/', comment);
        for byte in 0u8..=255 {
            if byte != b'\n' {
                self.dfa.add_transition(comment, byte, comment);
            }
        }

        let slash_assign = self.dfa.new_state();
        self.dfa.mark_accepting(slash_assign, TokenKind::SlashAssign);
        self.dfa.add_transition(slash_state, b'=', slash_assign);
    }
}

impl Default for DfaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates() {
        let dfa = DfaBuilder::build_lexer_dfa();
        assert!(dfa.validate().is_ok());
    }

    #[test]
    fn tokenizes_keywords_and_identifiers() {
        let mut dfa = DfaBuilder::build_lexer_dfa();
        assert_eq!(dfa.tokenize("if"), vec![TokenKind::KwIf]);
        assert_eq!(dfa.tokenize("iffy"), vec![TokenKind::Identifier]);
        assert_eq!(dfa.tokenize("int"), vec![TokenKind::KwInt]);
        assert_eq!(dfa.tokenize("intake"), vec![TokenKind::Identifier]);
        assert_eq!(dfa.tokenize("x"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn tokenizes_numbers() {
        let mut dfa = DfaBuilder::build_lexer_dfa();
        assert_eq!(dfa.tokenize("42"), vec![TokenKind::Int]);
        assert_eq!(dfa.tokenize("3.14"), vec![TokenKind::Real]);
    }

    #[test]
    fn tokenizes_operators() {
        let mut dfa = DfaBuilder::build_lexer_dfa();
        assert_eq!(dfa.tokenize("+"), vec![TokenKind::Plus]);
        assert_eq!(dfa.tokenize("+="), vec![TokenKind::PlusAssign]);
        assert_eq!(dfa.tokenize("=="), vec![TokenKind::Eq]);
        assert_eq!(dfa.tokenize("&&"), vec![TokenKind::AndAnd]);
        assert_eq!(dfa.tokenize("||"), vec![TokenKind::OrOr]);
    }

    #[test]
    fn tokenizes_strings_and_comments() {
        let mut dfa = DfaBuilder::build_lexer_dfa();
        assert_eq!(dfa.tokenize("\"hi\""), vec![TokenKind::Str]);
        assert_eq!(dfa.tokenize("// a comment"), vec![TokenKind::Comment]);
    }

    #[test]
    fn string_transition_shares_prefix_states() {
        let mut dfa = Dfa::new();
        let start = dfa.start_state();
        let s1 = dfa.add_string_transition(start, "if", TokenKind::KwIf);
        let s2 = dfa.add_string_transition(start, "int", TokenKind::KwInt);
        assert_ne!(s1, s2);
        // both share the state reached after 'i'
        let after_i_via_if = dfa.state(start).transitions[&b'i'];
        assert_eq!(dfa.states.get(after_i_via_if).unwrap().transitions.len() > 0, true);
    }
}
