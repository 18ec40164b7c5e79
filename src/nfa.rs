use itertools::Itertools;
use tracing::trace;

use crate::alphabet::{Alphabet, Symbol};
use crate::dfa::{Dfa, DfaTable};
use crate::dot::{Digraph, FaDotBuilder};
use crate::error::Error;
use crate::machine::{Automaton, Status};
use crate::math::{self, Map, Set};
use crate::shell::NfaShell;

/// Transition table of an NFA: a set of destinations per (state, symbol),
/// where the symbol may be ε.
pub type NfaTable = Map<String, Map<Symbol, Set<String>>>;

/// A nondeterministic finite automaton with ε-transitions, together with its
/// runtime state: a set of current states.
///
/// As with [`Dfa`], the structure is immutable after construction. The
/// simulator applies ε-closure around every input step, so callers only ever
/// observe closed state sets. Transformations
/// ([`expand_epsilon`](Nfa::expand_epsilon),
/// [`subset_construction`](Nfa::subset_construction),
/// [`minimize`](Nfa::minimize), [`reversed`](Nfa::reversed),
/// [`complement`](Nfa::complement)) return fresh machines and never touch
/// their input's runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) states: Set<String>,
    pub(crate) chars: Alphabet,
    pub(crate) start_states: Set<String>,
    pub(crate) accept_states: Set<String>,
    pub(crate) transitions: NfaTable,
    pub(crate) current_states: Set<String>,
    pub(crate) status: Status,
}

impl Nfa {
    /// Starts building an NFA.
    pub fn builder() -> NfaBuilder {
        NfaBuilder::default()
    }

    /// The current state set; empty once a run has died.
    pub fn current_states(&self) -> &Set<String> {
        &self.current_states
    }

    /// The state set Q.
    pub fn states(&self) -> &Set<String> {
        &self.states
    }

    /// The alphabet Σ; empty means universe.
    pub fn chars(&self) -> &Alphabet {
        &self.chars
    }

    /// The start state set S₀.
    pub fn start_states(&self) -> &Set<String> {
        &self.start_states
    }

    /// The accept states F.
    pub fn accept_states(&self) -> &Set<String> {
        &self.accept_states
    }

    /// The transition table Δ.
    pub fn transitions(&self) -> &NfaTable {
        &self.transitions
    }

    /// Forces the current state set. Fails with [`Error::InvalidState`] if
    /// any of the given states is unknown. An empty set is allowed and
    /// leaves the run dead.
    pub fn set_states<I, S>(&mut self, states: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let states: Set<String> = states.into_iter().map(Into::into).collect();
        if !math::is_subset(&states, &self.states) {
            return Err(Error::InvalidState);
        }
        self.current_states = states;
        self.status = Status::Ready;
        Ok(())
    }

    /// Consumes one input symbol.
    ///
    /// Fails with [`Error::InvalidInputChar`] if a declared alphabet does
    /// not admit `x`, and with [`Error::EmptyStates`] if the current state
    /// set is (or becomes) empty. ε-closure is applied both before and
    /// after the symbol step; the pre-step closure makes
    /// [`set_states`](Nfa::set_states) safe on arbitrary caller-supplied
    /// sets.
    pub fn put(&mut self, x: char) -> Result<(), Error> {
        if !self.chars.admits(x) {
            return Err(Error::InvalidInputChar);
        }
        if self.current_states.is_empty() {
            self.status = Status::Dead;
            return Err(Error::EmptyStates);
        }
        if self.has_epsilon() {
            self.current_states = self.settle_epsilon(&self.current_states);
        }
        let mut next = Set::new();
        for q in &self.current_states {
            if let Some(tos) = self.transitions.get(q).and_then(|row| row.get(&Symbol::Char(x))) {
                next.extend(tos.iter().cloned());
            }
        }
        self.current_states = if self.has_epsilon() {
            self.settle_epsilon(&next)
        } else {
            next
        };
        trace!(symbol = %x, states = %self.current_states.iter().join(","), "nfa step");
        if self.current_states.is_empty() {
            self.status = Status::Dead;
            return Err(Error::EmptyStates);
        }
        self.status = Status::Running;
        Ok(())
    }

    /// Returns true if any current state is accepting.
    pub fn is_accepted(&self) -> bool {
        math::intersects(&self.current_states, &self.accept_states)
    }

    /// Returns the current state set to the start states.
    pub fn reset(&mut self) {
        self.current_states = self.start_states.clone();
        self.status = Status::Ready;
    }

    /// Runs the machine on `input` from a fresh reset and reports whether
    /// it ends accepting.
    pub fn accepts(&mut self, input: &str) -> bool {
        self.reset();
        for c in input.chars() {
            if self.put(c).is_err() {
                return false;
            }
        }
        self.is_accepted()
    }

    /// Returns true if the table contains any ε-edge.
    pub fn has_epsilon(&self) -> bool {
        self.transitions
            .values()
            .any(|row| row.contains_key(&Symbol::Epsilon))
    }

    /// Returns true if this NFA is structurally a DFA: ε-free, exactly one
    /// start state and every destination set a singleton.
    pub fn is_dfa(&self) -> bool {
        if self.has_epsilon() || self.start_states.len() != 1 {
            return false;
        }
        self.transitions
            .values()
            .all(|row| row.values().all(|tos| tos.len() == 1))
    }

    /// Projects this NFA to a [`Dfa`]. Fails with [`Error::NotDfa`] unless
    /// [`is_dfa`](Nfa::is_dfa) holds.
    pub fn to_dfa(&self) -> Result<Dfa, Error> {
        if !self.is_dfa() {
            return Err(Error::NotDfa);
        }
        let mut transitions = DfaTable::new();
        for (from, row) in &self.transitions {
            let mut r = Map::new();
            for (sym, tos) in row {
                // is_dfa guarantees a non-ε symbol and a singleton set
                let c = sym.as_char().ok_or(Error::NotDfa)?;
                let to = tos.first().ok_or(Error::NotDfa)?;
                r.insert(c, to.clone());
            }
            transitions.insert(from.clone(), r);
        }
        let start = self.start_states.first().ok_or(Error::NotDfa)?;
        Dfa::builder()
            .with_states(math::sorted(&self.states))
            .with_chars(self.chars.iter())
            .with_start_state(start.clone())
            .with_accept_states(math::sorted(&self.accept_states))
            .with_transitions(transitions)
            .build()
    }

    /// The machine with every edge flipped and start and accept states
    /// swapped. The new current state set is the new start states.
    pub fn reversed(&self) -> Nfa {
        let mut transitions = NfaTable::new();
        for (from, row) in &self.transitions {
            for (sym, tos) in row {
                for to in tos {
                    transitions
                        .entry(to.clone())
                        .or_default()
                        .entry(*sym)
                        .or_default()
                        .insert(from.clone());
                }
            }
        }
        Nfa {
            states: self.states.clone(),
            chars: self.chars.clone(),
            start_states: self.accept_states.clone(),
            accept_states: self.start_states.clone(),
            transitions,
            current_states: self.accept_states.clone(),
            status: Status::Ready,
        }
    }

    /// The machine with accept states complemented: the new F is Q \ F.
    ///
    /// This is a structural primitive. It yields the language complement
    /// only on a complete DFA; on anything else missing transitions are
    /// implicitly dead in both machines. Callers wanting a true complement
    /// must determinize and complete first.
    pub fn complement(&self) -> Nfa {
        let accept_states = self
            .states
            .iter()
            .filter(|q| !self.accept_states.contains(*q))
            .cloned()
            .collect();
        Nfa {
            states: self.states.clone(),
            chars: self.chars.clone(),
            start_states: self.start_states.clone(),
            accept_states,
            transitions: self.transitions.clone(),
            current_states: self.start_states.clone(),
            status: Status::Ready,
        }
    }

    /// The additive ε-closure of `seed`: the least superset closed under
    /// ε-transitions. Used by the transforms.
    pub(crate) fn epsilon_closure(&self, seed: &Set<String>) -> Set<String> {
        let mut closed = seed.clone();
        let mut frontier: Vec<String> = closed.iter().cloned().collect();
        while let Some(q) = frontier.pop() {
            if let Some(tos) = self.transitions.get(&q).and_then(|row| row.get(&Symbol::Epsilon)) {
                for t in tos {
                    if closed.insert(t.clone()) {
                        frontier.push(t.clone());
                    }
                }
            }
        }
        closed
    }

    /// The closure the simulator applies while running: every state with an
    /// outgoing ε-edge is replaced by that edge's targets, to fixpoint. The
    /// result is the set of ε-reachable states that have no ε-edge of their
    /// own, so ε-source states never linger in the current set.
    fn settle_epsilon(&self, seed: &Set<String>) -> Set<String> {
        self.epsilon_closure(seed)
            .into_iter()
            .filter(|q| {
                !self
                    .transitions
                    .get(q)
                    .is_some_and(|row| row.contains_key(&Symbol::Epsilon))
            })
            .collect()
    }
}

impl From<&Dfa> for Nfa {
    /// Lifts a DFA into an NFA with singleton destination sets. The lifted
    /// machine starts at the DFA's start state.
    fn from(dfa: &Dfa) -> Self {
        let mut transitions = NfaTable::new();
        for (from, row) in dfa.transitions() {
            let mut r: Map<Symbol, Set<String>> = Map::new();
            for (sym, to) in row {
                r.insert(Symbol::Char(*sym), Set::from_iter([to.clone()]));
            }
            transitions.insert(from.clone(), r);
        }
        let start_states: Set<String> = Set::from_iter([dfa.start_state().to_string()]);
        Nfa {
            states: dfa.states().clone(),
            chars: dfa.chars().clone(),
            current_states: start_states.clone(),
            start_states,
            accept_states: dfa.accept_states().clone(),
            transitions,
            status: Status::Ready,
        }
    }
}

impl Automaton for Nfa {
    type Shell = NfaShell;

    fn describe(&self) -> String {
        format!(
            "NFA({} states, {} symbols, {} start, {} accepting{})",
            self.states.len(),
            self.chars.size(),
            self.start_states.len(),
            self.accept_states.len(),
            if self.has_epsilon() { ", ε" } else { "" }
        )
    }

    fn to_shell(&self) -> NfaShell {
        NfaShell::of(self)
    }

    fn to_dot(&self) -> Result<Digraph, Error> {
        let mut b = FaDotBuilder::default()
            .with_start_states(math::sorted(&self.start_states))
            .with_states(math::sorted(&self.states))
            .with_accept_states(math::sorted(&self.accept_states));
        for (from, row) in &self.transitions {
            for (sym, tos) in row {
                for to in tos {
                    b = b.with_transition(from.clone(), *sym, to.clone());
                }
            }
        }
        b.build()
    }

    fn status(&self) -> Status {
        self.status
    }
}

/// Staged configuration for an [`Nfa`]; [`build`](NfaBuilder::build)
/// validates the declaration and produces the machine.
#[derive(Debug, Default)]
pub struct NfaBuilder {
    states: Vec<String>,
    chars: Vec<char>,
    start_states: Vec<String>,
    accept_states: Vec<String>,
    transitions: NfaTable,
}

impl NfaBuilder {
    /// Declares the state set Q.
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the alphabet Σ. Omitting this leaves the universe.
    pub fn with_chars<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
        self.chars = chars.into_iter().collect();
        self
    }

    /// Declares the start states. Must be a subset of Q.
    pub fn with_start_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the accept states. Must be a subset of Q.
    pub fn with_accept_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept_states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Adds transitions as `(from, symbol, to)` triples; destinations for
    /// the same `(from, symbol)` pair accumulate.
    pub fn with_edges<I, S, T>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (S, char, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        for (from, sym, to) in edges {
            self.push_edge(from.into(), Symbol::Char(sym), to.into());
        }
        self
    }

    /// Adds ε-transitions as `(from, to)` pairs.
    pub fn with_epsilon_edges<I, S, T>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        for (from, to) in edges {
            self.push_edge(from.into(), Symbol::Epsilon, to.into());
        }
        self
    }

    /// Replaces the whole transition table. Used by the shell layer.
    pub fn with_transitions(mut self, transitions: NfaTable) -> Self {
        self.transitions = transitions;
        self
    }

    fn push_edge(&mut self, from: String, sym: Symbol, to: String) {
        self.transitions
            .entry(from)
            .or_default()
            .entry(sym)
            .or_default()
            .insert(to);
    }

    /// Validates the declaration and produces the machine.
    pub fn build(self) -> Result<Nfa, Error> {
        let states: Set<String> = self.states.into_iter().collect();
        let start_states: Set<String> = self.start_states.into_iter().collect();
        if !math::is_subset(&start_states, &states) {
            return Err(Error::InvalidStartStates);
        }
        let accept_states: Set<String> = self.accept_states.into_iter().collect();
        if !math::is_subset(&accept_states, &states) {
            return Err(Error::InvalidAcceptStates);
        }

        let chars = Alphabet::new(self.chars);
        let mut transitions = NfaTable::new();
        for (from, row) in self.transitions {
            // empty destination sets are dropped, and states whose map ends
            // up empty get no entry at all
            let row: Map<Symbol, Set<String>> =
                row.into_iter().filter(|(_, tos)| !tos.is_empty()).collect();
            if row.is_empty() {
                continue;
            }
            if !states.contains(&from) {
                return Err(Error::InvalidTransitions);
            }
            for (sym, tos) in &row {
                if !math::is_subset(tos, &states) {
                    return Err(Error::InvalidTransitions);
                }
                if let Some(c) = sym.as_char() {
                    if !chars.is_universe() && !chars.contains(c) {
                        return Err(Error::InvalidTransitions);
                    }
                }
            }
            transitions.insert(from, row);
        }

        Ok(Nfa {
            current_states: start_states.clone(),
            states,
            chars,
            start_states,
            accept_states,
            transitions,
            status: Status::Ready,
        })
    }
}
