use tracing::trace;

use crate::alphabet::Alphabet;
use crate::dot::{Digraph, FaDotBuilder};
use crate::error::Error;
use crate::machine::{Automaton, Status};
use crate::math::{self, Map, Set};
use crate::shell::DfaShell;

/// Transition table of a DFA: at most one destination per (state, symbol).
pub type DfaTable = Map<String, Map<char, String>>;

/// A deterministic finite automaton together with its runtime state.
///
/// The structure (states, alphabet, start state, accept states, transition
/// table) is immutable after construction; only the current state moves, via
/// [`put`](Dfa::put), [`reset`](Dfa::reset) and [`set_state`](Dfa::set_state).
///
/// # Example
///
/// A parity machine accepting strings with an odd number of `1`s:
///
/// ```
/// use machina::prelude::*;
///
/// let mut m = Dfa::builder()
///     .with_states(["even", "odd"])
///     .with_start_state("even")
///     .with_accept_states(["odd"])
///     .with_edges([
///         ("even", '0', "even"),
///         ("even", '1', "odd"),
///         ("odd", '0', "odd"),
///         ("odd", '1', "even"),
///     ])
///     .build()?;
///
/// assert_eq!(m.state(), "even");
/// m.put('1')?;
/// assert_eq!(m.state(), "odd");
/// assert!(m.is_accepted());
/// m.put('1')?;
/// assert!(!m.is_accepted());
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) states: Set<String>,
    pub(crate) chars: Alphabet,
    pub(crate) start_state: String,
    pub(crate) accept_states: Set<String>,
    pub(crate) transitions: DfaTable,
    pub(crate) current_state: String,
    pub(crate) status: Status,
}

impl Dfa {
    /// Starts building a DFA.
    pub fn builder() -> DfaBuilder {
        DfaBuilder::default()
    }

    /// The current state.
    pub fn state(&self) -> &str {
        &self.current_state
    }

    /// The state set Q.
    pub fn states(&self) -> &Set<String> {
        &self.states
    }

    /// The alphabet Σ; empty means universe.
    pub fn chars(&self) -> &Alphabet {
        &self.chars
    }

    /// The start state q₀.
    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    /// The accept states F.
    pub fn accept_states(&self) -> &Set<String> {
        &self.accept_states
    }

    /// The transition table δ.
    pub fn transitions(&self) -> &DfaTable {
        &self.transitions
    }

    /// Forces the current state. Fails with [`Error::InvalidState`] if the
    /// state is unknown.
    pub fn set_state(&mut self, state: &str) -> Result<(), Error> {
        if !self.states.contains(state) {
            return Err(Error::InvalidState);
        }
        self.current_state = state.to_string();
        self.status = Status::Ready;
        Ok(())
    }

    /// Consumes one input symbol.
    ///
    /// Fails with [`Error::InvalidInputChar`] if a declared alphabet does
    /// not admit `x`, and with [`Error::OutOfTransition`] if the current
    /// state has no transition on `x`. A failed transition lookup kills the
    /// run: every later `put` fails the same way until
    /// [`reset`](Dfa::reset) or [`set_state`](Dfa::set_state).
    pub fn put(&mut self, x: char) -> Result<(), Error> {
        if !self.chars.admits(x) {
            return Err(Error::InvalidInputChar);
        }
        if self.status.is_dead() {
            return Err(Error::OutOfTransition);
        }
        let next = self
            .transitions
            .get(&self.current_state)
            .and_then(|row| row.get(&x));
        match next {
            Some(next) => {
                trace!(from = %self.current_state, symbol = %x, to = %next, "dfa step");
                self.current_state = next.clone();
                self.status = Status::Running;
                Ok(())
            }
            None => {
                trace!(from = %self.current_state, symbol = %x, "dfa step fell off the table");
                self.status = Status::Dead;
                Err(Error::OutOfTransition)
            }
        }
    }

    /// Returns true if the current state is accepting.
    pub fn is_accepted(&self) -> bool {
        self.accept_states.contains(&self.current_state)
    }

    /// Returns the current state to the start state.
    pub fn reset(&mut self) {
        self.current_state = self.start_state.clone();
        self.status = Status::Ready;
    }

    /// Runs the machine on `input` from a fresh reset and reports whether
    /// it ends in an accept state. The run state is left where the input
    /// took it.
    pub fn accepts(&mut self, input: &str) -> bool {
        self.reset();
        for c in input.chars() {
            if self.put(c).is_err() {
                return false;
            }
        }
        self.is_accepted()
    }
}

impl Automaton for Dfa {
    type Shell = DfaShell;

    fn describe(&self) -> String {
        format!(
            "DFA({} states, {} symbols, {} accepting)",
            self.states.len(),
            self.chars.size(),
            self.accept_states.len()
        )
    }

    fn to_shell(&self) -> DfaShell {
        DfaShell::of(self)
    }

    fn to_dot(&self) -> Result<Digraph, Error> {
        let mut b = FaDotBuilder::default()
            .with_start_states([self.start_state.clone()])
            .with_states(math::sorted(&self.states))
            .with_accept_states(math::sorted(&self.accept_states));
        for (from, row) in &self.transitions {
            for (sym, to) in row {
                b = b.with_transition(from.clone(), (*sym).into(), to.clone());
            }
        }
        b.build()
    }

    fn status(&self) -> Status {
        self.status
    }
}

/// Staged configuration for a [`Dfa`]; [`build`](DfaBuilder::build)
/// validates the declaration and produces the machine.
#[derive(Debug, Default)]
pub struct DfaBuilder {
    states: Vec<String>,
    chars: Vec<char>,
    start_state: Option<String>,
    accept_states: Vec<String>,
    transitions: DfaTable,
}

impl DfaBuilder {
    /// Declares the state set Q.
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the alphabet Σ. Omitting this (or passing nothing) leaves
    /// the alphabet as the universe: every symbol is admitted.
    pub fn with_chars<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
        self.chars = chars.into_iter().collect();
        self
    }

    /// Declares the start state. Required; must be in Q.
    pub fn with_start_state(mut self, state: impl Into<String>) -> Self {
        self.start_state = Some(state.into());
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

    /// Adds transitions as `(from, symbol, to)` triples. A later triple for
    /// the same `(from, symbol)` pair overwrites an earlier one.
    pub fn with_edges<I, S, T>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (S, char, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        for (from, sym, to) in edges {
            self.transitions
                .entry(from.into())
                .or_default()
                .insert(sym, to.into());
        }
        self
    }

    /// Replaces the whole transition table. Used by the shell layer.
    pub fn with_transitions(mut self, transitions: DfaTable) -> Self {
        self.transitions = transitions;
        self
    }

    /// Validates the declaration and produces the machine.
    pub fn build(self) -> Result<Dfa, Error> {
        let states: Set<String> = self.states.into_iter().collect();
        let start_state = match self.start_state {
            Some(s) if states.contains(&s) => s,
            _ => return Err(Error::InvalidStartState),
        };
        let accept_states: Set<String> = self.accept_states.into_iter().collect();
        if !math::is_subset(&accept_states, &states) {
            return Err(Error::InvalidAcceptStates);
        }

        let chars = Alphabet::new(self.chars);
        let mut transitions = DfaTable::new();
        for (from, row) in self.transitions {
            if row.is_empty() {
                continue;
            }
            if !states.contains(&from) {
                return Err(Error::InvalidTransitions);
            }
            for (sym, to) in &row {
                if !states.contains(to) {
                    return Err(Error::InvalidTransitions);
                }
                if !chars.is_universe() && !chars.contains(*sym) {
                    return Err(Error::InvalidTransitions);
                }
            }
            transitions.insert(from, row);
        }

        Ok(Dfa {
            current_state: start_state.clone(),
            states,
            chars,
            start_state,
            accept_states,
            transitions,
            status: Status::Ready,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parity() -> Dfa {
        Dfa::builder()
            .with_states(["even", "odd"])
            .with_chars(['0', '1'])
            .with_start_state("even")
            .with_accept_states(["odd"])
            .with_edges([
                ("even", '0', "even"),
                ("even", '1', "odd"),
                ("odd", '0', "odd"),
                ("odd", '1', "even"),
            ])
            .build()
            .unwrap()
    }

    fn two_consecutive_ones() -> Dfa {
        Dfa::builder()
            .with_states(["start", "1", "11"])
            .with_start_state("start")
            .with_accept_states(["11"])
            .with_edges([
                ("start", '1', "1"),
                ("start", '0', "start"),
                ("1", '1', "11"),
                ("1", '0', "start"),
                ("11", '1', "11"),
                ("11", '0', "start"),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn build_rejects_unknown_start() {
        let err = Dfa::builder()
            .with_states(["a"])
            .with_start_state("b")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStartState));

        let err = Dfa::builder().with_states(["a"]).build().unwrap_err();
        assert!(matches!(err, Error::InvalidStartState));
    }

    #[test]
    fn build_rejects_unknown_accepts() {
        let err = Dfa::builder()
            .with_states(["a"])
            .with_start_state("a")
            .with_accept_states(["b"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAcceptStates));
    }

    #[test]
    fn build_rejects_bad_transitions() {
        // destination outside Q
        let err = Dfa::builder()
            .with_states(["a"])
            .with_start_state("a")
            .with_edges([("a", 'x', "b")])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransitions));

        // symbol outside a declared alphabet
        let err = Dfa::builder()
            .with_states(["a", "b"])
            .with_chars(['0'])
            .with_start_state("a")
            .with_edges([("a", 'x', "b")])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransitions));
    }

    #[test]
    fn minimum_dfa_has_no_transitions() {
        let mut m = Dfa::builder()
            .with_states(["s1"])
            .with_start_state("s1")
            .with_accept_states(["s1"])
            .build()
            .unwrap();
        assert!(m.is_accepted());
        // universe alphabet, so the failure is the missing transition
        assert!(matches!(m.put('a').unwrap_err(), Error::OutOfTransition));
        assert_eq!(m.status(), Status::Dead);
    }

    #[test_log::test]
    fn parity_scenario() {
        let mut m = parity();
        assert!(!m.accepts(""));
        assert!(m.accepts("1"));
        assert!(!m.accepts("1101100"));

        m.reset();
        assert!(m.put('1').is_ok());
        assert!(matches!(m.put('X').unwrap_err(), Error::InvalidInputChar));
        // the invalid character does not kill the run
        assert_eq!(m.status(), Status::Running);
        assert!(m.is_accepted());
    }

    #[test]
    fn out_of_transition_without_declared_alphabet() {
        let mut m = two_consecutive_ones();
        // no declared alphabet: unknown symbols reach the table lookup
        assert!(matches!(m.put('X').unwrap_err(), Error::OutOfTransition));
        assert!(m.status().is_dead());
        // dead runs keep failing the same way, even for symbols that would
        // otherwise step
        assert!(matches!(m.put('1').unwrap_err(), Error::OutOfTransition));
        m.reset();
        assert_eq!(m.status(), Status::Ready);
        assert!(m.put('1').is_ok());
    }

    #[test]
    fn two_consecutive_ones_scenario() {
        let mut m = two_consecutive_ones();
        assert!(m.accepts("001101011"));
        assert!(!m.accepts("10"));
        assert!(m.accepts("111"));
        assert!(m.accepts("11"));
        assert!(!m.accepts("110"));
        assert_eq!(m.state(), "start");
    }

    #[test]
    fn stepping_is_deterministic() {
        let mut a = parity();
        let mut b = parity();
        for input in ["", "1", "01", "1101100", "111"] {
            assert_eq!(a.accepts(input), b.accepts(input), "input {input:?}");
            assert_eq!(a.state(), b.state());
        }
    }

    #[test]
    fn set_state_validates() {
        let mut m = parity();
        assert!(matches!(m.set_state("nope").unwrap_err(), Error::InvalidState));
        m.set_state("odd").unwrap();
        assert!(m.is_accepted());
        assert_eq!(m.status(), Status::Ready);
    }

    #[test]
    fn describe_summarizes() {
        let m = parity();
        assert_eq!(m.describe(), "DFA(2 states, 2 symbols, 1 accepting)");
    }
}
