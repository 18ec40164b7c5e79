//! Serializable shells of both machine forms.
//!
//! A shell is a plain data snapshot of a machine: its structural fields and,
//! when present, the current configuration. The JSON wire format keys
//! transitions by length-one strings; the ε label is carried as the control
//! character `U+0007` so that ordinary code points, including the literal
//! `ε`, stay unambiguous. Decoding funnels back through the builders, so a
//! shell can never produce a machine the builders would reject.

use serde::{Deserialize, Serialize};

use crate::alphabet::Symbol;
use crate::dfa::{Dfa, DfaBuilder, DfaTable};
use crate::error::Error;
use crate::math::{self, Map, OrderedMap, Set};
use crate::nfa::{Nfa, NfaBuilder, NfaTable};

/// The ε label on the wire.
pub const EPSILON_WIRE: char = '\u{0007}';

fn single_char(s: &str) -> Result<char, Error> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::CannotUnmarshalMachine),
    }
}

fn encode_symbol(sym: Symbol) -> String {
    match sym {
        Symbol::Char(c) => c.to_string(),
        Symbol::Epsilon => EPSILON_WIRE.to_string(),
    }
}

fn decode_symbol(key: &str) -> Result<Symbol, Error> {
    let c = single_char(key)?;
    if c == EPSILON_WIRE {
        Ok(Symbol::Epsilon)
    } else {
        Ok(Symbol::Char(c))
    }
}

fn decode_chars(chars: &[String]) -> Result<Vec<char>, Error> {
    chars.iter().map(|c| single_char(c)).collect()
}

fn sorted_strings(chars: impl Iterator<Item = char>) -> Vec<String> {
    let mut v: Vec<String> = chars.map(|c| c.to_string()).collect();
    v.sort();
    v
}

/// Serializable form of a [`Dfa`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaShell {
    /// The state set.
    pub states: Vec<String>,
    /// The declared alphabet as length-one strings; absent means universe.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chars: Vec<String>,
    /// The start state.
    pub start_state: String,
    /// The accept states.
    pub accept_states: Vec<String>,
    /// state → (symbol → state).
    pub transitions: OrderedMap<String, OrderedMap<String, String>>,
    /// The current state, when a configuration is carried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<String>,
}

impl DfaShell {
    pub(crate) fn of(m: &Dfa) -> Self {
        let mut transitions = OrderedMap::new();
        for (from, row) in m.transitions() {
            let mut r = OrderedMap::new();
            for (sym, to) in row {
                r.insert(sym.to_string(), to.clone());
            }
            transitions.insert(from.clone(), r);
        }
        Self {
            states: math::sorted(m.states()),
            chars: sorted_strings(m.chars().iter()),
            start_state: m.start_state().to_string(),
            accept_states: math::sorted(m.accept_states()),
            transitions,
            current_state: Some(m.state().to_string()),
        }
    }

    /// Encodes the shell as JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a shell from JSON.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    /// Rebuilds the machine, revalidating through [`DfaBuilder`] and
    /// restoring the carried configuration.
    pub fn to_machine(&self) -> Result<Dfa, Error> {
        let mut transitions = DfaTable::new();
        for (from, row) in &self.transitions {
            let mut r = Map::new();
            for (key, to) in row {
                r.insert(single_char(key)?, to.clone());
            }
            transitions.insert(from.clone(), r);
        }
        let mut m = DfaBuilder::default()
            .with_states(self.states.clone())
            .with_chars(decode_chars(&self.chars)?)
            .with_start_state(self.start_state.clone())
            .with_accept_states(self.accept_states.clone())
            .with_transitions(transitions)
            .build()?;
        if let Some(current) = &self.current_state {
            m.set_state(current)?;
        }
        Ok(m)
    }
}

/// Serializable form of an [`Nfa`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfaShell {
    /// The state set.
    pub states: Vec<String>,
    /// The declared alphabet as length-one strings; absent means universe.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chars: Vec<String>,
    /// The start states.
    pub start_states: Vec<String>,
    /// The accept states.
    pub accept_states: Vec<String>,
    /// state → (symbol → states); ε is the `U+0007` key.
    pub transitions: OrderedMap<String, OrderedMap<String, Vec<String>>>,
    /// The current states, when a nonempty configuration is carried.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub current_states: Vec<String>,
}

impl NfaShell {
    pub(crate) fn of(m: &Nfa) -> Self {
        let mut transitions = OrderedMap::new();
        for (from, row) in m.transitions() {
            let mut r = OrderedMap::new();
            for (sym, tos) in row {
                r.insert(encode_symbol(*sym), math::sorted(tos));
            }
            transitions.insert(from.clone(), r);
        }
        Self {
            states: math::sorted(m.states()),
            chars: sorted_strings(m.chars().iter()),
            start_states: math::sorted(m.start_states()),
            accept_states: math::sorted(m.accept_states()),
            transitions,
            current_states: math::sorted(m.current_states()),
        }
    }

    /// Encodes the shell as JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a shell from JSON.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    /// Rebuilds the machine, revalidating through [`NfaBuilder`] and
    /// restoring the carried configuration. A shell without current states
    /// yields a machine at its start configuration.
    pub fn to_machine(&self) -> Result<Nfa, Error> {
        let mut transitions = NfaTable::new();
        for (from, row) in &self.transitions {
            let mut r: Map<Symbol, Set<String>> = Map::new();
            for (key, tos) in row {
                r.insert(decode_symbol(key)?, tos.iter().cloned().collect());
            }
            transitions.insert(from.clone(), r);
        }
        let mut m = NfaBuilder::default()
            .with_states(self.states.clone())
            .with_chars(decode_chars(&self.chars)?)
            .with_start_states(self.start_states.clone())
            .with_accept_states(self.accept_states.clone())
            .with_transitions(transitions)
            .build()?;
        if !self.current_states.is_empty() {
            m.set_states(self.current_states.clone())?;
        }
        Ok(m)
    }
}
