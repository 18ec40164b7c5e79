//! Subset (powerset) construction: determinizing an ε-free NFA.
//!
//! The result is expressed as an [`Nfa`] that happens to be a DFA: one
//! start state and singleton destination sets everywhere. Each reachable
//! subset of the input's states becomes one fresh state, named by the next
//! integer in breadth-first discovery order starting at `"0"`. Subsets are
//! canonicalized by sorting their member names and joining with `_`, and
//! the symbol set is iterated in sorted order, so the naming is a function
//! of the machine alone.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::alphabet::{Alphabet, Symbol};
use crate::error::Error;
use crate::machine::Status;
use crate::math::{self, Map, OrderedSet, Set};
use crate::nfa::{Nfa, NfaTable};

const START_NAME: &str = "0";

/// The canonical key of a subset: member names sorted ascending, joined by
/// `_`.
fn canonical(subset: &Set<String>) -> String {
    math::sorted(subset).join("_")
}

impl Nfa {
    /// Determinizes this machine via the subset construction.
    ///
    /// Fails with [`Error::EpsilonExists`] if the table still contains
    /// ε-edges; run [`expand_epsilon`](Nfa::expand_epsilon) first. The
    /// output's alphabet is the declared Σ when nonempty, otherwise the set
    /// of symbols appearing in the table. A subset state accepts iff it
    /// intersects F.
    pub fn subset_construction(&self) -> Result<Nfa, Error> {
        if self.has_epsilon() {
            return Err(Error::EpsilonExists);
        }

        let chars: Vec<char> = if !self.chars.is_universe() {
            self.chars.sorted()
        } else {
            self.transitions
                .values()
                .flat_map(|row| row.keys())
                .filter_map(Symbol::as_char)
                .collect::<OrderedSet<char>>()
                .into_iter()
                .collect()
        };

        let mut names: Map<String, String> = Map::new();
        names.insert(canonical(&self.start_states), START_NAME.to_string());
        let mut queue: VecDeque<Set<String>> = VecDeque::new();
        queue.push_back(self.start_states.clone());

        let mut states: Set<String> = Set::new();
        let mut accept_states: Set<String> = Set::new();
        let mut transitions = NfaTable::new();

        while let Some(subset) = queue.pop_front() {
            let name = names[&canonical(&subset)].clone();
            states.insert(name.clone());
            if math::intersects(&subset, &self.accept_states) {
                accept_states.insert(name.clone());
            }
            for &c in &chars {
                let mut next: Set<String> = Set::new();
                for q in &subset {
                    if let Some(tos) =
                        self.transitions.get(q).and_then(|row| row.get(&Symbol::Char(c)))
                    {
                        next.extend(tos.iter().cloned());
                    }
                }
                if next.is_empty() {
                    continue;
                }
                let key = canonical(&next);
                if !names.contains_key(&key) {
                    let fresh = names.len().to_string();
                    trace!(subset = %key, name = %fresh, "discovered subset");
                    names.insert(key.clone(), fresh);
                    queue.push_back(next);
                }
                transitions
                    .entry(name.clone())
                    .or_default()
                    .insert(Symbol::Char(c), Set::from_iter([names[&key].clone()]));
            }
        }

        debug!(
            input_states = self.states.len(),
            output_states = states.len(),
            symbols = chars.len(),
            "subset construction"
        );
        let start_states: Set<String> = Set::from_iter([START_NAME.to_string()]);
        Ok(Nfa {
            states,
            chars: Alphabet::new(chars),
            current_states: start_states.clone(),
            start_states,
            accept_states,
            transitions,
            status: Status::Ready,
        })
    }
}
