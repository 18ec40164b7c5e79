//! ε-expansion: turning an ε-NFA into an equivalent ε-free NFA.
//!
//! The new table keeps every non-ε row of the input and then closes each
//! destination set under ε-transitions, so a step lands directly on every
//! state an ε-path could have reached. States that are left with no
//! outgoing non-ε row and are not accepting can never influence a run
//! again; they are purged from the state set, the start set and all
//! destination sets. Accepting sinks are kept, since their membership in a
//! current set decides acceptance.
//!
//! This is a pragmatic reduction, not a full trim: unreachable states with
//! outgoing rows survive.

use tracing::debug;

use crate::alphabet::Symbol;
use crate::machine::Status;
use crate::math::{Map, Set};
use crate::nfa::{Nfa, NfaTable};

/// Builds the ε-free table: non-ε rows of `transitions` with every
/// destination set extended by the ε-closure of its members.
pub(crate) fn expand_table(transitions: &NfaTable) -> NfaTable {
    let mut table = NfaTable::new();
    for (from, row) in transitions {
        let routes: Map<Symbol, Set<String>> = row
            .iter()
            .filter(|(sym, tos)| !sym.is_epsilon() && !tos.is_empty())
            .map(|(sym, tos)| (*sym, tos.clone()))
            .collect();
        if routes.is_empty() {
            continue;
        }
        table.insert(from.clone(), routes);
    }
    for row in table.values_mut() {
        for tos in row.values_mut() {
            loop {
                let additions: Vec<String> = tos
                    .iter()
                    .filter_map(|q| transitions.get(q).and_then(|r| r.get(&Symbol::Epsilon)))
                    .flatten()
                    .filter(|q| !tos.contains(*q))
                    .cloned()
                    .collect();
                if additions.is_empty() {
                    break;
                }
                tos.extend(additions);
            }
        }
    }
    table
}

impl Nfa {
    /// Produces an equivalent ε-free NFA.
    ///
    /// The new start states are the ε-closure of the old ones. Non-accepting
    /// states without any outgoing non-ε transition are purged everywhere;
    /// see the module docs for the exact policy. Σ and F are preserved, and
    /// the result of [`has_epsilon`](Nfa::has_epsilon) on the output is
    /// always false.
    pub fn expand_epsilon(&self) -> Nfa {
        let mut transitions = expand_table(&self.transitions);

        let useless: Set<String> = self
            .states
            .iter()
            .filter(|q| !self.accept_states.contains(*q) && !transitions.contains_key(*q))
            .cloned()
            .collect();

        let mut states = self.states.clone();
        let mut start_states = self.epsilon_closure(&self.start_states);
        let mut current_states = self.current_states.clone();
        for q in &useless {
            states.shift_remove(q);
            start_states.shift_remove(q);
            current_states.shift_remove(q);
        }
        for row in transitions.values_mut() {
            for tos in row.values_mut() {
                for q in &useless {
                    tos.shift_remove(q);
                }
            }
            row.retain(|_, tos| !tos.is_empty());
        }
        transitions.retain(|_, row| !row.is_empty());

        debug!(
            before = self.states.len(),
            after = states.len(),
            purged = useless.len(),
            "expanded epsilon transitions"
        );
        Nfa {
            states,
            chars: self.chars.clone(),
            start_states,
            accept_states: self.accept_states.clone(),
            transitions,
            current_states,
            status: Status::Ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::tests::abc_star_d;
    use crate::nfa::NfaBuilder;

    fn table(m: &Nfa) -> &NfaTable {
        m.transitions()
    }

    fn dests<'a>(t: &'a NfaTable, from: &str, sym: char) -> Vec<&'a str> {
        let mut v: Vec<&str> = t
            .get(from)
            .and_then(|row| row.get(&Symbol::Char(sym)))
            .map(|tos| tos.iter().map(String::as_str).collect())
            .unwrap_or_default();
        v.sort_unstable();
        v
    }

    #[test]
    fn alternation_collapses_to_direct_steps() {
        // (a|b|c): a shared ε fan-out at the start, ε fan-in at the end
        let m = NfaBuilder::default()
            .with_states([
                "start", "a_start", "a_end", "b_start", "b_end", "c_start", "c_end", "end",
            ])
            .with_start_states(["start"])
            .with_accept_states(["end"])
            .with_edges([
                ("a_start", 'a', "a_end"),
                ("b_start", 'b', "b_end"),
                ("c_start", 'c', "c_end"),
            ])
            .with_epsilon_edges([
                ("start", "a_start"),
                ("start", "b_start"),
                ("start", "c_start"),
                ("a_end", "end"),
                ("b_end", "end"),
                ("c_end", "end"),
            ])
            .build()
            .unwrap();

        let t = expand_table(m.transitions());
        assert_eq!(t.len(), 3);
        assert_eq!(dests(&t, "a_start", 'a'), vec!["a_end", "end"]);
        assert_eq!(dests(&t, "b_start", 'b'), vec!["b_end", "end"]);
        assert_eq!(dests(&t, "c_start", 'c'), vec!["c_end", "end"]);
    }

    #[test]
    fn destination_sets_are_closed_under_epsilon() {
        let m = NfaBuilder::default()
            .with_states(["0", "1", "2", "3", "4"])
            .with_start_states(["0"])
            .with_accept_states(["3", "4"])
            .with_edges([("0", '0', "1"), ("1", '1', "1"), ("1", '1', "3"), ("2", '0', "4")])
            .with_epsilon_edges([("1", "2")])
            .build()
            .unwrap();

        let t = expand_table(m.transitions());
        assert_eq!(t.len(), 3);
        assert_eq!(dests(&t, "0", '0'), vec!["1", "2"]);
        assert_eq!(dests(&t, "1", '1'), vec!["1", "2", "3"]);
        assert_eq!(dests(&t, "2", '0'), vec!["4"]);
    }

    #[test]
    fn abc_star_d_table() {
        let t = expand_table(abc_star_d().transitions());
        assert_eq!(t.len(), 4);
        assert_eq!(
            dests(&t, "a-start", 'a'),
            vec!["a-end", "b-start", "bc-start", "c-start", "d-start"]
        );
        assert_eq!(
            dests(&t, "b-start", 'b'),
            vec!["b-end", "b-start", "bc-end", "bc-start", "c-start", "d-start"]
        );
        assert_eq!(
            dests(&t, "c-start", 'c'),
            vec!["b-start", "bc-end", "bc-start", "c-end", "c-start", "d-start"]
        );
        assert_eq!(dests(&t, "d-start", 'd'), vec!["d-end"]);
    }

    #[test]
    fn expansion_is_epsilon_free_and_purges_sinks() {
        let m = abc_star_d();
        let e = m.expand_epsilon();
        assert!(!e.has_epsilon());
        // ε-only states are sinks in the expanded table and not accepting
        for gone in ["a-end", "bc-start", "bc-end", "b-end", "c-end"] {
            assert!(!e.states().contains(gone), "{gone} should be purged");
            for row in e.transitions().values() {
                for tos in row.values() {
                    assert!(!tos.contains(gone));
                }
            }
        }
        // the accepting sink survives
        assert!(e.states().contains("d-end"));
        assert_eq!(e.accept_states(), m.accept_states());
        assert_eq!(e.chars(), m.chars());
    }

    #[test]
    fn start_closure_is_a_fixpoint() {
        // start ε→ mid ε→ far, so the expanded start set must reach `far`
        // transitively
        let m = NfaBuilder::default()
            .with_states(["start", "mid", "far", "end"])
            .with_start_states(["start"])
            .with_accept_states(["end"])
            .with_edges([("far", 'x', "end"), ("start", 'y', "end")])
            .with_epsilon_edges([("start", "mid"), ("mid", "far")])
            .build()
            .unwrap();
        let e = m.expand_epsilon();
        let starts = crate::math::sorted(e.start_states());
        assert_eq!(starts, vec!["far", "start"]);

        let mut e = e;
        assert!(e.accepts("x"));
        assert!(e.accepts("y"));
    }

    #[test]
    fn expansion_agrees_with_the_original() {
        let mut m = abc_star_d();
        let mut e = m.expand_epsilon();
        for input in ["", "a", "ab", "abb", "ac", "ad", "abcd", "accd", "abcbd"] {
            assert_eq!(m.accepts(input), e.accepts(input), "input {input:?}");
        }
    }

    #[test]
    fn expanding_an_epsilon_free_machine_keeps_its_rows() {
        let m = NfaBuilder::default()
            .with_states(["a", "b"])
            .with_start_states(["a"])
            .with_accept_states(["b"])
            .with_edges([("a", 'x', "b")])
            .build()
            .unwrap();
        let e = m.expand_epsilon();
        assert_eq!(e.transitions(), m.transitions());
        assert_eq!(e.states(), m.states());
        assert_eq!(e.start_states(), m.start_states());
    }
}
