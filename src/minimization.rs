//! Brzozowski minimization.
//!
//! Reversing a machine and determinizing it yields a machine whose states
//! are distinguishable by construction; doing it twice gives the minimal
//! DFA for the original language. ε-expansion is interposed before each
//! determinization as a normalization pass: reversal of an ε-free machine
//! stays ε-free, but the expansion also performs the useless-state purge,
//! which keeps the intermediate subset spaces small.

use tracing::debug;

use crate::error::Error;
use crate::nfa::Nfa;

impl Nfa {
    /// Produces the minimal DFA for this machine's language, expressed as
    /// an [`Nfa`] for which [`is_dfa`](Nfa::is_dfa) holds.
    ///
    /// Errors from the subset construction propagate; after ε-expansion
    /// the input to each determinization is ε-free, so they do not arise
    /// in practice.
    pub fn minimize(&self) -> Result<Nfa, Error> {
        let halfway = self.reversed().expand_epsilon().subset_construction()?;
        let minimal = halfway.reversed().expand_epsilon().subset_construction()?;
        debug!(
            input_states = self.states().len(),
            output_states = minimal.states().len(),
            "brzozowski minimization"
        );
        Ok(minimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::tests::abc_star_d;
    use crate::nfa::NfaBuilder;

    fn strings(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut out = vec![String::new()];
        let mut layer = vec![String::new()];
        for _ in 0..max_len {
            layer = layer
                .iter()
                .flat_map(|w| {
                    alphabet.iter().map(move |c| {
                        let mut w = w.clone();
                        w.push(*c);
                        w
                    })
                })
                .collect();
            out.extend(layer.iter().cloned());
        }
        out
    }

    /// The NFA for `(a|b)*a`: any prefix over {a, b} followed by an `a`.
    fn any_then_a() -> Nfa {
        NfaBuilder::default()
            .with_states(["1", "2", "3"])
            .with_start_states(["1"])
            .with_accept_states(["2", "3"])
            .with_edges([
                ("1", 'a', "1"),
                ("1", 'b', "1"),
                ("1", 'a', "2"),
                ("2", 'a', "3"),
                ("3", 'a', "3"),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn minimized_machine_is_a_dfa() {
        let m = any_then_a().minimize().unwrap();
        assert!(m.is_dfa());
        assert!(!m.has_epsilon());
    }

    #[test_log::test]
    fn minimization_is_idempotent() {
        let once = any_then_a().minimize().unwrap();
        let twice = once.minimize().unwrap();
        assert_eq!(once.states().len(), twice.states().len());

        let mut once = once;
        let mut twice = twice;
        for w in strings(&['a', 'b'], 6) {
            assert_eq!(once.accepts(&w), twice.accepts(&w), "input {w:?}");
        }
    }

    #[test]
    fn minimization_preserves_the_language() {
        let mut m = any_then_a();
        let mut min = m.minimize().unwrap();
        for w in strings(&['a', 'b'], 6) {
            assert_eq!(m.accepts(&w), min.accepts(&w), "input {w:?}");
        }
    }

    #[test]
    fn minimizes_across_epsilon_machines() {
        let mut m = abc_star_d();
        let mut min = m.minimize().unwrap();
        assert!(min.is_dfa());
        for w in strings(&['a', 'b', 'c', 'd'], 4) {
            assert_eq!(m.accepts(&w), min.accepts(&w), "input {w:?}");
        }
    }

    #[test_log::test]
    fn transform_pipeline_agrees_on_errors_and_acceptance() {
        // run the same inputs through the machine itself, its ε-expansion,
        // the determinized expansion, and the minimized machine; all four
        // must agree on whether an error occurred and on final acceptance
        let m = abc_star_d();
        let mut machines = vec![
            m.clone(),
            m.expand_epsilon(),
            m.expand_epsilon().subset_construction().unwrap(),
            m.minimize().unwrap(),
        ];
        for input in ["", "a", "ab", "abb", "ac", "ad", "abcd", "x", "da"] {
            let outcomes: Vec<(bool, bool)> = machines
                .iter_mut()
                .map(|m| {
                    m.reset();
                    let mut errored = false;
                    for c in input.chars() {
                        errored |= m.put(c).is_err();
                    }
                    (errored, m.is_accepted())
                })
                .collect();
            for (i, outcome) in outcomes.iter().enumerate() {
                assert_eq!(outcome, &outcomes[0], "machine {i} diverged on {input:?}");
            }
        }
    }

    #[test]
    fn minimization_merges_indistinguishable_states() {
        // two redundant accept states recognizing the same residual
        let bloated = NfaBuilder::default()
            .with_states(["s", "p", "q"])
            .with_start_states(["s"])
            .with_accept_states(["p", "q"])
            .with_edges([("s", 'a', "p"), ("s", 'b', "q"), ("p", 'a', "p"), ("q", 'a', "q")])
            .build()
            .unwrap();
        let min = bloated.minimize().unwrap();
        assert!(min.states().len() < bloated.states().len());

        let mut bloated = bloated;
        let mut min = min;
        for w in strings(&['a', 'b'], 5) {
            assert_eq!(bloated.accepts(&w), min.accepts(&w), "input {w:?}");
        }
    }
}
