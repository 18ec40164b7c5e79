#![doc = include_str!("../README.md")]
#![warn(missing_docs, rust_2018_idioms)]

/// Symbols and alphabets. A [`Symbol`](alphabet::Symbol) is either a single
/// code point or the distinguished ε, which labels transitions that consume
/// no input. An empty [`Alphabet`](alphabet::Alphabet) admits every symbol.
pub mod alphabet;

/// Defines the mathematical objects used throughout the crate, mainly
/// unordered sets and maps and their order-independent comparisons.
pub mod math;

/// The error taxonomy. Every fallible operation in the crate reports one of
/// the kinds defined here.
pub mod error;

/// Common machine vocabulary: the simulator [`Status`](machine::Status) and
/// the [`Automaton`](machine::Automaton) capability trait shared by both
/// machine forms.
pub mod machine;

/// Deterministic finite automata.
pub mod dfa;

/// Nondeterministic finite automata with ε-transitions, plus the structural
/// operations (reversal, complementation, DFA coercion).
pub mod nfa;

mod determinization;
mod expansion;
mod minimization;

/// Serializable shells of both machine forms and their JSON encoding.
pub mod shell;

/// A document model for the Graphviz DOT language and emitters for both
/// machine forms.
pub mod dot;

/// Rendering DOT sources to images through an external `dot` process.
pub mod render;

/// Everything needed to use the crate: `use machina::prelude::*;`.
pub mod prelude {
    pub use crate::alphabet::{Alphabet, Symbol};
    pub use crate::dfa::{Dfa, DfaBuilder};
    pub use crate::dot::{Attr, Digraph, Edge, FaDotBuilder, Node};
    pub use crate::error::Error;
    pub use crate::machine::{Automaton, Status};
    pub use crate::math;
    pub use crate::nfa::{Nfa, NfaBuilder};
    pub use crate::render::Renderer;
    pub use crate::shell::{DfaShell, NfaShell};
}
