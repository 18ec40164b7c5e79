use thiserror::Error;

/// The kinds of failure the crate reports. Construction-time errors are
/// terminal: a machine is never partially built. Simulator errors
/// ([`InvalidInputChar`](Error::InvalidInputChar),
/// [`OutOfTransition`](Error::OutOfTransition),
/// [`EmptyStates`](Error::EmptyStates)) are recoverable through `reset` or
/// `set_state(s)`; transform errors propagate unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// The declared start state of a DFA is not among its states.
    #[error("invalid start state")]
    InvalidStartState,
    /// A declared start state of an NFA is not among its states.
    #[error("invalid start states")]
    InvalidStartStates,
    /// A declared accept state is not among the states.
    #[error("invalid accept states")]
    InvalidAcceptStates,
    /// A transition references an unknown state, or a symbol outside a
    /// declared nonempty alphabet.
    #[error("invalid transitions")]
    InvalidTransitions,
    /// The input symbol is not admitted by the machine's alphabet.
    #[error("invalid input character")]
    InvalidInputChar,
    /// The current state has no transition for the input symbol.
    #[error("out of transition")]
    OutOfTransition,
    /// A state passed to `set_state(s)` is not among the machine's states.
    #[error("invalid state")]
    InvalidState,
    /// The wire form of a machine could not be decoded, e.g. a transition
    /// key that is not exactly one code point.
    #[error("cannot unmarshal machine")]
    CannotUnmarshalMachine,
    /// The NFA cannot be projected to a DFA: it has ε-edges, more than one
    /// start state, or a non-singleton destination set.
    #[error("not dfa")]
    NotDfa,
    /// The operation requires an ε-free machine.
    #[error("epsilon exists")]
    EpsilonExists,
    /// The NFA's current state set is empty; the run is dead.
    #[error("empty states")]
    EmptyStates,
    /// The renderer was given no DOT source.
    #[error("no dot source")]
    NoDotSource,
    /// A DOT attribute was built with an empty name.
    #[error("attr name empty")]
    AttrNameEmpty,
    /// A DOT node was built with an empty name.
    #[error("node name empty")]
    NodeNameEmpty,
    /// A DOT edge is missing an endpoint.
    #[error("invalid edge")]
    InvalidEdge,
    /// A start state has no corresponding node in the DOT document.
    #[error("missing state")]
    MissingState,
    /// The external `dot` process exited with a failure; `stderr` carries
    /// its captured diagnostics.
    #[error("render failed ({status}): {stderr}")]
    Render {
        /// Exit status of the subprocess.
        status: std::process::ExitStatus,
        /// Captured standard error of the subprocess.
        stderr: String,
    },
    /// Plumbing failure around the renderer: temp file creation, writing
    /// the DOT source, or spawning the subprocess.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The wire form is not syntactically valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for the errors a simulator can report while stepping.
    pub fn is_simulation(&self) -> bool {
        matches!(
            self,
            Error::InvalidInputChar | Error::OutOfTransition | Error::EmptyStates
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_kind() {
        assert_eq!(Error::InvalidStartState.to_string(), "invalid start state");
        assert_eq!(Error::OutOfTransition.to_string(), "out of transition");
        assert_eq!(Error::NotDfa.to_string(), "not dfa");
        assert_eq!(Error::EpsilonExists.to_string(), "epsilon exists");
    }

    #[test]
    fn simulation_errors() {
        assert!(Error::InvalidInputChar.is_simulation());
        assert!(Error::EmptyStates.is_simulation());
        assert!(!Error::InvalidTransitions.is_simulation());
    }
}
