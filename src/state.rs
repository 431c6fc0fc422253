//! Per-run parse state.
//!
//! The state is the only mutable value threaded through the interpreter: the
//! current code-point position plus the map of captured labels. Backtracking
//! rewinds the position only; labels bound on an abandoned branch stay bound
//! for the rest of the run.

use im::HashMap;

/// The mutable cursor of a single parse run.
///
/// User callbacks receive a shared reference to the state and may read the
/// position and the captured labels; only the interpreter mutates it.
#[derive(Debug, Clone, Default)]
pub struct State<U> {
    /// Current position, as a 0-based code-point index into the input.
    pub pos: usize,
    labels: HashMap<String, U>,
}

impl<U: Clone> State<U> {
    pub fn new() -> Self {
        Self {
            pos: 0,
            labels: HashMap::new(),
        }
    }

    /// The token captured under `name`, if a label operator has bound it.
    pub fn label(&self, name: &str) -> Option<&U> {
        self.labels.get(name)
    }

    /// All captured labels, in the order the map iterates them.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }

    pub(crate) fn bind(&mut self, name: String, value: U) {
        self.labels.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_start_empty() {
        let state: State<String> = State::new();
        assert_eq!(state.pos, 0);
        assert_eq!(state.label("a"), None);
        assert!(state.label_names().is_empty());
    }

    #[test]
    fn bind_overwrites_previous_capture() {
        let mut state: State<String> = State::new();
        state.bind("word".into(), "first".into());
        state.bind("word".into(), "second".into());
        assert_eq!(state.label("word").map(String::as_str), Some("second"));
        assert_eq!(state.label_names(), vec!["word"]);
    }
}
