//! Clause - a conjunction of literals selected by its automata.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Automaton;

/// # Overview
///
/// A clause with 2*n_features automata.
///
/// - automata[2*k] controls literal x_k
/// - automata[2*k+1] controls literal NOT x_k
///
/// Polarity is +1 for clauses voting for their class and -1 for clauses
/// voting against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    automata:   Vec<Automaton>,
    polarity:   i8,
    n_features: usize
}

impl Clause {
    /// # Overview
    ///
    /// Creates clause with every automaton at the exclude boundary.
    pub fn new(n_features: usize, n_states: i32, polarity: i8) -> Self {
        debug_assert!(polarity == 1 || polarity == -1);
        let automata = (0..2 * n_features).map(|_| Automaton::new(n_states)).collect();
        Self {
            automata,
            polarity,
            n_features
        }
    }

    /// # Overview
    ///
    /// Creates clause with each automaton placed at random on either side
    /// of the boundary (state n_states or n_states+1).
    pub fn random<R: Rng>(n_features: usize, n_states: i32, polarity: i8, rng: &mut R) -> Self {
        debug_assert!(polarity == 1 || polarity == -1);
        let automata = (0..2 * n_features)
            .map(|_| {
                let state = if rng.random::<bool>() { n_states + 1 } else { n_states };
                Automaton::with_state(state, n_states)
            })
            .collect();
        Self {
            automata,
            polarity,
            n_features
        }
    }

    /// # Overview
    ///
    /// Rebuilds a clause from raw automaton states.
    ///
    /// Returns `None` when the state count is not `2 * n_features` or a state
    /// lies outside `[1, 2*n_states]`.
    pub fn from_states(states: &[i32], n_states: i32, polarity: i8) -> Option<Self> {
        if states.len() % 2 != 0 || !(polarity == 1 || polarity == -1) {
            return None;
        }
        if states.iter().any(|&s| s < 1 || s > 2 * n_states) {
            return None;
        }
        Some(Self {
            automata: states
                .iter()
                .map(|&s| Automaton::with_state(s, n_states))
                .collect(),
            polarity,
            n_features: states.len() / 2
        })
    }

    #[inline(always)]
    pub fn polarity(&self) -> i8 {
        self.polarity
    }

    #[inline(always)]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline(always)]
    pub fn automata(&self) -> &[Automaton] {
        &self.automata
    }

    #[inline(always)]
    pub fn automata_mut(&mut self) -> &mut [Automaton] {
        &mut self.automata
    }

    /// Raw automaton states in literal order.
    pub fn states(&self) -> Vec<i32> {
        self.automata.iter().map(Automaton::state).collect()
    }

    /// Number of included literals.
    pub fn n_included(&self) -> usize {
        self.automata.iter().filter(|a| a.includes()).count()
    }

    /// True when no literal is included.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.automata.iter().any(Automaton::includes)
    }

    /// # Overview
    ///
    /// Evaluates clause on binary input. Early exit on violation.
    ///
    /// A clause with no included literal fires: the empty conjunction is
    /// true. This is the output used while training.
    #[inline]
    pub fn evaluate(&self, x: &[u8]) -> bool {
        debug_assert_eq!(x.len(), self.n_features);
        for (pair, &xk) in self.automata.chunks_exact(2).zip(x) {
            if pair[0].includes() && xk == 0 {
                return false;
            }
            if pair[1].includes() && xk != 0 {
                return false;
            }
        }
        true
    }

    /// # Overview
    ///
    /// Evaluation used for prediction: identical to [`Clause::evaluate`]
    /// except that an empty clause abstains (returns false).
    #[inline]
    pub fn evaluate_for_inference(&self, x: &[u8]) -> bool {
        !self.is_empty() && self.evaluate(x)
    }

    /// # Overview
    ///
    /// Returns polarity if fires, 0 otherwise.
    #[inline(always)]
    pub fn vote(&self, x: &[u8]) -> i32 {
        if self.evaluate(x) { self.polarity as i32 } else { 0 }
    }

    /// # Overview
    ///
    /// Inference-time vote, see [`Clause::evaluate_for_inference`].
    #[inline(always)]
    pub fn inference_vote(&self, x: &[u8]) -> i32 {
        if self.evaluate_for_inference(x) { self.polarity as i32 } else { 0 }
    }
}
