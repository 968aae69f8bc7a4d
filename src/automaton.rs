//! Tsetlin Automaton - the elementary learning unit.

use serde::{Deserialize, Serialize};

/// Action chosen by an automaton for its literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Exclude,
    Include
}

/// # Overview
///
/// A two-action Tsetlin Automaton with states from 1 to 2*n_states.
/// States 1..=n_states produce [`Action::Exclude`].
/// States (n_states+1)..=2*n_states produce [`Action::Include`].
///
/// Steps past either end are no-ops.
///
/// # Examples
///
/// ```
/// use tsetlin_engine::{Action, Automaton};
///
/// let mut automaton = Automaton::new(100);
/// assert_eq!(automaton.action(), Action::Exclude);
///
/// automaton.increment();
/// assert_eq!(automaton.action(), Action::Include);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automaton {
    state:    i32,
    n_states: i32
}

impl Automaton {
    /// # Overview
    ///
    /// Automaton at state n_states: the last exclude state.
    #[inline]
    pub fn new(n_states: i32) -> Self {
        debug_assert!(n_states > 0);
        Self {
            state: n_states,
            n_states
        }
    }

    /// # Overview
    ///
    /// Automaton at a given state in [1, 2*n_states].
    #[inline]
    pub fn with_state(state: i32, n_states: i32) -> Self {
        debug_assert!(state >= 1 && state <= 2 * n_states);
        Self {
            state,
            n_states
        }
    }

    #[inline(always)]
    pub fn action(&self) -> Action {
        if self.includes() {
            Action::Include
        } else {
            Action::Exclude
        }
    }

    /// # Overview
    ///
    /// Whether the literal is part of the conjunction.
    #[inline(always)]
    pub fn includes(&self) -> bool {
        self.state > self.n_states
    }

    #[inline(always)]
    pub fn state(&self) -> i32 {
        self.state
    }

    #[inline(always)]
    pub fn n_states(&self) -> i32 {
        self.n_states
    }

    /// # Overview
    ///
    /// Moves one step toward include. Capped at 2*n_states.
    #[inline]
    pub fn increment(&mut self) {
        if self.state < 2 * self.n_states {
            self.state += 1;
        }
    }

    /// # Overview
    ///
    /// Moves one step toward exclude. Floored at 1.
    #[inline]
    pub fn decrement(&mut self) {
        if self.state > 1 {
            self.state -= 1;
        }
    }

    /// # Overview
    ///
    /// One saturating step toward the side of `toward`; the feedback type
    /// decides the direction.
    #[inline]
    pub fn step(&mut self, toward: Action) {
        match toward {
            Action::Include => self.increment(),
            Action::Exclude => self.decrement()
        }
    }
}
