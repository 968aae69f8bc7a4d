//! # Tsetlin Engine
//!
//! Multi-class Tsetlin Machine learning engine: Tsetlin automata, clause
//! evaluation, clipped class voting, Type I / Type II feedback, an epoch
//! training loop with clause-level parallelism, and a versioned model
//! format.
//!
//! # Layout
//!
//! - [`Automaton`]: two-action automaton with saturating integer state.
//! - [`Clause`]: conjunction of literals chosen by its automata.
//! - [`TsetlinMachine`]: class models over dense class indices; voting,
//!   prediction and the per-sample feedback step.
//! - [`feedback`]: Type I, boosted Type I and Type II feedback.
//! - [`TsetlinClassifier`]: estimator with label mapping, `fit`,
//!   `partial_fit`, `predict`, `predict_proba` and model export/import.
//! - [`Config`]: validated hyperparameters, also readable from JSON.
//!
//! # Reproducibility
//!
//! Every clause owns a random stream derived from the seed and its global
//! index; shuffling and negative-class sampling use a separate master
//! stream. A fixed `random_state` therefore gives identical models for any
//! `n_jobs`.
//!
//! # Examples
//!
//! ```
//! use tsetlin_engine::{Config, TsetlinClassifier};
//!
//! let config = Config::builder()
//!     .clauses(10)
//!     .specificity(3.9)
//!     .random_state(42)
//!     .build()
//!     .unwrap();
//!
//! let mut clf = TsetlinClassifier::new(config);
//!
//! let x = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
//! let y = vec![0, 1, 1, 0];
//!
//! clf.fit(&x, &y, 200).unwrap();
//! let labels = clf.predict(&x).unwrap();
//! assert_eq!(labels.len(), 4);
//! ```

mod automaton;
mod classifier;
mod clause;
mod config;
pub mod error;
pub mod feedback;
mod machine;
pub mod parallel;
pub mod persist;
mod training;
pub mod utils;

pub use automaton::{Action, Automaton};
pub use classifier::{Fitted, TsetlinClassifier};
pub use clause::Clause;
pub use config::{Config, ConfigBuilder, PARAMETER_RULES, ParamRule};
pub use error::{Error, Result};
pub use machine::{ClassModel, TsetlinMachine};
pub use training::{FitOptions, FitReport, ProgressCallback};
