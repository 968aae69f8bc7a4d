//! Hyperparameters, builder and validation rules.
//!
//! Every hyperparameter has exactly one entry in the rule table
//! ([`PARAMETER_RULES`]); [`Config::validate`] walks that table and is the
//! only place range checks happen. The JSON form accepts the same key set
//! and nothing else.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    feedback::TypeIProbs
};

/// # Overview
///
/// Configuration parameters for a multi-class Tsetlin Machine.
///
/// Field names match the hyperparameter JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[must_use]
pub struct Config {
    /// Clauses per polarity per class. A class owns twice this many.
    pub number_of_pos_neg_clauses_per_class: usize,
    /// States per automaton action.
    pub number_of_states:                    i32,
    /// Specificity.
    pub s:                                   f32,
    /// Vote clipping threshold T.
    pub threshold:                           i32,
    /// 1 enables boosted true-positive feedback.
    pub boost_true_positive_feedback:        u8,
    /// Worker count, -1 for all available cores.
    pub n_jobs:                              i32,
    pub verbose:                             bool,
    /// Seed; `None` draws one from entropy at fit time.
    pub random_state:                        Option<u64>
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_pos_neg_clauses_per_class: 5,
            number_of_states:                    100,
            s:                                   2.0,
            threshold:                           15,
            boost_true_positive_feedback:        0,
            n_jobs:                              -1,
            verbose:                             false,
            random_state:                        None
        }
    }
}

/// One row of the validation table.
#[derive(Clone, Copy)]
pub struct ParamRule {
    pub key:        &'static str,
    pub constraint: &'static str,
    holds:          fn(&Config) -> bool,
    got:            fn(&Config) -> String
}

impl ParamRule {
    fn check(&self, config: &Config) -> Result<()> {
        if (self.holds)(config) {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                key:        self.key,
                constraint: self.constraint,
                got:        (self.got)(config)
            })
        }
    }
}

impl core::fmt::Debug for ParamRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParamRule")
            .field("key", &self.key)
            .field("constraint", &self.constraint)
            .finish()
    }
}

const MAX_STATES: i32 = i32::MAX / 2;

/// Per-polarity clause cap: a class's vote total must fit in `i32`.
const MAX_CLAUSES: usize = (i32::MAX / 2) as usize;

/// Hyperparameter key set and the constraint each key must satisfy.
pub const PARAMETER_RULES: &[ParamRule] = &[
    ParamRule {
        key:        "number_of_pos_neg_clauses_per_class",
        constraint: "an integer in [1, 1073741823]",
        holds:      |c| {
            c.number_of_pos_neg_clauses_per_class > 0
                && c.number_of_pos_neg_clauses_per_class <= MAX_CLAUSES
        },
        got:        |c| c.number_of_pos_neg_clauses_per_class.to_string()
    },
    ParamRule {
        key:        "number_of_states",
        constraint: "an integer in [1, 1073741823]",
        holds:      |c| c.number_of_states > 0 && c.number_of_states <= MAX_STATES,
        got:        |c| c.number_of_states.to_string()
    },
    ParamRule {
        key:        "s",
        constraint: "a finite float > 0",
        holds:      |c| c.s.is_finite() && c.s > 0.0,
        got:        |c| c.s.to_string()
    },
    ParamRule {
        key:        "threshold",
        constraint: "an integer > 0",
        holds:      |c| c.threshold > 0,
        got:        |c| c.threshold.to_string()
    },
    ParamRule {
        key:        "boost_true_positive_feedback",
        constraint: "0 or 1",
        holds:      |c| c.boost_true_positive_feedback <= 1,
        got:        |c| c.boost_true_positive_feedback.to_string()
    },
    ParamRule {
        key:        "n_jobs",
        constraint: "-1 or an integer > 0",
        holds:      |c| c.n_jobs == -1 || c.n_jobs > 0,
        got:        |c| c.n_jobs.to_string()
    },
    ParamRule {
        key:        "verbose",
        constraint: "a bool",
        holds:      |_| true,
        got:        |c| c.verbose.to_string()
    },
    ParamRule {
        key:        "random_state",
        constraint: "null or an unsigned integer",
        holds:      |_| true,
        got:        |c| format!("{:?}", c.random_state)
    }
];

impl Config {
    /// # Overview
    ///
    /// Creates a new ConfigBuilder.
    #[inline]
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// # Overview
    ///
    /// Validates every parameter against [`PARAMETER_RULES`], reporting the
    /// first violation.
    pub fn validate(&self) -> Result<()> {
        PARAMETER_RULES.iter().try_for_each(|rule| rule.check(self))
    }

    /// # Overview
    ///
    /// Parses and validates a UTF-8 JSON object of hyperparameters.
    ///
    /// Missing keys take their defaults. Unknown keys, wrong value types and
    /// non-object documents are rejected with [`Error::InvalidJson`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tsetlin_engine::Config;
    ///
    /// let config = Config::from_json(r#"{"s": 3.9, "threshold": 10}"#).unwrap();
    /// assert_eq!(config.threshold, 10);
    /// assert!(Config::from_json(r#"{"clauses": 10}"#).is_err());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(Error::InvalidJson("expected a json object".to_string()));
        }
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// # Overview
    ///
    /// Serializes the full key set as a JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[inline]
    #[must_use]
    pub fn boost(&self) -> bool {
        self.boost_true_positive_feedback == 1
    }

    /// Clauses owned by one class (both polarities).
    #[inline]
    #[must_use]
    pub fn clauses_per_class(&self) -> usize {
        self.number_of_pos_neg_clauses_per_class.saturating_mul(2)
    }

    /// # Overview
    ///
    /// Worker count with `-1` resolved to the available parallelism.
    #[must_use]
    pub fn resolved_jobs(&self) -> usize {
        if self.n_jobs > 0 {
            self.n_jobs as usize
        } else {
            std::thread::available_parallelism()
                .map(core::num::NonZeroUsize::get)
                .unwrap_or(1)
        }
    }

    /// Pre-computed Type I probabilities.
    #[inline]
    #[must_use]
    pub fn type_i_probs(&self) -> TypeIProbs {
        TypeIProbs::new(self.s, self.boost())
    }
}

/// # Overview
///
/// Builder for Config with validation.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    clauses:      Option<usize>,
    n_states:     Option<i32>,
    s:            Option<f32>,
    threshold:    Option<i32>,
    boost:        Option<bool>,
    n_jobs:       Option<i32>,
    verbose:      Option<bool>,
    random_state: Option<u64>
}

impl ConfigBuilder {
    /// # Overview
    ///
    /// Sets clauses per polarity per class (default: 5).
    pub fn clauses(mut self, n: usize) -> Self {
        self.clauses = Some(n);
        self
    }

    /// # Overview
    ///
    /// Sets states per automaton action (default: 100).
    pub fn states(mut self, n: i32) -> Self {
        self.n_states = Some(n);
        self
    }

    /// # Overview
    ///
    /// Sets specificity parameter s (default: 2.0).
    pub fn specificity(mut self, s: f32) -> Self {
        self.s = Some(s);
        self
    }

    /// # Overview
    ///
    /// Sets vote threshold T (default: 15).
    pub fn threshold(mut self, t: i32) -> Self {
        self.threshold = Some(t);
        self
    }

    pub fn boost_true_positive_feedback(mut self, enabled: bool) -> Self {
        self.boost = Some(enabled);
        self
    }

    /// # Overview
    ///
    /// Sets worker count, -1 for all cores (default: -1).
    pub fn n_jobs(mut self, n: i32) -> Self {
        self.n_jobs = Some(n);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// # Overview
    ///
    /// Fixes the seed for reproducible training.
    pub fn random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// # Overview
    ///
    /// Builds and validates the Config.
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();
        let config = Config {
            number_of_pos_neg_clauses_per_class: self
                .clauses
                .unwrap_or(defaults.number_of_pos_neg_clauses_per_class),
            number_of_states:                    self.n_states.unwrap_or(defaults.number_of_states),
            s:                                   self.s.unwrap_or(defaults.s),
            threshold:                           self.threshold.unwrap_or(defaults.threshold),
            boost_true_positive_feedback:        self
                .boost
                .map_or(defaults.boost_true_positive_feedback, u8::from),
            n_jobs:                              self.n_jobs.unwrap_or(defaults.n_jobs),
            verbose:                             self.verbose.unwrap_or(defaults.verbose),
            random_state:                        self.random_state.or(defaults.random_state)
        };
        config.validate()?;
        Ok(config)
    }
}
