//! Multi-class Tsetlin Machine: class models, voting and the per-sample
//! training step.

use rand::Rng;

use crate::{
    Clause, Config,
    error::{Error, Result},
    feedback::{TypeIProbs, negative_probability, target_probability, type_i, type_ii},
    parallel::Executor,
    utils::{FastRng, MASTER_STREAM, bernoulli, entropy_seed, stream_rng}
};

/// # Overview
///
/// Clauses of one class with their private random streams.
///
/// Even positions hold positive (+1) clauses, odd positions negative (-1)
/// ones, `number_of_pos_neg_clauses_per_class` of each.
#[derive(Debug, Clone)]
pub struct ClassModel {
    pub(crate) clauses: Vec<Clause>,
    pub(crate) streams: Vec<FastRng>
}

impl ClassModel {
    /// # Overview
    ///
    /// Creates the class at `class_idx`. Clause `j` of this class draws from
    /// stream `1 + class_idx * clauses_per_class + j`, which also seeds its
    /// random initial automaton states.
    fn new(class_idx: usize, config: &Config, n_features: usize, seed: u64) -> Self {
        let per_class = config.clauses_per_class();
        let (clauses, streams) = (0..per_class)
            .map(|j| {
                let global = (class_idx * per_class + j) as u64;
                let mut rng = stream_rng(seed, MASTER_STREAM + 1 + global);
                let polarity = if j % 2 == 0 { 1 } else { -1 };
                let clause = Clause::random(n_features, config.number_of_states, polarity, &mut rng);
                (clause, rng)
            })
            .unzip();
        Self {
            clauses,
            streams
        }
    }

    #[inline]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// # Overview
    ///
    /// Inference class sum, clamped to `[-threshold, threshold]`. Empty
    /// clauses abstain.
    pub fn class_sum(&self, x: &[u8], threshold: i32) -> i32 {
        self.clauses
            .iter()
            .map(|c| c.inference_vote(x))
            .sum::<i32>()
            .clamp(-threshold, threshold)
    }

    /// Training class sum: empty clauses fire.
    fn training_sum(&self, x: &[u8], threshold: i32, exec: &Executor) -> i32 {
        exec.sum_votes(&self.clauses, |c| c.vote(x))
            .clamp(-threshold, threshold)
    }

    /// # Overview
    ///
    /// Gives each clause feedback with probability `gate`.
    ///
    /// For the target class positive clauses get Type I and negative clauses
    /// Type II; for the sampled negative class the roles swap.
    fn feedback(&mut self, x: &[u8], gate: f32, is_target: bool, probs: TypeIProbs, exec: &Executor) {
        exec.for_each_clause(&mut self.clauses, &mut self.streams, |clause, rng| {
            if !bernoulli(rng, gate) {
                return;
            }
            let fires = clause.evaluate(x);
            if (clause.polarity() == 1) == is_target {
                type_i(clause, x, fires, probs, rng);
            } else {
                type_ii(clause, x, fires);
            }
        });
    }
}

/// # Overview
///
/// Multi-class Tsetlin Machine over binary features.
///
/// Owns one [`ClassModel`] per class. Class labels are dense indices
/// `0..n_classes`; mapping user labels is left to
/// [`TsetlinClassifier`](crate::TsetlinClassifier).
///
/// # Examples
///
/// ```
/// use tsetlin_engine::{Config, TsetlinMachine};
///
/// let config = Config::builder().clauses(10).random_state(1).build().unwrap();
/// let tm = TsetlinMachine::new(config, 4, 3).unwrap();
///
/// assert!(tm.predict(&[1, 0, 1, 0]) < 3);
/// ```
#[derive(Debug, Clone)]
pub struct TsetlinMachine {
    pub(crate) config:     Config,
    pub(crate) n_features: usize,
    pub(crate) seed:       u64,
    pub(crate) classes:    Vec<ClassModel>,
    pub(crate) master:     FastRng
}

impl TsetlinMachine {
    /// # Overview
    ///
    /// Creates a machine for `n_features` inputs and `n_classes` classes.
    ///
    /// Configuration and shape are checked before any automaton is
    /// allocated. Without `random_state` a seed is drawn from entropy; it is
    /// available afterwards through [`TsetlinMachine::seed`].
    pub fn new(config: Config, n_features: usize, n_classes: usize) -> Result<Self> {
        config.validate()?;
        if n_features == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                got:      0
            });
        }
        if n_classes < 2 {
            return Err(Error::InsufficientClasses {
                found: n_classes
            });
        }

        let seed = config.random_state.unwrap_or_else(entropy_seed);
        let classes = (0..n_classes)
            .map(|c| ClassModel::new(c, &config, n_features, seed))
            .collect();
        log::debug!(
            "created tsetlin machine: {n_classes} classes x {} clauses, {n_features} features, seed {seed}",
            config.clauses_per_class()
        );

        Ok(Self {
            config,
            n_features,
            seed,
            classes,
            master: stream_rng(seed, MASTER_STREAM)
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Seed the machine's streams were derived from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn class_models(&self) -> &[ClassModel] {
        &self.classes
    }

    /// Total number of clauses across classes.
    pub fn clause_count(&self) -> usize {
        self.classes.iter().map(|m| m.clauses.len()).sum()
    }

    /// # Overview
    ///
    /// Automaton states indexed `[class][clause][literal]`.
    pub fn automaton_states(&self) -> Vec<Vec<Vec<i32>>> {
        self.classes
            .iter()
            .map(|m| m.clauses.iter().map(Clause::states).collect())
            .collect()
    }

    /// # Overview
    ///
    /// Clamped inference sum of class `class` for input x.
    ///
    /// # Panics
    ///
    /// Panics if `class >= n_classes()`.
    #[inline]
    pub fn class_sum(&self, class: usize, x: &[u8]) -> i32 {
        self.classes[class].class_sum(x, self.config.threshold)
    }

    /// # Overview
    ///
    /// Clamped inference sums of every class.
    pub fn class_sums(&self, x: &[u8]) -> Vec<i32> {
        self.classes
            .iter()
            .map(|m| m.class_sum(x, self.config.threshold))
            .collect()
    }

    /// # Overview
    ///
    /// Predicts the class with the highest sum; ties go to the lowest index.
    #[inline]
    pub fn predict(&self, x: &[u8]) -> usize {
        argmax(&self.class_sums(x))
    }

    /// # Overview
    ///
    /// Batch prediction for multiple samples.
    pub fn predict_batch(&self, xs: &[Vec<u8>]) -> Vec<usize> {
        xs.iter().map(|x| self.predict(x)).collect()
    }

    /// # Overview
    ///
    /// One training step on a validated sample with class index `y`.
    ///
    /// Computes every class sum, then gives feedback to class `y` and to one
    /// other class drawn uniformly from the master stream. Returns the class
    /// predicted before the update.
    pub(crate) fn train_one(&mut self, x: &[u8], y: usize, exec: &Executor) -> usize {
        debug_assert!(y < self.classes.len());
        let threshold = self.config.threshold;
        let sums: Vec<i32> = self
            .classes
            .iter()
            .map(|m| m.training_sum(x, threshold, exec))
            .collect();
        let predicted = argmax(&sums);

        let negative = self.sample_negative(y);
        let probs = self.config.type_i_probs();

        self.classes[y].feedback(x, target_probability(sums[y], threshold), true, probs, exec);
        self.classes[negative].feedback(
            x,
            negative_probability(sums[negative], threshold),
            false,
            probs,
            exec
        );

        predicted
    }

    /// Uniform draw from every class except `y`.
    fn sample_negative(&mut self, y: usize) -> usize {
        let r = self.master.random_range(0..self.classes.len() - 1);
        if r >= y { r + 1 } else { r }
    }
}

/// Index of the first maximum.
pub(crate) fn argmax(values: &[i32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::builder()
            .clauses(6)
            .threshold(4)
            .random_state(17)
            .n_jobs(1)
            .build()
            .unwrap()
    }

    #[test]
    fn argmax_prefers_lowest_index() {
        assert_eq!(argmax(&[3, 7, 7, 1]), 1);
        assert_eq!(argmax(&[-2, -2]), 0);
        assert_eq!(argmax(&[5]), 0);
    }

    #[test]
    fn layout() {
        let tm = TsetlinMachine::new(config(), 3, 4).unwrap();
        assert_eq!(tm.n_classes(), 4);
        assert_eq!(tm.clause_count(), 4 * 12);
        for model in tm.class_models() {
            let positive = model.clauses().iter().filter(|c| c.polarity() == 1).count();
            assert_eq!(positive, 6);
            assert!(model.clauses().iter().all(|c| c.n_features() == 3));
        }
    }

    #[test]
    fn rejects_single_class() {
        let result = TsetlinMachine::new(config(), 3, 1);
        assert_eq!(result.unwrap_err(), Error::InsufficientClasses { found: 1 });
    }

    #[test]
    fn rejects_zero_features() {
        assert!(matches!(
            TsetlinMachine::new(config(), 0, 2),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn seeded_construction_is_reproducible() {
        let a = TsetlinMachine::new(config(), 5, 3).unwrap();
        let b = TsetlinMachine::new(config(), 5, 3).unwrap();
        assert_eq!(a.automaton_states(), b.automaton_states());
        assert_eq!(a.seed(), 17);
    }

    #[test]
    fn class_sums_clamped() {
        let mut tm = TsetlinMachine::new(config(), 2, 2).unwrap();
        let exec = Executor::Inline;
        let x = [1u8, 0];
        for _ in 0..200 {
            tm.train_one(&x, 0, &exec);
            for s in tm.class_sums(&x) {
                assert!((-4..=4).contains(&s));
            }
        }
    }

    #[test]
    fn negative_class_never_target() {
        let mut tm = TsetlinMachine::new(config(), 2, 5).unwrap();
        for y in 0..5 {
            for _ in 0..100 {
                let n = tm.sample_negative(y);
                assert_ne!(n, y);
                assert!(n < 5);
            }
        }
    }

    #[test]
    fn learns_single_feature() {
        let mut tm = TsetlinMachine::new(config(), 2, 2).unwrap();
        let exec = Executor::Inline;
        let data = [([0u8, 1], 0usize), ([1, 0], 1), ([0, 0], 0), ([1, 1], 1)];
        for _ in 0..300 {
            for (x, y) in &data {
                tm.train_one(x, *y, &exec);
            }
        }
        for (x, y) in &data {
            assert_eq!(tm.predict(x), *y);
        }
    }
}
