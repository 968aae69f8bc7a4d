//! Estimator front end: label mapping, input validation and the
//! fit / partial_fit / predict family.

use crate::{
    Config, FitOptions, FitReport, TsetlinMachine,
    error::{Error, Result},
    parallel::Executor,
    persist,
    training::check_samples
};

/// # Overview
///
/// State produced by a successful fit.
#[derive(Debug, Clone)]
pub struct Fitted {
    /// Sorted distinct labels; position = class index.
    pub(crate) classes: Vec<i64>,
    pub(crate) machine: TsetlinMachine
}

impl Fitted {
    pub(crate) fn new(classes: Vec<i64>, machine: TsetlinMachine) -> Self {
        debug_assert_eq!(classes.len(), machine.n_classes());
        Self {
            classes,
            machine
        }
    }

    #[inline]
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    #[inline]
    pub fn machine(&self) -> &TsetlinMachine {
        &self.machine
    }
}

/// # Overview
///
/// Multi-class Tsetlin Machine classifier over arbitrary integer labels.
///
/// Construction never allocates automata; the machine is built by
/// [`fit`](TsetlinClassifier::fit) once the feature count and label set are
/// known. Querying before that fails with [`Error::NotFitted`].
///
/// # Examples
///
/// ```
/// use tsetlin_engine::{Config, TsetlinClassifier};
///
/// let config = Config::builder()
///     .clauses(10)
///     .specificity(3.9)
///     .threshold(15)
///     .random_state(42)
///     .n_jobs(1)
///     .build()
///     .unwrap();
/// let mut clf = TsetlinClassifier::new(config);
/// assert!(clf.predict(&[vec![0, 1]]).unwrap_err().is_not_fitted());
///
/// let x = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
/// let y = vec![10, 20, 20, 10];
/// clf.fit(&x, &y, 50).unwrap();
///
/// assert_eq!(clf.classes(), Some(&[10, 20][..]));
/// assert_eq!(clf.predict(&x).unwrap().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct TsetlinClassifier {
    config: Config,
    fitted: Option<Fitted>
}

impl TsetlinClassifier {
    /// Creates an unfitted classifier.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fitted: None
        }
    }

    /// # Overview
    ///
    /// Creates an unfitted classifier from hyperparameter JSON, see
    /// [`Config::from_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(Config::from_json(json)?))
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Labels seen during fit, sorted ascending.
    pub fn classes(&self) -> Option<&[i64]> {
        self.fitted.as_ref().map(Fitted::classes)
    }

    /// Feature count seen during fit.
    pub fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.machine.n_features())
    }

    pub fn machine(&self) -> Option<&TsetlinMachine> {
        self.fitted.as_ref().map(Fitted::machine)
    }

    /// # Overview
    ///
    /// Trains a fresh machine for `n_iter` epochs, discarding any previous
    /// fit.
    pub fn fit(&mut self, x: &[Vec<u8>], y: &[i64], n_iter: usize) -> Result<FitReport> {
        self.fit_with_options(x, y, FitOptions::new(n_iter))
    }

    /// # Overview
    ///
    /// [`fit`](TsetlinClassifier::fit) with shuffling, cancellation and
    /// progress options.
    ///
    /// Validation order: configuration, iteration count, shapes, binary
    /// features, label count. All checks run before any automaton exists.
    pub fn fit_with_options(
        &mut self,
        x: &[Vec<u8>],
        y: &[i64],
        opts: FitOptions
    ) -> Result<FitReport> {
        self.config.validate()?;
        if opts.epochs == 0 {
            return Err(Error::InvalidIterations);
        }
        let n_features = check_training_data(x, y)?;

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(Error::InsufficientClasses {
                found: classes.len()
            });
        }

        let indices = map_labels(&classes, y)?;
        let mut machine = TsetlinMachine::new(self.config, n_features, classes.len())?;
        let report = machine.fit_with_options(x, &indices, opts)?;
        self.fitted = Some(Fitted::new(classes, machine));
        Ok(report)
    }

    /// # Overview
    ///
    /// Continues training the fitted machine for `n_iter` epochs from its
    /// current state. An unfitted classifier is fitted from scratch.
    ///
    /// Labels must come from the set seen at fit time and the feature count
    /// must match.
    pub fn partial_fit(&mut self, x: &[Vec<u8>], y: &[i64], n_iter: usize) -> Result<FitReport> {
        if self.fitted.is_none() {
            return self.fit(x, y, n_iter);
        }
        if n_iter == 0 {
            return Err(Error::InvalidIterations);
        }
        let n_features = check_training_data(x, y)?;
        let fitted = self.fitted.as_mut().ok_or(Error::NotFitted)?;
        if n_features != fitted.machine.n_features() {
            return Err(Error::DimensionMismatch {
                expected: fitted.machine.n_features(),
                got:      n_features
            });
        }
        let indices = map_labels(&fitted.classes, y)?;

        log::debug!("resuming training for {n_iter} epochs on {} samples", x.len());
        fitted.machine.fit(x, &indices, n_iter)
    }

    /// # Overview
    ///
    /// Predicts a label per row.
    pub fn predict(&self, x: &[Vec<u8>]) -> Result<Vec<i64>> {
        let fitted = self.fitted_for(x)?;
        let exec = executor(fitted, x.len())?;
        Ok(exec.map_rows(x, |row| fitted.classes[fitted.machine.predict(row)]))
    }

    /// # Overview
    ///
    /// Clamped inference class sums per row, columns ordered as
    /// [`classes`](TsetlinClassifier::classes).
    pub fn decision_function(&self, x: &[Vec<u8>]) -> Result<Vec<Vec<i32>>> {
        let fitted = self.fitted_for(x)?;
        let exec = executor(fitted, x.len())?;
        Ok(exec.map_rows(x, |row| fitted.machine.class_sums(row)))
    }

    /// # Overview
    ///
    /// Class scores per row that sum to 1.
    ///
    /// Each class sum is shifted by the threshold T into `[0, 2T]` and
    /// divided by the row total; a row where every class sits at `-T` gets
    /// uniform scores. The transform is monotone in the class sum, so the
    /// highest score is the predicted class, but the values are not
    /// calibrated probabilities.
    pub fn predict_proba(&self, x: &[Vec<u8>]) -> Result<Vec<Vec<f32>>> {
        let fitted = self.fitted_for(x)?;
        let exec = executor(fitted, x.len())?;
        let threshold = fitted.machine.config().threshold;
        Ok(exec.map_rows(x, |row| {
            scores_from_sums(&fitted.machine.class_sums(row), threshold)
        }))
    }

    /// # Overview
    ///
    /// Mean accuracy on labelled data.
    pub fn score(&self, x: &[Vec<u8>], y: &[i64]) -> Result<f32> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                samples: x.len(),
                labels:  y.len()
            });
        }
        if x.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let predictions = self.predict(x)?;
        let correct = predictions.iter().zip(y).filter(|(p, t)| p == t).count();
        Ok(correct as f32 / x.len() as f32)
    }

    /// # Overview
    ///
    /// Exports the fitted model as a versioned blob, see [`persist`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let fitted = self.fitted.as_ref().ok_or(Error::NotFitted)?;
        persist::to_bytes(fitted)
    }

    /// # Overview
    ///
    /// Restores a fitted classifier from [`to_bytes`](Self::to_bytes)
    /// output. The restored classifier predicts and keeps training exactly
    /// as the exported one would.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fitted = persist::from_bytes(bytes)?;
        Ok(Self {
            config: *fitted.machine.config(),
            fitted: Some(fitted)
        })
    }

    fn fitted_for(&self, x: &[Vec<u8>]) -> Result<&Fitted> {
        let fitted = self.fitted.as_ref().ok_or(Error::NotFitted)?;
        check_samples(x, fitted.machine.n_features())?;
        Ok(fitted)
    }
}

fn executor(fitted: &Fitted, rows: usize) -> Result<Executor> {
    Executor::for_rows(fitted.machine.config().resolved_jobs(), rows)
}

/// Validates training shapes and returns the feature count.
fn check_training_data(x: &[Vec<u8>], y: &[i64]) -> Result<usize> {
    if x.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            samples: x.len(),
            labels:  y.len()
        });
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(Error::DimensionMismatch {
            expected: 1,
            got:      0
        });
    }
    check_samples(x, n_features)?;
    Ok(n_features)
}

fn map_labels(classes: &[i64], y: &[i64]) -> Result<Vec<usize>> {
    y.iter()
        .map(|&label| {
            classes
                .binary_search(&label)
                .map_err(|_| Error::UnknownLabel(label))
        })
        .collect()
}

/// Shift-and-normalise transform behind `predict_proba`.
pub(crate) fn scores_from_sums(sums: &[i32], threshold: i32) -> Vec<f32> {
    let shifted: Vec<f32> = sums
        .iter()
        .map(|&s| (s.clamp(-threshold, threshold) + threshold) as f32)
        .collect();
    let total: f32 = shifted.iter().sum();
    if total <= 0.0 {
        let uniform = 1.0 / sums.len() as f32;
        return vec![uniform; sums.len()];
    }
    shifted.iter().map(|v| v / total).collect()
}
