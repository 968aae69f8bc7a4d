//! Training options, the epoch loop and training reports.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering}
};

use log::Level;

use crate::{
    TsetlinMachine,
    error::{Error, Result},
    parallel::Executor,
    utils::shuffle
};

/// Progress callback type for training.
///
/// Called after each epoch with (epoch, online accuracy).
/// Return `false` to stop training.
pub type ProgressCallback = Box<dyn FnMut(usize, f32) -> bool + Send>;

/// Options for one training run.
pub struct FitOptions {
    pub epochs:   usize,
    pub shuffle:  bool,
    pub cancel:   Option<Arc<AtomicBool>>,
    pub callback: Option<ProgressCallback>
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::new(500)
    }
}

impl core::fmt::Debug for FitOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FitOptions")
            .field("epochs", &self.epochs)
            .field("shuffle", &self.shuffle)
            .field("cancel", &self.cancel)
            .field("callback", &self.callback.as_ref().map(|_| "..."))
            .finish()
    }
}

impl FitOptions {
    /// Creates options running `epochs` epochs with shuffling.
    #[must_use]
    pub fn new(epochs: usize) -> Self {
        Self {
            epochs,
            shuffle: true,
            cancel: None,
            callback: None
        }
    }

    /// Disables shuffling of training data.
    #[must_use]
    pub fn no_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Sets a cancellation flag.
    ///
    /// The flag is read between epochs only; an epoch in progress always
    /// completes.
    #[must_use]
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Sets progress callback.
    ///
    /// # Example
    ///
    /// ```
    /// use tsetlin_engine::FitOptions;
    ///
    /// let opts = FitOptions::new(100).with_callback(|epoch, acc| {
    ///     println!("Epoch {}: {:.1}%", epoch, acc * 100.0);
    ///     acc < 1.0
    /// });
    /// ```
    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, f32) -> bool + Send + 'static
    {
        self.callback = Some(Box::new(callback));
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }
}

/// Result of training.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    /// Number of epochs actually run.
    pub epochs_run: usize,
    /// Whether the cancellation flag or the callback ended training.
    pub stopped:    bool,
    /// Online accuracy per epoch: share of samples whose prediction, made
    /// right before their update, was correct.
    pub history:    Vec<f32>
}

impl FitReport {
    /// Online accuracy of the last epoch, 0.0 if none ran.
    #[must_use]
    pub fn final_accuracy(&self) -> f32 {
        self.history.last().copied().unwrap_or(0.0)
    }
}

/// # Overview
///
/// Checks a feature matrix: every row has `n_features` entries, all 0 or 1.
pub(crate) fn check_samples(x: &[Vec<u8>], n_features: usize) -> Result<()> {
    for (row, xi) in x.iter().enumerate() {
        if xi.len() != n_features {
            return Err(Error::DimensionMismatch {
                expected: n_features,
                got:      xi.len()
            });
        }
        if let Some((col, &value)) = xi.iter().enumerate().find(|(_, v)| **v > 1) {
            return Err(Error::NonBinaryFeature {
                row,
                col,
                value
            });
        }
    }
    Ok(())
}

impl TsetlinMachine {
    /// # Overview
    ///
    /// Trains for `epochs` epochs with shuffling.
    ///
    /// Continues from the current automaton and random state, so calling
    /// this twice equals one call with the epochs summed.
    pub fn fit(&mut self, x: &[Vec<u8>], y: &[usize], epochs: usize) -> Result<FitReport> {
        self.fit_with_options(x, y, FitOptions::new(epochs))
    }

    /// # Overview
    ///
    /// Training with full options.
    ///
    /// Inputs are validated before the first update. Each epoch optionally
    /// shuffles the sample order, then runs one training step per sample.
    /// Cancellation and the callback are consulted between epochs.
    pub fn fit_with_options(
        &mut self,
        x: &[Vec<u8>],
        y: &[usize],
        mut opts: FitOptions
    ) -> Result<FitReport> {
        if x.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                samples: x.len(),
                labels:  y.len()
            });
        }
        check_samples(x, self.n_features)?;
        if let Some(&bad) = y.iter().find(|&&yi| yi >= self.n_classes()) {
            return Err(Error::UnknownLabel(bad as i64));
        }

        let exec = Executor::new(self.config.resolved_jobs())?;
        let level = if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        };
        log::debug!(
            "training {} samples for {} epochs on {} worker(s)",
            x.len(),
            opts.epochs,
            exec.workers()
        );

        let mut indices: Vec<usize> = (0..x.len()).collect();
        let mut history = Vec::with_capacity(opts.epochs);
        let mut stopped = false;

        for epoch in 0..opts.epochs {
            if opts.cancelled() {
                log::debug!("training cancelled before epoch {}", epoch + 1);
                stopped = true;
                break;
            }

            // Order depends only on the master stream, so resumed runs match.
            indices.iter_mut().enumerate().for_each(|(i, v)| *v = i);
            if opts.shuffle {
                shuffle(&mut indices, &mut self.master);
            }

            let mut mistakes = 0usize;
            for &i in &indices {
                if self.train_one(&x[i], y[i], &exec) != y[i] {
                    mistakes += 1;
                }
            }

            let accuracy = 1.0 - mistakes as f32 / x.len() as f32;
            history.push(accuracy);
            log::log!(
                level,
                "epoch {}/{}: {mistakes} mistakes, online accuracy {:.4}",
                epoch + 1,
                opts.epochs,
                accuracy
            );

            if let Some(ref mut callback) = opts.callback
                && !callback(epoch + 1, accuracy)
            {
                stopped = true;
                break;
            }
        }

        Ok(FitReport {
            epochs_run: history.len(),
            stopped,
            history
        })
    }

    /// Evaluates accuracy on class indices.
    ///
    /// Returns fraction of correct predictions (0.0 to 1.0).
    #[must_use]
    pub fn evaluate(&self, x: &[Vec<u8>], y: &[usize]) -> f32 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = x
            .iter()
            .zip(y)
            .filter(|(xi, yi)| self.predict(xi) == **yi)
            .count();
        correct as f32 / x.len() as f32
    }
}
