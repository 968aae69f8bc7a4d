//! Type I and Type II feedback mechanisms.
//!
//! Type I feedback makes a clause memorise the literals that are true in the
//! current sample and forget the rest. Type II feedback includes a literal
//! that is false in the sample so a wrongly firing clause stops firing.

use rand::Rng;

use crate::{Clause, utils::bernoulli};

/// # Overview
///
/// Inner probabilities of Type I feedback, clamped into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeIProbs {
    /// Probability of stepping toward exclude: 1/s.
    pub forget:   f32,
    /// Probability of stepping a true literal toward include: (s-1)/s.
    pub memorise: f32,
    /// Memorise true literals unconditionally.
    pub boost:    bool
}

impl TypeIProbs {
    /// # Overview
    ///
    /// Derives probabilities from the specificity `s`.
    pub fn new(s: f32, boost: bool) -> Self {
        let forget = (1.0 / s).clamp(0.0, 1.0);
        let memorise = ((s - 1.0) / s).clamp(0.0, 1.0);
        debug_assert!(forget.is_finite() && memorise.is_finite());
        Self {
            forget,
            memorise,
            boost
        }
    }
}

/// # Overview
///
/// Probability that a clause of the target class receives feedback:
/// (T - sum) / 2T.
#[inline]
pub fn target_probability(class_sum: i32, threshold: i32) -> f32 {
    let t = threshold as f32;
    ((t - class_sum.clamp(-threshold, threshold) as f32) / (2.0 * t)).clamp(0.0, 1.0)
}

/// # Overview
///
/// Probability that a clause of the sampled negative class receives
/// feedback: (T + sum) / 2T.
#[inline]
pub fn negative_probability(class_sum: i32, threshold: i32) -> f32 {
    let t = threshold as f32;
    ((t + class_sum.clamp(-threshold, threshold) as f32) / (2.0 * t)).clamp(0.0, 1.0)
}

/// # Overview
///
/// Type I feedback.
///
/// When the clause does not fire every automaton steps toward exclude with
/// probability 1/s. When it fires, the automaton of each true literal steps
/// toward include with probability (s-1)/s (always under boost) and the
/// automaton of each false literal steps toward exclude with probability
/// 1/s.
pub fn type_i<R: Rng>(clause: &mut Clause, x: &[u8], fires: bool, probs: TypeIProbs, rng: &mut R) {
    let automata = clause.automata_mut();

    if !fires {
        for a in automata.iter_mut() {
            if bernoulli(rng, probs.forget) {
                a.decrement();
            }
        }
        return;
    }

    for (pair, &xk) in automata.chunks_exact_mut(2).zip(x) {
        let (true_lit, false_lit) = if xk != 0 { (0, 1) } else { (1, 0) };
        if probs.boost || bernoulli(rng, probs.memorise) {
            pair[true_lit].increment();
        }
        if bernoulli(rng, probs.forget) {
            pair[false_lit].decrement();
        }
    }
}

/// # Overview
///
/// Type II feedback: corrects false positives.
///
/// Only acts on firing clauses. Every excluded literal that is false in the
/// sample steps toward include, so the clause will reject this input.
pub fn type_ii(clause: &mut Clause, x: &[u8], fires: bool) {
    if !fires {
        return;
    }
    let automata = clause.automata_mut();

    for (pair, &xk) in automata.chunks_exact_mut(2).zip(x) {
        let false_lit = if xk != 0 { 1 } else { 0 };
        if !pair[false_lit].includes() {
            pair[false_lit].increment();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng_from_seed;

    #[test]
    fn probs_from_specificity() {
        let p = TypeIProbs::new(4.0, false);
        assert!((p.forget - 0.25).abs() < 1e-6);
        assert!((p.memorise - 0.75).abs() < 1e-6);
    }

    #[test]
    fn probs_are_clamped() {
        let small = TypeIProbs::new(0.01, false);
        assert_eq!(small.forget, 1.0);
        assert_eq!(small.memorise, 0.0);

        let large = TypeIProbs::new(1e30, false);
        assert!(large.forget >= 0.0 && large.forget < 1e-6);
        assert!((large.memorise - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gate_probabilities() {
        assert!((target_probability(0, 10) - 0.5).abs() < 1e-6);
        assert_eq!(target_probability(10, 10), 0.0);
        assert_eq!(target_probability(-50, 10), 1.0);
        assert_eq!(negative_probability(-10, 10), 0.0);
        assert_eq!(negative_probability(99, 10), 1.0);
    }

    #[test]
    fn type_i_not_firing() {
        let mut clause = Clause::new(3, 100, 1);
        let mut rng = rng_from_seed(42);
        let probs = TypeIProbs::new(3.0, false);

        for _ in 0..100 {
            type_i(&mut clause, &[1, 0, 1], false, probs, &mut rng);
        }

        assert!(clause.automata().iter().all(|a| a.state() < 100));
    }

    #[test]
    fn type_i_firing() {
        let mut clause = Clause::new(3, 50, 1);
        let mut rng = rng_from_seed(42);
        let probs = TypeIProbs::new(3.0, false);

        for _ in 0..200 {
            type_i(&mut clause, &[1, 0, 1], true, probs, &mut rng);
        }

        assert!(clause.automata()[0].includes());
        assert!(clause.automata()[3].includes());
        assert!(clause.automata()[4].includes());
        assert!(!clause.automata()[1].includes());
    }

    #[test]
    fn boost_always_memorises() {
        let mut clause = Clause::new(2, 50, 1);
        let mut rng = rng_from_seed(9);
        let probs = TypeIProbs::new(1e9, true);

        for _ in 0..5 {
            type_i(&mut clause, &[1, 0], true, probs, &mut rng);
        }

        assert_eq!(clause.automata()[0].state(), 55);
        assert_eq!(clause.automata()[3].state(), 55);
    }

    #[test]
    fn type_ii_blocks() {
        let mut clause = Clause::new(3, 50, 1);

        for _ in 0..100 {
            type_ii(&mut clause, &[1, 0, 1], true);
        }

        assert!(clause.automata()[1].includes());
        assert!(clause.automata()[2].includes());
        assert!(clause.automata()[5].includes());
        assert!(!clause.evaluate(&[1, 0, 1]));
    }

    #[test]
    fn type_ii_ignores_silent_clause() {
        let mut clause = Clause::new(3, 50, 1);
        let before = clause.clone();
        type_ii(&mut clause, &[1, 0, 1], false);
        assert_eq!(clause, before);
    }

    #[test]
    fn type_ii_stops_at_include_boundary() {
        let mut clause = Clause::new(1, 50, 1);
        for _ in 0..10 {
            type_ii(&mut clause, &[0], true);
        }
        assert_eq!(clause.automata()[0].state(), 51);
    }
}
