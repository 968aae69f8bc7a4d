//! XOR classification example.

use tsetlin_engine::{Config, TsetlinClassifier};

fn main() {
    let config = Config::builder()
        .clauses(5)
        .states(100)
        .specificity(3.9)
        .threshold(15)
        .random_state(42)
        .build()
        .expect("valid config");

    let mut clf = TsetlinClassifier::new(config);

    let patterns = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
    let labels = vec![0, 1, 1, 0];
    let x: Vec<Vec<u8>> = patterns.iter().cycle().take(100).cloned().collect();
    let y: Vec<i64> = labels.iter().cycle().take(100).copied().collect();

    println!("Training on XOR dataset...");
    let report = clf.fit(&x, &y, 100).expect("valid training data");
    println!("Final online accuracy: {:.1}%", report.final_accuracy() * 100.0);

    println!("\nPredictions:");
    let predicted = clf.predict(&patterns).expect("fitted");
    let proba = clf.predict_proba(&patterns).expect("fitted");
    for ((xi, &yi), (pred, p)) in patterns.iter().zip(&labels).zip(predicted.iter().zip(&proba)) {
        let status = if *pred == yi { "OK" } else { "WRONG" };
        println!("  {:?} -> {} {:?} (expected: {}) {}", xi, pred, p, yi, status);
    }

    println!(
        "\nAccuracy: {:.1}%",
        clf.score(&patterns, &labels).expect("fitted") * 100.0
    );

    println!("\nLearned clauses for class 1:");
    let machine = clf.machine().expect("fitted");
    for (i, clause) in machine.class_models()[1]
        .clauses()
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
    {
        let literals: Vec<String> = clause
            .automata()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.includes())
            .map(|(k, _)| {
                if k % 2 == 0 {
                    format!("x{}", k / 2)
                } else {
                    format!("!x{}", k / 2)
                }
            })
            .collect();
        let sign = if clause.polarity() > 0 { '+' } else { '-' };
        println!("  Clause {} ({}): {}", i, sign, literals.join(" & "));
    }
}
