//! Binary classification metrics: confusion matrix, per-class
//! precision/recall/F1, ROC curve, and AUC.
//!
//! Labels are the encoded classes 0 and 1.

use serde::{Deserialize, Serialize};

/// Precision, recall, F1, and support of one class.
///
/// Undefined ratios (no predicted or no actual members) are 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Metrics of one original class value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub class: f64,
    #[serde(flatten)]
    pub metrics: ClassMetrics,
}

/// Per-class metrics with macro and support-weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: Vec<ClassEntry>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// A point of the ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
}

/// 2×2 confusion matrix; rows are actual classes, columns predicted.
pub fn confusion_matrix(actual: &[usize], predicted: &[usize]) -> [[usize; 2]; 2] {
    let mut m = [[0usize; 2]; 2];
    for (&a, &p) in actual.iter().zip(predicted.iter()) {
        if a < 2 && p < 2 {
            m[a][p] += 1;
        }
    }
    m
}

/// Fraction of matching labels. 0 for empty input.
pub fn accuracy(actual: &[usize], predicted: &[usize]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let hits = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, p)| a == p)
        .count();
    hits as f64 / actual.len() as f64
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Builds the classification report for encoded labels.
///
/// `classes` maps the encoded labels back to the original values.
pub fn classification_report(
    actual: &[usize],
    predicted: &[usize],
    classes: [f64; 2],
) -> ClassificationReport {
    let m = confusion_matrix(actual, predicted);
    let per_class: Vec<ClassEntry> = (0..2)
        .map(|k| {
            let tp = m[k][k];
            let predicted_k = m[0][k] + m[1][k];
            let support = m[k][0] + m[k][1];
            let precision = ratio(tp, predicted_k);
            let recall = ratio(tp, support);
            let f1_score = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassEntry {
                class: classes[k],
                metrics: ClassMetrics {
                    precision,
                    recall,
                    f1_score,
                    support,
                },
            }
        })
        .collect();

    let total: usize = per_class.iter().map(|e| e.metrics.support).sum();
    let average = |weight: &dyn Fn(&ClassMetrics) -> f64| -> ClassMetrics {
        let w_sum: f64 = per_class.iter().map(|e| weight(&e.metrics)).sum();
        let mean = |f: fn(&ClassMetrics) -> f64| {
            if w_sum == 0.0 {
                0.0
            } else {
                per_class
                    .iter()
                    .map(|e| weight(&e.metrics) * f(&e.metrics))
                    .sum::<f64>()
                    / w_sum
            }
        };
        ClassMetrics {
            precision: mean(|c| c.precision),
            recall: mean(|c| c.recall),
            f1_score: mean(|c| c.f1_score),
            support: total,
        }
    };
    let macro_avg = average(&|_| 1.0);
    let weighted_avg = average(&|c| c.support as f64);

    ClassificationReport {
        accuracy: accuracy(actual, predicted),
        per_class,
        macro_avg,
        weighted_avg,
    }
}

/// Receiver operating characteristic curve.
///
/// # Algorithm
///
/// Scores are visited in descending order; one point is emitted per distinct
/// threshold with cumulative true/false positive counts. Points that lie on
/// a straight segment between their neighbours are dropped, and the curve
/// starts at (0, 0).
///
/// # Returns
///
/// `None` if either class is absent, lengths differ, or a score is not
/// finite.
pub fn roc_curve(actual: &[usize], scores: &[f64]) -> Option<Vec<RocPoint>> {
    if actual.len() != scores.len() || scores.iter().any(|s| !s.is_finite()) {
        return None;
    }
    let positives = actual.iter().filter(|&&a| a == 1).count();
    let negatives = actual.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tps = Vec::new();
    let mut fps = Vec::new();
    let mut tp = 0usize;
    let mut fp = 0usize;
    for (rank, &i) in order.iter().enumerate() {
        if actual[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_group = order
            .get(rank + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_group {
            tps.push(tp as f64);
            fps.push(fp as f64);
        }
    }

    if tps.len() > 2 {
        let keep: Vec<usize> = (0..tps.len())
            .filter(|&k| {
                k == 0
                    || k == tps.len() - 1
                    || fps[k - 1] - 2.0 * fps[k] + fps[k + 1] != 0.0
                    || tps[k - 1] - 2.0 * tps[k] + tps[k + 1] != 0.0
            })
            .collect();
        tps = keep.iter().map(|&k| tps[k]).collect();
        fps = keep.iter().map(|&k| fps[k]).collect();
    }

    let mut points = vec![RocPoint { fpr: 0.0, tpr: 0.0 }];
    points.extend(tps.iter().zip(fps.iter()).map(|(&t, &f)| RocPoint {
        fpr: f / negatives as f64,
        tpr: t / positives as f64,
    }));
    Some(points)
}

/// Area under a ROC curve by the trapezoidal rule.
pub fn auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_and_accuracy() {
        let actual = [0, 0, 1, 1, 1];
        let predicted = [0, 1, 1, 1, 0];
        assert_eq!(confusion_matrix(&actual, &predicted), [[1, 1], [1, 2]]);
        assert!((accuracy(&actual, &predicted) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn report_metrics() {
        let actual = [0, 0, 1, 1, 1];
        let predicted = [0, 1, 1, 1, 0];
        let report = classification_report(&actual, &predicted, [3.0, 7.0]);
        let zero = report.per_class[0];
        assert_eq!(zero.class, 3.0);
        assert!((zero.metrics.precision - 0.5).abs() < 1e-12);
        assert!((zero.metrics.recall - 0.5).abs() < 1e-12);
        let one = report.per_class[1].metrics;
        assert!((one.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((one.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(one.support, 3);
        assert!((report.macro_avg.recall - (0.5 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((report.weighted_avg.recall - 0.6).abs() < 1e-12);
        assert_eq!(report.weighted_avg.support, 5);
    }

    #[test]
    fn report_without_predictions_for_class() {
        let report = classification_report(&[0, 1], &[0, 0], [0.0, 1.0]);
        assert_eq!(report.per_class[1].metrics.precision, 0.0);
        assert_eq!(report.per_class[1].metrics.f1_score, 0.0);
    }

    #[test]
    fn roc_perfect_separation() {
        let actual = [0, 0, 1, 1];
        let scores = [0.1, 0.2, 0.8, 0.9];
        let roc = roc_curve(&actual, &scores).unwrap();
        assert_eq!(roc.first(), Some(&RocPoint { fpr: 0.0, tpr: 0.0 }));
        assert_eq!(roc.last(), Some(&RocPoint { fpr: 1.0, tpr: 1.0 }));
        assert!(roc.contains(&RocPoint { fpr: 0.0, tpr: 1.0 }));
        assert!((auc(&roc) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn roc_known_auc() {
        // Classic example: AUC = 0.75
        let actual = [0, 0, 1, 1];
        let scores = [0.1, 0.4, 0.35, 0.8];
        let roc = roc_curve(&actual, &scores).unwrap();
        assert!((auc(&roc) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn roc_ties_share_a_threshold() {
        let actual = [0, 1, 0, 1];
        let scores = [0.5, 0.5, 0.5, 0.5];
        let roc = roc_curve(&actual, &scores).unwrap();
        assert_eq!(roc.len(), 2);
        assert!((auc(&roc) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn roc_undefined_for_single_class() {
        assert!(roc_curve(&[1, 1], &[0.2, 0.9]).is_none());
        assert!(roc_curve(&[0, 1], &[f64::NAN, 0.9]).is_none());
    }
}
