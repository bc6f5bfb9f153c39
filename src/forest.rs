use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::training_set::{FEATURE_COUNT, FeatureVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features tried per split; `None` means floor(sqrt(FEATURE_COUNT)).
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn features_per_split(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| (FEATURE_COUNT as f64).sqrt().floor() as usize)
            .clamp(1, FEATURE_COUNT)
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        probs: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_probs(&self, x: &FeatureVector) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { probs } => return probs,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    classes: Vec<usize>,
    trees: Vec<DecisionTree>,
    feature_importances: FeatureVector,
}

impl RandomForestClassifier {
    pub fn fit(params: ForestParams, xs: &[FeatureVector], labels: &[usize]) -> Result<Self> {
        if xs.is_empty() || labels.is_empty() {
            return Err(ForecastError::EmptyTrainingSet);
        }
        if xs.len() != labels.len() {
            return Err(ForecastError::LabelCountMismatch {
                rows: xs.len(),
                labels: labels.len(),
            });
        }

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let ys: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let mut master = StdRng::seed_from_u64(params.seed);
        let n_trees = params.n_trees.max(1);
        let mut trees = Vec::with_capacity(n_trees);
        let mut importances = [0.0; FEATURE_COUNT];

        for _ in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(master.r#gen::<u64>());
            let sample: Vec<usize> = (0..xs.len()).map(|_| rng.gen_range(0..xs.len())).collect();

            let mut builder = TreeBuilder {
                xs,
                ys: &ys,
                n_classes: classes.len(),
                params: &params,
                rng: &mut rng,
                nodes: Vec::new(),
                importances: [0.0; FEATURE_COUNT],
            };
            builder.grow(&sample, 0);

            let total: f64 = builder.importances.iter().sum();
            if total > 0.0 {
                for (acc, v) in importances.iter_mut().zip(builder.importances) {
                    *acc += v / total;
                }
            }
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for v in &mut importances {
                *v /= total;
            }
        }

        log::debug!(
            "fitted {} trees on {} rows, {} classes",
            trees.len(),
            xs.len(),
            classes.len()
        );

        Ok(Self {
            classes,
            trees,
            feature_importances: importances,
        })
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn feature_importances(&self) -> FeatureVector {
        self.feature_importances
    }

    pub fn predict_proba(&self, x: &FeatureVector) -> Vec<f64> {
        let mut out = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in out.iter_mut().zip(tree.leaf_probs(x)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        for v in &mut out {
            *v /= n;
        }
        out
    }

    pub fn predict(&self, x: &FeatureVector) -> usize {
        self.most_likely(&self.predict_proba(x))
    }

    /// Class with the highest probability in `probs` (as returned by
    /// `predict_proba`); ties go to the smaller label.
    pub fn most_likely(&self, probs: &[f64]) -> usize {
        let mut best = 0;
        for (idx, p) in probs.iter().enumerate() {
            if *p > probs[best] {
                best = idx;
            }
        }
        self.classes[best]
    }
}

struct TreeBuilder<'a> {
    xs: &'a [FeatureVector],
    ys: &'a [usize],
    n_classes: usize,
    params: &'a ForestParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
    importances: FeatureVector,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, samples: &[usize], depth: usize) -> usize {
        let counts = self.class_counts(samples);
        let impurity = gini(&counts, samples.len());
        let at_max_depth = self.params.max_depth.is_some_and(|d| depth >= d);

        if impurity <= 0.0 || at_max_depth || samples.len() < self.params.min_samples_split.max(2)
        {
            return self.push_leaf(&counts, samples.len());
        }
        let Some(split) = self.best_split(samples) else {
            return self.push_leaf(&counts, samples.len());
        };

        let n = samples.len() as f64;
        self.importances[split.feature] += n * impurity - n * split.impurity;

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { probs: Vec::new() });
        let left = self.grow(&split.left, depth + 1);
        let right = self.grow(&split.right, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn push_leaf(&mut self, counts: &[f64], total: usize) -> usize {
        let total = total.max(1) as f64;
        self.nodes.push(Node::Leaf {
            probs: counts.iter().map(|c| c / total).collect(),
        });
        self.nodes.len() - 1
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &s in samples {
            counts[self.ys[s]] += 1.0;
        }
        counts
    }

    /// Tries `features_per_split` random features, and keeps drawing from the
    /// rest only while none of them could split the node.
    fn best_split(&mut self, samples: &[usize]) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        features.shuffle(&mut *self.rng);
        let wanted = self.params.features_per_split();

        let mut best: Option<(usize, f64, f64)> = None;
        for (tried, &feature) in features.iter().enumerate() {
            if tried >= wanted && best.is_some() {
                break;
            }
            let Some((threshold, impurity)) = self.best_threshold(samples, feature) else {
                continue;
            };
            if best.is_none_or(|(_, _, b)| impurity < b) {
                best = Some((feature, threshold, impurity));
            }
        }

        let (feature, threshold, impurity) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .copied()
            .partition(|&s| self.xs[s][feature] <= threshold);
        Some(SplitCandidate {
            feature,
            threshold,
            impurity,
            left,
            right,
        })
    }

    fn best_threshold(&self, samples: &[usize], feature: usize) -> Option<(f64, f64)> {
        let mut order: Vec<usize> = samples.to_vec();
        order.sort_by(|&a, &b| self.xs[a][feature].total_cmp(&self.xs[b][feature]));

        let n = order.len();
        let mut right = self.class_counts(&order);
        let mut left = vec![0.0; self.n_classes];
        let mut best: Option<(f64, f64)> = None;

        for i in 0..n - 1 {
            let class = self.ys[order[i]];
            left[class] += 1.0;
            right[class] -= 1.0;

            let here = self.xs[order[i]][feature];
            let next = self.xs[order[i + 1]][feature];
            if here >= next {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;
            if best.is_none_or(|(_, b)| impurity < b) {
                best = Some(((here + next) / 2.0, impurity));
            }
        }
        best
    }
}

fn gini(counts: &[f64], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_rows() -> (Vec<FeatureVector>, Vec<usize>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..30 {
            let label = i % 3 + 1;
            let base = (4 - label) as f64 * 20.0;
            xs.push([
                base + (i % 5) as f64,
                base / 3.0,
                5.0,
                label as f64 * 4.0,
                base,
                10.0,
                base - 10.0,
            ]);
            ys.push(label);
        }
        (xs, ys)
    }

    #[test]
    fn learns_a_separable_problem() {
        let (xs, ys) = separable_rows();
        let forest = RandomForestClassifier::fit(
            ForestParams {
                n_trees: 25,
                ..ForestParams::default()
            },
            &xs,
            &ys,
        )
        .unwrap();
        assert_eq!(forest.classes(), &[1, 2, 3]);
        for (x, y) in xs.iter().zip(&ys) {
            assert_eq!(forest.predict(x), *y);
        }
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (xs, ys) = separable_rows();
        let forest = RandomForestClassifier::fit(ForestParams::default(), &xs, &ys).unwrap();
        let p = forest.predict_proba(&[35.0, 7.0, 5.0, 6.0, 30.0, 10.0, 0.0]);
        assert_eq!(p.len(), 3);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_forest() {
        let (xs, ys) = separable_rows();
        let a = RandomForestClassifier::fit(ForestParams::default(), &xs, &ys).unwrap();
        let b = RandomForestClassifier::fit(ForestParams::default(), &xs, &ys).unwrap();
        let probe = [41.0, 9.0, 5.0, 7.0, 33.0, 10.0, 12.0];
        assert_eq!(a.predict_proba(&probe), b.predict_proba(&probe));
        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn importances_are_normalized() {
        let (xs, ys) = separable_rows();
        let forest = RandomForestClassifier::fit(ForestParams::default(), &xs, &ys).unwrap();
        let total: f64 = forest.feature_importances().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        // Columns 2 and 5 are constant and can never split a node.
        assert_eq!(forest.feature_importances()[2], 0.0);
        assert_eq!(forest.feature_importances()[5], 0.0);
    }

    #[test]
    fn constant_features_fall_back_to_a_single_leaf() {
        let xs = vec![[1.0; FEATURE_COUNT]; 4];
        let ys = vec![1, 2, 1, 2];
        let forest = RandomForestClassifier::fit(ForestParams::default(), &xs, &ys).unwrap();
        let p = forest.predict_proba(&[1.0; FEATURE_COUNT]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(forest.feature_importances(), [0.0; FEATURE_COUNT]);
    }

    #[test]
    fn rejects_empty_training_data() {
        assert!(matches!(
            RandomForestClassifier::fit(ForestParams::default(), &[], &[]),
            Err(ForecastError::EmptyTrainingSet)
        ));
    }
}
