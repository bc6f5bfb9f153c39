use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::training_set::{FEATURE_COUNT, FeatureVector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_means: FeatureVector,
    pub feature_stds: FeatureVector,
}

impl StandardScaler {
    pub fn fit(samples: &[FeatureVector]) -> Result<Self> {
        if samples.is_empty() {
            return Err(ForecastError::EmptyTrainingSet);
        }
        let n = samples.len() as f64;

        let mut mean = [0.0; FEATURE_COUNT];
        for sample in samples {
            for i in 0..FEATURE_COUNT {
                mean[i] += sample[i];
            }
        }
        for v in &mut mean {
            *v /= n;
        }

        let mut std = [0.0; FEATURE_COUNT];
        for sample in samples {
            for i in 0..FEATURE_COUNT {
                let d = sample[i] - mean[i];
                std[i] += d * d;
            }
        }
        for v in &mut std {
            // Constant columns scale to zero instead of dividing by ~0.
            *v = (*v / n).sqrt().max(1e-6);
        }

        Ok(Self {
            feature_means: mean,
            feature_stds: std,
        })
    }

    pub fn transform(&self, x: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = standardized(x[i], self.feature_means[i], self.feature_stds[i]);
        }
        out
    }

    pub fn transform_all(&self, xs: &[FeatureVector]) -> Vec<FeatureVector> {
        xs.iter().map(|x| self.transform(x)).collect()
    }
}

fn standardized(x: f64, mean: f64, std: f64) -> f64 {
    (x - mean) / std.max(1e-6)
}
