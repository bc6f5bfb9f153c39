use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::forest::{ForestParams, RandomForestClassifier};
use crate::scaling::StandardScaler;
use crate::training_set::{
    FEATURE_COUNT, FEATURE_NAMES, FeatureVector, PredictionInput, PredictionRow,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    pub expected_position: f64,
    pub most_likely_position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPosition {
    pub team: String,
    pub position: usize,
    pub expected_position: f64,
    pub most_likely_position: usize,
    pub imputed: bool,
}

pub trait PositionPredictor {
    fn fit(&mut self, features: &[FeatureVector], labels: &[usize]) -> Result<()>;

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<PositionEstimate>>;
}

#[derive(Debug, Clone)]
pub struct ForestPositionPredictor {
    params: ForestParams,
    fitted: Option<FittedForest>,
}

#[derive(Debug, Clone)]
struct FittedForest {
    scaler: StandardScaler,
    forest: RandomForestClassifier,
}

impl ForestPositionPredictor {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn feature_importances(&self) -> Result<Vec<(&'static str, f64)>> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        let importances = fitted.forest.feature_importances();
        let mut out: Vec<(&'static str, f64)> = (0..FEATURE_COUNT)
            .map(|i| (FEATURE_NAMES[i], importances[i]))
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(out)
    }
}

impl PositionPredictor for ForestPositionPredictor {
    fn fit(&mut self, features: &[FeatureVector], labels: &[usize]) -> Result<()> {
        if features.len() != labels.len() {
            return Err(ForecastError::LabelCountMismatch {
                rows: features.len(),
                labels: labels.len(),
            });
        }
        let scaler = StandardScaler::fit(features)?;
        let scaled = scaler.transform_all(features);
        let forest = RandomForestClassifier::fit(self.params, &scaled, labels)?;
        log::info!(
            "fitted forest: {} trees, seed {}, {} rows",
            self.params.n_trees,
            self.params.seed,
            features.len()
        );
        self.fitted = Some(FittedForest { scaler, forest });
        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<PositionEstimate>> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        let classes = fitted.forest.classes();
        Ok(features
            .iter()
            .map(|x| {
                let probs = fitted.forest.predict_proba(&fitted.scaler.transform(x));
                let expected_position: f64 = probs
                    .iter()
                    .zip(classes)
                    .map(|(p, class)| p * *class as f64)
                    .sum();
                PositionEstimate {
                    expected_position,
                    most_likely_position: fitted.forest.most_likely(&probs),
                }
            })
            .collect())
    }
}

/// Orders teams by expected position, then most likely position, then name,
/// and hands out positions 1..=N with no duplicates.
pub fn rank_positions(
    rows: &[PredictionRow],
    estimates: &[PositionEstimate],
) -> Result<Vec<PredictedPosition>> {
    if rows.len() != estimates.len() {
        return Err(ForecastError::EstimateCountMismatch {
            teams: rows.len(),
            estimates: estimates.len(),
        });
    }

    let mut table: Vec<PredictedPosition> = rows
        .iter()
        .zip(estimates)
        .map(|(row, est)| PredictedPosition {
            team: row.team.clone(),
            position: 0,
            expected_position: est.expected_position,
            most_likely_position: est.most_likely_position,
            imputed: row.imputed,
        })
        .collect();

    table.sort_by(|a, b| {
        a.expected_position
            .total_cmp(&b.expected_position)
            .then(a.most_likely_position.cmp(&b.most_likely_position))
            .then(a.team.cmp(&b.team))
    });
    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx + 1;
    }
    Ok(table)
}

pub fn predict_table(
    predictor: &dyn PositionPredictor,
    input: &PredictionInput,
) -> Result<Vec<PredictedPosition>> {
    let estimates = predictor.predict(&input.features())?;
    rank_positions(&input.rows, &estimates)
}
