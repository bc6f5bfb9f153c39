use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::forest::ForestParams;
use crate::training_set::BottomTeamsMean;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub seed: u64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: Option<usize>,
    // Teams averaged into the profile of a promoted side.
    pub bottom_teams: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        Self {
            seed: forest.seed,
            n_trees: forest.n_trees,
            max_depth: forest.max_depth,
            min_samples_split: forest.min_samples_split,
            max_features: forest.max_features,
            bottom_teams: BottomTeamsMean::default().teams,
        }
    }
}

impl ForecastConfig {
    // defaults < JSON file < FORECAST_* env
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("read config {}", path.display()))?;
                serde_json::from_str::<ForecastConfig>(&raw)
                    .with_context(|| format!("parse config {}", path.display()))?
            }
            None => ForecastConfig::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        if let Some(seed) = env_parse::<u64>("FORECAST_SEED") {
            self.seed = seed;
        }
        if let Some(n) = env_parse::<usize>("FORECAST_TREES") {
            self.n_trees = n;
        }
        if let Some(depth) = env_parse::<usize>("FORECAST_MAX_DEPTH") {
            self.max_depth = (depth > 0).then_some(depth);
        }
        if let Some(n) = env_parse::<usize>("FORECAST_MIN_SAMPLES_SPLIT") {
            self.min_samples_split = n;
        }
        if let Some(n) = env_parse::<usize>("FORECAST_MAX_FEATURES") {
            self.max_features = (n > 0).then_some(n);
        }
        if let Some(n) = env_parse::<usize>("FORECAST_BOTTOM_TEAMS") {
            self.bottom_teams = n;
        }
        self.clamp();
    }

    fn clamp(&mut self) {
        self.n_trees = self.n_trees.clamp(1, 5000);
        self.min_samples_split = self.min_samples_split.max(2);
        self.bottom_teams = self.bottom_teams.clamp(1, 10);
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: self.max_features,
            seed: self.seed,
        }
    }

    pub fn imputation(&self) -> BottomTeamsMean {
        BottomTeamsMean {
            teams: self.bottom_teams,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}
