use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::ForecastConfig;
use crate::evaluation::{PositionMetrics, evaluate_positions};
use crate::match_parser::{MatchResult, parse_match};
use crate::predictor::{ForestPositionPredictor, PositionPredictor, PredictedPosition, predict_table};
use crate::season_csv;
use crate::season_table::{SeasonSummary, summarise_season};
use crate::training_set::{ImputedTeam, build_training_set, prediction_features};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub generated_at: String,
    pub config: ForecastConfig,
    pub feature_season: String,
    pub target_season: String,
    pub training_rows: usize,
    pub training_imputed: Vec<ImputedTeam>,
    pub roster_imputed: Vec<ImputedTeam>,
    pub feature_importances: Vec<FeatureImportance>,
    pub predicted: Vec<PredictedPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub held_out_season: String,
    pub training_rows: usize,
    pub predicted: Vec<PredictedPosition>,
    pub metrics: PositionMetrics,
}

/// Loads, parses and summarises one season file. Any bad record aborts the
/// file with the record number in the error chain.
pub fn summarise_file(path: &Path) -> Result<SeasonSummary> {
    let season = season_csv::load_season(path)?;
    let matches = season
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            parse_match(record)
                .with_context(|| format!("season {}: record {}", path.display(), idx + 1))
        })
        .collect::<Result<Vec<MatchResult>>>()?;
    summarise_season(&season.label, &matches)
        .with_context(|| format!("season {}", path.display()))
}

pub fn summarise_files(paths: &[PathBuf]) -> Result<Vec<SeasonSummary>> {
    paths.iter().map(|p| summarise_file(p)).collect()
}

pub fn forecast(
    seasons: &[SeasonSummary],
    roster: Option<&[String]>,
    target_season: Option<&str>,
    config: &ForecastConfig,
) -> Result<ForecastReport> {
    let strategy = config.imputation();
    let training = build_training_set(seasons, &strategy).context("build training set")?;
    let last = seasons
        .last()
        .ok_or_else(|| anyhow!("no seasons to forecast from"))?;

    let default_roster: Vec<String>;
    let roster: &[String] = match roster {
        Some(r) => r,
        None => {
            default_roster = last.teams().map(str::to_string).collect();
            &default_roster
        }
    };
    let target_season = target_season
        .map(str::to_string)
        .unwrap_or_else(|| next_season_label(&last.label));

    let mut predictor = ForestPositionPredictor::new(config.forest_params());
    predictor
        .fit(&training.features(), &training.labels())
        .context("fit position predictor")?;

    let input = prediction_features(last, roster, &target_season, &strategy)
        .context("build prediction features")?;
    let predicted = predict_table(&predictor, &input).context("predict positions")?;

    let feature_importances = predictor
        .feature_importances()?
        .into_iter()
        .map(|(feature, importance)| FeatureImportance {
            feature: feature.to_string(),
            importance,
        })
        .collect();

    Ok(ForecastReport {
        generated_at: Utc::now().to_rfc3339(),
        config: config.clone(),
        feature_season: last.label.clone(),
        target_season,
        training_rows: training.len(),
        training_imputed: training.imputed,
        roster_imputed: input.imputed,
        feature_importances,
        predicted,
    })
}

/// Holds out the last season: trains on the pairs before it and predicts it
/// from its predecessor with the roster that actually played.
pub fn backtest(seasons: &[SeasonSummary], config: &ForecastConfig) -> Result<BacktestReport> {
    if seasons.len() < 3 {
        return Err(anyhow!(
            "backtest needs at least 3 seasons (2 to train, 1 to hold out), got {}",
            seasons.len()
        ));
    }
    let (history, held_out) = seasons.split_at(seasons.len() - 1);
    let held_out = &held_out[0];
    let roster: Vec<String> = held_out.teams().map(str::to_string).collect();

    let report = forecast(history, Some(roster.as_slice()), Some(&held_out.label), config)?;
    let metrics = evaluate_positions(&report.predicted, held_out);
    log::info!(
        "backtest {}: mae {:.2}, exact {}/{}, spearman {:.3}",
        held_out.label,
        metrics.mean_abs_error,
        metrics.exact,
        metrics.samples,
        metrics.spearman
    );

    Ok(BacktestReport {
        held_out_season: held_out.label.clone(),
        training_rows: report.training_rows,
        predicted: report.predicted,
        metrics,
    })
}

pub fn next_season_label(label: &str) -> String {
    if let Ok(year) = label.parse::<u32>() {
        return match year.checked_add(1) {
            Some(next) => next.to_string(),
            None => format!("{label}-next"),
        };
    }
    for sep in ['-', '_', '/'] {
        let Some((start, end)) = label.rsplit_once(sep) else {
            continue;
        };
        let prefix_len = start.len().saturating_sub(4);
        if !start.is_char_boundary(prefix_len) {
            continue;
        }
        let (prefix, first) = start.split_at(prefix_len);
        let (Ok(first), Ok(second)) = (first.parse::<u32>(), end.parse::<u32>()) else {
            continue;
        };
        if first < 1000 {
            continue;
        }
        let second = match end.len() {
            2 => format!("{:02}", (second + 1) % 100),
            4 => (second + 1).to_string(),
            _ => continue,
        };
        return format!("{prefix}{}{sep}{second}", first + 1);
    }
    format!("{label}-next")
}
