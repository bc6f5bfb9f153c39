use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::season_table::{SeasonRow, SeasonSummary};
use crate::team_names::names_look_alike;

pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "points",
    "wins",
    "draws",
    "losses",
    "goals_for",
    "goals_against",
    "goal_diff",
];

pub type FeatureVector = [f64; FEATURE_COUNT];

pub fn season_features(row: &SeasonRow) -> FeatureVector {
    [
        row.points as f64,
        row.wins as f64,
        row.draws as f64,
        row.losses as f64,
        row.goals_for as f64,
        row.goals_against as f64,
        row.goal_diff as f64,
    ]
}

/// Supplies the feature vector used for a team with no row in the earlier
/// season of a pair.
pub trait ImputationStrategy {
    fn default_profile(&self, season: &SeasonSummary) -> FeatureVector;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottomTeamsMean {
    pub teams: usize,
}

impl Default for BottomTeamsMean {
    fn default() -> Self {
        Self { teams: 3 }
    }
}

impl ImputationStrategy for BottomTeamsMean {
    fn default_profile(&self, season: &SeasonSummary) -> FeatureVector {
        mean_features(season.bottom(self.teams.max(1)))
    }
}

pub fn mean_features(rows: &[SeasonRow]) -> FeatureVector {
    let mut out = [0.0; FEATURE_COUNT];
    if rows.is_empty() {
        return out;
    }
    for row in rows {
        for (acc, value) in out.iter_mut().zip(season_features(row)) {
            *acc += value;
        }
    }
    let n = rows.len() as f64;
    for v in &mut out {
        *v /= n;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub team: String,
    pub feature_season: String,
    pub label_season: String,
    pub features: FeatureVector,
    pub label: usize,
    pub imputed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputedTeam {
    pub team: String,
    pub feature_season: String,
    pub target_season: String,
    /// A team from the earlier season whose name is suspiciously close; a hint
    /// that the imputation is caused by a rename or spelling drift.
    pub suspected_rename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub rows: Vec<TrainingRow>,
    pub imputed: Vec<ImputedTeam>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn features(&self) -> Vec<FeatureVector> {
        self.rows.iter().map(|r| r.features).collect()
    }

    pub fn labels(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.label).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub team: String,
    pub features: FeatureVector,
    pub imputed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub feature_season: String,
    pub target_season: String,
    pub rows: Vec<PredictionRow>,
    pub imputed: Vec<ImputedTeam>,
}

impl PredictionInput {
    pub fn features(&self) -> Vec<FeatureVector> {
        self.rows.iter().map(|r| r.features).collect()
    }

    pub fn teams(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.team.clone()).collect()
    }
}

/// Pairs every team of season n+1 with its season-n features, for every
/// consecutive pair in `seasons` (oldest first).
pub fn build_training_set(
    seasons: &[SeasonSummary],
    strategy: &dyn ImputationStrategy,
) -> Result<TrainingSet> {
    if seasons.len() < 2 {
        return Err(ForecastError::InsufficientSeasons {
            found: seasons.len(),
        });
    }

    let mut out = TrainingSet::default();
    for pair in seasons.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let aligned = align_with_previous(prev, next.teams(), &next.label, strategy);
        for (row, features) in next.rows.iter().zip(aligned.features) {
            out.rows.push(TrainingRow {
                team: row.team.clone(),
                feature_season: prev.label.clone(),
                label_season: next.label.clone(),
                features: features.0,
                label: row.position,
                imputed: features.1,
            });
        }
        out.imputed.extend(aligned.imputed);
    }

    log::info!(
        "training set: {} rows from {} season pairs, {} imputed",
        out.rows.len(),
        seasons.len() - 1,
        out.imputed.len()
    );
    Ok(out)
}

pub fn prediction_features(
    season: &SeasonSummary,
    roster: &[String],
    target_season: &str,
    strategy: &dyn ImputationStrategy,
) -> Result<PredictionInput> {
    if roster.is_empty() {
        return Err(ForecastError::EmptyRoster);
    }
    let mut seen = HashSet::new();
    for team in roster {
        if !seen.insert(team.as_str()) {
            return Err(ForecastError::DuplicateRosterTeam(team.clone()));
        }
    }

    let aligned = align_with_previous(
        season,
        roster.iter().map(String::as_str),
        target_season,
        strategy,
    );
    let rows = roster
        .iter()
        .zip(aligned.features)
        .map(|(team, (features, imputed))| PredictionRow {
            team: team.clone(),
            features,
            imputed,
        })
        .collect();

    Ok(PredictionInput {
        feature_season: season.label.clone(),
        target_season: target_season.to_string(),
        rows,
        imputed: aligned.imputed,
    })
}

struct Alignment {
    features: Vec<(FeatureVector, bool)>,
    imputed: Vec<ImputedTeam>,
}

fn align_with_previous<'a>(
    prev: &SeasonSummary,
    teams: impl Iterator<Item = &'a str>,
    target_season: &str,
    strategy: &dyn ImputationStrategy,
) -> Alignment {
    let by_team: HashMap<&str, &SeasonRow> =
        prev.rows.iter().map(|r| (r.team.as_str(), r)).collect();
    let teams: Vec<&str> = teams.collect();
    let staying: HashSet<&str> = teams.iter().copied().collect();
    let departed: Vec<&str> = prev
        .teams()
        .filter(|team| !staying.contains(team))
        .collect();

    let default_profile = strategy.default_profile(prev);
    let mut features = Vec::with_capacity(teams.len());
    let mut imputed = Vec::new();

    for team in teams {
        if let Some(row) = by_team.get(team) {
            features.push((season_features(row), false));
            continue;
        }

        let suspected_rename = departed
            .iter()
            .find(|old| names_look_alike(old, team))
            .map(|old| old.to_string());
        match &suspected_rename {
            Some(old) => log::warn!(
                "{team} has no {} row but {old} does; check for a rename before trusting the default profile",
                prev.label
            ),
            None => log::info!(
                "{team} not in {}; using default profile for {target_season}",
                prev.label
            ),
        }

        features.push((default_profile, true));
        imputed.push(ImputedTeam {
            team: team.to_string(),
            feature_season: prev.label.clone(),
            target_season: target_season.to_string(),
            suspected_rename,
        });
    }

    Alignment { features, imputed }
}
