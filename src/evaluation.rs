use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::predictor::PredictedPosition;
use crate::season_table::SeasonSummary;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    pub samples: usize,
    pub mean_abs_error: f64,
    pub exact: usize,
    pub within_three: usize,
    pub spearman: f64,
}

pub fn evaluate_positions(predicted: &[PredictedPosition], actual: &SeasonSummary) -> PositionMetrics {
    let actual_by_team: HashMap<&str, usize> = actual
        .rows
        .iter()
        .map(|r| (r.team.as_str(), r.position))
        .collect();

    let pairs: Vec<(usize, usize)> = predicted
        .iter()
        .filter_map(|p| {
            actual_by_team
                .get(p.team.as_str())
                .map(|&pos| (p.position, pos))
        })
        .collect();

    if pairs.is_empty() {
        return PositionMetrics {
            samples: 0,
            mean_abs_error: 0.0,
            exact: 0,
            within_three: 0,
            spearman: 0.0,
        };
    }

    let n = pairs.len();
    let mut abs_sum = 0usize;
    let mut sq_sum = 0.0_f64;
    let mut exact = 0usize;
    let mut within_three = 0usize;
    for (pred, act) in &pairs {
        let d = pred.abs_diff(*act);
        abs_sum += d;
        sq_sum += (d * d) as f64;
        if d == 0 {
            exact += 1;
        }
        if d <= 3 {
            within_three += 1;
        }
    }

    let nf = n as f64;
    let spearman = if n < 2 {
        0.0
    } else {
        1.0 - 6.0 * sq_sum / (nf * (nf * nf - 1.0))
    };

    PositionMetrics {
        samples: n,
        mean_abs_error: abs_sum as f64 / nf,
        exact,
        within_three,
        spearman,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season_table::SeasonRow;

    fn actual(teams: &[&str]) -> SeasonSummary {
        SeasonSummary {
            label: "actual".to_string(),
            rows: teams
                .iter()
                .enumerate()
                .map(|(idx, team)| SeasonRow {
                    team: team.to_string(),
                    points: 0,
                    wins: 0,
                    draws: 0,
                    losses: 0,
                    goals_for: 0,
                    goals_against: 0,
                    goal_diff: 0,
                    position: idx + 1,
                })
                .collect(),
        }
    }

    fn predicted(teams: &[&str]) -> Vec<PredictedPosition> {
        teams
            .iter()
            .enumerate()
            .map(|(idx, team)| PredictedPosition {
                team: team.to_string(),
                position: idx + 1,
                expected_position: (idx + 1) as f64,
                most_likely_position: idx + 1,
                imputed: false,
            })
            .collect()
    }

    #[test]
    fn perfect_prediction() {
        let m = evaluate_positions(&predicted(&["A", "B", "C", "D"]), &actual(&["A", "B", "C", "D"]));
        assert_eq!(m.samples, 4);
        assert_eq!(m.exact, 4);
        assert_eq!(m.mean_abs_error, 0.0);
        assert!((m.spearman - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reversed_prediction() {
        let m = evaluate_positions(&predicted(&["D", "C", "B", "A"]), &actual(&["A", "B", "C", "D"]));
        assert_eq!(m.exact, 0);
        assert_eq!(m.mean_abs_error, 2.0);
        assert_eq!(m.within_three, 4);
        assert!((m.spearman + 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_teams_are_skipped() {
        let m = evaluate_positions(&predicted(&["A", "X"]), &actual(&["A", "B"]));
        assert_eq!(m.samples, 1);
        assert_eq!(m.spearman, 0.0);
    }
}
