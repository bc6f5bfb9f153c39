use std::collections::BTreeSet;
use std::path::PathBuf;

use league_forecast::config::ForecastConfig;
use league_forecast::pipeline::{backtest, forecast, summarise_files};
use league_forecast::season_csv::parse_roster;
use league_forecast::season_table::SeasonSummary;
use league_forecast::training_set::FEATURE_COUNT;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn fixture_seasons() -> Vec<SeasonSummary> {
    let paths: Vec<PathBuf> = ["2021-22.csv", "2022-23.csv", "2023-24.csv"]
        .iter()
        .map(|n| fixture_path(n))
        .collect();
    summarise_files(&paths).expect("fixtures should summarise")
}

fn small_config() -> ForecastConfig {
    ForecastConfig {
        n_trees: 25,
        ..ForecastConfig::default()
    }
}

#[test]
fn forecast_ranks_the_last_season_roster() {
    let seasons = fixture_seasons();
    let report = forecast(&seasons, None, None, &small_config()).expect("forecast should run");

    assert_eq!(report.feature_season, "2023-24");
    assert_eq!(report.target_season, "2024-25");
    // Two consecutive pairs of five teams each.
    assert_eq!(report.training_rows, 10);
    let promoted: Vec<&str> = report.training_imputed.iter().map(|t| t.team.as_str()).collect();
    assert_eq!(promoted, vec!["Foxtrot", "Golf"]);
    assert!(report.roster_imputed.is_empty());

    let positions: BTreeSet<usize> = report.predicted.iter().map(|p| p.position).collect();
    assert_eq!(positions, (1..=5).collect::<BTreeSet<_>>());
    for pair in report.predicted.windows(2) {
        assert!(pair[0].expected_position <= pair[1].expected_position);
    }

    assert_eq!(report.feature_importances.len(), FEATURE_COUNT);
    let total: f64 = report.feature_importances.iter().map(|f| f.importance).sum();
    assert!(total == 0.0 || (total - 1.0).abs() < 1e-9, "importances sum to {total}");
}

#[test]
fn same_seed_same_table() {
    let seasons = fixture_seasons();
    let config = small_config();
    let first = forecast(&seasons, None, None, &config).unwrap();
    let second = forecast(&seasons, None, None, &config).unwrap();
    assert_eq!(first.predicted, second.predicted);
}

#[test]
fn roster_newcomers_are_imputed() {
    let seasons = fixture_seasons();
    let roster = parse_roster(fixture_path("roster_2024-25.txt").to_str().unwrap()).unwrap();
    let report = forecast(&seasons, Some(&roster), Some("2024-25"), &small_config()).unwrap();

    assert_eq!(report.predicted.len(), 5);
    let imputed: Vec<&str> = report.roster_imputed.iter().map(|t| t.team.as_str()).collect();
    assert_eq!(imputed, vec!["Hotel"]);

    let hotel = report.predicted.iter().find(|p| p.team == "Hotel").unwrap();
    assert!(hotel.imputed);
    assert!(report.predicted.iter().filter(|p| p.imputed).count() == 1);
}

#[test]
fn single_season_cannot_forecast() {
    let seasons = fixture_seasons();
    let err = forecast(&seasons[..1], None, None, &small_config()).expect_err("needs two seasons");
    assert!(format!("{err:#}").contains("at least 2"), "{err:#}");
}

#[test]
fn backtest_scores_the_held_out_season() {
    let seasons = fixture_seasons();
    let report = backtest(&seasons, &small_config()).expect("backtest should run");

    assert_eq!(report.held_out_season, "2023-24");
    assert_eq!(report.training_rows, 5);
    assert_eq!(report.metrics.samples, 5);
    assert!(report.metrics.mean_abs_error <= 4.0);
    assert!((-1.0..=1.0).contains(&report.metrics.spearman));

    let err = backtest(&seasons[..2], &small_config()).expect_err("needs three seasons");
    assert!(err.to_string().contains("at least 3"));
}
