use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use league_forecast::forest::{ForestParams, RandomForestClassifier};
use league_forecast::match_parser::{MatchResult, RawMatchRecord, parse_matches};
use league_forecast::season_table::{SeasonSummary, summarise_season};
use league_forecast::training_set::{BottomTeamsMean, build_training_set};

fn club(idx: usize) -> String {
    format!("Club {idx:02}")
}

fn season_records(teams: usize, salt: usize) -> Vec<RawMatchRecord> {
    let mut records = Vec::with_capacity(teams * (teams - 1));
    for home in 0..teams {
        for away in 0..teams {
            if home == away {
                continue;
            }
            records.push(RawMatchRecord {
                home_team: club(home),
                away_team: club(away),
                score: format!("{}-{}", (home * 3 + away + salt) % 5, (away * 2 + salt) % 4),
                ..RawMatchRecord::default()
            });
        }
    }
    records
}

fn season(label: &str, teams: usize, salt: usize) -> SeasonSummary {
    let matches = parse_matches(&season_records(teams, salt)).unwrap();
    summarise_season(label, &matches).unwrap()
}

fn bench_parse_matches(c: &mut Criterion) {
    let records = season_records(20, 1);
    c.bench_function("parse_matches_380", |b| {
        b.iter(|| {
            let parsed = parse_matches(black_box(&records)).unwrap();
            black_box(parsed.len());
        })
    });
}

fn bench_summarise_season(c: &mut Criterion) {
    let matches: Vec<MatchResult> = parse_matches(&season_records(20, 2)).unwrap();
    c.bench_function("summarise_season_380", |b| {
        b.iter(|| {
            let summary = summarise_season("bench", black_box(&matches)).unwrap();
            black_box(summary.len());
        })
    });
}

fn bench_forest_fit(c: &mut Criterion) {
    let seasons: Vec<SeasonSummary> = (0..6)
        .map(|i| season(&format!("s{i}"), 20, i))
        .collect();
    let training = build_training_set(&seasons, &BottomTeamsMean::default()).unwrap();
    let xs = training.features();
    let labels = training.labels();
    let params = ForestParams::default();

    c.bench_function("forest_fit_100_trees", |b| {
        b.iter(|| {
            let forest = RandomForestClassifier::fit(params, black_box(&xs), black_box(&labels))
                .unwrap();
            black_box(forest.classes().len());
        })
    });
}

criterion_group!(
    benches,
    bench_parse_matches,
    bench_summarise_season,
    bench_forest_fit
);
criterion_main!(benches);
