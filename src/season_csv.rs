use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::match_parser::RawMatchRecord;

const HOME_COLUMNS: [&str; 4] = ["team 1", "hometeam", "home", "home team"];
const AWAY_COLUMNS: [&str; 4] = ["team 2", "awayteam", "away", "away team"];
const SCORE_COLUMNS: [&str; 3] = ["ft", "score", "full time"];
const HOME_GOALS_COLUMNS: [&str; 1] = ["fthg"];
const AWAY_GOALS_COLUMNS: [&str; 1] = ["ftag"];
const DATE_COLUMNS: [&str; 1] = ["date"];
const HALF_TIME_COLUMNS: [&str; 2] = ["ht", "half time"];

#[derive(Debug, Clone)]
pub struct SeasonFile {
    pub label: String,
    pub records: Vec<RawMatchRecord>,
}

pub fn season_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn load_season(path: &Path) -> Result<SeasonFile> {
    let file = File::open(path).with_context(|| format!("open season file {}", path.display()))?;
    let records = read_season_records(file)
        .with_context(|| format!("read season file {}", path.display()))?;
    Ok(SeasonFile {
        label: season_label(path),
        records,
    })
}

pub fn read_season_records<R: Read>(rdr: R) -> Result<Vec<RawMatchRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader.headers().context("read header row")?.clone();
    let home = find_column(&headers, &HOME_COLUMNS)
        .ok_or_else(|| anyhow!("missing home team column (expected one of {HOME_COLUMNS:?})"))?;
    let away = find_column(&headers, &AWAY_COLUMNS)
        .ok_or_else(|| anyhow!("missing away team column (expected one of {AWAY_COLUMNS:?})"))?;
    let score = score_columns(&headers).ok_or_else(|| {
        anyhow!("missing score column (expected one of {SCORE_COLUMNS:?}, or FTHG and FTAG)")
    })?;
    let date = find_column(&headers, &DATE_COLUMNS);
    let half_time = find_column(&headers, &HALF_TIME_COLUMNS);

    let mut out = Vec::new();
    for row in reader.records() {
        let row = row.context("read match row")?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let field = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        let optional = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        out.push(RawMatchRecord {
            date: optional(date),
            home_team: field(home),
            away_team: field(away),
            score: match score {
                ScoreColumns::Combined(idx) => field(idx),
                ScoreColumns::Split {
                    home: home_goals,
                    away: away_goals,
                } => format!("{}-{}", field(home_goals), field(away_goals)),
            },
            half_time: optional(half_time),
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy)]
enum ScoreColumns {
    Combined(usize),
    // football-data.co.uk style FTHG / FTAG goal columns.
    Split { home: usize, away: usize },
}

fn score_columns(headers: &csv::StringRecord) -> Option<ScoreColumns> {
    if let Some(idx) = find_column(headers, &SCORE_COLUMNS) {
        return Some(ScoreColumns::Combined(idx));
    }
    let home = find_column(headers, &HOME_GOALS_COLUMNS)?;
    let away = find_column(headers, &AWAY_GOALS_COLUMNS)?;
    Some(ScoreColumns::Split { home, away })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

pub fn parse_roster(arg: &str) -> Result<Vec<String>> {
    let path = Path::new(arg);
    if path.is_file() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read roster file {}", path.display()))?;
        return Ok(roster_lines(&raw));
    }
    Ok(arg
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn roster_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
