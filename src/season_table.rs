use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::match_parser::{MatchResult, Outcome};

#[derive(Debug, Clone, Copy, Default)]
struct TeamSeasonStats {
    points: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
}

impl TeamSeasonStats {
    fn add_goals(&mut self, scored: u32, conceded: u32) {
        self.goals_for += scored;
        self.goals_against += conceded;
    }

    fn add_win(&mut self) {
        self.wins += 1;
        self.points += 3;
    }

    fn add_draw(&mut self) {
        self.draws += 1;
        self.points += 1;
    }

    fn add_loss(&mut self) {
        self.losses += 1;
    }

    fn goal_diff(&self) -> i32 {
        self.goals_for as i32 - self.goals_against as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRow {
    pub team: String,
    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub position: usize,
}

impl SeasonRow {
    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub label: String,
    pub rows: Vec<SeasonRow>,
}

impl SeasonSummary {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, team: &str) -> Option<&SeasonRow> {
        self.rows.iter().find(|row| row.team == team)
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.team.as_str())
    }

    pub fn bottom(&self, count: usize) -> &[SeasonRow] {
        let start = self.rows.len().saturating_sub(count);
        &self.rows[start..]
    }
}

struct TeamEntry {
    team: String,
    first_seen: usize,
    stats: TeamSeasonStats,
}

/// Folds a season's results into a ranked table.
///
/// Teams are ordered by points, then goal difference, then goals scored (all
/// descending). Teams level on all three keep the order in which they first
/// appeared in `matches`.
pub fn summarise_season(label: &str, matches: &[MatchResult]) -> Result<SeasonSummary> {
    if matches.is_empty() {
        return Err(ForecastError::EmptySeason {
            season: label.to_string(),
        });
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<TeamEntry> = Vec::new();

    for m in matches {
        let home = entry_index(&mut index, &mut entries, &m.home_team);
        let away = entry_index(&mut index, &mut entries, &m.away_team);
        entries[home].stats.add_goals(m.home_goals, m.away_goals);
        entries[away].stats.add_goals(m.away_goals, m.home_goals);
        match m.outcome() {
            Outcome::Home => {
                entries[home].stats.add_win();
                entries[away].stats.add_loss();
            }
            Outcome::Away => {
                entries[home].stats.add_loss();
                entries[away].stats.add_win();
            }
            Outcome::Draw => {
                entries[home].stats.add_draw();
                entries[away].stats.add_draw();
            }
        }
    }

    entries.sort_by(|a, b| compare_standing(a, b));

    let rows = entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| SeasonRow {
            team: entry.team,
            points: entry.stats.points,
            wins: entry.stats.wins,
            draws: entry.stats.draws,
            losses: entry.stats.losses,
            goals_for: entry.stats.goals_for,
            goals_against: entry.stats.goals_against,
            goal_diff: entry.stats.goal_diff(),
            position: idx + 1,
        })
        .collect::<Vec<_>>();

    log::info!(
        "season {label}: {} matches, {} teams, champion {}",
        matches.len(),
        rows.len(),
        rows.first().map(|r| r.team.as_str()).unwrap_or("-")
    );

    Ok(SeasonSummary {
        label: label.to_string(),
        rows,
    })
}

fn entry_index<'a>(
    index: &mut HashMap<&'a str, usize>,
    entries: &mut Vec<TeamEntry>,
    team: &'a str,
) -> usize {
    *index.entry(team).or_insert_with(|| {
        entries.push(TeamEntry {
            team: team.to_string(),
            first_seen: entries.len(),
            stats: TeamSeasonStats::default(),
        });
        entries.len() - 1
    })
}

fn compare_standing(a: &TeamEntry, b: &TeamEntry) -> Ordering {
    b.stats
        .points
        .cmp(&a.stats.points)
        .then(b.stats.goal_diff().cmp(&a.stats.goal_diff()))
        .then(b.stats.goals_for.cmp(&a.stats.goals_for))
        .then(a.first_seen.cmp(&b.first_seen))
}
