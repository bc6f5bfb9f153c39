use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatchRecord {
    #[serde(default)]
    pub date: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub score: String,
    #[serde(default)]
    pub half_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl MatchResult {
    pub fn outcome(&self) -> Outcome {
        if self.home_goals > self.away_goals {
            Outcome::Home
        } else if self.home_goals < self.away_goals {
            Outcome::Away
        } else {
            Outcome::Draw
        }
    }
}

pub fn parse_score(raw: &str) -> Result<(u32, u32)> {
    let malformed = || ForecastError::MalformedScore {
        score: raw.to_string(),
    };
    let mut parts = raw.split('-');
    let (Some(home), Some(away), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let home = home.trim().parse::<u32>().map_err(|_| malformed())?;
    let away = away.trim().parse::<u32>().map_err(|_| malformed())?;
    Ok((home, away))
}

pub fn parse_match(record: &RawMatchRecord) -> Result<MatchResult> {
    let home_team = record.home_team.trim();
    let away_team = record.away_team.trim();
    if home_team.is_empty() {
        return Err(ForecastError::MissingTeamName { side: "home" });
    }
    if away_team.is_empty() {
        return Err(ForecastError::MissingTeamName { side: "away" });
    }
    if home_team == away_team {
        return Err(ForecastError::SelfFixture {
            team: home_team.to_string(),
        });
    }
    let (home_goals, away_goals) = parse_score(&record.score)?;
    Ok(MatchResult {
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        home_goals,
        away_goals,
    })
}

pub fn parse_matches(records: &[RawMatchRecord]) -> Result<Vec<MatchResult>> {
    records.iter().map(parse_match).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(home: &str, away: &str, score: &str) -> RawMatchRecord {
        RawMatchRecord {
            home_team: home.to_string(),
            away_team: away.to_string(),
            score: score.to_string(),
            ..RawMatchRecord::default()
        }
    }

    #[test]
    fn parses_plain_and_padded_scores() {
        assert_eq!(parse_score("3-0").unwrap(), (3, 0));
        assert_eq!(parse_score(" 10 - 2 ").unwrap(), (10, 2));
    }

    #[test]
    fn rejects_scores_that_are_not_two_integers() {
        for raw in ["abc", "", "3", "3-", "-3", "1-2-3", "-1-2", "a-1", "1.5-2"] {
            assert_eq!(
                parse_score(raw),
                Err(ForecastError::MalformedScore {
                    score: raw.to_string()
                }),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn match_outcome_follows_goal_comparison() {
        let home = parse_match(&record("Arsenal", "Chelsea", "2-1")).unwrap();
        let away = parse_match(&record("Arsenal", "Chelsea", "0-1")).unwrap();
        let draw = parse_match(&record("Arsenal", "Chelsea", "1-1")).unwrap();
        assert_eq!(home.outcome(), Outcome::Home);
        assert_eq!(away.outcome(), Outcome::Away);
        assert_eq!(draw.outcome(), Outcome::Draw);
    }

    #[test]
    fn team_names_are_trimmed_and_validated() {
        let parsed = parse_match(&record(" Leeds United ", "Burnley", "1-0")).unwrap();
        assert_eq!(parsed.home_team, "Leeds United");

        assert_eq!(
            parse_match(&record("", "Burnley", "1-0")),
            Err(ForecastError::MissingTeamName { side: "home" })
        );
        assert_eq!(
            parse_match(&record("Burnley", "Burnley", "1-0")),
            Err(ForecastError::SelfFixture {
                team: "Burnley".to_string()
            })
        );
    }

    #[test]
    fn first_bad_record_aborts_the_batch() {
        let records = vec![
            record("A", "B", "1-0"),
            record("B", "C", "abc"),
            record("C", "A", "2-2"),
        ];
        assert!(matches!(
            parse_matches(&records),
            Err(ForecastError::MalformedScore { .. })
        ));
    }
}
