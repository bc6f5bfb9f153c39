use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("malformed score {score:?}: expected \"<int>-<int>\"")]
    MalformedScore { score: String },

    #[error("fixture is missing a {side} team name")]
    MissingTeamName { side: &'static str },

    #[error("team {team:?} is listed as both home and away")]
    SelfFixture { team: String },

    #[error("season {season:?} has no parsed matches")]
    EmptySeason { season: String },

    #[error("need at least 2 season summaries to build training rows, got {found}")]
    InsufficientSeasons { found: usize },

    #[error("prediction roster is empty")]
    EmptyRoster,

    #[error("team {0:?} appears more than once in the prediction roster")]
    DuplicateRosterTeam(String),

    #[error("cannot fit a position predictor on an empty training set")]
    EmptyTrainingSet,

    #[error("position predictor used before fit")]
    NotFitted,

    #[error("{rows} feature rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("{teams} teams to rank but the predictor returned {estimates} estimates")]
    EstimateCountMismatch { teams: usize, estimates: usize },
}

pub type Result<T> = std::result::Result<T, ForecastError>;
