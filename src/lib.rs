pub mod cli_args;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod forest;
pub mod match_parser;
pub mod pipeline;
pub mod predictor;
pub mod scaling;
pub mod season_csv;
pub mod season_table;
pub mod table_export;
pub mod team_names;
pub mod training_set;
