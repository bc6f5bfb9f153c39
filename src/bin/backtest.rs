use anyhow::{Result, anyhow};

use league_forecast::cli_args::{arg_path, has_flag, init_logging, load_dotenv, positional};
use league_forecast::config::ForecastConfig;
use league_forecast::pipeline;
use league_forecast::table_export::{prediction_rows, render_rows};

fn main() -> Result<()> {
    load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    init_logging(has_flag(&args, "--verbose"));

    let season_paths = positional(&args);
    if season_paths.len() < 3 {
        return Err(anyhow!(
            "usage: backtest [--config cfg.json] SEASON.csv SEASON.csv SEASON.csv..."
        ));
    }
    let config = ForecastConfig::load(arg_path(&args, "--config").as_deref())?;

    let seasons = pipeline::summarise_files(&season_paths)?;
    let report = pipeline::backtest(&seasons, &config)?;

    println!(
        "Held out: {} ({} training rows)",
        report.held_out_season, report.training_rows
    );
    print!("{}", render_rows(&prediction_rows(&report.predicted)));
    println!();
    println!("Teams: {}", report.metrics.samples);
    println!("Mean abs position error: {:.2}", report.metrics.mean_abs_error);
    println!("Exact: {}", report.metrics.exact);
    println!("Within 3 places: {}", report.metrics.within_three);
    println!("Spearman: {:.3}", report.metrics.spearman);

    Ok(())
}
