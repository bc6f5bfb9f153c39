use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use league_forecast::cli_args::{
    arg_path, arg_value, has_flag, init_logging, load_dotenv, positional,
};
use league_forecast::config::ForecastConfig;
use league_forecast::pipeline::{self, ForecastReport};
use league_forecast::season_csv;
use league_forecast::season_table::SeasonSummary;
use league_forecast::table_export::{
    export_workbook, imputed_rows, prediction_rows, render_rows, season_rows, write_csv_file,
};

const USAGE: &str = "usage: league_forecast [--config cfg.json] [--roster A,B,...|roster.txt] \
[--target LABEL] [--out-dir DIR] [--xlsx PATH] [--json PATH] [--verbose] SEASON.csv...";

fn main() -> Result<()> {
    load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }
    init_logging(has_flag(&args, "--verbose"));

    let season_paths = positional(&args);
    if season_paths.len() < 2 {
        return Err(anyhow!(
            "need at least 2 season files in chronological order\n{USAGE}"
        ));
    }

    let config = ForecastConfig::load(arg_path(&args, "--config").as_deref())?;
    let roster = arg_value(&args, "--roster")
        .map(|raw| season_csv::parse_roster(&raw))
        .transpose()?;
    let target = arg_value(&args, "--target");

    let seasons = pipeline::summarise_files(&season_paths)?;
    for summary in &seasons {
        print_season(summary);
    }

    let report = pipeline::forecast(&seasons, roster.as_deref(), target.as_deref(), &config)?;
    print_report(&report);

    if let Some(dir) = arg_path(&args, "--out-dir") {
        write_tables(&dir, &seasons, &report)?;
    }
    if let Some(path) = arg_path(&args, "--xlsx") {
        let export = export_workbook(&path, &seasons, Some(report.predicted.as_slice()))?;
        println!(
            "Workbook: {} ({} seasons, {} season rows, {} prediction rows)",
            path.display(),
            export.seasons,
            export.season_rows,
            export.prediction_rows
        );
    }
    if let Some(path) = arg_path(&args, "--json") {
        let json = serde_json::to_string_pretty(&report).context("serialize forecast report")?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        println!("Report: {}", path.display());
    }

    Ok(())
}

fn print_season(summary: &SeasonSummary) {
    println!("Season {} ({} teams)", summary.label, summary.len());
    let rows = season_rows(std::slice::from_ref(summary))
        .into_iter()
        .map(|row| row.into_iter().skip(1).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    print!("{}", render_rows(&rows));
    println!();
}

fn print_report(report: &ForecastReport) {
    println!(
        "Predicted {} table from {} ({} training rows)",
        report.target_season, report.feature_season, report.training_rows
    );
    print!("{}", render_rows(&prediction_rows(&report.predicted)));
    println!();

    if !report.roster_imputed.is_empty() {
        println!("No {} history (default profile used):", report.feature_season);
        print!("{}", render_rows(&imputed_rows(&report.roster_imputed)));
        println!();
    }
    if !report.training_imputed.is_empty() {
        println!("Imputed training rows:");
        print!("{}", render_rows(&imputed_rows(&report.training_imputed)));
        println!();
    }

    println!("Feature importances:");
    for item in &report.feature_importances {
        println!("  {:14} {:.3}", item.feature, item.importance);
    }
}

fn write_tables(dir: &Path, seasons: &[SeasonSummary], report: &ForecastReport) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let seasons_path = dir.join("season_tables.csv");
    write_csv_file(&seasons_path, &season_rows(seasons))?;
    let prediction_path = dir.join(format!(
        "prediction_{}.csv",
        report.target_season.replace(['/', '\\'], "-")
    ));
    write_csv_file(&prediction_path, &prediction_rows(&report.predicted))?;
    println!(
        "Tables: {} and {}",
        seasons_path.display(),
        prediction_path.display()
    );
    Ok(())
}
