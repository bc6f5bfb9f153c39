use anyhow::{Result, anyhow};

use league_forecast::cli_args::{arg_path, has_flag, init_logging, load_dotenv, positional};
use league_forecast::pipeline;
use league_forecast::table_export::{render_rows, season_rows, write_csv_file};

fn main() -> Result<()> {
    load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    init_logging(has_flag(&args, "--verbose"));

    let paths = positional(&args);
    if paths.is_empty() {
        return Err(anyhow!("usage: season_table [--out-dir DIR] SEASON.csv..."));
    }

    let seasons = pipeline::summarise_files(&paths)?;
    for summary in &seasons {
        println!("Season {} ({} teams)", summary.label, summary.len());
        print!("{}", render_rows(&season_rows(std::slice::from_ref(summary))));
        println!();
    }

    if let Some(dir) = arg_path(&args, "--out-dir") {
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("season_tables.csv");
        write_csv_file(&path, &season_rows(&seasons))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
