use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::predictor::PredictedPosition;
use crate::training_set::ImputedTeam;
use crate::season_table::{SeasonRow, SeasonSummary};

const SEASON_HEADER: [&str; 11] = [
    "season",
    "position",
    "team",
    "played",
    "points",
    "wins",
    "draws",
    "losses",
    "goals_for",
    "goals_against",
    "goal_diff",
];

const PREDICTION_HEADER: [&str; 5] = [
    "position",
    "team",
    "expected_position",
    "most_likely_position",
    "imputed",
];

// Columns written as numbers in the workbook; everything else stays text.
const SEASON_NUMERIC: [usize; 9] = [1, 3, 4, 5, 6, 7, 8, 9, 10];
const PREDICTION_NUMERIC: [usize; 3] = [0, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub seasons: usize,
    pub season_rows: usize,
    pub prediction_rows: usize,
}

pub fn season_rows(summaries: &[SeasonSummary]) -> Vec<Vec<String>> {
    let mut rows = vec![SEASON_HEADER.iter().map(|h| h.to_string()).collect()];
    for summary in summaries {
        rows.extend(summary.rows.iter().map(|row| season_row(&summary.label, row)));
    }
    rows
}

fn season_row(label: &str, row: &SeasonRow) -> Vec<String> {
    vec![
        label.to_string(),
        row.position.to_string(),
        row.team.clone(),
        row.played().to_string(),
        row.points.to_string(),
        row.wins.to_string(),
        row.draws.to_string(),
        row.losses.to_string(),
        row.goals_for.to_string(),
        row.goals_against.to_string(),
        row.goal_diff.to_string(),
    ]
}

pub fn prediction_rows(table: &[PredictedPosition]) -> Vec<Vec<String>> {
    let mut rows = vec![PREDICTION_HEADER.iter().map(|h| h.to_string()).collect()];
    for row in table {
        rows.push(vec![
            row.position.to_string(),
            row.team.clone(),
            format!("{:.3}", row.expected_position),
            row.most_likely_position.to_string(),
            row.imputed.to_string(),
        ]);
    }
    rows
}

pub fn imputed_rows(teams: &[ImputedTeam]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "team".to_string(),
        "features_from".to_string(),
        "target".to_string(),
        "possible_rename_of".to_string(),
    ]];
    for team in teams {
        rows.push(vec![
            team.team.clone(),
            team.feature_season.clone(),
            team.target_season.clone(),
            team.suspected_rename.clone().unwrap_or_default(),
        ]);
    }
    rows
}

pub fn write_csv<W: Write>(out: W, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.write_record(row).context("write csv row")?;
    }
    writer.flush().context("flush csv")?;
    Ok(())
}

pub fn write_csv_file(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, rows).with_context(|| format!("write {}", path.display()))
}

pub fn export_workbook(
    path: &Path,
    summaries: &[SeasonSummary],
    prediction: Option<&[PredictedPosition]>,
) -> Result<ExportReport> {
    let (mut workbook, report) = build_workbook(summaries, prediction)?;
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(report)
}

fn build_workbook(
    summaries: &[SeasonSummary],
    prediction: Option<&[PredictedPosition]>,
) -> Result<(Workbook, ExportReport)> {
    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();
    let mut season_rows_written = 0usize;

    for summary in summaries {
        let rows = season_rows(std::slice::from_ref(summary));
        season_rows_written += rows.len().saturating_sub(1);
        let sheet = workbook.add_worksheet();
        sheet.set_name(unique_sheet_name(&summary.label, &mut used_names))?;
        write_rows(sheet, &rows, &SEASON_NUMERIC)?;
    }

    let mut prediction_rows_written = 0usize;
    if let Some(table) = prediction {
        let rows = prediction_rows(table);
        prediction_rows_written = rows.len().saturating_sub(1);
        let sheet = workbook.add_worksheet();
        sheet.set_name(unique_sheet_name("Prediction", &mut used_names))?;
        write_rows(sheet, &rows, &PREDICTION_NUMERIC)?;
    }

    let report = ExportReport {
        seasons: summaries.len(),
        season_rows: season_rows_written,
        prediction_rows: prediction_rows_written,
    };
    Ok((workbook, report))
}

fn unique_sheet_name(raw: &str, used: &mut HashSet<String>) -> String {
    let base: String = raw
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(28)
        .collect();
    let base = if base.trim().is_empty() {
        "Season".to_string()
    } else {
        base
    };
    let mut name = base.clone();
    let mut n = 2;
    while !used.insert(name.to_lowercase()) {
        name = format!("{base}~{n}");
        n += 1;
    }
    name
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>], numeric: &[usize]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match numeric_cell(row_idx, col_idx, value, numeric) {
                Some(number) => worksheet.write_number(r, c, number),
                None => worksheet.write_string(r, c, value),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn numeric_cell(row_idx: usize, col_idx: usize, value: &str, numeric: &[usize]) -> Option<f64> {
    if row_idx == 0 || !numeric.contains(&col_idx) {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn render_rows(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (idx, value) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(value.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(idx, value)| format!("{value:<width$}", width = widths[idx]))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
