use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::lexicon::Lexicon;
use crate::sample::StratifiedSample;
use crate::stats::{CountTable, SensitivityRow, UncertaintyResult, per_million};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    Ok(())
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    ensure_parent(path)?;
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create file: {:?}", path))
}

/// Write any serializable summary as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Write the per-term count table with raw counts and per-million rates,
/// one row per registered term in lexicon order.
pub fn write_count_table(path: &Path, table: &CountTable, lexicon: &Lexicon) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record([
        "term",
        "vocative_count",
        "vocative_per_million",
        "voc_chi_count",
        "voc_chi_per_million",
        "voc_adu_count",
        "voc_adu_per_million",
        "argument_count",
        "argument_per_million",
        "arg_bare_count",
        "arg_bare_per_million",
        "arg_det_count",
        "arg_det_per_million",
    ])?;

    let total = table.surface_total;
    for row in table.rows(lexicon) {
        let rate = |count: u64| format!("{:.2}", per_million(count, total));
        writer.write_record([
            row.term.clone(),
            row.voc.to_string(),
            rate(row.voc),
            row.voc_chi.to_string(),
            rate(row.voc_chi),
            row.voc_adu.to_string(),
            rate(row.voc_adu),
            row.arg.to_string(),
            rate(row.arg),
            row.arg_bare.to_string(),
            rate(row.arg_bare),
            row.arg_det.to_string(),
            rate(row.arg_det),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the stratified QC sample, stratum by stratum.
pub fn write_sample_tsv(path: &Path, sample: &StratifiedSample) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record([
        "stratum",
        "term",
        "class",
        "category",
        "file",
        "line_no",
        "speaker",
        "utterance",
        "tokens_marked",
    ])?;
    for key in crate::sample::STRATA {
        let Some(records) = sample.records.get(key) else {
            continue;
        };
        for record in records {
            writer.write_record([
                record.stratum.clone(),
                record.term.clone(),
                record.class.clone(),
                record.category.clone(),
                record.file.clone(),
                record.line_no.to_string(),
                record.speaker.clone(),
                record.utterance.clone(),
                record.tokens_marked.clone(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write the heuristic sensitivity comparison table.
pub fn write_sensitivity_tsv(path: &Path, rows: &[SensitivityRow]) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record([
        "heuristic",
        "level",
        "label",
        "vocative_count",
        "argument_count",
        "vocative_percent",
    ])?;
    for row in rows {
        writer.write_record([
            row.heuristic.clone(),
            row.level.clone(),
            row.label.clone(),
            row.vocative_count.to_string(),
            row.argument_count.to_string(),
            format!("{:.2}", row.vocative_percent),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write per-draw posterior rates for the parent/extended contrast.
pub fn write_draws_tsv(path: &Path, result: &UncertaintyResult) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(["draw", "parent_rate", "extended_rate", "diff", "ratio"])?;

    let empty: Vec<f64> = Vec::new();
    let parent = result
        .categories
        .get("parent")
        .map(|c| &c.rate_draws)
        .unwrap_or(&empty);
    let extended = result
        .categories
        .get("extended")
        .map(|c| &c.rate_draws)
        .unwrap_or(&empty);

    for (i, (p, e)) in parent.iter().zip(extended).enumerate() {
        let diff = p - e;
        let ratio = if *e > 0.0 { p / e } else { f64::INFINITY };
        writer.write_record([
            (i + 1).to_string(),
            format!("{:.6}", p),
            format!("{:.6}", e),
            format!("{:.6}", diff),
            format!("{:.6}", ratio),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
