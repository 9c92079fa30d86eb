use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::lexicon::Lexicon;
use crate::stats::{LabelRecord, ObservedCounts};

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Load observed per-term vocative/argument counts from a count-table TSV
/// (the output of the `count` subcommand). Rows for unregistered terms
/// are ignored; the bare/det and child-split columns are optional.
pub fn load_observed_counts(path: &Path, lexicon: &Lexicon) -> Result<Vec<ObservedCounts>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to open counts file: {:?}", path))?;

    let headers = reader.headers()?.clone();
    let term_col =
        column_index(&headers, "term").context("counts file is missing a 'term' column")?;
    let voc_col = column_index(&headers, "vocative_count")
        .context("counts file is missing a 'vocative_count' column")?;
    let arg_col = column_index(&headers, "argument_count")
        .context("counts file is missing an 'argument_count' column")?;
    let bare_col = column_index(&headers, "arg_bare_count");
    let det_col = column_index(&headers, "arg_det_count");

    let parse_count = |record: &csv::StringRecord, col: Option<usize>| -> Result<u64> {
        let Some(col) = col else { return Ok(0) };
        let raw = record.get(col).unwrap_or("0");
        raw.parse()
            .with_context(|| format!("bad count value {:?}", raw))
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let term = record
            .get(term_col)
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if !lexicon.is_term(&term) {
            continue;
        }
        rows.push(ObservedCounts {
            term,
            voc: parse_count(&record, Some(voc_col))?,
            arg: parse_count(&record, Some(arg_col))?,
            arg_bare: parse_count(&record, bare_col)?,
            arg_det: parse_count(&record, det_col)?,
        });
    }
    Ok(rows)
}

/// Load manually reviewed labels from a TSV with configurable column
/// names for the predicted label, the manual label, and the category.
pub fn load_manual_labels(
    path: &Path,
    pred_col: &str,
    true_col: &str,
    cat_col: &str,
) -> Result<Vec<LabelRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to open labels file: {:?}", path))?;

    let headers = reader.headers()?.clone();
    let Some(pred_idx) = column_index(&headers, pred_col) else {
        bail!("labels file is missing the predicted-label column {:?}", pred_col);
    };
    let Some(true_idx) = column_index(&headers, true_col) else {
        bail!("labels file is missing the manual-label column {:?}", true_col);
    };
    let Some(cat_idx) = column_index(&headers, cat_col) else {
        bail!("labels file is missing the category column {:?}", cat_col);
    };

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(LabelRecord {
            category: record.get(cat_idx).unwrap_or("").to_string(),
            predicted: record.get(pred_idx).unwrap_or("").to_string(),
            manual: record.get(true_idx).unwrap_or("").to_string(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_observed_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.tsv");
        std::fs::write(
            &path,
            "term\tvocative_count\targument_count\targ_bare_count\targ_det_count\n\
             mom\t100\t200\t50\t150\n\
             pizza\t5\t5\t5\t0\n\
             AUNTIE\t10\t20\t12\t8\n",
        )
        .unwrap();

        let rows = load_observed_counts(&path, &Lexicon::english()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].term, "mom");
        assert_eq!(rows[0].voc, 100);
        assert_eq!(rows[0].arg_det, 150);
        // term matching is case-insensitive
        assert_eq!(rows[1].term, "auntie");
    }

    #[test]
    fn test_load_observed_counts_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.tsv");
        std::fs::write(&path, "term\tvocative_count\targument_count\nmom\t1\t2\n").unwrap();

        let rows = load_observed_counts(&path, &Lexicon::english()).unwrap();
        assert_eq!(rows[0].arg_bare, 0);
        assert_eq!(rows[0].arg_det, 0);
    }

    #[test]
    fn test_load_manual_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.tsv");
        std::fs::write(
            &path,
            "term\tclass\tmanual_label\tcategory\n\
             mom\tvocative\tvoc\tparent\n\
             auntie\targument\tambiguous\textended\n",
        )
        .unwrap();

        let records = load_manual_labels(&path, "class", "manual_label", "category").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].predicted, "vocative");
        assert_eq!(records[0].manual, "voc");
        assert_eq!(records[1].category, "extended");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.tsv");
        std::fs::write(&path, "term\tclass\n mom\tvocative\n").unwrap();
        assert!(load_manual_labels(&path, "class", "manual_label", "category").is_err());
    }
}
