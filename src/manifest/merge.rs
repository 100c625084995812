use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Join two prediction tables column-wise.
///
/// Rows are matched on the intersection of the two headers (left order
/// preserved) and the right table's unique columns are appended to every
/// matching row. Rows without a match on the other side are dropped, and
/// keys occurring multiple times on both sides multiply, as in a
/// relational inner join.
pub fn merge(left_path: &Path, right_path: &Path, output_path: &Path) -> Result<()> {
    let (left_headers, left_rows) = read_table(left_path)?;
    let (right_headers, right_rows) = read_table(right_path)?;

    info!("Read {} rows from {:?}", left_rows.len(), left_path);
    info!("Read {} rows from {:?}", right_rows.len(), right_path);

    let shared: Vec<String> = left_headers
        .iter()
        .filter(|h| right_headers.contains(h))
        .cloned()
        .collect();
    if shared.is_empty() {
        bail!(
            "{:?} and {:?} share no columns to join on",
            left_path,
            right_path
        );
    }

    let right_unique: Vec<usize> = (0..right_headers.len())
        .filter(|&i| !shared.contains(&right_headers[i]))
        .collect();

    info!("Joining on {} shared column(s)", shared.len());
    info!(
        "Appending column(s): {:?}",
        right_unique
            .iter()
            .map(|&i| right_headers[i].as_str())
            .collect::<Vec<_>>()
    );

    let left_key_idx = key_indices(&left_headers, &shared);
    let right_key_idx = key_indices(&right_headers, &shared);

    // Index right rows by their join key
    let mut right_by_key: HashMap<Vec<&str>, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right_rows.iter().enumerate() {
        let key: Vec<&str> = right_key_idx.iter().map(|&i| &row[i]).collect();
        right_by_key.entry(key).or_default().push(row_idx);
    }

    let temp_path = output_path.with_extension("csv.tmp");
    let mut matched = 0usize;
    {
        let mut writer = csv::Writer::from_path(&temp_path)
            .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;

        let mut header: Vec<&str> = left_headers.iter().map(|h| h.as_str()).collect();
        header.extend(right_unique.iter().map(|&i| right_headers[i].as_str()));
        writer.write_record(&header)?;

        for row in &left_rows {
            let key: Vec<&str> = left_key_idx.iter().map(|&i| &row[i]).collect();
            let Some(matches) = right_by_key.get(&key) else {
                continue;
            };
            for &right_idx in matches {
                let right_row = &right_rows[right_idx];
                let mut record: Vec<&str> = row.iter().collect();
                record.extend(right_unique.iter().map(|&i| &right_row[i]));
                writer.write_record(&record)?;
                matched += 1;
            }
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush {:?}", temp_path))?;
    }

    std::fs::rename(&temp_path, output_path)
        .with_context(|| format!("Failed to rename temp file to {:?}", output_path))?;

    info!("Wrote {} merged rows to {:?}", matched, output_path);
    Ok(())
}

fn read_table(path: &Path) -> Result<(Vec<String>, Vec<csv::StringRecord>)> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open table {:?}", path))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {:?}", path))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row.with_context(|| format!("Failed to parse a row in {:?}", path))?);
    }
    Ok((headers, rows))
}

/// Positions of the shared columns within one table's header.
/// Shared names are an intersection of both headers, so every lookup hits.
fn key_indices(headers: &[String], shared: &[String]) -> Vec<usize> {
    shared
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_merge_appends_right_unique_columns() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("acoustic.csv");
        let right = dir.path().join("linguistic.csv");
        let out = dir.path().join("combined.csv");

        fs::write(
            &left,
            "file,speaker,emotion,acoustic_pred\ndata/a.wav,s01,happy,happy\ndata/b.wav,s02,angry,sad\n",
        )
        .unwrap();
        fs::write(
            &right,
            "file,speaker,emotion,linguistic_pred\ndata/a.wav,s01,happy,neutral\ndata/b.wav,s02,angry,angry\n",
        )
        .unwrap();

        merge(&left, &right, &out).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "file,speaker,emotion,acoustic_pred,linguistic_pred"
        );
        assert_eq!(lines[1], "data/a.wav,s01,happy,happy,neutral");
        assert_eq!(lines[2], "data/b.wav,s02,angry,sad,angry");
    }

    #[test]
    fn test_merge_drops_unmatched_rows() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left.csv");
        let right = dir.path().join("right.csv");
        let out = dir.path().join("out.csv");

        fs::write(&left, "file,pred_a\na.wav,x\nb.wav,y\n").unwrap();
        fs::write(&right, "file,pred_b\na.wav,z\n").unwrap();

        merge(&left, &right, &out).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("a.wav,x,z"));
        assert!(!content.contains("b.wav"));
    }

    #[test]
    fn test_merge_rejects_disjoint_headers() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left.csv");
        let right = dir.path().join("right.csv");

        fs::write(&left, "file,pred_a\na.wav,x\n").unwrap();
        fs::write(&right, "segment,pred_b\na.wav,z\n").unwrap();

        assert!(merge(&left, &right, &dir.path().join("out.csv")).is_err());
    }

    #[test]
    fn test_merge_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left.csv");
        fs::write(&left, "file,pred_a\na.wav,x\n").unwrap();

        assert!(merge(
            &left,
            &dir.path().join("missing.csv"),
            &dir.path().join("out.csv")
        )
        .is_err());
    }
}
