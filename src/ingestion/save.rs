//! Save functions - publish a cleaned table as CSV via temp file + rename

use crate::ingestion::types::{RecordTable, NULL_TOKEN};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Write the table to `temp_path`, then rename it onto `final_path`.
///
/// Null cells are written as `NULL`. On any failure the temp file is
/// removed and whatever was already at `final_path` stays as it was.
pub fn save_dataset(table: &RecordTable, temp_path: &Path, final_path: &Path) -> Result<()> {
    info!(
        "Saving {} rows to {:?} (via {:?})",
        table.len(),
        final_path,
        temp_path
    );

    let published = write_csv(table, temp_path).and_then(|()| {
        fs::rename(temp_path, final_path)
            .with_context(|| format!("Failed to rename {:?} -> {:?}", temp_path, final_path))
    });

    if let Err(e) = published {
        if temp_path.exists() {
            if let Err(cleanup) = fs::remove_file(temp_path) {
                warn!("Could not remove temp file {:?}: {}", temp_path, cleanup);
            }
        }
        return Err(e);
    }

    info!("Saved {:?}", final_path);
    Ok(())
}

fn write_csv(table: &RecordTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    writer
        .write_record(&table.columns)
        .with_context(|| format!("Failed to write header to {:?}", path))?;

    for (idx, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or(NULL_TOKEN)))
            .with_context(|| format!("Failed to write row {} to {:?}", idx, path))?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush {:?}: {}", path, e.error()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::clean::replace_missing_values;
    use crate::ingestion::parse::load_dataset;
    use crate::ingestion::rules::CleanRules;
    use tempfile::tempdir;

    fn mock_table() -> RecordTable {
        RecordTable {
            columns: vec!["Name".to_string(), "Notes".to_string()],
            rows: vec![
                vec![Some("Smith, Jr.".to_string()), None],
                vec![None, Some("said \"hi\"\non two lines".to_string())],
            ],
        }
    }

    #[test]
    fn test_nulls_written_as_token() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("sales_temp.csv");
        let out = dir.path().join("sales.csv");

        save_dataset(&mock_table(), &temp, &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Name,Notes\n\"Smith, Jr.\",NULL\nNULL,"));
        assert!(!temp.exists());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("sales_temp.csv");
        let out = dir.path().join("sales.csv");
        let table = mock_table();

        save_dataset(&table, &temp, &out).unwrap();

        let mut reread = load_dataset(&out).unwrap();
        replace_missing_values(&mut reread, &CleanRules::default()).unwrap();

        assert_eq!(reread, table);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("sales_temp.csv");
        let out = dir.path().join("sales.csv");

        save_dataset(&mock_table(), &temp, &out).unwrap();
        let before = fs::read_to_string(&out).unwrap();

        // the writer refuses rows that do not match the header width
        let mut ragged = mock_table();
        ragged.rows.push(vec![Some("only one".to_string())]);

        assert!(save_dataset(&ragged, &temp, &out).is_err());
        assert_eq!(fs::read_to_string(&out).unwrap(), before);
        assert!(!temp.exists());
        assert_eq!(load_dataset(&out).unwrap().len(), 2);
    }

    #[test]
    fn test_unwritable_temp_path() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("missing_dir").join("sales_temp.csv");
        let out = dir.path().join("sales.csv");
        fs::write(&out, "Name\nold\n").unwrap();

        assert!(save_dataset(&mock_table(), &temp, &out).is_err());
        assert_eq!(fs::read_to_string(&out).unwrap(), "Name\nold\n");
    }
}
