use crate::models::OddsRecord;
use crate::pipeline::OddsBoard;
use anyhow::{Context, Result};
use std::path::Path;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Save a scraped board to a JSON cache file
pub fn save_board_to_cache(board: &OddsBoard, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(board).context("Failed to serialize odds board")?;
    std::fs::write(path, json).context("Failed to write cache file")?;
    Ok(())
}

/// Load a board previously written by `save_board_to_cache`
pub fn load_board_from_cache(path: impl AsRef<Path>) -> Result<OddsBoard> {
    let json = std::fs::read_to_string(path.as_ref()).context("Failed to read cache file")?;
    let board: OddsBoard =
        serde_json::from_str(&json).context("Failed to deserialize odds board")?;
    Ok(board)
}

/// Save records to CSV, one row per game, columns in `OddsRecord::COLUMNS` order
pub fn save_records_to_csv(records: &[OddsRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path).context("Failed to create CSV file")?;

    writer.write_record(OddsRecord::COLUMNS)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush().context("Failed to flush CSV file")?;

    Ok(())
}
