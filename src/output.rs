use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Render up to `max_rows` rows as a markdown table, or `(no rows)`.
pub fn render_table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table_rows(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankingRow;
    use tempfile::tempdir;

    fn ranking() -> Vec<RankingRow> {
        vec![
            RankingRow {
                rank: 1,
                name: "Paris".to_string(),
                stations: 394,
            },
            RankingRow {
                rank: 2,
                name: "Lyon".to_string(),
                stations: 120,
            },
        ]
    }

    #[test]
    fn write_csv_uses_renamed_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ranking.csv");
        write_csv(&path, &ranking()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Rank,Name,Stations\n1,Paris,394\n2,Lyon,120\n");
    }

    #[test]
    fn write_json_pretty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &serde_json::json!({"total_stations": 3})).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_stations"], 3);
    }

    #[test]
    fn render_table_rows_truncates() {
        let table = render_table_rows(&ranking(), 1);
        assert!(table.contains("Paris"));
        assert!(!table.contains("Lyon"));
        assert!(table.contains("| Rank"));
    }

    #[test]
    fn render_table_rows_empty() {
        let empty: Vec<RankingRow> = Vec::new();
        assert_eq!(render_table_rows(&empty, 5), "(no rows)");
    }
}
