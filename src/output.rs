use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write an already-rendered report verbatim.
pub fn write_text(path: impl AsRef<Path>, contents: &str) -> Result<(), Box<dyn Error>> {
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown preview of the first `max_rows` rows.
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
    use crate::types::{GapReasonRow, SeriesBucket};

    #[test]
    fn markdown_preview_is_truncated() {
        let rows = vec![
            GapReasonRow {
                reason: "Vehicle breakdown".into(),
                incidents: 3,
            },
            GapReasonRow {
                reason: "Field supervisor absent".into(),
                incidents: 1,
            },
        ];
        let out = render_table_rows(&rows, 1);
        assert!(out.contains("| Reason"));
        assert!(out.contains("Vehicle breakdown"));
        assert!(!out.contains("Field supervisor absent"));
    }

    #[test]
    fn empty_preview() {
        let rows: Vec<SeriesBucket> = Vec::new();
        assert_eq!(render_table_rows(&rows, 5), "(no rows)");
    }

    #[test]
    fn series_csv_has_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        let rows = vec![SeriesBucket {
            label: "Mar 2024".into(),
            giving: 170.0,
            segregating: 90.0,
        }];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Period,Giving,Segregating\n"));
        assert!(text.contains("Mar 2024,170"));
    }
}
