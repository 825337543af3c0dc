//src/otu_table.rs

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use crate::error::{OtuSubsetError, Result};
use crate::metadata::SampleIds;
use crate::types::OTU_ID_COLUMN;

/// One OTU row: its `SH_name` and a read count per sample column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtuRow {
    pub name: String,
    pub counts: Vec<u64>,
}

impl OtuRow {
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// OTU abundance table: rows are OTUs, columns are samples.
///
/// The identifier column is held apart from the sample columns; sample
/// columns keep the order they had in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtuTable {
    sample_ids: Vec<String>,
    rows: Vec<OtuRow>,
}

impl OtuTable {
    pub fn new(sample_ids: Vec<String>, rows: Vec<OtuRow>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.counts.len() != sample_ids.len() {
                return Err(OtuSubsetError::RaggedRow {
                    row: idx + 1,
                    expected: sample_ids.len() + 1,
                    actual: row.counts.len() + 1,
                });
            }
        }
        Ok(Self { sample_ids, rows })
    }

    /// Loads a tab-separated OTU table.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(file, path)?;
        debug!(
            "Loaded OTU table {} with {} OTUs x {} samples",
            path.display(),
            table.n_otus(),
            table.n_samples()
        );
        Ok(table)
    }

    /// Parses tab-separated text. `artifact` names the source in errors.
    ///
    /// The header must contain `SH_name`; every other column is a sample.
    /// Cells must be non-negative integers.
    pub fn from_reader<R: Read>(reader: R, artifact: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = rdr.headers()?.clone();
        let id_col = header
            .iter()
            .position(|h| h == OTU_ID_COLUMN)
            .ok_or_else(|| OtuSubsetError::MissingColumn {
                column: OTU_ID_COLUMN.to_string(),
                artifact: artifact.to_path_buf(),
            })?;
        let sample_ids: Vec<String> = header
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_col)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, record) in rdr.records().enumerate() {
            let record = record?;
            let row = row_idx + 1;
            if record.len() == 1 && record[0].trim().is_empty() {
                continue;
            }
            if record.len() != header.len() {
                return Err(OtuSubsetError::RaggedRow {
                    row,
                    expected: header.len(),
                    actual: record.len(),
                });
            }

            let mut counts = Vec::with_capacity(sample_ids.len());
            for (col_idx, value_str) in record.iter().enumerate() {
                if col_idx == id_col {
                    continue;
                }
                let value: u64 =
                    value_str
                        .trim()
                        .parse()
                        .map_err(|_| OtuSubsetError::InvalidCount {
                            value: value_str.to_string(),
                            row,
                            column: header[col_idx].to_string(),
                        })?;
                counts.push(value);
            }
            rows.push(OtuRow {
                name: record[id_col].to_string(),
                counts,
            });
        }

        Self::new(sample_ids, rows)
    }

    /// Projects the table onto the sample columns listed in `samples`,
    /// keeping source column order. Rows are untouched.
    pub fn reduce_to_samples(&self, samples: &SampleIds) -> OtuTable {
        let keep: Vec<usize> = self
            .sample_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| samples.contains(id))
            .map(|(i, _)| i)
            .collect();

        let sample_ids = keep.iter().map(|&i| self.sample_ids[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| OtuRow {
                name: row.name.clone(),
                counts: keep.iter().map(|&i| row.counts[i]).collect(),
            })
            .collect();

        OtuTable { sample_ids, rows }
    }

    /// Keeps only the rows accepted by `keep`.
    pub fn retain_rows<F: FnMut(&OtuRow) -> bool>(&self, mut keep: F) -> OtuTable {
        OtuTable {
            sample_ids: self.sample_ids.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Writes the table as TSV with `SH_name` as the first column.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_tsv(file)
    }

    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);

        wtr.write_record(std::iter::once(OTU_ID_COLUMN).chain(self.sample_ids.iter().map(String::as_str)))?;
        for row in &self.rows {
            let counts: Vec<String> = row.counts.iter().map(|c| c.to_string()).collect();
            wtr.write_record(std::iter::once(row.name.as_str()).chain(counts.iter().map(String::as_str)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn rows(&self) -> &[OtuRow] {
        &self.rows
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn n_otus(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<OtuTable> {
        OtuTable::from_reader(Cursor::new(text), Path::new("otus.txt"))
    }

    #[test]
    fn test_parse_basic() {
        let table = parse("SH_name\tA\tB\tC\nx\t0\t0\t5\ny\t1\t0\t0\n").unwrap();
        assert_eq!(table.sample_ids(), &["A", "B", "C"]);
        assert_eq!(table.n_otus(), 2);
        assert_eq!(table.rows()[0].counts, vec![0, 0, 5]);
        assert_eq!(table.rows()[1].name, "y");
        assert_eq!(table.rows()[0].total(), 5);
        assert_eq!(table.rows()[1].max_count(), 1);
    }

    #[test]
    fn test_id_column_need_not_be_first() {
        let table = parse("A\tSH_name\tB\n3\tx\t4\n").unwrap();
        assert_eq!(table.sample_ids(), &["A", "B"]);
        assert_eq!(table.rows()[0].name, "x");
        assert_eq!(table.rows()[0].counts, vec![3, 4]);
    }

    #[test]
    fn test_missing_id_column() {
        match parse("OTU\tA\nx\t1\n") {
            Err(OtuSubsetError::MissingColumn { column, .. }) => assert_eq!(column, "SH_name"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_count_is_fatal() {
        match parse("SH_name\tA\tB\nx\t1\tNA\n") {
            Err(OtuSubsetError::InvalidCount { value, row, column }) => {
                assert_eq!(value, "NA");
                assert_eq!(row, 1);
                assert_eq!(column, "B");
            }
            other => panic!("expected InvalidCount, got {:?}", other),
        }
        assert!(parse("SH_name\tA\nx\t-1\n").is_err());
        assert!(parse("SH_name\tA\nx\t1.5\n").is_err());
    }

    #[test]
    fn test_ragged_row() {
        assert!(matches!(
            parse("SH_name\tA\tB\nx\t1\n"),
            Err(OtuSubsetError::RaggedRow { row: 1, expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_reduce_preserves_source_order() {
        let table = parse("SH_name\tC\tA\tB\tD\nx\t1\t2\t3\t4\n").unwrap();
        let samples: SampleIds = ["B", "C", "Z"].into_iter().collect();
        let reduced = table.reduce_to_samples(&samples);
        assert_eq!(reduced.sample_ids(), &["C", "B"]);
        assert_eq!(reduced.rows()[0].counts, vec![1, 3]);
    }

    #[test]
    fn test_reduce_ignores_id_column_name_in_metadata() {
        let table = parse("SH_name\tA\nx\t1\n").unwrap();
        let samples: SampleIds = ["SH_name", "A"].into_iter().collect();
        assert_eq!(table.reduce_to_samples(&samples).sample_ids(), &["A"]);
    }

    #[test]
    fn test_write_tsv() {
        let table = parse("SH_name\tA\tB\nx\t0\t2\ny\t1\t0\n").unwrap();
        let kept = table.retain_rows(|row| row.name == "y");
        let mut out = Vec::new();
        kept.write_tsv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "SH_name\tA\tB\ny\t1\t0\n");
    }

    #[test]
    fn test_tsv_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("otus.txt");
        let table = parse("SH_name\tA\tB\nx\t0\t2\n").unwrap();
        table.to_tsv(&path).unwrap();
        assert_eq!(OtuTable::from_tsv(&path).unwrap(), table);
    }
}
