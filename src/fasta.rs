//src/fasta.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::types::{header_id, is_header, SequenceRecord};

/// Opens a FASTA file for line reading, transparently decompressing `.gz`.
pub fn open_sequence_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Where the scanner is relative to record boundaries.
enum ScanState {
    NoRecordOpen,
    /// `None` while inside a record the predicate rejected; its lines are dropped.
    RecordOpen(Option<SequenceRecord>),
}

/// Single-pass FASTA scanner.
///
/// Reads one line of raw bytes at a time and yields each record once the
/// next header (or end of input) closes it. Lines before the first header
/// are ignored. The `keep` predicate sees each identifier as its header is
/// read; rejected records are never buffered.
pub struct FastaRecords<R, F> {
    reader: R,
    keep: F,
    state: ScanState,
    line: Vec<u8>,
    done: bool,
}

impl<R: BufRead> FastaRecords<R, fn(&str) -> bool> {
    /// Yields every record in the stream.
    pub fn new(reader: R) -> Self {
        Self::filtered(reader, keep_all)
    }
}

fn keep_all(_id: &str) -> bool {
    true
}

impl<R: BufRead, F: FnMut(&str) -> bool> FastaRecords<R, F> {
    /// Yields only the records whose identifier satisfies `keep`.
    pub fn filtered(reader: R, keep: F) -> Self {
        Self {
            reader,
            keep,
            state: ScanState::NoRecordOpen,
            line: Vec::new(),
            done: false,
        }
    }

    fn close_open_record(&mut self) -> Option<SequenceRecord> {
        match std::mem::replace(&mut self.state, ScanState::NoRecordOpen) {
            ScanState::RecordOpen(record) => record,
            ScanState::NoRecordOpen => None,
        }
    }
}

impl<R: BufRead, F: FnMut(&str) -> bool> Iterator for FastaRecords<R, F> {
    type Item = io::Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.done = true;
                    return self.close_open_record().map(Ok);
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            if is_header(&self.line) {
                let id = String::from_utf8_lossy(header_id(&self.line));
                let opened = if (self.keep)(&id) {
                    Some(SequenceRecord::from_header(&self.line))
                } else {
                    None
                };
                let closed = std::mem::replace(&mut self.state, ScanState::RecordOpen(opened));
                if let ScanState::RecordOpen(Some(record)) = closed {
                    return Some(Ok(record));
                }
            } else if let ScanState::RecordOpen(Some(record)) = &mut self.state {
                record.push_line(&self.line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn parse_all(input: &[u8]) -> Vec<SequenceRecord> {
        FastaRecords::new(Cursor::new(input))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    fn texts(recs: &[SequenceRecord]) -> Vec<String> {
        recs.iter()
            .map(|r| String::from_utf8(r.text.clone()).unwrap())
            .collect()
    }

    #[test]
    fn test_multiline_records() {
        let recs = parse_all(b">a|one\nACGT\nTTTT\n>b|two\nGGGG\n");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "a");
        assert_eq!(recs[0].text, b">a|one\nACGT\nTTTT\n");
        assert_eq!(recs[1].id, "b");
        assert_eq!(recs[1].text, b">b|two\nGGGG\n");
    }

    #[test]
    fn test_leading_lines_discarded() {
        let recs = parse_all(b"junk\n\nmore junk\n>a\nAC\n");
        assert_eq!(texts(&recs), vec![">a\nAC\n"]);
    }

    #[test]
    fn test_header_only_records() {
        let recs = parse_all(b">a|x\n>b|y\nAC\n>c|z\n");
        assert_eq!(texts(&recs), vec![">a|x\n", ">b|y\nAC\n", ">c|z\n"]);
    }

    #[test]
    fn test_missing_trailing_newline_and_crlf() {
        let recs = parse_all(b">a|x\r\nAC\r\n>b\nGT");
        assert_eq!(recs[0].text, b">a|x\r\nAC\r\n");
        assert_eq!(recs[1].id, "b");
        assert_eq!(recs[1].text, b">b\nGT");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_all(b"").is_empty());
        assert!(parse_all(b"no headers here\n").is_empty());
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let input: &[u8] = b">x|Pen\xe9cillium\nAC\xff\n>y|desc\nGG\n";
        let recs = parse_all(input);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "x");
        assert_eq!(recs[0].text, b">x|Pen\xe9cillium\nAC\xff\n");
        assert_eq!(recs[1].text, b">y|desc\nGG\n");
    }

    #[test]
    fn test_filtered_skips_rejected_bodies() {
        let input: &[u8] = b">x|desc\nSEQ1\n>y|desc\nSEQ2\n>z|desc\nSEQ3\n";
        let recs: Vec<SequenceRecord> = FastaRecords::filtered(Cursor::new(input), |id: &str| id != "y")
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(texts(&recs), vec![">x|desc\nSEQ1\n", ">z|desc\nSEQ3\n"]);
    }

    #[test]
    fn test_open_gzipped_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqs.fa.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b">a|x\nACGT\n").unwrap();
        enc.finish().unwrap();

        let recs: Vec<SequenceRecord> = FastaRecords::new(open_sequence_reader(&path).unwrap())
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].text, b">a|x\nACGT\n");
    }
}
