//src/types.rs

/// Marks the first line of a FASTA record.
pub const RECORD_START: u8 = b'>';

/// Separates the identifier from the rest of a FASTA header.
pub const FIELD_SEPARATOR: u8 = b'|';

/// Name of the identifier column in the OTU table.
pub const OTU_ID_COLUMN: &str = "SH_name";

/// Name of the sample column in the metadata sheet.
pub const SAMPLE_ID_COLUMN: &str = "Sample ID";

/// One FASTA record, kept exactly as it appeared in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Header text between `>` and the first `|` (lossily decoded).
    pub id: String,
    /// Raw bytes of the header line plus every body line, line endings included.
    pub text: Vec<u8>,
}

impl SequenceRecord {
    /// Starts a record from its header line (terminator included).
    pub fn from_header(header_line: &[u8]) -> Self {
        Self {
            id: String::from_utf8_lossy(header_id(header_line)).into_owned(),
            text: header_line.to_vec(),
        }
    }

    pub fn push_line(&mut self, line: &[u8]) {
        self.text.extend_from_slice(line);
    }
}

/// Returns `true` if the line opens a new record.
#[inline]
pub fn is_header(line: &[u8]) -> bool {
    line.first() == Some(&RECORD_START)
}

/// Extracts the record identifier from a header line.
///
/// `>id123|extra|stuff` gives `id123`. Without a `|` the rest of the line is
/// used, minus its line terminator.
pub fn header_id(header_line: &[u8]) -> &[u8] {
    let rest = header_line
        .strip_prefix(&[RECORD_START])
        .unwrap_or(header_line);
    match rest.iter().position(|&b| b == FIELD_SEPARATOR) {
        Some(pos) => &rest[..pos],
        None => {
            let mut end = rest.len();
            while end > 0 && matches!(rest[end - 1], b'\n' | b'\r') {
                end -= 1;
            }
            &rest[..end]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_id_stops_at_first_separator() {
        assert_eq!(header_id(b">id123|extra|stuff\n"), b"id123");
        assert_eq!(header_id(b">id123|extra|more|fields|here"), b"id123");
    }

    #[test]
    fn test_header_id_without_separator() {
        assert_eq!(header_id(b">SH001\n"), b"SH001");
        assert_eq!(header_id(b">SH001\r\n"), b"SH001");
        assert_eq!(header_id(b">SH001"), b"SH001");
    }

    #[test]
    fn test_header_id_empty() {
        assert_eq!(header_id(b">|desc\n"), b"");
        assert_eq!(header_id(b">\n"), b"");
    }

    #[test]
    fn test_is_header() {
        assert!(is_header(b">x\n"));
        assert!(!is_header(b"ACGT\n"));
        assert!(!is_header(b""));
    }

    #[test]
    fn test_record_keeps_text_verbatim() {
        let mut rec = SequenceRecord::from_header(b">x|desc\r\n");
        rec.push_line(b"ACGT\r\n");
        rec.push_line(b"TTGA");
        assert_eq!(rec.id, "x");
        assert_eq!(rec.text, b">x|desc\r\nACGT\r\nTTGA");
    }

    #[test]
    fn test_record_with_non_utf8_description() {
        let rec = SequenceRecord::from_header(b">SH9|Pen\xe9cillium\n");
        assert_eq!(rec.id, "SH9");
        assert_eq!(rec.text, b">SH9|Pen\xe9cillium\n");
    }
}
