//! ISO 2709 (MARC transmission format) record framing checks
//!
//! Only the envelope is checked: leader length, base address, field and
//! record terminators. Field contents are not interpreted.

/// Leader length in bytes
pub const LEADER_LEN: usize = 24;

/// End of field
pub const FIELD_TERMINATOR: u8 = 0x1E;

/// End of record
pub const RECORD_TERMINATOR: u8 = 0x1D;

fn parse_digits(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Check that `data` is a non-empty sequence of well-framed records
///
/// Trailing ASCII whitespace after the last record is tolerated.
/// Returns the number of records, or a description of the first problem.
///
/// ```
/// use catalog_export::core::verification::marc::check_records;
///
/// assert!(check_records(b"").is_err());
/// assert!(check_records(br#"{"outputRecords": 0}"#).is_err());
/// ```
pub fn check_records(data: &[u8]) -> Result<usize, String> {
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let data = &data[..end];

    if data.is_empty() {
        return Err("file is empty".to_string());
    }

    let mut offset = 0;
    let mut count = 0;
    while offset < data.len() {
        let remaining = &data[offset..];
        let record_no = count + 1;

        if remaining.len() < LEADER_LEN {
            return Err(format!(
                "record {record_no} at byte {offset}: {} bytes left, shorter than a leader",
                remaining.len()
            ));
        }

        let length = parse_digits(&remaining[0..5]).ok_or_else(|| {
            format!("record {record_no} at byte {offset}: record length is not numeric")
        })?;
        if length <= LEADER_LEN {
            return Err(format!(
                "record {record_no} at byte {offset}: record length {length} is too small"
            ));
        }
        if length > remaining.len() {
            return Err(format!(
                "record {record_no} at byte {offset}: record length {length} exceeds the {} bytes left",
                remaining.len()
            ));
        }

        let record = &remaining[..length];
        if record[length - 1] != RECORD_TERMINATOR {
            return Err(format!(
                "record {record_no} at byte {offset}: missing record terminator"
            ));
        }

        let base = parse_digits(&record[12..17]).ok_or_else(|| {
            format!("record {record_no} at byte {offset}: base address is not numeric")
        })?;
        if base <= LEADER_LEN || base >= length {
            return Err(format!(
                "record {record_no} at byte {offset}: base address {base} is outside the record"
            ));
        }
        if record[base - 1] != FIELD_TERMINATOR {
            return Err(format!(
                "record {record_no} at byte {offset}: directory is not terminated at base address {base}"
            ));
        }

        offset += length;
        count += 1;
    }

    Ok(count)
}

/// Build a minimal well-formed record around `fields`, for tests and fixtures
///
/// Each field is a `(tag, data)` pair; `data` gets a field terminator appended.
pub fn build_record(fields: &[(&str, &[u8])]) -> Vec<u8> {
    let mut directory = Vec::new();
    let mut body = Vec::new();
    for (tag, data) in fields {
        let start = body.len();
        body.extend_from_slice(data);
        body.push(FIELD_TERMINATOR);
        let len = body.len() - start;
        directory.extend_from_slice(format!("{tag:0>3}{len:04}{start:05}").as_bytes());
    }
    directory.push(FIELD_TERMINATOR);

    let base = LEADER_LEN + directory.len();
    let total = base + body.len() + 1;

    let mut record = Vec::with_capacity(total);
    record.extend_from_slice(format!("{total:05}nam a22{base:05}   4500").as_bytes());
    record.extend_from_slice(&directory);
    record.extend_from_slice(&body);
    record.push(RECORD_TERMINATOR);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        build_record(&[("001", b"b1000001"), ("245", b"10\x1faA title")])
    }

    #[test]
    fn test_build_record_leader_layout() {
        let record = sample();
        assert_eq!(record.len(), parse_digits(&record[0..5]).unwrap());
        assert_eq!(&record[5..12], b"nam a22");
        assert_eq!(&record[17..24], b"   4500");
    }

    #[test]
    fn test_single_record() {
        assert_eq!(check_records(&sample()), Ok(1));
    }

    #[test]
    fn test_multiple_records_with_trailing_newline() {
        let mut data = sample();
        data.extend(sample());
        data.extend(b"\r\n");
        assert_eq!(check_records(&data), Ok(2));
    }

    #[test]
    fn test_json_body_is_invalid() {
        let err = check_records(br#"{"code": 109, "name": "External Process Failed"}"#).unwrap_err();
        assert!(err.contains("not numeric") || err.contains("shorter than a leader"));
    }

    #[test]
    fn test_truncated_record() {
        let record = sample();
        let err = check_records(&record[..record.len() - 5]).unwrap_err();
        assert!(err.contains("exceeds"));
    }

    #[test]
    fn test_missing_record_terminator() {
        let mut record = sample();
        let last = record.len() - 1;
        record[last] = b'x';
        assert!(check_records(&record).unwrap_err().contains("record terminator"));
    }

    #[test]
    fn test_bad_base_address() {
        let mut record = sample();
        record[12..17].copy_from_slice(b"00030");
        assert!(check_records(&record).is_err());
    }

    #[test]
    fn test_garbage_after_valid_record() {
        let mut data = sample();
        data.extend(b"ErrorCode(42)");
        assert!(check_records(&data).unwrap_err().starts_with("record 2"));
    }
}
