use crate::error::InputError;
use crate::models::Record;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a headerless `group,category,value` CSV file.
///
/// The whole file must parse; the first malformed row aborts with
/// [`InputError::Parse`] carrying its line number.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, InputError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let records = parse_records(File::open(path)?)?;
    log::debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Same as [`read_records`] for any reader.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Record>, InputError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        // column count is checked per row so the error names the line
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        out.push(to_record(&row, line)?);
    }
    if out.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(out)
}

fn to_record(row: &StringRecord, line: u64) -> Result<Record, InputError> {
    if row.len() != 3 {
        return Err(InputError::Parse {
            line,
            message: format!(
                "expected 3 fields (group,category,value), found {}: {:?}",
                row.len(),
                row.iter().collect::<Vec<_>>().join(",")
            ),
        });
    }
    let raw = &row[2];
    let value: f64 = raw.parse().map_err(|_| InputError::Parse {
        line,
        message: format!("value {raw:?} is not a number"),
    })?;
    if !value.is_finite() {
        return Err(InputError::Parse {
            line,
            message: format!("value {raw:?} is not finite"),
        });
    }
    Ok(Record::new(&row[0], &row[1], value))
}

fn csv_error(err: csv::Error) -> InputError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(e) => InputError::Io(e),
        other => InputError::Parse {
            line,
            message: format!("{other:?}"),
        },
    }
}

/// Sorted, de-duplicated category names.
pub fn distinct_categories(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_rows() {
        let data = "North, A ,30\nNorth,B, 70.5\n\nSouth,A,50\n";
        let rows = parse_records(data.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                Record::new("North", "A", 30.0),
                Record::new("North", "B", 70.5),
                Record::new("South", "A", 50.0),
            ]
        );
    }

    #[test]
    fn non_numeric_value_reports_line() {
        let data = "North,A,30\nNorth,B,lots\n";
        match parse_records(data.as_bytes()) {
            Err(InputError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("lots"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_column_count_is_rejected() {
        let data = "North,A,30\nSouth,B\n";
        assert!(matches!(
            parse_records(data.as_bytes()),
            Err(InputError::Parse { line: 2, .. })
        ));
        let data = "North,A,30,extra\n";
        assert!(matches!(
            parse_records(data.as_bytes()),
            Err(InputError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn infinite_values_are_rejected() {
        assert!(matches!(
            parse_records("a,b,inf\n".as_bytes()),
            Err(InputError::Parse { .. })
        ));
    }

    #[test]
    fn empty_input_is_error() {
        assert!(matches!(parse_records("".as_bytes()), Err(InputError::Empty)));
        assert!(matches!(parse_records("\n\n".as_bytes()), Err(InputError::Empty)));
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let rows = vec![
            Record::new("g1", "b", 1.0),
            Record::new("g2", "a", 1.0),
            Record::new("g2", "b", 1.0),
        ];
        assert_eq!(distinct_categories(&rows), vec!["a", "b"]);
    }
}
