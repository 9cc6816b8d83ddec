//! CSV batch encoder.
//!
//! Turns a sequence of record mappings into the CSV document the Bulk API
//! ingests: comma delimited, LF line endings, quoting only where needed.
//! Those parameters match the `columnDelimiter`/`lineEnding` values fixed
//! at job creation; the two must never drift apart.

use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Encode a batch of records into CSV text.
///
/// Each entry must be a JSON object mapping field names to scalar values.
/// The header row is the union of all field names in first-seen order;
/// records that lack one of the fields emit an empty value for it, which
/// the Bulk API treats as "leave unchanged". `null` also encodes as an
/// empty field.
///
/// Fails with [`ErrorKind::Encoding`] on an empty batch, a non-object
/// entry, or a field holding an array or nested object.
pub fn encode(entries: &[Value]) -> Result<String> {
    if entries.is_empty() {
        return Err(Error::new(ErrorKind::Encoding(
            "cannot encode an empty batch".into(),
        )));
    }

    let records = entries
        .iter()
        .map(|entry| {
            entry.as_object().ok_or_else(|| {
                Error::new(ErrorKind::Encoding(format!(
                    "batch entries must be objects, got: {entry}"
                )))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Header: union of field names in first-seen order.
    let mut columns: Vec<&str> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for record in &records {
        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            row.push(match record.get(*column) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                Some(other) => {
                    return Err(Error::new(ErrorKind::Encoding(format!(
                        "field {column:?} holds a non-scalar value: {other}"
                    ))))
                }
            });
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::new(ErrorKind::Encoding(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| Error::new(ErrorKind::Encoding(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_header_plus_one_row_per_entry() {
        let csv = encode(&[
            json!({"Name": "Acme", "Industry": "Technology"}),
            json!({"Name": "Globex", "Industry": "Finance"}),
        ])
        .unwrap();

        assert_eq!(csv, "Name,Industry\nAcme,Technology\nGlobex,Finance\n");
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn header_is_first_seen_union() {
        let csv = encode(&[
            json!({"Name": "Acme"}),
            json!({"Name": "Globex", "Industry": "Finance"}),
        ])
        .unwrap();

        assert_eq!(csv, "Name,Industry\nAcme,\nGlobex,Finance\n");
    }

    #[test]
    fn quotes_only_where_needed() {
        let csv = encode(&[json!({
            "Name": "Acme, Inc.",
            "Description": "says \"hi\"",
            "Notes": "line1\nline2",
        })])
        .unwrap();

        assert_eq!(
            csv,
            "Name,Description,Notes\n\"Acme, Inc.\",\"says \"\"hi\"\"\",\"line1\nline2\"\n"
        );
    }

    #[test]
    fn scalars_stringify() {
        let csv = encode(&[json!({
            "Name": "Acme",
            "NumberOfEmployees": 250,
            "IsActive__c": true,
            "ParentId": null,
        })])
        .unwrap();

        assert_eq!(
            csv,
            "Name,NumberOfEmployees,IsActive__c,ParentId\nAcme,250,true,\n"
        );
    }

    #[test]
    fn empty_batch_is_an_error() {
        let err = encode(&[]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Encoding(_)));
    }

    #[test]
    fn non_object_entry_is_an_error() {
        let err = encode(&[json!("Acme")]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Encoding(_)));
    }

    #[test]
    fn nested_value_is_an_error() {
        let err = encode(&[json!({"Name": "Acme", "Tags": ["a", "b"]})]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Encoding(_)));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let entries = vec![
            json!({"B": "2", "A": "1"}),
            json!({"A": "3", "C": "4"}),
        ];
        assert_eq!(encode(&entries).unwrap(), encode(&entries).unwrap());
        assert_eq!(encode(&entries).unwrap(), "B,A,C\n2,1,\n3,,4\n");
    }
}
