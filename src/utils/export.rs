use crate::domain::model::Record;
use crate::utils::error::{FlowError, Result};

/// Canonical display order for business row tables.
pub const ROW_COLUMNS: [&str; 10] = [
    "name",
    "type",
    "location",
    "phone",
    "emails",
    "website",
    "rating",
    "s_no",
    "timestamp",
    "id",
];

/// Canonical display order for email tables.
pub const EMAIL_COLUMNS: [&str; 4] = ["email_id", "recipient_email", "subject", "body"];

/// Exports the table as a UTF-8 indented JSON array of records.
pub fn to_json_pretty(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Exports the table as CSV: header row, no index column. Columns follow
/// `preferred_columns` (skipping ones no record carries); fields outside
/// the preferred set are appended alphabetically. Absent and null values
/// serialize as empty cells.
pub fn to_csv(records: &[Record], preferred_columns: &[&str]) -> Result<String> {
    let columns = column_order(records, preferred_columns);
    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for record in records {
        let row: Vec<String> = columns.iter().map(|c| cell_text(record, c)).collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FlowError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn column_order(records: &[Record], preferred_columns: &[&str]) -> Vec<String> {
    let mut columns: Vec<String> = preferred_columns
        .iter()
        .filter(|c| records.iter().any(|r| r.data.contains_key(**c)))
        .map(|c| c.to_string())
        .collect();

    let mut extras: Vec<String> = records
        .iter()
        .flat_map(|r| r.data.keys())
        .filter(|k| !preferred_columns.contains(&k.as_str()))
        .cloned()
        .collect();
    extras.sort();
    extras.dedup();

    columns.extend(extras);
    columns
}

fn cell_text(record: &Record, column: &str) -> String {
    match record.get(column) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::records_from_json;

    #[test]
    fn test_csv_uses_canonical_column_order() {
        let records = records_from_json(
            r#"[
                {"id": "a1", "name": "Acme", "rating": 4.5, "s_no": 1, "emails": "a@b.com"},
                {"id": "b2", "name": "Beta", "rating": 3.0, "s_no": 2, "emails": ""}
            ]"#,
        )
        .unwrap();

        let csv = to_csv(&records, &ROW_COLUMNS).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "name,emails,rating,s_no,id");
        assert_eq!(lines.next().unwrap(), "Acme,a@b.com,4.5,1,a1");
        assert_eq!(lines.next().unwrap(), "Beta,,3.0,2,b2");
    }

    #[test]
    fn test_csv_appends_extra_columns_alphabetically() {
        let records = records_from_json(
            r#"[{"name": "Acme", "zeta": 1, "alpha": 2}]"#,
        )
        .unwrap();

        let csv = to_csv(&records, &ROW_COLUMNS).unwrap();
        assert_eq!(csv.lines().next().unwrap(), "name,alpha,zeta");
    }

    #[test]
    fn test_csv_blank_cell_for_missing_and_null_fields() {
        let records = records_from_json(
            r#"[
                {"name": "Acme", "phone": "123"},
                {"name": "Beta", "phone": null}
            ]"#,
        )
        .unwrap();

        let csv = to_csv(&records, &ROW_COLUMNS).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,phone");
        assert_eq!(lines[1], "Acme,123");
        assert_eq!(lines[2], "Beta,");
    }

    #[test]
    fn test_email_table_columns() {
        let records = records_from_json(
            r#"[{"email_id": 1, "recipient_email": "a@b.com", "subject": "Hi", "body": "Hello"}]"#,
        )
        .unwrap();

        let csv = to_csv(&records, &EMAIL_COLUMNS).unwrap();
        assert_eq!(
            csv.lines().next().unwrap(),
            "email_id,recipient_email,subject,body"
        );
    }

    #[test]
    fn test_json_export_is_indented_array() {
        let records = records_from_json(r#"[{"name": "Acme"}]"#).unwrap();
        let json = to_json_pretty(&records).unwrap();
        assert!(json.starts_with("[\n"));
        assert!(json.contains("\"name\": \"Acme\""));
    }

    #[test]
    fn test_json_round_trip_through_loader() {
        let records = records_from_json(
            r#"[{"name": "Acme", "rating": 4.5, "timestamp": "2025-10-24T10:39:23.146Z"}]"#,
        )
        .unwrap();

        let exported = to_json_pretty(&records).unwrap();
        let reloaded = records_from_json(&exported).unwrap();
        assert_eq!(records, reloaded);
    }
}
