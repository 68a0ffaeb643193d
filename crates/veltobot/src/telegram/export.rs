//! CSV rendering of stored user records

use veltocore::storage::UserRecord;

pub const EXPORT_FILE_NAME: &str = "velto_users.csv";
const HEADER: [&str; 5] = ["user_id", "username", "answers", "joined", "created_at"];

/// Quotes a field when it holds a delimiter, quote or line break (RFC 4180).
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let row: Vec<String> = fields.into_iter().map(|f| escape_field(f.as_ref())).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Renders records as CSV with a header row. Answers are written as their
/// stored JSON text, `joined` as 0/1.
pub fn render_csv(records: &[UserRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER);

    for record in records {
        let answers = match &record.answers {
            Some(answers) => answers.to_json().unwrap_or_else(|e| {
                log::warn!("Failed to serialize answers for user {}: {}", record.user_id, e);
                String::new()
            }),
            None => String::new(),
        };
        push_row(
            &mut out,
            [
                record.user_id.to_string(),
                record.username.clone().unwrap_or_default(),
                answers,
                u8::from(record.joined).to_string(),
                record.created_at.to_string(),
            ],
        );
    }

    out
}
