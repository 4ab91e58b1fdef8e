//! Flatten worksheet rows into column-keyed records
//!
//! Values are escaped so the records can be dropped straight into a JSON
//! literal inside an HTML `<script>` block: besides the usual JSON escapes,
//! `<`, `>` and `&` become `\u003c`, `\u003e` and `\u0026`.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::SheetSummary;

/// One row keyed by resolved column name; keys and values are escaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRecord {
    entries: Vec<(String, String)>,
}

impl SerializedRecord {
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Escaped value for a column, looked up by its unescaped name
    pub fn get(&self, column: &str) -> Option<&str> {
        let key = escape_value(column);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `{"column":"value",...}` text
    pub fn to_json(&self) -> String {
        let mut out = String::from("{");
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("\"{}\":\"{}\"", key, value));
        }
        out.push('}');
        out
    }
}

/// Build one record per row for the given resolved columns
///
/// Columns are located through the header list; a column that is not a
/// header, or a row too short to reach it, yields an empty value. With
/// duplicate headers the last position wins.
pub fn serialize_rows<H: AsRef<str>>(
    columns: &[String],
    headers: &[H],
    rows: &[Vec<String>],
) -> Vec<SerializedRecord> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(headers.len());
    for (pos, header) in headers.iter().enumerate() {
        index.insert(header.as_ref(), pos);
    }

    let keys: Vec<String> = columns.iter().map(|c| escape_value(c)).collect();

    rows.iter()
        .map(|row| {
            let entries = columns
                .iter()
                .zip(&keys)
                .map(|(column, key)| {
                    let value = index
                        .get(column.as_str())
                        .and_then(|pos| row.get(*pos))
                        .map(|v| escape_value(v))
                        .unwrap_or_default();
                    (key.clone(), value)
                })
                .collect();
            SerializedRecord { entries }
        })
        .collect()
}

/// Records for a worksheet; an absent worksheet has none
pub fn serialize_sheet(columns: &[String], sheet: Option<&SheetSummary>) -> Vec<SerializedRecord> {
    match sheet {
        Some(sheet) => serialize_rows(columns, sheet.column_headers(), sheet.rows()),
        None => Vec::new(),
    }
}

/// `[{...},{...}]` text for a list of records
pub fn records_json(records: &[SerializedRecord]) -> String {
    let mut out = String::from("[");
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&record.to_json());
    }
    out.push(']');
    out
}

/// `["a","b"]` text for a list of names
pub fn string_array_json<S: AsRef<str>>(values: &[S]) -> String {
    let mut out = String::from("[");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(&escape_value(value.as_ref()));
        out.push('"');
    }
    out.push(']');
    out
}

/// Escape a value for embedding inside a double-quoted JSON string in markup
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    #[error("dangling backslash at end of input")]
    Dangling,
    #[error("unknown escape '\\{0}'")]
    UnknownEscape(char),
    #[error("invalid unicode escape '\\u{0}'")]
    InvalidUnicode(String),
}

/// Inverse of [`escape_value`]
///
/// Also accepts the other short JSON escapes (`\/`, `\b`, `\f`) and
/// surrogate pairs, so any JSON string body decodes.
pub fn unescape_value(escaped: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next().ok_or(UnescapeError::Dangling)? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '/' => out.push('/'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'u' => {
                let high = read_hex4(&mut chars)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => {}
                        _ => return Err(UnescapeError::InvalidUnicode(format!("{:04x}", high))),
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(UnescapeError::InvalidUnicode(format!("{:04x}", low)));
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                let decoded = char::from_u32(code)
                    .ok_or_else(|| UnescapeError::InvalidUnicode(format!("{:04x}", code)))?;
                out.push(decoded);
            }
            other => return Err(UnescapeError::UnknownEscape(other)),
        }
    }

    Ok(out)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, UnescapeError> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(UnescapeError::InvalidUnicode(digits));
    }
    u32::from_str_radix(&digits, 16).map_err(|_| UnescapeError::InvalidUnicode(digits))
}
