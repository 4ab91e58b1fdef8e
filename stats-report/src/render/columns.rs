//! Column order for a report section

use crate::model::SheetSummary;

/// Merge a section's preferred columns with the headers a worksheet actually has
///
/// Preferred names that exist among the headers come first, in preferred
/// order. Remaining headers follow in sheet order. Preferred names the sheet
/// lacks are dropped, and no name appears twice. Without a sheet there is
/// nothing to merge with and the preferred list is returned as given.
pub fn resolve_columns<S: AsRef<str>>(
    sheet: Option<&SheetSummary>,
    preferred: &[S],
) -> Vec<String> {
    match sheet {
        Some(sheet) => merge_columns(sheet.column_headers(), preferred),
        None => preferred.iter().map(|c| c.as_ref().to_string()).collect(),
    }
}

/// Same as [`resolve_columns`] for a bare header list
pub fn merge_columns<H: AsRef<str>, S: AsRef<str>>(headers: &[H], preferred: &[S]) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::with_capacity(headers.len().max(preferred.len()));

    for column in preferred.iter().map(AsRef::as_ref) {
        let in_sheet = headers.iter().any(|h| h.as_ref() == column);
        if in_sheet && !resolved.iter().any(|r| r == column) {
            resolved.push(column.to_string());
        }
    }

    for header in headers.iter().map(AsRef::as_ref) {
        if !resolved.iter().any(|r| r == header) {
            resolved.push(header.to_string());
        }
    }

    resolved
}
