//! A1 notation helpers.

/// Quote a sheet title for use in a range. Embedded quotes are doubled.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// `'<title>'!<cells>`
pub fn range(title: &str, cells: &str) -> String {
    format!("{}!{}", quote_title(title), cells)
}

/// Single cell, e.g. `'Kobo'!B7`.
pub fn cell(title: &str, column: char, row: u32) -> String {
    range(title, &format!("{}{}", column, row))
}
