//! Delimited-text normalization for bank exports.
//!
//! Bank CSV exports come without a schema: delimiter, quoting, and column
//! order all vary per bank. This module turns raw text into headers + rows;
//! header interpretation lives in [`super::mapping`].

/// Rows exposed in the bounded preview.
pub const PREVIEW_ROWS: usize = 12;

/// A parsed delimited file: headers, all data rows, and a bounded preview.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    /// The detected delimiter.
    pub delimiter: char,
    /// Header fields from line 1, as exported.
    pub headers: Vec<String>,
    /// All data rows.
    pub rows: Vec<Vec<String>>,
    /// The first [`PREVIEW_ROWS`] data rows, for display before import.
    pub preview: Vec<Vec<String>>,
    /// Total number of data rows.
    pub total_rows: usize,
}

/// Detect the delimiter by counting candidates in the header line.
///
/// Highest count wins; ties break `;` > `,` > tab, since Swedish exports
/// favour semicolon.
pub fn detect_delimiter(header_line: &str) -> char {
    let mut semicolons = 0usize;
    let mut commas = 0usize;
    let mut tabs = 0usize;
    for c in header_line.chars() {
        match c {
            ';' => semicolons += 1,
            ',' => commas += 1,
            '\t' => tabs += 1,
            _ => {}
        }
    }
    if semicolons >= commas && semicolons >= tabs {
        ';'
    } else if commas >= tabs {
        ','
    } else {
        '\t'
    }
}

/// Split one line into fields, RFC 4180 style.
///
/// Tracks quote state, unescapes `""` to `"`, and splits on the delimiter
/// only outside quotes.
pub fn parse_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}

/// Parse raw export text into headers + rows.
///
/// Strips a UTF-8 BOM, drops blank lines, and treats the first non-blank
/// line as headers. Returns `None` for empty input — a malformed export is
/// a recoverable condition, not a panic.
pub fn parse_csv(input: &str) -> Option<ParsedCsv> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut lines = input
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty());

    let header_line = lines.next()?;
    let delimiter = detect_delimiter(header_line);
    let headers: Vec<String> = parse_line(header_line, delimiter)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows: Vec<Vec<String>> = lines.map(|l| parse_line(l, delimiter)).collect();
    let preview: Vec<Vec<String>> = rows.iter().take(PREVIEW_ROWS).cloned().collect();
    let total_rows = rows.len();

    Some(ParsedCsv {
        delimiter,
        headers,
        rows,
        preview,
        total_rows,
    })
}
