use std::mem::take;

/// CSV/TSV parser tolerant of quotes, embedded newlines and CRLF.
/// Blank lines are skipped.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a final newline, even if a quote was left open
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append one row, quoting fields where needed, terminated by `\n`
pub fn write_row(out: &mut String, row: &[String], sep: char) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        if needs_quotes(cell, sep) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_parse_quoted_fields() {
        let text = "url,Transcript\r\nhttps://a,\"said \"\"hi\"\", then\nleft\"\n\nhttps://b,\n";
        let rows = parse_rows(text, ',');

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], row(&["https://a", "said \"hi\", then\nleft"]));
        assert_eq!(rows[2], row(&["https://b", ""]));
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        assert_eq!(parse_rows("a\tb", '\t'), vec![row(&["a", "b"])]);
    }

    #[test]
    fn test_write_quotes_only_when_needed() {
        let mut out = String::new();
        write_row(&mut out, &row(&["plain", "a,b", "q\"uote", "multi\nline"]), ',');
        assert_eq!(out, "plain,\"a,b\",\"q\"\"uote\",\"multi\nline\"\n");
    }

    #[test]
    fn test_written_rows_parse_back() {
        let original = vec![
            row(&["YouTube URL", "Transcript"]),
            row(&["https://x/watch?v=1", "Error: Transcript button not found"]),
            row(&["https://x/watch?v=2", "hello, \"world\"\nagain"]),
        ];
        let mut out = String::new();
        for r in &original {
            write_row(&mut out, r, ',');
        }
        assert_eq!(parse_rows(&out, ','), original);
    }
}
