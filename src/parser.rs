use std::io::BufRead;

use unicode_general_category::{GeneralCategory, get_general_category};

use crate::error::{Error, ParseError};
use crate::model::Entry;

/// Parse every valid entry from UTF-8 text.
///
/// Blank lines and `#` comments are ignored and malformed lines are skipped,
/// matching what the loader applies.
pub fn parse_str(input: &str) -> Vec<Entry> {
    input
        .lines()
        .zip(1u32..)
        .filter_map(|(line, line_num)| parse_statement(line, line_num))
        .filter_map(Result::ok)
        .collect()
}

/// Parse every valid entry from a buffered reader.
///
/// Fails only if the reader itself fails or yields invalid UTF-8.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<Entry>, Error> {
    let mut entries = Vec::new();
    for (line, line_num) in reader.lines().zip(1u32..) {
        let line = line.map_err(|source| Error::Read { loaded: 0, source })?;
        if let Some(Ok(entry)) = parse_statement(&line, line_num) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Trim a raw line and parse it unless it is blank or a comment.
pub(crate) fn parse_statement(raw: &str, line_num: u32) -> Option<Result<Entry, ParseError>> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    Some(parse_line(line).map(|entry| Entry {
        line: line_num,
        ..entry
    }))
}

/// Parse a single trimmed, non-comment line into an entry.
///
/// A leading `export` is stripped as a plain prefix. The key ends at the first
/// `=` that is not inside a quoted span; everything after it, including further
/// `=` characters, belongs to the value.
pub fn parse_line(line: &str) -> Result<Entry, ParseError> {
    let line = line.strip_prefix("export").unwrap_or(line);

    let eq_idx = find_delimiter(line).ok_or(ParseError::MissingDelimiter)?;

    let key = line[..eq_idx].trim();
    let value = line[eq_idx + 1..].trim();

    if key.is_empty() {
        return Err(ParseError::EmptyKey);
    }
    if !is_valid_key(key) {
        return Err(ParseError::InvalidKey(key.to_owned()));
    }

    Ok(Entry {
        key: key.to_owned(),
        value: unquote(value).to_owned(),
        line: 0,
    })
}

fn find_delimiter(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut active_quote: Option<u8> = None;

    for (idx, &byte) in bytes.iter().enumerate() {
        match active_quote {
            Some(quote) if byte == quote => active_quote = None,
            Some(_) => {}
            None if byte == b'=' => return Some(idx),
            None if (byte == b'"' || byte == b'\'')
                && !is_preceded_by_odd_backslashes(bytes, idx) =>
            {
                active_quote = Some(byte);
            }
            None => {}
        }
    }

    None
}

fn is_preceded_by_odd_backslashes(bytes: &[u8], idx: usize) -> bool {
    let backslash_count = bytes[..idx]
        .iter()
        .rev()
        .take_while(|byte| **byte == b'\\')
        .count();

    backslash_count % 2 == 1
}

/// Whether `key` is a usable variable name: a letter or `_`, followed by
/// letters, decimal digits or `_`. Letters and digits may be any Unicode script.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (is_letter(first) || first == '_')
        && chars.all(|ch| is_letter(ch) || is_decimal_digit(ch) || ch == '_')
}

fn is_letter(ch: char) -> bool {
    matches!(
        get_general_category(ch),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

fn is_decimal_digit(ch: char) -> bool {
    matches!(get_general_category(ch), GeneralCategory::DecimalNumber)
}

/// Strip one layer of matching `"` or `'` quotes. Escapes are left verbatim.
pub fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(line: &str) -> (String, String) {
        let entry = parse_line(line).expect("parse should succeed");
        (entry.key, entry.value)
    }

    #[test]
    fn parses_simple_assignment() {
        assert_eq!(pair("DB_PORT=8080"), ("DB_PORT".into(), "8080".into()));
    }

    #[test]
    fn trims_whitespace_around_key_and_value() {
        assert_eq!(pair(" KEY = value "), ("KEY".into(), "value".into()));
    }

    #[test]
    fn export_prefix_is_stripped() {
        assert_eq!(pair("export API_KEY=abc123"), pair("API_KEY=abc123"));
        assert_eq!(
            pair("export NAME=\"John Doe\""),
            ("NAME".into(), "John Doe".into())
        );
    }

    #[test]
    fn export_prefix_is_stripped_without_following_space() {
        assert_eq!(pair("exportFOO=1"), ("FOO".into(), "1".into()));
    }

    #[test]
    fn strips_matching_quotes() {
        assert_eq!(
            pair("NAME=\"Alex Edwards\""),
            ("NAME".into(), "Alex Edwards".into())
        );
        assert_eq!(pair("CITY='New York'"), ("CITY".into(), "New York".into()));
        assert_eq!(
            pair("MESSAGE=\" hello world \""),
            ("MESSAGE".into(), " hello world ".into())
        );
        assert_eq!(pair("EMPTY=\"\""), ("EMPTY".into(), "".into()));
    }

    #[test]
    fn empty_value_is_allowed() {
        assert_eq!(pair("DB_PORT="), ("DB_PORT".into(), "".into()));
    }

    #[test]
    fn equals_inside_quoted_value_is_kept() {
        assert_eq!(
            pair("CONN_STR=\"user=pass@host:5432\""),
            ("CONN_STR".into(), "user=pass@host:5432".into())
        );
    }

    #[test]
    fn first_unquoted_equals_splits() {
        assert_eq!(pair("NAME==John=Doe"), ("NAME".into(), "=John=Doe".into()));
    }

    #[test]
    fn unicode_values_are_preserved() {
        assert_eq!(
            pair("GREETING=こんにちは"),
            ("GREETING".into(), "こんにちは".into())
        );
    }

    #[test]
    fn missing_delimiter_is_rejected() {
        assert_eq!(parse_line("justvalue"), Err(ParseError::MissingDelimiter));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert_eq!(parse_line("=value"), Err(ParseError::EmptyKey));
        assert_eq!(parse_line("export =value"), Err(ParseError::EmptyKey));
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert_eq!(
            parse_line("BAD KEY=value"),
            Err(ParseError::InvalidKey("BAD KEY".into()))
        );
        assert_eq!(
            parse_line("my-var=1"),
            Err(ParseError::InvalidKey("my-var".into()))
        );
    }

    #[test]
    fn quoted_key_is_rejected() {
        assert_eq!(
            parse_line("'NAME='=John=Doe"),
            Err(ParseError::InvalidKey("'NAME='".into()))
        );
    }

    #[test]
    fn unterminated_quote_in_key_hides_delimiter() {
        assert_eq!(parse_line("A\"B=1"), Err(ParseError::MissingDelimiter));
    }

    #[test]
    fn escaped_quote_in_key_does_not_open_quote() {
        assert_eq!(
            parse_line("A\\\"B=1"),
            Err(ParseError::InvalidKey("A\\\"B".into()))
        );
    }

    #[test]
    fn unquote_handles_edge_cases() {
        let cases = [
            ("\"hello\"", "hello"),
            ("'world'", "world"),
            ("\" hello \"", " hello "),
            ("\"\"", ""),
            ("''", ""),
            ("\"mixed'", "\"mixed'"),
            ("noquotes", "noquotes"),
            ("\"with \\\" escaped\"", "with \\\" escaped"),
            ("", ""),
            ("\"", "\""),
            ("\"a\"", "a"),
            ("'\"nested\"'", "\"nested\""),
        ];

        for (input, expected) in cases {
            assert_eq!(unquote(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn key_validation() {
        for key in [
            "PORT", "API_KEY", "DEBUG", "A", "_X", "_INTERNAL", "Var1", "кошка", "ʰX", "X١٢",
        ] {
            assert!(is_valid_key(key), "expected valid: {key:?}");
        }
        for key in [
            "", "123", "-", "my-var", " ", "a b", ".hidden", "A.B", "A½", "X²", "Ⅷ", "A\u{301}",
        ] {
            assert!(!is_valid_key(key), "expected invalid: {key:?}");
        }
    }

    #[test]
    fn parse_str_skips_comments_blanks_and_invalid_lines() {
        let input = "A=1\n\n# comment\n   # indented comment\nBAD LINE\nexport B='two'\n";
        let parsed = parse_str(input);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].key, "A");
        assert_eq!(parsed[0].value, "1");
        assert_eq!(parsed[0].line, 1);
        assert_eq!(parsed[1].key, "B");
        assert_eq!(parsed[1].value, "two");
        assert_eq!(parsed[1].line, 6);
    }

    #[test]
    fn parse_str_keeps_duplicates_in_order() {
        let parsed = parse_str("A=1\nA=2\n");

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].value, "1");
        assert_eq!(parsed[1].value, "2");
    }

    #[test]
    fn parse_str_handles_crlf() {
        let parsed = parse_str("A=1\r\nB=2\r\n");

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].value, "1");
        assert_eq!(parsed[1].value, "2");
    }

    #[test]
    fn parse_reader_reports_invalid_utf8() {
        let reader = std::io::Cursor::new(b"A=1\nB=\xff\n".to_vec());
        let err = parse_reader(reader).expect_err("expected read error");
        match err {
            Error::Read { .. } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
