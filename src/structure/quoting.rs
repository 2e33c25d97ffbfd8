//! String literal quoting for regenerated source.

/// Delimiter used for a regenerated string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    Single,
}

impl QuoteStyle {
    pub fn delimiter(&self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

/// Single quotes only when the value has double quotes and no single quotes
pub fn choose_quote(value: &str) -> QuoteStyle {
    if value.contains('"') && !value.contains('\'') {
        QuoteStyle::Single
    } else {
        QuoteStyle::Double
    }
}

/// Render `value` as a source string literal
///
/// The delimiter, backslashes and line terminators are always escaped, so the
/// literal stays valid whichever quotes the value contains.
pub fn quote_literal(value: &str) -> String {
    let style = choose_quote(value);
    let delimiter = style.delimiter();
    let mut literal = String::with_capacity(value.len() + 2);

    literal.push(delimiter);
    for ch in value.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\u{2028}' => literal.push_str("\\u2028"),
            '\u{2029}' => literal.push_str("\\u2029"),
            c if c == delimiter => {
                literal.push('\\');
                literal.push(c);
            }
            c => literal.push(c),
        }
    }
    literal.push(delimiter);

    literal
}

/// Decode the raw text of a string literal (delimiters included) into its value
pub fn decode_literal(raw: &str) -> String {
    let mut chars = raw.chars();
    let first = chars.next();
    let inner = match first {
        Some('"') | Some('\'') => {
            let body = chars.as_str();
            body.strip_suffix(first.unwrap_or('"')).unwrap_or(body)
        }
        _ => raw,
    };

    unescape(inner)
}

fn unescape(inner: &str) -> String {
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }

        let Some(escaped) = chars.next() else {
            value.push('\\');
            break;
        };

        match escaped {
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => value.push('\0'),
            // Line continuation
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut value, u32::from_str_radix(&hex, 16).ok());
            }
            'u' => {
                let code = read_unicode_escape(&mut chars);
                // Surrogate pair written as two escapes
                if let Some(high @ 0xD800..=0xDBFF) = code {
                    let mut lookahead = chars.clone();
                    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                        if let Some(low @ 0xDC00..=0xDFFF) = read_unicode_escape(&mut lookahead) {
                            chars = lookahead;
                            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                            push_code_point(&mut value, Some(combined));
                            continue;
                        }
                    }
                }
                push_code_point(&mut value, code);
            }
            other => value.push(other),
        }
    }

    value
}

fn read_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    if chars.peek() == Some(&'{') {
        chars.next();
        let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
        u32::from_str_radix(&hex, 16).ok()
    } else {
        let hex: String = chars.by_ref().take(4).collect();
        u32::from_str_radix(&hex, 16).ok()
    }
}

fn push_code_point(value: &mut String, code: Option<u32>) {
    value.push(code.and_then(char::from_u32).unwrap_or('\u{FFFD}'));
}
