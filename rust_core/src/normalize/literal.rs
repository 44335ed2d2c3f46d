//! Parsing and rendering of serialized sequence literals.
//!
//! Providers and older output tables store string lists as list/tuple
//! literals (`['fastbreak', '2ndchance']`, `('A', 'B')`). Parsing never
//! panics: malformed input yields `None`.

/// Parse a `[...]` or `(...)` literal whose items are quoted strings.
///
/// Accepts single or double quotes, backslash escapes and a trailing comma.
pub fn parse_sequence_literal(input: &str) -> Option<Vec<String>> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .or_else(|| trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return None,
        };

        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => item.push(chars.next()?),
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if !closed {
            return None;
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }
    Some(items)
}

/// Quote one item, preferring single quotes.
pub fn quote_item(item: &str) -> String {
    if item.contains('\'') && !item.contains('"') {
        format!("\"{}\"", item.replace('\\', "\\\\"))
    } else {
        format!(
            "'{}'",
            item.replace('\\', "\\\\").replace('\'', "\\'")
        )
    }
}

/// Render items as a tuple literal, `('A', 'B')`.
pub fn render_tuple_literal<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote_item(s.as_ref())).collect();
    if quoted.len() == 1 {
        format!("({},)", quoted[0])
    } else {
        format!("({})", quoted.join(", "))
    }
}
