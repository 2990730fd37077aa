//! Slack mrkdwn → standard markdown.
//!
//! Fetched history arrives in Slack's own formatting (`*bold*`,
//! `_italic_`, `~strike~`, `<url|label>`); the model is prompted with
//! standard markdown, so turns are normalized before assembly.

enum Token {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Strike(String),
    Link { label: String, url: String },
}

const SPECIALS: &[char] = &['*', '_', '`', '~', '<'];

/// Find a `{delim}content{delim}` span at the start of `rest`.
/// Content must be non-empty and free of the delimiter.
fn find_span(rest: &str, delim: char) -> Option<(usize, &str)> {
    let inner = &rest[delim.len_utf8()..];
    let end = inner.find(delim)?;
    if end == 0 {
        return None;
    }
    Some((delim.len_utf8() * 2 + end, &inner[..end]))
}

/// Parse a `<url>` or `<url|label>` link at the start of `rest`.
fn parse_link(rest: &str) -> Option<(usize, String, String)> {
    let inner_end = rest.find('>')?;
    let inner = &rest[1..inner_end];
    if inner.is_empty() {
        return None;
    }
    let (url, label) = match inner.split_once('|') {
        Some((url, label)) if !url.is_empty() && !label.is_empty() => (url, label),
        Some(_) => return None,
        None => (inner, inner),
    };
    Some((inner_end + 1, url.to_string(), label.to_string()))
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let current = rest.chars().next().unwrap();

        let parsed = match current {
            '*' => find_span(rest, '*').map(|(len, c)| (len, Token::Bold(c.to_string()))),
            '_' => find_span(rest, '_').map(|(len, c)| (len, Token::Italic(c.to_string()))),
            '`' => find_span(rest, '`').map(|(len, c)| (len, Token::Code(c.to_string()))),
            '~' => find_span(rest, '~').map(|(len, c)| (len, Token::Strike(c.to_string()))),
            '<' => parse_link(rest).map(|(len, url, label)| (len, Token::Link { label, url })),
            _ => None,
        };

        if let Some((len, token)) = parsed {
            tokens.push(token);
            pos += len;
            continue;
        }

        // Plain text up to the next special character; a special that
        // failed to parse is consumed as a single literal character.
        let skip = current.len_utf8();
        let chunk_end = match rest[skip..].find(SPECIALS) {
            Some(idx) => skip + idx,
            None => rest.len(),
        };
        let chunk_end = if SPECIALS.contains(&current) { skip } else { chunk_end };
        tokens.push(Token::Text(rest[..chunk_end].to_string()));
        pos += chunk_end;
    }

    tokens
}

/// Convert Slack mrkdwn formatting to standard markdown.
pub fn interpret_mrkdwn(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .map(|token| match token {
            Token::Bold(c) => format!("**{c}**"),
            Token::Italic(c) => format!("*{c}*"),
            Token::Code(c) => format!("`{c}`"),
            Token::Strike(c) => format!("~~{c}~~"),
            Token::Link { label, url } => format!("[{label}]({url})"),
            Token::Text(c) => c,
        })
        .collect()
}
