//! Articles as served to downstream readers

use serde::{Deserialize, Serialize};

/// Ordered, multi-valued article header block
///
/// Field names keep the case they were stored with; lookups are
/// case-insensitive. A name may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header block
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping any existing values for the same name
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`, in order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse header lines (`Name: value`), unfolding continuation lines
    ///
    /// Lines without a colon that are not continuations are ignored.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut headers = Headers::new();
        for line in lines {
            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = headers.fields.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push(name.trim(), value.trim());
            }
        }
        headers
    }
}

/// An article that may appear in one or more groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub headers: Headers,
    /// Body with `CRLF` line endings, not dot-stuffed
    pub body: Vec<u8>,
    /// Body size in bytes
    pub bytes: usize,
    /// Body size in lines
    pub lines: usize,
}

impl Article {
    /// Build an article, deriving byte and line counts from the body
    pub fn new(headers: Headers, body: Vec<u8>) -> Self {
        let bytes = body.len();
        let lines = count_lines(&body);
        Self {
            headers,
            body,
            bytes,
            lines,
        }
    }

    /// Split raw article text at the first blank line into headers and body
    pub fn parse(data: &[u8]) -> Self {
        let (head, body) = match find_blank_line(data) {
            Some((head_end, body_start)) => (&data[..head_end], data[body_start..].to_vec()),
            None => (data, Vec::new()),
        };
        let head = String::from_utf8_lossy(head);
        let headers = Headers::parse(head.lines());
        Self::new(headers, body)
    }

    /// The article's Message-ID, taken from its `Message-Id` header
    pub fn message_id(&self) -> Option<&str> {
        self.headers.get("Message-Id")
    }
}

/// An article with its group-relative sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedArticle {
    pub number: i64,
    pub article: Article,
}

fn count_lines(body: &[u8]) -> usize {
    if body.is_empty() {
        return 0;
    }
    let newlines = body.iter().filter(|&&b| b == b'\n').count();
    if body.ends_with(b"\n") {
        newlines
    } else {
        newlines + 1
    }
}

/// Returns (end of header block, start of body)
fn find_blank_line(data: &[u8]) -> Option<(usize, usize)> {
    if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some((pos, pos + 4));
    }
    data.windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| (pos, pos + 2))
}
