//! OVER/XOVER commands and overview lines

use crate::article::NumberedArticle;

/// Build OVER command (RFC 3977 §8.3)
pub fn over(range: &str) -> String {
    if range.is_empty() {
        "OVER".to_string()
    } else {
        format!("OVER {}", range)
    }
}

/// Build LIST OVERVIEW.FMT command (RFC 3977 §8.4)
pub fn list_overview_fmt() -> &'static str {
    "LIST OVERVIEW.FMT"
}

/// Field order of the overview lines this relay produces
pub const OVERVIEW_FMT: [&str; 7] = [
    "Subject:",
    "From:",
    "Date:",
    "Message-ID:",
    "References:",
    ":bytes",
    ":lines",
];

/// Header value made safe for an overview field: TAB, CR and LF become spaces
fn overview_field(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

/// Render one overview line:
/// `num, Subject, From, Date, Message-Id, References, bytes, lines`, tab separated
pub fn format_overview_line(entry: &NumberedArticle) -> String {
    let headers = &entry.article.headers;
    let field = |name: &str| overview_field(headers.get(name).unwrap_or_default());
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        entry.number,
        field("Subject"),
        field("From"),
        field("Date"),
        field("Message-Id"),
        field("References"),
        entry.article.bytes,
        entry.article.lines,
    )
}
