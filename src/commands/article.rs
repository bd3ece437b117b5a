//! ARTICLE/HEAD/BODY commands and reply parsing

use crate::error::{NntpError, Result};

/// Build ARTICLE command
pub fn article(specifier: &str) -> String {
    format!("ARTICLE {}", specifier)
}

/// Build HEAD command
pub fn head(specifier: &str) -> String {
    format!("HEAD {}", specifier)
}

/// Build BODY command
pub fn body(specifier: &str) -> String {
    format!("BODY {}", specifier)
}

/// Parse the message part of a 220/221/222 reply: `number message-id`
pub fn parse_article_response(message: &str) -> Result<(i64, String)> {
    let mut parts = message.splitn(2, ' ');
    let number = parts
        .next()
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or_else(|| NntpError::InvalidResponse(message.to_string()))?;
    let message_id = parts
        .next()
        .map(|id| id.split_whitespace().next().unwrap_or_default().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| NntpError::InvalidResponse(message.to_string()))?;
    Ok((number, message_id))
}

/// Whether an article specifier is a bracketed message-id rather than a number
pub fn is_message_id(specifier: &str) -> bool {
    specifier.starts_with('<') && specifier.ends_with('>')
}
