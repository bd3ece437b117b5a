//! Group selection commands and reply parsing

use crate::error::{NntpError, Result};

/// Build GROUP command
pub fn group(newsgroup: &str) -> String {
    format!("GROUP {}", newsgroup)
}

/// Group information returned by the GROUP command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Estimated number of articles in the group
    pub count: i64,
    /// Number of the first article
    pub low: i64,
    /// Number of the last article
    pub high: i64,
    /// Group name as echoed by the server
    pub name: String,
}

/// Parse the message part of a 211 reply: `count low high name`
pub fn parse_group_response(message: &str) -> Result<GroupInfo> {
    let parts: Vec<&str> = message.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(NntpError::InvalidResponse(format!(
            "Don't know how to parse result: {}",
            message
        )));
    }

    let number = |s: &str| {
        s.parse::<i64>()
            .map_err(|_| NntpError::InvalidResponse(message.to_string()))
    };

    Ok(GroupInfo {
        count: number(parts[0])?,
        low: number(parts[1])?,
        high: number(parts[2])?,
        name: parts[3].to_string(),
    })
}
