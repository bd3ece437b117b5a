//! LIST command and active-listing parsing

use crate::types::Group;

/// Build LIST command with an optional keyword/pattern suffix
pub fn list(pattern: Option<&str>) -> String {
    match pattern {
        Some(p) if !p.trim().is_empty() => format!("LIST {}", p.trim()),
        _ => "LIST".to_string(),
    }
}

/// Parse one line of a LIST ACTIVE reply: `name high low [status]`
///
/// Upstream group lists are not strictly validated: a line whose name is
/// missing or whose high/low fields are not integers yields `None` and is
/// skipped by the caller instead of failing the whole listing.
pub fn parse_active_line(line: &str) -> Option<Group> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    let high = parts.next()?.parse::<i64>().ok()?;
    let low = parts.next()?.parse::<i64>().ok()?;

    Some(Group {
        name: name.to_string(),
        description: String::new(),
        source: String::new(),
        low,
        high,
    })
}

/// Parse every conforming line of a LIST ACTIVE reply, skipping the rest
pub fn parse_active_lines(lines: &[String]) -> Vec<Group> {
    lines.iter().filter_map(|l| parse_active_line(l)).collect()
}
