//! NNTP command builders and response parsers
//!
//! Builders return the command line without its `CRLF` terminator; the
//! [`Codec`](crate::codec::Codec) appends it when the line is written.

pub mod article;
pub mod group;
pub mod list;
pub mod over;

pub use article::*;
pub use group::*;
pub use list::*;
pub use over::*;

/// Build AUTHINFO USER command
pub fn authinfo_user(username: &str) -> String {
    format!("AUTHINFO USER {}", username)
}

/// Build AUTHINFO PASS command
pub fn authinfo_pass(password: &str) -> String {
    format!("AUTHINFO PASS {}", password)
}

/// Build QUIT command
pub fn quit() -> &'static str {
    "QUIT"
}

/// Build CAPABILITIES command (RFC 3977 §5.2)
///
/// Response is multi-line, starting with 101.
pub fn capabilities() -> &'static str {
    "CAPABILITIES"
}

/// Split a command line into its verb and whitespace-separated arguments
///
/// Returns `None` for a blank line.
pub fn split_command(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    Some((verb, parts.collect()))
}
