//! Coded replies a handler can fail with
//!
//! Returning one of these from a handler (converted into
//! [`NntpError::Protocol`]) makes the session write `"<code> <message>"` to
//! the peer and carry on with the next command.

use crate::error::NntpError;
use crate::response::codes;

/// A coded NNTP status with its default message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub message: &'static str,
}

impl Status {
    const fn new(code: u16, message: &'static str) -> Self {
        Self { code, message }
    }

    /// The reply line, without `CRLF`
    pub fn line(&self) -> String {
        format!("{} {}", self.code, self.message)
    }
}

impl From<Status> for NntpError {
    fn from(status: Status) -> Self {
        NntpError::Protocol {
            code: status.code,
            message: status.message.to_string(),
        }
    }
}

pub const NO_SUCH_GROUP: Status = Status::new(codes::NO_SUCH_GROUP, "No such newsgroup");
pub const NO_GROUP_SELECTED: Status =
    Status::new(codes::NO_GROUP_SELECTED, "No newsgroup selected");
pub const NO_CURRENT_ARTICLE: Status =
    Status::new(codes::NO_CURRENT_ARTICLE, "Current article number is invalid");
pub const INVALID_ARTICLE_NUMBER: Status =
    Status::new(codes::NO_SUCH_ARTICLE_NUMBER, "No article with that number");
pub const INVALID_MESSAGE_ID: Status =
    Status::new(codes::NO_SUCH_ARTICLE_ID, "No article with that message-id");
pub const NOT_WANTED: Status = Status::new(codes::ARTICLE_NOT_WANTED, "Article not wanted");
pub const POSTING_NOT_PERMITTED: Status =
    Status::new(codes::POSTING_NOT_PERMITTED, "Posting not permitted");
pub const POSTING_FAILED: Status = Status::new(codes::POSTING_FAILED, "posting failed");
pub const AUTH_REQUIRED: Status =
    Status::new(codes::AUTHORIZATION_REQUIRED, "authorization required");
pub const AUTH_REJECTED: Status =
    Status::new(codes::AUTHORIZATION_REJECTED, "authorization rejected");
pub const NOT_AUTHENTICATED: Status = Status::new(codes::AUTH_REQUIRED, "authentication required");
pub const UNKNOWN_COMMAND: Status = Status::new(codes::COMMAND_NOT_RECOGNIZED, "Unknown command");
pub const SYNTAX: Status =
    Status::new(codes::COMMAND_SYNTAX_ERROR, "not supported, or syntax error");
