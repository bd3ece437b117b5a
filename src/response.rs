//! Parsed replies and the status codes the relay speaks

/// A complete reply: status line plus the dot-block payload, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NntpResponse {
    pub code: u16,
    /// Text after the code on the status line
    pub message: String,
    /// Unstuffed payload lines; empty for single-line replies
    pub lines: Vec<String>,
}

/// Status codes (RFC 3977, RFC 4643)
pub mod codes {
    pub const CAPABILITY_LIST: u16 = 101;

    pub const READY: u16 = 200;
    pub const CLOSING_CONNECTION: u16 = 205;
    pub const GROUP_SELECTED: u16 = 211;
    /// LIST and LIST OVERVIEW.FMT
    pub const LIST_INFORMATION_FOLLOWS: u16 = 215;
    pub const ARTICLE_FOLLOWS: u16 = 220;
    pub const HEAD_FOLLOWS: u16 = 221;
    pub const BODY_FOLLOWS: u16 = 222;
    pub const OVERVIEW_INFO_FOLLOWS: u16 = 224;
    pub const AUTH_ACCEPTED: u16 = 281;

    /// Upstream wants AUTHINFO PASS
    pub const AUTH_CONTINUE: u16 = 381;

    pub const NO_SUCH_GROUP: u16 = 411;
    pub const NO_GROUP_SELECTED: u16 = 412;
    pub const NO_CURRENT_ARTICLE: u16 = 420;
    pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;
    pub const NO_SUCH_ARTICLE_ID: u16 = 430;
    pub const ARTICLE_NOT_WANTED: u16 = 435;
    pub const POSTING_NOT_PERMITTED: u16 = 440;
    pub const POSTING_FAILED: u16 = 441;
    pub const AUTHORIZATION_REQUIRED: u16 = 450;
    pub const AUTHORIZATION_REJECTED: u16 = 452;
    pub const AUTH_REQUIRED: u16 = 480;

    pub const COMMAND_NOT_RECOGNIZED: u16 = 500;
    pub const COMMAND_SYNTAX_ERROR: u16 = 501;
}
