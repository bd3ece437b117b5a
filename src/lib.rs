#![doc = include_str!("../README.md")]

/// Article model shared by the client, storage and server
pub mod article;
/// Upstream backends syncing groups into storage
pub mod backend;
mod capabilities;
mod client;
/// Line and dot-block framing
pub mod codec;
/// NNTP command builders and response parsers
pub mod commands;
mod config;
/// Backend and service lifecycle
pub mod engine;
mod error;
pub mod logging;
mod operator;
mod response;
/// Downstream NNTP server and session state machine
pub mod server;
/// Downstream listeners
pub mod service;
mod storage;
mod types;

pub use article::{Article, Headers, NumberedArticle};
pub use backend::NntpBackend;
pub use capabilities::Capabilities;
pub use client::{ArticleResponse, NntpClient, NntpStream};
pub use config::{
    BackendConfig, Config, DEFAULT_PORT, DEFAULT_SYNC_GROUPS, DEFAULT_TLS_PORT, ServiceConfig,
    UserConfig,
};
pub use engine::{BackendRepository, ComponentStatus, Engine, ServiceDelivery};
pub use error::{NntpError, Result};
pub use operator::{Operator, Scope, StoreOperator};
pub use response::{NntpResponse, codes};
pub use server::{NntpServer, Session, SessionState};
pub use service::NntpService;
pub use storage::Store;
pub use types::{Group, NNTP_TYPE, Subscription};
