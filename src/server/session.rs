//! Per-connection session state and the dispatch loop

use super::{Conn, HandlerTable, Step, status};
use crate::commands::split_command;
use crate::error::Result;
use crate::operator::Operator;
use crate::types::Group;
use std::sync::Arc;
use tracing::debug;

/// Greeting sent on accept
const GREETING: &str = "200 Hello!";

/// Where a session is in its lifecycle
///
/// `GroupSelected` may be re-entered by selecting another group but never
/// goes back to `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    GroupSelected,
    Closed,
}

/// State of one downstream connection
pub struct Session {
    state: SessionState,
    group: Option<Group>,
    operator: Arc<dyn Operator>,
}

impl Session {
    pub fn new(operator: Arc<dyn Operator>) -> Self {
        Self {
            state: SessionState::Connected,
            group: None,
            operator,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The operator currently in effect
    pub fn operator(&self) -> &Arc<dyn Operator> {
        &self.operator
    }

    /// Replace the operator, e.g. after successful authentication
    pub fn set_operator(&mut self, operator: Arc<dyn Operator>) {
        self.operator = operator;
    }

    /// The selected group, or 412 when none was selected yet
    pub fn current_group(&self) -> Result<&Group> {
        self.group
            .as_ref()
            .ok_or_else(|| status::NO_GROUP_SELECTED.into())
    }

    pub fn select_group(&mut self, group: Group) {
        self.group = Some(group);
        self.state = SessionState::GroupSelected;
    }

    /// Greet the peer and serve commands until the session ends
    ///
    /// Returns the final state; an `Err` means the connection must be
    /// dropped without a further reply.
    pub async fn run(mut self, conn: &mut Conn, handlers: &HandlerTable) -> Result<SessionState> {
        conn.print_line(GREETING).await?;

        loop {
            let Some(line) = conn.read_line().await? else {
                debug!("Peer hung up");
                self.state = SessionState::Closed;
                return Ok(self.state);
            };
            let (verb, args) = split_command(&line).unwrap_or(("", Vec::new()));
            debug!("Got cmd: {} {:?}", verb, args);

            let args: Vec<String> = args.into_iter().map(str::to_string).collect();
            let handler = handlers
                .get(verb.to_lowercase().as_str())
                .or_else(|| handlers.get(""))
                .copied();
            let result = match handler {
                Some(handler) => handler(args, &mut self, conn).await,
                None => Err(status::UNKNOWN_COMMAND.into()),
            };

            match result {
                Ok(Step::Continue) => {}
                Ok(Step::Close) => {
                    self.state = SessionState::Closed;
                    return Ok(self.state);
                }
                Err(e) => match e.status_line() {
                    Some(reply) => conn.print_line(&reply).await?,
                    None => return Err(e),
                },
            }
        }
    }
}
