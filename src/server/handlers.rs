//! Command handlers

use super::{Conn, HandlerFuture, Session, Step, parse_range, status};
use crate::article::Article;
use crate::commands::{OVERVIEW_FMT, format_overview_line, is_message_id};
use crate::error::{NntpError, Result};
use crate::response::codes;

/// Advertised by CAPABILITIES
const CAPABILITIES: [&str; 5] = [
    "VERSION 2",
    "READER",
    "OVER",
    "XOVER",
    "LIST ACTIVE NEWSGROUPS OVERVIEW.FMT",
];

pub(super) fn handle_default<'a>(
    _args: Vec<String>,
    _session: &'a mut Session,
    _conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move { Err(status::UNKNOWN_COMMAND.into()) })
}

pub(super) fn handle_quit<'a>(
    _args: Vec<String>,
    _session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        conn.print_line("205 bye").await?;
        Ok(Step::Close)
    })
}

pub(super) fn handle_group<'a>(
    args: Vec<String>,
    session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let name = args.first().ok_or(status::NO_SUCH_GROUP)?;
        let group = session.operator().get_group(name).await?;
        let reply = format!(
            "211 {} {} {} {}",
            group.count(),
            group.low,
            group.high,
            group.qualified_name()
        );
        session.select_group(group);
        conn.print_line(&reply).await?;
        Ok(Step::Continue)
    })
}

pub(super) fn handle_list<'a>(
    args: Vec<String>,
    session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let keyword = args
            .first()
            .map_or_else(|| "active".to_string(), |k| k.to_lowercase());

        match keyword.as_str() {
            "overview.fmt" => {
                conn.print_line("215 Order of fields in overview database.")
                    .await?;
                conn.write_dot_block(OVERVIEW_FMT).await?;
            }
            "active" => {
                let groups = session.operator().list_groups(None).await?;
                conn.print_line("215 list of newsgroups follows").await?;
                let lines: Vec<String> = groups
                    .iter()
                    .map(|g| format!("{} {} {} {}", g.qualified_name(), g.high, g.low, g.count()))
                    .collect();
                conn.write_dot_block(lines).await?;
            }
            "newsgroups" => {
                let groups = session.operator().list_groups(None).await?;
                conn.print_line("215 list of newsgroups follows").await?;
                let lines: Vec<String> = groups
                    .iter()
                    .map(|g| format!("{} {}", g.qualified_name(), g.description))
                    .collect();
                conn.write_dot_block(lines).await?;
            }
            _ => return Err(status::SYNTAX.into()),
        }
        Ok(Step::Continue)
    })
}

pub(super) fn handle_newgroups<'a>(
    _args: Vec<String>,
    _session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        conn.print_line("231 list of newsgroups follows").await?;
        conn.write_dot_block(std::iter::empty::<&str>()).await?;
        Ok(Step::Continue)
    })
}

pub(super) fn handle_capabilities<'a>(
    _args: Vec<String>,
    _session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        conn.print_line("101 Capability list:").await?;
        conn.write_dot_block(CAPABILITIES).await?;
        Ok(Step::Continue)
    })
}

pub(super) fn handle_mode<'a>(
    _args: Vec<String>,
    _session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        conn.print_line("201 Posting prohibited").await?;
        Ok(Step::Continue)
    })
}

pub(super) fn handle_over<'a>(
    args: Vec<String>,
    session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let group = session.current_group()?;
        let (from, to) = parse_range(args.first().map_or("", String::as_str));
        let articles = session.operator().get_articles(group, from, to).await?;

        conn.print_line("224 Overview information follows").await?;
        let lines: Vec<String> = articles.iter().map(format_overview_line).collect();
        conn.write_dot_block(lines).await?;
        Ok(Step::Continue)
    })
}

/// Which parts of an article a retrieval command sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Head,
    Body,
    Whole,
}

impl Part {
    fn code(self) -> u16 {
        match self {
            Part::Whole => codes::ARTICLE_FOLLOWS,
            Part::Head => codes::HEAD_FOLLOWS,
            Part::Body => codes::BODY_FOLLOWS,
        }
    }
}

async fn send_article(
    args: &[String],
    session: &Session,
    conn: &mut Conn,
    part: Part,
) -> Result<Step> {
    let group = session.current_group()?;
    let specifier = args.first().ok_or(status::NO_CURRENT_ARTICLE)?;
    let article = session.operator().get_article(group, specifier).await?;

    let number: i64 = if is_message_id(specifier) {
        0
    } else {
        specifier.parse().unwrap_or(0)
    };
    let message_id = match article.message_id() {
        Some(id) => id,
        None if is_message_id(specifier) => specifier.as_str(),
        None => "<>",
    };
    conn.print_line(&format!("{} {} {}", part.code(), number, message_id))
        .await?;

    write_article(conn, &article, part).await?;
    Ok(Step::Continue)
}

/// Write the requested parts as one dot-block, terminated even on failure
async fn write_article(conn: &mut Conn, article: &Article, part: Part) -> Result<()> {
    let mut writer = conn.dot_writer();
    let written = async {
        if part != Part::Body {
            for (name, value) in article.headers.iter() {
                writer.write_line(&format!("{}: {}", name, value)).await?;
            }
        }
        if part == Part::Whole {
            writer.write_line("").await?;
        }
        if part != Part::Head {
            writer.write_all(&article.body).await?;
        }
        Ok::<(), NntpError>(())
    }
    .await;
    writer.close().await?;
    written
}

pub(super) fn handle_head<'a>(
    args: Vec<String>,
    session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move { send_article(&args, session, conn, Part::Head).await })
}

pub(super) fn handle_body<'a>(
    args: Vec<String>,
    session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move { send_article(&args, session, conn, Part::Body).await })
}

pub(super) fn handle_article<'a>(
    args: Vec<String>,
    session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move { send_article(&args, session, conn, Part::Whole).await })
}

/// `AUTHINFO USER <name>`, then the `AUTHINFO PASS <secret>` continuation
///
/// On success the session switches to the operator returned by
/// authentication; on failure the current operator is kept and 452 is sent.
pub(super) fn handle_authinfo<'a>(
    args: Vec<String>,
    session: &'a mut Session,
    conn: &'a mut Conn,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        if args.len() < 2 || !args[0].eq_ignore_ascii_case("user") {
            return Err(status::SYNTAX.into());
        }
        if session.operator().authorized() {
            conn.print_line("250 authenticated").await?;
            return Ok(Step::Continue);
        }

        conn.print_line("350 Continue").await?;
        let line = conn.read_line().await?.ok_or(NntpError::ConnectionClosed)?;
        let parts: Vec<&str> = line.splitn(3, ' ').collect();
        let [verb, kind, secret] = parts.as_slice() else {
            return Err(status::SYNTAX.into());
        };
        if !verb.eq_ignore_ascii_case("authinfo") || !kind.eq_ignore_ascii_case("pass") {
            return Err(status::SYNTAX.into());
        }

        let operator = session.operator().authenticate(&args[1], secret).await?;
        session.set_operator(operator);
        conn.print_line("250 authenticated").await?;
        Ok(Step::Continue)
    })
}

#[cfg(test)]
mod tests {
    use super::super::NntpServer;
    use crate::article::{Article, Headers};
    use crate::codec::Codec;
    use crate::operator::StoreOperator;
    use crate::storage::Store;
    use crate::types::Group;
    use std::sync::Arc;
    use tokio::io::{DuplexStream, duplex};

    async fn store() -> Store {
        let store = Store::open_in_memory().unwrap();
        let group = Group {
            name: "alt.test".into(),
            description: "Testing group".into(),
            source: "src".into(),
            low: 1,
            high: 100,
        };
        store.store_groups(&[group.clone()]).await.unwrap();

        let mut headers = Headers::new();
        headers.push("Subject", "hello");
        headers.push("From", "a@example.com");
        headers.push("Message-Id", "<1@example>");
        let article = Article::new(headers, b"line one\r\n.dot line\r\n".to_vec());
        store.store_article(&group, 1, &article).await.unwrap();
        store.create_user("alice", "secret").await.unwrap();
        store
    }

    /// Start a session over an in-memory pipe and consume the greeting
    async fn connect() -> Codec<DuplexStream> {
        let server = NntpServer::new(Arc::new(StoreOperator::anonymous(store().await)));
        let (client, remote) = duplex(64 * 1024);
        tokio::spawn(async move { server.process(remote).await });

        let mut codec = Codec::new(client);
        let (code, _) = codec.read_status().await.unwrap();
        assert_eq!(code, 200);
        codec
    }

    async fn status(codec: &mut Codec<DuplexStream>, line: &str) -> (u16, String) {
        codec.print_line(line).await.unwrap();
        codec.read_status().await.unwrap()
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut c = connect().await;
        assert_eq!(status(&mut c, "FOO").await, (500, "Unknown command".into()));
        assert_eq!(status(&mut c, "").await.0, 500);
    }

    #[tokio::test]
    async fn test_article_commands_require_group() {
        let mut c = connect().await;
        for cmd in ["HEAD 1", "BODY 1", "ARTICLE 1", "OVER", "XOVER 1-2"] {
            assert_eq!(
                status(&mut c, cmd).await,
                (412, "No newsgroup selected".into()),
                "{cmd}"
            );
        }
    }

    #[tokio::test]
    async fn test_group_then_article() {
        let mut c = connect().await;
        assert_eq!(status(&mut c, "GROUP").await.0, 411);
        assert_eq!(status(&mut c, "group nope.alt.test").await.0, 411);
        assert_eq!(
            status(&mut c, "GROUP src.alt.test").await,
            (211, "99 1 100 src.alt.test".into())
        );

        assert_eq!(status(&mut c, "HEAD").await.0, 420);
        assert_eq!(status(&mut c, "HEAD 2").await.0, 423);
        assert_eq!(status(&mut c, "BODY <nope@x>").await.0, 430);

        assert_eq!(status(&mut c, "ARTICLE 1").await, (220, "1 <1@example>".into()));
        let lines = c.read_dot_block().await.unwrap();
        assert_eq!(
            lines,
            vec![
                "Subject: hello",
                "From: a@example.com",
                "Message-Id: <1@example>",
                "",
                "line one",
                ".dot line",
            ]
        );

        assert_eq!(status(&mut c, "BODY <1@example>").await, (222, "0 <1@example>".into()));
        assert_eq!(c.read_dot_block().await.unwrap(), vec!["line one", ".dot line"]);
    }

    #[tokio::test]
    async fn test_list_variants() {
        let mut c = connect().await;
        assert_eq!(status(&mut c, "LIST").await.0, 215);
        assert_eq!(c.read_dot_block().await.unwrap(), vec!["src.alt.test 100 1 99"]);

        assert_eq!(status(&mut c, "LIST NEWSGROUPS").await.0, 215);
        assert_eq!(
            c.read_dot_block().await.unwrap(),
            vec!["src.alt.test Testing group"]
        );

        assert_eq!(status(&mut c, "list overview.fmt").await.0, 215);
        assert_eq!(c.read_dot_block().await.unwrap().len(), 7);

        assert_eq!(status(&mut c, "LIST DISTRIBUTIONS").await.0, 501);
    }

    #[tokio::test]
    async fn test_over_lines() {
        let mut c = connect().await;
        status(&mut c, "GROUP src.alt.test").await;
        assert_eq!(status(&mut c, "XOVER").await.0, 224);
        let lines = c.read_dot_block().await.unwrap();
        assert_eq!(
            lines,
            vec!["1\thello\ta@example.com\t\t<1@example>\t\t21\t2"]
        );

        assert_eq!(status(&mut c, "OVER 5-9").await.0, 224);
        assert!(c.read_dot_block().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_replies() {
        let mut c = connect().await;
        assert_eq!(status(&mut c, "CAPABILITIES").await.0, 101);
        assert_eq!(c.read_dot_block().await.unwrap()[0], "VERSION 2");
        assert_eq!(
            status(&mut c, "MODE READER").await,
            (201, "Posting prohibited".into())
        );
        assert_eq!(status(&mut c, "NEWGROUPS 20240101 000000").await.0, 231);
        assert!(c.read_dot_block().await.unwrap().is_empty());
        assert_eq!(status(&mut c, "QUIT").await, (205, "bye".into()));
        assert!(c.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authinfo() {
        let mut c = connect().await;
        assert_eq!(status(&mut c, "AUTHINFO USER").await.0, 501);
        assert_eq!(status(&mut c, "AUTHINFO PASS x").await.0, 501);

        assert_eq!(status(&mut c, "AUTHINFO USER alice").await.0, 350);
        assert_eq!(status(&mut c, "AUTHINFO PASS wrong").await.0, 452);

        assert_eq!(status(&mut c, "AUTHINFO USER alice").await.0, 350);
        assert_eq!(status(&mut c, "MODE READER").await.0, 501);

        assert_eq!(status(&mut c, "AUTHINFO USER alice").await.0, 350);
        assert_eq!(
            status(&mut c, "AUTHINFO PASS secret").await,
            (250, "authenticated".into())
        );
        // Already authorized: no second prompt
        assert_eq!(status(&mut c, "AUTHINFO USER alice").await.0, 250);
    }
}
