//! Scripted upstream NNTP server for exercising backends over real TCP

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Active list advertised by every mock upstream
pub const ACTIVE: &[&str] = &["alt.test 100 1 y", "alt.binaries 500 10 y"];

pub struct MockUpstream {
    pub addr: SocketAddr,
    /// Every command line received, across all connections
    pub commands: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn received(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.received().iter().filter(|c| *c == command).count()
    }
}

/// Serve `ACTIVE` on `LIST`, accepting any AUTHINFO credentials
pub async fn spawn_upstream() -> MockUpstream {
    spawn_upstream_with(false).await
}

/// Like [`spawn_upstream`]; with `hang_up_after_list` every connection is
/// closed by the server right after answering `LIST`
pub async fn spawn_upstream_with(hang_up_after_list: bool) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let commands = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&commands);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let (read, mut write) = stream.into_split();
                let mut lines = BufReader::new(read).lines();
                write.write_all(b"200 mock upstream ready\r\n").await.unwrap();

                while let Ok(Some(line)) = lines.next_line().await {
                    log.lock().unwrap().push(line.clone());
                    let reply = match line.to_uppercase().as_str() {
                        "LIST" | "LIST ACTIVE" => {
                            let mut reply = String::from("215 list follows\r\n");
                            for entry in ACTIVE {
                                reply.push_str(entry);
                                reply.push_str("\r\n");
                            }
                            reply.push_str(".\r\n");
                            reply
                        }
                        cmd if cmd.starts_with("AUTHINFO USER") => "381 password please\r\n".into(),
                        cmd if cmd.starts_with("AUTHINFO PASS") => "281 welcome\r\n".into(),
                        "QUIT" => {
                            let _ = write.write_all(b"205 bye\r\n").await;
                            break;
                        }
                        _ => "500 what?\r\n".into(),
                    };
                    if write.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                    if hang_up_after_list && reply.starts_with("215") {
                        break;
                    }
                }
            });
        }
    });

    MockUpstream { addr, commands }
}
