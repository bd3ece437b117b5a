//! Line and dot-block framing shared by the client and the server
//!
//! NNTP is line oriented: every line ends in `CRLF`, and multi-line payloads
//! are terminated by a line holding a single `.`. Payload lines that begin
//! with a dot are sent with one extra leading dot (byte-stuffing).
//!
//! [`Codec`] owns the transport. Multi-line payloads are read through a
//! [`DotReader`] and written through a [`DotWriter`], both of which borrow the
//! codec mutably, so no other command can be issued while one is open.

use crate::error::{NntpError, Result};
use crate::response::NntpResponse;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace};

/// Flush threshold for buffered dot-block output
const WRITE_CHUNK: usize = 64 * 1024;

/// Parse a coded status line (`"<3-digit-code> <message>"`)
///
/// Fails with [`NntpError::InvalidResponse`] when the line has no three-digit
/// numeric prefix.
pub fn parse_code_line(line: &str) -> Result<(u16, String)> {
    let line = line.trim_start_matches('\u{FEFF}');
    let malformed = || NntpError::InvalidResponse(line.chars().take(100).collect());

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits != 3 {
        return Err(malformed());
    }
    let code: u16 = line[..3].parse().map_err(|_| malformed())?;
    let message = line[3..].strip_prefix(' ').unwrap_or(&line[3..]);
    Ok((code, message.to_string()))
}

/// Add byte-stuffing to one payload line
pub fn stuff_line(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len() + 3);
    if line.starts_with(b".") {
        out.push(b'.');
    }
    out.extend_from_slice(line);
    out.extend_from_slice(b"\r\n");
    out
}

/// Remove byte-stuffing from one received payload line
pub fn unstuff_line(line: &[u8]) -> &[u8] {
    line.strip_prefix(b".").unwrap_or(line)
}

fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Framing layer over one NNTP connection
pub struct Codec<S> {
    stream: BufReader<S>,
    /// A multi-line block was opened for reading and not yet consumed
    in_block: bool,
    /// Tail of a dot-block whose writer was dropped before `close`; sent
    /// ahead of the next write
    owed: Vec<u8>,
}

impl<S> Codec<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            in_block: false,
            owed: Vec::new(),
        }
    }

    /// The underlying transport
    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    /// Whether a dot-block is still pending on the read side
    pub fn in_block(&self) -> bool {
        self.in_block
    }

    /// Whether the tail of an abandoned dot-block is waiting to be sent
    pub fn has_owed_output(&self) -> bool {
        !self.owed.is_empty()
    }

    /// Read one raw line without its line ending; `None` at end of stream
    async fn read_raw_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::with_capacity(512);
        let n = self.stream.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        let len = trim_line_ending(&buf).len();
        buf.truncate(len);
        Ok(Some(buf))
    }

    /// Read one line as text; `None` when the peer closed the connection
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let line = self
            .read_raw_line()
            .await?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned());
        if let Some(l) = &line {
            trace!("Received: {}", l);
        }
        Ok(line)
    }

    /// Read one coded status line, whatever its code
    pub async fn read_status(&mut self) -> Result<(u16, String)> {
        let line = self.read_line().await?.ok_or(NntpError::ConnectionClosed)?;
        parse_code_line(&line)
    }

    /// Read one coded status line and require `expected`
    ///
    /// A well-formed line with another code fails with
    /// [`NntpError::Protocol`] carrying the peer's code and message.
    pub async fn read_code_line(&mut self, expected: u16) -> Result<(u16, String)> {
        let (code, message) = self.read_status().await?;
        if code != expected {
            return Err(NntpError::Protocol { code, message });
        }
        Ok((code, message))
    }

    /// Write `text` followed by `CRLF`
    pub async fn print_line(&mut self, text: &str) -> Result<()> {
        let is_password = text
            .get(..14)
            .is_some_and(|verb| verb.eq_ignore_ascii_case("AUTHINFO PASS "));
        if is_password {
            trace!("Sending: AUTHINFO PASS ****");
        } else {
            trace!("Sending: {}", text);
        }
        self.send_owed().await?;
        let writer = self.stream.get_mut();
        writer.write_all(text.as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
        writer.flush().await?;
        Ok(())
    }

    /// Start reading a dot-terminated block
    pub fn dot_reader(&mut self) -> DotReader<'_, S> {
        self.in_block = true;
        DotReader {
            codec: self,
            done: false,
        }
    }

    /// Read a whole dot-terminated block as unstuffed text lines
    pub async fn read_dot_block(&mut self) -> Result<Vec<String>> {
        self.dot_reader().lines().await
    }

    /// Read a coded line requiring `expected`, then its dot-block
    pub async fn read_multiline(&mut self, expected: u16) -> Result<NntpResponse> {
        let (code, message) = self.read_code_line(expected).await?;
        let lines = self.read_dot_block().await?;
        Ok(NntpResponse {
            code,
            message,
            lines,
        })
    }

    /// Start writing a dot-terminated block
    ///
    /// [`DotWriter::close`] flushes and terminates the block. A writer
    /// dropped without `close` still owes the peer its terminator; the
    /// remaining payload and the `.` line go out ahead of the next write on
    /// this codec, or on [`send_owed`](Self::send_owed).
    pub fn dot_writer(&mut self) -> DotWriter<'_, S> {
        DotWriter {
            codec: self,
            buf: Vec::with_capacity(4096),
            partial: Vec::new(),
            closed: false,
        }
    }

    /// Write a complete dot-terminated block of text lines
    pub async fn write_dot_block<I, L>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut writer = self.dot_writer();
        let written = async {
            for line in lines {
                writer.write_line(line.as_ref()).await?;
            }
            Ok::<(), NntpError>(())
        }
        .await;
        writer.close().await?;
        written
    }

    /// Send the tail of an abandoned dot-block, if any
    pub async fn send_owed(&mut self) -> Result<()> {
        if self.owed.is_empty() {
            return Ok(());
        }
        let owed = std::mem::take(&mut self.owed);
        let writer = self.stream.get_mut();
        writer.write_all(&owed).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.send_owed().await?;
        self.stream.get_mut().write_all(data).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.stream.get_mut().flush().await?;
        Ok(())
    }
}

/// Single-pass reader over one dot-terminated block
pub struct DotReader<'a, S> {
    codec: &'a mut Codec<S>,
    done: bool,
}

impl<S> DotReader<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Next unstuffed payload line, without line ending; `None` after the terminator
    pub async fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        if self.done {
            return Ok(None);
        }
        let raw = self
            .codec
            .read_raw_line()
            .await?
            .ok_or(NntpError::ConnectionClosed)?;
        if raw == b"." {
            self.done = true;
            self.codec.in_block = false;
            return Ok(None);
        }
        Ok(Some(unstuff_line(&raw).to_vec()))
    }

    /// Collect the remaining payload as text lines
    pub async fn lines(mut self) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(64);
        while let Some(line) = self.next_line().await? {
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        Ok(lines)
    }

    /// Collect the remaining payload as bytes, each line ending in `CRLF`
    pub async fn read_to_end(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        while let Some(line) = self.next_line().await? {
            data.extend_from_slice(&line);
            data.extend_from_slice(b"\r\n");
        }
        Ok(data)
    }

    /// Discard the rest of the block so the connection can be reused
    pub async fn drain(mut self) -> Result<()> {
        while self.next_line().await?.is_some() {}
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Writer for one dot-terminated block
pub struct DotWriter<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    codec: &'a mut Codec<S>,
    buf: Vec<u8>,
    /// Bytes after the last newline passed to `write_all`
    partial: Vec<u8>,
    closed: bool,
}

impl<S> DotWriter<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Write one payload line; stuffing and `CRLF` are added here
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        self.push_line(line.as_bytes()).await
    }

    /// Write raw payload bytes, splitting them into lines
    ///
    /// A trailing fragment without newline is kept until more data arrives
    /// or the block is closed.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut rest = data;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let mut line = std::mem::take(&mut self.partial);
            line.extend_from_slice(&rest[..pos]);
            self.push_line(trim_line_ending(&line)).await?;
            rest = &rest[pos + 1..];
        }
        self.partial.extend_from_slice(rest);
        Ok(())
    }

    async fn push_line(&mut self, line: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(&stuff_line(line));
        if self.buf.len() >= WRITE_CHUNK {
            let chunk = std::mem::take(&mut self.buf);
            self.codec.write_raw(&chunk).await?;
        }
        Ok(())
    }

    /// Flush pending payload and emit the terminating `.` line
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.buf.extend_from_slice(&stuff_line(trim_line_ending(&line)));
        }
        self.buf.extend_from_slice(b".\r\n");
        let data = std::mem::take(&mut self.buf);
        self.codec.write_raw(&data).await?;
        self.codec.flush().await
    }
}

impl<S> Drop for DotWriter<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        debug!("Dot-block writer dropped before close; terminator deferred");
        let mut tail = std::mem::take(&mut self.buf);
        if !self.partial.is_empty() {
            tail.extend_from_slice(&stuff_line(trim_line_ending(&self.partial)));
        }
        tail.extend_from_slice(b".\r\n");
        self.codec.owed.extend_from_slice(&tail);
    }
}
