//! UTF-8 line framing.
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// One client stream split into a buffered reader and a writer.
pub struct Connection<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Connection<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Write `msg` followed by a newline.
    pub async fn send(&mut self, msg: &str) -> std::io::Result<()> {
        self.writer.write_all(msg.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Next line without its terminator, or `None` once the peer hangs up.
    pub async fn recv(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, BufReader, duplex};

    #[tokio::test]
    async fn lines_roundtrip_and_eof_is_none() {
        let (client, server) = duplex(1024);
        let (read_half, write_half) = tokio::io::split(server);
        let mut conn = Connection::new(BufReader::new(read_half), write_half);
        let (mut client_read, mut client_write) = tokio::io::split(client);

        client_write.write_all("こんにちは\r\nbye\n".as_bytes()).await.unwrap();
        client_write.shutdown().await.unwrap();
        assert_eq!(conn.recv().await.unwrap().as_deref(), Some("こんにちは"));
        assert_eq!(conn.recv().await.unwrap().as_deref(), Some("bye"));
        assert_eq!(conn.recv().await.unwrap(), None);

        conn.send("ok").await.unwrap();
        drop(conn);
        let mut echoed = String::new();
        client_read.read_to_string(&mut echoed).await.unwrap();
        assert_eq!(echoed, "ok\n");
    }
}
