use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, Stdin, Stdout};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::games::snakego::Action;
use crate::protocol::{self, GameSetup, Inbound, ItemRecord, ProtocolError};

/// Client side of the judge connection over any byte stream pair.
pub struct Gateway<R, W> {
    reader: R,
    writer: W,
    /// Upper bound on every read; `None` waits forever
    timeout: Option<Duration>,
}

async fn within<T>(
    limit: Option<Duration>,
    read: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProtocolError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, read)
            .await
            .map_err(|_| ProtocolError::Timeout(limit))?,
        None => read.await,
    }
}

impl<R, W> Gateway<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn recv_setup(&mut self) -> Result<GameSetup, ProtocolError> {
        within(self.timeout, protocol::read_setup(&mut self.reader)).await
    }

    pub async fn recv_items(&mut self) -> Result<Vec<ItemRecord>, ProtocolError> {
        within(self.timeout, protocol::read_items(&mut self.reader)).await
    }

    /// Next action opcode or the final result record.
    pub async fn recv_turn(&mut self) -> Result<Inbound, ProtocolError> {
        within(self.timeout, protocol::read_inbound(&mut self.reader)).await
    }

    pub async fn send_action(&mut self, action: Action) -> Result<(), ProtocolError> {
        protocol::write_action(&mut self.writer, action).await
    }
}

impl Gateway<OwnedReadHalf, OwnedWriteHalf> {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        tracing::info!("Connected to judge at {}", stream.peer_addr()?);

        let (reader, writer) = stream.into_split();
        Ok(Self::new(reader, writer))
    }
}

impl Gateway<Stdin, Stdout> {
    /// Protocol over stdin/stdout, for judges that spawn the client.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}
