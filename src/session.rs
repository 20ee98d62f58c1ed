use std::io;
use std::time::Instant;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, info, warn};
use crate::{
    dispatcher::CommandDispatcher,
    errors::AppError,
    services::metrics,
    types::{Reply, Status},
};

// Longest accepted request line, newline excluded: a verb, one space and a
// URL at the validator's length limit fit with room to spare.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Serves one client until it disconnects or sends a stream that is not
/// line-delimited UTF-8.
///
/// Each line gets exactly one reply; a command that fails produces an error
/// status and the loop keeps reading. A line longer than [`MAX_LINE_LENGTH`]
/// is answered with `400 Bad Request` as soon as the limit is crossed and the
/// rest of it is discarded without being buffered.
///
/// # Errors
/// Returns [`AppError::Io`] when the stream can no longer be read or written.
pub async fn handle_connection<S>(
    stream: S,
    peer: String,
    dispatcher: CommandDispatcher,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    metrics::connection_opened();
    info!("Client {} connected", peer);
    let result = serve_lines(stream, &peer, &dispatcher).await;
    metrics::connection_closed();
    match &result {
        Ok(()) => info!("Client {} disconnected", peer),
        Err(e) => warn!("Client {} dropped: {}", peer, e),
    }
    result
}

async fn serve_lines<S>(stream: S, peer: &str, dispatcher: &CommandDispatcher) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE_LENGTH as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await?;
        if read == 0 {
            return Ok(());
        }

        if buf.len() > MAX_LINE_LENGTH && buf.last() != Some(&b'\n') {
            warn!("{} sent a line longer than {} bytes", peer, MAX_LINE_LENGTH);
            metrics::record_command("INVALID", Status::BadRequest.code(), Instant::now());
            writer.write_all(Reply::new(Status::BadRequest).render().as_bytes()).await?;
            writer.flush().await?;
            if !skip_line(&mut reader).await? {
                return Ok(());
            }
            continue;
        }

        let line = std::str::from_utf8(&buf)
            .map_err(|e| AppError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        let line = line.strip_suffix('\n').unwrap_or(line);
        debug!("{} -> {:?}", peer, line);
        let reply = dispatcher.dispatch(line).await;
        writer.write_all(reply.render().as_bytes()).await?;
        writer.flush().await?;
    }
}

/// Drops input up to and including the next `\n`, in bounded chunks.
/// Returns `false` when the stream ended first.
async fn skip_line<R>(reader: &mut R) -> Result<bool, AppError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(false);
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(true);
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}
