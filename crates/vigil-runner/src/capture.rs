//! Dual-sink capture of child output: every byte goes to the console and
//! to an in-memory buffer, in order.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Copies `reader` to `console` while accumulating the same bytes in a
/// buffer, until EOF. Console write errors are ignored so a closed
/// terminal cannot break capture.
pub async fn tee<R, W>(mut reader: R, mut console: W) -> Vec<u8>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut chunk = [0u8; 8 * 1024];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let _ = console.write_all(&chunk[..n]).await;
                let _ = console.flush().await;
                captured.extend_from_slice(&chunk[..n]);
            }
            Err(_) => break,
        }
    }
    captured
}
