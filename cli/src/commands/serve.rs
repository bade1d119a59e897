//! Serve command - JSON-lines request loop for hosting UIs.
//!
//! Each input line is one `Request`; each produces exactly one `Response`
//! line on the output, in order. The loop ends at end of input.

use anyhow::Result;
use portsight_core::{PlatformCommandInterface, Request, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

/// `portsight serve` over stdin/stdout.
pub async fn run(interface: &PlatformCommandInterface) -> Result<()> {
    serve(
        interface,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

async fn serve<I, O>(interface: &PlatformCommandInterface, input: I, mut output: O) -> Result<()>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => interface.handle(request).await,
            Err(e) => {
                debug!(error = %e, "Rejected malformed request");
                Response::error(format!("Invalid request: {}", e))
            }
        };

        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        output.write_all(encoded.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}
