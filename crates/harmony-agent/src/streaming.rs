//! Server-Sent Events (SSE) streaming parser.
//!
//! OpenRouter streams chat completions as a sequence of `data:` frames
//! terminated by a literal `data: [DONE]`. This module parses the raw byte
//! stream line by line and hands each data payload to the caller.

use futures_util::StreamExt;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::LlmError;

/// Parse an SSE stream from a reqwest response, calling `on_data` for each
/// data payload. Stops at the `[DONE]` sentinel.
pub async fn parse_sse_stream(
    response: reqwest::Response,
    on_data: impl FnMut(&str),
) -> Result<(), LlmError> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    drain_sse_lines(reader, on_data).await
}

/// Line-level SSE parsing, separated from the HTTP layer so it can run
/// over any buffered reader.
async fn drain_sse_lines<R>(
    reader: R,
    mut on_data: impl FnMut(&str),
) -> Result<(), LlmError>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut current_data = String::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| LlmError::Network(e.to_string()))?
    {
        if line.is_empty() {
            // Empty line = end of event
            if current_data == "[DONE]" {
                return Ok(());
            }
            if !current_data.is_empty() {
                on_data(&current_data);
                current_data.clear();
            }
            continue;
        }

        if let Some(data) = line.strip_prefix("data: ") {
            if !current_data.is_empty() {
                current_data.push('\n');
            }
            current_data.push_str(data);
        }
        // Ignore other fields (event:, id:, retry:, comments)
    }

    // Flush any remaining event
    if !current_data.is_empty() && current_data != "[DONE]" {
        on_data(&current_data);
    }

    Ok(())
}
