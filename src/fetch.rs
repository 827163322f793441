use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use reqwest::header::HeaderMap;

use crate::error::BotError;

/// Download a binary resource to a local file.
///
/// Only HTTP 200 counts as success; any other status is a `Fetch` error and a
/// partially written destination file may be left behind. The body is streamed
/// to disk chunk by chunk so large attachments never sit in memory whole.
/// There is no timeout and no size cap: a slow or huge upstream response holds
/// the invoking handler for its entire duration.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    headers: Option<HeaderMap>,
    dest: &Path,
) -> Result<(), BotError> {
    info!("📥 Downloading file to {}", dest.display());

    let mut request = client.get(url);
    if let Some(headers) = headers {
        request = request.headers(headers);
    }

    let mut response = request.send().await?;
    let status = response.status();
    if status.as_u16() != 200 {
        return Err(BotError::Fetch {
            status: status.as_u16(),
        });
    }

    let mut file = File::create(dest)?;
    let mut written = 0usize;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)?;
        written += chunk.len();
    }

    debug!("✅ File downloaded ({} bytes)", written);
    Ok(())
}
