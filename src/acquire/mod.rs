//! Archive locator and fetcher
//!
//! Builds the download URL for a Go release on this host and streams the
//! whole archive into memory:
//!
//! ```text
//! GET <host>/dl/go<version>.<os>-<arch>.tar.gz
//! ```
//!
//! One request, no retries. Any failure (bad URL, transport error, non-2xx
//! status, body read error, cancellation) becomes [`Error::Download`].

use crate::core::config::HttpConfig;
use crate::core::output;
use crate::core::runtime::RuntimeInfo;
use crate::core::version;
use crate::error::{Error, Result};
use indicatif::ProgressBar;
use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const READ_CHUNK: usize = 8192;

/// Shared cancellation flag for an in-flight download.
///
/// Cloning yields a handle to the same flag. Cancellation is observed before
/// the request is sent and between body reads. It is not observed while
/// blocked waiting for response headers; only `HttpConfig::timeout` bounds
/// that wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// File name of the release archive, e.g. `go1.17.1.linux-amd64.tar.gz`.
pub fn artifact_name(runtime: &RuntimeInfo, version: &str) -> String {
    runtime.format(&format!("go{}.[os]-[arch].tar.gz", version))
}

/// Full download URL for `version` on `host`.
pub fn download_url(host: &str, runtime: &RuntimeInfo, version: &str) -> String {
    format!(
        "{}/dl/{}",
        host.trim_end_matches('/'),
        artifact_name(runtime, version)
    )
}

/// Download the SDK archive for `version` into memory.
///
/// Leading `v`s on `version` are ignored.
pub fn fetch(http: &HttpConfig, runtime: &RuntimeInfo, version: &str) -> Result<Vec<u8>> {
    let version = version::normalize(version)?;
    let url = download_url(&http.download_host, runtime, &version);
    output::detail(&format!("downloading {} for {}", url, runtime));

    let mut archive = Vec::new();
    let total = download(http, &url, &mut archive).map_err(|cause| Error::Download {
        version: version.clone(),
        host: http.download_host.clone(),
        cause,
    })?;

    output::detail(&format!("downloaded {} bytes", total));
    Ok(archive)
}

fn download(http: &HttpConfig, url: &str, out: &mut impl Write) -> std::result::Result<u64, String> {
    if http.cancel.is_cancelled() {
        return Err("download cancelled".to_string());
    }

    let mut request = ureq::get(url);
    if let Some(timeout) = http.timeout {
        request = request.timeout(timeout);
    }
    let response = request.call().map_err(describe)?;

    let filename = url.rsplit('/').next().unwrap_or(url);
    let pb = output::download_spinner(&format!("downloading {}", filename));
    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    // The body reader is dropped (and the connection released) on every path out
    let mut reader = response.into_reader();
    let result = copy_body(&mut reader, out, &pb, &http.cancel);
    pb.finish_and_clear();
    result
}

fn copy_body(
    reader: &mut impl Read,
    out: &mut impl Write,
    pb: &ProgressBar,
    cancel: &CancelToken,
) -> std::result::Result<u64, String> {
    let mut buffer = [0u8; READ_CHUNK];
    let mut total_bytes = 0u64;

    loop {
        if cancel.is_cancelled() {
            return Err("download cancelled".to_string());
        }

        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| format!("read error: {}", e))?;
        if bytes_read == 0 {
            break;
        }

        out.write_all(&buffer[..bytes_read])
            .map_err(|e| format!("write error: {}", e))?;

        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    Ok(total_bytes)
}

fn describe(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, _) => format!("server responded with HTTP {}", code),
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}
