//! Per-invocation configuration
//!
//! A [`Context`] is built once in `main` (or in a test) and handed to every
//! command. There is no global state besides the verbosity flag in
//! [`output`](super::output).

use super::runtime::RuntimeInfo;
use crate::acquire::CancelToken;
use crate::fs::{Filesystem, OsFs};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Host the SDK archives are served from.
pub const DEFAULT_DOWNLOAD_HOST: &str = "https://golang.org";

/// Environment variable holding a whole-request HTTP timeout in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "DEVCTL_HTTP_TIMEOUT";

const MIN_HTTP_TIMEOUT_SECS: u64 = 5;
const MAX_HTTP_TIMEOUT_SECS: u64 = 3600;

/// Default base directory: `~/.devctl`.
pub fn default_base() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".devctl")
}

/// Read the HTTP timeout override, if one is set.
///
/// Unparseable values are ignored; parsed values are clamped to 5..=3600 seconds.
pub fn http_timeout_from_env() -> Option<Duration> {
    parse_timeout(std::env::var(HTTP_TIMEOUT_ENV).ok()?.as_str())
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    let secs = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(
        secs.clamp(MIN_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS),
    ))
}

/// On-disk layout under the base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkPaths {
    base: PathBuf,
}

impl SdkPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>/sdks/go`
    pub fn sdk_root(&self) -> PathBuf {
        self.base.join("sdks").join("go")
    }

    /// `<base>/sdks/go/<version>`; `version` must already be normalized.
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.sdk_root().join(version)
    }

    /// `<base>/sdks/go/current`
    pub fn current_link(&self) -> PathBuf {
        self.sdk_root().join("current")
    }
}

/// HTTP settings for the archive fetcher.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub download_host: String,
    /// None leaves ureq's defaults untouched.
    pub timeout: Option<Duration>,
    pub cancel: CancelToken,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            download_host: DEFAULT_DOWNLOAD_HOST.to_string(),
            timeout: None,
            cancel: CancelToken::new(),
        }
    }
}

/// Everything a command needs: paths, storage, host description, HTTP
/// settings and the stream command data is written to.
pub struct Context<W: Write = io::Stdout> {
    pub paths: SdkPaths,
    pub fs: Box<dyn Filesystem>,
    pub runtime: RuntimeInfo,
    pub http: HttpConfig,
    pub out: W,
}

impl Context<io::Stdout> {
    /// Context for the real CLI: OS filesystem, host runtime, stdout.
    pub fn from_env(base: Option<PathBuf>) -> Self {
        let mut ctx = Context::new(
            base.unwrap_or_else(default_base),
            Box::new(OsFs::new()),
            io::stdout(),
        );
        ctx.http.timeout = http_timeout_from_env();
        ctx
    }
}

impl<W: Write> Context<W> {
    pub fn new(base: impl Into<PathBuf>, fs: Box<dyn Filesystem>, out: W) -> Self {
        Self {
            paths: SdkPaths::new(base),
            fs,
            runtime: RuntimeInfo::current(),
            http: HttpConfig::default(),
            out,
        }
    }

    /// Fetch archives from `host` instead of the official download site.
    ///
    /// Intended for pointing the fetcher at a local test server.
    pub fn with_download_host(mut self, host: impl Into<String>) -> Self {
        self.http.download_host = host.into();
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeInfo) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.http.cancel = cancel;
        self
    }
}
