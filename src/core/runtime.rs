//! Host runtime descriptor
//!
//! Maps the compile-time target onto the OS and architecture names used by
//! the Go download site (`linux-amd64`, `darwin-arm64`, ...).

use std::fmt;

/// Immutable (OS, architecture) pair describing the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub os: String,
    pub arch: String,
}

impl RuntimeInfo {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Describe the machine this binary was built for.
    pub fn current() -> Self {
        Self::new(
            go_os(std::env::consts::OS),
            go_arch(std::env::consts::ARCH),
        )
    }

    /// Replace every `[os]` and `[arch]` placeholder in `template`.
    pub fn format(&self, template: &str) -> String {
        template
            .replace("[os]", &self.os)
            .replace("[arch]", &self.arch)
    }
}

impl fmt::Display for RuntimeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

fn go_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn go_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "arm" => "armv6l",
        "powerpc64" => "ppc64le",
        "loongarch64" => "loong64",
        other => other,
    }
}
