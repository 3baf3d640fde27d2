//! Host facts that decide package eligibility.
use std::fmt;

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-like systems.
    Unix,
    /// Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix => write!(f, "unix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current process.
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
    /// Whether the effective user is root.
    pub is_root: bool,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            is_root: Self::detect_root(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, is_root: bool) -> Self {
        Self { os, is_root }
    }

    const fn detect_os() -> Os {
        if cfg!(windows) { Os::Windows } else { Os::Unix }
    }

    #[cfg(unix)]
    fn detect_root() -> bool {
        nix::unistd::geteuid().is_root()
    }

    /// Windows has no effective-root concept; never root.
    #[cfg(not(unix))]
    const fn detect_root() -> bool {
        false
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = if self.is_root { "root" } else { "user" };
        write!(f, "{} ({user})", self.os)
    }
}
