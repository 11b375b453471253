//! Error taxonomy for the launcher.
//!
//! Every variant is terminal for the current invocation; nothing is retried.
//! Components return these inside `anyhow::Error` and only the binary entry
//! point translates them into a process exit status.

/// Errors produced while resolving, fetching or launching the tool binary.
#[derive(Debug)]
pub enum LaunchError {
    /// The host OS/arch combination has no entry in the platform table.
    UnsupportedPlatform { os: String, arch: String },
    /// The release metadata endpoint was unreachable, answered non-2xx, or
    /// returned a body that could not be parsed.
    Network(String),
    /// A request or transfer exceeded its deadline.
    Timeout(String),
    /// No release asset matched the expected filename exactly.
    AssetNotFound {
        wanted: String,
        available: Vec<String>,
    },
    /// The download redirect chain exceeded the hop limit.
    RedirectLoop { url: String, limit: usize },
    /// The asset transfer failed after the request was accepted.
    Download(String),
    /// The downloaded binary could not be marked executable.
    Permission(String),
    /// The tool binary could not be spawned.
    Spawn(String),
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchError::UnsupportedPlatform { os, arch } => {
                write!(f, "Unsupported platform: {}-{}", os, arch)
            }
            LaunchError::Network(msg) => {
                write!(f, "Network error: {}", msg)
            }
            LaunchError::Timeout(msg) => {
                write!(f, "Timed out: {}", msg)
            }
            LaunchError::AssetNotFound { wanted, available } => {
                write!(
                    f,
                    "Binary not found: no release asset named {}. Available assets: {}",
                    wanted,
                    if available.is_empty() {
                        "(none)".to_string()
                    } else {
                        available.join(", ")
                    }
                )
            }
            LaunchError::RedirectLoop { url, limit } => {
                write!(
                    f,
                    "Download from {} followed more than {} redirects, giving up",
                    url, limit
                )
            }
            LaunchError::Download(msg) => {
                write!(f, "Download failed: {}", msg)
            }
            LaunchError::Permission(msg) => {
                write!(f, "Permission error: {}", msg)
            }
            LaunchError::Spawn(msg) => {
                write!(f, "Failed to run tool: {}", msg)
            }
        }
    }
}

impl std::error::Error for LaunchError {}

/// Maps a transport-level reqwest error onto the taxonomy, keeping timeouts
/// distinct from generic network failures.
pub fn classify_request_error(error: &reqwest::Error, what: &str) -> LaunchError {
    if error.is_timeout() {
        LaunchError::Timeout(format!("{}: {}", what, error))
    } else {
        LaunchError::Network(format!("{}: {}", what, error))
    }
}
