//! GitHub release metadata: repository naming, wire types and the
//! latest-release client.

mod client;
mod repo;
mod types;

pub use client::{GetLatestRelease, GitHub, METADATA_TIMEOUT};
#[cfg(test)]
pub use client::MockGetLatestRelease;
pub use repo::GitHubRepo;
pub use types::{Release, ReleaseAsset};
