//! HTTP download client with bounded redirect following.

mod client;

pub use client::{DOWNLOAD_TIMEOUT, HttpClient, MAX_REDIRECTS};
