pub mod config;
pub mod error;
pub mod github;
pub mod http;
pub mod install;
pub mod launch;
pub mod platform;
pub mod runtime;
