pub mod client;

pub use client::GitHubSource;
