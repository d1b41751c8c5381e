//! Reddit API clients and services for communicating with Reddit over HTTP.

pub mod client;
pub mod service;
pub mod thing;

pub use client::{Error, Fetcher, MAX_SUBMISSIONS, Subreddit};
pub use service::{Credentials, RedditService};
pub use thing::{Comment, Submission};
