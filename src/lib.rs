// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! subtally is a command-line tool for finding the most active members of a
//! subreddit. It looks at every submission made to a subreddit over the last
//! few days, reads every comment on those submissions, and lists the ten
//! users who posted the most and the ten users who commented the most.
//!
//! # Examples
//!
//! Tally the last week of activity in r/rust:
//!
//! ```bash
//! subtally rust
//! ```
//!
//! Look back a month instead of the configured number of days:
//!
//! ```bash
//! subtally --days 30 rust
//! ```
//!
//! Prompt for a subreddit, reading settings from a different file:
//!
//! ```bash
//! subtally --config ~/.config/subtally.toml
//! ```
//!
//! Get usage and help for the tool:
//!
//! ```bash
//! subtally --help
//! ```
//!
//! # Reddit API Setup
//!
//! subtally reads from Reddit's OAuth API using an application-only token.
//! To enable access:
//!
//! 1. [Create a Reddit app] of type "script".
//! 2. Copy the app's client ID and secret into the `[reddit]` section of
//!    `config.toml`, along with a descriptive user agent. See the [`conf`]
//!    module for the file's format.
//!
//! The client ID, secret, and user agent can also be set with the
//! `$REDDIT_CLIENT_ID`, `$REDDIT_CLIENT_SECRET`, and `$REDDIT_USER_AGENT`
//! environment variables.
//!
//! # License
//!
//! subtally is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0
//! [Create a Reddit app]: https://www.reddit.com/prefs/apps

pub mod activity;
pub mod cli;
pub mod clock;
pub mod conf;
pub mod count;
pub mod reddit;
pub mod view;

#[cfg(test)]
mod test_utils;
