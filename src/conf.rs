// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Environment and configuration utilities.
//!
//! subtally reads its settings from a TOML file that looks like this:
//!
//! ```toml
//! [reddit]
//! client_id = "your client id"
//! client_secret = "your client secret"
//! user_agent = "subtally/0.1 by u/your_username"
//!
//! [subreddit]
//! default_name = "rust"
//! days = 7
//! ```
//!
//! Reddit credentials can also be provided in the environment using
//! `$REDDIT_CLIENT_ID`, `$REDDIT_CLIENT_SECRET`, and `$REDDIT_USER_AGENT`,
//! which take precedence over values in the configuration file. This
//! makes it possible to keep the client secret out of the file entirely.

use crate::clock::Window;
use crate::reddit::Credentials;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs, io};
use thiserror::Error;

/// Configuration file used when none is specified on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
const USER_AGENT_VAR: &str = "REDDIT_USER_AGENT";

/// Program settings.
#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    reddit: RedditSettings,
    subreddit: SubredditSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RedditSettings {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct SubredditSettings {
    #[serde(default)]
    default_name: String,
    days: u32,
}

impl Settings {
    /// Loads settings from the configuration file at `path`.
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// is missing required settings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses settings from the text of a configuration file.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtally::conf::Settings;
    /// # use temp_env::with_vars_unset;
    /// # with_vars_unset(["REDDIT_CLIENT_ID", "REDDIT_CLIENT_SECRET", "REDDIT_USER_AGENT"], || {
    /// let settings = Settings::parse(r#"
    ///     [reddit]
    ///     client_id = "id"
    ///     client_secret = "secret"
    ///     user_agent = "subtally/test"
    ///
    ///     [subreddit]
    ///     default_name = "rust"
    ///     days = 7
    /// "#).unwrap();
    ///
    /// assert_eq!(settings.default_subreddit(), "rust");
    /// assert_eq!(settings.window().len_days(), 7);
    /// # });
    /// ```
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut settings: Settings = toml::from_str(text)?;
        settings.reddit.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), Error> {
        let required = [
            ("reddit.client_id", &self.reddit.client_id),
            ("reddit.client_secret", &self.reddit.client_secret),
            ("reddit.user_agent", &self.reddit.user_agent),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Missing(key));
            }
        }
        if self.subreddit.days == 0 {
            return Err(Error::InvalidDays);
        }
        Ok(())
    }

    /// Credentials used to authenticate with Reddit.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            &self.reddit.client_id,
            &self.reddit.client_secret,
            &self.reddit.user_agent,
        )
    }

    /// Subreddit suggested to the user when prompting for a subreddit.
    pub fn default_subreddit(&self) -> &str {
        &self.subreddit.default_name
    }

    /// Trailing window of days in which activity is counted.
    pub fn window(&self) -> Window {
        Window::days(self.subreddit.days)
    }

    /// Overrides the configured window with one covering `days` days.
    ///
    /// `days` should be positive; the command-line parser rejects zero.
    pub fn with_days(mut self, days: u32) -> Self {
        self.subreddit.days = days;
        self
    }
}

impl RedditSettings {
    fn apply_env(&mut self) {
        let overrides = [
            (CLIENT_ID_VAR, &mut self.client_id),
            (CLIENT_SECRET_VAR, &mut self.client_secret),
            (USER_AGENT_VAR, &mut self.user_agent),
        ];
        for (var, value) in overrides {
            if let Ok(env_value) = env::var(var) {
                debug!("Using ${var} from the environment");
                *value = env_value;
            }
        }
    }
}

/// Indicates an error in the program's configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("Could not read configuration file {}: {source}", .path.display())]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration file is not valid TOML, or a setting has the
    /// wrong type.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required setting is missing or empty.
    #[error("Missing required configuration setting: {0}")]
    Missing(&'static str),

    /// The aggregation window is not a positive number of days.
    #[error("subreddit.days must be a positive number of days")]
    InvalidDays,
}
