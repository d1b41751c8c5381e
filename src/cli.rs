// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Drives the command-line program.

use crate::activity::{self, Report};
use crate::clock::{Clock, SystemClock, Window};
use crate::conf::{self, Settings};
use crate::reddit::{self, Fetcher, Subreddit};
use crate::view::Viewable;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::debug;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Finds the most active posters and commenters in a subreddit", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Read settings from this configuration file
    #[arg(short, long, value_name = "PATH", default_value = conf::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Count activity over the last N days instead of the configured window
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    days: Option<u32>,

    /// Subreddit to tally; prompts for one if omitted
    subreddit: Option<String>,
}

impl Config {
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn settings(&self) -> Result<Settings, conf::Error> {
        let settings = Settings::load(&self.config)?;
        Ok(match self.days {
            Some(days) => settings.with_days(days),
            None => settings,
        })
    }
}

/// Runs the command-line program.
#[derive(Debug)]
pub struct Runner<F: Fetcher = Subreddit, C: Clock = SystemClock> {
    fetcher: F,
    clock: C,
    default_subreddit: String,
    window: Window,
}

impl Runner {
    /// Creates a new program runner that reads from Reddit using `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self::new_with(
            Subreddit::new(settings.credentials()),
            SystemClock,
            settings.default_subreddit(),
            settings.window(),
        )
    }
}

impl<F: Fetcher, C: Clock> Runner<F, C> {
    /// Creates a new program runner that retrieves subreddit data with
    /// `fetcher` and measures the `window` from the current time on `clock`.
    pub fn new_with(fetcher: F, clock: C, default_subreddit: &str, window: Window) -> Self {
        Self {
            fetcher,
            clock,
            default_subreddit: default_subreddit.to_string(),
            window,
        }
    }

    /// Asks the user for the name of a subreddit.
    ///
    /// The entered line is returned as-is, minus its line ending. In
    /// particular, a blank line is returned as an empty name rather than
    /// being replaced with the default subreddit.
    pub fn prompt(&self, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<String> {
        write!(
            output,
            "Enter subreddit name (default: {}): ",
            self.default_subreddit
        )?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let name = line.strip_suffix('\n').unwrap_or(&line);
        let name = name.strip_suffix('\r').unwrap_or(name);
        Ok(name.to_string())
    }

    /// Finds the most active posters and commenters in `subreddit`.
    pub async fn report(&self, subreddit: &str) -> Result<Report, reddit::Error> {
        activity::for_subreddit(&self.fetcher, subreddit, self.window, &self.clock).await
    }

    /// Writes a report on `subreddit` to `out`.
    ///
    /// If the report cannot be produced, a single `Error:` line describing
    /// the problem is written instead, and `false` is returned.
    pub async fn run(&self, subreddit: &str, out: &mut impl Write) -> io::Result<bool> {
        match self.report(subreddit).await {
            Ok(report) => {
                writeln!(out, "{}", report.view())?;
                Ok(true)
            }
            Err(err) => {
                debug!("Could not tally r/{subreddit}: {err:?}");
                writeln!(out, "Error: {err}")?;
                Ok(false)
            }
        }
    }
}

/// An error that stops the program before or while it runs.
#[derive(Debug, Error)]
pub enum Error {
    /// The program's configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] conf::Error),

    /// Data could not be retrieved from Reddit.
    #[error(transparent)]
    Reddit(#[from] reddit::Error),

    /// The terminal could not be read or written.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Runs the command-line program using the given `config`.
///
/// Every failure is reported on standard output as an `Error:` line, and
/// results in a failing exit code.
pub async fn run(config: Config) -> ExitCode {
    match try_run(&config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            println!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn try_run(config: &Config) -> Result<bool, Error> {
    let settings = config.settings()?;
    debug!("Loaded configuration from {}", config.config.display());
    let runner = Runner::new(&settings);

    let subreddit = match &config.subreddit {
        Some(subreddit) => subreddit.clone(),
        None => runner.prompt(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    Ok(runner.run(&subreddit, &mut io::stdout()).await?)
}
