// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Tallies who is posting and commenting in a subreddit.
//!
//! Every submission in the window is processed concurrently: each one is
//! counted and has its comments retrieved independently, producing its own
//! small [`Activity`]. Once every submission has been processed, the
//! individual tallies are merged into a single result, so no tally is ever
//! shared between submissions while they are in flight.

use crate::clock::{Clock, DateTime, HasAge, Utc, Window};
use crate::count::{AuthorCounter, TOP_N, UserStat};
use crate::reddit::{Error, Fetcher, MAX_SUBMISSIONS, Submission};
use futures::future::try_join_all;
use log::{debug, info, trace};
use std::ops::AddAssign;

/// Frequency tables of post authors and comment authors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Activity {
    posts: AuthorCounter,
    comments: AuthorCounter,
}

impl Activity {
    /// Tallies the authors of `submissions` created at or after `cutoff`,
    /// along with the authors of every comment on those submissions.
    ///
    /// Comments are only retrieved for submissions inside the window.
    /// Submissions are processed concurrently, and processing stops at the
    /// first error; no partial tally is returned.
    pub async fn aggregate<F: Fetcher>(
        fetcher: &F,
        submissions: &[Submission],
        cutoff: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let tallies = submissions
            .iter()
            .map(|submission| Self::process(fetcher, submission, cutoff));
        let tallies = try_join_all(tallies).await?;

        let mut activity = Self::default();
        for tally in tallies {
            activity += tally;
        }
        Ok(activity)
    }

    async fn process<F: Fetcher>(
        fetcher: &F,
        submission: &Submission,
        cutoff: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let mut activity = Self::default();

        if !submission.is_since(cutoff) {
            trace!("Skipping {}: older than {cutoff}", submission.name());
            return Ok(activity);
        }

        activity.posts.add(submission);
        for comment in fetcher.list_all_comments(submission).await? {
            activity.comments.add(&comment);
        }
        Ok(activity)
    }

    /// Frequency table of submission authors.
    pub fn posts(&self) -> &AuthorCounter {
        &self.posts
    }

    /// Frequency table of comment authors.
    pub fn comments(&self) -> &AuthorCounter {
        &self.comments
    }

    /// Reduces the tallies to the `n` most active posters and commenters.
    pub fn rank(&self, n: usize) -> Report {
        Report {
            top_posters: self.posts.top_n(n),
            top_commenters: self.comments.top_n(n),
        }
    }
}

impl AddAssign for Activity {
    fn add_assign(&mut self, rhs: Self) {
        self.posts += rhs.posts;
        self.comments += rhs.comments;
    }
}

/// The most active posters and commenters in a subreddit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    top_posters: Vec<UserStat>,
    top_commenters: Vec<UserStat>,
}

impl Report {
    /// Most active submitters, most active first.
    pub fn top_posters(&self) -> &[UserStat] {
        &self.top_posters
    }

    /// Most active commenters, most active first.
    pub fn top_commenters(&self) -> &[UserStat] {
        &self.top_commenters
    }
}

/// Finds the [`TOP_N`] most active posters and commenters in `subreddit`
/// over the given `window`.
///
/// At most [`MAX_SUBMISSIONS`] of the subreddit's newest submissions are
/// considered.
pub async fn for_subreddit<F: Fetcher, C: Clock>(
    fetcher: &F,
    subreddit: &str,
    window: Window,
    clock: &C,
) -> Result<Report, Error> {
    let cutoff = window.cutoff(clock);
    info!(
        "Tallying r/{subreddit} over the last {} days (since {cutoff})",
        window.len_days()
    );

    let submissions = fetcher
        .list_recent_submissions(subreddit, MAX_SUBMISSIONS)
        .await?;
    debug!("Considering {} submissions", submissions.len());

    let activity = Activity::aggregate(fetcher, &submissions, cutoff).await?;
    debug!(
        "Counted {} posters and {} commenters",
        activity.posts().len(),
        activity.comments().len()
    );

    Ok(activity.rank(TOP_N))
}
