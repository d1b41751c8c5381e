// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Clients for reading data from the Reddit API.

use crate::reddit::service::{Credentials, PAGE_SIZE, RedditService, Resource, Service};
use crate::reddit::thing::{self, Comment, CommentForest, MoreComments, Submission, SubmissionPage};
use hypertyper::HTTPError;
use log::{debug, trace};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Upper bound on the number of submissions considered in a single run.
///
/// Reddit will not page back further than this through a listing anyway.
pub const MAX_SUBMISSIONS: usize = 1000;

/// Retrieves submissions and comments from a community.
pub trait Fetcher {
    /// Retrieves up to `max_count` of the newest submissions in `subreddit`,
    /// newest first.
    fn list_recent_submissions(
        &self,
        subreddit: &str,
        max_count: usize,
    ) -> impl Future<Output = Result<Vec<Submission>, Error>> + Send;

    /// Retrieves every comment on `submission` as a flat list.
    ///
    /// Any "load more comments" and "continue this thread" placeholders
    /// are expanded, so the list represents the complete comment set.
    fn list_all_comments(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<Vec<Comment>, Error>> + Send;
}

/// Reads submissions and comments from subreddits.
#[derive(Debug)]
pub struct Subreddit<S: Service = RedditService> {
    service: S,
}

impl Subreddit {
    /// Creates a new client that connects to Reddit using `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        let service = RedditService::new(credentials);
        Self::new_with_service(service)
    }
}

impl<S: Service> Subreddit<S> {
    /// Creates a new client for retrieving subreddit data.
    ///
    /// `service` is the actual service implementation that will be used to
    /// retrieve information from Reddit.
    pub fn new_with_service(service: S) -> Self {
        Self { service }
    }

    #[cfg(test)]
    pub(crate) fn service(&self) -> &S {
        &self.service
    }

    async fn expand(
        &self,
        submission: &Submission,
        more: &MoreComments,
    ) -> Result<CommentForest, Error> {
        if more.is_continue_thread() {
            trace!(
                "Continuing thread below {} on {}",
                more.parent_id(),
                submission.name()
            );
            let resource = Resource::Thread {
                article: submission.id(),
                comment: more.parent_short_id(),
            };
            let data = self.service.get_resource(&resource).await?;
            Ok(CommentForest::parse_thread(&data, more.parent_id())?)
        } else {
            let mut forest = CommentForest::default();
            for children in more.children().chunks(PAGE_SIZE) {
                trace!(
                    "Loading {} more comments on {}",
                    children.len(),
                    submission.name()
                );
                let resource = Resource::MoreChildren {
                    link_id: submission.name(),
                    children,
                };
                let data = self.service.get_resource(&resource).await?;
                forest.extend(CommentForest::parse_more_children(&data)?);
            }
            Ok(forest)
        }
    }
}

impl<S: Service + Sync> Fetcher for Subreddit<S> {
    async fn list_recent_submissions(
        &self,
        subreddit: &str,
        max_count: usize,
    ) -> Result<Vec<Submission>, Error> {
        if !is_subreddit_name(subreddit) {
            return Err(Error::InvalidSubreddit(subreddit.to_string()));
        }

        let mut submissions = Vec::new();
        let mut after: Option<String> = None;

        while submissions.len() < max_count {
            let limit = (max_count - submissions.len()).min(PAGE_SIZE);
            let resource = Resource::New {
                subreddit,
                limit,
                after: after.as_deref(),
            };
            let data = self.service.get_resource(&resource).await?;
            let page = SubmissionPage::parse(&data)?;
            let next = page.after().map(String::from);
            let page = page.into_submissions();
            debug!("Retrieved {} submissions from r/{subreddit}", page.len());

            let exhausted = page.is_empty() || next.is_none();
            submissions.extend(page.into_iter().take(limit));
            if exhausted {
                break;
            }
            after = next;
        }

        Ok(submissions)
    }

    async fn list_all_comments(&self, submission: &Submission) -> Result<Vec<Comment>, Error> {
        let resource = Resource::Comments {
            article: submission.id(),
        };
        let data = self.service.get_resource(&resource).await?;
        let (comments, more) = CommentForest::parse_article(&data)?.into_parts();

        let mut seen = HashSet::new();
        let mut expanded = HashSet::new();
        let mut all_comments = Vec::new();
        let mut pending = VecDeque::from(more);
        absorb(&mut seen, &mut all_comments, comments);

        while let Some(more) = pending.pop_front() {
            if !expanded.insert((more.parent_id().to_string(), more.id().to_string())) {
                continue;
            }
            let (comments, more) = self.expand(submission, &more).await?.into_parts();
            absorb(&mut seen, &mut all_comments, comments);
            pending.extend(more);
        }

        debug!(
            "Retrieved {} comments on {}",
            all_comments.len(),
            submission.name()
        );
        Ok(all_comments)
    }
}

// Subreddit names are restricted to letters, digits, and underscores, so
// anything else would change the meaning of the request URI.
fn is_subreddit_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// morechildren can return comments we already have, so only keep new ones.
fn absorb(seen: &mut HashSet<String>, all_comments: &mut Vec<Comment>, comments: Vec<Comment>) {
    for comment in comments {
        if seen.insert(comment.id().to_string()) {
            all_comments.push(comment);
        }
    }
}

/// A client error.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Service(#[from] HTTPError),

    /// An error parsing data.
    #[error("Parse error: {0}")]
    Parse(#[from] thing::Error),

    /// The name given is not a valid subreddit name.
    #[error("Invalid subreddit name: {0:?}")]
    InvalidSubreddit(String),
}
