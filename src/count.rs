// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! General-purpose counting capabilities.

use counter::Counter;
use std::ops::AddAssign;

/// Number of entries shown in each ranking during a standard run.
pub const TOP_N: usize = 10;

/// A thing that may have been written by a Redditor.
pub trait HasAuthor {
    /// Username of the thing's author, or `None` if the account was
    /// deleted or the thing was removed.
    fn author(&self) -> Option<&str>;
}

/// A pair of username and the number of times that user appeared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserStat {
    username: String,
    count: usize,
}

impl UserStat {
    /// Creates a new user stat.
    pub fn new(username: impl Into<String>, count: usize) -> Self {
        let username = username.into();
        Self { username, count }
    }

    /// The Redditor's username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Number of times the Redditor appeared.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl From<(String, usize)> for UserStat {
    fn from((username, count): (String, usize)) -> Self {
        Self { username, count }
    }
}

/// A frequency table of Reddit authors.
///
/// Tables are built incrementally from things with an author, and tables
/// built independently can be merged into one another without losing any
/// counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthorCounter {
    counts: Counter<String>,
}

impl AuthorCounter {
    /// Creates an empty frequency table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every authored item in `iter`.
    ///
    /// Items without an author are skipped.
    pub fn from_iter<'a, T: HasAuthor + 'a>(iter: impl IntoIterator<Item = &'a T>) -> Self {
        let mut counter = Self::new();
        for item in iter {
            counter.add(item);
        }
        counter
    }

    /// Counts a single item, if it has an author.
    pub fn add<T: HasAuthor + ?Sized>(&mut self, item: &T) {
        if let Some(author) = item.author() {
            self.increment(author);
        }
    }

    /// Increments the count for `author` by one.
    ///
    /// Empty usernames are never counted.
    pub fn increment(&mut self, author: &str) {
        if !author.is_empty() {
            *self.counts.entry(author.to_string()).or_insert(0) += 1;
        }
    }

    /// Number of times `author` has been counted.
    pub fn count(&self, author: &str) -> usize {
        self.counts.get(author).copied().unwrap_or(0)
    }

    /// Number of distinct authors in the table.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no authors have been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Folds every count from `other` into this table.
    pub fn merge(&mut self, other: AuthorCounter) {
        for (author, count) in other.counts.into_map() {
            *self.counts.entry(author).or_insert(0) += count;
        }
    }

    /// The `n` most frequent authors, ordered by descending count.
    ///
    /// Fewer than `n` stats are returned if fewer than `n` authors have
    /// been counted. The relative order of authors with equal counts is
    /// not guaranteed.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtally::count::AuthorCounter;
    ///
    /// let mut counter = AuthorCounter::new();
    /// counter.increment("alice");
    /// counter.increment("alice");
    /// counter.increment("bob");
    ///
    /// let top = counter.top_n(10);
    /// assert_eq!(top.len(), 2);
    /// assert_eq!(top[0].username(), "alice");
    /// assert_eq!(top[0].count(), 2);
    /// ```
    pub fn top_n(&self, n: usize) -> Vec<UserStat> {
        self.counts
            .k_most_common_ordered(n)
            .into_iter()
            .map(UserStat::from)
            .collect()
    }
}

impl AddAssign for AuthorCounter {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(rhs);
    }
}
