// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! A "thing" in the Reddit sense.
//!
//! Historically in the Reddit API and its old source code, a "Thing" was
//! any element of the Reddit system: users, posts, comments, etc. This
//! module encapsulates that idea and provides an easy way to more or less
//! work with JSON data from the Reddit API.

use crate::clock::{DateTime, HasAge, Utc};
use crate::count::HasAuthor;
use serde::Deserialize;
use serde::de::{self, Deserializer};
use thiserror::Error;

/// Username Reddit reports for accounts that have been deleted and for
/// things that have been removed.
const DELETED: &str = "[deleted]";

/// A parsing error.
#[derive(Debug, Error)]
pub enum Error {
    /// The response was not the JSON structure we expected.
    #[error("Could not parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Standard result type for parsing Reddit things.
pub type Result<T> = std::result::Result<T, Error>;

/// A Reddit post.
#[derive(Clone, Debug, Deserialize)]
pub struct Submission {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "deserialize_author")]
    author: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    created_utc: DateTime<Utc>,
}

impl Submission {
    /// Creates a submission from its parts.
    ///
    /// `id` is the base36 identifier of the post, without the `t3_` prefix.
    pub fn new(id: impl Into<String>, author: Option<&str>, created_utc: DateTime<Utc>) -> Self {
        let id = id.into();
        let name = format!("t3_{id}");
        let author = author.map(String::from);
        Self {
            id,
            name,
            author,
            created_utc,
        }
    }

    /// The submission's base36 identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The submission's fullname, i.e., its ID prefixed with `t3_`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl HasAuthor for Submission {
    fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

impl HasAge for Submission {
    fn created_utc(&self) -> DateTime<Utc> {
        self.created_utc
    }
}

/// A Reddit comment.
#[derive(Clone, Debug, Deserialize)]
pub struct Comment {
    id: String,
    #[serde(default, deserialize_with = "deserialize_author")]
    author: Option<String>,
    #[serde(default, deserialize_with = "deserialize_replies")]
    replies: Vec<CommentThing>,
}

impl Comment {
    /// Creates a comment with no replies.
    pub fn new(id: impl Into<String>, author: Option<&str>) -> Self {
        let id = id.into();
        let author = author.map(String::from);
        Self {
            id,
            author,
            replies: vec![],
        }
    }

    /// The comment's base36 identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl HasAuthor for Comment {
    fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

/// A placeholder for comments that Reddit did not include in a response.
///
/// In the web interface these are the "load more comments" and "continue
/// this thread" links.
#[derive(Clone, Debug, Deserialize)]
pub struct MoreComments {
    id: String,
    parent_id: String,
    #[serde(default)]
    children: Vec<String>,
}

impl MoreComments {
    /// Identifier of the placeholder itself.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fullname of the comment or submission the missing comments reply to.
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Base36 IDs of the missing comments.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// True if this placeholder is a "continue this thread" link.
    ///
    /// Reddit does not list the missing IDs for these placeholders; the
    /// thread has to be loaded starting from its parent comment instead.
    pub fn is_continue_thread(&self) -> bool {
        self.children.is_empty()
    }

    /// The parent's base36 ID, i.e., [`MoreComments::parent_id()`] without
    /// its type prefix.
    pub fn parent_short_id(&self) -> &str {
        self.parent_id
            .split_once('_')
            .map_or(self.parent_id.as_str(), |(_, id)| id)
    }
}

/// A single child of a comment listing.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
enum CommentThing {
    #[serde(rename = "t1")]
    Comment(Comment),

    #[serde(rename = "more")]
    More(MoreComments),
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default)]
    after: Option<String>,
    children: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Child<T> {
    data: T,
}

/// A `replies` field is an empty string when there are no replies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Replies {
    Listing(Listing<CommentThing>),
    Empty(#[allow(dead_code)] String),
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<CommentThing>,
}

/// One page of a subreddit's submissions.
#[derive(Debug)]
pub struct SubmissionPage {
    submissions: Vec<Submission>,
    after: Option<String>,
}

impl SubmissionPage {
    /// Parses a page of submissions.
    ///
    /// `data` is the result of a call to `/r/<subreddit>/new`.
    pub fn parse(data: &str) -> Result<Self> {
        let listing: Listing<Child<Submission>> = serde_json::from_str(data)?;
        let submissions = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect();
        let after = listing.data.after.filter(|after| !after.is_empty());
        Ok(Self { submissions, after })
    }

    /// Fullname of the last submission on the page, which is used to
    /// request the next page, or `None` if this is the last page.
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    /// Consumes the page and returns its submissions.
    pub fn into_submissions(self) -> Vec<Submission> {
        self.submissions
    }
}

/// A flattened set of comments, along with placeholders for comments
/// that still need to be loaded.
#[derive(Debug, Default)]
pub struct CommentForest {
    comments: Vec<Comment>,
    more: Vec<MoreComments>,
}

impl CommentForest {
    /// Parses the comment tree attached to a submission.
    ///
    /// `data` is the result of a call to `/comments/<article>`, which
    /// returns the submission itself followed by its comments.
    pub fn parse_article(data: &str) -> Result<Self> {
        let (_, comments): (de::IgnoredAny, Listing<CommentThing>) =
            serde_json::from_str(data)?;
        Ok(Self::flatten(comments.data.children))
    }

    /// Parses comments loaded from a "load more comments" placeholder.
    ///
    /// `data` is the result of a call to `/api/morechildren` with
    /// `api_type=json`.
    pub fn parse_more_children(data: &str) -> Result<Self> {
        let resp: MoreChildrenResponse = serde_json::from_str(data)?;
        let things = resp.json.data.map(|data| data.things).unwrap_or_default();
        Ok(Self::flatten(things))
    }

    /// Parses comments loaded from a "continue this thread" placeholder.
    ///
    /// `data` is the result of a call to `/comments/<article>/_/<comment>`,
    /// where the thread is rooted at the comment whose fullname is
    /// `parent_id`. Only the replies to that comment are returned, since
    /// the comment itself has already been seen.
    pub fn parse_thread(data: &str, parent_id: &str) -> Result<Self> {
        let (_, comments): (de::IgnoredAny, Listing<CommentThing>) =
            serde_json::from_str(data)?;
        let replies = comments
            .data
            .children
            .into_iter()
            .find_map(|thing| match thing {
                CommentThing::Comment(comment) if is_fullname_of(parent_id, "t1", &comment.id) => {
                    Some(comment.replies)
                }
                _ => None,
            })
            .unwrap_or_default();
        Ok(Self::flatten(replies))
    }

    /// Every comment in the forest, in depth-first order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Placeholders for comments that were not included in the response.
    pub fn more(&self) -> &[MoreComments] {
        &self.more
    }

    /// Moves every comment and placeholder from `other` into this forest.
    pub fn extend(&mut self, other: CommentForest) {
        self.comments.extend(other.comments);
        self.more.extend(other.more);
    }

    /// Consumes the forest, returning its comments and placeholders.
    pub fn into_parts(self) -> (Vec<Comment>, Vec<MoreComments>) {
        (self.comments, self.more)
    }

    fn flatten(things: Vec<CommentThing>) -> Self {
        let mut forest = Self::default();
        let mut stack: Vec<CommentThing> = things.into_iter().rev().collect();
        while let Some(thing) = stack.pop() {
            match thing {
                CommentThing::Comment(mut comment) => {
                    let replies = std::mem::take(&mut comment.replies);
                    stack.extend(replies.into_iter().rev());
                    forest.comments.push(comment);
                }
                CommentThing::More(more) => forest.more.push(more),
            }
        }
        forest
    }
}

fn is_fullname_of(fullname: &str, kind: &str, id: &str) -> bool {
    fullname
        .split_once('_')
        .is_some_and(|(prefix, rest)| prefix == kind && rest == id)
}

fn deserialize_author<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let author = Option::<String>::deserialize(deserializer)?;
    Ok(author.filter(|name| !name.is_empty() && name != DELETED))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp = f64::deserialize(deserializer)?;
    DateTime::from_timestamp(timestamp.trunc() as i64, 0)
        .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {timestamp}")))
}

fn deserialize_replies<'de, D>(deserializer: D) -> std::result::Result<Vec<CommentThing>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Replies>::deserialize(deserializer)? {
        Some(Replies::Listing(listing)) => Ok(listing.data.children),
        Some(Replies::Empty(_)) | None => Ok(vec![]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::load_data;
    use pretty_assertions::assert_eq;

    fn ids(comments: &[Comment]) -> Vec<&str> {
        comments.iter().map(Comment::id).collect()
    }

    mod submission_page {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn it_parses_submissions() {
            let page = SubmissionPage::parse(&load_data("new_testsub_first")).unwrap();
            let submissions = page.into_submissions();
            let ids: Vec<&str> = submissions.iter().map(Submission::id).collect();
            assert_eq!(ids, vec!["p1", "p2", "p3"]);
        }

        #[test]
        fn it_parses_submission_metadata() {
            let page = SubmissionPage::parse(&load_data("new_testsub_first")).unwrap();
            let submission = &page.into_submissions()[0];
            let expected_date = DateTime::parse_from_rfc3339("2025-05-22T17:13:00Z").unwrap();
            assert_eq!(submission.name(), "t3_p1");
            assert_eq!(submission.author(), Some("alice"));
            assert_eq!(submission.created_utc(), expected_date);
        }

        #[test]
        fn it_treats_deleted_authors_as_missing() {
            let page = SubmissionPage::parse(&load_data("new_testsub_first")).unwrap();
            let submission = &page.into_submissions()[2];
            assert_eq!(submission.id(), "p3");
            assert_eq!(submission.author(), None);
        }

        #[test]
        fn it_returns_a_token_for_the_next_page() {
            let page = SubmissionPage::parse(&load_data("new_testsub_first")).unwrap();
            assert_eq!(page.after(), Some("t3_p3"));
        }

        #[test]
        fn it_returns_no_token_on_the_last_page() {
            let page = SubmissionPage::parse(&load_data("new_testsub_t3_p3")).unwrap();
            assert_eq!(page.after(), None);
        }

        #[test]
        fn it_parses_empty_pages() {
            let page = SubmissionPage::parse(&load_data("new_empty_first")).unwrap();
            assert_eq!(page.after(), None);
            assert!(page.into_submissions().is_empty());
        }

        #[test]
        fn it_fails_on_malformed_json() {
            let page = SubmissionPage::parse("{\"kind\": \"Listing\"");
            assert!(matches!(page, Err(Error::Json(_))));
        }
    }

    mod comment_forest {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn it_flattens_nested_comments_depth_first() {
            let forest = CommentForest::parse_article(&load_data("comments_p1")).unwrap();
            assert_eq!(ids(forest.comments()), vec!["c1", "c2", "c3"]);
        }

        #[test]
        fn it_treats_deleted_comment_authors_as_missing() {
            let forest = CommentForest::parse_article(&load_data("comments_p1")).unwrap();
            let authors: Vec<Option<&str>> =
                forest.comments().iter().map(Comment::author).collect();
            assert_eq!(authors, vec![Some("alice"), Some("bob"), None]);
        }

        #[test]
        fn it_collects_placeholders_for_missing_comments() {
            let forest = CommentForest::parse_article(&load_data("comments_p1")).unwrap();
            let more = forest.more();
            assert_eq!(more.len(), 2);

            assert_eq!(more[0].id(), "_");
            assert!(more[0].is_continue_thread());
            assert_eq!(more[0].parent_id(), "t1_c3");
            assert_eq!(more[0].parent_short_id(), "c3");

            assert_eq!(more[1].id(), "m1");
            assert!(!more[1].is_continue_thread());
            assert_eq!(more[1].children(), &["c4".to_string(), "c5".to_string()]);
        }

        #[test]
        fn it_parses_submissions_without_comments() {
            let forest = CommentForest::parse_article(&load_data("comments_p2")).unwrap();
            assert!(forest.comments().is_empty());
            assert!(forest.more().is_empty());
        }

        #[test]
        fn it_parses_more_children() {
            let forest = CommentForest::parse_more_children(&load_data("morechildren_c4")).unwrap();
            assert_eq!(ids(forest.comments()), vec!["c4", "c5"]);
            assert_eq!(forest.more().len(), 1);
            assert_eq!(forest.more()[0].children(), &["c6".to_string()]);
        }

        #[test]
        fn it_parses_empty_more_children_responses() {
            let forest =
                CommentForest::parse_more_children(r#"{"json": {"errors": []}}"#).unwrap();
            assert!(forest.comments().is_empty());
        }

        #[test]
        fn it_parses_only_the_replies_of_a_continued_thread() {
            let forest =
                CommentForest::parse_thread(&load_data("thread_p1_c3"), "t1_c3").unwrap();
            let (comments, more) = forest.into_parts();
            assert_eq!(ids(&comments), vec!["c7"]);
            assert_eq!(comments[0].author(), Some("erin"));
            assert!(more.is_empty());
        }

        #[test]
        fn it_parses_nothing_if_the_thread_parent_is_missing() {
            let forest =
                CommentForest::parse_thread(&load_data("thread_p1_c3"), "t1_zzz").unwrap();
            assert!(forest.comments().is_empty());
        }
    }

    mod more_comments {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn it_returns_the_parent_id_unchanged_if_it_has_no_prefix() {
            let more: MoreComments =
                serde_json::from_str(r#"{"id": "m", "parent_id": "abc", "children": []}"#).unwrap();
            assert_eq!(more.parent_short_id(), "abc");
        }
    }
}
