use crate::clock::{Clock, DateTime, Utc};
use crate::reddit::service::{Resource, Service};
use crate::reddit::{Comment, Error, Fetcher, Submission, Subreddit};
use hypertyper::{HTTPError, HTTPResult};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn load_data(file: &str) -> String {
    fs::read_to_string(format!("tests/data/{file}.json")).expect("could not find test data")
}

/// Serves Reddit API responses from the JSON files in `tests/data`.
///
/// Resources without a matching file are treated as missing, as if
/// Reddit had returned a 404.
#[derive(Debug, Default)]
pub struct TestService {
    requests: Mutex<Vec<String>>,
}

impl TestService {
    pub fn fixture_name(resource: &Resource<'_>) -> String {
        match resource {
            Resource::New {
                subreddit, after, ..
            } => format!("new_{subreddit}_{}", after.unwrap_or("first")),
            Resource::Comments { article } => format!("comments_{article}"),
            Resource::Thread { article, comment } => format!("thread_{article}_{comment}"),
            Resource::MoreChildren { children, .. } => {
                format!("morechildren_{}", children.first().map_or("none", String::as_str))
            }
        }
    }

    /// Names of the fixtures that have been requested, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("poisoned lock").clone()
    }
}

impl Service for TestService {
    async fn get_resource(&self, resource: &Resource<'_>) -> HTTPResult<String> {
        let name = Self::fixture_name(resource);
        self.requests
            .lock()
            .expect("poisoned lock")
            .push(name.clone());
        fs::read_to_string(format!("tests/data/{name}.json"))
            .map_err(|_| HTTPError::Http(StatusCode::NOT_FOUND))
    }
}

impl Subreddit<TestService> {
    /// Returns a client that reads subreddit data from `tests/data`.
    ///
    /// `r/testsub` has five submissions over two pages, and `r/empty`
    /// has none.
    pub fn test() -> Self {
        do_logging();
        Subreddit::new_with_service(TestService::default())
    }
}

/// An in-memory [`Fetcher`] for exercising aggregation without any JSON.
#[derive(Debug, Default)]
pub struct StubFetcher {
    submissions: Vec<Submission>,
    comments: HashMap<String, Vec<Comment>>,
    failing_on: Option<String>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn submission(mut self, submission: Submission, comments: Vec<Comment>) -> Self {
        self.comments.insert(submission.id().to_string(), comments);
        self.submissions.push(submission);
        self
    }

    /// Fails when retrieving the comments for the submission with ID `id`.
    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing_on = Some(id.to_string());
        self
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// IDs of the submissions whose comments have been retrieved.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("poisoned lock").clone()
    }
}

impl Fetcher for StubFetcher {
    async fn list_recent_submissions(
        &self,
        _subreddit: &str,
        max_count: usize,
    ) -> Result<Vec<Submission>, Error> {
        Ok(self.submissions.iter().take(max_count).cloned().collect())
    }

    async fn list_all_comments(&self, submission: &Submission) -> Result<Vec<Comment>, Error> {
        self.fetched
            .lock()
            .expect("poisoned lock")
            .push(submission.id().to_string());
        if self.failing_on.as_deref() == Some(submission.id()) {
            Err(Error::Service(HTTPError::Http(
                StatusCode::TOO_MANY_REQUESTS,
            )))
        } else {
            Ok(self
                .comments
                .get(submission.id())
                .cloned()
                .unwrap_or_default())
        }
    }
}

pub struct FrozenClock {
    datetime: DateTime<Utc>,
}

impl FrozenClock {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        FrozenClock { datetime }
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        let datetime = DateTime::parse_from_rfc3339("2025-05-23T10:13:00-07:00")
            .expect("invalid date supplied")
            .with_timezone(&Utc);
        Self::new(datetime)
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.datetime
    }
}
