// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Reddit API.
//!
//! Service structures in this module provide a low-level way to interact
//! with the Reddit API over HTTPS, essentially a specialized HTTPS client
//! specifically for Reddit.

use hypertyper::{HTTPClient, HTTPClientFactory, HTTPError, HTTPGet, HTTPResult, IntoUrl};
use itertools::Itertools;
use log::debug;
use reqwest::header;
use serde::Deserialize;
use std::fmt;
use tokio::sync::OnceCell;

const TOKEN_URI: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Largest number of things Reddit returns in a single listing, and the
/// largest number of comment IDs it will expand in a single request.
pub const PAGE_SIZE: usize = 100;

/// Credentials for a Reddit "script" or "web" application.
///
/// Applications can be registered at <https://www.reddit.com/prefs/apps>.
#[derive(Clone, Default)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    user_agent: String,
}

impl Credentials {
    /// Creates a new set of application credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user_agent: user_agent.into(),
        }
    }

    /// The application's client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The application's client secret.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// User agent sent with every request.
    ///
    /// Reddit asks that this uniquely identify the application.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// A Reddit API resource that can be retrieved by a [`Service`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource<'a> {
    /// A page of a subreddit's newest submissions.
    New {
        /// Name of the subreddit, without the `r/` prefix.
        subreddit: &'a str,
        /// Maximum number of submissions on the page.
        limit: usize,
        /// Fullname of the submission the page starts after.
        after: Option<&'a str>,
    },

    /// A submission and the first batch of its comment tree.
    Comments {
        /// Base36 ID of the submission.
        article: &'a str,
    },

    /// A comment thread, rooted at `comment`, that was too deep to be
    /// included with the rest of the submission's comments.
    Thread {
        /// Base36 ID of the submission.
        article: &'a str,
        /// Base36 ID of the comment at the root of the thread.
        comment: &'a str,
    },

    /// Comments that were left out of a comment tree.
    MoreChildren {
        /// Fullname of the submission.
        link_id: &'a str,
        /// Base36 IDs of the missing comments.
        children: &'a [String],
    },
}

impl Resource<'_> {
    /// Path of the resource relative to the API root.
    pub fn path(&self) -> String {
        match self {
            Resource::New { subreddit, .. } => format!("/r/{subreddit}/new"),
            Resource::Comments { article } => format!("/comments/{article}"),
            Resource::Thread { article, comment } => format!("/comments/{article}/_/{comment}"),
            Resource::MoreChildren { .. } => String::from("/api/morechildren"),
        }
    }

    /// Query string for the resource, including the leading `?`.
    pub fn query_string(&self) -> String {
        let mut params = vec![(String::from("raw_json"), String::from("1"))];
        match self {
            Resource::New { limit, after, .. } => {
                params.push((String::from("limit"), limit.to_string()));
                if let Some(after) = after {
                    params.push((String::from("after"), after.to_string()));
                }
            }
            Resource::Comments { .. } | Resource::Thread { .. } => {}
            Resource::MoreChildren { link_id, children } => {
                params.push((String::from("api_type"), String::from("json")));
                params.push((String::from("link_id"), link_id.to_string()));
                params.push((String::from("children"), children.join(",")));
            }
        }
        let qs = params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .join("&");
        format!("?{qs}")
    }

    /// Full URI of the resource.
    pub fn uri(&self) -> String {
        format!("{API_BASE}{}{}", self.path(), self.query_string())
    }
}

/// A service for retrieving data from the Reddit API.
///
/// Using this trait, clients can implement different ways of connecting
/// to the Reddit API, such as an actual connector for production code,
/// and a mocked connector for testing purposes.
pub trait Service {
    /// Retrieves the given `resource` and returns its raw JSON body.
    fn get_resource(&self, resource: &Resource<'_>)
    -> impl Future<Output = HTTPResult<String>> + Send;
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

/// A service that contacts the Reddit API directly to retrieve information.
///
/// The service authenticates as an application using Reddit's
/// [application-only OAuth] flow. The access token is requested the first
/// time a resource is retrieved and reused for the life of the service.
///
/// [application-only OAuth]: https://github.com/reddit-archive/reddit/wiki/OAuth2#application-only-oauth
#[derive(Debug)]
pub struct RedditService {
    client: HTTPClient,
    credentials: Credentials,
    token: OnceCell<String>,
}

impl RedditService {
    /// Creates a new Reddit service that authenticates using `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        let factory = HTTPClientFactory::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = factory.create();
        let token = OnceCell::new();
        Self {
            client,
            credentials,
            token,
        }
    }

    async fn token(&self) -> HTTPResult<&str> {
        let token = self
            .token
            .get_or_try_init(|| self.request_token())
            .await?;
        Ok(token.as_str())
    }

    async fn request_token(&self) -> HTTPResult<String> {
        debug!("Requesting application access token from {TOKEN_URI}");
        let resp = self
            .client
            .post(TOKEN_URI)
            .header(header::USER_AGENT, self.credentials.user_agent())
            .basic_auth(
                self.credentials.client_id(),
                Some(self.credentials.client_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !resp.status().is_success() {
            Err(HTTPError::Http(resp.status()))
        } else {
            let token = resp.json::<AccessToken>().await?;
            Ok(token.access_token)
        }
    }
}

impl HTTPGet for RedditService {
    /// Sends an authenticated GET request to a Reddit API endpoint and
    /// returns the raw body.
    async fn get<U>(&self, uri: U) -> HTTPResult<String>
    where
        U: IntoUrl + Send,
    {
        let token = self.token().await?;
        let resp = self
            .client
            .get(uri)
            .header(header::USER_AGENT, self.credentials.user_agent())
            .bearer_auth(token)
            .send()
            .await?;

        if !resp.status().is_success() {
            Err(HTTPError::Http(resp.status()))
        } else {
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .ok_or(HTTPError::MissingContentType)?
                .to_str()?;
            if !content_type.starts_with("application/json") {
                Err(HTTPError::UnexpectedContentType(content_type.to_string()))
            } else {
                Ok(resp.text().await?)
            }
        }
    }
}

impl Service for RedditService {
    async fn get_resource(&self, resource: &Resource<'_>) -> HTTPResult<String> {
        let uri = resource.uri();
        debug!("GET {uri}");
        self.get(&uri).await
    }
}
