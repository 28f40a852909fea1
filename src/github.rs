//! # GitHub Repository Lister
//!
//! Enumerates an account's repositories through the GitHub REST API
//! (`GET /users/{account}/repos`), following pages until a short page is
//! returned.
//!
//! The API token is handed in explicitly at construction. It is sent as a
//! bearer token and never logged; the `Debug` impl redacts it.

use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use url::Url;

use crate::defaults::{user_agent, DEFAULT_API_URL, LISTING_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::repository::{RepositoryDescriptor, RepositoryLister};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Lists repositories from the GitHub REST API.
pub struct GitHubLister {
    api_url: Url,
    token: Option<String>,
    client: Client,
}

impl fmt::Debug for GitHubLister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubLister")
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GitHubLister {
    /// Creates a lister against `api_url` authenticating with `token`.
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        // A trailing slash makes `Url::join` append instead of replacing the
        // last segment (GitHub Enterprise bases look like `.../api/v3`).
        let mut base = api_url.trim_end_matches('/').to_string();
        base.push('/');
        let api_url = Url::parse(&base).map_err(|e| Error::InvalidConfig {
            message: format!("invalid API URL '{}': {}", api_url, e),
        })?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Api {
                url: api_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            api_url,
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    /// Creates a lister against public GitHub.
    pub fn github(token: Option<String>) -> Result<Self> {
        Self::new(DEFAULT_API_URL, token)
    }

    /// URL of one page of an account's repository listing.
    pub fn page_url(&self, account: &str, page: usize) -> Result<Url> {
        let mut url = self
            .api_url
            .join(&format!("users/{}/repos", account))
            .map_err(|e| Error::InvalidConfig {
                message: format!("invalid account '{}': {}", account, e),
            })?;
        url.query_pairs_mut()
            .append_pair("per_page", &LISTING_PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    fn fetch_page(&self, account: &str, page: usize) -> Result<Vec<RepositoryDescriptor>> {
        let url = self.page_url(account, page)?;
        let token = self.token.as_deref().ok_or_else(|| Error::Authentication {
            message: "no API token provided".to_string(),
        })?;

        debug!("[getrepos] GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, user_agent())
            .send()
            .map_err(|e| Error::Api {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, account, url.as_str(), &body));
        }

        response.json().map_err(|e| Error::Api {
            url: url.to_string(),
            message: format!("unexpected response body: {}", e),
        })
    }
}

impl RepositoryLister for GitHubLister {
    fn list(&self, account: &str) -> Result<Vec<RepositoryDescriptor>> {
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.fetch_page(account, page)?;
            let short = batch.len() < LISTING_PAGE_SIZE;
            repos.extend(batch);
            if short {
                break;
            }
            page += 1;
        }
        debug!("[{}] {} repos", account, repos.len());
        Ok(repos)
    }
}

/// Maps a non-success HTTP status to the error taxonomy.
fn status_error(status: StatusCode, account: &str, url: &str, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication {
            message: format!("{} from {}", status, url),
        },
        StatusCode::NOT_FOUND => Error::AccountNotFound {
            account: account.to_string(),
        },
        _ => Error::Api {
            url: url.to_string(),
            message: format!("{}: {}", status, body.trim()),
        },
    }
}
