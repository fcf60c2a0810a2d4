//! Gerrit REST implementation of [`BranchService`].

use super::{BranchInfo, BranchService};
use crate::error::{BranchError, Result};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Prefix Gerrit puts in front of every JSON body to defeat XSSI.
const XSSI_PREFIX: &str = ")]}'";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct CreateBranchPayload<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    revision: &'a str,
}

/// Gerrit branch service using a blocking reqwest client.
pub struct GerritBranchService {
    client: Client,
    base_url: Option<String>,
    credentials: Option<(String, String)>,
    read_only: bool,
    cache: RefCell<HashMap<String, BTreeSet<String>>>,
}

impl GerritBranchService {
    /// Create an unconfigured service. A read-only service refuses every
    /// mutating call.
    pub fn new(read_only: bool) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: None,
            credentials: None,
            read_only,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Point the service at a Gerrit instance, e.g. `https://gerrit.example.org/r`.
    pub fn configure(&mut self, url: &str) -> Result<()> {
        Url::parse(url)
            .map_err(|e| BranchError::UserError(format!("invalid review server URL '{}': {}", url, e)))?;
        self.base_url = Some(url.trim_end_matches('/').to_string());
        Ok(())
    }

    /// Authenticate requests with HTTP basic auth (Gerrit's `/a/` endpoints).
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Drop the cached listing of `project` so the next query hits the server.
    fn refresh(&self, project: &str) {
        self.cache.borrow_mut().remove(project);
    }

    fn api_url(&self, path: &str) -> Result<String> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            BranchError::Unconfigured("review server base URL has not been set".to_string())
        })?;
        let auth = if self.credentials.is_some() { "/a" } else { "" };
        Ok(format!("{}{}{}", base, auth, path))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let response = response
            .error_for_status()
            .map_err(|e| BranchError::RemoteService(e.to_string()))?;
        let body = response.text()?;
        serde_json::from_str(strip_xssi_prefix(&body))
            .map_err(|e| BranchError::RemoteService(format!("unexpected response body: {}", e)))
    }
}

fn strip_xssi_prefix(body: &str) -> &str {
    body.strip_prefix(XSSI_PREFIX).unwrap_or(body).trim_start()
}

fn encoded(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

impl BranchService for GerritBranchService {
    fn list_branches(&self, project: &str) -> Result<BTreeSet<String>> {
        if let Some(cached) = self.cache.borrow().get(project) {
            debug!("using cached branch list for {}", project);
            return Ok(cached.clone());
        }

        let url = self.api_url(&format!("/projects/{}/branches/", encoded(project)))?;
        debug!("GET {}", url);
        let response = self.authorize(self.client.get(&url)).send()?;
        let branches: Vec<BranchInfo> = Self::read_json(response)?;

        let names: BTreeSet<String> = branches
            .into_iter()
            .filter_map(|b| b.reference.strip_prefix("refs/heads/").map(str::to_string))
            .collect();

        self.cache
            .borrow_mut()
            .insert(project.to_string(), names.clone());
        Ok(names)
    }

    fn create_branch(&self, project: &str, base: &str, new_branch: &str) -> Result<BranchInfo> {
        if self.read_only {
            return Err(BranchError::Unauthorized(format!(
                "refusing to create branch '{}' in '{}' on a read-only review server client",
                new_branch, project
            )));
        }

        let url = self.api_url(&format!(
            "/projects/{}/branches/{}",
            encoded(project),
            encoded(new_branch)
        ))?;
        let payload = CreateBranchPayload {
            reference: new_branch,
            revision: base,
        };

        info!("creating branch {} in {} from {}", new_branch, project, base);
        let response = self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()?;
        let created = Self::read_json(response)?;
        self.refresh(project);
        Ok(created)
    }
}
