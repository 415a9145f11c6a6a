//! REST backend gateway over reqwest.
//!
//! # Security Note - Logging
//!
//! The API token is sent as a bearer `Authorization` header marked
//! sensitive, so reqwest and `http` print it as `Sensitive` in debug
//! output. It is held as a [`SecretString`] until the header is built.

use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::record::{Record, RecordId};
use crate::resources::ResourceSpec;

use super::{ApiError, ListFilters, ListPage, ResourceGateway, unwrap_record};

/// Gateway for one resource collection on the REST backend
#[derive(Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
    spec: ResourceSpec,
}

impl HttpGateway {
    pub fn new(base_url: &str, spec: ResourceSpec) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DeskError::Config(format!(
                "API base URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            token: None,
            spec,
        })
    }

    /// Build from configuration, which must name a base URL
    pub fn from_config(config: &Config, spec: ResourceSpec) -> Result<Self> {
        let base_url = config.base_url().ok_or_else(|| {
            DeskError::Config(
                "API base URL not configured. Run: projectdesk config set api.base_url <url>"
                    .to_string(),
            )
        })?;
        let gateway = Self::new(&base_url, spec)?;
        Ok(match config.api_token() {
            Some(token) => gateway.with_token(SecretString::from(token)),
            None => gateway,
        })
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// `<base>/<resource path>[/<id segments>]`
    pub fn url_for(&self, id: Option<&RecordId>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                DeskError::Config(format!("API base URL '{}' cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(self.spec.path_segments());
            if let Some(id) = id {
                segments.extend(id.segments());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, bearer_header(token)?);
        }
        Ok(builder)
    }

    /// Send once; non-2xx becomes an error, an empty body reads as `null`
    async fn send(&self, builder: RequestBuilder, record: Option<&RecordId>) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, resource = %self.spec.name, "request failed");
            let id = record.map(ToString::to_string);
            return Err(ApiError::from_response(status, &body, self.spec.title.clone())
                .into_desk_error(id.as_deref()));
        }

        if body.trim().is_empty() || status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn bearer_header(token: &SecretString) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|_| DeskError::Config("API token contains invalid characters".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Mutation responses may omit the record; fall back to what was sent
fn record_or(value: Value, sent: &Record) -> Result<Record> {
    match value {
        Value::Null => Ok(sent.clone()),
        other => unwrap_record(other),
    }
}

impl ResourceGateway for HttpGateway {
    fn resource(&self) -> &ResourceSpec {
        &self.spec
    }

    async fn list(&self, filters: &ListFilters) -> Result<ListPage> {
        let mut url = self.url_for(None)?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        tracing::debug!(%url, "list");
        let body = self.send(self.request(Method::GET, url)?, None).await?;
        ListPage::from_value(body)
    }

    async fn get(&self, id: &RecordId) -> Result<Record> {
        let url = self.url_for(Some(id))?;
        tracing::debug!(%url, "get");
        let body = self.send(self.request(Method::GET, url)?, Some(id)).await?;
        unwrap_record(body)
    }

    async fn create(&self, payload: &Record) -> Result<Record> {
        let url = self.url_for(None)?;
        tracing::debug!(%url, "create");
        let builder = self.request(Method::POST, url)?.json(payload);
        let body = self.send(builder, None).await?;
        record_or(body, payload)
    }

    async fn update(&self, id: &RecordId, changes: &Record) -> Result<Record> {
        let url = self.url_for(Some(id))?;
        tracing::debug!(%url, "update");
        let builder = self.request(Method::PATCH, url)?.json(changes);
        let body = self.send(builder, Some(id)).await?;
        record_or(body, changes)
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let url = self.url_for(Some(id))?;
        tracing::debug!(%url, "delete");
        self.send(self.request(Method::DELETE, url)?, Some(id)).await?;
        Ok(())
    }
}
