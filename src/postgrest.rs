//! Minimal PostgREST query builder
//!
//! Covers the operations this application issues: `select` with `eq`
//! filters and ordering, and row inserts/updates/deletes that return the
//! affected rows via `Prefer: return=representation`.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::Error;

/// Sort direction for `order`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Query builder scoped to a single table
pub struct Table {
    base_url: String,
    api_key: String,
    table: String,
    bearer: Option<String>,
    timeout: Option<Duration>,
    http_client: Client,
    query: Vec<(String, String)>,
}

impl Table {
    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        table: &str,
        http_client: Client,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            bearer: None,
            timeout,
            http_client,
            query: Vec::new(),
        }
    }

    /// Attach a session access token as the bearer credential
    pub fn with_auth(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    /// Restrict the returned columns
    pub fn select(mut self, columns: &str) -> Self {
        self.query.push(("select".to_string(), columns.to_string()));
        self
    }

    /// Equality filter
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.query.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    /// Sort the result set
    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        let direction = match order {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };
        self.query
            .push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    /// Limit the number of returned rows
    pub fn limit(mut self, count: i32) -> Self {
        self.query.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Fetch the matching rows
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let response = self.request(Method::GET)?.send().await?;
        read_rows(response).await
    }

    /// Insert rows, returning the created representation
    pub async fn insert<T, R>(&self, values: &T) -> Result<Vec<R>, Error>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .request(Method::POST)?
            .header("Prefer", "return=representation")
            .json(values)
            .send()
            .await?;
        read_rows(response).await
    }

    /// Update the matching rows, returning the new representation
    pub async fn update<T, R>(&self, values: &T) -> Result<Vec<R>, Error>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH)?
            .header("Prefer", "return=representation")
            .json(values)
            .send()
            .await?;
        read_rows(response).await
    }

    /// Delete the matching rows
    pub async fn delete(&self) -> Result<(), Error> {
        let response = self.request(Method::DELETE)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(Error::api(status, body));
        }
        Ok(())
    }

    fn build_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, self.table))?;
        url.query_pairs_mut()
            .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(url)
    }

    fn request(&self, method: Method) -> Result<RequestBuilder, Error> {
        let url = self.build_url()?;
        let mut request = self
            .http_client
            .request(method, url)
            .header("apikey", &self.api_key);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }
}

async fn read_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error response".to_string());
        return Err(Error::api(status, body));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
