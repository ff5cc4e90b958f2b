//! Minimal client for the hosted row API (PostgREST dialect).

use std::fmt::Display;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::site::BackendError;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Query-string builder for filters, ordering and projections.
#[derive(Clone, Debug, Default)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.into(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params.push(("order".into(), format!("{column}.{dir}")));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".into(), n.to_string()));
        self
    }

    pub fn on_conflict(mut self, column: &str) -> Self {
        self.params.push(("on_conflict".into(), column.into()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

pub struct PostgrestClient {
    client: Client,
    rest_url: String,
    key: String,
}

impl PostgrestClient {
    pub fn new(client: Client, base_url: &str, key: &str) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            key: key.to_string(),
        }
    }

    fn request(&self, method: Method, table: &str, query: &Query) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .query(query.params())
    }

    /// Map non-success responses to `BackendError`.
    async fn check(resp: Response) -> Result<Response, BackendError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        // A single-object request that matched no rows answers 406.
        if status == reqwest::StatusCode::NOT_ACCEPTABLE {
            return Err(BackendError::NotFound);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(BackendError::Api {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, BackendError> {
        let resp = self.request(Method::GET, table, query).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn insert_one<B, T>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::POST, table, query)
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Insert-or-merge one row on the query's `on_conflict` column, returning it.
    pub async fn upsert_one<B, T>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::POST, table, query)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Insert-or-merge many rows without reading them back.
    pub async fn upsert_many<B>(
        &self,
        table: &str,
        query: &Query,
        rows: &[B],
    ) -> Result<(), BackendError>
    where
        B: Serialize,
    {
        let resp = self
            .request(Method::POST, table, query)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn update_one<B, T>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::PATCH, table, query)
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(body)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn update<B>(&self, table: &str, query: &Query, body: &B) -> Result<(), BackendError>
    where
        B: Serialize + ?Sized,
    {
        let resp = self
            .request(Method::PATCH, table, query)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError> {
        let resp = self.request(Method::DELETE, table, query).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
