//! PostgREST (`/rest/v1`) client for the bookmarks table.

use super::{ApiError, ApiResult, RecordStore, SupabaseAuth};
use crate::config::EnvConfig;
use crate::models::{Bookmark, NewBookmark, BOOKMARKS_TABLE};
use reqwest::{Method, RequestBuilder};

/// Horizontal filter, rendered as a `column=op.value` query pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Filter {
    column: String,
    op: &'static str,
    value: String,
}

impl Filter {
    pub fn eq(column: &str, value: &str) -> Self {
        Self {
            column: column.to_string(),
            op: "eq",
            value: value.to_string(),
        }
    }

    pub fn query_pair(&self) -> (String, String) {
        (self.column.clone(), format!("{}.{}", self.op, self.value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Order {
    column: String,
    ascending: bool,
}

impl Order {
    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
        }
    }

    pub fn query_pair(&self) -> (String, String) {
        let dir = if self.ascending { "asc" } else { "desc" };
        ("order".to_string(), format!("{}.{dir}", self.column))
    }
}

pub(crate) fn select_query(filter: &Filter, order: &Order) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        filter.query_pair(),
        order.query_pair(),
    ]
}

#[derive(Clone, Debug)]
pub(crate) struct SupabaseStore {
    config: EnvConfig,
    auth: SupabaseAuth,
}

impl SupabaseStore {
    pub fn new(config: EnvConfig, auth: SupabaseAuth) -> Self {
        Self { config, auth }
    }

    async fn request(&self, method: Method, table: &str) -> ApiResult<RequestBuilder> {
        let token = self.auth.access_token().await?;
        Ok(reqwest::Client::new()
            .request(method, self.config.rest_url(table))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token))
    }

    async fn send(req: RequestBuilder, ctx: &str) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;
        if res.status().is_success() {
            Ok(res)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body, ctx))
        }
    }

    pub async fn insert<T: serde::Serialize>(&self, table: &str, record: &T) -> ApiResult<()> {
        let req = self
            .request(Method::POST, table)
            .await?
            .header("Prefer", "return=minimal")
            .json(record);
        Self::send(req, "Insert failed").await.map(|_| ())
    }

    pub async fn select<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        filter: &Filter,
        order: &Order,
    ) -> ApiResult<Vec<T>> {
        let req = self
            .request(Method::GET, table)
            .await?
            .query(&select_query(filter, order));
        let res = Self::send(req, "Select failed").await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub async fn delete(&self, table: &str, filter: &Filter) -> ApiResult<()> {
        let req = self
            .request(Method::DELETE, table)
            .await?
            .query(&[filter.query_pair()]);
        Self::send(req, "Delete failed").await.map(|_| ())
    }
}

impl RecordStore for SupabaseStore {
    async fn insert_bookmark(&self, bookmark: &NewBookmark) -> ApiResult<()> {
        self.insert(BOOKMARKS_TABLE, bookmark).await
    }

    async fn select_bookmarks(&self, user_id: &str) -> ApiResult<Vec<Bookmark>> {
        self.select(
            BOOKMARKS_TABLE,
            &Filter::eq("user_id", user_id),
            &Order::desc("created_at"),
        )
        .await
    }

    async fn delete_bookmark(&self, id: &str) -> ApiResult<()> {
        self.delete(BOOKMARKS_TABLE, &Filter::eq("id", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_eq_query_pair() {
        assert_eq!(
            Filter::eq("user_id", "u-1").query_pair(),
            ("user_id".to_string(), "eq.u-1".to_string())
        );
    }

    #[test]
    fn test_select_query_lists_columns_filter_and_order() {
        let q = select_query(&Filter::eq("user_id", "u1"), &Order::desc("created_at"));
        assert_eq!(
            q,
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }
}
