//! Low-level REST access to the backend's query endpoint.
//!
//! The backend exposes one route per table with declarative filters and
//! nested-relation selects in the query string; mutations opt into returning
//! the affected rows with a `Prefer` header.

use reqwest::header::HeaderMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Failure reported by the backend; the message is surfaced verbatim
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    msg: Option<String>,
}

/// Declarative query over one table: nested-relation select plus filter,
/// order and limit predicates rendered into the request query string.
#[derive(Debug, Clone)]
pub struct Query {
    table: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            params: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns and nested relations, e.g. `"id,name,author:profiles(name)"`
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.into(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.params.push((column.into(), "is.null".into()));
        self
    }

    pub fn in_list<V: ToString>(mut self, column: &str, values: &[V]) -> Self {
        let list = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.into(), format!("in.({list})")));
        self
    }

    pub fn ilike(mut self, column: &str, pattern: &str) -> Self {
        self.params
            .push((column.into(), format!("ilike.{pattern}")));
        self
    }

    /// Disjunction of ilike matches over several columns (search boxes)
    pub fn or_ilike(mut self, columns: &[&str], pattern: &str) -> Self {
        let clauses = columns
            .iter()
            .map(|c| format!("{c}.ilike.{pattern}"))
            .collect::<Vec<_>>()
            .join(",");
        self.params.push(("or".into(), format!("({clauses})")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".into(), format!("{column}.{dir}")));
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.params.push(("limit".into(), n.to_string()));
        self
    }

    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

async fn error_for(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.message.or(b.error).or(b.msg))
        .unwrap_or(text);
    BackendError::Api { status, message }
}

pub async fn get<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<T, BackendError> {
    let response = http.get(url).headers(headers).send().await?;

    if !response.status().is_success() {
        return Err(error_for(response).await);
    }

    Ok(response.json().await?)
}

pub async fn post<T: DeserializeOwned, B: Serialize>(
    http: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &B,
) -> Result<T, BackendError> {
    let response = http.post(url).headers(headers).json(body).send().await?;

    if !response.status().is_success() {
        return Err(error_for(response).await);
    }

    Ok(response.json().await?)
}

pub async fn post_void<B: Serialize>(
    http: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &B,
) -> Result<(), BackendError> {
    let response = http.post(url).headers(headers).json(body).send().await?;

    if !response.status().is_success() {
        return Err(error_for(response).await);
    }

    Ok(())
}

pub async fn patch<T: DeserializeOwned, B: Serialize>(
    http: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &B,
) -> Result<T, BackendError> {
    let response = http.patch(url).headers(headers).json(body).send().await?;

    if !response.status().is_success() {
        return Err(error_for(response).await);
    }

    Ok(response.json().await?)
}

pub async fn patch_void<B: Serialize>(
    http: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &B,
) -> Result<(), BackendError> {
    let response = http.patch(url).headers(headers).json(body).send().await?;

    if !response.status().is_success() {
        return Err(error_for(response).await);
    }

    Ok(())
}

pub async fn delete(
    http: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<(), BackendError> {
    let response = http.delete(url).headers(headers).send().await?;

    if !response.status().is_success() {
        return Err(error_for(response).await);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_equality_and_null_filters() {
        let q = Query::from("messages")
            .eq("ministry_id", "42")
            .is_null("parent_message_id")
            .order("created_at", true);
        assert_eq!(
            q.query_string(),
            "ministry_id=eq.42&parent_message_id=is.null&order=created_at.asc"
        );
    }

    #[test]
    fn renders_in_list_and_ilike() {
        let q = Query::from("profiles")
            .in_list("id", &["a", "b"])
            .ilike("name", "%ana%");
        assert_eq!(
            q.query_string(),
            "id=in.%28a%2Cb%29&name=ilike.%25ana%25"
        );
    }

    #[test]
    fn renders_or_ilike_over_columns() {
        let q = Query::from("profiles").or_ilike(&["name", "email"], "%jo%");
        assert_eq!(
            q.query_string(),
            "or=%28name.ilike.%25jo%25%2Cemail.ilike.%25jo%25%29"
        );
    }
}
