use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DatabaseError;

const RETURN_REPRESENTATION: &str = "return=representation";

/// PostgREST client over a pooled `reqwest::Client`. Cloning is cheap and
/// shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.service_key)
            .map_err(|_| DatabaseError::Config("service key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|_| DatabaseError::Config("service key is not a valid header value".to_string()))?;

        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<reqwest::Response, DatabaseError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(DatabaseError::from_response(status.as_u16(), &error_text));
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body, extra_headers).await?;
        let bytes = response.bytes().await?;

        // DELETE/PATCH without representation answer with an empty body.
        let data = if bytes.is_empty() {
            serde_json::from_value(Value::Null)?
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(data)
    }

    /// `GET` a PostgREST path (filters included) and decode the rows.
    pub async fn select<T>(&self, path: &str) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, None).await
    }

    /// Like [`select`](Self::select) but only the first row.
    pub async fn select_one<T>(&self, path: &str) -> Result<Option<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.select(path).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert<T>(&self, path: &str, body: Value) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(Method::POST, path, Some(body), Some(prefer(RETURN_REPRESENTATION)))
            .await
    }

    /// Insert, merging into the row that collides on `on_conflict`.
    pub async fn upsert<T>(&self, path: &str, on_conflict: &str, body: Value) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let path = format!("{}?on_conflict={}", path, on_conflict);
        self.request_with_headers(
            Method::POST,
            &path,
            Some(body),
            Some(prefer("resolution=merge-duplicates,return=representation")),
        )
        .await
    }

    pub async fn update<T>(&self, path: &str, body: Value) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(Method::PATCH, path, Some(body), Some(prefer(RETURN_REPRESENTATION)))
            .await
    }

    pub async fn delete<T>(&self, path: &str) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(Method::DELETE, path, None, Some(prefer(RETURN_REPRESENTATION)))
            .await
    }

    /// Call a Postgres function. The function body runs in one transaction.
    pub async fn rpc<T>(&self, function: &str, args: Value) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(args)).await
    }

    /// Exact row count for a filtered path, read from `Content-Range`.
    pub async fn count(&self, path: &str) -> Result<i64, DatabaseError> {
        let response = self
            .send(Method::HEAD, path, None, Some(prefer("count=exact")))
            .await?;

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| DatabaseError::Api {
                status: response.status().as_u16(),
                message: "missing Content-Range header".to_string(),
            })?;

        parse_content_range_total(range).ok_or_else(|| DatabaseError::Api {
            status: response.status().as_u16(),
            message: format!("unparseable Content-Range header: {}", range),
        })
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn prefer(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static(value));
    headers
}

/// `0-24/3573` or `*/0` → total after the slash.
fn parse_content_range_total(range: &str) -> Option<i64> {
    range.rsplit_once('/')?.1.trim().parse().ok()
}
