//! HTTP implementation of [`TodoApi`].

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use todo_core::api::ApiFuture;
use todo_core::{ApiError, CreateTodoRequest, Todo, TodoApi, TodoId, TodoPatch};

/// Default service location.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Todo service client over HTTP
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    api_url: String,
}

impl HttpTodoApi {
    /// Create a client for the API mounted at `api_url` (e.g. `http://localhost:5000/api`)
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            api_url,
        }
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.api_url)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.api_url)
    }

    async fn decode<T: DeserializeOwned>(response: Result<Response, reqwest::Error>) -> Result<T, ApiError> {
        let response = response.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl Default for HttpTodoApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl TodoApi for HttpTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move { Self::decode(self.client.get(self.todos_url()).send().await).await })
    }

    fn create(&self, text: String) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.todos_url())
                .json(&CreateTodoRequest::new(text))
                .send()
                .await;
            Self::decode(response).await
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            let response = self
                .client
                .patch(self.todo_url(id))
                .json(&patch)
                .send()
                .await;
            Self::decode(response).await
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let response = self.client.delete(self.todo_url(id)).send().await;
            Self::decode::<IgnoredAny>(response).await.map(|_| ())
        })
    }
}
