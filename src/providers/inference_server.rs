/*!
 * Translation backend served by a model server over HTTP.
 *
 * The server owns the actual neural model. This client asks it to load a
 * tokenizer and model weights, then sends translation batches:
 * - `POST {endpoint}/v1/tokenizers` `{model, src_lang}` -> `{id}`
 * - `POST {endpoint}/v1/models` `{model}` -> `{id}`
 * - `POST {endpoint}/v1/translate` `{model_id, tokenizer_id, src_lang, tgt_lang, max_length, texts}`
 *   -> `{translations}`
 *
 * Connection failures, timeouts, 429 and 5xx responses while loading are
 * transient; anything else is permanent.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::errors::{BackendError, LoadError};
use crate::language_utils::ModelCode;
use crate::providers::{ModelLoader, TranslationPipeline};
use crate::translation::cache::LanguagePair;
use crate::translation::model_source::ModelSource;

/// Tokenizer load request
#[derive(Debug, Serialize)]
struct TokenizerRequest<'a> {
    model: &'a str,
    src_lang: &'a str,
}

/// Model load request
#[derive(Debug, Serialize)]
struct ModelRequest<'a> {
    model: &'a str,
}

/// Handle returned by the load endpoints
#[derive(Debug, Deserialize)]
struct LoadResponse {
    id: String,
}

/// Translation request
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    model_id: &'a str,
    tokenizer_id: &'a str,
    src_lang: &'a str,
    tgt_lang: &'a str,
    max_length: usize,
    texts: &'a [String],
}

/// Translation response
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<String>,
}

/// Tokenizer loaded on the server
#[derive(Debug, Clone)]
pub struct ServerTokenizer {
    /// Server-side handle
    pub id: String,
}

/// Model loaded on the server
#[derive(Debug, Clone)]
pub struct ServerModel {
    /// Server-side handle
    pub id: String,
}

/// Loader talking to a model server
#[derive(Debug, Clone)]
pub struct InferenceServerLoader {
    base_url: Url,
    client: Client,
}

impl InferenceServerLoader {
    /// Create a loader for the server at `endpoint`
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };
        let base_url = Url::parse(&endpoint)?;

        Ok(Self {
            base_url,
            client: Client::builder()
                .timeout(timeout)
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()?,
        })
    }

    /// Full URL of a server route
    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), route)
    }

    async fn post_load<B: Serialize + Sync>(&self, route: &str, body: &B) -> Result<String, LoadError> {
        let url = self.url(route);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Model server error ({}) on {}: {}", status, route, text);
            let message = format!("model server returned {}: {}", status, text);
            return Err(if is_transient_status(status) {
                LoadError::Transient(message)
            } else {
                LoadError::Permanent(message)
            });
        }

        response
            .json::<LoadResponse>()
            .await
            .map(|r| r.id)
            .map_err(|e| LoadError::Permanent(format!("invalid load response: {}", e)))
    }
}

/// Whether an HTTP status is worth retrying
fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Network-level failures are transient; anything else is not
fn classify_request_error(error: &reqwest::Error) -> LoadError {
    if error.is_connect() || error.is_timeout() || error.is_request() {
        LoadError::Transient(error.to_string())
    } else {
        LoadError::Permanent(error.to_string())
    }
}

#[async_trait]
impl ModelLoader for InferenceServerLoader {
    type Tokenizer = ServerTokenizer;
    type Model = ServerModel;
    type Pipeline = InferenceServerPipeline;

    async fn load_tokenizer(
        &self,
        source: &ModelSource,
        src_lang: &ModelCode,
    ) -> Result<Self::Tokenizer, LoadError> {
        let model = source.identifier();
        let id = self
            .post_load(
                "v1/tokenizers",
                &TokenizerRequest {
                    model: &model,
                    src_lang: src_lang.as_str(),
                },
            )
            .await?;
        Ok(ServerTokenizer { id })
    }

    async fn load_model(&self, source: &ModelSource) -> Result<Self::Model, LoadError> {
        if !source.is_loadable() {
            return Err(LoadError::Permanent(format!("model source {} has no weights", source)));
        }
        let model = source.identifier();
        let id = self.post_load("v1/models", &ModelRequest { model: &model }).await?;
        Ok(ServerModel { id })
    }

    async fn build_pipeline(
        &self,
        model: Arc<Self::Model>,
        tokenizer: Arc<Self::Tokenizer>,
        pair: &LanguagePair,
        max_length: usize,
    ) -> Result<Self::Pipeline, LoadError> {
        Ok(InferenceServerPipeline {
            url: self.url("v1/translate"),
            client: self.client.clone(),
            model,
            tokenizer,
            pair: pair.clone(),
            max_length,
        })
    }
}

/// Pipeline bound to one language pair on the model server
#[derive(Debug)]
pub struct InferenceServerPipeline {
    url: String,
    client: Client,
    model: Arc<ServerModel>,
    tokenizer: Arc<ServerTokenizer>,
    pair: LanguagePair,
    max_length: usize,
}

#[async_trait]
impl TranslationPipeline for InferenceServerPipeline {
    async fn translate(&self, inputs: &[String]) -> Result<Vec<String>, BackendError> {
        let request = TranslateRequest {
            model_id: &self.model.id,
            tokenizer_id: &self.tokenizer.id,
            src_lang: self.pair.source().as_str(),
            tgt_lang: self.pair.target().as_str(),
            max_length: self.max_length,
            texts: inputs,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(BackendError::RequestFailed(format!("{}: {}", status, text)));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResult(e.to_string()))?;

        if body.translations.len() != inputs.len() {
            return Err(BackendError::MalformedResult(format!(
                "sent {} texts, received {} translations",
                inputs.len(),
                body.translations.len()
            )));
        }
        Ok(body.translations)
    }
}
