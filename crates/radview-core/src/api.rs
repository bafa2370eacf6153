//! HTTP transport for the report and classifier services.
//!
//! Every method performs exactly one request: no retries, no caching. The
//! bearer token is passed per call so the transport itself holds no session
//! state.

use radview_api_models::{
    ErrorBody, LoginRequest, NewTemplate, PredictionResponse, Report, ReportEnvelope, ReportId,
    ReportListResponse, SignupRequest, Template, TemplateListResponse, TokenResponse,
};
use radview_config::ClientConfig;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::session::BearerToken;

/// Header carrying the per-invocation trace identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

const IMAGE_FIELD: &str = "image";
const IMAGE_FILE_NAME: &str = "image.jpg";
const IMAGE_MIME: &str = "image/jpeg";

/// Client for the report service and the classifier service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    api_url: Url,
    predict_url: Url,
}

impl ApiClient {
    /// Build a client from validated configuration.
    ///
    /// `request_id`, when given, is sent as `x-request-id` on every request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] when the HTTP client cannot be built and
    /// [`ApiError::Endpoint`] when the request id is not a valid header value.
    pub fn new(config: &ClientConfig, request_id: Option<&str>) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        if let Some(request_id) = request_id {
            let value = HeaderValue::from_str(request_id).map_err(|_| ApiError::Endpoint {
                operation: "configure client",
                detail: "request identifier contains invalid characters".to_string(),
            })?;
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let http = Client::builder()
            .timeout(config.http_timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ApiError::Client { source })?;

        Ok(Self::with_client(
            http,
            config.api_url.clone(),
            config.predict_url.clone(),
        ))
    }

    /// Wrap an existing HTTP client.
    #[must_use]
    pub const fn with_client(http: Client, api_url: Url, predict_url: Url) -> Self {
        Self {
            http,
            api_url,
            predict_url,
        }
    }

    /// Report service base URL.
    #[must_use]
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// `POST /login`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures, non-success statuses
    /// and bodies without a token.
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ApiError> {
        const OP: &str = "login";
        let url = endpoint(&self.api_url, OP, &["login"])?;
        send_json(OP, self.http.post(url).json(request)).await
    }

    /// `POST /signup`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::login`].
    pub async fn signup(&self, request: &SignupRequest) -> Result<TokenResponse, ApiError> {
        const OP: &str = "signup";
        let url = endpoint(&self.api_url, OP, &["signup"])?;
        send_json(OP, self.http.post(url).json(request)).await
    }

    /// `GET /reports`: the full collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body is malformed.
    pub async fn list_reports(&self, token: &BearerToken) -> Result<Vec<Report>, ApiError> {
        const OP: &str = "list reports";
        let url = endpoint(&self.api_url, OP, &["reports"])?;
        let body: ReportListResponse =
            send_json(OP, self.http.get(url).bearer_auth(token.expose())).await?;
        Ok(body.reports)
    }

    /// `GET /report/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body is malformed.
    pub async fn fetch_report(
        &self,
        token: &BearerToken,
        id: &ReportId,
    ) -> Result<Report, ApiError> {
        const OP: &str = "fetch report";
        let url = endpoint(&self.api_url, OP, &["report", &id.0])?;
        let body: ReportEnvelope =
            send_json(OP, self.http.get(url).bearer_auth(token.expose())).await?;
        Ok(body.report)
    }

    /// `PUT /report/{id}` with the full report as body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn update_report(&self, token: &BearerToken, report: &Report) -> Result<(), ApiError> {
        const OP: &str = "update report";
        let url = endpoint(&self.api_url, OP, &["report", &report.key.0])?;
        send_empty(
            OP,
            self.http.put(url).bearer_auth(token.expose()).json(report),
        )
        .await
    }

    /// `GET /templates`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body is malformed.
    pub async fn list_templates(&self, token: &BearerToken) -> Result<Vec<Template>, ApiError> {
        const OP: &str = "list templates";
        let url = endpoint(&self.api_url, OP, &["templates"])?;
        let body: TemplateListResponse =
            send_json(OP, self.http.get(url).bearer_auth(token.expose())).await?;
        Ok(body.templates)
    }

    /// `POST /template`.
    ///
    /// The response body is ignored; callers re-fetch the catalog.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn create_template(
        &self,
        token: &BearerToken,
        template: &NewTemplate,
    ) -> Result<(), ApiError> {
        const OP: &str = "create template";
        let url = endpoint(&self.api_url, OP, &["template"])?;
        send_empty(
            OP,
            self.http.post(url).bearer_auth(token.expose()).json(template),
        )
        .await
    }

    /// `PUT /template/{id}` with the full template as body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn update_template(
        &self,
        token: &BearerToken,
        template: &Template,
    ) -> Result<(), ApiError> {
        const OP: &str = "update template";
        let url = endpoint(&self.api_url, OP, &["template", &template.id.0])?;
        send_empty(
            OP,
            self.http.put(url).bearer_auth(token.expose()).json(template),
        )
        .await
    }

    /// Download image bytes. Relative URLs resolve against the report service.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the URL is invalid or the download fails.
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, ApiError> {
        const OP: &str = "fetch image";
        let url = self
            .api_url
            .join(image_url)
            .map_err(|err| ApiError::Endpoint {
                operation: OP,
                detail: format!("'{image_url}': {err}"),
            })?;
        debug!(url = %url, "downloading image");
        let response = checked(OP, self.http.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                operation: OP,
                source,
            })?;
        Ok(bytes.to_vec())
    }

    /// `POST /predict` on the classifier service with the image as multipart field.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body is malformed.
    pub async fn predict(
        &self,
        token: &BearerToken,
        image: Vec<u8>,
    ) -> Result<PredictionResponse, ApiError> {
        const OP: &str = "predict";
        let url = endpoint(&self.predict_url, OP, &["predict"])?;
        let part = Part::bytes(image)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_MIME)
            .map_err(|source| ApiError::Client { source })?;
        let form = Form::new().part(IMAGE_FIELD, part);
        send_json(
            OP,
            self.http
                .post(url)
                .bearer_auth(token.expose())
                .multipart(form),
        )
        .await
    }
}

fn endpoint(base: &Url, operation: &'static str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::Endpoint {
            operation,
            detail: format!("'{base}' cannot be used as a base URL"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn checked(operation: &'static str, request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|source| ApiError::Transport { operation, source })?;
    let status = response.status();
    debug!(operation, status = status.as_u16(), "response received");
    if status.is_success() {
        Ok(response)
    } else {
        Err(status_error(operation, response).await)
    }
}

async fn send_json<T: DeserializeOwned>(
    operation: &'static str,
    request: RequestBuilder,
) -> Result<T, ApiError> {
    let response = checked(operation, request).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ApiError::Transport { operation, source })?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode {
        operation,
        detail: err.to_string(),
    })
}

async fn send_empty(operation: &'static str, request: RequestBuilder) -> Result<(), ApiError> {
    checked(operation, request).await.map(drop)
}

async fn status_error(operation: &'static str, response: Response) -> ApiError {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.message)
        .or_else(|| {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            (!text.is_empty()).then_some(text)
        });
    ApiError::Status {
        operation,
        status,
        message,
    }
}
