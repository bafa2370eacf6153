//! Per-image classifier calls.
//!
//! # Design
//! - Each image is classified independently; a failure is folded into an
//!   error result for that slot and never reaches its siblings.
//! - Fan-out is capped at `max_in_flight` concurrent image pipelines.

use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;

use futures_util::stream::{self, StreamExt};
use radview_api_models::{PredictionResponse, XrayImage};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::BearerToken;

/// Label shown for an image whose classification failed.
pub const PREDICTION_ERROR_LABEL: &str = "Error in prediction";

/// Display-ready classifier output for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Class name without its leading prefix token.
    pub label: String,
    /// Confidence as a percentage in `[0, 100]`.
    pub confidence_percent: f64,
}

impl PredictionResult {
    /// Convert a classifier response into display form.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the confidence is not a finite number.
    pub fn from_response(response: &PredictionResponse) -> Result<Self, ApiError> {
        let score = response
            .confidence_score
            .value()
            .filter(|score| score.is_finite())
            .ok_or_else(|| ApiError::Decode {
                operation: "predict",
                detail: format!("confidence score {:?} is not a number", response.confidence_score),
            })?;
        Ok(Self {
            label: display_label(&response.class_name),
            confidence_percent: confidence_percent(score),
        })
    }

    /// Placeholder for a failed classification.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            label: PREDICTION_ERROR_LABEL.to_string(),
            confidence_percent: 0.0,
        }
    }

    /// `true` for the failure placeholder.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.label == PREDICTION_ERROR_LABEL
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.label, self.confidence_percent)
    }
}

/// Drop the first whitespace-delimited token of a raw class name.
#[must_use]
pub fn display_label(class_name: &str) -> String {
    class_name
        .split_whitespace()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Round a `[0, 1]` score to three decimals, then express it as a percentage.
///
/// Scaling works on the integer thousandths so `0.8421` becomes exactly `84.2`.
#[must_use]
pub fn confidence_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

/// Runs images through the classifier with bounded concurrency.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    api: ApiClient,
    max_in_flight: NonZeroUsize,
}

impl PredictionClient {
    /// Client allowing at most `max_in_flight` images in progress at once.
    #[must_use]
    pub const fn new(api: ApiClient, max_in_flight: NonZeroUsize) -> Self {
        Self { api, max_in_flight }
    }

    /// Configured in-flight limit.
    #[must_use]
    pub const fn max_in_flight(&self) -> NonZeroUsize {
        self.max_in_flight
    }

    /// Download one image and classify it.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the download, the upload, or the response
    /// decoding fails.
    pub async fn predict(
        &self,
        token: &BearerToken,
        image_url: &str,
    ) -> Result<PredictionResult, ApiError> {
        let bytes = self.api.fetch_image(image_url).await?;
        debug!(image_url, size = bytes.len(), "classifying image");
        let response = self.api.predict(token, bytes).await?;
        PredictionResult::from_response(&response)
    }

    /// Classify every image, returning one slot per input in input order.
    ///
    /// Images without a URL (absent or blank) yield `None`; failed images
    /// yield [`PredictionResult::failed`].
    pub async fn predict_images(
        &self,
        token: &BearerToken,
        images: &[XrayImage],
    ) -> Vec<Option<PredictionResult>> {
        classify_bounded(images, self.max_in_flight, |url| async move {
            match self.predict(token, url).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(image_url = url, error = %err.detailed(), "prediction failed");
                    PredictionResult::failed()
                }
            }
        })
        .await
    }
}

/// Run `classify` over every image with a usable URL, at most `limit` at once.
async fn classify_bounded<'a, F, Fut>(
    images: &'a [XrayImage],
    limit: NonZeroUsize,
    classify: F,
) -> Vec<Option<PredictionResult>>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = PredictionResult>,
{
    let mut slots = vec![None; images.len()];
    let jobs = images.iter().enumerate().filter_map(|(index, image)| {
        image
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| (index, url))
    });

    let mut completed = stream::iter(jobs)
        .map(|(index, url)| {
            let pending = classify(url);
            async move { (index, pending.await) }
        })
        .buffer_unordered(limit.get());

    while let Some((index, result)) = completed.next().await {
        slots[index] = Some(result);
    }
    slots
}
