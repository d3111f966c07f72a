//! Provider trait and the generation adapter in front of it.

use crate::error::{DeemgError, Result};
use crate::generation::mode::GenerationMode;
use crate::image::{GeneratedImage, UploadedImage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// One outbound request: two photos and an instruction, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRequest {
    /// First person's photo.
    pub first: UploadedImage,
    /// Second person's photo.
    pub second: UploadedImage,
    /// Natural-language instruction built from the mode.
    pub prompt: String,
}

impl CompositeRequest {
    /// Builds the request for the given mode.
    pub fn new(first: UploadedImage, second: UploadedImage, mode: &GenerationMode) -> Self {
        Self {
            first,
            second,
            prompt: mode.prompt(),
        }
    }
}

/// Trait for image generation backends.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Issues exactly one generation call.
    async fn generate(&self, request: &CompositeRequest) -> Result<GeneratedImage>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// Wraps a provider with the workflow's failure policy.
///
/// Every provider error is logged and collapsed into
/// [`DeemgError::GenerationFailed`], and at most one call is outstanding at
/// a time.
pub struct GenerationAdapter<P> {
    provider: P,
    in_flight: AtomicBool,
}

impl<P: ImageProvider> GenerationAdapter<P> {
    /// Creates an adapter around `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether a call is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Generates one image from two photos and a mode.
    ///
    /// Fails with [`DeemgError::GenerationInFlight`] without contacting the
    /// provider if another call has not settled yet.
    pub async fn generate(
        &self,
        first: UploadedImage,
        second: UploadedImage,
        mode: &GenerationMode,
    ) -> Result<GeneratedImage> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let request = CompositeRequest::new(first, second, mode);
        let start = Instant::now();

        tracing::info!(
            provider = self.provider.name(),
            mode = %mode,
            "requesting generation"
        );

        match self.provider.generate(&request).await {
            Ok(image) => {
                tracing::info!(
                    provider = self.provider.name(),
                    size_bytes = image.size(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "generation succeeded"
                );
                Ok(image)
            }
            Err(e) => {
                tracing::error!(
                    provider = self.provider.name(),
                    mode = %mode,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "generation failed: {e}"
                );
                Err(DeemgError::GenerationFailed)
            }
        }
    }
}

/// Holds the in-flight flag until dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DeemgError::GenerationInFlight)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
