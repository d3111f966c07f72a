#![warn(missing_docs)]
//! DeeMG-AI - couple image generation.
//!
//! Two photos and a mode (wedding photo, future baby, couple at a location)
//! go in; one generated image comes out. The crate holds the workflow state
//! machine, its readiness gate and result view, and the adapter that turns
//! the inputs into a single Gemini request.
//!
//! # Quick Start
//!
//! ```no_run
//! use deemg::{Config, GenerationAdapter, GenerationKind, ImageSlot, WorkflowController};
//!
//! #[tokio::main]
//! async fn main() -> deemg::Result<()> {
//!     let config = Config::from_env()?;
//!     let adapter = GenerationAdapter::new(config.provider()?);
//!
//!     let mut workflow = WorkflowController::new();
//!     workflow.accept_intake(ImageSlot::First, deemg::image::intake::load("me.jpg").await);
//!     workflow.accept_intake(ImageSlot::Second, deemg::image::intake::load("you.jpg").await);
//!     workflow.select_kind(GenerationKind::Location)?;
//!     workflow.select_location("Kyoto, Japan")?;
//!
//!     workflow.generate(&adapter).await?;
//!     if let Some(image) = workflow.state().result_image() {
//!         image.save(deemg::DOWNLOAD_FILENAME)?;
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
pub mod generation;
pub mod image;
pub mod workflow;

pub use config::{Config, API_KEY_ENV_VARS, MODEL_ENV_VAR};
pub use error::{DeemgError, Result, GENERIC_FAILURE_MESSAGE};
pub use generation::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use generation::{
    CompositeRequest, GenerationAdapter, GenerationKind, GenerationMode, ImageProvider, LOCATIONS,
};
pub use image::{
    GeneratedImage, GenerationMetadata, ImageFormat, UploadedImage, DOWNLOAD_FILENAME,
};
pub use workflow::{
    GenerationTicket, ImageSlot, Outcome, ResultView, Stages, WorkflowController, WorkflowState,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{DeemgError, Result};
    pub use crate::generation::{GenerationAdapter, GenerationKind, GenerationMode, ImageProvider};
    pub use crate::image::{GeneratedImage, UploadedImage};
    pub use crate::workflow::{ImageSlot, ResultView, WorkflowController};
    pub use crate::Config;
}
