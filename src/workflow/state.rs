//! Workflow state, the readiness gate and the result view derived from it.

use crate::generation::{GenerationKind, GenerationMode};
use crate::image::{GeneratedImage, UploadedImage};

/// Which of the two upload slots an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    /// "Your Photo".
    First,
    /// "Your Partner's Photo".
    Second,
}

impl ImageSlot {
    /// Label shown above the upload area.
    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "Your Photo",
            Self::Second => "Your Partner's Photo",
        }
    }
}

/// Where the current (or last) generation attempt stands.
///
/// A single enum keeps result and error mutually exclusive, and both absent
/// while a request is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request failed with a user-facing message.
    Failed(String),
    /// The last request produced an image.
    Succeeded(GeneratedImage),
}

/// Readiness gate: may generation be triggered with these inputs?
pub fn is_ready(
    first: Option<&UploadedImage>,
    second: Option<&UploadedImage>,
    kind: Option<GenerationKind>,
    location: Option<&str>,
) -> bool {
    match (first, second, kind) {
        (Some(_), Some(_), Some(GenerationKind::Location)) => location.is_some(),
        (Some(_), Some(_), Some(_)) => true,
        _ => false,
    }
}

/// Everything the form knows. Owned by
/// [`WorkflowController`](crate::workflow::WorkflowController).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub(crate) first_image: Option<UploadedImage>,
    pub(crate) second_image: Option<UploadedImage>,
    pub(crate) kind: Option<GenerationKind>,
    pub(crate) location: Option<String>,
    pub(crate) outcome: Outcome,
}

impl WorkflowState {
    /// Image in the given slot.
    pub fn image(&self, slot: ImageSlot) -> Option<&UploadedImage> {
        match slot {
            ImageSlot::First => self.first_image.as_ref(),
            ImageSlot::Second => self.second_image.as_ref(),
        }
    }

    /// Selected mode kind.
    pub fn kind(&self) -> Option<GenerationKind> {
        self.kind
    }

    /// Selected location, only while the location mode is selected.
    pub fn location(&self) -> Option<&str> {
        match self.kind {
            Some(GenerationKind::Location) => self.location.as_deref(),
            _ => None,
        }
    }

    /// Current outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Whether a request is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.outcome, Outcome::Pending)
    }

    /// The generated image, if the last request succeeded.
    pub fn result_image(&self) -> Option<&GeneratedImage> {
        match &self.outcome {
            Outcome::Succeeded(image) => Some(image),
            _ => None,
        }
    }

    /// The failure message, if the last request failed.
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Evaluates the readiness gate against the current inputs.
    pub fn is_ready(&self) -> bool {
        is_ready(
            self.first_image.as_ref(),
            self.second_image.as_ref(),
            self.kind,
            self.location(),
        )
    }

    /// The complete mode, if one can be formed from the selection.
    pub fn mode(&self) -> Option<GenerationMode> {
        GenerationMode::from_selection(self.kind?, self.location()).ok()
    }

    /// What the result presenter shows.
    pub fn view(&self) -> ResultView<'_> {
        match &self.outcome {
            Outcome::Idle => ResultView::Idle,
            Outcome::Pending => ResultView::Pending,
            Outcome::Failed(message) => ResultView::Failed { message },
            Outcome::Succeeded(image) => ResultView::Succeeded { image },
        }
    }

    /// Which input stages are visible and whether generate is enabled.
    pub fn stages(&self) -> Stages {
        let inputs_visible = !matches!(self.outcome, Outcome::Pending | Outcome::Succeeded(_));
        let both_images = self.first_image.is_some() && self.second_image.is_some();

        Stages {
            upload: inputs_visible,
            mode_selector: inputs_visible && both_images,
            location_selector: inputs_visible && self.kind == Some(GenerationKind::Location),
            generate_enabled: inputs_visible && self.is_ready() && !self.is_in_flight(),
        }
    }
}

/// Visibility of the input stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    /// Step 1: photo upload.
    pub upload: bool,
    /// Step 2: mode selection.
    pub mode_selector: bool,
    /// Step 3: location selection.
    pub location_selector: bool,
    /// Generate button enabled.
    pub generate_enabled: bool,
}

/// Stateless view of the generation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView<'a> {
    /// Nothing to show; the input stages are on screen.
    Idle,
    /// Waiting on the provider.
    Pending,
    /// Failure message plus a reset action.
    Failed {
        /// User-facing message.
        message: &'a str,
    },
    /// Result image plus save and reset actions.
    Succeeded {
        /// Image to display and offer for download.
        image: &'a GeneratedImage,
    },
}

impl ResultView<'_> {
    /// Heading for the view, `None` when idle.
    pub fn headline(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Pending => Some("Generating Your Masterpiece..."),
            Self::Failed { .. } => Some("Oops! Something went wrong."),
            Self::Succeeded { .. } => Some("Your Creation is Ready!"),
        }
    }

    /// Label of the reset action, when one is offered.
    pub fn reset_label(&self) -> Option<&'static str> {
        match self {
            Self::Failed { .. } => Some("Try Again"),
            Self::Succeeded { .. } => Some("Create Another"),
            Self::Idle | Self::Pending => None,
        }
    }
}
