//! The workflow controller: sole owner and mutator of [`WorkflowState`].

use crate::error::{DeemgError, Result, GENERIC_FAILURE_MESSAGE};
use crate::generation::{
    find_location, GenerationAdapter, GenerationKind, GenerationMode, ImageProvider,
};
use crate::image::{GeneratedImage, UploadedImage};
use crate::workflow::state::{ImageSlot, Outcome, ResultView, WorkflowState};

/// Handle for one issued generation.
///
/// Carries the inputs captured when generation began and the token used to
/// match the eventual result against the controller's current generation.
#[derive(Debug, Clone)]
#[must_use = "a ticket must be executed and settled"]
pub struct GenerationTicket {
    token: u64,
    first: UploadedImage,
    second: UploadedImage,
    mode: GenerationMode,
}

impl GenerationTicket {
    /// Token to pass back to [`WorkflowController::settle`].
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Mode captured at issue time.
    pub fn mode(&self) -> &GenerationMode {
        &self.mode
    }

    /// Runs the captured request through `adapter`.
    pub async fn execute<P: ImageProvider>(
        &self,
        adapter: &GenerationAdapter<P>,
    ) -> Result<GeneratedImage> {
        adapter
            .generate(self.first.clone(), self.second.clone(), &self.mode)
            .await
    }
}

/// Drives the upload → mode → location → generate workflow.
#[derive(Debug, Default)]
pub struct WorkflowController {
    state: WorkflowState,
    generation: u64,
}

impl WorkflowController {
    /// Creates a controller in the initial, all-absent state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only snapshot of the state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Shortcut for `state().view()`.
    pub fn view(&self) -> ResultView<'_> {
        self.state.view()
    }

    /// Shortcut for `state().is_ready()`.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Inputs are frozen while a generation is pending.
    fn ensure_editable(&self) -> Result<()> {
        if self.state.is_in_flight() {
            return Err(DeemgError::GenerationInFlight);
        }
        Ok(())
    }

    /// Replaces (or clears) the image in `slot`.
    pub fn set_image(&mut self, slot: ImageSlot, image: Option<UploadedImage>) -> Result<()> {
        self.ensure_editable()?;
        match slot {
            ImageSlot::First => self.state.first_image = image,
            ImageSlot::Second => self.state.second_image = image,
        }
        Ok(())
    }

    /// Applies the result of decoding an upload.
    ///
    /// A failed decode clears the slot and is only logged, as is an upload
    /// arriving while a generation is pending.
    pub fn accept_intake(&mut self, slot: ImageSlot, result: Result<UploadedImage>) {
        let image = match result {
            Ok(image) => {
                tracing::debug!(
                    slot = slot.label(),
                    mime_type = image.mime_type(),
                    "image uploaded"
                );
                Some(image)
            }
            Err(e) => {
                tracing::warn!(slot = slot.label(), "error reading upload: {e}");
                None
            }
        };
        if let Err(e) = self.set_image(slot, image) {
            tracing::warn!(slot = slot.label(), "ignoring upload: {e}");
        }
    }

    /// Selects the generation kind.
    pub fn select_kind(&mut self, kind: GenerationKind) -> Result<()> {
        self.ensure_editable()?;
        self.state.kind = Some(kind);
        Ok(())
    }

    /// Selects a location from the catalog.
    pub fn select_location(&mut self, location: &str) -> Result<()> {
        self.ensure_editable()?;
        let location = find_location(location)
            .ok_or_else(|| DeemgError::UnknownLocation(location.to_string()))?;
        self.state.location = Some(location.to_string());
        Ok(())
    }

    /// Marks generation as started and hands out a ticket for it.
    ///
    /// Refuses while another generation is pending, while a finished result
    /// is on display (reset first) or while the readiness gate is closed.
    pub fn begin(&mut self) -> Result<GenerationTicket> {
        self.ensure_editable()?;
        if matches!(self.state.outcome, Outcome::Succeeded(_)) {
            return Err(DeemgError::NotReady("reset before generating again"));
        }
        let (Some(first), Some(second), Some(mode)) = (
            self.state.first_image.clone(),
            self.state.second_image.clone(),
            self.state.mode(),
        ) else {
            return Err(DeemgError::NotReady(
                "two photos and a complete mode selection are required",
            ));
        };

        self.generation += 1;
        self.state.outcome = Outcome::Pending;
        tracing::debug!(token = self.generation, mode = %mode, "generation started");

        Ok(GenerationTicket {
            token: self.generation,
            first,
            second,
            mode,
        })
    }

    /// Applies a settled generation.
    ///
    /// Returns `false` and leaves the state untouched when the ticket is stale
    /// (the workflow was reset or restarted since it was issued).
    pub fn settle(&mut self, token: u64, result: Result<GeneratedImage>) -> bool {
        if token != self.generation || !self.state.is_in_flight() {
            tracing::debug!(
                token,
                current = self.generation,
                "discarding stale generation result"
            );
            return false;
        }

        self.state.outcome = match result {
            Ok(image) => Outcome::Succeeded(image),
            Err(e) => {
                tracing::debug!("generation settled with error: {e}");
                Outcome::Failed(GENERIC_FAILURE_MESSAGE.to_string())
            }
        };
        true
    }

    /// Begins, executes and settles one generation.
    ///
    /// Only gate failures are returned; generation failures end up in the
    /// state's failure outcome.
    pub async fn generate<P: ImageProvider>(
        &mut self,
        adapter: &GenerationAdapter<P>,
    ) -> Result<()> {
        let ticket = self.begin()?;
        let result = ticket.execute(adapter).await;
        self.settle(ticket.token(), result);
        Ok(())
    }

    /// Returns to the initial state. Any outstanding ticket becomes stale.
    pub fn reset(&mut self) {
        self.state = WorkflowState::default();
        self.generation += 1;
    }
}
