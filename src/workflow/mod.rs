//! The four-stage workflow: upload, mode, location, generate.

mod controller;
mod state;

pub use controller::{GenerationTicket, WorkflowController};
pub use state::{is_ready, ImageSlot, Outcome, ResultView, Stages, WorkflowState};
