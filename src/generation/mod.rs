//! Generation adapter: modes, prompts and the provider seam.

pub mod mode;
mod provider;
pub mod providers;

pub use mode::{find_location, GenerationKind, GenerationMode, LOCATIONS};
pub use provider::{CompositeRequest, GenerationAdapter, ImageProvider};
