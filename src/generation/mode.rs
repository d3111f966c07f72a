//! Generation modes, the location catalog and prompt construction.

use crate::error::{DeemgError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Places offered by the location selector.
pub const LOCATIONS: &[&str] = &[
    "Paris, France",
    "Santorini, Greece",
    "Kyoto, Japan",
    "New York City, USA",
    "Bali, Indonesia",
    "Venice, Italy",
    "Maldives",
    "Swiss Alps",
    "Machu Picchu, Peru",
    "Grand Canyon, USA",
    "Sahara Desert, Morocco",
    "Northern Lights, Iceland",
];

/// Returns the catalog entry equal to `location`, if any.
pub fn find_location(location: &str) -> Option<&'static str> {
    LOCATIONS.iter().copied().find(|l| *l == location)
}

/// What the mode selector holds: the choice without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// Wedding photo of the two people.
    Wedding,
    /// Portrait of their future child.
    Baby,
    /// Couple photo at a chosen location.
    Location,
}

impl GenerationKind {
    /// All kinds, in selector order.
    pub const ALL: [Self; 3] = [Self::Wedding, Self::Baby, Self::Location];

    /// Short label shown on the selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Wedding => "Wedding Photo",
            Self::Baby => "Future Baby",
            Self::Location => "Couple at Location",
        }
    }

    /// One-line description shown under the label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Wedding => "Create a beautiful wedding photo.",
            Self::Baby => "Imagine your future little one.",
            Self::Location => "Place yourselves in a scenic spot.",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wedding => write!(f, "wedding"),
            Self::Baby => write!(f, "baby"),
            Self::Location => write!(f, "location"),
        }
    }
}

/// A fully specified generation mode.
///
/// Only the location variant carries data, so an incomplete or unknown mode
/// cannot reach the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    /// Wedding photo.
    Wedding,
    /// Future baby portrait.
    Baby,
    /// Couple photo at the given place.
    Location(String),
}

impl GenerationMode {
    /// Combines a selector kind with the selected location.
    ///
    /// The location is ignored unless the kind is [`GenerationKind::Location`],
    /// where it is required.
    pub fn from_selection(kind: GenerationKind, location: Option<&str>) -> Result<Self> {
        match kind {
            GenerationKind::Wedding => Ok(Self::Wedding),
            GenerationKind::Baby => Ok(Self::Baby),
            GenerationKind::Location => location
                .map(|l| Self::Location(l.to_string()))
                .ok_or(DeemgError::NotReady("no location selected")),
        }
    }

    /// The selector kind of this mode.
    pub fn kind(&self) -> GenerationKind {
        match self {
            Self::Wedding => GenerationKind::Wedding,
            Self::Baby => GenerationKind::Baby,
            Self::Location(_) => GenerationKind::Location,
        }
    }

    /// Builds the instruction sent alongside the two photos.
    pub fn prompt(&self) -> String {
        match self {
            Self::Wedding => "Create a photorealistic, beautiful, and happy wedding photo of these \
                two people. They should be dressed in elegant modern wedding attire (a beautiful \
                white dress for the woman and a sharp suit for the man), smiling lovingly at each \
                other. The setting should be a romantic and picturesque outdoor location, like a \
                garden or a beach at sunset. The final image should be high-quality and look like \
                a professional photograph."
                .to_string(),
            Self::Baby => "Based on the facial features of these two people, generate a \
                photorealistic and adorable image of what their future baby might look like as a \
                happy and healthy toddler (around 2 years old). The image should be a clear \
                portrait of the child's face."
                .to_string(),
            Self::Location(location) => format!(
                "Create a photorealistic, vibrant, and happy couple's photo of these two people \
                 enjoying themselves at the following location: {location}. They should look like \
                 they are on vacation, in love, and dressed appropriately for the location. The \
                 image should capture the essence and atmosphere of the place."
            ),
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location(location) => write!(f, "location ({location})"),
            other => write!(f, "{}", other.kind()),
        }
    }
}
