//! Image intake and image types.

pub mod intake;
mod types;

pub use types::{
    GeneratedImage, GenerationMetadata, ImageFormat, UploadedImage, DOWNLOAD_FILENAME,
};
