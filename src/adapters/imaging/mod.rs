//! Image resolution service integration
//!
//! Specimen images are stored by an external image service. Each access URI
//! in a document is resolved to the service's resource identifier, from
//! which derivative URLs are built.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ImageServiceError;

pub use client::HttpImageResolver;

/// Resource identifier assigned by the image service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResolution {
    #[serde(rename = "resource_uniq")]
    pub resource_id: String,
}

/// Maps an access URI to the image service's resource identifier
#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Resolves one access URI
    ///
    /// # Errors
    ///
    /// Returns [`ImageServiceError::NotFound`] when the service has no
    /// resource for the URI.
    async fn resolve(&self, access_uri: &str) -> Result<ImageResolution, ImageServiceError>;
}
