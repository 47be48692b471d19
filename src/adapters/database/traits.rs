//! Record store abstraction traits
//!
//! This module defines the traits that record store adapters must implement
//! to receive synthesized occurrence, determination and image records.

use async_trait::async_trait;

use crate::domain::ids::{CollectionId, ImageId, OccurrenceId, TaxonId};
use crate::domain::{
    DeterminationRecord, GatewayError, Georeference, ImageRecord, OccurrenceRecord,
    StoredImage, StoredOccurrence,
};

/// Result type for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Persistence gateway for occurrences and their determinations
///
/// Lookups return `Ok(None)` when nothing matches; only store failures are
/// errors.
#[async_trait]
pub trait OccurrenceGateway: Send + Sync {
    /// Finds a stored record by institution code, collection code and catalog number
    async fn lookup_by_triplet(
        &self,
        institution_code: &str,
        collection_code: &str,
        catalog_number: &str,
    ) -> GatewayResult<Option<StoredOccurrence>>;

    /// Finds a stored record by collection key and catalog number
    async fn lookup_by_collection_and_catalog(
        &self,
        collection_id: CollectionId,
        catalog_number: &str,
    ) -> GatewayResult<Option<StoredOccurrence>>;

    /// Resolves the collection registered for an institution/collection code pair
    async fn resolve_collection_id(
        &self,
        institution_code: &str,
        collection_code: &str,
    ) -> GatewayResult<Option<CollectionId>>;

    /// Inserts or updates an occurrence row
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SaveFailed`] carrying the store's own message
    /// when the row is rejected.
    async fn save_occurrence(&self, record: &OccurrenceRecord) -> GatewayResult<OccurrenceId>;

    /// Writes one determination row
    async fn save_determination(&self, record: &DeterminationRecord) -> GatewayResult<()>;

    /// Accepted taxon for a scientific name, following synonymy
    async fn resolve_accepted_taxon_id(&self, scientific_name: &str)
        -> GatewayResult<Option<TaxonId>>;

    /// Family of a taxon in the authority file
    async fn resolve_family_for_taxon_id(&self, taxon_id: TaxonId)
        -> GatewayResult<Option<String>>;

    /// Taxon key for a scientific name
    async fn resolve_taxon_id(&self, scientific_name: &str) -> GatewayResult<Option<TaxonId>>;
}

/// Persistence gateway for image records
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Finds an image row by its source (or large) URL
    async fn find_by_source_url(&self, url: &str) -> GatewayResult<Option<StoredImage>>;

    /// Inserts a new image row
    async fn insert(&self, record: &ImageRecord) -> GatewayResult<ImageId>;

    /// Replaces an existing image row
    async fn update(&self, imgid: ImageId, record: &ImageRecord) -> GatewayResult<()>;
}

/// Georeference lookup by place name and collecting year
#[async_trait]
pub trait Gazetteer: Send + Sync {
    async fn lookup(
        &self,
        state_province: &str,
        municipality: &str,
        year: Option<&str>,
    ) -> GatewayResult<Option<Georeference>>;
}
