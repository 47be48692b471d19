//! In-memory record store, image store, resolver and gazetteer
//!
//! These satisfy the adapter traits without any external service. They back
//! `--dry-run` and the test suite.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::adapters::database::traits::{Gazetteer, GatewayResult, ImageStore, OccurrenceGateway};
use crate::adapters::imaging::{ImageResolution, ImageResolver};
use crate::domain::ids::{CollectionId, ImageId, OccurrenceId, TaxonId};
use crate::domain::{
    DeterminationRecord, GatewayError, Georeference, ImageRecord, ImageServiceError,
    OccurrenceRecord, StoredImage, StoredOccurrence,
};

/// Message a Symbiota MySQL backend reports when the collection is unregistered
pub const UNREGISTERED_COLLECTION_MESSAGE: &str = "Cannot add or update a child row: a foreign key constraint fails (`symbiota`.`omoccurrences`, CONSTRAINT `FK_omoccurrences_collid` FOREIGN KEY (`collid`) REFERENCES `omcollections` (`CollID`) ON DELETE CASCADE ON UPDATE CASCADE)";

#[derive(Debug, Clone)]
struct CollectionEntry {
    collid: CollectionId,
    institution_code: String,
    collection_code: String,
}

#[derive(Debug, Clone)]
struct TaxonEntry {
    tid: TaxonId,
    accepted: TaxonId,
    family: String,
}

#[derive(Debug, Clone)]
struct StoredRow {
    stored: StoredOccurrence,
    record: OccurrenceRecord,
}

#[derive(Debug, Default)]
struct GatewayState {
    collections: Vec<CollectionEntry>,
    occurrences: BTreeMap<OccurrenceId, StoredRow>,
    determinations: Vec<DeterminationRecord>,
    taxa: HashMap<String, TaxonEntry>,
    next_occid: i64,
    next_collid: i64,
}

impl GatewayState {
    fn allocate_occid(&mut self) -> GatewayResult<OccurrenceId> {
        self.next_occid += 1;
        OccurrenceId::new(self.next_occid).map_err(GatewayError::SaveFailed)
    }

    fn allocate_collid(&mut self) -> GatewayResult<CollectionId> {
        self.next_collid += 1;
        CollectionId::new(self.next_collid).map_err(GatewayError::SaveFailed)
    }
}

/// In-memory occurrence gateway
///
/// Collections must be registered up front unless the gateway was built with
/// [`MemoryGateway::permissive`], in which case any code pair is registered
/// on first lookup.
///
/// # Example
///
/// ```
/// use occurrence_ingest::adapters::memory::MemoryGateway;
/// use occurrence_ingest::domain::ids::CollectionId;
///
/// let gateway = MemoryGateway::new()
///     .with_collection(CollectionId::new(3).unwrap(), "HUH", "GH");
/// ```
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<GatewayState>,
    auto_register_collections: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that registers unknown collections on first lookup
    pub fn permissive() -> Self {
        Self {
            auto_register_collections: true,
            ..Self::default()
        }
    }

    /// Registers a collection for an institution/collection code pair
    pub fn with_collection(
        mut self,
        collid: CollectionId,
        institution_code: &str,
        collection_code: &str,
    ) -> Self {
        let state = self.state.get_mut();
        state.next_collid = state.next_collid.max(collid.get());
        state.collections.push(CollectionEntry {
            collid,
            institution_code: institution_code.to_string(),
            collection_code: collection_code.to_string(),
        });
        self
    }

    /// Registers an accepted taxon with its family
    pub fn with_taxon(self, scientific_name: &str, tid: TaxonId, family: &str) -> Self {
        self.with_synonym(scientific_name, tid, tid, family)
    }

    /// Registers a taxon whose accepted name is another taxon
    pub fn with_synonym(
        mut self,
        scientific_name: &str,
        tid: TaxonId,
        accepted: TaxonId,
        family: &str,
    ) -> Self {
        self.state.get_mut().taxa.insert(
            scientific_name.to_string(),
            TaxonEntry {
                tid,
                accepted,
                family: family.to_string(),
            },
        );
        self
    }

    /// Number of stored occurrence rows
    pub async fn occurrence_count(&self) -> usize {
        self.state.lock().await.occurrences.len()
    }

    /// Stored occurrence rows in key order
    pub async fn occurrences(&self) -> Vec<OccurrenceRecord> {
        self.state
            .lock()
            .await
            .occurrences
            .values()
            .map(|row| row.record.clone())
            .collect()
    }

    /// Stored row for a key, including its identity columns
    pub async fn occurrence(&self, occid: OccurrenceId) -> Option<OccurrenceRecord> {
        self.state
            .lock()
            .await
            .occurrences
            .get(&occid)
            .map(|row| row.record.clone())
    }

    /// Determination rows in write order
    pub async fn determinations(&self) -> Vec<DeterminationRecord> {
        self.state.lock().await.determinations.clone()
    }
}

#[async_trait]
impl OccurrenceGateway for MemoryGateway {
    async fn lookup_by_triplet(
        &self,
        institution_code: &str,
        collection_code: &str,
        catalog_number: &str,
    ) -> GatewayResult<Option<StoredOccurrence>> {
        let state = self.state.lock().await;
        Ok(state
            .occurrences
            .values()
            .find(|row| {
                row.stored.institution_code == institution_code
                    && row.stored.collection_code == collection_code
                    && row.stored.catalog_number == catalog_number
            })
            .map(|row| row.stored.clone()))
    }

    async fn lookup_by_collection_and_catalog(
        &self,
        collection_id: CollectionId,
        catalog_number: &str,
    ) -> GatewayResult<Option<StoredOccurrence>> {
        let state = self.state.lock().await;
        Ok(state
            .occurrences
            .values()
            .find(|row| {
                row.stored.collection_id == Some(collection_id)
                    && row.stored.catalog_number == catalog_number
            })
            .map(|row| row.stored.clone()))
    }

    async fn resolve_collection_id(
        &self,
        institution_code: &str,
        collection_code: &str,
    ) -> GatewayResult<Option<CollectionId>> {
        let mut state = self.state.lock().await;
        let found = state
            .collections
            .iter()
            .find(|c| {
                c.institution_code == institution_code && c.collection_code == collection_code
            })
            .map(|c| c.collid);

        if found.is_some() || !self.auto_register_collections {
            return Ok(found);
        }

        let collid = state.allocate_collid()?;
        state.collections.push(CollectionEntry {
            collid,
            institution_code: institution_code.to_string(),
            collection_code: collection_code.to_string(),
        });
        Ok(Some(collid))
    }

    async fn save_occurrence(&self, record: &OccurrenceRecord) -> GatewayResult<OccurrenceId> {
        let mut state = self.state.lock().await;

        if let Some(occid) = record.occid {
            let row = state
                .occurrences
                .get_mut(&occid)
                .ok_or_else(|| GatewayError::NotFound(format!("occid {occid}")))?;
            row.record = OccurrenceRecord {
                identity: row.record.identity.clone(),
                ..record.clone()
            };
            return Ok(occid);
        }

        let identity = record
            .identity
            .as_ref()
            .ok_or_else(|| GatewayError::SaveFailed("new record has no identity".to_string()))?;
        let Some(collection_id) = identity.collection_id else {
            return Err(GatewayError::SaveFailed(
                UNREGISTERED_COLLECTION_MESSAGE.to_string(),
            ));
        };

        let occid = state.allocate_occid()?;
        let stored = StoredOccurrence {
            occid,
            collection_id: Some(collection_id),
            institution_code: identity.institution_code.clone(),
            collection_code: identity.collection_code.clone(),
            catalog_number: identity.catalog_number.clone(),
        };
        state.occurrences.insert(
            occid,
            StoredRow {
                stored,
                record: OccurrenceRecord {
                    occid: Some(occid),
                    ..record.clone()
                },
            },
        );
        Ok(occid)
    }

    async fn save_determination(&self, record: &DeterminationRecord) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        if !state.occurrences.contains_key(&record.occid) {
            return Err(GatewayError::SaveFailed(format!(
                "determination references unknown occid {}",
                record.occid
            )));
        }
        // Same occid, name, determiner and date replaces the earlier row
        state.determinations.retain(|d| {
            !(d.occid == record.occid
                && d.sciname == record.sciname
                && d.identified_by == record.identified_by
                && d.date_identified == record.date_identified)
        });
        state.determinations.push(record.clone());
        Ok(())
    }

    async fn resolve_accepted_taxon_id(
        &self,
        scientific_name: &str,
    ) -> GatewayResult<Option<TaxonId>> {
        let state = self.state.lock().await;
        Ok(state.taxa.get(scientific_name).map(|t| t.accepted))
    }

    async fn resolve_family_for_taxon_id(
        &self,
        taxon_id: TaxonId,
    ) -> GatewayResult<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .taxa
            .values()
            .find(|t| t.tid == taxon_id && !t.family.is_empty())
            .map(|t| t.family.clone()))
    }

    async fn resolve_taxon_id(&self, scientific_name: &str) -> GatewayResult<Option<TaxonId>> {
        let state = self.state.lock().await;
        Ok(state.taxa.get(scientific_name).map(|t| t.tid))
    }
}

#[derive(Debug, Default)]
struct ImageState {
    images: BTreeMap<ImageId, ImageRecord>,
    next_imgid: i64,
}

/// In-memory image store
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    state: Mutex<ImageState>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored image rows in key order
    pub async fn images(&self) -> Vec<StoredImage> {
        self.state
            .lock()
            .await
            .images
            .iter()
            .map(|(imgid, record)| StoredImage {
                imgid: *imgid,
                record: record.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn find_by_source_url(&self, url: &str) -> GatewayResult<Option<StoredImage>> {
        let state = self.state.lock().await;
        Ok(state
            .images
            .iter()
            .find(|(_, record)| record.source_url == url || record.large_url == url)
            .map(|(imgid, record)| StoredImage {
                imgid: *imgid,
                record: record.clone(),
            }))
    }

    async fn insert(&self, record: &ImageRecord) -> GatewayResult<ImageId> {
        let mut state = self.state.lock().await;
        state.next_imgid += 1;
        let imgid = ImageId::new(state.next_imgid).map_err(GatewayError::SaveFailed)?;
        state.images.insert(imgid, record.clone());
        Ok(imgid)
    }

    async fn update(&self, imgid: ImageId, record: &ImageRecord) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        match state.images.get_mut(&imgid) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(GatewayError::NotFound(format!("imgid {imgid}"))),
        }
    }
}

/// Resolver that derives resource ids from the access URI itself
///
/// The resource id is the last path segment of the URI unless an explicit
/// mapping was registered. URIs registered with
/// [`MemoryImageResolver::with_unknown`] resolve to `NotFound`.
#[derive(Debug, Default)]
pub struct MemoryImageResolver {
    mappings: HashMap<String, String>,
    unknown: HashSet<String>,
}

impl MemoryImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mut self, access_uri: &str, resource_id: &str) -> Self {
        self.mappings
            .insert(access_uri.to_string(), resource_id.to_string());
        self
    }

    pub fn with_unknown(mut self, access_uri: &str) -> Self {
        self.unknown.insert(access_uri.to_string());
        self
    }
}

fn last_segment(access_uri: &str) -> &str {
    let path = access_uri
        .split(['?', '#'])
        .next()
        .unwrap_or(access_uri)
        .trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path)
}

#[async_trait]
impl ImageResolver for MemoryImageResolver {
    async fn resolve(&self, access_uri: &str) -> Result<ImageResolution, ImageServiceError> {
        if self.unknown.contains(access_uri) {
            return Err(ImageServiceError::NotFound(access_uri.to_string()));
        }
        let resource_id = match self.mappings.get(access_uri) {
            Some(id) => id.clone(),
            None => last_segment(access_uri).to_string(),
        };
        if resource_id.is_empty() {
            return Err(ImageServiceError::InvalidResponse(format!(
                "no resource id in {access_uri}"
            )));
        }
        Ok(ImageResolution { resource_id })
    }
}

/// Gazetteer backed by a fixed place table
///
/// Matches on state/province and municipality; the collecting year is
/// ignored.
#[derive(Debug, Default)]
pub struct MemoryGazetteer {
    places: HashMap<(String, String), Georeference>,
}

impl MemoryGazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(
        mut self,
        state_province: &str,
        municipality: &str,
        georeference: Georeference,
    ) -> Self {
        self.places.insert(
            (state_province.to_string(), municipality.to_string()),
            georeference,
        );
        self
    }
}

#[async_trait]
impl Gazetteer for MemoryGazetteer {
    async fn lookup(
        &self,
        state_province: &str,
        municipality: &str,
        _year: Option<&str>,
    ) -> GatewayResult<Option<Georeference>> {
        Ok(self
            .places
            .get(&(state_province.to_string(), municipality.to_string()))
            .cloned())
    }
}
