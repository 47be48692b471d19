//! Record synthesizer: one sealed occurrence to database rows
//!
//! [`RecordSynthesizer::submit`] resolves the record's identity, applies the
//! update policy, writes the occurrence row and then its determinations and
//! image rows. Problems with determinations and images are warnings; only a
//! failed lookup or occurrence save fails the record.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::fields::{
    identification_remarks, locality_line, non_empty, normalize_country, split_recorded_by,
};
use super::images::{DerivativeUrlBuilder, MediaUrls};
use crate::adapters::database::{Gateways, Gazetteer, ImageStore, OccurrenceGateway};
use crate::adapters::imaging::ImageResolver;
use crate::config::IngestPolicyConfig;
use crate::domain::ids::{CollectionId, OccurrenceId, TaxonId};
use crate::domain::{
    AssociatedMedia, DeterminationRecord, EventDates, GatewayError, Georeference, Identification,
    IngestError, ImageRecord, Occurrence, OccurrenceRecord, RecordIdentity, Result, StoredOccurrence,
    TaxonFields,
};

/// Status given to records created by ingest
pub const NEW_RECORD_STATUS: &str = "unprocessed";

/// Image type given to specimen images
pub const SPECIMEN_IMAGE_TYPE: &str = "specimen";

const UNREGISTERED_COLLECTION_PATTERN: &str =
    r"(?i)(foreign key constraint.*collid|collid.*not-null constraint)";

const UNREGISTERED_COLLECTION_INTERPRETATION: &str = "Interpretation: Record contains a collectionCode and institutionCode combination which was not found in omcollections (or only a collectionCode that was not found in omcollections or omoccurrences).";

/// What happened to one occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Inserted,
    Updated,
    /// Record exists and updates are disabled
    Skipped,
    Failed,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted => write!(f, "inserted"),
            Self::Updated => write!(f, "updated"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of submitting one occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceOutcome {
    pub kind: OutcomeKind,
    pub occid: Option<OccurrenceId>,
    /// Error lines for a failed record
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl OccurrenceOutcome {
    fn new(kind: OutcomeKind) -> Self {
        Self {
            kind,
            occid: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Failure with a single error line
    pub fn failed(message: impl Into<String>) -> Self {
        let mut outcome = Self::new(OutcomeKind::Failed);
        outcome.errors.push(message.into());
        outcome
    }

    pub fn is_failure(&self) -> bool {
        self.kind == OutcomeKind::Failed
    }
}

/// Identity resolution for one occurrence
struct Resolution {
    collid: Option<CollectionId>,
    existing: Option<StoredOccurrence>,
}

/// Converts sealed occurrences into stored rows
pub struct RecordSynthesizer {
    gateway: Arc<dyn OccurrenceGateway + Send + Sync>,
    images: Arc<dyn ImageStore + Send + Sync>,
    resolver: Arc<dyn ImageResolver + Send + Sync>,
    gazetteer: Option<Arc<dyn Gazetteer + Send + Sync>>,
    policy: IngestPolicyConfig,
    urls: DerivativeUrlBuilder,
    unregistered_collection: Regex,
}

impl RecordSynthesizer {
    /// # Errors
    ///
    /// Returns a configuration error when the derivative base URL is invalid.
    pub fn new(
        gateways: Gateways,
        resolver: Arc<dyn ImageResolver + Send + Sync>,
        policy: IngestPolicyConfig,
        derivative_base_url: &str,
    ) -> Result<Self> {
        let unregistered_collection = Regex::new(UNREGISTERED_COLLECTION_PATTERN)
            .map_err(|e| IngestError::Other(format!("Invalid collection error pattern: {e}")))?;

        Ok(Self {
            gateway: gateways.occurrences,
            images: gateways.images,
            resolver,
            gazetteer: None,
            policy,
            urls: DerivativeUrlBuilder::new(derivative_base_url)?,
            unregistered_collection,
        })
    }

    /// Enables georeferencing from place names
    pub fn with_gazetteer(mut self, gazetteer: Arc<dyn Gazetteer + Send + Sync>) -> Self {
        self.gazetteer = Some(gazetteer);
        self
    }

    /// Writes one occurrence with its determinations and images
    pub async fn submit(&self, occurrence: &Occurrence) -> OccurrenceOutcome {
        let resolution = match self.resolve(occurrence).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!(
                    catalog_number = %occurrence.catalog_number,
                    error = %e,
                    "Record lookup failed"
                );
                return OccurrenceOutcome::failed(format!("Error: [{}]", e.message()));
            }
        };

        if let Some(ref existing) = resolution.existing {
            if !self.policy.allow_updates {
                tracing::info!(
                    occid = %existing.occid,
                    catalog_number = %occurrence.catalog_number,
                    "Skipping, record exists and updates are disabled"
                );
                let mut outcome = OccurrenceOutcome::new(OutcomeKind::Skipped);
                outcome.occid = Some(existing.occid);
                return outcome;
            }
        }

        let kind = if resolution.existing.is_some() {
            OutcomeKind::Updated
        } else {
            OutcomeKind::Inserted
        };
        let mut outcome = OccurrenceOutcome::new(kind);

        let record = self
            .build_record(occurrence, &resolution, &mut outcome.warnings)
            .await;

        let occid = match self.gateway.save_occurrence(&record).await {
            Ok(occid) => occid,
            Err(e) => {
                let mut failed = OccurrenceOutcome::failed(format!("Error: [{}]", e.message()));
                failed.errors.extend(self.interpret_save_error(&e, occurrence, resolution.collid));
                failed.warnings = outcome.warnings;
                tracing::error!(
                    catalog_number = %occurrence.catalog_number,
                    error = %e,
                    "Occurrence save failed"
                );
                return failed;
            }
        };
        outcome.occid = Some(occid);

        self.write_determinations(occurrence, occid, &mut outcome.warnings)
            .await;

        let tid = self.media_taxon_id(occurrence, &mut outcome.warnings).await;
        for media in occurrence.associated_media() {
            self.write_image(occurrence, &record, media, occid, tid, &mut outcome.warnings)
                .await;
        }

        tracing::debug!(
            occid = %occid,
            kind = ?outcome.kind,
            warnings = outcome.warnings.len(),
            "Occurrence written"
        );
        outcome
    }

    async fn resolve(&self, occurrence: &Occurrence) -> std::result::Result<Resolution, GatewayError> {
        let collid = self
            .gateway
            .resolve_collection_id(&occurrence.institution_code, &occurrence.collection_code)
            .await?;

        let mut existing = self
            .gateway
            .lookup_by_triplet(
                &occurrence.institution_code,
                &occurrence.collection_code,
                &occurrence.catalog_number,
            )
            .await?;

        // Image uploads create rows carrying only collid and catalog number
        if existing.is_none() {
            if let Some(collid) = collid {
                existing = self
                    .gateway
                    .lookup_by_collection_and_catalog(collid, &occurrence.catalog_number)
                    .await?;
            }
        }

        Ok(Resolution { collid, existing })
    }

    /// Builds the occurrence row
    ///
    /// Taxon and gazetteer lookups that fail are reported as warnings and
    /// the affected columns left unset.
    async fn build_record(
        &self,
        occurrence: &Occurrence,
        resolution: &Resolution,
        warnings: &mut Vec<String>,
    ) -> OccurrenceRecord {
        let identity = match resolution.existing {
            Some(_) => None,
            None => Some(RecordIdentity {
                collection_id: resolution.collid,
                institution_code: occurrence.institution_code.clone(),
                collection_code: occurrence.collection_code.clone(),
                catalog_number: occurrence.catalog_number.clone(),
                processing_status: NEW_RECORD_STATUS.to_string(),
                dbpk: format!("{}{}", occurrence.collection_code, occurrence.catalog_number),
                record_entered_by: occurrence.record_entered_by.clone(),
                date_entered: occurrence.date_modified.clone(),
            }),
        };

        let (recorded_by, associated_collectors) = split_recorded_by(&occurrence.recorded_by);

        let event = occurrence.collecting_event.as_ref().map(|event| EventDates {
            event_date: event.date_portion(),
            year: event.start_year().map(str::to_string),
            month: event.start_month().map(str::to_string),
            day: event.start_day().map(str::to_string),
            verbatim_event_date: event.verbatim_event_date.clone(),
        });

        let year = event.as_ref().and_then(|e| e.year.clone());
        let georeference = self
            .georeference(occurrence, year.as_deref(), warnings)
            .await;

        let taxon = match occurrence.filed_under_identification() {
            Some(filed_under) => Some(self.taxon_fields(filed_under, warnings).await),
            None => None,
        };

        OccurrenceRecord {
            occid: resolution.existing.as_ref().map(|e| e.occid),
            identity,
            occurrence_id: occurrence.occurrence_id.clone(),
            basis_of_record: occurrence.basis_of_record.clone(),
            recorded_by,
            associated_collectors,
            record_number: non_empty(&occurrence.record_number),
            type_status: occurrence.type_status_list(),
            country: normalize_country(&occurrence.country, &self.policy.default_country),
            state_province: non_empty(&occurrence.state_province),
            county: non_empty(&occurrence.county),
            municipality: occurrence.municipality.clone(),
            locality: non_empty(&occurrence.locality),
            occurrence_remarks: non_empty(&occurrence.notes),
            storage_location: non_empty(&occurrence.storage_location),
            event,
            georeference,
            minimum_elevation_in_meters: non_empty(&occurrence.minimum_elevation_in_meters),
            maximum_elevation_in_meters: non_empty(&occurrence.maximum_elevation_in_meters),
            taxon,
            date_last_modified: occurrence.date_last_modified.clone(),
        }
    }

    async fn georeference(
        &self,
        occurrence: &Occurrence,
        year: Option<&str>,
        warnings: &mut Vec<String>,
    ) -> Option<Georeference> {
        let gazetteer = self.gazetteer.as_ref()?;
        match gazetteer
            .lookup(&occurrence.state_province, &occurrence.municipality, year)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warnings.push(format!(
                    "Georeference lookup failed for {} {}: {}",
                    occurrence.state_province,
                    occurrence.municipality,
                    e.message()
                ));
                None
            }
        }
    }

    async fn taxon_fields(
        &self,
        filed_under: &Identification,
        warnings: &mut Vec<String>,
    ) -> TaxonFields {
        let name = filed_under.scientific_name.as_str();

        let tid_interpreted = match self.gateway.resolve_accepted_taxon_id(name).await {
            Ok(tid) => tid,
            Err(e) => {
                warnings.push(format!("Accepted taxon lookup failed for {name}: {}", e.message()));
                None
            }
        };

        let mut family = filed_under.family.clone();
        if family.is_empty() {
            match self.family_for_name(name).await {
                Ok(Some(found)) => family = found,
                Ok(None) => {}
                Err(e) => {
                    warnings.push(format!("Family lookup failed for {name}: {}", e.message()))
                }
            }
        }

        TaxonFields {
            sciname: filed_under.name_without_author(),
            scientific_name: filed_under.name_with_author(),
            tid_interpreted,
            family,
            genus: filed_under.genus.clone(),
            specific_epithet: filed_under.specific_epithet.clone(),
            infraspecific_epithet: filed_under.infraspecific_epithet.clone(),
            identification_qualifier: filed_under.identification_qualifier.clone(),
            scientific_name_authorship: filed_under.scientific_name_authorship.clone(),
            taxon_rank: filed_under.taxon_rank(),
            identified_by: filed_under.identified_by.clone(),
            date_identified: filed_under.date_identified.clone(),
        }
    }

    async fn family_for_name(
        &self,
        name: &str,
    ) -> std::result::Result<Option<String>, GatewayError> {
        match self.gateway.resolve_taxon_id(name).await? {
            Some(tid) => self.gateway.resolve_family_for_taxon_id(tid).await,
            None => Ok(None),
        }
    }

    fn interpret_save_error(
        &self,
        error: &GatewayError,
        occurrence: &Occurrence,
        collid: Option<CollectionId>,
    ) -> Vec<String> {
        if !self.unregistered_collection.is_match(&error.message()) {
            return Vec::new();
        }
        let collid = collid.map(|c| c.to_string()).unwrap_or_default();
        vec![
            UNREGISTERED_COLLECTION_INTERPRETATION.to_string(),
            format!(
                "collid=[{collid}], institutionCode=[{}], collectionCode=[{}]",
                occurrence.institution_code, occurrence.collection_code
            ),
        ]
    }

    async fn write_determinations(
        &self,
        occurrence: &Occurrence,
        occid: OccurrenceId,
        warnings: &mut Vec<String>,
    ) {
        let current = occurrence.filed_under_index();
        for (index, identification) in occurrence.identifications().iter().enumerate() {
            let record = DeterminationRecord {
                occid,
                sciname: identification.scientific_name.clone(),
                scientific_name_authorship: identification.scientific_name_authorship.clone(),
                identification_remarks: identification_remarks(
                    &identification.type_status,
                    identification.nomenclatural_code_or_default(),
                ),
                identified_by: identification.identified_by.clone(),
                date_identified: identification.date_identified.clone(),
                identification_qualifier: identification.identification_qualifier.trim().to_string(),
                is_current: current == Some(index),
            };

            if let Err(e) = self.gateway.save_determination(&record).await {
                tracing::warn!(
                    occid = %occid,
                    sciname = %record.sciname,
                    error = %e,
                    "Determination save failed"
                );
                warnings.push(format!(
                    "Determination {} for occid {occid} not saved: {}",
                    record.sciname,
                    e.message()
                ));
            }
        }
    }

    async fn media_taxon_id(
        &self,
        occurrence: &Occurrence,
        warnings: &mut Vec<String>,
    ) -> Option<TaxonId> {
        if occurrence.associated_media().is_empty() {
            return None;
        }
        let name = occurrence.filed_under_identification()?.scientific_name.as_str();
        match self.gateway.resolve_taxon_id(name).await {
            Ok(tid) => tid,
            Err(e) => {
                warnings.push(format!("Taxon lookup failed for {name}: {}", e.message()));
                None
            }
        }
    }

    async fn write_image(
        &self,
        occurrence: &Occurrence,
        record: &OccurrenceRecord,
        media: &AssociatedMedia,
        occid: OccurrenceId,
        tid: Option<TaxonId>,
        warnings: &mut Vec<String>,
    ) {
        let mut urls = MediaUrls::default();
        for access_point in media.access_points() {
            let resolution = match self.resolver.resolve(&access_point.access_uri).await {
                Ok(resolution) => resolution,
                Err(e) => {
                    tracing::warn!(
                        access_uri = %access_point.access_uri,
                        error = %e,
                        "Image lookup failed"
                    );
                    warnings.push(format!(
                        "Image lookup failed for {}: {e}",
                        access_point.access_uri
                    ));
                    continue;
                }
            };

            let format = access_point.media_format();
            if !urls.apply(&format, &resolution.resource_id, &self.urls) {
                warnings.push(format!(
                    "Unsupported image format [{format}] for {}",
                    access_point.access_uri
                ));
            }
        }

        if urls.is_empty() {
            warnings.push(format!(
                "No image URLs resolved for media {} on occid {occid}",
                media.guid
            ));
            return;
        }

        let sciname = occurrence
            .filed_under_identification()
            .map(|id| id.scientific_name.as_str())
            .unwrap_or_default();

        let image = ImageRecord {
            occid,
            tid,
            web_url: urls.web_url,
            thumbnail_url: urls.thumbnail_url,
            large_url: urls.large_url,
            source_url: urls.source_url,
            caption: format!(
                "{} {} {sciname}",
                occurrence.collection_code, occurrence.catalog_number
            ),
            photographer: occurrence.record_entered_by.clone(),
            copyright: media.rights.clone(),
            owner: media.owner.clone(),
            locality: locality_line(&[
                record.country.as_str(),
                occurrence.state_province.as_str(),
                occurrence.county.as_str(),
                occurrence.municipality.as_str(),
                occurrence.locality.as_str(),
            ]),
            notes: media.usage_terms.clone(),
            sort_sequence: self.policy.default_image_sort_sequence,
            image_type: SPECIMEN_IMAGE_TYPE.to_string(),
        };

        let saved = match self.images.find_by_source_url(image.lookup_url()).await {
            Ok(Some(stored)) => self.images.update(stored.imgid, &image).await,
            Ok(None) => self.images.insert(&image).await.map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(e) = saved {
            tracing::warn!(occid = %occid, error = %e, "Image record save failed");
            warnings.push(format!(
                "Image record for {} not saved: {}",
                image.lookup_url(),
                e.message()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        MemoryGateway, MemoryGazetteer, MemoryImageResolver, MemoryImageStore,
    };
    use crate::domain::{AccessPoint, CollectingEvent};

    const BASE: &str = "http://images.example.org/image/";

    fn collid() -> CollectionId {
        CollectionId::new(5).unwrap()
    }

    struct Harness {
        gateway: Arc<MemoryGateway>,
        images: Arc<MemoryImageStore>,
        synthesizer: RecordSynthesizer,
    }

    fn harness(gateway: MemoryGateway, allow_updates: bool) -> Harness {
        let gateway = Arc::new(gateway);
        let images = Arc::new(MemoryImageStore::new());
        let resolver = Arc::new(
            MemoryImageResolver::new().with_unknown("http://herbaria.example.org/missing.jpg"),
        );
        let policy = IngestPolicyConfig {
            allow_updates,
            ..IngestPolicyConfig::default()
        };
        let synthesizer = RecordSynthesizer::new(
            Gateways {
                occurrences: gateway.clone(),
                images: images.clone(),
            },
            resolver,
            policy,
            BASE,
        )
        .unwrap();
        Harness {
            gateway,
            images,
            synthesizer,
        }
    }

    fn registered() -> MemoryGateway {
        MemoryGateway::new()
            .with_collection(collid(), "HUH", "NEVP")
            .with_taxon("Carex alba", TaxonId::new(40).unwrap(), "Cyperaceae")
            .with_taxon("Carex alba L.", TaxonId::new(40).unwrap(), "Cyperaceae")
    }

    fn identification(name: &str, filed_under: &str) -> Identification {
        Identification {
            scientific_name: name.to_string(),
            genus: "Carex".to_string(),
            specific_epithet: "alba".to_string(),
            is_filed_under_name_in_collection: filed_under.to_string(),
            ..Identification::default()
        }
    }

    fn occurrence() -> Occurrence {
        let mut occ = Occurrence::new("urn:uuid:occ-1");
        occ.institution_code = "HUH".to_string();
        occ.collection_code = "NEVP".to_string();
        occ.catalog_number = "00101".to_string();
        occ.recorded_by = "Smith, J.; Doe, A.".to_string();
        occ.country = "United States".to_string();
        occ.state_province = "Maine".to_string();
        occ.municipality = "Orono".to_string();
        occ.date_modified = "2013-11-02".to_string();
        occ.record_entered_by = "Annotator".to_string();
        let mut event = CollectingEvent::new();
        event.append_event_date("2001-05-17T00:00:00");
        occ.collecting_event = Some(event);
        occ.push_identification(identification("Carex lurida", ""));
        let mut filed_under = identification("Carex alba L.", "NEVP");
        filed_under.scientific_name_authorship = "L.".to_string();
        occ.push_identification(filed_under);
        occ
    }

    fn media(uri: &str, format: &str) -> AssociatedMedia {
        let mut media = AssociatedMedia::new();
        media.guid = "urn:uuid:img".to_string();
        media.rights = "CC-BY".to_string();
        let mut ap = AccessPoint::new();
        ap.access_uri = uri.to_string();
        ap.format = format.to_string();
        media.push_access_point(ap);
        media
    }

    #[tokio::test]
    async fn test_insert_derives_fields() {
        let h = harness(registered(), false);
        let outcome = h.synthesizer.submit(&occurrence()).await;
        assert_eq!(outcome.kind, OutcomeKind::Inserted, "{outcome:?}");

        let stored = h.gateway.occurrences().await.remove(0);
        assert_eq!(stored.recorded_by, "Smith, J.");
        assert_eq!(stored.associated_collectors, " Doe, A.");
        assert_eq!(stored.country, "United States of America");
        let event = stored.event.unwrap();
        assert_eq!(event.event_date, "2001-05-17");
        assert_eq!(event.year.as_deref(), Some("2001"));
        assert_eq!(event.month.as_deref(), Some("05"));
        assert_eq!(event.day.as_deref(), Some("17"));

        let taxon = stored.taxon.unwrap();
        assert_eq!(taxon.sciname, "Carex alba");
        assert_eq!(taxon.scientific_name, "Carex alba L.");
        assert_eq!(taxon.taxon_rank, "species");

        let identity = stored.identity.unwrap();
        assert_eq!(identity.collection_id, Some(collid()));
        assert_eq!(identity.dbpk, "NEVP00101");
        assert_eq!(identity.processing_status, "unprocessed");
        assert_eq!(identity.date_entered, "2013-11-02");
    }

    #[tokio::test]
    async fn test_determinations_mark_filed_under() {
        let h = harness(registered(), false);
        let outcome = h.synthesizer.submit(&occurrence()).await;
        assert_eq!(outcome.kind, OutcomeKind::Inserted);

        let dets = h.gateway.determinations().await;
        assert_eq!(dets.len(), 2);
        assert!(!dets[0].is_current);
        assert!(dets[1].is_current);
        assert_eq!(dets[1].identification_remarks, "[ICNAFP]");
    }

    #[tokio::test]
    async fn test_existing_record_skipped_without_updates() {
        let h = harness(registered(), false);
        assert_eq!(h.synthesizer.submit(&occurrence()).await.kind, OutcomeKind::Inserted);

        let second = h.synthesizer.submit(&occurrence()).await;
        assert_eq!(second.kind, OutcomeKind::Skipped);
        assert!(second.errors.is_empty());
        assert_eq!(h.gateway.occurrence_count().await, 1);
    }

    #[tokio::test]
    async fn test_existing_record_updated_when_allowed() {
        let h = harness(registered(), true);
        let first = h.synthesizer.submit(&occurrence()).await;

        let mut occ = occurrence();
        occ.locality = "Along the river".to_string();
        let second = h.synthesizer.submit(&occ).await;
        assert_eq!(second.kind, OutcomeKind::Updated);
        assert_eq!(second.occid, first.occid);

        let stored = h.gateway.occurrences().await.remove(0);
        assert_eq!(stored.locality.as_deref(), Some("Along the river"));
        assert_eq!(stored.identity.unwrap().catalog_number, "00101");
    }

    #[tokio::test]
    async fn test_unregistered_collection_is_interpreted() {
        let h = harness(MemoryGateway::new(), false);
        let outcome = h.synthesizer.submit(&occurrence()).await;

        assert!(outcome.is_failure());
        assert!(outcome.errors[0].starts_with("Error: [Cannot add or update a child row"));
        assert!(outcome.errors[1].starts_with("Interpretation:"));
        assert_eq!(
            outcome.errors[2],
            "collid=[], institutionCode=[HUH], collectionCode=[NEVP]"
        );
    }

    #[tokio::test]
    async fn test_images_written_and_failures_warned() {
        let h = harness(registered(), false);
        let mut occ = occurrence();
        occ.push_media(media("http://herbaria.example.org/00-abc", "image/jpeg"));
        occ.push_media(media("http://herbaria.example.org/missing.jpg", "jpg"));

        let outcome = h.synthesizer.submit(&occ).await;
        assert_eq!(outcome.kind, OutcomeKind::Inserted);
        assert_eq!(outcome.warnings.len(), 2, "{:?}", outcome.warnings);

        let images = h.images.images().await;
        assert_eq!(images.len(), 1);
        let image = &images[0].record;
        assert_eq!(
            image.large_url,
            format!("{BASE}00-abc?rotate=guess&format=jpeg,quality,100")
        );
        assert_eq!(image.caption, "NEVP 00101 Carex alba L.");
        assert_eq!(image.photographer, "Annotator");
        assert_eq!(image.copyright, "CC-BY");
        assert_eq!(image.locality, "United States of America Maine Orono");
        assert_eq!(image.tid, TaxonId::new(40).ok());
        assert_eq!(image.sort_sequence, 50);
        assert_eq!(image.image_type, "specimen");
    }

    #[tokio::test]
    async fn test_image_upsert_reuses_row() {
        let h = harness(registered(), true);
        let mut occ = occurrence();
        occ.push_media(media("http://herbaria.example.org/00-raw", "dng"));

        h.synthesizer.submit(&occ).await;
        h.synthesizer.submit(&occ).await;

        let images = h.images.images().await;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].record.source_url, format!("{BASE}00-raw"));
    }

    #[tokio::test]
    async fn test_family_backfilled_and_georeferenced() {
        let georef = Georeference {
            decimal_latitude: 44.88,
            decimal_longitude: -68.67,
            coordinate_uncertainty_in_meters: Some(3000),
            geodetic_datum: "WGS84".to_string(),
            georeferenced_by: "gazetteer".to_string(),
            georeference_protocol: String::new(),
            georeference_sources: String::new(),
        };
        let h = harness(registered(), false);
        let synthesizer = h.synthesizer.with_gazetteer(Arc::new(
            MemoryGazetteer::new().with_place("Maine", "Orono", georef.clone()),
        ));

        let mut occ = Occurrence::new("urn:uuid:occ-2");
        occ.institution_code = "HUH".to_string();
        occ.collection_code = "NEVP".to_string();
        occ.catalog_number = "00102".to_string();
        occ.state_province = "Maine".to_string();
        occ.municipality = "Orono".to_string();
        occ.push_identification(identification("Carex alba", ""));

        assert_eq!(synthesizer.submit(&occ).await.kind, OutcomeKind::Inserted);
        let stored = h.gateway.occurrences().await.remove(0);
        let taxon = stored.taxon.unwrap();
        assert_eq!(taxon.family, "Cyperaceae");
        assert_eq!(taxon.tid_interpreted, TaxonId::new(40).ok());
        assert_eq!(stored.georeference, Some(georef));
    }
}
