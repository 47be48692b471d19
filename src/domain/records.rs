//! Output records written to the collection database
//!
//! These are the flat, Symbiota-shaped rows produced from one sealed
//! occurrence: an occurrence row, one determination row per identification
//! and one image row per associated media item.

use serde::{Deserialize, Serialize};

use super::ids::{CollectionId, ImageId, OccurrenceId, TaxonId};

/// A record already present in the collection database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOccurrence {
    pub occid: OccurrenceId,
    pub collection_id: Option<CollectionId>,
    pub institution_code: String,
    pub collection_code: String,
    pub catalog_number: String,
}

/// Identity columns written only when a record is first created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIdentity {
    /// Collection the record belongs to; `None` when the code pair is not registered
    pub collection_id: Option<CollectionId>,
    pub institution_code: String,
    pub collection_code: String,
    pub catalog_number: String,
    pub processing_status: String,
    /// Source primary key: collection code followed by catalog number
    pub dbpk: String,
    pub record_entered_by: String,
    pub date_entered: String,
}

/// Event date columns copied from the collecting event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDates {
    pub event_date: String,
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub verbatim_event_date: String,
}

/// Taxon display columns taken from the filed-under identification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonFields {
    /// Name without authorship
    pub sciname: String,
    /// Name with authorship
    pub scientific_name: String,
    pub tid_interpreted: Option<TaxonId>,
    pub family: String,
    pub genus: String,
    pub specific_epithet: String,
    pub infraspecific_epithet: String,
    pub identification_qualifier: String,
    pub scientific_name_authorship: String,
    pub taxon_rank: String,
    pub identified_by: String,
    pub date_identified: String,
}

/// Coordinates assigned from a gazetteer match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Georeference {
    pub decimal_latitude: f64,
    pub decimal_longitude: f64,
    pub coordinate_uncertainty_in_meters: Option<i32>,
    pub geodetic_datum: String,
    pub georeferenced_by: String,
    pub georeference_protocol: String,
    pub georeference_sources: String,
}

/// The occurrence row to insert or update.
///
/// Optional text columns are `None` when the document gave no value, in
/// which case an update leaves the stored column untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    /// Key of the stored record this row updates; `None` for inserts
    pub occid: Option<OccurrenceId>,
    /// Identity columns; present only for inserts
    pub identity: Option<RecordIdentity>,
    pub occurrence_id: String,
    pub basis_of_record: String,
    pub recorded_by: String,
    pub associated_collectors: String,
    pub record_number: Option<String>,
    pub type_status: String,
    pub country: String,
    pub state_province: Option<String>,
    pub county: Option<String>,
    pub municipality: String,
    pub locality: Option<String>,
    pub occurrence_remarks: Option<String>,
    pub storage_location: Option<String>,
    pub event: Option<EventDates>,
    pub georeference: Option<Georeference>,
    pub minimum_elevation_in_meters: Option<String>,
    pub maximum_elevation_in_meters: Option<String>,
    pub taxon: Option<TaxonFields>,
    pub date_last_modified: String,
}

impl OccurrenceRecord {
    /// Whether this row updates an existing record
    pub fn is_update(&self) -> bool {
        self.occid.is_some()
    }
}

/// One determination row, keyed by the persisted occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminationRecord {
    pub occid: OccurrenceId,
    pub sciname: String,
    pub scientific_name_authorship: String,
    /// Type status followed by the bracketed nomenclatural code
    pub identification_remarks: String,
    pub identified_by: String,
    pub date_identified: String,
    pub identification_qualifier: String,
    /// Marks the determination the collection files the specimen under
    pub is_current: bool,
}

/// One image row derived from an associated media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub occid: OccurrenceId,
    pub tid: Option<TaxonId>,
    pub web_url: String,
    pub thumbnail_url: String,
    pub large_url: String,
    pub source_url: String,
    pub caption: String,
    pub photographer: String,
    pub copyright: String,
    pub owner: String,
    pub locality: String,
    pub notes: String,
    pub sort_sequence: i32,
    pub image_type: String,
}

impl ImageRecord {
    /// URL used to find an existing row for this image
    pub fn lookup_url(&self) -> &str {
        if self.source_url.is_empty() {
            &self.large_url
        } else {
            &self.source_url
        }
    }
}

/// Image row as stored, with its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub imgid: ImageId,
    pub record: ImageRecord,
}
