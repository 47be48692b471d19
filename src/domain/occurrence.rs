//! Occurrence: one physical specimen record carried as an annotation body

use serde::{Deserialize, Serialize};

use super::event::CollectingEvent;
use super::identification::Identification;
use super::media::AssociatedMedia;

/// Basis of record assumed when the document does not reference one
pub const DEFAULT_BASIS_OF_RECORD: &str = "PreservedSpecimen";

/// A specimen occurrence as described by the annotation document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// `rdf:about` of the occurrence element
    pub occurrence_id: String,
    pub basis_of_record: String,
    pub institution_code: String,
    pub collection_code: String,
    /// Resource reference from `dwcFP:hasCollectionByID`
    pub collection_id: String,
    pub catalog_number: String,
    /// Raw collector string, possibly several names joined with `;`
    pub recorded_by: String,
    pub record_number: String,
    pub country: String,
    pub state_province: String,
    pub county: String,
    pub municipality: String,
    pub locality: String,
    pub notes: String,
    pub minimum_elevation_in_meters: String,
    pub maximum_elevation_in_meters: String,
    /// Text of `dc:created`
    pub date_last_modified: String,
    /// Text of `dwc:modified`
    pub date_modified: String,
    pub storage_location: String,
    pub collecting_event: Option<CollectingEvent>,
    identifications: Vec<Identification>,
    associated_media: Vec<AssociatedMedia>,
    /// Name of the annotator, stamped when the enclosing annotation closes
    pub record_entered_by: String,
}

impl Default for Occurrence {
    fn default() -> Self {
        Self {
            occurrence_id: String::new(),
            basis_of_record: DEFAULT_BASIS_OF_RECORD.to_string(),
            institution_code: String::new(),
            collection_code: String::new(),
            collection_id: String::new(),
            catalog_number: String::new(),
            recorded_by: String::new(),
            record_number: String::new(),
            country: String::new(),
            state_province: String::new(),
            county: String::new(),
            municipality: String::new(),
            locality: String::new(),
            notes: String::new(),
            minimum_elevation_in_meters: String::new(),
            maximum_elevation_in_meters: String::new(),
            date_last_modified: String::new(),
            date_modified: String::new(),
            storage_location: String::new(),
            collecting_event: None,
            identifications: Vec::new(),
            associated_media: Vec::new(),
            record_entered_by: String::new(),
        }
    }
}

impl Occurrence {
    /// Creates an occurrence for the given `rdf:about` value
    pub fn new(occurrence_id: impl Into<String>) -> Self {
        Self {
            occurrence_id: occurrence_id.into(),
            ..Self::default()
        }
    }

    /// Identifications in document order
    pub fn identifications(&self) -> &[Identification] {
        &self.identifications
    }

    /// Associated media in document order
    pub fn associated_media(&self) -> &[AssociatedMedia] {
        &self.associated_media
    }

    pub fn push_identification(&mut self, identification: Identification) {
        self.identifications.push(identification);
    }

    pub fn push_media(&mut self, media: AssociatedMedia) {
        self.associated_media.push(media);
    }

    /// Index of the identification the collection files this specimen under.
    ///
    /// Defaults to the first identification; every identification flagged as
    /// filed under this occurrence's collection code replaces the choice, so
    /// the last flagged one wins.
    pub fn filed_under_index(&self) -> Option<usize> {
        if self.identifications.is_empty() {
            return None;
        }
        let flagged = self
            .identifications
            .iter()
            .rposition(|id| id.is_filed_under(&self.collection_code));
        Some(flagged.unwrap_or(0))
    }

    /// The identification used for the record's taxon display fields
    pub fn filed_under_identification(&self) -> Option<&Identification> {
        self.filed_under_index().map(|i| &self.identifications[i])
    }

    /// Distinct non-empty type statuses, in first-seen order, comma-joined
    pub fn type_status_list(&self) -> String {
        let mut seen: Vec<&str> = Vec::new();
        for id in &self.identifications {
            let status = id.type_status.trim();
            if !status.is_empty() && !seen.contains(&status) {
                seen.push(status);
            }
        }
        seen.join(",")
    }
}
