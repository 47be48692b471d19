//! Taxonomic identification (determination) of an occurrence

use serde::{Deserialize, Serialize};

/// Nomenclatural code assumed when a document does not state one
pub const DEFAULT_NOMENCLATURAL_CODE: &str = "ICNAFP";

/// One taxonomic determination applied to an occurrence.
///
/// All text fields accumulate character data in document order; an absent
/// element leaves the field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub scientific_name: String,
    pub family: String,
    pub genus: String,
    pub specific_epithet: String,
    pub infraspecific_epithet: String,
    pub infraspecific_rank: String,
    pub identification_qualifier: String,
    pub scientific_name_authorship: String,
    /// Stated nomenclatural code, `None` until text for it arrives
    pub nomenclatural_code: Option<String>,
    pub identified_by: String,
    pub date_identified: String,
    pub type_status: String,
    /// Collection code under which the collection files this name
    pub is_filed_under_name_in_collection: String,
    /// Opaque reference to an external taxon concept; never resolved locally
    pub taxon_id: String,
}

impl Identification {
    /// Creates an empty identification
    pub fn new() -> Self {
        Self::default()
    }

    /// The stated nomenclatural code, or ICNAFP when none was given
    pub fn nomenclatural_code_or_default(&self) -> &str {
        match self.nomenclatural_code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => DEFAULT_NOMENCLATURAL_CODE,
        }
    }

    /// Scientific name with any authorship suffix removed.
    ///
    /// Containment is a plain substring test: when the authorship occurs
    /// anywhere in the scientific name, everything from that position on is
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use occurrence_ingest::domain::Identification;
    ///
    /// let id = Identification {
    ///     scientific_name: "Carex alba L.".to_string(),
    ///     scientific_name_authorship: "L.".to_string(),
    ///     ..Identification::default()
    /// };
    /// assert_eq!(id.name_without_author(), "Carex alba");
    /// ```
    pub fn name_without_author(&self) -> String {
        let authorship = self.scientific_name_authorship.as_str();
        if authorship.is_empty() {
            return self.scientific_name.trim().to_string();
        }
        match self.scientific_name.find(authorship) {
            Some(position) => self.scientific_name[..position].trim().to_string(),
            None => self.scientific_name.clone(),
        }
    }

    /// Scientific name with the authorship appended unless already present
    pub fn name_with_author(&self) -> String {
        let authorship = self.scientific_name_authorship.as_str();
        if self.scientific_name.contains(authorship) {
            return self.scientific_name.clone();
        }
        format!("{} {}", self.scientific_name, authorship)
            .trim()
            .to_string()
    }

    /// Taxon rank for display.
    ///
    /// An explicit infraspecific rank wins. Otherwise the rank is inferred
    /// from which name parts are populated.
    pub fn taxon_rank(&self) -> String {
        if !self.infraspecific_rank.is_empty() {
            return self.infraspecific_rank.clone();
        }
        if !self.infraspecific_epithet.is_empty() {
            "subspecies".to_string()
        } else if !self.specific_epithet.is_empty() {
            "species".to_string()
        } else if !self.genus.is_empty() {
            "genus".to_string()
        } else {
            String::new()
        }
    }

    /// Whether this identification is the one the collection files under
    pub fn is_filed_under(&self, collection_code: &str) -> bool {
        self.is_filed_under_name_in_collection == collection_code
    }
}
