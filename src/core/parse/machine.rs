//! Annotation state machine
//!
//! Consumes [`XmlEvent`]s and assembles the nested domain model. Each scope
//! (annotation, annotator, occurrence, identification, collecting event,
//! associated media, access point) has at most one builder in progress.
//! Builders are created when their element opens, receive text while open,
//! and are moved into their parent when the sealing element closes.

use tracing::{debug, warn};

use super::reader::{find_attribute, XmlEvent};
use super::tags::{Scope, Tag, TextTarget};
use crate::domain::{
    AccessPoint, Annotation, Annotator, AssociatedMedia, CollectingEvent, Expectation,
    Identification, Occurrence,
};

/// Parser context for one document
#[derive(Debug, Default)]
pub struct AnnotationStateMachine {
    open_elements: Vec<String>,
    annotation: Option<Annotation>,
    annotator: Option<Annotator>,
    occurrence: Option<Occurrence>,
    identification: Option<Identification>,
    event: Option<CollectingEvent>,
    media: Option<AssociatedMedia>,
    access_point: Option<AccessPoint>,
    expected_annotations: Option<u64>,
    occurrences_seen: u64,
    annotations_closed: u64,
}

impl AnnotationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotation count declared by the document, if any
    pub fn expected_annotations(&self) -> Option<u64> {
        self.expected_annotations
    }

    /// Number of occurrence elements closed so far
    pub fn occurrences_seen(&self) -> u64 {
        self.occurrences_seen
    }

    /// Number of annotation elements closed so far
    pub fn annotations_closed(&self) -> u64 {
        self.annotations_closed
    }

    /// Feeds one event; returns the sealed annotation when one closes
    pub fn handle(&mut self, event: XmlEvent) -> Option<Annotation> {
        match event {
            XmlEvent::Start { name, attributes } => {
                if let Some(tag) = Tag::from_name(&name) {
                    self.open(tag, &name, &attributes);
                }
                self.open_elements.push(name);
                None
            }
            XmlEvent::End { name } => {
                self.open_elements.pop();
                Tag::from_name(&name).and_then(|tag| self.close(tag))
            }
            XmlEvent::Text(text) => {
                self.text(&text);
                None
            }
        }
    }

    fn open(&mut self, tag: Tag, name: &str, attributes: &[(String, String)]) {
        let about = find_attribute(attributes, "rdf:about").unwrap_or_default();
        let resource = find_attribute(attributes, "rdf:resource").unwrap_or_default();

        match tag {
            Tag::Annotation => {
                self.annotation = Some(Annotation::new(about));
            }
            Tag::ExpectationInsert => {
                if let Some(annotation) = self.annotation.as_mut() {
                    annotation.expectation = Expectation::Insert;
                }
            }
            Tag::ExpectationUpdate => {
                if let Some(annotation) = self.annotation.as_mut() {
                    annotation.expectation = Expectation::Update;
                }
            }
            Tag::Transcribing => {
                if let Some(annotation) = self.annotation.as_mut() {
                    annotation.motivations.push(name.to_string());
                }
            }
            Tag::MotivatedBy => {
                if let Some(annotation) = self.annotation.as_mut() {
                    if !resource.is_empty() {
                        annotation.motivations.push(resource.to_string());
                    }
                }
            }
            Tag::AnnotatedBy => {
                self.annotator = Some(Annotator::new());
            }
            Tag::Occurrence => {
                if self.occurrence.is_some() {
                    debug!(element = name, "Replacing unsealed occurrence");
                }
                self.occurrence = Some(Occurrence::new(about));
            }
            Tag::Identification => {
                self.identification = Some(Identification::new());
            }
            Tag::Event => {
                self.event = Some(CollectingEvent::new());
            }
            Tag::HasCollectionById => {
                if let Some(occurrence) = self.occurrence.as_mut() {
                    occurrence.collection_id = resource.to_string();
                }
            }
            Tag::HasAssociatedMedia => {
                self.media = Some(AssociatedMedia::new());
            }
            Tag::Image => {
                if let Some(media) = self.media.as_mut() {
                    media.guid = about.to_string();
                }
            }
            Tag::HasAccessPoint => {
                self.access_point = Some(AccessPoint::new());
            }
            Tag::HasBasisOfRecord => {
                if let Some(occurrence) = self.occurrence.as_mut() {
                    let basis = resource.rsplit('/').next().unwrap_or_default();
                    if !basis.is_empty() {
                        occurrence.basis_of_record = basis.to_string();
                    }
                }
            }
            Tag::HasTaxonId => {
                if let Some(identification) = self.identification.as_mut() {
                    if !resource.is_empty() {
                        identification.taxon_id = resource.to_string();
                    }
                }
            }
            Tag::HasCollectingEvent => {}
        }
    }

    fn close(&mut self, tag: Tag) -> Option<Annotation> {
        match tag {
            Tag::Identification => match (self.identification.take(), self.occurrence.as_mut()) {
                (Some(identification), Some(occurrence)) => {
                    occurrence.push_identification(identification)
                }
                _ => debug!("Identification closed outside an occurrence"),
            },
            Tag::HasCollectingEvent => match (self.event.take(), self.occurrence.as_mut()) {
                (Some(event), Some(occurrence)) => occurrence.collecting_event = Some(event),
                _ => debug!("Collecting event closed outside an occurrence"),
            },
            Tag::AnnotatedBy => match (self.annotator.take(), self.annotation.as_mut()) {
                (Some(annotator), Some(annotation)) => annotation.annotator = Some(annotator),
                _ => debug!("Annotator closed outside an annotation"),
            },
            Tag::HasAssociatedMedia => match (self.media.take(), self.occurrence.as_mut()) {
                (Some(media), Some(occurrence)) => occurrence.push_media(media),
                _ => debug!("Associated media closed outside an occurrence"),
            },
            Tag::HasAccessPoint => match (self.access_point.take(), self.media.as_mut()) {
                (Some(access_point), Some(media)) => media.push_access_point(access_point),
                _ => debug!("Access point closed outside associated media"),
            },
            Tag::Occurrence => {
                self.occurrences_seen += 1;
            }
            Tag::Annotation => return self.commit(),
            _ => {}
        }
        None
    }

    fn commit(&mut self) -> Option<Annotation> {
        let mut annotation = self.annotation.take()?;
        self.annotations_closed += 1;

        let mut occurrence = self.occurrence.take();
        if let Some(occurrence) = occurrence.as_mut() {
            occurrence.record_entered_by = annotation.annotator_name().to_string();
        }
        annotation.occurrence = occurrence;

        self.identification = None;
        self.event = None;
        self.media = None;
        self.access_point = None;

        Some(annotation)
    }

    fn text(&mut self, text: &str) {
        let Some(element) = self.open_elements.last() else {
            return;
        };
        let Some(target) = TextTarget::from_name(element) else {
            return;
        };

        let landed = match target.scope() {
            Scope::Document => {
                match text.parse::<u64>() {
                    Ok(count) => self.expected_annotations = Some(count),
                    Err(_) => warn!(text, "Ignoring non-numeric annotation count"),
                }
                true
            }
            Scope::Annotation => self
                .annotation
                .as_mut()
                .map(|annotation| annotation.annotated_at.push_str(text))
                .is_some(),
            Scope::Annotator => self
                .annotator
                .as_mut()
                .map(|annotator| apply_annotator(annotator, target, text))
                .is_some(),
            Scope::Occurrence => self
                .occurrence
                .as_mut()
                .map(|occurrence| apply_occurrence(occurrence, target, text))
                .is_some(),
            Scope::Identification => self
                .identification
                .as_mut()
                .map(|identification| apply_identification(identification, target, text))
                .is_some(),
            Scope::Event => self
                .event
                .as_mut()
                .map(|event| apply_event(event, target, text))
                .is_some(),
            Scope::Media => self
                .media
                .as_mut()
                .map(|media| apply_media(media, target, text))
                .is_some(),
            Scope::AccessPoint => self
                .access_point
                .as_mut()
                .map(|access_point| apply_access_point(access_point, target, text))
                .is_some(),
        };

        if !landed {
            debug!(?target, "Dropping text with no open builder");
        }
    }
}

fn apply_annotator(annotator: &mut Annotator, target: TextTarget, text: &str) {
    let field = match target {
        TextTarget::AnnotatorName => &mut annotator.name,
        TextTarget::AnnotatorMbox => &mut annotator.mbox_sha1sum,
        TextTarget::AnnotatorHomepage => &mut annotator.workplace_homepage,
        _ => return,
    };
    field.push_str(text);
}

fn apply_occurrence(occurrence: &mut Occurrence, target: TextTarget, text: &str) {
    let field = match target {
        TextTarget::InstitutionCode => &mut occurrence.institution_code,
        TextTarget::CollectionCode => &mut occurrence.collection_code,
        TextTarget::CatalogNumber => &mut occurrence.catalog_number,
        TextTarget::DateLastModified => &mut occurrence.date_last_modified,
        TextTarget::RecordedBy => &mut occurrence.recorded_by,
        TextTarget::RecordNumber => &mut occurrence.record_number,
        TextTarget::Country => &mut occurrence.country,
        TextTarget::StateProvince => &mut occurrence.state_province,
        TextTarget::County => &mut occurrence.county,
        TextTarget::Municipality => &mut occurrence.municipality,
        TextTarget::Locality => &mut occurrence.locality,
        TextTarget::Notes => &mut occurrence.notes,
        TextTarget::MinimumElevation => &mut occurrence.minimum_elevation_in_meters,
        TextTarget::MaximumElevation => &mut occurrence.maximum_elevation_in_meters,
        TextTarget::DateModified => &mut occurrence.date_modified,
        TextTarget::StorageLocation => &mut occurrence.storage_location,
        _ => return,
    };
    field.push_str(text);
}

fn apply_identification(identification: &mut Identification, target: TextTarget, text: &str) {
    let field = match target {
        TextTarget::ScientificName => &mut identification.scientific_name,
        TextTarget::Family => &mut identification.family,
        TextTarget::Genus => &mut identification.genus,
        TextTarget::IdentificationQualifier => &mut identification.identification_qualifier,
        TextTarget::SpecificEpithet => &mut identification.specific_epithet,
        TextTarget::ScientificNameAuthorship => &mut identification.scientific_name_authorship,
        TextTarget::InfraspecificEpithet => &mut identification.infraspecific_epithet,
        TextTarget::InfraspecificRank => &mut identification.infraspecific_rank,
        TextTarget::NomenclaturalCode => identification
            .nomenclatural_code
            .get_or_insert_with(String::new),
        TextTarget::IdentifiedBy => &mut identification.identified_by,
        TextTarget::DateIdentified => &mut identification.date_identified,
        TextTarget::TaxonId => &mut identification.taxon_id,
        TextTarget::FiledUnderNameInCollection => {
            &mut identification.is_filed_under_name_in_collection
        }
        TextTarget::TypeStatus => &mut identification.type_status,
        _ => return,
    };
    field.push_str(text);
}

fn apply_event(event: &mut CollectingEvent, target: TextTarget, text: &str) {
    match target {
        TextTarget::EventDate => event.append_event_date(text),
        TextTarget::VerbatimEventDate => event.verbatim_event_date.push_str(text),
        TextTarget::Year => event.append_year(text),
        TextTarget::Month => event.append_month(text),
        TextTarget::Day => event.append_day(text),
        _ => {}
    }
}

fn apply_media(media: &mut AssociatedMedia, target: TextTarget, text: &str) {
    let field = match target {
        TextTarget::Rights => &mut media.rights,
        TextTarget::Owner => &mut media.owner,
        TextTarget::UsageTerms => &mut media.usage_terms,
        _ => return,
    };
    field.push_str(text);
}

fn apply_access_point(access_point: &mut AccessPoint, target: TextTarget, text: &str) {
    let field = match target {
        TextTarget::Variant => &mut access_point.variant,
        TextTarget::AccessUri => &mut access_point.access_uri,
        TextTarget::Format => &mut access_point.format,
        TextTarget::HashFunction => &mut access_point.hash_function,
        TextTarget::HashValue => &mut access_point.hash_value,
        _ => return,
    };
    field.push_str(text);
}
