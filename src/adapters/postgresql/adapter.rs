//! PostgreSQL adapter implementing the gateway traits
//!
//! Occurrence, determination and image rows are written to the Symbiota-shaped
//! tables created by `migrations/001_initial_schema.sql`. Optional columns
//! the document left empty are omitted from the statement, so an update
//! never blanks a stored value.

use crate::adapters::database::traits::{GatewayResult, ImageStore, OccurrenceGateway};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::domain::ids::{CollectionId, ImageId, OccurrenceId, TaxonId};
use crate::domain::{
    DeterminationRecord, GatewayError, ImageRecord, OccurrenceRecord, StoredImage,
    StoredOccurrence,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

/// PostgreSQL implementation of the gateway traits
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn find_occurrence(
        &self,
        filter: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> GatewayResult<Option<StoredOccurrence>> {
        let query = format!(
            "SELECT occid, collid, institutioncode, collectioncode, catalognumber \
             FROM omoccurrences WHERE {filter} ORDER BY occid LIMIT 1"
        );
        let row = self
            .client
            .query_opt(&query, params)
            .await
            .map_err(GatewayError::QueryFailed)?;
        row.map(|r| stored_occurrence(&r)).transpose()
    }
}

/// Column list and bound values for one statement
#[derive(Default)]
struct ColumnValues {
    columns: Vec<&'static str>,
    values: Vec<Box<dyn ToSql + Sync + Send>>,
}

impl ColumnValues {
    fn push<T: ToSql + Sync + Send + 'static>(&mut self, column: &'static str, value: T) {
        self.columns.push(column);
        self.values.push(Box::new(value));
    }

    fn push_text(&mut self, column: &'static str, value: &str) {
        self.push(column, value.to_string());
    }

    fn push_opt(&mut self, column: &'static str, value: &Option<String>) {
        if let Some(value) = value {
            self.push_text(column, value);
        }
    }

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn insert_sql(&self, table: &str, returning: &str) -> String {
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("${i}")).collect();
        format!(
            "INSERT INTO {table} ({}) VALUES ({}) RETURNING {returning}",
            self.columns.join(", "),
            placeholders.join(", ")
        )
    }

    /// `UPDATE` with the key bound after the assignments
    fn update_sql(&self, table: &str, key: &str) -> String {
        let assignments: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect();
        format!(
            "UPDATE {table} SET {} WHERE {key} = ${}",
            assignments.join(", "),
            self.columns.len() + 1
        )
    }
}

fn small_key(value: i64, label: &str) -> GatewayResult<i32> {
    i32::try_from(value).map_err(|_| GatewayError::SaveFailed(format!("{label} {value} out of range")))
}

fn occurrence_columns(record: &OccurrenceRecord) -> GatewayResult<ColumnValues> {
    let mut cols = ColumnValues::default();

    if record.occid.is_none() {
        if let Some(identity) = &record.identity {
            let collid = identity
                .collection_id
                .map(|c| small_key(c.get(), "collid"))
                .transpose()?;
            cols.push("collid", collid);
            cols.push_text("institutioncode", &identity.institution_code);
            cols.push_text("collectioncode", &identity.collection_code);
            cols.push_text("catalognumber", &identity.catalog_number);
            cols.push_text("processingstatus", &identity.processing_status);
            cols.push_text("dbpk", &identity.dbpk);
            cols.push_text("recordenteredby", &identity.record_entered_by);
            cols.push_text("dateentered", &identity.date_entered);
        }
    }

    cols.push_text("occurrenceid", &record.occurrence_id);
    cols.push_text("basisofrecord", &record.basis_of_record);
    cols.push_text("recordedby", &record.recorded_by);
    cols.push_text("associatedcollectors", &record.associated_collectors);
    cols.push_opt("recordnumber", &record.record_number);
    cols.push_text("typestatus", &record.type_status);
    cols.push_text("country", &record.country);
    cols.push_opt("stateprovince", &record.state_province);
    cols.push_opt("county", &record.county);
    cols.push_text("municipality", &record.municipality);
    cols.push_opt("locality", &record.locality);
    cols.push_opt("occurrenceremarks", &record.occurrence_remarks);
    cols.push_opt("storagelocation", &record.storage_location);

    if let Some(event) = &record.event {
        cols.push_text("eventdate", &event.event_date);
        cols.push_opt("year", &event.year);
        cols.push_opt("month", &event.month);
        cols.push_opt("day", &event.day);
        cols.push_text("verbatimeventdate", &event.verbatim_event_date);
    }

    if let Some(georef) = &record.georeference {
        cols.push("decimallatitude", georef.decimal_latitude);
        cols.push("decimallongitude", georef.decimal_longitude);
        cols.push(
            "coordinateuncertaintyinmeters",
            georef.coordinate_uncertainty_in_meters,
        );
        cols.push_text("geodeticdatum", &georef.geodetic_datum);
        cols.push_text("georeferencedby", &georef.georeferenced_by);
        cols.push_text("georeferenceprotocol", &georef.georeference_protocol);
        cols.push_text("georeferencesources", &georef.georeference_sources);
    }

    cols.push_opt("minimumelevationinmeters", &record.minimum_elevation_in_meters);
    cols.push_opt("maximumelevationinmeters", &record.maximum_elevation_in_meters);

    if let Some(taxon) = &record.taxon {
        cols.push_text("sciname", &taxon.sciname);
        cols.push_text("scientificname", &taxon.scientific_name);
        if let Some(tid) = taxon.tid_interpreted {
            cols.push("tidinterpreted", small_key(tid.get(), "tid")?);
        }
        cols.push_text("family", &taxon.family);
        cols.push_text("genus", &taxon.genus);
        cols.push_text("specificepithet", &taxon.specific_epithet);
        cols.push_text("infraspecificepithet", &taxon.infraspecific_epithet);
        cols.push_text("identificationqualifier", &taxon.identification_qualifier);
        cols.push_text("scientificnameauthorship", &taxon.scientific_name_authorship);
        cols.push_text("taxonrank", &taxon.taxon_rank);
        cols.push_text("identifiedby", &taxon.identified_by);
        cols.push_text("dateidentified", &taxon.date_identified);
    }

    cols.push_text("datelastmodified", &record.date_last_modified);
    Ok(cols)
}

fn image_columns(record: &ImageRecord) -> GatewayResult<ColumnValues> {
    let mut cols = ColumnValues::default();
    cols.push("occid", record.occid.get());
    let tid = record
        .tid
        .map(|t| small_key(t.get(), "tid"))
        .transpose()?;
    cols.push("tid", tid);
    cols.push_text("url", &record.web_url);
    cols.push_text("thumbnailurl", &record.thumbnail_url);
    cols.push_text("originalurl", &record.large_url);
    cols.push_text("sourceurl", &record.source_url);
    cols.push_text("caption", &record.caption);
    cols.push_text("photographer", &record.photographer);
    cols.push_text("copyright", &record.copyright);
    cols.push_text("owner", &record.owner);
    cols.push_text("locality", &record.locality);
    cols.push_text("notes", &record.notes);
    cols.push("sortsequence", record.sort_sequence);
    cols.push_text("imagetype", &record.image_type);
    Ok(cols)
}

fn read_err(e: tokio_postgres::Error) -> GatewayError {
    GatewayError::QueryFailed(e.to_string())
}

fn text(row: &Row, column: &str) -> GatewayResult<String> {
    Ok(row
        .try_get::<_, Option<String>>(column)
        .map_err(read_err)?
        .unwrap_or_default())
}

fn key<T>(value: i64, make: fn(i64) -> Result<T, String>) -> GatewayResult<T> {
    make(value).map_err(GatewayError::QueryFailed)
}

fn stored_occurrence(row: &Row) -> GatewayResult<StoredOccurrence> {
    let occid: i64 = row.try_get("occid").map_err(read_err)?;
    let collid: Option<i32> = row.try_get("collid").map_err(read_err)?;
    Ok(StoredOccurrence {
        occid: key(occid, OccurrenceId::new)?,
        collection_id: collid
            .map(|c| key(i64::from(c), CollectionId::new))
            .transpose()?,
        institution_code: text(row, "institutioncode")?,
        collection_code: text(row, "collectioncode")?,
        catalog_number: text(row, "catalognumber")?,
    })
}

fn stored_image(row: &Row) -> GatewayResult<StoredImage> {
    let imgid: i64 = row.try_get("imgid").map_err(read_err)?;
    let occid: i64 = row.try_get("occid").map_err(read_err)?;
    let tid: Option<i32> = row.try_get("tid").map_err(read_err)?;
    let sort_sequence: i32 = row.try_get("sortsequence").map_err(read_err)?;
    Ok(StoredImage {
        imgid: key(imgid, ImageId::new)?,
        record: ImageRecord {
            occid: key(occid, OccurrenceId::new)?,
            tid: tid.map(|t| key(i64::from(t), TaxonId::new)).transpose()?,
            web_url: text(row, "url")?,
            thumbnail_url: text(row, "thumbnailurl")?,
            large_url: text(row, "originalurl")?,
            source_url: text(row, "sourceurl")?,
            caption: text(row, "caption")?,
            photographer: text(row, "photographer")?,
            copyright: text(row, "copyright")?,
            owner: text(row, "owner")?,
            locality: text(row, "locality")?,
            notes: text(row, "notes")?,
            sort_sequence,
            image_type: text(row, "imagetype")?,
        },
    })
}

#[async_trait]
impl OccurrenceGateway for PostgreSQLAdapter {
    async fn lookup_by_triplet(
        &self,
        institution_code: &str,
        collection_code: &str,
        catalog_number: &str,
    ) -> GatewayResult<Option<StoredOccurrence>> {
        self.find_occurrence(
            "institutioncode = $1 AND collectioncode = $2 AND catalognumber = $3",
            &[&institution_code, &collection_code, &catalog_number],
        )
        .await
    }

    async fn lookup_by_collection_and_catalog(
        &self,
        collection_id: CollectionId,
        catalog_number: &str,
    ) -> GatewayResult<Option<StoredOccurrence>> {
        let collid = small_key(collection_id.get(), "collid")?;
        self.find_occurrence("collid = $1 AND catalognumber = $2", &[&collid, &catalog_number])
            .await
    }

    async fn resolve_collection_id(
        &self,
        institution_code: &str,
        collection_code: &str,
    ) -> GatewayResult<Option<CollectionId>> {
        let row = self
            .client
            .query_opt(
                "SELECT collid FROM omcollections \
                 WHERE institutioncode = $1 AND collectioncode = $2 LIMIT 1",
                &[&institution_code, &collection_code],
            )
            .await
            .map_err(GatewayError::QueryFailed)?;

        match row {
            Some(row) => {
                let collid: i32 = row.try_get("collid").map_err(read_err)?;
                Ok(Some(key(i64::from(collid), CollectionId::new)?))
            }
            None => Ok(None),
        }
    }

    async fn save_occurrence(&self, record: &OccurrenceRecord) -> GatewayResult<OccurrenceId> {
        let cols = occurrence_columns(record)?;

        if let Some(occid) = record.occid {
            let sql = cols.update_sql("omoccurrences", "occid");
            let raw = occid.get();
            let mut params = cols.params();
            params.push(&raw);

            let updated = self
                .client
                .execute(&sql, &params)
                .await
                .map_err(GatewayError::SaveFailed)?;
            if updated == 0 {
                return Err(GatewayError::NotFound(format!("occid {occid}")));
            }
            tracing::debug!(occid = %occid, columns = cols.columns.len(), "Updated occurrence row");
            return Ok(occid);
        }

        let sql = cols.insert_sql("omoccurrences", "occid");
        let rows = self
            .client
            .query(&sql, &cols.params())
            .await
            .map_err(GatewayError::SaveFailed)?;
        let row = rows
            .first()
            .ok_or_else(|| GatewayError::SaveFailed("insert returned no occid".to_string()))?;
        let occid: i64 = row.try_get("occid").map_err(read_err)?;
        let occid = key(occid, OccurrenceId::new)?;
        tracing::debug!(occid = %occid, "Inserted occurrence row");
        Ok(occid)
    }

    async fn save_determination(&self, record: &DeterminationRecord) -> GatewayResult<()> {
        let occid = record.occid.get();
        self.client
            .execute(
                "INSERT INTO omoccurdeterminations (\
                    occid, sciname, scientificnameauthorship, identificationremarks, \
                    identifiedby, dateidentified, identificationqualifier, iscurrent) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (occid, dateidentified, identifiedby, sciname) DO UPDATE SET \
                    scientificnameauthorship = EXCLUDED.scientificnameauthorship, \
                    identificationremarks = EXCLUDED.identificationremarks, \
                    identificationqualifier = EXCLUDED.identificationqualifier, \
                    iscurrent = EXCLUDED.iscurrent",
                &[
                    &occid,
                    &record.sciname,
                    &record.scientific_name_authorship,
                    &record.identification_remarks,
                    &record.identified_by,
                    &record.date_identified,
                    &record.identification_qualifier,
                    &record.is_current,
                ],
            )
            .await
            .map_err(GatewayError::SaveFailed)?;
        Ok(())
    }

    async fn resolve_accepted_taxon_id(
        &self,
        scientific_name: &str,
    ) -> GatewayResult<Option<TaxonId>> {
        let row = self
            .client
            .query_opt(
                "SELECT ts.tidaccepted FROM taxa t \
                 JOIN taxstatus ts ON ts.tid = t.tid \
                 WHERE t.sciname = $1 AND ts.taxauthid = 1 LIMIT 1",
                &[&scientific_name],
            )
            .await
            .map_err(GatewayError::QueryFailed)?;

        match row {
            Some(row) => {
                let tid: i32 = row.try_get("tidaccepted").map_err(read_err)?;
                Ok(Some(key(i64::from(tid), TaxonId::new)?))
            }
            None => Ok(None),
        }
    }

    async fn resolve_family_for_taxon_id(
        &self,
        taxon_id: TaxonId,
    ) -> GatewayResult<Option<String>> {
        let tid = small_key(taxon_id.get(), "tid")?;
        let row = self
            .client
            .query_opt(
                "SELECT family FROM taxstatus \
                 WHERE tid = $1 AND family IS NOT NULL AND family <> '' LIMIT 1",
                &[&tid],
            )
            .await
            .map_err(GatewayError::QueryFailed)?;

        row.map(|r| text(&r, "family")).transpose()
    }

    async fn resolve_taxon_id(&self, scientific_name: &str) -> GatewayResult<Option<TaxonId>> {
        let row = self
            .client
            .query_opt(
                "SELECT tid FROM taxa WHERE sciname = $1 LIMIT 1",
                &[&scientific_name],
            )
            .await
            .map_err(GatewayError::QueryFailed)?;

        match row {
            Some(row) => {
                let tid: i32 = row.try_get("tid").map_err(read_err)?;
                Ok(Some(key(i64::from(tid), TaxonId::new)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ImageStore for PostgreSQLAdapter {
    async fn find_by_source_url(&self, url: &str) -> GatewayResult<Option<StoredImage>> {
        let row = self
            .client
            .query_opt(
                "SELECT imgid, occid, tid, url, thumbnailurl, originalurl, sourceurl, caption, \
                        photographer, copyright, owner, locality, notes, sortsequence, imagetype \
                 FROM images WHERE sourceurl = $1 OR originalurl = $1 ORDER BY imgid LIMIT 1",
                &[&url],
            )
            .await
            .map_err(GatewayError::QueryFailed)?;
        row.map(|r| stored_image(&r)).transpose()
    }

    async fn insert(&self, record: &ImageRecord) -> GatewayResult<ImageId> {
        let cols = image_columns(record)?;
        let rows = self
            .client
            .query(&cols.insert_sql("images", "imgid"), &cols.params())
            .await
            .map_err(GatewayError::SaveFailed)?;
        let row = rows
            .first()
            .ok_or_else(|| GatewayError::SaveFailed("insert returned no imgid".to_string()))?;
        let imgid: i64 = row.try_get("imgid").map_err(read_err)?;
        key(imgid, ImageId::new)
    }

    async fn update(&self, imgid: ImageId, record: &ImageRecord) -> GatewayResult<()> {
        let cols = image_columns(record)?;
        let sql = cols.update_sql("images", "imgid");
        let raw = imgid.get();
        let mut params = cols.params();
        params.push(&raw);

        let updated = self
            .client
            .execute(&sql, &params)
            .await
            .map_err(GatewayError::SaveFailed)?;
        if updated == 0 {
            return Err(GatewayError::NotFound(format!("imgid {imgid}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventDates, RecordIdentity};

    fn record() -> OccurrenceRecord {
        OccurrenceRecord {
            occid: None,
            identity: Some(RecordIdentity {
                collection_id: None,
                institution_code: "HUH".to_string(),
                collection_code: "GH".to_string(),
                catalog_number: "00012345".to_string(),
                processing_status: "unprocessed".to_string(),
                dbpk: "GH00012345".to_string(),
                record_entered_by: "Jane".to_string(),
                date_entered: "2013-11-02".to_string(),
            }),
            occurrence_id: "urn:uuid:1".to_string(),
            basis_of_record: "PreservedSpecimen".to_string(),
            recorded_by: String::new(),
            associated_collectors: String::new(),
            record_number: None,
            type_status: String::new(),
            country: "United States of America".to_string(),
            state_province: Some("Maine".to_string()),
            county: None,
            municipality: String::new(),
            locality: None,
            occurrence_remarks: None,
            storage_location: None,
            event: Some(EventDates {
                event_date: "1901-06-01".to_string(),
                year: Some("1901".to_string()),
                month: None,
                day: None,
                verbatim_event_date: String::new(),
            }),
            georeference: None,
            minimum_elevation_in_meters: None,
            maximum_elevation_in_meters: None,
            taxon: None,
            date_last_modified: "2013-11-02".to_string(),
        }
    }

    #[test]
    fn test_insert_columns_include_identity_and_skip_absent_optionals() {
        let cols = occurrence_columns(&record()).unwrap();
        assert_eq!(cols.columns[0], "collid");
        assert!(cols.columns.contains(&"dbpk"));
        assert!(cols.columns.contains(&"stateprovince"));
        assert!(cols.columns.contains(&"year"));
        assert!(!cols.columns.contains(&"county"));
        assert!(!cols.columns.contains(&"month"));
        assert_eq!(cols.columns.len(), cols.values.len());

        let sql = cols.insert_sql("omoccurrences", "occid");
        assert!(sql.starts_with("INSERT INTO omoccurrences (collid, institutioncode"));
        assert!(sql.ends_with(&format!("${}) RETURNING occid", cols.columns.len())));
    }

    #[test]
    fn test_update_columns_leave_identity_alone() {
        let mut update = record();
        update.occid = Some(OccurrenceId::new(9).unwrap());
        let cols = occurrence_columns(&update).unwrap();
        assert!(!cols.columns.contains(&"collid"));
        assert!(!cols.columns.contains(&"catalognumber"));

        let sql = cols.update_sql("omoccurrences", "occid");
        assert!(sql.starts_with("UPDATE omoccurrences SET occurrenceid = $1, "));
        assert!(sql.ends_with(&format!("WHERE occid = ${}", cols.columns.len() + 1)));
    }

    #[test]
    fn test_small_key_rejects_overflow() {
        assert_eq!(small_key(12, "collid").unwrap(), 12);
        assert!(small_key(i64::from(i32::MAX) + 1, "collid").is_err());
    }
}
