//! Image derivative URLs built from image service resource ids

use url::Url;

use crate::domain::{IngestError, MediaFormat, Result};

const WEB_QUERY: &str = "rotate=guess&resize=1250&format=jpeg,quality,100";
const THUMBNAIL_QUERY: &str = "rotate=guess&resize=150&format=jpeg,quality,75";
const LARGE_QUERY: &str = "rotate=guess&format=jpeg,quality,100";

/// Builds image service URLs under a fixed base
#[derive(Debug, Clone)]
pub struct DerivativeUrlBuilder {
    base: Url,
}

impl DerivativeUrlBuilder {
    /// # Errors
    ///
    /// Returns a configuration error when the base URL does not parse.
    pub fn new(base: &str) -> Result<Self> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| {
            IngestError::Configuration(format!(
                "Invalid images.derivative_base_url '{base}': {e}"
            ))
        })?;
        Ok(Self { base })
    }

    fn resource(&self, resource_id: &str, query: Option<&str>) -> String {
        let mut url = match self.base.join(resource_id) {
            Ok(url) => url,
            Err(_) => return format!("{}{resource_id}", self.base),
        };
        url.set_query(query);
        url.to_string()
    }

    /// The stored original
    pub fn original(&self, resource_id: &str) -> String {
        self.resource(resource_id, None)
    }

    pub fn web(&self, resource_id: &str) -> String {
        self.resource(resource_id, Some(WEB_QUERY))
    }

    pub fn thumbnail(&self, resource_id: &str) -> String {
        self.resource(resource_id, Some(THUMBNAIL_QUERY))
    }

    pub fn large(&self, resource_id: &str) -> String {
        self.resource(resource_id, Some(LARGE_QUERY))
    }
}

/// URLs collected across the access points of one media item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaUrls {
    pub source_url: String,
    pub web_url: String,
    pub thumbnail_url: String,
    pub large_url: String,
}

impl MediaUrls {
    /// Fills the URLs a resolved access point provides
    ///
    /// A `dng` original sets the source URL; a `jpg` sets the web, thumbnail
    /// and large derivatives. Returns `false` for any other format.
    pub fn apply(
        &mut self,
        format: &MediaFormat,
        resource_id: &str,
        builder: &DerivativeUrlBuilder,
    ) -> bool {
        match format {
            MediaFormat::Dng => {
                self.source_url = builder.original(resource_id);
                true
            }
            MediaFormat::Jpg => {
                self.web_url = builder.web(resource_id);
                self.thumbnail_url = builder.thumbnail(resource_id);
                self.large_url = builder.large(resource_id);
                true
            }
            MediaFormat::Other(_) => false,
        }
    }

    /// Whether no access point produced a URL
    pub fn is_empty(&self) -> bool {
        self.source_url.is_empty() && self.large_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://bovary.iplantcollaborative.org/image_service/image/";

    #[test]
    fn test_dng_sets_source_url() {
        let builder = DerivativeUrlBuilder::new(BASE).unwrap();
        let mut urls = MediaUrls::default();
        assert!(urls.apply(&MediaFormat::Dng, "00-Ab12", &builder));
        assert_eq!(urls.source_url, format!("{BASE}00-Ab12"));
        assert!(urls.web_url.is_empty());
    }

    #[test]
    fn test_jpg_sets_derivatives() {
        let builder = DerivativeUrlBuilder::new(BASE).unwrap();
        let mut urls = MediaUrls::default();
        assert!(urls.apply(&MediaFormat::Jpg, "00-Ab12", &builder));
        assert_eq!(
            urls.web_url,
            format!("{BASE}00-Ab12?rotate=guess&resize=1250&format=jpeg,quality,100")
        );
        assert_eq!(
            urls.thumbnail_url,
            format!("{BASE}00-Ab12?rotate=guess&resize=150&format=jpeg,quality,75")
        );
        assert_eq!(
            urls.large_url,
            format!("{BASE}00-Ab12?rotate=guess&format=jpeg,quality,100")
        );
        assert!(urls.source_url.is_empty());
        assert!(!urls.is_empty());
    }

    #[test]
    fn test_other_format_is_ignored() {
        let builder = DerivativeUrlBuilder::new(BASE).unwrap();
        let mut urls = MediaUrls::default();
        assert!(!urls.apply(&MediaFormat::Other("tiff".to_string()), "x", &builder));
        assert!(urls.is_empty());
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let builder = DerivativeUrlBuilder::new("https://images.example.org/image").unwrap();
        assert_eq!(builder.original("abc"), "https://images.example.org/image/abc");
        assert!(DerivativeUrlBuilder::new("not a url").is_err());
    }
}
