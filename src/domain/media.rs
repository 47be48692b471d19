//! Associated media (specimen images) and their access points

use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of one retrievable representation of a media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaFormat {
    /// Camera raw original
    Dng,
    /// JPEG derivative
    Jpg,
    /// Anything else, kept verbatim
    Other(String),
}

impl MediaFormat {
    /// Interprets the text of a `dc:format` element
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dng" | "image/x-adobe-dng" => Self::Dng,
            "jpg" | "jpeg" | "image/jpeg" => Self::Jpg,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dng => write!(f, "dng"),
            Self::Jpg => write!(f, "jpg"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// One retrievable representation (format/variant) of a media item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub variant: String,
    pub access_uri: String,
    /// Raw `dc:format` text; see [`AccessPoint::media_format`]
    pub format: String,
    pub hash_function: String,
    pub hash_value: String,
}

impl AccessPoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media_format(&self) -> MediaFormat {
        MediaFormat::parse(&self.format)
    }
}

/// An image associated with an occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedMedia {
    pub guid: String,
    access_points: Vec<AccessPoint>,
    pub rights: String,
    pub owner: String,
    pub usage_terms: String,
}

impl AssociatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access points in document order
    pub fn access_points(&self) -> &[AccessPoint] {
        &self.access_points
    }

    /// Seals an access point into this media item
    pub fn push_access_point(&mut self, access_point: AccessPoint) {
        self.access_points.push(access_point);
    }
}
