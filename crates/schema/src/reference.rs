//! Cross-references attached to an update (advisories, CVEs, bug trackers).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use updateinfo_common::{Error, Result};
use url::{ParseError, Url};

/// Base used only to validate relative references.
const VALIDATION_BASE: &str = "http://updateinfo.invalid/";

/// A validated reference link: an absolute URL, or a relative reference
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Href {
    Absolute(Url),
    Relative(String),
}

impl Href {
    /// Parse a raw `href` attribute value.
    pub fn parse(value: &str) -> Result<Self> {
        match Url::parse(value) {
            Ok(url) => Ok(Href::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse(VALIDATION_BASE).map_err(|e| invalid_url(value, e))?;
                Url::options()
                    .base_url(Some(&base))
                    .parse(value)
                    .map_err(|e| invalid_url(value, e))?;
                Ok(Href::Relative(value.to_string()))
            }
            Err(e) => Err(invalid_url(value, e)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Href::Absolute(url) => url.as_str(),
            Href::Relative(reference) => reference,
        }
    }
}

fn invalid_url(value: &str, err: ParseError) -> Error {
    Error::InvalidUrl {
        value: value.to_string(),
        reason: err.to_string(),
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Href {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Href {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Href::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One cross-reference of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    /// Link to the referenced resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<Href>,
    /// External identifier (e.g. `CVE-2023-1234` or a bug number).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Reference kind, e.g. `cve` or `bugzilla`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub reference_type: String,
}
