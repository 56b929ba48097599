//! Update records.

use crate::{Package, Reference};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use updateinfo_common::Timestamp;

/// Root of an updateinfo document: every `<update>` in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateInfo {
    pub updates: Vec<Update>,
}

/// One patch/errata entry.
///
/// `status`, `release` and the package file names are decoded from the XML
/// document but never serialized to JSON. Empty strings and lists are left
/// out of the JSON object entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Update {
    /// Classification such as `security`, `recommended` or `feature`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub update_type: String,
    #[serde(skip)]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub severity: String,
    #[serde(skip)]
    pub release: String,
    /// Issue date. Updates without one are never selected by the parser.
    #[serde(rename = "date", skip_serializing_if = "Option::is_none")]
    pub issued: Option<Timestamp>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

impl Update {
    /// Whether any of the packages of this update is named in `names`.
    pub fn touches_any(&self, names: &HashSet<String>) -> bool {
        self.packages.iter().any(|pkg| names.contains(&pkg.name))
    }

    /// Issue date as seconds since the epoch, if known.
    pub fn issued_unix(&self) -> Option<i64> {
        self.issued.map(|ts| ts.unix())
    }
}
