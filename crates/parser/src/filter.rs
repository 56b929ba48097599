//! Update selection.
//!
//! A [`FilterConfig`] is built once per run and then only read. An update is
//! selected when all of the following hold:
//!
//! - its type equals the configured update type, if one is set;
//! - it has an issue date, strictly after the `after` bound and strictly
//!   before the `before` bound;
//! - at least one of its packages is in the allow-list, if the allow-list is
//!   not empty.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use updateinfo_common::{Error, Result, Timestamp};
use updateinfo_schema::Update;

/// Update type selected by the security-only switch.
pub const SECURITY_TYPE: &str = "security";

/// How far in the future the default `before` bound lies.
const DEFAULT_WINDOW_YEARS: u32 = 100;

/// Immutable predicate bundle applied to every decoded update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    before: Timestamp,
    after: Timestamp,
    update_type: Option<String>,
    packages: HashSet<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            before: Timestamp::years_from_now(DEFAULT_WINDOW_YEARS),
            after: Timestamp::epoch(),
            update_type: None,
            packages: HashSet::new(),
        }
    }
}

impl FilterConfig {
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }

    pub fn before(&self) -> Timestamp {
        self.before
    }

    pub fn after(&self) -> Timestamp {
        self.after
    }

    pub fn update_type(&self) -> Option<&str> {
        self.update_type.as_deref()
    }

    pub fn packages(&self) -> &HashSet<String> {
        &self.packages
    }

    /// Evaluate the predicate against one update.
    pub fn matches(&self, update: &Update) -> bool {
        if let Some(wanted) = &self.update_type {
            if update.update_type != *wanted {
                return false;
            }
        }

        let Some(issued) = update.issued else {
            return false;
        };
        if !(issued < self.before && issued > self.after) {
            return false;
        }

        self.packages.is_empty() || update.touches_any(&self.packages)
    }
}

#[derive(Debug, Clone)]
enum DateBound {
    Raw(String),
    Time(Timestamp),
}

/// Accumulates filter options. Raw date strings are only parsed in
/// [`FilterConfigBuilder::build`], once the date format is known, so the
/// order in which options are given does not matter.
#[derive(Debug, Clone, Default)]
pub struct FilterConfigBuilder {
    date_format: Option<String>,
    before: Option<DateBound>,
    after: Option<DateBound>,
    update_type: Option<String>,
    packages_file: Option<PathBuf>,
    packages: Vec<String>,
}

impl FilterConfigBuilder {
    /// chrono format used to parse the `before`/`after` strings. Without
    /// one they must be Unix timestamps.
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Select updates issued strictly before the given date string.
    pub fn before(mut self, date: impl Into<String>) -> Self {
        self.before = Some(DateBound::Raw(date.into()));
        self
    }

    /// Select updates issued strictly after the given date string.
    pub fn after(mut self, date: impl Into<String>) -> Self {
        self.after = Some(DateBound::Raw(date.into()));
        self
    }

    pub fn before_time(mut self, time: Timestamp) -> Self {
        self.before = Some(DateBound::Time(time));
        self
    }

    pub fn after_time(mut self, time: Timestamp) -> Self {
        self.after = Some(DateBound::Time(time));
        self
    }

    /// Only select updates of this type (e.g. [`SECURITY_TYPE`]). An empty
    /// string clears the constraint.
    pub fn update_type(mut self, update_type: impl Into<String>) -> Self {
        let update_type = update_type.into();
        self.update_type = (!update_type.is_empty()).then_some(update_type);
        self
    }

    /// Load the package allow-list from an OBS `*.packages` file.
    pub fn packages_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.packages_file = Some(path.into());
        self
    }

    /// Add package names to the allow-list.
    pub fn packages<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<FilterConfig> {
        let defaults = FilterConfig::default();
        let format = self.date_format.as_deref();

        let before = resolve_bound(self.before, format)?.unwrap_or(defaults.before);
        let after = resolve_bound(self.after, format)?.unwrap_or(defaults.after);
        if after >= before {
            warn!(
                "after date {} is not earlier than before date {}, no update can match",
                after, before
            );
        }

        let mut packages: HashSet<String> = self.packages.into_iter().collect();
        if let Some(path) = self.packages_file {
            packages.extend(read_packages_file(&path)?);
        }

        debug!(
            before = before.unix(),
            after = after.unix(),
            update_type = ?self.update_type,
            packages = packages.len(),
            "Filter configured"
        );

        Ok(FilterConfig {
            before,
            after,
            update_type: self.update_type,
            packages,
        })
    }
}

fn resolve_bound(bound: Option<DateBound>, format: Option<&str>) -> Result<Option<Timestamp>> {
    match bound {
        None => Ok(None),
        Some(DateBound::Time(time)) => Ok(Some(time)),
        Some(DateBound::Raw(raw)) => Timestamp::parse(&raw, format).map(Some),
    }
}

/// Read package names from an OBS `*.packages` file.
///
/// Each line is a `|` separated record whose first field is the package
/// name. Blank lines are skipped. An empty path yields an empty list.
pub fn read_packages_file(path: &Path) -> Result<Vec<String>> {
    if path.as_os_str().is_empty() {
        return Ok(Vec::new());
    }

    let io_error = |source: std::io::Error| Error::PackagesFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;

    let mut packages = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(io_error)?;
        let name = line.trim().split('|').next().unwrap_or_default();
        if !name.is_empty() {
            packages.push(name.to_string());
        }
    }

    info!("Loaded {} packages from {}", packages.len(), path.display());
    Ok(packages)
}
