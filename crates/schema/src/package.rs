//! Packages touched by an update.

use serde::{Deserialize, Serialize};

/// An RPM package listed in an update's `pkglist`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub arch: String,
    /// RPM file name inside the repository. Not part of the JSON output.
    #[serde(skip)]
    pub filename: String,
}

impl Package {
    /// `name-version-release.arch` label, omitting empty parts.
    pub fn nevra(&self) -> String {
        let mut label = self.name.clone();
        for part in [&self.version, &self.release] {
            if !part.is_empty() {
                label.push('-');
                label.push_str(part);
            }
        }
        if !self.arch.is_empty() {
            label.push('.');
            label.push_str(&self.arch);
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_is_not_serialized() {
        let pkg = Package {
            name: "openssl-3".to_string(),
            version: "3.1.4".to_string(),
            release: "150600.5.3.1".to_string(),
            arch: "x86_64".to_string(),
            filename: "openssl-3-3.1.4-150600.5.3.1.x86_64.rpm".to_string(),
        };
        let json = serde_json::to_value(&pkg).unwrap();
        assert!(json.get("filename").is_none());
        assert_eq!(json["arch"], "x86_64");
    }

    #[test]
    fn test_nevra() {
        let pkg = Package {
            name: "vim".to_string(),
            version: "9.0".to_string(),
            release: "1.1".to_string(),
            arch: "noarch".to_string(),
            filename: String::new(),
        };
        assert_eq!(pkg.nevra(), "vim-9.0-1.1.noarch");

        let bare = Package {
            name: "vim".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.nevra(), "vim");
    }
}
