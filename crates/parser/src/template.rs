//! Text templates with four named sections.
//!
//! A template source declares its sections as Handlebars inline partial
//! blocks:
//!
//! ```text
//! {{#*inline "header"}}Updates{{/inline}}
//! {{#*inline "body"}}- {{id}}: {{title}}{{/inline}}
//! {{#*inline "join"}}
//! {{/inline}}
//! {{#*inline "footer"}}{{/inline}}
//! ```
//!
//! `header` and `footer` are rendered once per run, `body` once per selected
//! update and `join` between two consecutive bodies. Every section is
//! registered as a template of its own, so sections can include each other
//! with `{{> join}}`. Text outside the blocks is ignored.
//!
//! Section names may be single or double quoted, and the `~` whitespace
//! control marks trim the section content the way Handlebars does:
//! `{{#*inline 'body'~}}` drops leading whitespace, `{{~/inline}}` trailing.

use handlebars::Handlebars;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use updateinfo_common::{Error, Result};
use updateinfo_schema::{Package, Reference, Update};

pub const HEADER: &str = "header";
pub const BODY: &str = "body";
pub const JOIN: &str = "join";
pub const FOOTER: &str = "footer";

/// Sections every template must define.
pub const SECTIONS: [&str; 4] = [HEADER, BODY, JOIN, FOOTER];

static SECTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\{~?#\*inline\s+(?:"(?P<dq>[^"]+)"|'(?P<sq>[^']+)')\s*(?P<open>~?)\}\}(?P<body>.*?)\{\{(?P<close>~?)/inline\s*~?\}\}"#,
    )
    .unwrap()
});

/// Built-in change log layout.
pub const DEFAULT_TEMPLATE: &str = r#"{{#*inline "join"}}--------------------------------------------------------------------------------
{{/inline}}
{{#*inline "header"}}CHANGE LOG
{{> join}}{{/inline}}
{{#*inline "body"}}{{title}}

ID: {{id}}
Type: {{type}}
Severity: {{severity}}
Date: {{issued}}

Description:
{{description}}

{{#if references}}Issues:{{#each references}}
  * {{type}}: [{{id}}] {{title}}{{/each}}

{{/if}}{{/inline}}
{{#*inline "footer"}}{{> join}}{{/inline}}
"#;

/// A compiled four-section template.
pub struct UpdateTemplate {
    registry: Handlebars<'static>,
    sections: Vec<String>,
}

impl fmt::Debug for UpdateTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateTemplate")
            .field("sections", &self.sections)
            .finish()
    }
}

impl UpdateTemplate {
    /// Compile a template source.
    pub fn parse(source: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        let mut sections = Vec::new();
        for caps in SECTION_PATTERN.captures_iter(source) {
            let Some(name) = caps.name("dq").or_else(|| caps.name("sq")) else {
                continue;
            };
            let name = name.as_str();
            let mut body = &caps["body"];
            if !caps["open"].is_empty() {
                body = body.trim_start();
            }
            if !caps["close"].is_empty() {
                body = body.trim_end();
            }
            registry
                .register_template_string(name, body)
                .map_err(|e| Error::Template(format!("section \"{name}\": {e}")))?;
            sections.push(name.to_string());
        }

        for required in SECTIONS {
            if !registry.has_template(required) {
                return Err(Error::Template(format!(
                    "missing section \"{required}\""
                )));
            }
        }

        Ok(Self { registry, sections })
    }

    /// Compile a template file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Template(format!(
                "failed reading template file '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&source)
    }

    /// The built-in change log template.
    pub fn changelog() -> Result<Self> {
        Self::parse(DEFAULT_TEMPLATE)
    }

    /// Names of the sections defined by the source, in declaration order.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn render_header<W: Write>(&self, out: W) -> Result<()> {
        self.render_section(HEADER, &(), out)
    }

    pub fn render_body<W: Write>(&self, update: &Update, out: W) -> Result<()> {
        self.render_section(BODY, &UpdateView::from(update), out)
    }

    pub fn render_join<W: Write>(&self, out: W) -> Result<()> {
        self.render_section(JOIN, &(), out)
    }

    pub fn render_footer<W: Write>(&self, out: W) -> Result<()> {
        self.render_section(FOOTER, &(), out)
    }

    fn render_section<T: Serialize, W: Write>(&self, name: &str, data: &T, out: W) -> Result<()> {
        self.registry
            .render_to_write(name, data, out)
            .map_err(|e| Error::Render(format!("executing \"{name}\": {e}")))
    }
}

/// Context handed to the `body` section.
#[derive(Serialize)]
struct UpdateView<'a> {
    #[serde(rename = "type")]
    update_type: &'a str,
    status: &'a str,
    id: &'a str,
    title: &'a str,
    severity: &'a str,
    release: &'a str,
    issued: Option<String>,
    date: Option<i64>,
    description: &'a str,
    references: Vec<ReferenceView<'a>>,
    packages: Vec<PackageView<'a>>,
}

#[derive(Serialize)]
struct ReferenceView<'a> {
    href: Option<&'a str>,
    id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    reference_type: &'a str,
}

#[derive(Serialize)]
struct PackageView<'a> {
    name: &'a str,
    version: &'a str,
    release: &'a str,
    arch: &'a str,
    filename: &'a str,
    nevra: String,
}

impl<'a> From<&'a Update> for UpdateView<'a> {
    fn from(update: &'a Update) -> Self {
        Self {
            update_type: &update.update_type,
            status: &update.status,
            id: &update.id,
            title: &update.title,
            severity: &update.severity,
            release: &update.release,
            issued: update.issued.map(|ts| ts.to_string()),
            date: update.issued_unix(),
            description: &update.description,
            references: update.references.iter().map(ReferenceView::from).collect(),
            packages: update.packages.iter().map(PackageView::from).collect(),
        }
    }
}

impl<'a> From<&'a Reference> for ReferenceView<'a> {
    fn from(reference: &'a Reference) -> Self {
        Self {
            href: reference.href.as_ref().map(|href| href.as_str()),
            id: &reference.id,
            title: &reference.title,
            reference_type: &reference.reference_type,
        }
    }
}

impl<'a> From<&'a Package> for PackageView<'a> {
    fn from(package: &'a Package) -> Self {
        Self {
            name: &package.name,
            version: &package.version,
            release: &package.release,
            arch: &package.arch,
            filename: &package.filename,
            nevra: package.nevra(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use updateinfo_common::Timestamp;
    use updateinfo_schema::Href;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn update() -> Update {
        Update {
            update_type: "security".to_string(),
            status: "stable".to_string(),
            id: "SUSE-2023-4501".to_string(),
            title: "Security update for curl".to_string(),
            severity: "moderate".to_string(),
            issued: Some(Timestamp::from_unix(1_700_000_000).unwrap()),
            description: "Fixes <CVE-2023-46218> & more.".to_string(),
            references: vec![Reference {
                href: Some(Href::parse("https://www.suse.com/security/cve/CVE-2023-46218/").unwrap()),
                id: "CVE-2023-46218".to_string(),
                title: "CVE-2023-46218".to_string(),
                reference_type: "cve".to_string(),
            }],
            packages: vec![Package {
                name: "curl".to_string(),
                version: "8.0.1".to_string(),
                release: "11.80.1".to_string(),
                arch: "x86_64".to_string(),
                filename: "curl-8.0.1-11.80.1.x86_64.rpm".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_default_template_body() {
        let template = UpdateTemplate::changelog().unwrap();
        let text = render(|out| template.render_body(&update(), out));
        assert_eq!(
            text,
            "Security update for curl\n\
             \n\
             ID: SUSE-2023-4501\n\
             Type: security\n\
             Severity: moderate\n\
             Date: 2023-11-14 22:13:20 +0000 UTC\n\
             \n\
             Description:\n\
             Fixes <CVE-2023-46218> & more.\n\
             \n\
             Issues:\n  * cve: [CVE-2023-46218] CVE-2023-46218\n\n"
        );
    }

    #[test]
    fn test_default_template_without_references() {
        let template = UpdateTemplate::changelog().unwrap();
        let mut plain = update();
        plain.references.clear();
        let text = render(|out| template.render_body(&plain, out));
        assert!(!text.contains("Issues:"));
        assert!(text.ends_with("Fixes <CVE-2023-46218> & more.\n\n"));
    }

    #[test]
    fn test_default_template_header_and_footer() {
        let template = UpdateTemplate::changelog().unwrap();
        let rule = "-".repeat(80);
        let header = render(|out| template.render_header(out));
        assert_eq!(header, format!("CHANGE LOG\n{rule}\n"));
        let footer = render(|out| template.render_footer(out));
        assert_eq!(footer.trim_end(), rule);
    }

    #[test]
    fn test_custom_template_fields() {
        let source = r#"{{#*inline "header"}}BEGIN{{/inline}}
{{#*inline "body"}}{{id}} {{status}} {{release}} {{date}}{{#each packages}} {{nevra}} {{filename}}{{/each}}{{#each references}} {{href}}{{/each}}{{/inline}}
{{#*inline "join"}}|{{/inline}}
{{#*inline "footer"}}END{{/inline}}"#;
        let template = UpdateTemplate::parse(source).unwrap();
        assert_eq!(template.sections(), ["header", "body", "join", "footer"]);

        let mut record = update();
        record.release = "1".to_string();
        let text = render(|out| template.render_body(&record, out));
        assert_eq!(
            text,
            "SUSE-2023-4501 stable 1 1700000000 curl-8.0.1-11.80.1.x86_64 curl-8.0.1-11.80.1.x86_64.rpm https://www.suse.com/security/cve/CVE-2023-46218/"
        );
    }

    #[test]
    fn test_sections_can_include_each_other() {
        let source = r#"{{#*inline "header"}}[{{> join}}]{{/inline}}{{#*inline "body"}}{{/inline}}{{#*inline "join"}}~{{/inline}}{{#*inline "footer"}}{{/inline}}"#;
        let template = UpdateTemplate::parse(source).unwrap();
        assert_eq!(render(|out| template.render_header(out)), "[~]");
    }

    #[test]
    fn test_quote_styles_and_whitespace_control() {
        let source = "{{~#*inline 'header'~}}\n  [{{~/inline~}}\n\
                      {{#*inline \"body\"~}}\n  {{id}}\n{{/inline}}\n\
                      {{#*inline 'join'}},{{/inline}}\n\
                      {{#*inline \"footer\"}}\n]{{~/inline}}";
        let template = UpdateTemplate::parse(source).unwrap();
        assert_eq!(template.sections(), ["header", "body", "join", "footer"]);
        assert_eq!(render(|out| template.render_header(out)), "[");
        assert_eq!(
            render(|out| template.render_body(&update(), out)),
            "SUSE-2023-4501\n"
        );
        assert_eq!(render(|out| template.render_footer(out)), "\n]");
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let source = r#"{{#*inline "header"}}H{{/inline}}{{#*inline "body"}}B{{/inline}}{{#*inline "footer"}}F{{/inline}}"#;
        let err = UpdateTemplate::parse(source).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("\"join\""));
    }

    #[test]
    fn test_invalid_section_syntax_is_config_error() {
        let source = r#"{{#*inline "header"}}{{#if}}{{/inline}}{{#*inline "body"}}B{{/inline}}{{#*inline "join"}}J{{/inline}}{{#*inline "footer"}}F{{/inline}}"#;
        let err = UpdateTemplate::parse(source).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changelog.hbs");
        std::fs::write(&path, DEFAULT_TEMPLATE).unwrap();
        assert!(UpdateTemplate::from_file(&path).is_ok());

        let err = UpdateTemplate::from_file(&dir.path().join("missing.hbs")).unwrap_err();
        assert!(err.is_config());
    }
}
