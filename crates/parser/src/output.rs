//! Output configuration: where rendered updates go and how they are rendered.

use crate::template::UpdateTemplate;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use updateinfo_common::{Error, Result};

/// How selected updates are turned into text.
#[derive(Debug)]
pub enum RenderStrategy {
    /// Stream every update through a four-section template.
    Template(UpdateTemplate),
    /// Collect every update and write one indented JSON array.
    Json,
}

/// Destination of the rendered output.
pub enum Sink {
    Stdout(io::Stdout),
    File { path: PathBuf, writer: BufWriter<File> },
    Writer(Box<dyn Write>),
}

impl Sink {
    /// Flush buffered output and release the destination. Files are synced
    /// to disk so that late write errors are reported here.
    pub fn close(self) -> Result<()> {
        match self {
            Sink::Stdout(mut stdout) => stdout.flush()?,
            Sink::File { path, writer } => {
                let file = writer.into_inner().map_err(|e| e.into_error())?;
                file.sync_all()?;
                debug!("Closed output file {}", path.display());
            }
            Sink::Writer(mut writer) => writer.flush()?,
        }
        Ok(())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(stdout) => stdout.write(buf),
            Sink::File { writer, .. } => writer.write(buf),
            Sink::Writer(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(stdout) => stdout.flush(),
            Sink::File { writer, .. } => writer.flush(),
            Sink::Writer(writer) => writer.flush(),
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sink::Stdout(_) => f.write_str("Sink::Stdout"),
            Sink::File { path, .. } => write!(f, "Sink::File({})", path.display()),
            Sink::Writer(_) => f.write_str("Sink::Writer"),
        }
    }
}

/// Immutable render bundle for one run.
#[derive(Debug)]
pub struct OutputConfig {
    pub(crate) strategy: RenderStrategy,
    pub(crate) sink: Sink,
    template_ignored: bool,
}

impl OutputConfig {
    pub fn builder() -> OutputConfigBuilder {
        OutputConfigBuilder::default()
    }

    pub fn strategy(&self) -> &RenderStrategy {
        &self.strategy
    }

    pub fn is_json(&self) -> bool {
        matches!(self.strategy, RenderStrategy::Json)
    }

    /// Whether a custom template was given but dropped in favour of JSON.
    pub fn template_ignored(&self) -> bool {
        self.template_ignored
    }

    /// Release the sink without rendering anything.
    pub fn close(self) -> Result<()> {
        self.sink.close()
    }

    pub(crate) fn into_parts(self) -> (RenderStrategy, Sink) {
        (self.strategy, self.sink)
    }
}

#[derive(Default)]
enum TemplateSource {
    #[default]
    Builtin,
    File(PathBuf),
    Compiled(UpdateTemplate),
}

#[derive(Default)]
enum SinkSource {
    #[default]
    Stdout,
    File(PathBuf),
    Writer(Box<dyn Write>),
}

/// Accumulates output options.
///
/// Nothing is opened or compiled until [`OutputConfigBuilder::build`]. The
/// template is loaded before the output file is created, so a bad template
/// never truncates an existing output file.
#[derive(Default)]
pub struct OutputConfigBuilder {
    json: bool,
    template: TemplateSource,
    sink: SinkSource,
}

impl OutputConfigBuilder {
    /// Render a JSON array instead of text. Takes precedence over any
    /// custom template.
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Render with the template defined in the given file.
    pub fn template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = TemplateSource::File(path.into());
        self
    }

    /// Render with an already compiled template.
    pub fn template(mut self, template: UpdateTemplate) -> Self {
        self.template = TemplateSource::Compiled(template);
        self
    }

    /// Write to the given file, created or truncated at build time.
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sink = SinkSource::File(path.into());
        self
    }

    /// Write to an arbitrary writer.
    pub fn writer(mut self, writer: impl Write + 'static) -> Self {
        self.sink = SinkSource::Writer(Box::new(writer));
        self
    }

    pub fn build(self) -> Result<OutputConfig> {
        let custom_template = !matches!(self.template, TemplateSource::Builtin);
        let template_ignored = self.json && custom_template;

        let strategy = if self.json {
            if template_ignored {
                warn!("json output defined, ignoring provided template");
            }
            RenderStrategy::Json
        } else {
            let template = match self.template {
                TemplateSource::Builtin => UpdateTemplate::changelog()?,
                TemplateSource::File(path) => UpdateTemplate::from_file(&path)?,
                TemplateSource::Compiled(template) => template,
            };
            debug!("Template sections: {:?}", template.sections());
            RenderStrategy::Template(template)
        };

        let sink = match self.sink {
            SinkSource::Stdout => Sink::Stdout(io::stdout()),
            SinkSource::File(path) => {
                let file = File::create(&path).map_err(|e| {
                    Error::Config(format!(
                        "failed creating output file '{}': {e}",
                        path.display()
                    ))
                })?;
                Sink::File {
                    path,
                    writer: BufWriter::new(file),
                }
            }
            SinkSource::Writer(writer) => Sink::Writer(writer),
        };

        Ok(OutputConfig {
            strategy,
            sink,
            template_ignored,
        })
    }
}
