//! Parse, filter and render in one pass.

use crate::filter::FilterConfig;
use crate::output::{OutputConfig, RenderStrategy};
use crate::stream::{parse, ParseStats};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, warn};
use updateinfo_common::{Error, Result};

/// Render the updates of `source` selected by `filter` into `out`.
///
/// With a template, the header is written first and every selected update
/// is rendered as soon as it is decoded. With JSON, the selected updates are
/// collected and written as one array once the document is exhausted.
pub fn render_updates<R, W>(
    source: R,
    filter: &FilterConfig,
    strategy: &RenderStrategy,
    out: &mut W,
) -> Result<ParseStats>
where
    R: BufRead,
    W: Write,
{
    match strategy {
        RenderStrategy::Template(template) => {
            template.render_header(&mut *out)?;
            let mut first = true;
            let stats = parse(source, filter, |update| {
                if !first {
                    template.render_join(&mut *out)?;
                }
                template.render_body(&update, &mut *out)?;
                first = false;
                Ok(())
            })?;
            template.render_footer(&mut *out)?;
            Ok(stats)
        }
        RenderStrategy::Json => {
            let mut updates = Vec::new();
            let stats = parse(source, filter, |update| {
                updates.push(update);
                Ok(())
            })?;
            serde_json::to_writer_pretty(&mut *out, &updates)?;
            Ok(stats)
        }
    }
}

/// Run the pipeline over `source` and release the output sink.
///
/// The sink is closed on every path. A close error is returned only when
/// rendering itself succeeded.
pub fn parse_to_output<R: BufRead>(
    source: R,
    filter: &FilterConfig,
    output: OutputConfig,
) -> Result<()> {
    let (strategy, mut sink) = output.into_parts();
    let rendered = render_updates(source, filter, &strategy, &mut sink);
    let closed = sink.close();

    let stats = rendered?;
    closed?;
    debug!(
        decoded = stats.decoded,
        selected = stats.selected,
        "Rendered updates"
    );
    Ok(())
}

/// Open the updateinfo file at `path` and run the pipeline over it.
pub fn parse_file_to_output(path: &Path, filter: &FilterConfig, output: OutputConfig) -> Result<()> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(source) => {
            if let Err(e) = output.close() {
                warn!("Failed to close output: {}", e);
            }
            return Err(Error::Input {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    debug!("Parsing {}", path.display());
    parse_to_output(BufReader::new(file), filter, output)
}
