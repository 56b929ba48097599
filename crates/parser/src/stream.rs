//! Streaming parser.
//!
//! The document is read one token at a time. Every `<update>` element is
//! decoded into an [`Update`], checked against the filter and, when
//! selected, handed to the caller's handler before the next element is
//! read. Memory use is bounded by a single update record.

use crate::decode::{decode_update, xml_error, UPDATE_TAG};
use crate::filter::FilterConfig;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;
use tracing::{debug, trace};
use updateinfo_common::{Error, Result};
use updateinfo_schema::{Update, UpdateInfo};

/// Counters for one parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Update elements decoded from the document.
    pub decoded: usize,
    /// Updates accepted by the filter and passed to the handler.
    pub selected: usize,
}

/// Parse `source`, calling `handler` for every update accepted by `filter`.
///
/// Stops at the first decode error or handler error. Handler errors are
/// returned unchanged.
pub fn parse<R, F>(source: R, filter: &FilterConfig, mut handler: F) -> Result<ParseStats>
where
    R: BufRead,
    F: FnMut(Update) -> Result<()>,
{
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut stats = ParseStats::default();

    loop {
        let decoded = match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(xml_error(format!(
                    "{} (at byte {})",
                    e,
                    reader.buffer_position()
                )))
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) if e.local_name().as_ref() == UPDATE_TAG => {
                decode_update(&mut reader, &e, false)
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == UPDATE_TAG => {
                decode_update(&mut reader, &e, true)
            }
            Ok(_) => {
                buf.clear();
                continue;
            }
        };
        buf.clear();

        let update = decoded.map_err(|e| Error::decode("update", e))?;
        stats.decoded += 1;

        if !filter.matches(&update) {
            trace!(id = %update.id, update_type = %update.update_type, "Update filtered out");
            continue;
        }

        stats.selected += 1;
        handler(update)?;
    }

    debug!(
        decoded = stats.decoded,
        selected = stats.selected,
        "Finished parsing updateinfo"
    );
    Ok(stats)
}

/// Parse the whole document into memory, keeping only selected updates.
pub fn collect_updates<R: BufRead>(source: R, filter: &FilterConfig) -> Result<UpdateInfo> {
    let mut info = UpdateInfo::default();
    parse(source, filter, |update| {
        info.updates.push(update);
        Ok(())
    })?;
    Ok(info)
}
