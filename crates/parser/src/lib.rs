//! Updateinfo parser - stream, filter and render updateinfo XML feeds.
//!
//! The pipeline reads one `<update>` element at a time, keeps the updates
//! accepted by a [`FilterConfig`] and renders them either through a
//! four-section text template or as a JSON array.
//!
//! ```no_run
//! use std::path::Path;
//! use updateinfo_parser::{parse_file_to_output, FilterConfig, OutputConfig, SECURITY_TYPE};
//!
//! let filter = FilterConfig::builder()
//!     .update_type(SECURITY_TYPE)
//!     .after("1700000000")
//!     .build()?;
//! let output = OutputConfig::builder().json(true).build()?;
//! parse_file_to_output(Path::new("updateinfo.xml"), &filter, output)?;
//! # Ok::<(), updateinfo_parser::Error>(())
//! ```

mod decode;
pub mod filter;
pub mod output;
pub mod render;
pub mod stream;
pub mod template;

pub use filter::{read_packages_file, FilterConfig, FilterConfigBuilder, SECURITY_TYPE};
pub use output::{OutputConfig, OutputConfigBuilder, RenderStrategy, Sink};
pub use render::{parse_file_to_output, parse_to_output, render_updates};
pub use stream::{collect_updates, parse, ParseStats};
pub use template::{UpdateTemplate, DEFAULT_TEMPLATE};
pub use updateinfo_common::{Error, Result, Timestamp};
pub use updateinfo_schema::{Href, Package, Reference, Update, UpdateInfo};
