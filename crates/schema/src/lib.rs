//! Record model for updateinfo documents.
//!
//! This crate defines the typed shape of patch/errata entries as found in
//! the `updateinfo.xml` metadata of RPM repositories, together with the JSON
//! representation used for machine-readable output.

pub mod package;
pub mod reference;
pub mod update;

pub use package::Package;
pub use reference::{Href, Reference};
pub use update::{Update, UpdateInfo};
