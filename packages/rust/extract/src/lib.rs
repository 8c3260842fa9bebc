//! Heading discovery and field extraction for the world cruise article.
//!
//! This crate provides:
//! - [`headings`]: year-section index and cruise heading list
//! - [`siblings`]: bounded marker scan over the nodes after a heading
//! - [`fields`]: regex parsers for each record field
//! - [`ExtractionSession`]: builds one [`CruiseRecord`] per heading
//!
//! [`CruiseRecord`]: worldcruise_shared::CruiseRecord

pub mod fields;
pub mod headings;
pub mod session;
pub mod siblings;

pub use headings::{HeadingIndex, YearIndex, heading_text, index_headings};
pub use session::ExtractionSession;
pub use siblings::{SiblingBlock, SiblingWalk};
