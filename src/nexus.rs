//! Resolution of product builds in a Nexus repository: from product, version and qualifier to
//!  the listing URI, and from the listing to a single downloadable artifact.

pub mod listing_xml;
pub mod paths;
pub mod products;
pub mod repository;
pub mod selector;
pub mod version;
