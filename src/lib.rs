//! Extraction of link strings from sitemap-style XML documents.
//!
//! The core is [`link_extractor`], a pure pass over a parsed XML tree.
//! [`xml_source`] supplies the content, either over HTTP or from a local file.

pub mod error;
pub mod link_extractor;
pub mod utils;
pub mod xml_source;

pub use error::{ExtractError, FetchError};
pub use link_extractor::{
    extract_from_xml, extract_links, try_extract_links, ExtractorConfig, SITEMAP_NAMESPACE,
};
pub use xml_source::{FetchConfig, LoadedXml, XmlSource};
