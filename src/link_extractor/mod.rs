use roxmltree::{Document, Node};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::ExtractError;
use crate::xml_source::{FetchConfig, XmlSource};

// Defaults for link recognition
const DEFAULT_TAGS: [&str; 4] = ["loc", "a", "link", "url"]; // loc first for sitemaps
const DEFAULT_ATTRIBUTES: [&str; 3] = ["href", "src", "url"];

/// XML namespace used by standard sitemap documents. Tags qualified with it
/// (`<loc>` in particular) match through their local name.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Configuration for link recognition
///
/// Holds the tag local-names whose text content counts as a link and the
/// attribute names whose value counts as a link. Both sets start from fixed
/// defaults and can be extended per call.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    link_tags: HashSet<String>,
    link_attributes: HashSet<String>,
}

impl ExtractorConfig {
    /// Creates a new extractor configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds extra tag local-names whose text content is treated as a link
    pub fn with_extra_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Adds extra attribute names whose value is treated as a link
    pub fn with_extra_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_attributes
            .extend(attributes.into_iter().map(Into::into));
        self
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            link_tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            link_attributes: DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Extracts the sorted set of unique link strings from an XML document
///
/// Walks the element tree depth-first. At every element, recognized attributes
/// contribute their value and recognized tags contribute their trimmed text
/// content. When `base` is given (the document came from a URL), attribute
/// values are resolved against it with standard relative-URL resolution;
/// tag text is inserted verbatim. That asymmetry is deliberate: attribute
/// links are often relative paths, text links in feeds are typically already
/// absolute.
///
/// # Arguments
/// * `xml` - The XML document text
/// * `base` - URL the document was fetched from, if any
/// * `config` - Tag and attribute recognition sets
///
/// # Returns
/// * `Result<Vec<String>, ExtractError>` - Sorted unique links, or a parse
///   error if the text is not well-formed XML
pub fn extract_from_xml(
    xml: &str,
    base: Option<&Url>,
    config: &ExtractorConfig,
) -> Result<Vec<String>, ExtractError> {
    let document = Document::parse(xml)?;

    let mut links = BTreeSet::new();
    collect_links(document.root_element(), base, config, &mut links, 0);

    debug!(total = links.len(), "extraction complete");
    Ok(links.into_iter().collect())
}

/// Extracts links from a source, surfacing fetch and parse failures
pub async fn try_extract_links(
    source: &XmlSource,
    config: &ExtractorConfig,
    fetch: &FetchConfig,
) -> Result<Vec<String>, ExtractError> {
    let loaded = source.load(fetch).await?;
    extract_from_xml(&loaded.content, loaded.base.as_ref(), config)
}

/// Extracts links from a source, returning an empty list on any failure
///
/// An unreadable source or malformed document is indistinguishable from a
/// document containing no links. Callers that need the distinction use
/// [`try_extract_links`] instead; the suppression lives here and only here.
pub async fn extract_links(
    source: &XmlSource,
    config: &ExtractorConfig,
    fetch: &FetchConfig,
) -> Vec<String> {
    match try_extract_links(source, config, fetch).await {
        Ok(links) => links,
        Err(err) => {
            warn!(source = %source, error = %err, "extraction failed, returning no links");
            Vec::new()
        }
    }
}

fn collect_links(
    node: Node<'_, '_>,
    base: Option<&Url>,
    config: &ExtractorConfig,
    links: &mut BTreeSet<String>,
    depth: usize,
) {
    let tag = node.tag_name();
    trace!(depth, tag = tag.name(), "checking element");

    for attribute in &config.link_attributes {
        if let Some(value) = node.attribute(attribute.as_str()) {
            if value.is_empty() {
                continue;
            }
            debug!(depth, attribute = attribute.as_str(), candidate = value, "link in attribute");
            links.insert(resolve_candidate(value, base));
        }
    }

    // Namespace-qualified tags (sitemap <loc> entries included) match on
    // their local name.
    if config.link_tags.contains(tag.name()) {
        if let Some(text) = node.text() {
            let text = text.trim();
            if !text.is_empty() {
                debug!(depth, tag = tag.name(), candidate = text, "link in tag text");
                links.insert(text.to_string());
            }
        }
    }

    for child in node.children().filter(Node::is_element) {
        collect_links(child, base, config, links, depth + 1);
    }
}

// Attribute-sourced candidates only. A candidate that cannot be joined is kept
// verbatim rather than dropped.
fn resolve_candidate(value: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => match base.join(value) {
            Ok(resolved) => resolved.to_string(),
            Err(err) => {
                trace!(candidate = value, error = %err, "candidate not joinable, keeping verbatim");
                value.to_string()
            }
        },
        None => value.to_string(),
    }
}
