use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::warn;

use crate::error::ResolveError;

/// The part of a Nexus 'content' listing we care about:
///
/// ```xml
/// <content>
///   <data>
///     <content-item>
///       <resourceURI>http://.../directory/4.7.0.3-GA/directory-4.7.0.3-GA.zip</resourceURI>
///       <text>directory-4.7.0.3-GA.zip</text>
///       <lastModified>2011-08-03 01:02:49.0 CDT</lastModified>
///       ...
///     </content-item>
///   </data>
/// </content>
/// ```
///
/// All other elements are ignored, and elements may appear in any order.
#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    data: Data,
}

#[derive(Debug, Default, Deserialize)]
struct Data {
    #[serde(rename = "content-item", default)]
    content_items: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "lastModified", default)]
    last_modified: Option<String>,
    #[serde(rename = "resourceURI", default)]
    resource_uri: Option<String>,
}

/// One row of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub display_name: String,
    pub resource_uri: String,
    pub last_modified: NaiveDateTime,
}

/// Parses a listing document. Rows lacking one of the three fields we need, or carrying a
///  timestamp we can not read, are skipped - only a document that is not a listing at all is an
///  error.
pub fn parse_listing(document: &[u8]) -> Result<Vec<CatalogEntry>, ResolveError> {
    let content: Content = serde_xml_rs::from_reader(document)
        .map_err(|e| ResolveError::MalformedListing(e.to_string()))?;

    let entries = content.data.content_items.into_iter()
        .filter_map(|item| {
            let (display_name, last_modified, resource_uri) = match (item.text, item.last_modified, item.resource_uri) {
                (Some(t), Some(l), Some(r)) if !t.is_empty() && !r.is_empty() => (t, l, r),
                (text, _, _) => {
                    warn!("skipping incomplete listing entry {:?}", text);
                    return None;
                }
            };

            match parse_last_modified(&last_modified) {
                Ok(last_modified) => Some(CatalogEntry {
                    display_name,
                    resource_uri,
                    last_modified,
                }),
                Err(e) => {
                    warn!("skipping listing entry {}: {}", display_name, e);
                    None
                }
            }
        })
        .collect();
    Ok(entries)
}

/// Nexus timestamps look like "2011-08-03 01:02:49.0 CDT". Fractional seconds and time zone are
///  dropped, the rest is taken as a local date and time.
pub fn parse_last_modified(s: &str) -> Result<NaiveDateTime, ResolveError> {
    let stripped = s.split('.').next().unwrap_or(s).trim();
    NaiveDateTime::parse_from_str(stripped, "%Y-%m-%d %H:%M:%S")
        .map_err(|_| ResolveError::MalformedTimestamp(s.to_string()))
}
