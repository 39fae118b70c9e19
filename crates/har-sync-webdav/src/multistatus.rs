//! PROPFIND multistatus response parsing.

use chrono::{DateTime, Utc};
use har_sync_core::{RemoteItemInfo, SyncError};

/// Parse a `207 Multi-Status` body into listing entries, skipping the
/// response element that represents the queried container itself.
pub(crate) fn parse_multistatus(
    xml: &str,
    queried_path: &str,
) -> Result<Vec<RemoteItemInfo>, SyncError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| SyncError::Serialization(format!("multistatus body: {e}")))?;

    let queried = queried_path.trim_end_matches('/');
    let mut items = Vec::new();

    for response in doc
        .descendants()
        .filter(|n| n.tag_name().name() == "response")
    {
        let Some(href) = child_text(&response, "href") else {
            continue;
        };
        let decoded = decode_href(&href);

        // The listing includes the queried collection as its first entry.
        if decoded.trim_end_matches('/').ends_with(queried) {
            continue;
        }

        let is_folder = response
            .descendants()
            .any(|n| n.tag_name().name() == "collection");
        let last_modified = child_text(&response, "getlastmodified")
            .and_then(|s| DateTime::parse_from_rfc2822(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let size = child_text(&response, "getcontentlength")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        let name = decoded
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        items.push(RemoteItemInfo {
            id: href,
            name,
            is_folder,
            last_modified,
            size,
        });
    }

    Ok(items)
}

fn child_text(node: &roxmltree::Node, tag: &str) -> Option<String> {
    node.descendants()
        .find(|n| n.tag_name().name() == tag)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn decode_href(href: &str) -> String {
    urlencoding::decode(href)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| href.to_string())
}
