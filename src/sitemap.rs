//! `<urlset>` parsing.
//!
//! Locations are looked up with two strategies in a fixed order: first
//! `<url><loc>` elements bound to the sitemaps.org namespace, then the same
//! elements without any namespace. The first strategy that finds something
//! wins; a strategy that finds nothing returns an empty list.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

pub const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

const PREVIEW_BYTES: usize = 200;

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("sitemap document is empty")]
    Empty,
    #[error("XML parse error near byte {position}: {source}\nstart of document: {preview}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
        preview: String,
    },
    #[error("malformed sitemap near byte {position}: {kind}\nstart of document: {preview}")]
    Malformed {
        position: u64,
        kind: Malformation,
        preview: String,
    },
}

/// Well-formedness problems the XML reader itself lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformation {
    #[error("document ends inside {0} unclosed element(s)")]
    Truncated(usize),
    #[error("no root element")]
    NoRoot,
    #[error("text outside the root element")]
    TextOutsideRoot,
    #[error("more than one root element")]
    MultipleRoots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocStrategy {
    /// `<url>`/`<loc>` in the sitemaps.org namespace.
    Namespaced,
    /// `<url>`/`<loc>` with no namespace at all.
    Plain,
}

impl LocStrategy {
    pub const ORDER: [LocStrategy; 2] = [LocStrategy::Namespaced, LocStrategy::Plain];

    fn accepts(self, resolved: &ResolveResult) -> bool {
        match (self, resolved) {
            (Self::Namespaced, ResolveResult::Bound(Namespace(ns))) => *ns == SITEMAP_NS,
            (Self::Plain, ResolveResult::Unbound) => true,
            _ => false,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Namespaced => "namespaced",
            Self::Plain => "plain",
        }
    }
}

/// Extract every `<loc>` of a `<urlset>`, in document order.
pub fn extract_urls(content: &[u8]) -> Result<Vec<String>, SitemapError> {
    let start_time = Instant::now();
    info!(action = "start", component = "sitemap_parse", "Parsing sitemap");

    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(SitemapError::Empty);
    }

    for strategy in LocStrategy::ORDER {
        let urls = scan_locations(content, strategy)?;
        if !urls.is_empty() {
            info!(
                action = "complete",
                component = "sitemap_parse",
                strategy = strategy.as_str(),
                url_count = urls.len(),
                duration_ms = start_time.elapsed().as_millis(),
                "Extracted URLs from sitemap"
            );
            return Ok(urls);
        }
    }

    warn!(
        action = "complete",
        component = "sitemap_parse",
        duration_ms = start_time.elapsed().as_millis(),
        "No <url><loc> entries found in sitemap"
    );
    Ok(Vec::new())
}

/// Only the first `<loc>` directly under each `<url>` is taken; an empty
/// first `<loc>` yields nothing for that `<url>`.
pub fn scan_locations(content: &[u8], strategy: LocStrategy) -> Result<Vec<String>, SitemapError> {
    let mut reader = NsReader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut urls = Vec::new();
    let mut depth = 0usize;
    let mut root_closed = false;
    // depth of the `<url>` being read and whether its `<loc>` was seen
    let mut current_url: Option<(usize, bool)> = None;
    let mut loc: Option<String> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let xml_error = |source| SitemapError::Xml {
            position,
            source,
            preview: preview(content),
        };
        let malformed = |kind| SitemapError::Malformed {
            position,
            kind,
            preview: preview(content),
        };

        // `event` borrows `buf`
        {
            let (resolved, event) = match reader.read_resolved_event_into(&mut buf) {
                Ok(resolved_event) => resolved_event,
                Err(e) => return Err(xml_error(e)),
            };

            match event {
                Event::Start(ref e) => {
                    if depth == 0 && root_closed {
                        return Err(malformed(Malformation::MultipleRoots));
                    }
                    depth += 1;
                    match e.local_name().as_ref() {
                        b"url" if current_url.is_none() && strategy.accepts(&resolved) => {
                            current_url = Some((depth, false));
                        }
                        b"loc" if strategy.accepts(&resolved) => {
                            if let Some((url_depth, loc_seen)) = current_url.as_mut() {
                                if *url_depth + 1 == depth && !*loc_seen {
                                    *loc_seen = true;
                                    loc = Some(String::new());
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Empty(ref e) => {
                    if depth == 0 {
                        if root_closed {
                            return Err(malformed(Malformation::MultipleRoots));
                        }
                        root_closed = true;
                    } else if e.local_name().as_ref() == b"loc" && strategy.accepts(&resolved) {
                        if let Some((url_depth, loc_seen)) = current_url.as_mut() {
                            if *url_depth == depth {
                                *loc_seen = true;
                            }
                        }
                    }
                }
                Event::Text(ref e) => {
                    if depth == 0 {
                        return Err(malformed(Malformation::TextOutsideRoot));
                    }
                    if let Some(text) = loc.as_mut() {
                        text.push_str(&e.unescape().map_err(xml_error)?);
                    }
                }
                Event::CData(e) => {
                    if depth == 0 {
                        return Err(malformed(Malformation::TextOutsideRoot));
                    }
                    if let Some(text) = loc.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(ref e) => {
                    match e.local_name().as_ref() {
                        b"loc" if loc.is_some()
                            && current_url.map(|(d, _)| d + 1) == Some(depth) =>
                        {
                            if let Some(text) = loc.take() {
                                let text = text.trim();
                                if !text.is_empty() {
                                    urls.push(text.to_string());
                                }
                            }
                        }
                        b"url" if current_url.map(|(d, _)| d) == Some(depth) => {
                            current_url = None;
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        root_closed = true;
                    }
                }
                Event::Eof => {
                    if depth > 0 {
                        return Err(malformed(Malformation::Truncated(depth)));
                    }
                    if !root_closed {
                        return Err(malformed(Malformation::NoRoot));
                    }
                    break;
                }
                _ => {}
            }
        }
        buf.clear();
    }

    Ok(urls)
}

fn preview(content: &[u8]) -> String {
    let end = content.len().min(PREVIEW_BYTES);
    String::from_utf8_lossy(&content[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://a.com/categoria/scarpe</loc>
    <lastmod>2024-01-01</lastmod>
  </url>
  <url><loc> https://a.com/prodotto/nike-air </loc></url>
  <url><loc>https://a.com/search?q=a&amp;page=2</loc></url>
  <url><loc><![CDATA[https://a.com/chi-siamo]]></loc></url>
  <url><loc></loc></url>
</urlset>"#;

    const PLAIN: &str = r#"<urlset>
  <url><loc>https://b.com/one</loc></url>
  <url><loc>https://b.com/two</loc></url>
</urlset>"#;

    #[test]
    fn namespaced_sitemap_in_document_order() {
        let urls = extract_urls(NAMESPACED.as_bytes()).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://a.com/categoria/scarpe",
                "https://a.com/prodotto/nike-air",
                "https://a.com/search?q=a&page=2",
                "https://a.com/chi-siamo",
            ]
        );
    }

    #[test]
    fn prefixed_namespace_is_recognised() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:url><sm:loc>https://c.com/x</sm:loc></sm:url>
</sm:urlset>"#;
        assert_eq!(extract_urls(xml.as_bytes()).unwrap(), vec!["https://c.com/x"]);
    }

    #[test]
    fn plain_sitemap_uses_second_strategy() {
        assert!(scan_locations(PLAIN.as_bytes(), LocStrategy::Namespaced)
            .unwrap()
            .is_empty());
        assert_eq!(
            extract_urls(PLAIN.as_bytes()).unwrap(),
            vec!["https://b.com/one", "https://b.com/two"]
        );
    }

    #[test]
    fn plain_strategy_ignores_other_namespaces() {
        let xml = r#"<urlset xmlns="urn:example:other"><url><loc>https://d.com</loc></url></urlset>"#;
        assert!(extract_urls(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn loc_outside_url_is_ignored() {
        let xml = r#"<sitemapindex><sitemap><loc>https://e.com/s1.xml</loc></sitemap></sitemapindex>"#;
        assert!(extract_urls(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error_with_preview() {
        let xml = "<urlset><url><loc>https://f.com</loc></urlset>";
        let err = extract_urls(xml.as_bytes()).unwrap_err();
        match err {
            SitemapError::Xml { preview, .. } => assert!(preview.starts_with("<urlset>")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn malformation(xml: &[u8]) -> Malformation {
        match extract_urls(xml) {
            Err(SitemapError::Malformed { kind, .. }) => kind,
            other => panic!("expected a malformed sitemap, got {other:?}"),
        }
    }

    #[test]
    fn truncated_document_is_an_error() {
        let xml = br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://a.com/x</loc></url><url><loc>https://a.com/y"#;
        assert_eq!(malformation(xml), Malformation::Truncated(3));
    }

    #[test]
    fn non_xml_bytes_are_an_error() {
        assert_eq!(
            malformation(b"\x1f\x8bgarbage"),
            Malformation::TextOutsideRoot
        );
        assert_eq!(malformation(b"just some text"), Malformation::TextOutsideRoot);
    }

    #[test]
    fn document_without_root_is_an_error() {
        assert_eq!(
            malformation(b"<?xml version=\"1.0\"?><!-- nothing here -->"),
            Malformation::NoRoot
        );
    }

    #[test]
    fn second_root_is_an_error() {
        assert_eq!(
            malformation(b"<urlset></urlset><urlset></urlset>"),
            Malformation::MultipleRoots
        );
    }

    #[test]
    fn empty_root_is_well_formed() {
        assert!(extract_urls(b"<urlset/>").unwrap().is_empty());
    }

    #[test]
    fn only_first_loc_of_each_url_is_taken() {
        let xml = r#"<urlset>
  <url><loc>https://g.com/1</loc><loc>https://g.com/2</loc></url>
  <url><loc/><loc>https://g.com/3</loc></url>
  <url><image><loc>https://g.com/img.png</loc></image><loc>https://g.com/4</loc></url>
</urlset>"#;
        assert_eq!(
            extract_urls(xml.as_bytes()).unwrap(),
            vec!["https://g.com/1", "https://g.com/4"]
        );
    }

    #[test]
    fn blank_document_is_an_error() {
        assert!(matches!(extract_urls(b"  \n"), Err(SitemapError::Empty)));
    }
}
