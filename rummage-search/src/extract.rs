//! Generic DOM field-extraction fallback
//!
//! Tier-3 sources share no schema and their markup drifts constantly.
//! Instead of bespoke per-site parsing, each field is tried against an
//! ordered list of extraction strategies; the first non-empty hit wins and
//! partial markup changes degrade gracefully instead of breaking the site.
//! Adapters with reliable vendor APIs bypass this entirely.

use rummage_common::format::{
    format_duration, format_views, normalize_rating, parse_duration_text, parse_views_text,
};
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::SourceDescriptor;
use scraper::{ElementRef, Selector};
use url::Url;

/// Tag length bounds; anything outside is noise (single letters, inlined
/// descriptions picked up by a loose selector)
const TAG_MIN_LEN: usize = 2;
const TAG_MAX_LEN: usize = 49;

/// Lazy-load attributes checked before `src`
const THUMB_ATTRS: &[&str] = &[
    "data-src",
    "data-original",
    "data-thumb",
    "data-lazy",
    "data-image",
    "data-srcset",
    "src",
];

/// Vendor-specific preview attributes, checked on the container, then the
/// image, then the link
const PREVIEW_ATTRS: &[&str] = &[
    "data-preview",
    "data-previewvideo",
    "data-video-preview",
    "data-mediabook",
    "data-trailer-url",
];

const TITLE_SELECTORS: &[&str] = &[
    "h1", "h2", "h3", ".title", "p.title", "span.title", ".video-title", ".thumb-title",
];

const DURATION_SELECTORS: &[&str] = &[
    ".duration",
    "span.duration",
    ".video-duration",
    ".length",
    ".time",
    "var.duration",
];

const VIEWS_SELECTORS: &[&str] = &[".views", "span.views", ".video-views", ".views-count"];

const RATING_SELECTORS: &[&str] = &[".rating", "span.rating", ".video-rating", ".percent"];

const TAG_SELECTORS: &[&str] = &[".tags a", ".video-tags a", "a.tag", ".categories a"];

const PERFORMER_SELECTORS: &[&str] = &[
    ".performer",
    ".pornstar",
    ".model a",
    ".uploader a",
    "a.username",
];

// All selectors are static literals; a parse failure is a programmer error
fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn sels(list: &[&str]) -> Vec<Selector> {
    list.iter().map(|s| sel(s)).collect()
}

/// Pre-parsed selector chains, built once per adapter.
#[derive(Debug, Clone)]
pub struct Extractor {
    link: Selector,
    img: Selector,
    titles: Vec<Selector>,
    durations: Vec<Selector>,
    views: Vec<Selector>,
    ratings: Vec<Selector>,
    tags: Vec<Selector>,
    performers: Vec<Selector>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            link: sel("a[href]"),
            img: sel("img"),
            titles: sels(TITLE_SELECTORS),
            durations: sels(DURATION_SELECTORS),
            views: sels(VIEWS_SELECTORS),
            ratings: sels(RATING_SELECTORS),
            tags: sels(TAG_SELECTORS),
            performers: sels(PERFORMER_SELECTORS),
        }
    }

    /// Extract one candidate item node into a normalized result.
    ///
    /// Returns `None` when the node has no usable link or title; such items
    /// are silently skipped by the caller.
    pub fn extract_item(
        &self,
        node: ElementRef,
        base: &Url,
        source: &SourceDescriptor,
    ) -> Option<SearchResult> {
        let link = self.link_element(node)?;
        let url = absolutize(link.value().attr("href")?, base)?;
        let title = self.title(node, link)?;

        let mut result =
            SearchResult::new(&title, &url, &source.name, &source.display_name)?;

        if let Some(thumb) = self.thumbnail(node, base) {
            result.thumbnail = thumb;
        }
        result.preview_url = self.preview(node, link);
        if let Some(seconds) = self.duration(node) {
            result.duration = Some(format_duration(seconds));
            result.duration_seconds = Some(seconds);
        }
        if let Some(count) = self.views(node) {
            result.views = Some(format_views(count));
            result.views_count = Some(count);
        }
        result.rating = self.rating(node);
        result.tags = self.tag_list(node);
        result.performer = self.performer(node);

        Some(result)
    }

    /// The node itself if it is a link, else its first descendant link.
    fn link_element<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if node.value().name() == "a" && node.value().attr("href").is_some() {
            return Some(node);
        }
        node.select(&self.link).next()
    }

    /// Title chain: link title attr, image alt, heading-like selectors,
    /// link text content.
    fn title(&self, node: ElementRef, link: ElementRef) -> Option<String> {
        if let Some(title) = non_empty(link.value().attr("title")) {
            return Some(title);
        }
        if let Some(img) = node.select(&self.img).next() {
            if let Some(alt) = non_empty(img.value().attr("alt")) {
                return Some(alt);
            }
        }
        for selector in &self.titles {
            if let Some(el) = node.select(selector).next() {
                let text = element_text(el);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        let text = element_text(link);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn thumbnail(&self, node: ElementRef, base: &Url) -> Option<String> {
        let img = node.select(&self.img).next()?;
        for attr in THUMB_ATTRS {
            if let Some(value) = non_empty(img.value().attr(attr)) {
                // srcset-style values carry descriptors after the URL
                let candidate = value.split_whitespace().next().unwrap_or("");
                if let Some(url) = absolutize(candidate, base) {
                    return Some(url);
                }
            }
        }
        None
    }

    fn preview(&self, node: ElementRef, link: ElementRef) -> Option<String> {
        let img = node.select(&self.img).next();
        for attr in PREVIEW_ATTRS {
            for holder in [Some(node), img, Some(link)].into_iter().flatten() {
                if let Some(value) = non_empty(holder.value().attr(attr)) {
                    return Some(value);
                }
            }
        }
        None
    }

    fn duration(&self, node: ElementRef) -> Option<u64> {
        if let Some(value) = node
            .value()
            .attr("data-duration")
            .and_then(parse_duration_attr)
        {
            return Some(value);
        }
        for selector in &self.durations {
            if let Some(el) = node.select(selector).next() {
                if let Some(seconds) = parse_duration_text(&element_text(el)) {
                    return Some(seconds);
                }
            }
        }
        None
    }

    fn views(&self, node: ElementRef) -> Option<u64> {
        for selector in &self.views {
            if let Some(el) = node.select(selector).next() {
                if let Some(count) = parse_views_text(&element_text(el)) {
                    return Some(count);
                }
            }
        }
        None
    }

    fn rating(&self, node: ElementRef) -> Option<f64> {
        for selector in &self.ratings {
            if let Some(el) = node.select(selector).next() {
                let text = element_text(el);
                let cleaned = text.trim_end_matches('%').trim();
                if let Ok(value) = cleaned.parse::<f64>() {
                    return Some(normalize_rating(value));
                }
            }
        }
        None
    }

    /// Tags: deduplicated, lowercased, length-bounded.
    fn tag_list(&self, node: ElementRef) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for selector in &self.tags {
            for el in node.select(selector) {
                let tag = element_text(el).to_lowercase();
                if tag.len() < TAG_MIN_LEN || tag.len() > TAG_MAX_LEN {
                    continue;
                }
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
            if !tags.is_empty() {
                break;
            }
        }
        tags
    }

    fn performer(&self, node: ElementRef) -> Option<String> {
        if let Some(value) = non_empty(node.value().attr("data-performer")) {
            return Some(value);
        }
        for selector in &self.performers {
            if let Some(el) = node.select(selector).next() {
                let text = element_text(el);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }
}

/// Normalize an href/src to an absolute URL against the source's base.
/// Protocol-relative values are upgraded to https; root-relative and
/// relative values are joined to the base.
pub fn absolutize(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(Into::into)
}

/// Visible text with whitespace collapsed to single spaces.
fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(attr: Option<&str>) -> Option<String> {
    attr.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// `data-duration` style attributes carry either seconds or `M:SS`
fn parse_duration_attr(value: &str) -> Option<u64> {
    parse_duration_text(value)
}
