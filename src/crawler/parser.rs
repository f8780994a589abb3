//! HTML parser for extracting slang entries and the "next" link
//!
//! This module handles parsing a dictionary page to extract:
//! - Example sentence blocks (`blockquote.sentence`) with their highlighted word
//! - The link to the next page of the chain

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// One (word, sentence) pair found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// The highlighted slang word
    pub word: String,

    /// The full example sentence with the highlight markup flattened
    pub sentence: String,
}

impl PageEntry {
    pub fn new(word: impl Into<String>, sentence: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            sentence: sentence.into(),
        }
    }
}

/// Extracted information from a dictionary page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Entries in document order
    pub entries: Vec<PageEntry>,

    /// Absolute URL of the next page, if the page links to one
    pub next_url: Option<Url>,
}

/// Parses a dictionary page
///
/// # Extraction Rules
///
/// - Every `blockquote.sentence` is a candidate entry
/// - A block containing `span.censored` is dropped entirely
/// - A block without a non-empty `<b>` element is dropped
/// - The word is the text of the first `<b>`; the sentence is the text of the
///   whole block with `<b>` wrappers flattened and whitespace collapsed
/// - The next link is the first `<a href>` whose text contains `Next`,
///   resolved against `base_url`
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, used to resolve a relative next link
///
/// # Example
///
/// ```
/// use slang_harvest::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<blockquote class="sentence">He <b>yeet</b>ed it</blockquote>
///               <a href="/word/next">Next &raquo;</a>"#;
/// let base = Url::parse("http://example.com/word/yeet").unwrap();
/// let page = parse_page(html, &base).unwrap();
/// assert_eq!(page.entries[0].word, "yeet");
/// assert_eq!(page.entries[0].sentence, "He yeeted it");
/// assert_eq!(page.next_url.unwrap().as_str(), "http://example.com/word/next");
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> Result<ParsedPage, String> {
    let document = Html::parse_document(html);

    let entries = extract_entries(&document)?;
    let next_url = extract_next_url(&document, base_url)?;

    Ok(ParsedPage { entries, next_url })
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{}': {:?}", css, e))
}

/// Extracts all uncensored sentence blocks from the document
fn extract_entries(document: &Html) -> Result<Vec<PageEntry>, String> {
    let block_selector = selector("blockquote.sentence")?;
    let censored_selector = selector("span.censored")?;
    let bold_selector = selector("b")?;

    let mut entries = Vec::new();

    for block in document.select(&block_selector) {
        if block.select(&censored_selector).next().is_some() {
            continue;
        }

        let word = match block.select(&bold_selector).next() {
            Some(bold) => collapsed_text(bold),
            None => continue,
        };
        if word.is_empty() {
            continue;
        }

        let sentence = collapsed_text(block);
        if sentence.is_empty() {
            continue;
        }

        entries.push(PageEntry { word, sentence });
    }

    Ok(entries)
}

/// Finds the "Next" link and resolves it to an absolute http(s) URL
fn extract_next_url(document: &Html, base_url: &Url) -> Result<Option<Url>, String> {
    let link_selector = selector("a[href]")?;

    let next = document
        .select(&link_selector)
        .find(|link| link.text().any(|text| text.contains("Next")))
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_link(href, base_url));

    Ok(next)
}

/// Resolves a link href to an absolute URL
///
/// Returns None for empty hrefs, unparsable links and non-HTTP(S) results.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// All text under an element, whitespace collapsed
///
/// `<b>` highlights are flattened into the surrounding text; every other element
/// boundary (`<br>`, `<i>`, ...) separates words.
fn collapsed_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let separated = inner.name() != "b";
                if separated {
                    out.push(' ');
                }
                push_text(child_element, out);
                if separated {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
