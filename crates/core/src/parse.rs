//! HTML parsing and DOM queries.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors. Extractors only
//! read documents; the one tree that is edited is the private copy built by
//! [`crate::noise::strip_noise_document`].
//!
//! # Example
//!
//! ```rust
//! use lektion_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{Html, Selector};

use crate::{LektionError, Result};

/// Parses a CSS selector, mapping failures to [`LektionError::HtmlParseError`].
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| LektionError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use lektion_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html);
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// html5ever recovers from any malformed input, so parsing itself cannot fail.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Wraps an already parsed tree.
    pub fn from_html(html: Html) -> Self {
        Self { html }
    }

    /// Serializes the document back to HTML.
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`LektionError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lektion_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.select_parsed(&sel))
    }

    /// Selects elements with an already compiled selector, in document order.
    pub fn select_parsed(&'_ self, selector: &Selector) -> Vec<Element<'_>> {
        self.html.select(selector).map(|el| Element { element: el }).collect()
    }

    /// Returns the first element matching a compiled selector.
    pub fn select_first(&'_ self, selector: &Selector) -> Option<Element<'_>> {
        self.html.select(selector).next().map(|el| Element { element: el })
    }

    /// Gets the trimmed content of the `<title>` element, if non-empty.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Gets the trimmed text of the first `<h1>`, if non-empty.
    pub fn first_heading(&self) -> Option<String> {
        let selector = Selector::parse("h1").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| Element { element: el }.stripped_text())
            .filter(|t| !t.is_empty())
    }

    /// Gets the `content` of a `<meta property="...">` tag, if non-empty.
    pub fn meta_property(&self, property: &str) -> Option<String> {
        let selector = Selector::parse(&format!("meta[property=\"{}\"]", property)).ok()?;
        self.html
            .select(&selector)
            .find_map(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use lektion_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the raw concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Concatenates the trimmed text nodes with no separator.
    ///
    /// This is the measure used for every length threshold in the pipeline.
    pub fn stripped_text(&self) -> String {
        self.element.text().map(str::trim).collect()
    }

    /// Joins the non-empty trimmed text nodes with single spaces.
    pub fn spaced_text(&self) -> String {
        self.element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Character count of [`Element::stripped_text`].
    pub fn stripped_len(&self) -> usize {
        self.element.text().map(|t| t.trim().chars().count()).sum()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements with a compiled selector, in document order.
    pub fn select_parsed(&self, selector: &Selector) -> Vec<Element<'a>> {
        self.element.select(selector).map(|el| Element { element: el }).collect()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`LektionError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.select_parsed(&sel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="de">
        <head>
            <meta charset="UTF-8">
            <meta property="og:title" content=" OG Titel ">
            <title>Test Page</title>
        </head>
        <body>
            <h1>  Überschrift  </h1>
            <p class="content">Absatz 1</p>
            <p class="content">  Absatz
                2  </p>
            <div id="mixed"><span> eins </span><b>zwei</b> drei </div>
            <a href="https://example.com">Link</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
        assert_eq!(doc.first_heading(), Some("Überschrift".to_string()));
        assert_eq!(doc.meta_property("og:title"), Some("OG Titel".to_string()));
        assert_eq!(doc.meta_property("og:description"), None);
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Absatz 1");
    }

    #[test]
    fn test_text_variants() {
        let doc = Document::parse(SAMPLE_HTML);
        let mixed = &doc.select("#mixed").unwrap()[0];

        assert_eq!(mixed.stripped_text(), "einszweidrei");
        assert_eq!(mixed.spaced_text(), "eins zwei drei");
        assert_eq!(mixed.stripped_len(), 12);
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("a").unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].attr("href"), Some("https://example.com"));
        assert_eq!(elements[0].tag_name(), "a");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(LektionError::HtmlParseError(_))));
    }

    #[test]
    fn test_title_missing() {
        let doc = Document::parse("<html><head><title>   </title></head><body></body></html>");
        assert_eq!(doc.title(), None);
        assert_eq!(doc.first_heading(), None);
    }
}
