use std::path::PathBuf;

use anyhow::{Context, Result};
use select::document::Document;
use select::node::Node;
use select::predicate::{Name, Predicate};
use url::Url;

/// A sub-resource reference found in the page markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceReference {
    /// Attribute value exactly as it appeared in the markup.
    pub original_reference: String,
    pub resolved_url: Url,
    pub resource_type: ResourceType,
    /// Set once the resource has been saved.
    pub local_path: Option<PathBuf>,
}

impl ResourceReference {
    pub fn tag(&self) -> &'static str {
        self.resource_type.tag()
    }

    pub fn attribute(&self) -> &'static str {
        self.resource_type.attribute()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Image,
    Script,
    Link,
}

impl ResourceType {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "img" => Some(Self::Image),
            "script" => Some(Self::Script),
            "link" => Some(Self::Link),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Script => "script",
            Self::Link => "link",
        }
    }

    pub fn attribute(self) -> &'static str {
        match self {
            Self::Image | Self::Script => "src",
            Self::Link => "href",
        }
    }
}

/// Finds the same-origin resources a page references.
#[derive(Clone)]
pub struct HtmlParser {
    base_url: Url,
}

impl HtmlParser {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Failed to parse base URL: {}", base_url))?;

        Ok(Self { base_url })
    }

    pub fn from_url(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Returns `img[src]`, `script[src]` and `link[href]` references that
    /// resolve to the page's own host, in document order.
    pub fn extract_resources(&self, html_content: &str) -> Vec<ResourceReference> {
        let document = Document::from(html_content);

        document
            .find(Name("img").or(Name("script")).or(Name("link")))
            .filter_map(|node| self.reference_for(&node))
            .collect()
    }

    fn reference_for(&self, node: &Node) -> Option<ResourceReference> {
        let resource_type = ResourceType::from_tag(node.name()?)?;
        let value = node.attr(resource_type.attribute())?;

        if value.trim().is_empty() || is_data_uri(value) {
            return None;
        }

        let resolved_url = self.resolve_url(value)?;
        if !self.is_same_origin(&resolved_url) {
            return None;
        }

        Some(ResourceReference {
            original_reference: value.to_string(),
            resolved_url,
            resource_type,
            local_path: None,
        })
    }

    /// Resolves relative, root-relative and protocol-relative references.
    pub fn resolve_url(&self, reference: &str) -> Option<Url> {
        self.base_url.join(reference).ok()
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        matches!(
            (url.host_str(), self.base_url.host_str()),
            (Some(resource_host), Some(page_host)) if resource_host == page_host
        )
    }
}

fn is_data_uri(value: &str) -> bool {
    value
        .trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
            <head>
                <link rel="stylesheet" href="/assets/application.css">
                <link rel="canonical" href="https://ru.hexlet.io/courses">
                <script src="https://js.stripe.com/v3/"></script>
            </head>
            <body>
                <img src="/assets/professions/nodejs.png" alt="Node">
                <a href="/about">About</a>
                <script src="https://ru.hexlet.io/packs/js/runtime.js"></script>
            </body>
        </html>
    "#;

    fn parser() -> HtmlParser {
        HtmlParser::new("https://ru.hexlet.io/courses").unwrap()
    }

    #[test]
    fn test_extracts_same_origin_resources_in_document_order() {
        let resources = parser().extract_resources(PAGE);

        let found: Vec<(&str, &str)> = resources
            .iter()
            .map(|r| (r.tag(), r.original_reference.as_str()))
            .collect();

        assert_eq!(
            found,
            vec![
                ("link", "/assets/application.css"),
                ("link", "https://ru.hexlet.io/courses"),
                ("img", "/assets/professions/nodejs.png"),
                ("script", "https://ru.hexlet.io/packs/js/runtime.js"),
            ]
        );
        assert!(resources.iter().all(|r| r.local_path.is_none()));
    }

    #[test]
    fn test_resolves_against_page_url() {
        let resources = parser().extract_resources(PAGE);
        let image = resources
            .iter()
            .find(|r| r.resource_type == ResourceType::Image)
            .unwrap();

        assert_eq!(
            image.resolved_url.as_str(),
            "https://ru.hexlet.io/assets/professions/nodejs.png"
        );
        assert_eq!(image.attribute(), "src");
    }

    #[test]
    fn test_skips_cross_origin_and_anchors() {
        let resources = parser().extract_resources(PAGE);

        assert!(resources.iter().all(|r| r.resolved_url.host_str() == Some("ru.hexlet.io")));
        assert!(!resources.iter().any(|r| r.original_reference == "/about"));
    }

    #[test]
    fn test_host_match_is_exact() {
        let html = r#"
            <img src="https://cdn.ru.hexlet.io/a.png">
            <img src="https://hexlet.io/b.png">
            <img src="http://ru.hexlet.io/c.png">
        "#;
        let resources = parser().extract_resources(html);

        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].original_reference, "http://ru.hexlet.io/c.png");
    }

    #[test]
    fn test_skips_empty_and_data_references() {
        let html = r#"
            <img src="">
            <img src="   ">
            <img src="data:image/png;base64,iVBORw0KGgo=">
            <img src="DATA:image/gif;base64,R0lGOD">
            <script>console.log("inline")</script>
            <link rel="preconnect">
        "#;

        assert!(parser().extract_resources(html).is_empty());
    }

    #[test]
    fn test_keeps_duplicate_references() {
        let html = r#"<img src="/logo.png"><img src="/logo.png">"#;
        let resources = parser().extract_resources(html);

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0], resources[1]);
    }

    #[test]
    fn test_tolerates_malformed_markup() {
        let html = r#"<div><img src="/a.png"<p>unclosed <script src="/b.js"></div"#;
        let resources = parser().extract_resources(html);

        assert!(resources.iter().any(|r| r.resolved_url.path() == "/b.js"));
    }

    #[test]
    fn test_url_resolution() {
        let parser = HtmlParser::new("https://example.com/subdir/").unwrap();

        let test_cases = vec![
            ("../style.css", "https://example.com/style.css"),
            ("./script.js", "https://example.com/subdir/script.js"),
            ("images/photo.jpg", "https://example.com/subdir/images/photo.jpg"),
            ("https://cdn.example.com/style.css", "https://cdn.example.com/style.css"),
            ("//cdn.example.com/script.js", "https://cdn.example.com/script.js"),
        ];

        for (input, expected) in test_cases {
            let result = parser.resolve_url(input).unwrap();
            assert_eq!(result.as_str(), expected, "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HtmlParser::new("not a url").is_err());
    }
}
