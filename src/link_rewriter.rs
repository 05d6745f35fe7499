use encoding_rs::Encoding;
use lol_html::errors::RewritingError;
use lol_html::{element, AsciiCompatibleEncoding, HtmlRewriter, Settings};

use crate::html_parser::ResourceReference;

/// Points every `<tag attribute="original">` at `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub tag: String,
    pub attribute: String,
    pub original: String,
    pub new: String,
}

impl Replacement {
    pub fn for_reference(reference: &ResourceReference, new: impl Into<String>) -> Self {
        Self {
            tag: reference.tag().to_string(),
            attribute: reference.attribute().to_string(),
            original: reference.original_reference.clone(),
            new: new.into(),
        }
    }

    fn matches(&self, tag: &str, attribute: &str, value: &str) -> bool {
        self.tag == tag && self.attribute == attribute && self.original == value
    }
}

/// Streams `html` through a rewriter that swaps matching attribute values.
///
/// Only the start tags of matched elements are re-emitted; every other byte of
/// the input, `<template>` contents and comments included, is copied through
/// untouched in the page's own `encoding`. Attribute values are compared after
/// entity decoding, the same form the extractor reports them in.
pub fn rewrite_links(
    html: &[u8],
    encoding: &'static Encoding,
    replacements: &[Replacement],
) -> Result<Vec<u8>, RewritingError> {
    let mut output = Vec::with_capacity(html.len());

    let mut settings = Settings {
        element_content_handlers: vec![element!("*", |el| {
            let tag = el.tag_name();
            let mut rewritten: Vec<&str> = Vec::new();
            for replacement in replacements.iter().filter(|r| r.tag == tag) {
                let attribute = replacement.attribute.as_str();
                // a value already swapped must not be matched again
                if rewritten.contains(&attribute) {
                    continue;
                }
                let Some(raw) = el.get_attribute(attribute) else {
                    continue;
                };
                let value = html_escape::decode_html_entities(&raw);
                if replacement.matches(&tag, attribute, &value) {
                    el.set_attribute(attribute, &replacement.new)?;
                    rewritten.push(attribute);
                }
            }
            Ok(())
        })],
        ..Settings::default()
    };
    if let Some(encoding) = AsciiCompatibleEncoding::new(encoding) {
        settings.encoding = encoding;
    }

    let mut rewriter = HtmlRewriter::new(settings, |chunk: &[u8]| output.extend_from_slice(chunk));
    rewriter.write(html)?;
    rewriter.end()?;

    Ok(output)
}
