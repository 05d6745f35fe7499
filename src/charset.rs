use std::borrow::Cow;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

/// How far into the document a `<meta>` charset declaration is looked for.
const PRESCAN_LEN: usize = 1024;

fn meta_charset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([A-Za-z0-9_:.\-]+)"#)
            .expect("valid meta charset regex")
    })
}

/// Picks the encoding of an HTML document: byte order mark first, then the
/// first `<meta charset>` or `http-equiv` declaration, then UTF-8.
///
/// Only ASCII-compatible encodings are returned, since the page is rewritten
/// in place; a declaration of anything else falls back to UTF-8.
pub fn detect_encoding(page: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(page) {
        if encoding.is_ascii_compatible() {
            return encoding;
        }
    }

    let prefix = &page[..page.len().min(PRESCAN_LEN)];
    meta_charset()
        .captures(prefix)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label_no_replacement(label.as_bytes()))
        .filter(|encoding| encoding.is_ascii_compatible())
        .unwrap_or(UTF_8)
}

/// Decodes `page` for parsing, replacing malformed sequences.
pub fn decode<'a>(page: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    let (text, _, _) = encoding.decode(page);
    text
}
