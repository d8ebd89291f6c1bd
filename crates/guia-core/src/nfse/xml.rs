//! XML helpers for reading NFS-e documents from any municipal vendor.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use roxmltree::Node;

lazy_static! {
    static ref PREFIXED_TAG: Regex = Regex::new(r"<(/?)[A-Za-z0-9]+:").unwrap();
}

/// Decode raw document bytes.
///
/// A UTF-8 byte order mark is dropped. Bytes that are not valid UTF-8 are
/// read as ISO-8859-1, which maps every byte to the code point of the same value.
pub fn decode_source(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Strip namespace prefixes from opening and closing tags.
///
/// `<ns2:CompNfse>` becomes `<CompNfse>` and `</ns2:CompNfse>` becomes
/// `</CompNfse>`. The rewrite is textual: a `<word:` sequence inside an
/// attribute value or CDATA section is rewritten too.
pub fn normalize_namespaces(source: &str) -> Cow<'_, str> {
    PREFIXED_TAG.replace_all(source, "<$1")
}

/// Find the first descendant element of `context` whose local name is `tag`.
///
/// The context node itself is never a match.
pub fn find_element<'a, 'input>(context: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    context
        .descendants()
        .skip(1)
        .find(|node| node.is_element() && node.tag_name().name() == tag)
}

/// Concatenated text of a node and all its descendants.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Trimmed text of the first `tag` element under `context`.
///
/// Returns an empty string when the context is absent or holds no such element.
pub fn find_text(context: Option<Node<'_, '_>>, tag: &str) -> String {
    context
        .and_then(|ctx| find_element(ctx, tag))
        .map(|node| text_content(node).trim().to_string())
        .unwrap_or_default()
}
