//! Integrity hash epilogue.

use md5::{Digest, Md5};

use super::tree::{to_xml_string, Element};
use super::{TissDocument, ANS_PREFIX};
use crate::error::Result;

/// Lowercase hex MD5 of the serialized document.
pub fn content_hash(serialized: &str) -> String {
    hex::encode(Md5::digest(serialized.as_bytes()))
}

/// Hash the document as serialized so far, append the epilogue and serialize again.
pub fn seal(mut root: Element) -> Result<TissDocument> {
    let body = to_xml_string(&root)?;
    let hash = content_hash(&body);

    root.push(
        Element::new(format!("{}:epilogo", ANS_PREFIX))
            .child(Element::leaf(format!("{}:hash", ANS_PREFIX), hash.as_str())),
    );

    Ok(TissDocument {
        xml: to_xml_string(&root)?,
        hash,
    })
}
