//! String-level XML helpers.
//!
//! Parts are patched by inserting fragments at anchor tags instead of being
//! parsed and re-serialized, so every byte outside the insertion point is
//! kept exactly as it was.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::ops::Range;

/// Forced page-break paragraph placed before an altChunk reference
pub const PAGE_BREAK_PARAGRAPH: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

/// Insert `fragment` immediately before the last occurrence of `anchor`.
///
/// Returns the byte offset of the insertion, or `None` (buffer untouched)
/// when the anchor does not occur.
pub fn insert_before_last(buf: &mut String, anchor: &str, fragment: &str) -> Option<usize> {
    let pos = buf.rfind(anchor)?;
    buf.insert_str(pos, fragment);
    Some(pos)
}

/// Replace every literal occurrence of `key`, returning the match count.
///
/// An empty key matches nothing.
pub fn replace_all(buf: &mut String, key: &str, value: &str) -> usize {
    if key.is_empty() {
        return 0;
    }
    let count = buf.matches(key).count();
    if count > 0 {
        *buf = buf.replace(key, value);
    }
    count
}

/// `<Relationship .../>` element for a package-internal target
pub fn relationship_element(id: &str, rel_type: &str, target: &str) -> String {
    format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
        escape(id),
        escape(rel_type),
        escape(target)
    )
}

/// `<Override .../>` element for `[Content_Types].xml`
pub fn override_element(part_name: &str, content_type: &str) -> String {
    format!(
        r#"<Override PartName="{}" ContentType="{}"/>"#,
        escape(part_name),
        escape(content_type)
    )
}

/// `<w:altChunk r:id="..."/>` reference, optionally preceded by a page break
pub fn alt_chunk_element(rel_id: &str, page_break: bool) -> String {
    let chunk = format!(r#"<w:altChunk r:id="{}"/>"#, escape(rel_id));
    if page_break {
        format!("{}{}", PAGE_BREAK_PARAGRAPH, chunk)
    } else {
        chunk
    }
}

/// Byte range of the root element's start tag, skipping the prolog
pub fn root_start_tag(xml: &str) -> Option<Range<usize>> {
    let mut pos = 0;
    loop {
        let start = pos + xml[pos..].find('<')?;
        let rest = &xml[start..];
        if rest.starts_with("<?") {
            pos = start + rest.find("?>")? + 2;
        } else if rest.starts_with("<!--") {
            pos = start + rest.find("-->")? + 3;
        } else if rest.starts_with("<!") {
            pos = start + rest.find('>')? + 1;
        } else {
            let mut quote = None;
            for (i, c) in rest.char_indices() {
                match (quote, c) {
                    (None, '"' | '\'') => quote = Some(c),
                    (Some(q), c) if c == q => quote = None,
                    (None, '>') => return Some(start..start + i + 1),
                    _ => {}
                }
            }
            return None;
        }
    }
}

/// URI bound to `xmlns:<prefix>` on the root element, if declared there
pub fn root_namespace(xml: &str, prefix: &str) -> Option<String> {
    let tag = &xml[root_start_tag(xml)?];
    let key = format!("xmlns:{}", prefix);
    match Reader::from_str(tag).read_event().ok()? {
        Event::Start(e) | Event::Empty(e) => e
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == key.as_bytes())
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned())),
        _ => None,
    }
}

/// Add `xmlns:<prefix>="uri"` to the root start tag, right after its name.
///
/// Returns the insertion offset, or `None` when there is no root element.
pub fn declare_root_namespace(xml: &mut String, prefix: &str, uri: &str) -> Option<usize> {
    let range = root_start_tag(xml)?;
    let name_len = xml[range.start + 1..range.end]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')?;
    let pos = range.start + 1 + name_len;
    xml.insert_str(pos, &format!(r#" xmlns:{}="{}""#, prefix, escape(uri)));
    Some(pos)
}

/// Whether an attribute `name="value"` appears in `xml`
pub fn has_attribute_value(xml: &str, name: &str, value: &str) -> bool {
    let escaped = escape(value);
    xml.contains(&format!("{}=\"{}\"", name, escaped))
        || xml.contains(&format!("{}='{}'", name, escaped))
}
