//! Content types used in `[Content_Types].xml`

// Well-known content types
pub const MAIN_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
