//! `tdrive:///<id>` resource addresses.

use url::Url;

pub const SCHEME: &str = "tdrive";

/// URI template advertised for file resources.
pub const URI_TEMPLATE: &str = "tdrive:///{id}";

/// Address of a file's content.
pub fn file_uri(file_id: &str) -> String {
    format!("{SCHEME}:///{file_id}")
}

/// Pull the file identifier out of a resource URI.
///
/// The identifier is the last non-empty path segment. Anything that does not
/// parse, or has no such segment, yields an empty string, which callers must
/// reject.
pub fn extract_id(uri: &str) -> String {
    let Ok(url) = Url::parse(uri) else {
        return String::new();
    };
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment() {
        assert_eq!(extract_id("tdrive:///abc123"), "abc123");
    }

    #[test]
    fn nested_path_takes_last_segment() {
        assert_eq!(extract_id("tdrive:///folder/abc123"), "abc123");
        assert_eq!(extract_id("tdrive:///folder/abc123/"), "abc123");
    }

    #[test]
    fn unparsable_is_empty() {
        assert_eq!(extract_id("not a uri"), "");
        assert_eq!(extract_id(""), "");
    }

    #[test]
    fn no_segment_is_empty() {
        assert_eq!(extract_id("tdrive:///"), "");
        assert_eq!(extract_id("tdrive:abc"), "");
    }

    #[test]
    fn file_uri_round_trips() {
        assert_eq!(file_uri("f-42"), "tdrive:///f-42");
        assert_eq!(extract_id(&file_uri("f-42")), "f-42");
    }
}
