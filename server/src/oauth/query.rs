use regex::Regex;

/// Fetch a query parameter from `url` by name.
///
/// Returns `None` when the parameter is absent, `Some("")` when it is present
/// without a value (`?flag` or `?flag=`), and the decoded value otherwise.
/// `+` decodes to a space. The name is matched literally, so names such as
/// `a[1]` work without escaping. Malformed percent escapes decode lossily
/// instead of failing.
pub fn extract_query_param(name: &str, url: &str) -> Option<String> {
    let pattern = format!(r"[?&]{}(=([^&#]*)|&|#|$)", regex::escape(name));
    // The escaped name cannot produce an invalid pattern
    let regex = Regex::new(&pattern).ok()?;

    let captures = regex.captures(url)?;
    let raw = match captures.get(2) {
        Some(value) if !value.as_str().is_empty() => value.as_str(),
        _ => return Some(String::new()),
    };

    Some(decode_component(raw))
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
        }
    }
}

/// Cut the query string (and anything after it) off a page URL
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://x/page?foo=bar&baz=qux";

    #[test]
    fn finds_present_parameters() {
        assert_eq!(extract_query_param("foo", URL).as_deref(), Some("bar"));
        assert_eq!(extract_query_param("baz", URL).as_deref(), Some("qux"));
    }

    #[test]
    fn missing_parameter_is_none() {
        assert_eq!(extract_query_param("missing", URL), None);
    }

    #[test]
    fn parameter_without_value_is_empty() {
        assert_eq!(
            extract_query_param("flag", "http://x/?flag").as_deref(),
            Some("")
        );
        assert_eq!(
            extract_query_param("flag", "http://x/?flag=&other=1").as_deref(),
            Some("")
        );
        assert_eq!(
            extract_query_param("flag", "http://x/?a=1&flag#frag").as_deref(),
            Some("")
        );
    }

    #[test]
    fn metacharacters_in_name_match_literally() {
        let url = "http://x/?a[1]=one&a1=wrong";
        assert_eq!(extract_query_param("a[1]", url).as_deref(), Some("one"));

        // `.` must not match any character
        assert_eq!(extract_query_param("a.b", "http://x/?axb=1"), None);
        assert_eq!(
            extract_query_param("a.b", "http://x/?a.b=2").as_deref(),
            Some("2")
        );
    }

    #[test]
    fn name_must_start_a_parameter() {
        assert_eq!(extract_query_param("oo", URL), None);
        assert_eq!(extract_query_param("foo", "http://x/foo=bar"), None);
    }

    #[test]
    fn values_are_decoded() {
        let url = "http://x/?code=a%2Fb%3Dc&name=Ola+Nordmann&emoji=%F0%9F%94%91";
        assert_eq!(extract_query_param("code", url).as_deref(), Some("a/b=c"));
        assert_eq!(
            extract_query_param("name", url).as_deref(),
            Some("Ola Nordmann")
        );
        assert_eq!(extract_query_param("emoji", url).as_deref(), Some("🔑"));
    }

    #[test]
    fn value_stops_at_fragment() {
        assert_eq!(
            extract_query_param("state", "http://x/?state=abc#section").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn fragment_parameters_are_found() {
        assert_eq!(
            extract_query_param("code", "http://x/page#x&code=xyz").as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn malformed_escape_decodes_lossily() {
        let value = extract_query_param("v", "http://x/?v=%E2%28").unwrap();
        assert!(value.ends_with('('));
    }

    #[test]
    fn strip_query_keeps_path() {
        assert_eq!(strip_query("http://x/page?code=1&state=2"), "http://x/page");
        assert_eq!(strip_query("http://x/page"), "http://x/page");
    }
}
