//! URL assembly for API resources.

/// Join a base URL and path segments with exactly one `/` between parts.
///
/// Leading and trailing slashes of each segment are trimmed and empty
/// segments are skipped, so an unset parent component never produces `//`.
pub fn join<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.as_ref().trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }
    url
}

/// Percent-encode a single path segment taken from caller data.
///
/// `/`, `?` and `#` are escaped so the value can never change the route.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Append a query string built from `pairs`, URL-encoding the values.
///
/// Keys are expected to be plain identifiers and are not encoded. Empty
/// values are kept (`q=`).
pub fn with_query(url: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return url.to_string();
    }
    let query = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{url}?{query}")
}
