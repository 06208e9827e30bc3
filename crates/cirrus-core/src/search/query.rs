// ── Search location parsing ──
//
// The query lives in the location's `query` parameter, so a search view
// can be restored from a path like `/search?query=web`.

use url::Url;

const SEARCH_PATH: &str = "/search";

/// Extract the `query` parameter from a relative or absolute location.
///
/// Returns `None` when the location carries no `query` parameter.
pub fn query_from_location(location: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(location).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.into_owned())
}

/// Build the search location for `query`, percent-encoded.
pub fn search_location(query: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return SEARCH_PATH.to_owned();
    };
    url.set_path(SEARCH_PATH);
    url.query_pairs_mut().append_pair("query", query);
    match url.query() {
        Some(q) => format!("{SEARCH_PATH}?{q}"),
        None => SEARCH_PATH.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_query_from_relative_location() {
        assert_eq!(query_from_location("/search?query=web"), Some("web".into()));
        assert_eq!(
            query_from_location("/search?page=2&query=db%20replica"),
            Some("db replica".into())
        );
    }

    #[test]
    fn reads_query_from_absolute_location() {
        assert_eq!(
            query_from_location("https://panel.cirrus.example/search?query=lb+east"),
            Some("lb east".into())
        );
    }

    #[test]
    fn missing_parameter_is_none() {
        assert_eq!(query_from_location("/search"), None);
        assert_eq!(query_from_location("/search?q=web"), None);
    }

    #[test]
    fn empty_parameter_is_empty_query() {
        assert_eq!(query_from_location("/search?query="), Some(String::new()));
    }

    #[test]
    fn location_round_trips_through_parser() {
        let loc = search_location("web & db");
        assert_eq!(loc, "/search?query=web+%26+db");
        assert_eq!(query_from_location(&loc), Some("web & db".into()));
    }
}
