/// Pull http(s) URLs out of message text.
///
/// Slack wraps links in angle brackets (`<https://x|label>`); those are
/// unwrapped to the bare URL before matching.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for token in text.split_whitespace() {
        let token = token.trim_start_matches('<').trim_end_matches('>');
        let token = token.split('|').next().unwrap_or(token);
        if token.starts_with("http://") || token.starts_with("https://") {
            urls.push(token.to_string());
        }
    }
    urls
}

/// True iff the candidate parses as an absolute URL with a host.
pub fn is_valid_url(url: &str) -> bool {
    reqwest::Url::parse(url).map(|u| u.has_host()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_urls() {
        let urls = extract_urls("check https://example.com and http://other.io/page today");
        assert_eq!(urls, vec!["https://example.com", "http://other.io/page"]);
    }

    #[test]
    fn unwraps_slack_link_syntax() {
        let urls = extract_urls("see <https://example.com/deck|the deck>");
        assert_eq!(urls, vec!["https://example.com/deck"]);
    }

    #[test]
    fn ignores_text_without_urls() {
        assert!(extract_urls("nothing to see here").is_empty());
    }

    #[test]
    fn ftp_and_bare_hosts_do_not_match() {
        assert!(extract_urls("ftp://example.com example.com").is_empty());
    }

    #[test]
    fn validity_requires_a_host() {
        assert!(is_valid_url("https://example.com/deck#3"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("not a url"));
    }
}
