/// Group label for a reference URL: the last segment of its path.
///
/// `https://example.com/pricing/compute-engine` → `compute-engine`;
/// a URL with an empty path yields `""`. Inputs that are not absolute URLs
/// are treated as a bare path (query and fragment removed).
pub fn group_of(url: &str) -> String {
    let url = url.trim();
    match url::Url::parse(url) {
        Ok(parsed) => last_segment(parsed.path()),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or("");
            last_segment(path)
        }
    }
}

fn last_segment(path: &str) -> String {
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}
