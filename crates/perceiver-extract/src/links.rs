//! Link normalisation for extracted candidates.

use url::Url;

/// Known search engines whose own pages never count as content links.
const ENGINE_HOSTS: &[&str] = &["google.", "bing.com", "duckduckgo.com"];

/// Path prefixes that identify engine-internal endpoints.
const INTERNAL_PATHS: &[&str] = &["/search", "/url", "/maps", "/webhp", "/imgres", "/l/", "/ck/"];

/// Resolve `href` against the page URL and unwrap `/url?q=` style redirects.
///
/// Returns `None` when the link cannot be turned into an absolute URL.
pub fn normalize_link(href: &str, page_url: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let parsed = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => page_url?.join(href).ok()?,
        Err(_) => return None,
    };
    Some(unwrap_redirect(&parsed).unwrap_or(parsed).to_string())
}

/// Target of a `/url?q=<target>` (or `url=`/`uddg=`) redirect wrapper.
pub fn unwrap_redirect(url: &Url) -> Option<Url> {
    let path = url.path();
    if path != "/url" && !path.starts_with("/l/") {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "q" || key == "url" || key == "uddg")
        .and_then(|(_, value)| Url::parse(&value).ok())
        .filter(|target| matches!(target.scheme(), "http" | "https"))
}

pub fn is_search_engine_host(host: &str) -> bool {
    let host = host.trim_start_matches("www.");
    ENGINE_HOSTS.iter().any(|engine| {
        if engine.ends_with('.') {
            host.starts_with(engine) || host.contains(&format!(".{engine}"))
        } else {
            host == *engine || host.ends_with(&format!(".{engine}"))
        }
    })
}

/// Search, redirect, maps or home endpoints of a search engine.
pub fn is_internal_engine_url(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if !is_search_engine_host(host) {
        return false;
    }
    let path = url.path();
    path.is_empty()
        || path == "/"
        || INTERNAL_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

/// Whether `url` is an engine results page for some query.
pub fn is_results_page(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| {
            parsed.host_str().map(is_search_engine_host).unwrap_or(false)
                && parsed.path().starts_with("/search")
        })
        .unwrap_or(false)
}
