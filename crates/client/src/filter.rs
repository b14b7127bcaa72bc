//! Same-site link filtering.
//!
//! Narrows discovered links to the target domain. Hosts are compared after
//! stripping a leading `www.` and matched by substring, so subdomains of the
//! target are kept. Social media hosts are always dropped.

use scrapay_core::Error;
use url::Url;

/// Hosts that are never scraped, matched by substring.
pub const SOCIAL_DENYLIST: &[&str] = &[
    "github.com",
    "linkedin.com",
    "instagram.com",
    "twitter.com",
    "facebook.com",
    "youtube.com",
    "x.com",
];

/// Strip a single leading `www.` label.
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Derive the comparison domain for a site URL.
///
/// # Errors
///
/// Returns `Error::InvalidUrl` if `url` does not parse or has no host.
pub fn site_domain(url: &str) -> Result<String, Error> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("{}: URL has no host", url)))?;

    Ok(strip_www(host).to_string())
}

/// Keep the links that point at `domain` and not at a social media host.
///
/// Order is preserved and duplicates are kept. Links that do not parse as
/// absolute URLs are dropped.
pub fn filter_urls(links: &[String], domain: &str) -> Vec<String> {
    let domain = strip_www(domain);

    links
        .iter()
        .filter(|link| is_internal(link, domain))
        .cloned()
        .collect()
}

fn is_internal(link: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(link) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let host = strip_www(host);
    if SOCIAL_DENYLIST.iter().any(|social| host.contains(social)) {
        return false;
    }

    host.contains(domain)
}
