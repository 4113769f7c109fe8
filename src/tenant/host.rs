use std::net::IpAddr;

/// Lower-case, drop the port and a leading `www.` label.
///
/// IPv6 literals keep their brackets stripped so they can be recognised
/// by [`is_local_or_ip`].
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim().to_ascii_lowercase();

    let host = if let Some(rest) = host.strip_prefix('[') {
        // [::1]:3000
        rest.split(']').next().unwrap_or_default().to_string()
    } else if host.matches(':').count() == 1 {
        host.split(':').next().unwrap_or_default().to_string()
    } else {
        host
    };

    let host = host.trim_end_matches('.');
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Hosts that never identify a masjid
pub fn is_local_or_ip(host: &str) -> bool {
    host.is_empty() || host == "localhost" || host.ends_with(".localhost") || host.parse::<IpAddr>().is_ok()
}

/// Leftmost label when `host` is a subdomain of `root_domain`.
///
/// Requires at least three labels, so the root domain itself never yields a slug.
pub fn subdomain_slug<'a>(host: &'a str, root_domain: &str) -> Option<&'a str> {
    let root = root_domain.trim().trim_start_matches('.');
    if root.is_empty() {
        return None;
    }

    if host.split('.').count() < 3 {
        return None;
    }

    let prefix = host.strip_suffix(root)?.strip_suffix('.')?;
    prefix.split('.').next().filter(|label| !label.is_empty())
}
