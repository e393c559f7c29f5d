pub(crate) fn is_wildcard_host(host: &str) -> bool {
    matches!(host.trim(), "0.0.0.0" | "::")
}

fn is_loopback_host(host: &str) -> bool {
    matches!(host.trim(), "127.0.0.1" | "::1" | "localhost")
}

pub(crate) fn format_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Browser-facing base URL for the startup hints.
pub(crate) fn display_base_url(host: &str, port: u16) -> String {
    let host = host.trim();
    if is_wildcard_host(host) || is_loopback_host(host) {
        return format!("http://localhost:{port}");
    }
    format!("http://{}", format_host_port(host, port))
}
