//! # Server Resolution
//!
//! Finds the declared server a request targets and the path relative to it.
//! Server aliases substitute the URL that is compared against the request,
//! which lets a contract written for production recognise local traffic.

use indexmap::IndexMap;
use tracing::trace;
use url::Url;

/// The outcome of server resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMatch<'a> {
    /// The declared server URL that matched; `None` when the contract has no servers.
    pub server: Option<&'a str>,
    /// The request path relative to the server, always starting with `/`.
    pub relative_path: String,
}

/// Resolves `uri` against the declared `servers`.
///
/// Servers are tried in declaration order; the first whose effective URL
/// (alias or declared URL) prefixes the request URI wins. Returns `None` when
/// servers are declared but none matches.
pub fn resolve_server<'a>(
    servers: &'a [String],
    aliases: &IndexMap<String, String>,
    uri: &Url,
) -> Option<ServerMatch<'a>> {
    if servers.is_empty() {
        return Some(ServerMatch {
            server: None,
            relative_path: ensure_leading_slash(uri.path()),
        });
    }

    for server in servers {
        let effective = aliases.get(server).unwrap_or(server);

        if effective.starts_with('/') {
            if let Some(relative_path) = relative_to_path(effective, uri.path()) {
                return Some(ServerMatch {
                    server: Some(server),
                    relative_path,
                });
            }
            trace!(server = %server, effective = %effective, "server path does not prefix request");
            continue;
        }

        let base = normalize_base(effective);
        if uri.as_str().starts_with(base.as_str()) {
            return Some(ServerMatch {
                server: Some(server),
                relative_path: relative_to_url(&base, uri),
            });
        }
        trace!(server = %server, effective = %base, "server does not prefix request");
    }

    None
}

/// Normalizes an absolute server URL the same way request URIs are normalized
/// (lowercase scheme and host, default port dropped). Templated or otherwise
/// unparseable URLs are compared verbatim.
fn normalize_base(effective: &str) -> String {
    Url::parse(effective)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| effective.to_string())
}

fn relative_to_url(base: &str, uri: &Url) -> String {
    let relative = Url::parse(&ensure_trailing_slash(base))
        .ok()
        .and_then(|base| base.make_relative(uri));

    match relative {
        Some(relative) => {
            let end = relative.find(['?', '#']).unwrap_or(relative.len());
            ensure_leading_slash(&relative[..end])
        }
        None => ensure_leading_slash(uri.path()),
    }
}

fn relative_to_path(server_path: &str, request_path: &str) -> Option<String> {
    let base = ensure_trailing_slash(server_path);
    if let Some(rest) = request_path.strip_prefix(base.as_str()) {
        return Some(ensure_leading_slash(rest));
    }
    if request_path == base.trim_end_matches('/') {
        return Some("/".to_string());
    }
    None
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
