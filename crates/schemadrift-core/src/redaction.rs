use serde::{Deserialize, Serialize};

const MASK: &str = "***";
const SENSITIVE_PARAMS: &[&str] = &["password", "pass", "pwd", "token", "api_key", "apikey"];

/// Connection metadata that is safe to persist in run artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Mask the password and sensitive query parameters of a URL-style
/// connection string, extracting the non-secret parts.
///
/// Strings without a `scheme://` prefix are masked entirely since their
/// layout is unknown.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let Some((scheme, rest)) = conn.split_once("://") else {
        return RedactedConnection {
            engine: None,
            user: None,
            host: None,
            port: None,
            database: None,
            redacted: MASK.to_string(),
        };
    };

    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };
    let (authority, path) = location.split_once('/').unwrap_or((location, ""));
    let (credentials, host_port) = match authority.rsplit_once('@') {
        Some((credentials, host_port)) => (Some(credentials), host_port),
        None => (None, authority),
    };

    let (user, masked_credentials) = match credentials {
        Some(credentials) => match credentials.split_once(':') {
            Some((user, _password)) => (Some(user.to_string()), format!("{user}:{MASK}@")),
            None => (Some(credentials.to_string()), format!("{credentials}@")),
        },
        None => (None, String::new()),
    };

    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse::<u16>().ok()),
        None => (host_port.to_string(), None),
    };

    let mut redacted = format!("{scheme}://{masked_credentials}{host_port}");
    if !path.is_empty() || location.ends_with('/') {
        redacted.push('/');
        redacted.push_str(path);
    }
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&mask_query(query));
    }

    RedactedConnection {
        engine: Some(scheme.to_string()),
        user,
        host: (!host.is_empty()).then_some(host),
        port,
        database: (!path.is_empty()).then(|| path.to_string()),
        redacted,
    }
}

fn mask_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SENSITIVE_PARAMS.contains(&key.to_lowercase().as_str()) => {
                format!("{key}={MASK}")
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}
