//! Admin event resource path parsing.
//!
//! Role events identify their subject only through the resource path:
//!
//! - `roles/{name}` for realm roles
//! - `clients/{clientId}/roles/{name}` for client roles
//!
//! Paths may carry a leading `realms/{realm}` prefix or slashes.
//! Segments are percent-decoded.

/// The subject of a role admin event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePath {
    /// Internal client id, when the path names a client.
    pub client_id: Option<String>,
    /// Role name.
    pub role_name: String,
}

/// Parses a role resource path.
///
/// Returns `None` unless the path ends in `roles/{name}` with a
/// non-empty, valid UTF-8 name.
#[must_use]
pub fn parse_role_path(path: &str) -> Option<RolePath> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let [prefix @ .., "roles", name] = segments.as_slice() else {
        return None;
    };

    let role_name = decode(name)?;
    if role_name.trim().is_empty() {
        return None;
    }

    let client_id = prefix
        .windows(2)
        .rev()
        .find(|pair| pair[0] == "clients")
        .and_then(|pair| decode(pair[1]))
        .filter(|id| !id.is_empty());

    Some(RolePath {
        client_id,
        role_name,
    })
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}
