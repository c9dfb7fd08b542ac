//! URL helpers: origin checks, manifest resolution and path classification input.

use url::Url;

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a bare site origin such as `https://example.com`.
pub fn parse_origin(input: &str) -> Result<Url, UrlError> {
    let url = parse_absolute(input)?;
    if url.path() != "/" || url.query().is_some() {
        return Err(UrlError::InvalidUrl(format!("{input} is not a bare origin")));
    }
    Ok(url)
}

/// Resolve request input against the site origin.
///
/// Root-relative input (`/css/styles.css`) is joined onto `origin`; anything
/// else must be an absolute http(s) URL. Surrounding whitespace is trimmed.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if trimmed.starts_with('/') && !trimmed.starts_with("//") {
        return origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()));
    }

    parse_absolute(trimmed)
}

fn parse_absolute(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Same scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Lowercased extension of the last path segment, without the dot.
pub fn path_extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
