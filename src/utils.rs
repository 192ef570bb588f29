//! URL joining helpers for remote locations

use crate::error::{Error, Result};

/// Join a path segment onto a URL with exactly one `/` between them
///
/// Trailing slashes on `base` and leading slashes on `segment` are collapsed,
/// so the result never contains a doubled or missing separator. An empty
/// segment returns `base` unchanged.
///
/// # Examples
///
/// ```
/// use ftpsync_dl::utils::join_url;
///
/// assert_eq!(join_url("ftp://host/dir", "file.txt"), "ftp://host/dir/file.txt");
/// assert_eq!(join_url("ftp://host/dir/", "/file.txt"), "ftp://host/dir/file.txt");
/// ```
pub fn join_url(base: &str, segment: &str) -> String {
    let segment = segment.trim_start_matches('/');
    if segment.is_empty() {
        return base.to_string();
    }

    // A bare "scheme://" must keep its slashes
    if base.ends_with("://") {
        return format!("{}{}", base, segment);
    }

    format!("{}/{}", base.trim_end_matches('/'), segment)
}

/// URL of the remote entry `name` under `base`
///
/// `name` is percent-encoded as one path segment, so file names containing
/// `#`, `?`, `%` or `/` reach the engine as the file they name.
///
/// ```
/// use ftpsync_dl::utils::entry_url;
///
/// assert_eq!(entry_url("ftp://host/dir", "a#1.zip"), "ftp://host/dir/a%231.zip");
/// ```
pub fn entry_url(base: &str, name: &str) -> String {
    join_url(base, &urlencoding::encode(name))
}

/// Build the base URL for the remote directory currently being browsed
///
/// `address` must be an absolute URL such as `ftp://host` or
/// `ftp://host:2121`. `dir` is the remote directory path; each of its
/// components is percent-encoded.
pub fn remote_base(address: &str, dir: &str) -> Result<String> {
    let parsed = url::Url::parse(address).map_err(|e| Error::Config {
        message: format!("invalid remote address '{}': {}", address, e),
        key: Some("remote.address".to_string()),
    })?;

    if !parsed.has_host() {
        return Err(Error::Config {
            message: format!("remote address '{}' has no host", address),
            key: Some("remote.address".to_string()),
        });
    }

    let encoded_dir = dir
        .split('/')
        .filter(|component| !component.is_empty())
        .map(|component| urlencoding::encode(component).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    Ok(join_url(address, &encoded_dir))
}
