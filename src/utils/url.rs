//! Turning site-relative paths into absolute links

use crate::{Result, SeqServerError};
use tracing::warn;
use url::Url;

/// Builds the links placed in annotated output.
pub trait UrlBuilder: Send + Sync {
    /// Absolute, escaped form of a site-relative `path` (which may carry a
    /// query string).
    fn absolute(&self, path: &str) -> String;
}

/// Resolves paths against the configured site root.
#[derive(Debug, Clone)]
pub struct SiteUrl {
    base: Url,
}

impl SiteUrl {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| SeqServerError::Config(format!("Invalid base URL '{}': {}", base, e)))?;

        if base.cannot_be_a_base() {
            return Err(SeqServerError::Config(format!(
                "Base URL '{}' cannot hold relative paths",
                base
            )));
        }

        // Url::join replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl UrlBuilder for SiteUrl {
    fn absolute(&self, path: &str) -> String {
        match self.base.join(path.trim_start_matches('/')) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!("Unable to build link for {}: {}", path, e);
                path.to_string()
            }
        }
    }
}

/// Leaves paths site-relative, escaping only what cannot appear in a link.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeUrl;

impl UrlBuilder for RelativeUrl {
    fn absolute(&self, path: &str) -> String {
        path.replace(' ', "%20")
    }
}

/// Percent-encode one query parameter value.
pub fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
