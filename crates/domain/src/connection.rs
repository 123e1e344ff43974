//! Connection identity of a digitalSTROM server.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable slug identifying one configured server, derived from host and port
/// (e.g. `dss_local_8080`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionSlug(String);

impl ConnectionSlug {
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        Self(slugify(&format!("{host}_{port}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConnectionSlug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Human title of a server, e.g. `Apartment (dss.local:8080)`.
#[must_use]
pub fn connection_title(alias: &str, host: &str, port: u16) -> String {
    format!("{alias} ({host}:{port})")
}

/// Lowercase `text`, turn every run of non-alphanumeric characters into a
/// single `_`, and trim leading/trailing separators.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_slugify_host_and_port() {
        assert_eq!(ConnectionSlug::new("dss.local", 8080).as_str(), "dss_local_8080");
    }

    #[test]
    fn should_slugify_ip_address() {
        assert_eq!(
            ConnectionSlug::new("192.168.1.20", 8080).as_str(),
            "192_168_1_20_8080"
        );
    }

    #[test]
    fn should_collapse_and_trim_separators() {
        assert_eq!(slugify("  My--Apartment!! "), "my_apartment");
    }

    #[test]
    fn should_format_title_with_alias_host_and_port() {
        assert_eq!(
            connection_title("Apartment", "dss.local", 8080),
            "Apartment (dss.local:8080)"
        );
    }
}
