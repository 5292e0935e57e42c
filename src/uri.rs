//! Document URI - stable identity for every analyzed file
//!
//! Format: `file://<absolute path>`
//!
//! Examples:
//! - `file:///@test/a.ts`
//! - `file:///work/project/src/lib.d.ts`
//!
//! Also derives the module name used as the file-relative moniker prefix.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

const SCHEME: &str = "file://";

/// Characters that cannot appear raw in the path part of a URI
const ESCAPED: &[(char, &str)] = &[('%', "%25"), (' ', "%20"), ('#', "%23"), ('?', "%3F")];

/// Source extensions stripped when deriving a module name, longest first.
const MODULE_EXTENSIONS: &[&str] = &[
    ".d.mts", ".d.cts", ".d.ts", ".mts", ".cts", ".tsx", ".ts", ".mjs", ".cjs", ".jsx", ".js",
];

/// URI of one analyzed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentUri {
    /// Absolute, `/`-separated file path
    pub path: String,
}

impl DocumentUri {
    /// Create a URI from a file path. Backslashes are normalized to `/`.
    pub fn from_path(path: impl AsRef<str>) -> Self {
        let mut path = normalize_path(path.as_ref());
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self { path }
    }

    /// Parse a URI string into a DocumentUri
    ///
    /// Expected format: `file://<path>`
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix(SCHEME)
            .ok_or_else(|| Error::InvalidUri(format!("URI must start with {SCHEME}: {uri}")))?;
        if !rest.starts_with('/') {
            return Err(Error::InvalidUri(format!("URI path must be absolute: {uri}")));
        }

        let mut path = rest.to_string();
        for (raw, escaped) in ESCAPED.iter().rev() {
            path = path.replace(escaped, &raw.to_string());
        }
        Ok(Self { path })
    }

    /// Convert to URI string
    pub fn to_uri_string(&self) -> String {
        let mut encoded = String::with_capacity(self.path.len() + SCHEME.len());
        encoded.push_str(SCHEME);
        for c in self.path.chars() {
            match ESCAPED.iter().find(|(raw, _)| *raw == c) {
                Some((_, escaped)) => encoded.push_str(escaped),
                None => encoded.push(c),
            }
        }
        encoded
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for DocumentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for DocumentUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for DocumentUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DocumentUri::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Replace platform separators with `/`.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Module name of a file relative to the project root.
///
/// `/@test/lib/util.ts` under root `/@test` becomes `lib/util`. Files outside
/// the root keep their full path (minus the leading `/`).
pub fn module_name(root: &str, path: &str) -> String {
    let root = normalize_path(root);
    let path = normalize_path(path);
    let root = root.trim_end_matches('/');

    let relative = path
        .strip_prefix(root)
        .filter(|rest| root.is_empty() || rest.starts_with('/'))
        .unwrap_or(path.as_str())
        .trim_start_matches('/');

    let lower = relative.to_ascii_lowercase();
    let stem_len = MODULE_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map(|ext| relative.len() - ext.len())
        .unwrap_or(relative.len());

    relative[..stem_len].to_string()
}
