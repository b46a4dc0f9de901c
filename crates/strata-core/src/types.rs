//! Catalog and storage path types

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::fmt;

/// Class of stored entities, used as the key into the catalog registry.
///
/// Files referenced from a column of their owner's table belong in the root of
/// the owner's directory (`users/%d/`). Files that live in their own table or
/// come as a family (an HLS playlist and its segments) get a sub-directory
/// (`products/%d/certificates/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogType(Cow<'static, str>);

impl CatalogType {
    /// Catalog whose directory is supplied by the caller through [`PathSelector::Custom`]
    pub const CUSTOM: CatalogType = CatalogType(Cow::Borrowed("custom_catalog"));

    /// Files placed directly under the root catalog
    pub const ROOT: CatalogType = CatalogType(Cow::Borrowed(""));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_custom(&self) -> bool {
        *self == Self::CUSTOM
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CatalogType {
    fn default() -> Self {
        Self::ROOT
    }
}

impl From<&str> for CatalogType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CatalogType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for CatalogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `%` verb in a path pattern: `%[flags][width][.precision]verb` with
/// flags from `-+0 #` and verbs `d`, `s` or `v`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotVerb {
    left: bool,
    zero: bool,
    plus: bool,
    width: usize,
    precision: Option<usize>,
    verb: char,
    /// Bytes taken by the verb in the pattern
    len: usize,
}

impl SlotVerb {
    /// Parse the verb at the start of `text`, which begins with `%`
    fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut verb = SlotVerb {
            left: false,
            zero: false,
            plus: false,
            width: 0,
            precision: None,
            verb: 'v',
            len: 0,
        };

        let mut i = 1;
        while let Some(&b) = bytes.get(i) {
            match b {
                b'-' => verb.left = true,
                b'0' => verb.zero = true,
                b'+' => verb.plus = true,
                b' ' | b'#' => {}
                _ => break,
            }
            i += 1;
        }

        let (width, next) = digits(bytes, i);
        verb.width = width;
        i = next;

        if bytes.get(i) == Some(&b'.') {
            let (precision, next) = digits(bytes, i + 1);
            verb.precision = Some(precision);
            i = next;
        }

        match bytes.get(i) {
            Some(&b @ (b'd' | b's' | b'v')) => {
                verb.verb = b as char;
                verb.len = i + 1;
                Some(verb)
            }
            _ => None,
        }
    }

    fn apply(&self, value: &str) -> String {
        let mut body: String = match (self.verb, self.precision) {
            ('s' | 'v', Some(precision)) => value.chars().take(precision).collect(),
            _ => value.to_string(),
        };
        if self.verb == 'd' && self.plus && !body.starts_with('-') {
            body.insert(0, '+');
        }

        let pad = self.width.saturating_sub(body.chars().count());
        if pad == 0 {
            return body;
        }

        if self.left {
            body.push_str(&" ".repeat(pad));
            body
        } else if self.zero {
            let signed = self.verb == 'd' && body.starts_with(|c: char| c == '-' || c == '+');
            body.insert_str(usize::from(signed), &"0".repeat(pad));
            body
        } else {
            format!("{}{}", " ".repeat(pad), body)
        }
    }
}

fn digits(bytes: &[u8], start: usize) -> (usize, usize) {
    let mut value = 0usize;
    let mut i = start;
    while let Some(b) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
        value = value.saturating_mul(10).saturating_add(usize::from(b - b'0'));
        i += 1;
    }
    (value, i)
}

/// Directory template with a single substitution slot, e.g. `products/%d/certificates/`.
///
/// Patterns are stored as given. A pattern without a slot, or with more than
/// one, is reported when it is formatted rather than when it is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern(String);

impl PathPattern {
    /// Pattern that yields the substituted value unchanged
    pub fn identity() -> Self {
        Self("%s".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute `value` into the slot. `%%` is emitted as a literal `%`.
    ///
    /// Slots are `{}` or a `%d`/`%s`/`%v` verb with optional flags, width and
    /// precision (`%05d`, `%-8s`, `%.3s`). Any other `%` sequence is literal text.
    pub fn format(&self, catalog: &CatalogType, value: &str) -> Result<String> {
        let mut out = String::with_capacity(self.0.len() + value.len());
        let mut slots = 0usize;
        let mut rest = self.0.as_str();

        while let Some(ch) = rest.chars().next() {
            if let Some(tail) = rest.strip_prefix("%%") {
                out.push('%');
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("{}") {
                slots += 1;
                out.push_str(value);
                rest = tail;
            } else if let Some(verb) = rest.starts_with('%').then(|| SlotVerb::parse(rest)).flatten() {
                slots += 1;
                out.push_str(&verb.apply(value));
                rest = &rest[verb.len..];
            } else {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }

        match slots {
            1 => Ok(out),
            0 => Err(self.malformed(catalog, "pattern has no substitution slot".to_string())),
            n => Err(self.malformed(
                catalog,
                format!("pattern has {} substitution slots, expected one", n),
            )),
        }
    }

    fn malformed(&self, catalog: &CatalogType, reason: String) -> Error {
        Error::MalformedPattern {
            catalog: catalog.to_string(),
            pattern: self.0.clone(),
            reason,
        }
    }
}

impl From<&str> for PathPattern {
    fn from(pattern: &str) -> Self {
        Self(pattern.to_string())
    }
}

impl From<String> for PathPattern {
    fn from(pattern: String) -> Self {
        Self(pattern)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value substituted into a catalog's path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSelector {
    /// Numeric identifier of the owning entity (product id, user id)
    Entity(i64),
    /// Caller-chosen directory, only meaningful for [`CatalogType::CUSTOM`]
    Custom(String),
}

impl Default for PathSelector {
    fn default() -> Self {
        PathSelector::Entity(0)
    }
}

/// Where a file, or a family of files, lives in the bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoragePath {
    /// Service prefix inside the bucket. The storage facade overwrites it from
    /// configuration before resolving.
    pub root_catalog: String,
    pub catalog_type: CatalogType,
    pub selector: PathSelector,
}

impl StoragePath {
    /// Path of an entity's directory inside a registered catalog
    pub fn entity(catalog_type: impl Into<CatalogType>, id: i64) -> Self {
        Self {
            root_catalog: String::new(),
            catalog_type: catalog_type.into(),
            selector: PathSelector::Entity(id),
        }
    }

    /// Caller-chosen directory under the root catalog
    pub fn custom(path: impl Into<String>) -> Self {
        Self {
            root_catalog: String::new(),
            catalog_type: CatalogType::CUSTOM,
            selector: PathSelector::Custom(path.into()),
        }
    }

    /// Files stored directly under the root catalog
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_root_catalog(mut self, root_catalog: impl Into<String>) -> Self {
        self.root_catalog = root_catalog.into();
        self
    }
}

/// File handed to an upload: its name (with extension) and a borrowed byte stream.
///
/// The stream stays owned by the caller; uploads read it to the end and
/// neither close nor keep it.
#[derive(Debug)]
pub struct BucketFile<R> {
    pub name: String,
    pub reader: R,
}

impl<R> BucketFile<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }
}

/// Several files uploaded under the same storage path
#[derive(Debug)]
pub struct BucketFilesData<R> {
    pub path: StoragePath,
    pub files: Vec<BucketFile<R>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> CatalogType {
        CatalogType::from("product")
    }

    #[test]
    fn test_format_slot_tokens() {
        for raw in ["products/%d/", "products/%s/", "products/%v/", "products/{}/"] {
            let pattern = PathPattern::from(raw);
            assert_eq!(pattern.format(&product(), "42").unwrap(), "products/42/");
        }
    }

    #[test]
    fn test_format_verb_flags() {
        let cases = [
            ("ids/%05d/", "42", "ids/00042/"),
            ("ids/%05d/", "-42", "ids/-0042/"),
            ("ids/%+d/", "7", "ids/+7/"),
            ("ids/%4d/", "7", "ids/   7/"),
            ("ids/%-4d/", "7", "ids/7   /"),
            ("ids/%2d/", "12345", "ids/12345/"),
            ("slug/%.3s/", "abcdef", "slug/abc/"),
            ("slug/%6.2s/", "abcdef", "slug/    ab/"),
        ];
        for (raw, value, expected) in cases {
            let pattern = PathPattern::from(raw);
            assert_eq!(pattern.format(&product(), value).unwrap(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_format_unknown_verb_is_literal() {
        let pattern = PathPattern::from("hex/%x/%d/");
        assert_eq!(pattern.format(&product(), "9").unwrap(), "hex/%x/9/");

        let err = PathPattern::from("hex/%x/").format(&product(), "9").unwrap_err();
        assert_eq!(err.code(), "MalformedPattern");
    }

    #[test]
    fn test_format_literal_percent() {
        let pattern = PathPattern::from("reports/100%%/%d/");
        assert_eq!(pattern.format(&product(), "7").unwrap(), "reports/100%/7/");
    }

    #[test]
    fn test_format_rejects_missing_slot() {
        let err = PathPattern::from("products/").format(&product(), "1").unwrap_err();
        assert_eq!(err.code(), "MalformedPattern");
    }

    #[test]
    fn test_format_rejects_extra_slots() {
        let err = PathPattern::from("%d/%d/").format(&product(), "1").unwrap_err();
        assert!(err.to_string().contains("2 substitution slots"));
    }

    #[test]
    fn test_identity_pattern() {
        let pattern = PathPattern::identity();
        assert_eq!(
            pattern.format(&CatalogType::CUSTOM, "media/2024/").unwrap(),
            "media/2024/"
        );
    }

    #[test]
    fn test_format_keeps_multibyte_text() {
        let pattern = PathPattern::from("каталог/%d/");
        assert_eq!(pattern.format(&product(), "3").unwrap(), "каталог/3/");
    }

    #[test]
    fn test_storage_path_constructors() {
        let path = StoragePath::entity("user", 5);
        assert_eq!(path.catalog_type.as_str(), "user");
        assert_eq!(path.selector, PathSelector::Entity(5));

        let path = StoragePath::custom("docs/");
        assert!(path.catalog_type.is_custom());
        assert_eq!(path.selector, PathSelector::Custom("docs/".into()));

        assert!(StoragePath::root().catalog_type.is_root());
    }
}
