//! URL slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing or deriving a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// No slug characters remain after normalization.
    #[error("slug cannot be empty")]
    Empty,
    /// The slug is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside `[a-z0-9-]` or misplaced hyphens.
    #[error("slug must be lowercase alphanumeric segments joined by single hyphens")]
    InvalidFormat,
}

/// A URL-safe product slug.
///
/// Slugs are the canonical URL identity of a product: lowercase ASCII
/// alphanumeric segments joined by single hyphens, with no leading or
/// trailing hyphen. [`Slug::derive`] produces one from a display name;
/// [`Slug::parse`] accepts a string already in canonical form.
///
/// ## Examples
///
/// ```
/// use greenstem_core::Slug;
///
/// let slug = Slug::derive("iPhone 16 Pro!!").unwrap();
/// assert_eq!(slug.as_str(), "iphone-16-pro");
///
/// assert!(Slug::parse("iphone-16-pro").is_ok());
/// assert!(Slug::parse("iPhone 16").is_err()); // not canonical
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug (matches the slug column width).
    pub const MAX_LENGTH: usize = 255;

    /// Derive a slug from a display name.
    ///
    /// Lowercases the name and collapses every run of characters outside
    /// `[a-z0-9]` into a single hyphen. The result never starts or ends
    /// with a hyphen, so derivation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::Empty` if no alphanumeric characters remain,
    /// or `SlugError::TooLong` if the result exceeds [`Self::MAX_LENGTH`].
    pub fn derive(name: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_separator = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }

        if slug.is_empty() {
            return Err(SlugError::Empty);
        }

        if slug.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(slug))
    }

    /// Parse a string that is already in canonical slug form.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::InvalidFormat` if the input contains uppercase
    /// letters, characters outside `[a-z0-9-]`, or leading/trailing/doubled
    /// hyphens. Returns `SlugError::Empty`/`SlugError::TooLong` for length
    /// violations.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let valid_chars = s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars || s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_basic() {
        assert_eq!(Slug::derive("iPhone 16 Pro!!").unwrap().as_str(), "iphone-16-pro");
        assert_eq!(Slug::derive("Test Phone").unwrap().as_str(), "test-phone");
        assert_eq!(Slug::derive("plain").unwrap().as_str(), "plain");
    }

    #[test]
    fn test_derive_collapses_runs() {
        assert_eq!(Slug::derive("a  --  b").unwrap().as_str(), "a-b");
        assert_eq!(Slug::derive("one___two...three").unwrap().as_str(), "one-two-three");
    }

    #[test]
    fn test_derive_trims_edges() {
        assert_eq!(Slug::derive("  Hello  ").unwrap().as_str(), "hello");
        assert_eq!(Slug::derive("!!wow!!").unwrap().as_str(), "wow");
    }

    #[test]
    fn test_derive_empty() {
        assert!(matches!(Slug::derive(""), Err(SlugError::Empty)));
        assert!(matches!(Slug::derive("!!!"), Err(SlugError::Empty)));
        assert!(matches!(Slug::derive("   "), Err(SlugError::Empty)));
    }

    #[test]
    fn test_derive_too_long() {
        let name = "a".repeat(Slug::MAX_LENGTH + 1);
        assert!(matches!(Slug::derive(&name), Err(SlugError::TooLong { .. })));
    }

    #[test]
    fn test_derive_is_idempotent() {
        let first = Slug::derive("Wireless Kit (Mk. II)").unwrap();
        let second = Slug::derive(first.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_canonical() {
        assert!(Slug::parse("iphone-16-pro").is_ok());
        assert!(Slug::parse("a").is_ok());
        assert!(Slug::parse("1984-paperback").is_ok());
    }

    #[test]
    fn test_parse_rejects_non_canonical() {
        assert!(matches!(Slug::parse("IPhone"), Err(SlugError::InvalidFormat)));
        assert!(matches!(Slug::parse("a b"), Err(SlugError::InvalidFormat)));
        assert!(matches!(Slug::parse("-edge"), Err(SlugError::InvalidFormat)));
        assert!(matches!(Slug::parse("edge-"), Err(SlugError::InvalidFormat)));
        assert!(matches!(Slug::parse("a--b"), Err(SlugError::InvalidFormat)));
    }

    #[test]
    fn test_serde_roundtrip() {
        let slug = Slug::derive("Test Phone").unwrap();
        let json = serde_json::to_string(&slug).unwrap();
        assert_eq!(json, "\"test-phone\"");

        let parsed: Slug = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, slug);
    }
}
