//! Product status types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a product.
///
/// Inactive products stay in storage and keep their reviews; they are only
/// hidden from default catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "store.product_status", rename_all = "snake_case")
)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    /// Returns the opposite status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// Status selection for catalog listings.
///
/// Listing callers choose a single status or all of them; the default
/// everywhere is `One(Active)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSelector {
    /// Only products with the given status.
    One(ProductStatus),
    /// Products regardless of status.
    All,
}

impl Default for StatusSelector {
    fn default() -> Self {
        Self::One(ProductStatus::Active)
    }
}

impl std::str::FromStr for StatusSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            other => other.parse::<ProductStatus>().map(Self::One),
        }
    }
}
