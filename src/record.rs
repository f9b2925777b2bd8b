//! The unit of storage: a `name#tag` identity plus opaque attributes.

use std::fmt;

/// Numeric disambiguator. Unique within one name.
pub type Tag = u16;

/// An immutable account record.
///
/// Only `name` and `tag` are interpreted by the index. The remaining fields
/// are carried along and reported, nothing more.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Record {
    name: String,
    tag: Tag,
    nitro: bool,
    badge: String,
    status: String,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        tag: Tag,
        nitro: bool,
        badge: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tag,
            nitro,
            badge: badge.into(),
            status: status.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    pub fn has_nitro(&self) -> bool {
        self.nitro
    }

    #[inline]
    pub fn badge(&self) -> &str {
        &self.badge
    }

    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account name: {}", self.name)?;
        writeln!(f, "\tDiscriminator: {}", self.tag)?;
        writeln!(f, "\tNitro: {}", self.nitro)?;
        writeln!(f, "\tBadge: {}", self.badge)?;
        write!(f, "\tStatus: {}", self.status)
    }
}
