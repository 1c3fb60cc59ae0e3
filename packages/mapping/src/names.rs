//! Name pairs and the name-mapping collaborator.

use crate::Error;

/// Which way a rewrite goes.
///
/// The caller (request pipeline) speaks the *external* vocabulary; the
/// backing store speaks the *native* vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Caller vocabulary to backing-store vocabulary (requests).
    ToNative,
    /// Backing-store vocabulary to caller vocabulary (responses).
    ToExternal,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::ToNative => Direction::ToExternal,
            Direction::ToExternal => Direction::ToNative,
        }
    }
}

/// The native and external names of one schema element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameMap {
    native: String,
    external: String,
}

impl NameMap {
    /// Pair two names. Both must be non-empty.
    pub fn new(native: impl Into<String>, external: impl Into<String>) -> Result<Self, Error> {
        let native = native.into();
        let external = external.into();
        if native.is_empty() || external.is_empty() {
            return Err(Error::configuration(format!(
                "empty name in mapping '{}' <-> '{}'",
                native, external
            )));
        }
        Ok(Self { native, external })
    }

    pub fn native(&self) -> &str {
        &self.native
    }

    pub fn external(&self) -> &str {
        &self.external
    }

    /// The name a rewrite in `direction` reads.
    pub fn source(&self, direction: Direction) -> &str {
        match direction {
            Direction::ToNative => &self.external,
            Direction::ToExternal => &self.native,
        }
    }

    /// The name a rewrite in `direction` writes.
    pub fn target(&self, direction: Direction) -> &str {
        self.source(direction.reverse())
    }
}

/// One attribute's name pair, and whether it is the record's primary id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeMap {
    names: NameMap,
    is_primary_id: bool,
}

impl AttributeMap {
    pub fn new(names: NameMap, is_primary_id: bool) -> Self {
        Self {
            names,
            is_primary_id,
        }
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }

    pub fn is_primary_id(&self) -> bool {
        self.is_primary_id
    }
}

/// The kind of schema element being named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind<'a> {
    /// A record type.
    Entity,
    /// An attribute of the record type with the given native name.
    Attribute { entity: &'a str },
}

/// Maps a native name to its external counterpart.
///
/// Returning `None` means the element has no counterpart in the external
/// schema. Implementations must be pure: the same input always yields the
/// same output.
///
/// Any `Fn(ElementKind<'_>, &str) -> Option<String>` is a mapper:
///
/// ```rust
/// use schemashim_mapping::{ElementKind, NameMapper};
///
/// fn upper(_kind: ElementKind<'_>, native: &str) -> Option<String> {
///     Some(native.to_uppercase())
/// }
///
/// assert_eq!(upper.external_name(ElementKind::Entity, "account"), Some("ACCOUNT".to_string()));
/// ```
pub trait NameMapper: Send + Sync {
    fn external_name(&self, kind: ElementKind<'_>, native_name: &str) -> Option<String>;
}

impl<F> NameMapper for F
where
    F: Fn(ElementKind<'_>, &str) -> Option<String> + Send + Sync,
{
    fn external_name(&self, kind: ElementKind<'_>, native_name: &str) -> Option<String> {
        self(kind, native_name)
    }
}

/// Maps every name to itself (a loopback provider).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl NameMapper for IdentityMapper {
    fn external_name(&self, _kind: ElementKind<'_>, native_name: &str) -> Option<String> {
        Some(native_name.to_string())
    }
}
