//! Binding key types for the dependency injection container.

use std::any::TypeId;

/// Identity of a requested capability: a concrete type or a trait object.
///
/// A `Key` names *what* is being injected; it deliberately carries no
/// qualifier. Disambiguation between several bindings of the same key is done
/// with a separate qualifier tag at registration and resolution time, so one
/// key can own a whole candidate set.
///
/// # Examples
///
/// ```rust
/// use vessel_di::{key_of_type, key_of_trait, Key};
///
/// trait Codec: Send + Sync {}
///
/// let concrete = key_of_type::<String>();
/// let abstract_ = key_of_trait::<dyn Codec>();
/// assert_ne!(concrete.display_name(), abstract_.display_name());
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Trait object key, identified by trait name
    ///
    /// Trait objects are keyed by `std::any::type_name` of the trait since
    /// the erased instance is stored behind a second `Arc` layer.
    Trait(&'static str),
}

impl Key {
    /// Type or trait name for display in errors and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }
}

// TypeId-only comparison for concrete types; the name is diagnostics only.
impl PartialEq for Key {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

/// Key for a concrete type.
#[inline]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for a trait object.
#[inline]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}

/// Renders a `(key, qualifier)` request the way errors report it.
pub(crate) fn render_request(name: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) => format!("{} @\"{}\"", name, q),
        None => name.to_string(),
    }
}
