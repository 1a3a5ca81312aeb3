use std::any::TypeId;
use std::fmt;

/// Stable runtime identity of a model type
///
/// A `TypeToken` pairs the language-level `TypeId` with a simple name
/// supplied at registration time. The name is the stable identifier used by
/// discriminator strategies and diagnostics; it is never derived from
/// `std::any::type_name`, whose output is not guaranteed stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    /// Create the token for `T` under the given stable simple name
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    /// The registered simple name (e.g. `"MockModel"`)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying `TypeId`
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Check whether this token identifies `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
