use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::errors::{Result, ViewLoomError};

struct Entry {
    name: Option<String>,
    key: TypeId,
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Ordered, heterogeneous lookup registry
///
/// Values are bound under an explicit service type (which may be a trait
/// object type such as `dyn ReferenceResolver`) and optionally under a
/// name. A by-type query that matches more than one entry in the same
/// scope is ambiguous and fails; a by-name query fails when the named
/// entry was bound under a different service type. Re-binding a name
/// evicts the previous entry for that name entirely, including its
/// by-type visibility.
#[derive(Default)]
pub struct Scope {
    entries: Vec<Entry>,
}

impl Scope {
    /// Create a new empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under its service type
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.entries.push(Entry {
            name: None,
            key: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        });
    }

    /// Bind a value under a name (and its service type)
    ///
    /// A previous binding for the same name is evicted, including its
    /// by-type visibility.
    pub fn bind_named<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        value: Arc<T>,
    ) {
        let name = name.into();
        self.entries.retain(|e| e.name.as_deref() != Some(name.as_str()));
        self.entries.push(Entry {
            name: Some(name),
            key: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        });
    }

    /// Look up the single value bound under service type `T`
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousScopeLookup` if more than one entry in this scope
    /// is bound under `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        let key = TypeId::of::<T>();
        let mut matches = self.entries.iter().filter(|e| e.key == key);

        let first = match matches.next() {
            Some(entry) => entry,
            None => return Ok(None),
        };
        let extra = matches.count();
        if extra > 0 {
            return Err(ViewLoomError::AmbiguousScopeLookup {
                type_name: std::any::type_name::<T>().to_string(),
                count: extra + 1,
            });
        }

        Ok(first
            .value
            .downcast_ref::<Arc<T>>()
            .cloned())
    }

    /// Look up the value bound under `name`, checked against service type `T`
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the named entry is not bound under `T`.
    pub fn get_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<T>>> {
        let entry = match self
            .entries
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
        {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if entry.key != TypeId::of::<T>() {
            return Err(ViewLoomError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                found: entry.type_name.to_string(),
            });
        }

        Ok(entry.value.downcast_ref::<Arc<T>>().cloned())
    }

    /// Check whether the scope holds any entry bound under `T`
    pub fn contains<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        let key = TypeId::of::<T>();
        self.entries.iter().any(|e| e.key == key)
    }

    /// Number of entries in this scope
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the scope is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .entries
            .iter()
            .map(|e| match &e.name {
                Some(name) => format!("{} ({})", name, e.type_name),
                None => e.type_name.to_string(),
            })
            .collect();
        f.debug_struct("Scope").field("entries", &names).finish()
    }
}
