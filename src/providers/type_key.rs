use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime identity of an entity or error type, with an optional parent.
///
/// Rust types carry no inheritance, so the hierarchy used for provider
/// specificity is declared explicitly:
///
/// ```rust
/// use brrtdispatch::providers::TypeKey;
///
/// struct RuntimeError;
/// struct IllegalArgument;
///
/// let runtime = TypeKey::of::<RuntimeError>();
/// let illegal = TypeKey::child_of::<IllegalArgument>(&runtime);
/// assert!(runtime.is_assignable_from(&illegal));
/// assert!(!illegal.is_assignable_from(&runtime));
/// assert_eq!(illegal.depth(), 1);
/// ```
#[derive(Clone)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    parent: Option<Arc<TypeKey>>,
}

impl TypeKey {
    /// A root type with no declared parent
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            parent: None,
        }
    }

    #[must_use]
    pub fn child_of<T: Any + ?Sized>(parent: &TypeKey) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            parent: Some(Arc::new(parent.clone())),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&TypeKey> {
        self.parent.as_deref()
    }

    /// Number of ancestors; a root has depth 0
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// `true` when `other` is this type or one of its descendants.
    #[must_use]
    pub fn is_assignable_from(&self, other: &TypeKey) -> bool {
        other.ancestors().any(|t| t.id == self.id)
    }

    /// This type followed by its parents, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeKey> {
        std::iter::successors(Some(self), |t| t.parent())
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
