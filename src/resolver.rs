//! Type descriptor resolution.
//!
//! Rust has no runtime reflection over field types, so the declared type of
//! each field is supplied up front as an explicit token. [`DeclaredTypes`]
//! is the stock table; [`DescribeType`] derives tokens from Rust types.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DeclareError;
use crate::types::{ClassName, PrimitiveKind, TypeDescriptor};

/// Reports the declared type of a field.
pub trait TypeResolver {
    /// # Errors
    ///
    /// Returns `DeclareError::MissingTypeInfo` when no type information is
    /// available for the field.
    fn resolve(&self, class: &str, field: &str) -> Result<TypeDescriptor, DeclareError>;
}

impl<R: TypeResolver + ?Sized> TypeResolver for &R {
    fn resolve(&self, class: &str, field: &str) -> Result<TypeDescriptor, DeclareError> {
        (**self).resolve(class, field)
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Box<R> {
    fn resolve(&self, class: &str, field: &str) -> Result<TypeDescriptor, DeclareError> {
        (**self).resolve(class, field)
    }
}

/// Maps a Rust type to the descriptor a resolver reports for it.
///
/// Sequence types report [`TypeDescriptor::Array`] without their element
/// type, mirroring what a declared-type lookup can actually recover.
pub trait DescribeType {
    fn describe() -> TypeDescriptor;
}

impl TypeDescriptor {
    /// Descriptor for a Rust type.
    pub fn of<T: DescribeType + ?Sized>() -> Self {
        T::describe()
    }
}

macro_rules! describe_as {
    ($descriptor:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl DescribeType for $ty {
                fn describe() -> TypeDescriptor {
                    $descriptor
                }
            }
        )+
    };
}

describe_as!(TypeDescriptor::Primitive(PrimitiveKind::String) => String, str, char);
describe_as!(TypeDescriptor::Primitive(PrimitiveKind::Boolean) => bool);
describe_as!(
    TypeDescriptor::Primitive(PrimitiveKind::Number) =>
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);
describe_as!(TypeDescriptor::Opaque => Value);

macro_rules! describe_generic {
    ($descriptor:expr => $($ty:ident),+ $(,)?) => {
        $(
            impl<T> DescribeType for $ty<T> {
                fn describe() -> TypeDescriptor {
                    $descriptor
                }
            }
        )+
    };
}

describe_generic!(TypeDescriptor::Array => Vec, VecDeque, HashSet, BTreeSet);

impl<T> DescribeType for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Array
    }
}

impl<T, const N: usize> DescribeType for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Array
    }
}

impl<K, V> DescribeType for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Opaque
    }
}

impl<K, V> DescribeType for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Opaque
    }
}

macro_rules! describe_inner {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<T: DescribeType + ?Sized> DescribeType for $ty<T> {
                fn describe() -> TypeDescriptor {
                    T::describe()
                }
            }
        )+
    };
}

describe_inner!(Box, Arc, Rc);

impl<T: DescribeType> DescribeType for Option<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

/// Table of declared field types, keyed by class then field.
#[derive(Debug, Clone, Default)]
pub struct DeclaredTypes {
    classes: HashMap<ClassName, HashMap<String, TypeDescriptor>>,
}

impl DeclaredTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the declared type of `class.field`.
    pub fn declare(
        &mut self,
        class: impl Into<ClassName>,
        field: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> &mut Self {
        self.classes
            .entry(class.into())
            .or_default()
            .insert(field.into(), descriptor);
        self
    }

    /// Record `class.field` as having Rust type `T`.
    pub fn declare_of<T: DescribeType + ?Sized>(
        &mut self,
        class: impl Into<ClassName>,
        field: impl Into<String>,
    ) -> &mut Self {
        self.declare(class, field, T::describe())
    }

    /// Builder form of [`declare`](Self::declare).
    pub fn field(
        mut self,
        class: impl Into<ClassName>,
        field: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> Self {
        self.declare(class, field, descriptor);
        self
    }

    /// Builder form of [`declare_of`](Self::declare_of).
    pub fn field_of<T: DescribeType + ?Sized>(
        self,
        class: impl Into<ClassName>,
        field: impl Into<String>,
    ) -> Self {
        self.field(class, field, T::describe())
    }

    pub fn contains(&self, class: &str, field: &str) -> bool {
        self.classes
            .get(class)
            .map(|fields| fields.contains_key(field))
            .unwrap_or(false)
    }
}

impl TypeResolver for DeclaredTypes {
    fn resolve(&self, class: &str, field: &str) -> Result<TypeDescriptor, DeclareError> {
        self.classes
            .get(class)
            .and_then(|fields| fields.get(field))
            .cloned()
            .ok_or_else(|| DeclareError::MissingTypeInfo {
                class: class.to_string(),
                field: field.to_string(),
            })
    }
}
