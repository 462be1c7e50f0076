//! Type descriptors.
//!
//! A [`TypeDescriptor`] is the static shape of a Rust type, optionally bound to
//! a sample value. The walker pattern-matches over [`Shape`] instead of
//! inspecting types at runtime. Nested descriptors are produced on demand so
//! that self-referential types stay finite.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::schema::Schema;
use crate::tags::FieldTags;

/// Types that can describe their own shape.
///
/// `sample` is an instance to take nested samples from (the first element of a
/// sequence, for example). Implementations must return the same shape whether
/// or not a sample is given.
///
/// Usually derived with `#[derive(Describe)]`.
pub trait Describe {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a>;
}

/// Types that supply a hand-written schema instead of an inferred one.
///
/// Hooked into [`Describe`] with `#[oasis(schema_doc)]` on the type.
pub trait SchemaDoc {
    fn schema_doc() -> Schema;
}

/// Name of a user type, used to derive registry keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Full module path, as given by `module_path!()`
    pub module_path: &'static str,
    /// Type identifier, including rendered generic arguments if any
    pub ident: Cow<'static, str>,
}

impl TypeName {
    /// Last segment of the module path
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        self.module_path
            .rsplit("::")
            .next()
            .unwrap_or(self.module_path)
    }

    /// `namespace.Ident`
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace(), self.ident)
    }
}

/// Scalar kinds and their fixed schema mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `integer` / `int32`
    Int32,
    /// `integer` / `int64`
    Int64,
    /// `number`, no format
    Number,
    String,
    Boolean,
}

/// Lazily produced nested descriptor.
pub struct Nested<'a>(Box<dyn Fn() -> TypeDescriptor<'a> + 'a>);

impl<'a> Nested<'a> {
    pub fn new(f: impl Fn() -> TypeDescriptor<'a> + 'a) -> Self {
        Self(Box::new(f))
    }

    /// Descriptor of `T`, bound to `sample` when present
    pub fn of<T: Describe + ?Sized + 'a>(sample: Option<&'a T>) -> Self {
        Self::new(move || T::describe(sample))
    }

    /// Placeholder for a field whose type is never walked
    #[must_use]
    pub fn opaque() -> Self {
        Self::new(|| TypeDescriptor::anonymous(Shape::Opaque))
    }

    #[must_use]
    pub fn get(&self) -> TypeDescriptor<'a> {
        (self.0)()
    }
}

impl fmt::Debug for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nested(..)")
    }
}

/// A struct field as seen by the walker.
#[derive(Debug)]
pub struct FieldDescriptor<'a> {
    /// Serialized property name
    pub name: Cow<'static, str>,
    pub ty: Nested<'a>,
    /// Explicit constraints
    pub tags: FieldTags,
    /// `k=v;k=v` text, applied under the explicit constraints
    pub doc_tag: Option<Cow<'static, str>>,
    /// `required,min=..,max=..` text, applied under the explicit constraints
    pub validate_tag: Option<Cow<'static, str>>,
    /// Merge into the parent through `allOf` instead of a property
    pub inline: bool,
    /// Leave out of the schema
    pub omit: bool,
}

impl<'a> FieldDescriptor<'a> {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: Nested<'a>) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: FieldTags::default(),
            doc_tag: None,
            validate_tag: None,
            inline: false,
            omit: false,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: FieldTags) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_doc_tag(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.doc_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_validate_tag(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.validate_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub const fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    #[must_use]
    pub const fn omitted(mut self) -> Self {
        self.omit = true;
        self
    }

    /// Textual tags parsed and overlaid with the explicit ones
    pub fn resolved_tags(&self) -> Result<FieldTags, crate::error::TagError> {
        let mut tags = FieldTags::default();
        if let Some(doc) = &self.doc_tag {
            tags = tags.overlay(FieldTags::parse_doc(doc)?);
        }
        if let Some(validate) = &self.validate_tag {
            tags = tags.overlay(FieldTags::parse_validate(validate)?);
        }
        Ok(tags.overlay(self.tags.clone()))
    }
}

/// Closed set of shapes the walker understands.
#[derive(Debug)]
pub enum Shape<'a> {
    /// Schema supplied by the type itself
    SelfDescribed(Schema),
    Scalar(ScalarKind),
    Struct(Vec<FieldDescriptor<'a>>),
    /// Homogeneous collection
    Sequence(Nested<'a>),
    /// String-keyed collection; the nested descriptor is the value type
    Map(Nested<'a>),
    /// Pointer or nullable wrapper
    Optional(Nested<'a>),
    /// Anything else; rendered as a bare object
    Opaque,
}

#[derive(Debug)]
pub struct TypeDescriptor<'a> {
    pub name: Option<TypeName>,
    pub shape: Shape<'a>,
}

impl<'a> TypeDescriptor<'a> {
    #[must_use]
    pub const fn anonymous(shape: Shape<'a>) -> Self {
        Self { name: None, shape }
    }

    pub fn named(
        module_path: &'static str,
        ident: impl Into<Cow<'static, str>>,
        shape: Shape<'a>,
    ) -> Self {
        Self {
            name: Some(TypeName {
                module_path,
                ident: ident.into(),
            }),
            shape,
        }
    }

    #[must_use]
    pub const fn scalar(kind: ScalarKind) -> Self {
        Self::anonymous(Shape::Scalar(kind))
    }
}

macro_rules! describe_scalar {
    ($kind:ident => $($ty:ty),+) => {
        $(
            impl Describe for $ty {
                fn describe<'a>(_: Option<&'a Self>) -> TypeDescriptor<'a> {
                    TypeDescriptor::scalar(ScalarKind::$kind)
                }
            }
        )+
    };
}

describe_scalar!(Int32 => i32);
describe_scalar!(Int64 => i8, i16, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_scalar!(Number => f32, f64);
describe_scalar!(String => String, str, char);
describe_scalar!(Boolean => bool);

macro_rules! describe_sequence {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe> Describe for $ty<T> {
                fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
                    let first = sample.and_then(|s| s.iter().next());
                    TypeDescriptor::anonymous(Shape::Sequence(Nested::of::<T>(first)))
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, LinkedList, BTreeSet);

impl<T: Describe> Describe for [T] {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let first = sample.and_then(|s| s.first());
        TypeDescriptor::anonymous(Shape::Sequence(Nested::of::<T>(first)))
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let first = sample.and_then(|s| s.first());
        TypeDescriptor::anonymous(Shape::Sequence(Nested::of::<T>(first)))
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let first = sample.and_then(|s| s.iter().next());
        TypeDescriptor::anonymous(Shape::Sequence(Nested::of::<T>(first)))
    }
}

impl<K, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let first = sample.and_then(|m| m.values().next());
        TypeDescriptor::anonymous(Shape::Map(Nested::of::<V>(first)))
    }
}

impl<K, V: Describe> Describe for BTreeMap<K, V> {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let first = sample.and_then(|m| m.values().next());
        TypeDescriptor::anonymous(Shape::Map(Nested::of::<V>(first)))
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let inner = sample.and_then(Option::as_ref);
        TypeDescriptor::anonymous(Shape::Optional(Nested::of::<T>(inner)))
    }
}

macro_rules! describe_pointer {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty<T> {
                fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
                    let inner = sample.map(|p| &**p);
                    TypeDescriptor::anonymous(Shape::Optional(Nested::of::<T>(inner)))
                }
            }
        )+
    };
}

describe_pointer!(Box, Rc, Arc);

impl<T: Describe + ?Sized> Describe for &T {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let inner = sample.map(|p| &**p);
        TypeDescriptor::anonymous(Shape::Optional(Nested::of::<T>(inner)))
    }
}

impl<T: Describe + ToOwned + ?Sized> Describe for Cow<'_, T> {
    fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
        let inner = sample.map(|c| &**c);
        TypeDescriptor::anonymous(Shape::Optional(Nested::of::<T>(inner)))
    }
}

impl Describe for serde_json::Value {
    fn describe<'a>(_: Option<&'a Self>) -> TypeDescriptor<'a> {
        TypeDescriptor::anonymous(Shape::Opaque)
    }
}
