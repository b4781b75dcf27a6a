//! Reflection traits for walking object graphs.
//!
//! Queries address values by path (`node.subnode[key].field`), so every type
//! reachable from a queried record implements [`Reflect`]. Scalars, `Option`,
//! `Box`, `Vec`, `HashMap<String, _>` and `BTreeMap<String, _>` are covered
//! here; structs get their implementation from `#[derive(Record)]`.
//!
//! [`Reflect::view`] exposes a value as one of a few shapes (scalar, pointer,
//! list, map, struct) and the resolver dispatches on that. Static type
//! information is described by [`Shape`] and [`StructSchema`], which the
//! query compiler uses to bind paths before any candidate is seen.
//!
//! # Derive Usage
//!
//! ```
//! use gsql::Record;
//!
//! #[derive(Debug, Clone, Default, Record)]
//! struct Task {
//!     name: String,
//!     priority: u8,
//!     tags: Vec<String>,
//!     #[gsql(skip)]
//!     internal_id: u64,
//! }
//!
//! let schema = <Task as Record>::schema();
//! assert_eq!(schema.name, "Task");
//! assert!(schema.field("priority").is_some());
//! assert!(schema.field("internalid").is_none());
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::value::{Kind, Number, Value};

/// A value that can be read and written by path.
pub trait Reflect: Any {
    /// Static shape of this type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Static shape of the concrete type behind `self`.
    fn dyn_shape(&self) -> Shape;

    /// Read access to this value.
    fn view(&self) -> View<'_>;

    /// Write access to this value.
    fn view_mut(&mut self) -> ViewMut<'_>;

    fn as_any(&self) -> &dyn Any;

    /// Replaces `self` with a clone of `src`.
    ///
    /// Returns `false` and leaves `self` untouched when `src` is a different
    /// concrete type.
    fn set_from(&mut self, src: &dyn Reflect) -> bool;
}

/// A struct whose fields are addressable by normalized name.
///
/// Field keys are lower case with underscores removed, see
/// [`crate::path::normalize_name`].
pub trait Struct {
    fn struct_schema(&self) -> &'static StructSchema;
    fn field(&self, key: &str) -> Option<&dyn Reflect>;
    fn field_mut(&mut self, key: &str) -> Option<&mut dyn Reflect>;
}

/// An indexable sequence.
pub trait List {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Grows the list to at least `len` elements, filling with defaults.
    fn grow(&mut self, len: usize);
}

/// A string-keyed map.
pub trait Map {
    /// Keys in a stable order.
    fn keys(&self) -> Vec<&str>;
    fn get(&self, key: &str) -> Option<&dyn Reflect>;

    /// Returns the entry at `key`, inserting a default value when absent.
    fn entry(&mut self, key: &str) -> &mut dyn Reflect;
}

/// An optional value.
pub trait Pointer {
    /// Returns the pointee, allocating a default one when absent.
    fn get_or_default(&mut self) -> &mut dyn Reflect;
}

/// A struct that can be the root type of a query.
///
/// Implemented by `#[derive(Record)]`.
pub trait Record: Reflect + Struct + Default + Clone {
    fn schema() -> &'static StructSchema;
}

/// Read view of a reflected value.
pub enum View<'a> {
    Scalar(Value<'a>),
    Pointer(Option<&'a dyn Reflect>),
    List(&'a dyn List),
    Map(&'a dyn Map),
    Struct(&'a dyn Struct),
}

/// Write view of a reflected value.
pub enum ViewMut<'a> {
    /// Scalars are only written whole, through [`Reflect::set_from`].
    Scalar,
    Pointer(&'a mut dyn Pointer),
    List(&'a mut dyn List),
    Map(&'a mut dyn Map),
    Struct(&'a mut dyn Struct),
}

/// Static shape of a reflected type.
///
/// Element shapes are produced lazily so recursive types can be described.
#[derive(Clone, Copy)]
pub enum Shape {
    Scalar(Kind),
    Pointer(fn() -> Shape),
    List(fn() -> Shape),
    Map(fn() -> Shape),
    Struct(&'static StructSchema),
}

impl Shape {
    /// Strips pointers, lists and maps down to the element shape.
    pub fn element(self) -> Shape {
        match self {
            Shape::Pointer(inner) | Shape::List(inner) | Shape::Map(inner) => inner().element(),
            other => other,
        }
    }

    /// Strips pointers only.
    pub fn pointee(self) -> Shape {
        match self {
            Shape::Pointer(inner) => inner().pointee(),
            other => other,
        }
    }

    /// Returns `true` for lists and maps, looking through pointers.
    pub fn is_collection(self) -> bool {
        matches!(self.pointee(), Shape::List(_) | Shape::Map(_))
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => write!(f, "Scalar({})", kind),
            Shape::Pointer(inner) => write!(f, "Pointer({:?})", inner()),
            Shape::List(inner) => write!(f, "List({:?})", inner()),
            Shape::Map(inner) => write!(f, "Map({:?})", inner()),
            Shape::Struct(schema) => write!(f, "Struct({})", schema.name),
        }
    }
}

/// Static description of a struct type.
#[derive(Debug)]
pub struct StructSchema {
    /// Type name as written in Rust.
    pub name: &'static str,
    pub fields: &'static [FieldSchema],
}

impl StructSchema {
    /// Looks up a field by normalized key.
    pub fn field(&self, key: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Static description of one struct field.
pub struct FieldSchema {
    /// Field name as queried (the Rust name unless renamed).
    pub name: &'static str,
    /// Normalized lookup key.
    pub key: &'static str,
    pub shape: fn() -> Shape,
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish()
    }
}

fn copy_from<T: Clone + 'static>(dst: &mut T, src: &dyn Reflect) -> bool {
    match src.as_any().downcast_ref::<T>() {
        Some(value) => {
            *dst = value.clone();
            true
        }
        None => false,
    }
}

macro_rules! reflect_scalar {
    ($kind:ident, |$v:ident| $view:expr, $($t:ty),*) => {
        $(
            impl Reflect for $t {
                fn shape() -> Shape {
                    Shape::Scalar(Kind::$kind)
                }

                fn dyn_shape(&self) -> Shape {
                    Self::shape()
                }

                fn view(&self) -> View<'_> {
                    let $v = self;
                    View::Scalar($view)
                }

                fn view_mut(&mut self) -> ViewMut<'_> {
                    ViewMut::Scalar
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn set_from(&mut self, src: &dyn Reflect) -> bool {
                    copy_from(self, src)
                }
            }
        )*
    };
}

reflect_scalar!(Int, |v| Value::Number(Number::from(*v)), i8, i16, i32, i64, isize);
reflect_scalar!(Uint, |v| Value::Number(Number::from(*v)), u8, u16, u32, u64, usize);
reflect_scalar!(Float, |v| Value::Number(Number::from(*v)), f32, f64);
reflect_scalar!(Bool, |v| Value::Bool(*v), bool);
reflect_scalar!(String, |v| Value::String(v.as_str()), String);

impl<T: Reflect + Default + Clone> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::Pointer(<T as Reflect>::shape)
    }

    fn dyn_shape(&self) -> Shape {
        Self::shape()
    }

    fn view(&self) -> View<'_> {
        View::Pointer(self.as_ref().map(|v| v as &dyn Reflect))
    }

    fn view_mut(&mut self) -> ViewMut<'_> {
        ViewMut::Pointer(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_from(&mut self, src: &dyn Reflect) -> bool {
        copy_from(self, src)
    }
}

impl<T: Reflect + Default> Pointer for Option<T> {
    fn get_or_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }
}

// Boxes are transparent: they exist to make recursive types sized.
impl<T: Reflect + Clone> Reflect for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn dyn_shape(&self) -> Shape {
        (**self).dyn_shape()
    }

    fn view(&self) -> View<'_> {
        (**self).view()
    }

    fn view_mut(&mut self) -> ViewMut<'_> {
        (**self).view_mut()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_from(&mut self, src: &dyn Reflect) -> bool {
        copy_from(self, src) || (**self).set_from(src)
    }
}

impl<T: Reflect + Default + Clone> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::List(<T as Reflect>::shape)
    }

    fn dyn_shape(&self) -> Shape {
        Self::shape()
    }

    fn view(&self) -> View<'_> {
        View::List(self)
    }

    fn view_mut(&mut self) -> ViewMut<'_> {
        ViewMut::List(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_from(&mut self, src: &dyn Reflect) -> bool {
        copy_from(self, src)
    }
}

impl<T: Reflect + Default> List for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }

    fn grow(&mut self, len: usize) {
        if self.as_slice().len() < len {
            self.resize_with(len, T::default);
        }
    }
}

macro_rules! reflect_map {
    ($map:ident, |$m:ident| $keys:expr) => {
        impl<T: Reflect + Default + Clone> Reflect for $map<String, T> {
            fn shape() -> Shape {
                Shape::Map(<T as Reflect>::shape)
            }

            fn dyn_shape(&self) -> Shape {
                Self::shape()
            }

            fn view(&self) -> View<'_> {
                View::Map(self)
            }

            fn view_mut(&mut self) -> ViewMut<'_> {
                ViewMut::Map(self)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn set_from(&mut self, src: &dyn Reflect) -> bool {
                copy_from(self, src)
            }
        }

        impl<T: Reflect + Default> Map for $map<String, T> {
            fn keys(&self) -> Vec<&str> {
                let $m = self;
                $keys
            }

            fn get(&self, key: &str) -> Option<&dyn Reflect> {
                $map::get(self, key).map(|v| v as &dyn Reflect)
            }

            fn entry(&mut self, key: &str) -> &mut dyn Reflect {
                $map::entry(self, key.to_string()).or_default()
            }
        }
    };
}

reflect_map!(HashMap, |m| {
    let mut keys: Vec<&str> = HashMap::keys(m).map(String::as_str).collect();
    keys.sort_unstable();
    keys
});
reflect_map!(BTreeMap, |m| BTreeMap::keys(m).map(String::as_str).collect());
