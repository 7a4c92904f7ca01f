//! Dynamically typed property values.
//!
//! [`Value`] is the tagged union stored in every property store. The
//! [`PropertyValue`] trait maps concrete Rust types onto it so that typed
//! handles ([`Property<T>`](super::Property)) can read and write without the
//! caller ever touching the union.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::geometry::{Color, Matrix3x2, Point, Rect, Size, Thickness};
use crate::tree::ElementId;

/// Opaque user data, used for data contexts and other object-valued properties.
pub type Object = Arc<dyn Any + Send + Sync>;

// ---------------------------------------------------------------------------
// ValueType
// ---------------------------------------------------------------------------

/// Type tag carried by every property descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    String,
    /// A fieldless enum identified by its type name.
    Enum(&'static str),
    Point,
    Size,
    Rect,
    Thickness,
    Color,
    /// An optional affine transform.
    Transform,
    /// An optional element reference.
    Element,
    /// Optional opaque user data.
    Object,
    /// The type of [`Value::Null`].
    Null,
}

impl ValueType {
    /// Whether [`Value::Null`] is a legal value for this type.
    pub fn is_nullable(self) -> bool {
        matches!(self, ValueType::Transform | ValueType::Element | ValueType::Object)
    }

    /// Whether a value tagged `found` may be stored under this type.
    pub fn accepts(self, found: ValueType) -> bool {
        self == found || (found == ValueType::Null && self.is_nullable())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Enum(name) => write!(f, "Enum({name})"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Ordinal of a fieldless enum plus its type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub type_name: &'static str,
    pub ordinal: u32,
}

/// A property value.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f32),
    String(String),
    Enum(EnumValue),
    Point(Point),
    Size(Size),
    Rect(Rect),
    Thickness(Thickness),
    Color(Color),
    Transform(Matrix3x2),
    Element(ElementId),
    Object(Object),
    Null,
}

impl Value {
    /// The type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Enum(e) => ValueType::Enum(e.type_name),
            Value::Point(_) => ValueType::Point,
            Value::Size(_) => ValueType::Size,
            Value::Rect(_) => ValueType::Rect,
            Value::Thickness(_) => ValueType::Thickness,
            Value::Color(_) => ValueType::Color,
            Value::Transform(_) => ValueType::Transform,
            Value::Element(_) => ValueType::Element,
            Value::Object(_) => ValueType::Object,
            Value::Null => ValueType::Null,
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Float payload, if any.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Object payload, if any.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Downcast an object payload to a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(|o| o.downcast_ref::<T>())
    }
}

/// Equality used for change detection: NaN equals NaN and objects compare by
/// identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Point(a), Value::Point(b)) => a == b,
            (Value::Size(a), Value::Size(b)) => a == b,
            (Value::Rect(a), Value::Rect(b)) => a == b,
            (Value::Thickness(a), Value::Thickness(b)) => a == b,
            (Value::Color(a), Value::Color(b)) => a == b,
            (Value::Transform(a), Value::Transform(b)) => a == b,
            (Value::Element(a), Value::Element(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::String(v) => write!(f, "String({v:?})"),
            Value::Enum(e) => write!(f, "Enum({}#{})", e.type_name, e.ordinal),
            Value::Point(p) => write!(f, "Point({}, {})", p.x, p.y),
            Value::Size(s) => write!(f, "Size({}, {})", s.width, s.height),
            Value::Rect(r) => write!(f, "Rect({}, {}, {}, {})", r.x, r.y, r.width, r.height),
            Value::Thickness(t) => write!(f, "Thickness({t:?})"),
            Value::Color(c) => write!(f, "Color({c:?})"),
            Value::Transform(m) => write!(f, "Transform({m:?})"),
            Value::Element(id) => write!(f, "Element({id:?})"),
            Value::Object(o) => write!(f, "Object({:p})", Arc::as_ptr(o)),
            Value::Null => write!(f, "Null"),
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyValue
// ---------------------------------------------------------------------------

/// Conversion between a Rust type and [`Value`].
///
/// `Default` supplies the value returned by infallible reads on stale
/// elements.
pub trait PropertyValue: Clone + Default + 'static {
    /// The descriptor type tag for this Rust type.
    fn value_type() -> ValueType;
    /// Wrap into the union.
    fn into_value(self) -> Value;
    /// Unwrap from the union; `None` on a tag mismatch.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_plain_value {
    ($ty:ty, $variant:ident) => {
        impl PropertyValue for $ty {
            fn value_type() -> ValueType {
                ValueType::$variant
            }
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_plain_value!(bool, Bool);
impl_plain_value!(i64, Int);
impl_plain_value!(f32, Float);
impl_plain_value!(String, String);
impl_plain_value!(Point, Point);
impl_plain_value!(Size, Size);
impl_plain_value!(Rect, Rect);
impl_plain_value!(Thickness, Thickness);
impl_plain_value!(Color, Color);

impl PropertyValue for i32 {
    fn value_type() -> ValueType {
        ValueType::Int
    }
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

macro_rules! impl_nullable_value {
    ($ty:ty, $variant:ident) => {
        impl PropertyValue for Option<$ty> {
            fn value_type() -> ValueType {
                ValueType::$variant
            }
            fn into_value(self) -> Value {
                match self {
                    Some(v) => Value::$variant(v),
                    None => Value::Null,
                }
            }
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(Some(v.clone())),
                    Value::Null => Some(None),
                    _ => None,
                }
            }
        }
    };
}

impl_nullable_value!(Matrix3x2, Transform);
impl_nullable_value!(ElementId, Element);
impl_nullable_value!(Object, Object);

/// Implement [`PropertyValue`] for a fieldless enum.
///
/// Variants must be listed in declaration order.
macro_rules! impl_enum_value {
    ($ty:ty, $name:literal, [$($variant:ident),+ $(,)?]) => {
        impl $crate::property::PropertyValue for $ty {
            fn value_type() -> $crate::property::ValueType {
                $crate::property::ValueType::Enum($name)
            }
            fn into_value(self) -> $crate::property::Value {
                $crate::property::Value::Enum($crate::property::EnumValue {
                    type_name: $name,
                    ordinal: self as u32,
                })
            }
            fn from_value(value: &$crate::property::Value) -> Option<Self> {
                const VARIANTS: &[$ty] = &[$(<$ty>::$variant),+];
                match value {
                    $crate::property::Value::Enum(e) if e.type_name == $name => {
                        VARIANTS.get(e.ordinal as usize).copied()
                    }
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use impl_enum_value;

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Fruit {
        #[default]
        Apple,
        Pear,
    }
    impl_enum_value!(Fruit, "Fruit", [Apple, Pear]);

    #[test]
    fn nan_equals_nan_for_change_detection() {
        assert_eq!(Value::Float(f32::NAN), Value::Float(f32::NAN));
        assert_ne!(Value::Float(1.0), Value::Float(2.0));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a: Object = Arc::new(5_u32);
        let b: Object = Arc::new(5_u32);
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn enum_value_round_trips_through_union() {
        let v = Fruit::Pear.into_value();
        assert_eq!(v.value_type(), ValueType::Enum("Fruit"));
        assert_eq!(Fruit::from_value(&v), Some(Fruit::Pear));
        assert_eq!(Fruit::from_value(&Value::Bool(true)), None);
    }

    #[test]
    fn nullable_types_accept_null() {
        assert!(ValueType::Object.accepts(ValueType::Null));
        assert!(ValueType::Element.accepts(ValueType::Null));
        assert!(!ValueType::Float.accepts(ValueType::Null));
        assert_eq!(<Option<Matrix3x2>>::from_value(&Value::Null), Some(None));
    }

    #[test]
    fn i32_rejects_out_of_range_int() {
        assert_eq!(i32::from_value(&Value::Int(i64::MAX)), None);
        assert_eq!(i32::from_value(&Value::Int(7)), Some(7));
    }

    #[test]
    fn downcast_object_payload() {
        let v = Value::Object(Arc::new(String::from("ctx")));
        assert_eq!(v.downcast_ref::<String>().map(String::as_str), Some("ctx"));
        assert!(v.downcast_ref::<u8>().is_none());
    }
}
