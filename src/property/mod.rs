//! Dependency property system: descriptors, registry, typed values, storage.

pub mod core;
pub mod registry;
pub mod store;
pub mod value;

pub use self::core::{object, HorizontalAlignment, VerticalAlignment, Visibility};
pub use registry::{
    ChangedCallback, Coercer, Property, PropertyChangedArgs, PropertyDescriptor, PropertyFlags,
    PropertyId, PropertyMetadata, PropertyRegistry, Validator,
};
pub use store::{PropertyStore, ValueEntry, ValueLevel};
pub use value::{EnumValue, Object, PropertyValue, Value, ValueType};
pub(crate) use value::impl_enum_value;
