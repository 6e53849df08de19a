pub mod reflect;
pub mod shape;
pub mod types;
pub mod value;

pub use reflect::{
    downcast_target, downcast_target_mut, object_id, type_key, AccessError, AsAny, FromValue,
    Getter, ObjectRef, Reflect, Setter,
};
pub use shape::{Capabilities, CustomKind, EnumSpec, PropertySpec, TypeShape, ValueKind};
pub use types::{
    format_time_span, parse_time_span, ConditionExpression, Culture, Encoding, Layout,
    LineEndingMode, TypedLayout,
};
pub use value::{CustomValue, EnumValue, SetComparer, SharedList, Value, ValueSet};
