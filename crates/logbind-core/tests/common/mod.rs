//! Sample configuration types shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use logbind_core::model::{
    AccessError, Capabilities, Encoding, Layout, ObjectRef, PropertySpec, Reflect, SetComparer,
    SharedList, TypeShape, Value, ValueKind, ValueSet,
};
use logbind_core::{config_enum, field_getter, field_setter, getter, setter, Engine};
use parking_lot::RwLock;

config_enum! {
    pub enum LogLevel {
        Trace = 0,
        Debug = 1,
        Info = 2,
        Warn = 3,
        Error = 4,
        Fatal = 5,
    }
}

/// Create an engine with default configuration
pub fn new_engine() -> Engine {
    Engine::default()
}

pub fn object<T: Reflect>(value: T) -> ObjectRef {
    Arc::new(value)
}

// ---------- targets ----------

pub struct FileTarget {
    pub name: String,
    pub file_name: Option<Layout>,
    pub level: LogLevel,
    pub keywords: ValueSet,
    pub password: String,
    pub keep_file_open: bool,
    pub buffer_size: Option<i64>,
    pub archive_every: Duration,
    pub encoding: Encoding,
    pub layout: Layout,
}

impl FileTarget {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            file_name: None,
            level: LogLevel::Info,
            keywords: ValueSet::new(SetComparer::OrdinalIgnoreCase),
            password: String::new(),
            keep_file_open: false,
            buffer_size: None,
            archive_every: Duration::ZERO,
            encoding: Encoding::Utf8,
            layout: Layout::new("${message}"),
        }
    }
}

const OPTIONAL_INT: ValueKind = ValueKind::Optional(&ValueKind::Int);

pub static FILE_TARGET: TypeShape = TypeShape {
    name: "FileTarget",
    capabilities: Capabilities::TARGET,
    properties: &[
        PropertySpec::new("Name", ValueKind::String)
            .get(field_getter!(FileTarget, name))
            .set(field_setter!(FileTarget, name: String)),
        PropertySpec::new("FileName", ValueKind::Layout)
            .get(field_getter!(FileTarget, file_name))
            .set(setter!(FileTarget, |t, v: Layout| t.file_name = Some(v)))
            .required(),
        PropertySpec::new("Level", LogLevel::KIND)
            .get(field_getter!(FileTarget, level))
            .set(field_setter!(FileTarget, level: LogLevel)),
        PropertySpec::new("Keywords", ValueKind::Set(&ValueKind::String))
            .get(field_getter!(FileTarget, keywords))
            .set(field_setter!(FileTarget, keywords: ValueSet)),
        PropertySpec::new("Password", ValueKind::String)
            .get(field_getter!(FileTarget, password))
            .set(field_setter!(FileTarget, password: String))
            .sensitive(),
        PropertySpec::new("KeepFileOpen", ValueKind::Bool)
            .get(field_getter!(FileTarget, keep_file_open))
            .set(field_setter!(FileTarget, keep_file_open: bool)),
        PropertySpec::new("BufferSize", OPTIONAL_INT)
            .get(field_getter!(FileTarget, buffer_size))
            .set(field_setter!(FileTarget, buffer_size: Option<i64>)),
        PropertySpec::new("ArchiveEvery", ValueKind::TimeSpan)
            .get(field_getter!(FileTarget, archive_every))
            .set(field_setter!(FileTarget, archive_every: Duration)),
        PropertySpec::new("Encoding", ValueKind::Encoding)
            .get(field_getter!(FileTarget, encoding))
            .set(field_setter!(FileTarget, encoding: Encoding)),
        PropertySpec::new("Layout", ValueKind::Layout)
            .get(field_getter!(FileTarget, layout))
            .set(field_setter!(FileTarget, layout: Layout))
            .default_parameter(),
    ],
};

impl Reflect for FileTarget {
    fn shape(&self) -> &'static TypeShape {
        &FILE_TARGET
    }
}

/// Target holding child targets through an array parameter
pub struct SplitGroupTarget {
    pub targets: SharedList,
}

impl SplitGroupTarget {
    pub fn new(children: Vec<ObjectRef>) -> Self {
        let items = children.into_iter().map(Value::Object).collect();
        Self {
            targets: Arc::new(parking_lot::Mutex::new(items)),
        }
    }
}

const TARGET_KIND: ValueKind = ValueKind::Object(Capabilities::TARGET);

pub static SPLIT_GROUP_TARGET: TypeShape = TypeShape {
    name: "SplitGroupTarget",
    capabilities: Capabilities::TARGET,
    properties: &[PropertySpec::new("Targets", ValueKind::List(&TARGET_KIND))
        .get(field_getter!(SplitGroupTarget, targets))
        .array("target")],
};

impl Reflect for SplitGroupTarget {
    fn shape(&self) -> &'static TypeShape {
        &SPLIT_GROUP_TARGET
    }
}

/// Target whose members getter builds a fresh sequence on every read
pub struct TargetPool {
    pub members: Vec<ObjectRef>,
}

pub static TARGET_POOL: TypeShape = TypeShape {
    name: "TargetPool",
    capabilities: Capabilities::TARGET,
    properties: &[PropertySpec::new("Members", ValueKind::List(&TARGET_KIND))
        .get(getter!(TargetPool, |p| p.members.clone()))],
};

impl Reflect for TargetPool {
    fn shape(&self) -> &'static TypeShape {
        &TARGET_POOL
    }
}

/// Wrapper with a single nested target
pub struct AsyncWrapper {
    pub wrapped: Option<ObjectRef>,
}

pub static ASYNC_WRAPPER: TypeShape = TypeShape {
    name: "AsyncWrapper",
    capabilities: Capabilities::TARGET,
    properties: &[PropertySpec::new("WrappedTarget", TARGET_KIND)
        .get(field_getter!(AsyncWrapper, wrapped))],
};

impl Reflect for AsyncWrapper {
    fn shape(&self) -> &'static TypeShape {
        &ASYNC_WRAPPER
    }
}

// ---------- cyclic graphs ----------

/// Filter node whose successor can point back into the chain
pub struct ChainFilter {
    pub name: String,
    pub next: RwLock<Option<ObjectRef>>,
}

impl ChainFilter {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            next: RwLock::new(None),
        })
    }

    pub fn link(&self, next: ObjectRef) {
        *self.next.write() = Some(next);
    }
}

const FILTER_KIND: ValueKind = ValueKind::Object(Capabilities::FILTER);

pub static CHAIN_FILTER: TypeShape = TypeShape {
    name: "ChainFilter",
    capabilities: Capabilities::FILTER,
    properties: &[
        PropertySpec::new("Name", ValueKind::String).get(field_getter!(ChainFilter, name)),
        PropertySpec::new("Next", FILTER_KIND).get(getter!(ChainFilter, |f| f.next.read().clone())),
    ],
};

impl Reflect for ChainFilter {
    fn shape(&self) -> &'static TypeShape {
        &CHAIN_FILTER
    }
}

// ---------- projection fixtures ----------

pub struct AppException {
    pub message: String,
    pub source: String,
}

pub static APP_EXCEPTION: TypeShape = TypeShape {
    name: "System.Exception",
    capabilities: Capabilities::EXCEPTION,
    properties: &[
        PropertySpec::new("Message", ValueKind::String).get(field_getter!(AppException, message)),
        PropertySpec::new("Source", ValueKind::String).get(field_getter!(AppException, source)),
    ],
};

impl Reflect for AppException {
    fn shape(&self) -> &'static TypeShape {
        &APP_EXCEPTION
    }
}

/// Formattable value rendered as a single string
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
}

pub static WALL_CLOCK: TypeShape = TypeShape {
    name: "WallClock",
    capabilities: Capabilities::FORMATTABLE,
    properties: &[PropertySpec::new("Hour", ValueKind::Int)
        .get(getter!(WallClock, |c| c.hour as i64))],
};

impl Reflect for WallClock {
    fn shape(&self) -> &'static TypeShape {
        &WALL_CLOCK
    }

    fn render(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

pub struct Disconnected;

fn disconnected_state(_: &dyn Reflect) -> Result<Value, AccessError> {
    Err(AccessError::failed("connection was closed"))
}

pub static DISCONNECTED: TypeShape = TypeShape {
    name: "Disconnected",
    capabilities: Capabilities::NONE,
    properties: &[PropertySpec::new("State", ValueKind::String).get(disconnected_state)],
};

impl Reflect for Disconnected {
    fn shape(&self) -> &'static TypeShape {
        &DISCONNECTED
    }
}

pub struct Exploding;

fn exploding_value(_: &dyn Reflect) -> Result<Value, AccessError> {
    panic!("getter exploded")
}

pub static EXPLODING: TypeShape = TypeShape {
    name: "Exploding",
    capabilities: Capabilities::NONE,
    properties: &[PropertySpec::new("Value", ValueKind::Int).get(exploding_value)],
};

impl Reflect for Exploding {
    fn shape(&self) -> &'static TypeShape {
        &EXPLODING
    }
}

/// Object whose projection hooks panic
pub struct Haywire;

pub static HAYWIRE: TypeShape = TypeShape {
    name: "Haywire",
    capabilities: Capabilities::NONE,
    properties: &[],
};

impl Reflect for Haywire {
    fn shape(&self) -> &'static TypeShape {
        &HAYWIRE
    }

    fn string_map(&self) -> Option<Vec<(String, Value)>> {
        panic!("string map exploded")
    }
}

/// Formattable value whose rendering panics
pub struct StoppedClock;

pub static STOPPED_CLOCK: TypeShape = TypeShape {
    name: "StoppedClock",
    capabilities: Capabilities::FORMATTABLE,
    properties: &[],
};

impl Reflect for StoppedClock {
    fn shape(&self) -> &'static TypeShape {
        &STOPPED_CLOCK
    }

    fn render(&self) -> String {
        panic!("clock stopped")
    }
}

/// String-keyed dictionary
pub struct PropertyBag {
    pub entries: Vec<(String, Value)>,
}

pub static PROPERTY_BAG: TypeShape = TypeShape {
    name: "PropertyBag",
    capabilities: Capabilities::NONE,
    properties: &[],
};

impl Reflect for PropertyBag {
    fn shape(&self) -> &'static TypeShape {
        &PROPERTY_BAG
    }

    fn string_map(&self) -> Option<Vec<(String, Value)>> {
        Some(self.entries.clone())
    }
}

/// Object whose members are only known at runtime
pub struct DynamicRecord {
    pub fields: RwLock<Vec<(String, Value)>>,
}

pub static DYNAMIC_RECORD: TypeShape = TypeShape {
    name: "DynamicRecord",
    capabilities: Capabilities::NONE,
    properties: &[],
};

impl Reflect for DynamicRecord {
    fn shape(&self) -> &'static TypeShape {
        &DYNAMIC_RECORD
    }

    fn dynamic_members(&self) -> Option<Vec<(String, Value)>> {
        Some(self.fields.read().clone())
    }
}

/// Order with a nested customer, for path lookups
pub struct Customer {
    pub name: String,
}

pub static CUSTOMER: TypeShape = TypeShape {
    name: "Customer",
    capabilities: Capabilities::NONE,
    properties: &[PropertySpec::new("Name", ValueKind::String).get(field_getter!(Customer, name))],
};

impl Reflect for Customer {
    fn shape(&self) -> &'static TypeShape {
        &CUSTOMER
    }
}

pub struct Order {
    pub id: i64,
    pub customer: ObjectRef,
}

const ANY_OBJECT: ValueKind = ValueKind::Object(Capabilities::NONE);

pub static ORDER: TypeShape = TypeShape {
    name: "Order",
    capabilities: Capabilities::NONE,
    properties: &[
        PropertySpec::new("Id", ValueKind::Int).get(field_getter!(Order, id)),
        PropertySpec::new("Customer", ANY_OBJECT).get(field_getter!(Order, customer)),
    ],
};

impl Reflect for Order {
    fn shape(&self) -> &'static TypeShape {
        &ORDER
    }
}
