//! Canonical schema constants for structured logging and events
//!
//! Every diagnostic emitted by the engine uses these keys so that operators can
//! filter scanner, binder and projector output uniformly.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Subject identifiers
pub const FIELD_TYPE_NAME: &str = "type_name";
pub const FIELD_PROPERTY: &str = "property";
pub const FIELD_VALUE: &str = "value";
pub const FIELD_DEPTH: &str = "depth";

// Collection sizes
pub const FIELD_ROOT_COUNT: &str = "root_count";
pub const FIELD_FOUND_COUNT: &str = "found_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_SCAN_NODE: &str = "scan_node";
pub const EVENT_ASSIGN: &str = "assign";
pub const EVENT_PROPERTY_OMITTED: &str = "property_omitted";
