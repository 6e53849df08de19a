//! Canonical logging macros
//!
//! Operation boundaries (`find_reachable`, `bind_all`, ...) are logged at info
//! with a fixed field layout.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use logbind_core::log_op_start;
/// log_op_start!("find_reachable");
/// log_op_start!("bind_all", type_name = "FileTarget");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use logbind_core::log_op_end;
/// log_op_end!("find_reachable", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// The error is converted into the canonical [`LbError`](crate::errors::LbError)
/// so the kind and code are always present.
///
/// # Example
///
/// ```
/// # use logbind_core::{log_op_error, errors::LogBindError};
/// let err = LogBindError::UnknownProperty {
///     type_name: "FileTarget".to_string(),
///     property: "Bogus".to_string(),
/// };
/// log_op_error!("bind_all", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let lb_err: $crate::errors::LbError = ($err).into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?lb_err.kind(),
            err_code = lb_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let lb_err: $crate::errors::LbError = ($err).into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?lb_err.kind(),
            err_code = lb_err.code(),
            $($field)*
        );
    }};
}
