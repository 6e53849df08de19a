//! Redaction wrapper for secret configuration values
//!
//! Raw attribute strings bound onto properties flagged as sensitive (passwords,
//! connection strings, API keys) pass through `Sensitive<T>` before they reach
//! a log line or an error message.

use std::fmt;

/// Placeholder written in place of a redacted value
pub const REDACTED: &str = "***REDACTED***";

/// Wrapper that hides its contents from `Debug` and `Display`
///
/// # Example
///
/// ```
/// use logbind_core_types::Sensitive;
///
/// let conn = Sensitive::new("Server=db;Password=hunter2");
/// assert_eq!(conn.to_string(), "***REDACTED***");
/// assert_eq!(conn.expose(), &"Server=db;Password=hunter2");
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a secret value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the secret
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Unwrap the secret
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Render `value` for diagnostics, hiding it when `secret` is set
pub fn display_value(value: &str, secret: bool) -> String {
    if secret {
        Sensitive::new(value).to_string()
    } else {
        value.to_string()
    }
}
