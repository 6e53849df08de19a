//! Quote- and escape-aware splitting of flat list values
//!
//! `a,b,'c,d'` splits into `a`, `b` and `c,d`. Inside quotes the escape
//! character makes a following quote (or escape) literal. When the quote and
//! escape characters are the same, a doubled quote is a literal quote.

use std::iter::Peekable;
use std::str::Chars;

use crate::errors::{LogBindError, Result};

/// Delimiters used for flat list binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSyntax {
    pub separator: char,
    pub quote: char,
    pub escape: char,
}

impl Default for ListSyntax {
    fn default() -> Self {
        Self {
            separator: ',',
            quote: '\'',
            escape: '\\',
        }
    }
}

impl ListSyntax {
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the separator collides with the quote or
    /// escape character.
    pub fn validate(&self) -> Result<()> {
        if self.separator == self.quote {
            return Err(LogBindError::InvalidConfig {
                reason: "Quote character should be different from split character".to_string(),
            });
        }
        if self.separator == self.escape {
            return Err(LogBindError::InvalidConfig {
                reason: "Escape character should be different from split character".to_string(),
            });
        }
        Ok(())
    }

    fn doubled_quotes(&self) -> bool {
        self.quote == self.escape
    }
}

#[derive(Default)]
struct SplitState {
    items: Vec<String>,
    item: String,
    quoted: bool,
    closed: bool,
    pending_escape: bool,
}

impl SplitState {
    fn finish_item(&mut self) {
        self.items.push(std::mem::take(&mut self.item));
        self.closed = false;
    }
}

/// Split `text` into list elements
///
/// Empty text yields no elements. An unterminated quote is kept literally.
///
/// # Errors
///
/// Returns `InvalidConfig` for an invalid [`ListSyntax`].
///
/// # Example
///
/// ```
/// use logbind_core::split::{split_quoted, ListSyntax};
///
/// let parts = split_quoted("a,b,'c,d'", &ListSyntax::default()).unwrap();
/// assert_eq!(parts, vec!["a", "b", "c,d"]);
/// ```
pub fn split_quoted(text: &str, syntax: &ListSyntax) -> Result<Vec<String>> {
    syntax.validate()?;
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut state = SplitState::default();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if state.pending_escape {
            state.pending_escape = false;
            if c == syntax.quote || c == syntax.escape || c == syntax.separator {
                state.item.push(c);
                continue;
            }
            state.item.push(syntax.escape);
        }

        if c == syntax.quote {
            on_quote(&mut state, &mut chars, syntax);
        } else if c == syntax.escape {
            state.pending_escape = true;
        } else if c == syntax.separator && !state.quoted {
            state.finish_item();
        } else {
            state.item.push(c);
        }
    }

    if state.pending_escape {
        state.item.push(syntax.escape);
    }
    if state.quoted {
        state.item.insert(0, syntax.quote);
    }
    state.finish_item();

    Ok(state.items)
}

fn on_quote(state: &mut SplitState, chars: &mut Peekable<Chars<'_>>, syntax: &ListSyntax) {
    if state.quoted {
        if syntax.doubled_quotes() && chars.peek() == Some(&syntax.quote) {
            chars.next();
            state.item.push(syntax.quote);
        } else {
            state.quoted = false;
            state.closed = true;
        }
    } else if state.item.is_empty() && !state.closed {
        state.quoted = true;
    } else {
        state.item.push(syntax.quote);
    }
}

/// Join elements so that [`split_quoted`] returns them unchanged
pub fn format_quoted<S: AsRef<str>>(items: &[S], syntax: &ListSyntax) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(syntax.separator);
        }
        let item = item.as_ref();
        let needs_quotes = item.is_empty()
            || item
                .chars()
                .any(|c| c == syntax.separator || c == syntax.quote || c == syntax.escape);
        if !needs_quotes {
            out.push_str(item);
            continue;
        }

        out.push(syntax.quote);
        for c in item.chars() {
            if c == syntax.quote || c == syntax.escape {
                out.push(syntax.escape);
            }
            out.push(c);
        }
        out.push(syntax.quote);
    }
    out
}
