//! Engine-level value types produced by the exact-kind conversion table

use std::fmt;
use std::time::Duration;

use super::value::Value;

/// Output template text; rendering is an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    text: String,
}

impl Layout {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Contains no `${...}` renderer and always produces its own text
    pub fn is_fixed(&self) -> bool {
        !self.text.contains("${")
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Layout whose output is converted to a typed value
///
/// When the layout is fixed the conversion happens at bind time and the result
/// is kept in `fixed_value`.
#[derive(Debug, Clone)]
pub struct TypedLayout {
    layout: Layout,
    kind_name: &'static str,
    fixed_value: Option<Box<Value>>,
}

impl TypedLayout {
    pub fn new(layout: Layout, kind_name: &'static str, fixed_value: Option<Value>) -> Self {
        Self {
            layout,
            kind_name,
            fixed_value: fixed_value.map(Box::new),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind_name
    }

    pub fn fixed_value(&self) -> Option<&Value> {
        self.fixed_value.as_deref()
    }
}

/// Filter condition text, syntax-checked on construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionExpression {
    text: String,
}

impl ConditionExpression {
    /// # Errors
    ///
    /// Rejects empty text, unbalanced parentheses and unterminated string literals.
    pub fn parse(text: &str) -> Result<Self, String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err("Condition expression is empty".to_string());
        }

        let mut depth = 0i32;
        let mut in_literal = false;
        for (pos, c) in trimmed.char_indices() {
            match c {
                '\'' => in_literal = !in_literal,
                '(' if !in_literal => depth += 1,
                ')' if !in_literal => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(format!("Unexpected ')' at position {}", pos));
                    }
                }
                _ => {}
            }
        }

        if in_literal {
            return Err("Unterminated string literal".to_string());
        }
        if depth != 0 {
            return Err("Expected ')'".to_string());
        }

        Ok(Self {
            text: trimmed.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Text encodings recognised by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32,
    Ascii,
    Latin1,
    Windows1252,
}

impl Encoding {
    /// Lookup by web name or common alias, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let encoding = match name.as_str() {
            "utf-8" | "utf8" => Encoding::Utf8,
            "utf-16" | "utf-16le" | "unicode" => Encoding::Utf16Le,
            "utf-16be" | "unicodefffe" => Encoding::Utf16Be,
            "utf-32" | "utf-32le" => Encoding::Utf32,
            "us-ascii" | "ascii" => Encoding::Ascii,
            "iso-8859-1" | "latin1" => Encoding::Latin1,
            "windows-1252" => Encoding::Windows1252,
            _ => return None,
        };
        Some(encoding)
    }

    pub fn web_name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16",
            Encoding::Utf16Be => "utf-16BE",
            Encoding::Utf32 => "utf-32",
            Encoding::Ascii => "us-ascii",
            Encoding::Latin1 => "iso-8859-1",
            Encoding::Windows1252 => "windows-1252",
        }
    }
}

/// Culture identified by its tag; the empty tag is the invariant culture
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Culture {
    name: String,
}

impl Culture {
    pub fn invariant() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Rejects tags that are not `language[-region...]` with alphanumeric subtags.
    pub fn parse(text: &str) -> Result<Self, String> {
        let tag = text.trim();
        if tag.is_empty() {
            return Ok(Self::invariant());
        }

        let mut subtags = tag.split('-');
        let language = subtags.next().unwrap_or_default();
        let language_ok =
            (2..=3).contains(&language.len()) && language.chars().all(|c| c.is_ascii_alphabetic());
        let rest_ok = subtags.all(|s| {
            (1..=8).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric())
        });

        if !language_ok || !rest_ok {
            return Err(format!("Culture is not supported. Culture name: '{}'", tag));
        }

        Ok(Self {
            name: tag.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }
}

/// Line terminator written after each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEndingMode {
    #[default]
    Default,
    CrLf,
    Cr,
    Lf,
    None,
}

impl LineEndingMode {
    pub fn from_name(name: &str) -> Option<Self> {
        const MODES: [LineEndingMode; 5] = [
            LineEndingMode::Default,
            LineEndingMode::CrLf,
            LineEndingMode::Cr,
            LineEndingMode::Lf,
            LineEndingMode::None,
        ];
        let name = name.trim();
        MODES
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineEndingMode::Default => "Default",
            LineEndingMode::CrLf => "CRLF",
            LineEndingMode::Cr => "CR",
            LineEndingMode::Lf => "LF",
            LineEndingMode::None => "None",
        }
    }

    pub fn new_line_characters(&self) -> &'static str {
        match self {
            LineEndingMode::Default if cfg!(windows) => "\r\n",
            LineEndingMode::Default => "\n",
            LineEndingMode::CrLf => "\r\n",
            LineEndingMode::Cr => "\r",
            LineEndingMode::Lf => "\n",
            LineEndingMode::None => "",
        }
    }
}

const NANOS_PER_TICK: u32 = 100;
const SECONDS_PER_DAY: u64 = 86_400;

/// Parse `[d.]hh:mm[:ss[.fffffff]]`, or a bare integer number of days
///
/// # Errors
///
/// Returns a message naming the offending text.
pub fn parse_time_span(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let invalid = || format!("String '{}' was not recognized as a valid TimeSpan.", text);

    if text.is_empty() || text.starts_with('-') {
        return Err(invalid());
    }

    if let Ok(days) = text.parse::<u64>() {
        return days
            .checked_mul(SECONDS_PER_DAY)
            .map(Duration::from_secs)
            .ok_or_else(invalid);
    }

    let (days, clock) = match text.split_once('.') {
        Some((d, rest)) if !d.contains(':') => (d.parse::<u64>().map_err(|_| invalid())?, rest),
        _ => (0, text),
    };

    let (clock, fraction) = match clock.rsplit_once('.') {
        Some((c, f)) if c.matches(':').count() == 2 => (c, Some(f)),
        _ => (clock, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }
    let field = |s: &str, max: u64| -> Result<u64, String> {
        match s.parse::<u64>() {
            Ok(v) if v < max && !s.is_empty() => Ok(v),
            _ => Err(invalid()),
        }
    };
    let hours = field(parts[0], 24)?;
    let minutes = field(parts[1], 60)?;
    let seconds = match parts.get(2) {
        Some(s) => field(*s, 60)?,
        None => 0,
    };

    let nanos = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 7 && f.chars().all(|c| c.is_ascii_digit()) => {
            let ticks: u32 = format!("{:0<7}", f).parse().map_err(|_| invalid())?;
            ticks * NANOS_PER_TICK
        }
        Some(_) => return Err(invalid()),
        None => 0,
    };

    let total = days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| secs.checked_add(hours * 3600 + minutes * 60 + seconds))
        .ok_or_else(invalid)?;
    Ok(Duration::new(total, nanos))
}

/// Inverse of [`parse_time_span`], constant format `[d.]hh:mm:ss[.fffffff]`
pub fn format_time_span(value: Duration) -> String {
    let total = value.as_secs();
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let ticks = value.subsec_nanos() / NANOS_PER_TICK;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if ticks > 0 {
        out.push_str(&format!(".{:07}", ticks));
    }
    out
}
