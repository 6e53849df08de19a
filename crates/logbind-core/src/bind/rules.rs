//! Conversion rules, one per strategy, tried in order

use url::Url;

use crate::model::{
    parse_time_span, ConditionExpression, Culture, Encoding, EnumValue, Layout, LineEndingMode,
    SetComparer, TypedLayout, Value, ValueKind, ValueSet,
};
use crate::registry::ConverterRegistry;
use crate::split::{split_quoted, ListSyntax};

/// Outcome of a single rule: `Ok(None)` means the rule does not apply
pub type RuleResult = Result<Option<Value>, String>;

/// One strategy for turning a raw string into a typed value
pub trait ConversionRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns the failure cause when the rule applies but the input is invalid.
    fn convert(&self, kind: &ValueKind, raw: &str, ctx: &ConversionContext<'_>) -> RuleResult;
}

/// State shared by every rule during one conversion
pub struct ConversionContext<'a> {
    pub registry: &'a ConverterRegistry,
    pub syntax: &'a ListSyntax,
    /// Current property value, when the target already holds one
    pub existing: Option<&'a Value>,
    pub chain: &'a ConversionChain,
}

impl<'a> ConversionContext<'a> {
    /// Context for converting a nested element or inner kind
    pub fn nested(&self) -> ConversionContext<'a> {
        ConversionContext {
            registry: self.registry,
            syntax: self.syntax,
            existing: None,
            chain: self.chain,
        }
    }
}

/// Ordered rule chain
///
/// `specific` rules run first. Array parameters stop after them: they never
/// accept a scalar value.
pub struct ConversionChain {
    specific: Vec<Box<dyn ConversionRule>>,
    general: Vec<Box<dyn ConversionRule>>,
}

impl Default for ConversionChain {
    fn default() -> Self {
        Self {
            specific: vec![
                Box::new(RegistryOverrideRule),
                Box::new(ExactKindRule),
                Box::new(TypedLayoutRule),
            ],
            general: vec![
                Box::new(EnumRule),
                Box::new(ImplicitRule),
                Box::new(FlatCollectionRule),
                Box::new(ExternalConverterRule),
                Box::new(FallbackRule),
            ],
        }
    }
}

impl ConversionChain {
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.specific
            .iter()
            .chain(self.general.iter())
            .map(|rule| rule.name())
            .collect()
    }

    /// Convert `raw` to `kind`
    ///
    /// Optional kinds map empty or whitespace input to [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns the cause reported by the first failing rule.
    pub fn convert(
        &self,
        kind: &ValueKind,
        raw: &str,
        ctx: &ConversionContext<'_>,
        array_parameter: bool,
    ) -> Result<Value, String> {
        let kind = match kind {
            ValueKind::Optional(inner) => {
                if raw.trim().is_empty() {
                    return Ok(Value::Null);
                }
                inner.underlying()
            }
            other => other,
        };

        for rule in &self.specific {
            if let Some(value) = rule.convert(kind, raw, ctx)? {
                return Ok(value);
            }
        }

        if array_parameter {
            return Err(format!(
                "property of type array and not scalar value: '{}'",
                raw
            ));
        }

        for rule in &self.general {
            if let Some(value) = rule.convert(kind, raw, ctx)? {
                return Ok(value);
            }
        }

        Err(cannot_convert(kind))
    }
}

fn cannot_convert(kind: &ValueKind) -> String {
    format!("Object of type 'String' cannot be converted to type '{}'", kind)
}

/// Converters registered by the host, keyed by kind name
pub struct RegistryOverrideRule;

impl ConversionRule for RegistryOverrideRule {
    fn name(&self) -> &'static str {
        "registry_override"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, ctx: &ConversionContext<'_>) -> RuleResult {
        match ctx.registry.converter(kind.name()) {
            Some(converter) => converter(raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Built-in table of engine and primitive kinds
pub struct ExactKindRule;

impl ConversionRule for ExactKindRule {
    fn name(&self) -> &'static str {
        "exact_kind"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, _ctx: &ConversionContext<'_>) -> RuleResult {
        let trimmed = raw.trim();
        let value = match kind {
            ValueKind::String => Value::from(raw),
            ValueKind::Int => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("Input string '{}' was not in a correct format.", raw))?,
            ValueKind::Bool => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Value::Bool(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Value::Bool(false)
                } else {
                    return Err(format!("String '{}' was not recognized as a valid Boolean.", raw));
                }
            }
            ValueKind::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("Input string '{}' was not in a correct format.", raw))?,
            ValueKind::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err("String must be exactly one character long.".to_string()),
                }
            }
            ValueKind::Layout => Value::Layout(Layout::new(raw)),
            ValueKind::Condition => ConditionExpression::parse(raw)
                .map(Value::Condition)
                .map_err(|e| format!("Cannot parse ConditionExpression '{}'. Error: {}", raw, e))?,
            ValueKind::Encoding => Encoding::from_name(trimmed)
                .map(Value::Encoding)
                .ok_or_else(|| format!("'{}' is not a supported encoding name.", trimmed))?,
            ValueKind::Culture => Culture::parse(trimmed).map(Value::Culture)?,
            ValueKind::TimeSpan => parse_time_span(trimmed).map(Value::Duration)?,
            ValueKind::LineEnding => LineEndingMode::from_name(trimmed)
                .map(Value::LineEnding)
                .ok_or_else(|| format!("LineEndingMode '{}' is not supported.", trimmed))?,
            ValueKind::Uri => Url::parse(trimmed)
                .map(Value::Uri)
                .map_err(|e| format!("Invalid URI '{}': {}", trimmed, e))?,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

/// Layout wrapping a typed value; fixed text is converted eagerly
pub struct TypedLayoutRule;

impl ConversionRule for TypedLayoutRule {
    fn name(&self) -> &'static str {
        "typed_layout"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, ctx: &ConversionContext<'_>) -> RuleResult {
        let ValueKind::TypedLayout(inner) = kind else {
            return Ok(None);
        };

        let layout = Layout::new(raw);
        let fixed = if layout.is_fixed() {
            Some(ctx.chain.convert(inner, raw, &ctx.nested(), false)?)
        } else {
            None
        };
        Ok(Some(Value::TypedLayout(TypedLayout::new(
            layout,
            inner.name(),
            fixed,
        ))))
    }
}

/// Case-insensitive member names or numbers; flags enums accept comma unions
///
/// Blank input yields [`Value::Null`] (no value).
pub struct EnumRule;

impl ConversionRule for EnumRule {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, _ctx: &ConversionContext<'_>) -> RuleResult {
        let ValueKind::Enum(spec) = kind else {
            return Ok(None);
        };

        let failed = || format!("Failed parsing Enum {} from value: {}", spec.name, raw);
        let parse_one = |text: &str| -> Option<i64> {
            let text = text.trim();
            spec.member(text).or_else(|| text.parse::<i64>().ok())
        };

        let text = raw.trim();
        if text.is_empty() {
            return Ok(Some(Value::Null));
        }

        let value = if spec.flags {
            let mut union = 0i64;
            for part in text.split(',') {
                union |= parse_one(part).ok_or_else(failed)?;
            }
            union
        } else {
            parse_one(text).ok_or_else(failed)?
        };

        Ok(Some(Value::Enum(EnumValue::new(*spec, value))))
    }
}

/// Implicit construction declared on a custom kind
///
/// Failures are logged and the chain continues.
pub struct ImplicitRule;

impl ConversionRule for ImplicitRule {
    fn name(&self) -> &'static str {
        "implicit"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, _ctx: &ConversionContext<'_>) -> RuleResult {
        if kind.is_simple() {
            return Ok(None);
        }
        let ValueKind::Custom(custom) = kind else {
            return Ok(None);
        };
        let Some(implicit) = custom.implicit else {
            return Ok(None);
        };

        match implicit(raw) {
            Ok(value) => Ok(Some(value)),
            Err(cause) => {
                tracing::warn!(
                    op = "bind",
                    kind = custom.name,
                    error = %cause,
                    "implicit conversion failed"
                );
                Ok(None)
            }
        }
    }
}

/// Lists and sets from a delimited string; elements go back through the chain
pub struct FlatCollectionRule;

impl ConversionRule for FlatCollectionRule {
    fn name(&self) -> &'static str {
        "flat_collection"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, ctx: &ConversionContext<'_>) -> RuleResult {
        let (element_kind, is_set) = match kind {
            ValueKind::List(element) => (*element, false),
            ValueKind::Set(element) => (*element, true),
            _ => return Ok(None),
        };

        let parts = split_quoted(raw, ctx.syntax).map_err(|e| e.to_string())?;
        let element_ctx = ctx.nested();
        let mut values = Vec::with_capacity(parts.len());
        for part in &parts {
            let value = ctx
                .chain
                .convert(element_kind, part, &element_ctx, false)
                .map_err(|cause| {
                    format!("Failed to parse collection with value '{}': {}", raw, cause)
                })?;
            values.push(value);
        }

        if !is_set {
            return Ok(Some(Value::list(values)));
        }

        let comparer = match ctx.existing {
            Some(Value::Set(existing)) => existing.comparer(),
            _ => SetComparer::default(),
        };
        let mut set = ValueSet::new(comparer);
        for value in values {
            set.insert(value);
        }
        Ok(Some(Value::Set(set)))
    }
}

/// String converter declared by a custom kind
pub struct ExternalConverterRule;

impl ConversionRule for ExternalConverterRule {
    fn name(&self) -> &'static str {
        "external_converter"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, _ctx: &ConversionContext<'_>) -> RuleResult {
        let ValueKind::Custom(custom) = kind else {
            return Ok(None);
        };
        let Some(converter) = custom.type_converter else {
            return Ok(None);
        };
        tracing::debug!(
            op = "bind",
            kind = custom.name,
            "using declared type converter"
        );
        converter(raw).map(Some)
    }
}

/// Untyped properties keep the raw string; everything else fails
pub struct FallbackRule;

impl ConversionRule for FallbackRule {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn convert(&self, kind: &ValueKind, raw: &str, _ctx: &ConversionContext<'_>) -> RuleResult {
        match kind {
            ValueKind::Any => Ok(Some(Value::from(raw))),
            other => Err(cannot_convert(other)),
        }
    }
}
