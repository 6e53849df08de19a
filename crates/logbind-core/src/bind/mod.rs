//! Value binder
//!
//! Converts external strings into typed property values and assigns them
//! through the compiled setters.

pub mod rules;

use std::sync::Arc;
use std::time::Instant;

use logbind_core_types::schema::EVENT_ASSIGN;
use logbind_core_types::display_value;

use crate::describe::{DescriptorCache, PropertyDescriptor};
use crate::errors::{LogBindError, Result};
use crate::model::{Reflect, Value, ValueKind};
use crate::registry::ConverterRegistry;
use crate::split::{format_quoted, ListSyntax};
use crate::{log_op_end, log_op_error, log_op_start};

pub use rules::{ConversionChain, ConversionContext, ConversionRule, RuleResult};

/// Binds raw configuration strings onto reflected targets
pub struct ValueBinder {
    descriptors: Arc<DescriptorCache>,
    registry: Arc<ConverterRegistry>,
    syntax: ListSyntax,
    chain: ConversionChain,
}

impl ValueBinder {
    pub fn new(descriptors: Arc<DescriptorCache>, syntax: ListSyntax) -> Self {
        let registry = descriptors.registry().clone();
        Self {
            descriptors,
            registry,
            syntax,
            chain: ConversionChain::default(),
        }
    }

    pub fn list_syntax(&self) -> &ListSyntax {
        &self.syntax
    }

    /// Convert `raw` and assign it to `property` on `target`
    ///
    /// The property name is matched case-insensitively; array element names and
    /// `""` (the default parameter) are accepted as aliases.
    ///
    /// # Errors
    ///
    /// * `UnknownProperty` - no bindable property matches `property`
    /// * `ConfigurationBinding` - conversion failed or the setter rejected the value
    pub fn bind(&self, target: &mut dyn Reflect, property: &str, raw: &str) -> Result<()> {
        let descriptor = self.descriptors.describe(&*target);
        let prop = descriptor
            .config_property(property)
            .ok_or_else(|| LogBindError::UnknownProperty {
                type_name: descriptor.type_name().to_string(),
                property: property.to_string(),
            })?;

        let existing = match prop.kind.underlying() {
            ValueKind::Set(_) => prop.getter.and_then(|get| get(&*target).ok()),
            _ => None,
        };

        let value = self
            .convert_with(&prop.kind, raw, existing.as_ref(), prop.array)
            .map_err(|cause| binding_error(descriptor.type_name(), prop, raw, cause))?;

        if value.is_null() && !matches!(prop.kind, ValueKind::Optional(_)) {
            tracing::debug!(
                op = "bind",
                type_name = descriptor.type_name(),
                property = prop.name,
                "blank value leaves property unchanged"
            );
            return Ok(());
        }

        self.assign(target, descriptor.type_name(), prop, raw, value)
    }

    /// Convert without assigning
    ///
    /// # Errors
    ///
    /// Returns the failure cause from the conversion chain.
    pub fn convert(&self, kind: &ValueKind, raw: &str) -> std::result::Result<Value, String> {
        self.convert_with(kind, raw, None, false)
    }

    fn convert_with(
        &self,
        kind: &ValueKind,
        raw: &str,
        existing: Option<&Value>,
        array_parameter: bool,
    ) -> std::result::Result<Value, String> {
        let ctx = ConversionContext {
            registry: &self.registry,
            syntax: &self.syntax,
            existing,
            chain: &self.chain,
        };
        self.chain.convert(kind, raw, &ctx, array_parameter)
    }

    fn assign(
        &self,
        target: &mut dyn Reflect,
        type_name: &str,
        prop: &PropertyDescriptor,
        raw: &str,
        value: Value,
    ) -> Result<()> {
        let Some(setter) = prop.setter else {
            return Err(binding_error(
                type_name,
                prop,
                raw,
                "property is read-only".to_string(),
            ));
        };

        setter(target, value)
            .map_err(|err| binding_error(type_name, prop, raw, err.to_string()))?;

        tracing::debug!(
            op = "bind",
            event = EVENT_ASSIGN,
            type_name = type_name,
            property = prop.name,
            value = %display_value(raw, prop.sensitive),
        );
        Ok(())
    }

    /// Append an element to an array parameter
    ///
    /// Array parameters hold a shared list; configuration loaders add child
    /// objects one at a time under the element name.
    ///
    /// # Errors
    ///
    /// * `UnknownProperty` - no bindable property matches `property`
    /// * `ConfigurationBinding` - the property does not hold a mutable list
    pub fn add_element(&self, target: &dyn Reflect, property: &str, element: Value) -> Result<()> {
        let descriptor = self.descriptors.describe(target);
        let prop = descriptor
            .config_property(property)
            .ok_or_else(|| LogBindError::UnknownProperty {
                type_name: descriptor.type_name().to_string(),
                property: property.to_string(),
            })?;

        let current = prop.getter.and_then(|get| get(target).ok());
        match current {
            Some(Value::List(list)) => {
                list.lock().push(element);
                Ok(())
            }
            _ => Err(binding_error(
                descriptor.type_name(),
                prop,
                &element.to_string(),
                "property is not a mutable collection".to_string(),
            )),
        }
    }

    /// Fail if any required property still has no value
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredParameter` naming the first unset property.
    pub fn validate_required(&self, target: &dyn Reflect) -> Result<()> {
        let descriptor = self.descriptors.describe(target);
        for prop in descriptor.properties().iter().filter(|p| p.required) {
            let Some(getter) = prop.getter else {
                continue;
            };
            let missing = matches!(getter(target), Ok(Value::Null));
            if missing {
                return Err(LogBindError::MissingRequiredParameter {
                    type_name: descriptor.type_name().to_string(),
                    property: prop.name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Bind several properties, then check required ones
    ///
    /// Stops at the first failure.
    ///
    /// # Errors
    ///
    /// Any error from [`bind`](Self::bind) or
    /// [`validate_required`](Self::validate_required).
    pub fn bind_all(&self, target: &mut dyn Reflect, values: &[(&str, &str)]) -> Result<()> {
        let start = Instant::now();
        let type_name = target.type_name().to_string();
        log_op_start!("bind_all", type_name = type_name.as_str(), count = values.len());

        let result = values
            .iter()
            .try_for_each(|(property, raw)| self.bind(target, property, raw))
            .and_then(|_| self.validate_required(&*target));

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => {
                log_op_end!("bind_all", duration_ms = duration_ms);
            }
            Err(err) => {
                log_op_error!(
                    "bind_all",
                    err.clone(),
                    duration_ms = duration_ms,
                    type_name = type_name.as_str()
                );
            }
        }
        result
    }

    /// String form that binds back to an equal value
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Seq(_) | Value::List(_) | Value::Set(_) => {
                let items: Vec<String> = value
                    .snapshot_items()
                    .unwrap_or_default()
                    .iter()
                    .map(|item| self.format_value(item))
                    .collect();
                format_quoted(&items, &self.syntax)
            }
            other => other.to_string(),
        }
    }
}

fn binding_error(
    type_name: &str,
    prop: &PropertyDescriptor,
    raw: &str,
    cause: String,
) -> LogBindError {
    LogBindError::ConfigurationBinding {
        type_name: type_name.to_string(),
        property: prop.name.to_string(),
        value: display_value(raw, prop.sensitive),
        cause,
    }
}
