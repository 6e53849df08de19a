use logbind_core::errors::{LbError, LbErrorKind, LogBindError};
use logbind_core::EngineConfig;

#[test]
fn test_binding_error_keeps_full_context() {
    let err = LogBindError::ConfigurationBinding {
        type_name: "FileTarget".to_string(),
        property: "KeepFileOpen".to_string(),
        value: "maybe".to_string(),
        cause: "String 'maybe' was not recognized as a valid Boolean.".to_string(),
    };

    let lb_err: LbError = err.into();

    assert_eq!(lb_err.kind(), LbErrorKind::ConfigurationBinding);
    assert_eq!(lb_err.code(), "ERR_CONFIGURATION_BINDING");
    assert_eq!(lb_err.op(), Some("bind"));
    assert_eq!(lb_err.type_name(), Some("FileTarget"));
    assert_eq!(lb_err.property(), Some("KeepFileOpen"));
    assert_eq!(lb_err.value(), Some("maybe"));
    assert!(lb_err.message().contains("valid Boolean"));
}

#[test]
fn test_unknown_property_distinct_from_missing_required() {
    let unknown: LbError = LogBindError::UnknownProperty {
        type_name: "FileTarget".to_string(),
        property: "MaxSize".to_string(),
    }
    .into();
    let missing: LbError = LogBindError::MissingRequiredParameter {
        type_name: "FileTarget".to_string(),
        property: "FileName".to_string(),
    }
    .into();

    assert_eq!(unknown.kind(), LbErrorKind::UnknownProperty);
    assert_eq!(missing.kind(), LbErrorKind::MissingRequired);
    assert_ne!(unknown.code(), missing.code());
    assert_eq!(missing.op(), Some("validate_required"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (LbErrorKind::ConfigurationBinding, "ERR_CONFIGURATION_BINDING"),
        (LbErrorKind::UnknownProperty, "ERR_UNKNOWN_PROPERTY"),
        (LbErrorKind::MissingRequired, "ERR_MISSING_REQUIRED"),
        (LbErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
    ];

    for (kind, expected) in kinds {
        assert_eq!(kind.code(), expected);
    }
}

#[test]
fn test_display_messages() {
    let err = LogBindError::MissingRequiredParameter {
        type_name: "FileTarget".to_string(),
        property: "FileName".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Required parameter 'FileName' on 'FileTarget' was not specified."
    );

    let lb_err: LbError = err.into();
    let rendered = lb_err.to_string();
    assert!(rendered.starts_with("[ERR_MISSING_REQUIRED]"));
    assert!(rendered.contains("(property: FileName)"));
}

#[test]
fn test_toml_errors_map_to_invalid_config() {
    let err = EngineConfig::from_toml_str("descriptor_cache_capacity = \"lots\"").unwrap_err();
    let lb_err: LbError = err.into();
    assert_eq!(lb_err.kind(), LbErrorKind::InvalidConfig);
}
