use j2l::{ExportOptions, LoadOptions, Version};

#[test]
fn defaults_fill_missing_fields() {
    let load: LoadOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(load, LoadOptions::default());
    assert!(load.parallel);
    let export: ExportOptions = serde_json::from_str(r#"{"parallel": false}"#).unwrap();
    assert_eq!(export.version, None);
    assert!(!export.parallel);
}

#[test]
fn export_version_from_config() {
    let export: ExportOptions = serde_json::from_str(r#"{"version": 515}"#).unwrap();
    assert_eq!(export.resolve_version(Version::Base).unwrap(), Version::Extended);
    assert_eq!(
        ExportOptions::default().resolve_version(Version::Extended).unwrap(),
        Version::Extended
    );
    // Unknown versions survive parsing and are rejected at export time
    let export: ExportOptions = serde_json::from_str(r#"{"version": 1}"#).unwrap();
    assert!(export.resolve_version(Version::Base).is_err());
}

#[test]
fn version_as_number() {
    assert_eq!(serde_json::to_string(&Version::Base).unwrap(), "514");
    let version: Version = serde_json::from_str("515").unwrap();
    assert_eq!(version, Version::Extended);
    assert!(serde_json::from_str::<Version>("516").is_err());
}
