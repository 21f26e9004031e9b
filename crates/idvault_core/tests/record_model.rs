use idvault_core::{
    Attribute, AttributeValue, IdentityRecord, RecordKind, RecordValidationError,
};

#[test]
fn record_new_sets_defaults() {
    let record = IdentityRecord::new(RecordKind::User, "  alice  ", 1_700_000_000_000).unwrap();

    assert_eq!(record.id(), "alice");
    assert_eq!(record.kind(), RecordKind::User);
    assert!(record.enabled);
    assert_eq!(record.created_at, 1_700_000_000_000);
    assert_eq!(record.expires_at, None);
    assert!(record.attribute_rows().is_empty());
    assert!(!record.is_attribute_view_built());
    assert_eq!(record.key(), "user://alice");
}

#[test]
fn record_new_rejects_blank_id() {
    let err = IdentityRecord::new(RecordKind::Role, "   ", 1_000).unwrap_err();
    assert_eq!(err, RecordValidationError::BlankId);
}

#[test]
fn validate_rejects_expiration_before_creation() {
    let mut record = IdentityRecord::new(RecordKind::User, "alice", 2_000).unwrap();
    record.expires_at = Some(1_000);

    let err = record.validate().unwrap_err();
    assert_eq!(
        err,
        RecordValidationError::ExpiresBeforeCreation {
            created_at: 2_000,
            expires_at: 1_000,
        }
    );
}

#[test]
fn expiration_and_active_checks_cover_boundaries() {
    let mut record = IdentityRecord::new(RecordKind::User, "alice", 1_000).unwrap();
    assert!(!record.is_expired_at(i64::MAX));
    assert!(record.is_active_at(1_000));

    record.expires_at = Some(5_000);
    assert!(!record.is_expired_at(4_999));
    assert!(record.is_expired_at(5_000));
    assert!(record.is_expired_at(5_001));
    assert!(record.is_active_at(4_999));
    assert!(!record.is_active_at(5_000));

    record.enabled = false;
    assert!(!record.is_active_at(4_999));
}

#[test]
fn record_delegates_attribute_operations_to_projection() {
    let mut record = IdentityRecord::new(RecordKind::Group, "staff", 1_000).unwrap();

    record.set_attribute("mail", "staff@example.org").unwrap();
    record.set_attribute("roles", vec!["admin", "user"]).unwrap();

    assert_eq!(record.attribute_rows().len(), 3);

    let mail = record.attribute("mail").unwrap();
    assert_eq!(
        mail.value,
        AttributeValue::Single("staff@example.org".to_string())
    );

    let roles = record.attribute("roles").unwrap();
    assert_eq!(roles.value.values(), ["admin", "user"]);

    assert_eq!(record.remove_attribute("roles"), 2);
    let names: Vec<String> = record
        .attributes()
        .into_iter()
        .map(|attribute| attribute.name)
        .collect();
    assert_eq!(names, ["mail"]);

    record.invalidate_attribute_view();
    assert!(!record.is_attribute_view_built());
    assert!(record.attribute("mail").is_some());
}

#[test]
fn record_serialization_uses_expected_wire_fields() {
    let mut record = IdentityRecord::new(RecordKind::User, "alice", 1_700_000_000_000).unwrap();
    record.expires_at = Some(1_700_000_360_000);
    record.set_attribute("roles", vec!["admin", "user"]).unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], "alice");
    assert_eq!(json["kind"], "user");
    assert_eq!(json["enabled"], true);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);
    assert_eq!(json["expires_at"], 1_700_000_360_000_i64);
    assert_eq!(
        json["attribute_rows"],
        serde_json::json!([
            { "name": "roles", "value": "admin" },
            { "name": "roles", "value": "user" }
        ])
    );

    let decoded: IdentityRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn attribute_value_serializes_untagged() {
    let scalar = Attribute::new("mail", "a@example.org");
    let json = serde_json::to_value(&scalar).unwrap();
    assert_eq!(json["value"], "a@example.org");

    let list = Attribute::new("roles", vec!["admin", "user"]);
    let json = serde_json::to_value(&list).unwrap();
    assert_eq!(json["value"], serde_json::json!(["admin", "user"]));

    let decoded: Attribute = serde_json::from_value(json).unwrap();
    assert_eq!(decoded.value, AttributeValue::Many(vec![
        "admin".to_string(),
        "user".to_string(),
    ]));
}
