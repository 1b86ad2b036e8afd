//! Payload validation for create and update.
//!
//! Node properties in Neo4j are flat: a value is a scalar or a homogeneous
//! list of scalars. Anything else is rejected here, before it reaches the
//! store.

use crm_core::types::CUSTOMER_REF;
use crm_core::{Attributes, EntityId, EntityKind, EntityRecord, ValidationError};
use serde_json::Value;

/// A validated partial update.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub attributes: Attributes,
    /// `Some(..)` when the payload mentions `customer_id` on an owned kind:
    /// `Some(None)` unlinks, `Some(Some(id))` re-points the owner edge.
    pub owner: Option<Option<EntityId>>,
}

/// Validate one record of a bulk create.
pub fn parse_record(kind: EntityKind, raw: &Value) -> Result<EntityRecord, ValidationError> {
    let object = as_object(raw)?;

    let id = match object.get("id") {
        None | Some(Value::Null) => return Err(ValidationError::missing("id")),
        Some(value) => EntityId::from_value("id", value)?,
    };

    let mut attributes = Attributes::new();
    for (key, value) in object {
        if key == "id" || value.is_null() {
            continue;
        }
        check_value(key, value)?;
        attributes.insert(key.clone(), value.clone());
    }
    owner_ref(kind, &attributes)?;

    Ok(EntityRecord {
        kind,
        id,
        attributes,
    })
}

/// Validate the body of an update against the id taken from the path.
pub fn parse_partial(
    kind: EntityKind,
    id: EntityId,
    raw: &Value,
) -> Result<PartialUpdate, ValidationError> {
    let object = as_object(raw)?;

    let mut attributes = Attributes::new();
    for (key, value) in object {
        if key == "id" {
            if value.is_null() || EntityId::from_value("id", value)? != id {
                return Err(ValidationError::invalid(
                    "id",
                    format!("body id {value} does not match path id {id}"),
                ));
            }
            continue;
        }
        if !value.is_null() {
            check_value(key, value)?;
        }
        attributes.insert(key.clone(), value.clone());
    }

    let owner = match attributes.get(CUSTOMER_REF) {
        Some(_) if kind.owner_relationship().is_some() => Some(owner_ref(kind, &attributes)?),
        _ => None,
    };

    Ok(PartialUpdate { attributes, owner })
}

/// The customer an owned record points at, if any.
pub fn owner_ref(kind: EntityKind, attributes: &Attributes) -> Result<Option<EntityId>, ValidationError> {
    if kind.owner_relationship().is_none() {
        return Ok(None);
    }
    match attributes.get(CUSTOMER_REF) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => EntityId::from_value(CUSTOMER_REF, value).map(Some),
    }
}

fn as_object(raw: &Value) -> Result<&Attributes, ValidationError> {
    raw.as_object().ok_or_else(|| {
        ValidationError::MalformedPayload(format!("expected a JSON object, got {}", type_name(raw)))
    })
}

fn check_value(field: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Object(_) => Err(ValidationError::invalid(
            field,
            "nested objects cannot be stored as node properties",
        )),
        Value::Array(items) => {
            let mut element_type = None;
            for item in items {
                if matches!(item, Value::Object(_) | Value::Array(_) | Value::Null) {
                    return Err(ValidationError::invalid(
                        field,
                        format!("list elements must be scalars, got {}", type_name(item)),
                    ));
                }
                let current = type_name(item);
                match element_type {
                    None => element_type = Some(current),
                    Some(previous) if previous != current => {
                        return Err(ValidationError::invalid(
                            field,
                            format!("list mixes {previous} and {current} values"),
                        ));
                    }
                    Some(_) => {}
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_requires_id() {
        let err = parse_record(EntityKind::Customer, &json!({"name": "Acme"})).unwrap_err();
        assert_eq!(err, ValidationError::missing("id"));
    }

    #[test]
    fn record_must_be_an_object() {
        let err = parse_record(EntityKind::Customer, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedPayload(_)));
    }

    #[test]
    fn record_strips_id_from_attributes() {
        let record = parse_record(
            EntityKind::Customer,
            &json!({"id": 3, "name": "Acme", "tags": ["a", "b"]}),
        )
        .unwrap();
        assert_eq!(record.id, EntityId(3));
        assert!(record.attributes.get("id").is_none());
        assert_eq!(record.attributes["tags"], json!(["a", "b"]));
    }

    #[test]
    fn nested_objects_are_rejected() {
        let err = parse_record(
            EntityKind::Customer,
            &json!({"id": 1, "address": {"city": "Berlin"}}),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { ref field, .. } if field == "address"));
    }

    #[test]
    fn mixed_lists_are_rejected() {
        let err = parse_record(EntityKind::Customer, &json!({"id": 1, "tags": ["a", 2]})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { .. }));
    }

    #[test]
    fn opportunity_customer_ref_must_be_an_id() {
        let err = parse_record(
            EntityKind::Opportunity,
            &json!({"id": 10, "customer_id": "one"}),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { ref field, .. } if field == "customer_id"));

        let record = parse_record(EntityKind::Opportunity, &json!({"id": 10, "customer_id": 1})).unwrap();
        assert_eq!(owner_ref(record.kind, &record.attributes).unwrap(), Some(EntityId(1)));
    }

    #[test]
    fn customer_ref_on_customer_is_a_plain_attribute() {
        let record = parse_record(EntityKind::Customer, &json!({"id": 1, "customer_id": "legacy"})).unwrap();
        assert_eq!(owner_ref(record.kind, &record.attributes).unwrap(), None);
    }

    #[test]
    fn partial_ignores_matching_id() {
        let update = parse_partial(EntityKind::Customer, EntityId(4), &json!({"id": 4, "phone": "555"})).unwrap();
        assert!(update.attributes.get("id").is_none());
        assert_eq!(update.attributes["phone"], "555");
        assert_eq!(update.owner, None);
    }

    #[test]
    fn partial_rejects_conflicting_id() {
        let err = parse_partial(EntityKind::Customer, EntityId(4), &json!({"id": 5})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { ref field, .. } if field == "id"));
    }

    #[test]
    fn partial_keeps_nulls_for_removal() {
        let update = parse_partial(EntityKind::Customer, EntityId(4), &json!({"phone": null})).unwrap();
        assert_eq!(update.attributes["phone"], Value::Null);
    }

    #[test]
    fn partial_customer_ref_changes_owner() {
        let update = parse_partial(EntityKind::Interaction, EntityId(7), &json!({"customer_id": 2})).unwrap();
        assert_eq!(update.owner, Some(Some(EntityId(2))));

        let update = parse_partial(EntityKind::Interaction, EntityId(7), &json!({"customer_id": null})).unwrap();
        assert_eq!(update.owner, Some(None));

        let update = parse_partial(EntityKind::Interaction, EntityId(7), &json!({"notes": "x"})).unwrap();
        assert_eq!(update.owner, None);
    }
}
