//! Admin mutation protocol.
//!
//! Five append/remove operations, applied by [`apply_mutation`] — one pure
//! function shared by every storage backend, so both adapters persist
//! exactly the same resulting definition. Push is a set-add, pull a
//! set-remove: retrying any operation with the same arguments leaves the
//! final state unchanged.

use serde::{Deserialize, Serialize};

use super::SchemaError;
use crate::models::{SizeField, TagDefinition, TagPayload};

/// Wire format: `{"action": "PUSH_OPTION", "value": "新款袖"}` 等
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagMutation {
    /// Append an option to an attribute tag
    PushOption { value: String },
    /// Remove an option from an attribute tag
    PullOption { value: String },
    /// Append a `{key, placeholder}` measurement to a size tag
    PushField {
        key: String,
        #[serde(default)]
        placeholder: String,
    },
    /// Remove the measurement whose key matches
    PullField { key: String },
    /// Replace a measurement's placeholder; the key itself is immutable
    UpdateField { key: String, placeholder: String },
}

/// Apply one mutation in place.
///
/// On error the definition is left untouched — callers persist only after
/// `Ok`, so no partial mutation ever reaches a store.
pub fn apply_mutation(tag: &mut TagDefinition, mutation: &TagMutation) -> Result<(), SchemaError> {
    if tag.builtin {
        return Err(SchemaError::BuiltinImmutable(tag.id.clone()));
    }

    match (&mut tag.payload, mutation) {
        (TagPayload::Attribute { options, .. }, TagMutation::PushOption { value }) => {
            if options.iter().any(|o| o == value) {
                return Err(SchemaError::OptionExists(value.clone()));
            }
            options.push(value.clone());
        }
        (TagPayload::Attribute { options, .. }, TagMutation::PullOption { value }) => {
            let before = options.len();
            options.retain(|o| o != value);
            if options.len() == before {
                return Err(SchemaError::OptionNotFound(value.clone()));
            }
        }
        (TagPayload::Size { fields }, TagMutation::PushField { key, placeholder }) => {
            if fields.iter().any(|f| f.key == *key) {
                return Err(SchemaError::FieldExists(key.clone()));
            }
            fields.push(SizeField::new(key.clone(), placeholder.clone()));
        }
        (TagPayload::Size { fields }, TagMutation::PullField { key }) => {
            let before = fields.len();
            fields.retain(|f| f.key != *key);
            if fields.len() == before {
                return Err(SchemaError::FieldNotFound(key.clone()));
            }
        }
        (TagPayload::Size { fields }, TagMutation::UpdateField { key, placeholder }) => {
            match fields.iter_mut().find(|f| f.key == *key) {
                Some(field) => field.placeholder = placeholder.clone(),
                None => return Err(SchemaError::FieldNotFound(key.clone())),
            }
        }
        _ => return Err(SchemaError::KindMismatch(tag.id.clone())),
    }
    Ok(())
}
