//! Wire types shared by the recipe store and the HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a record by the store.
pub type RecordId = i64;

/// Structured attributes persisted for a recipe.
///
/// Both fields are optional and absent fields are omitted from the JSON
/// encoding entirely. `Some(String::new())` and `Some(Vec::new())` are
/// present values and survive a round trip as such.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeAttributes {
    /// Display name of the recipe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered ingredient list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
}

impl RecipeAttributes {
    /// Build attributes with both fields present.
    pub fn new(name: impl Into<String>, ingredients: Vec<String>) -> Self {
        Self {
            name: Some(name.into()),
            ingredients: Some(ingredients),
        }
    }

    /// True when neither field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.ingredients.is_none()
    }
}

/// Persisted recipe as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Store-assigned identifier, immutable after creation.
    pub id: RecordId,
    /// Attributes, rendered under the `recipe` key.
    #[serde(rename = "recipe")]
    pub attributes: RecipeAttributes,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent update.
    pub updated_at: DateTime<Utc>,
}

/// JSON body attached to every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human readable error message.
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RecipeAttributes, Record};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let attrs = RecipeAttributes {
            name: Some("Toast".to_string()),
            ingredients: None,
        };
        let value = serde_json::to_value(&attrs).expect("serialize");
        assert_eq!(value, json!({ "name": "Toast" }));
    }

    #[test]
    fn empty_values_stay_present() {
        let attrs = RecipeAttributes {
            name: Some(String::new()),
            ingredients: Some(Vec::new()),
        };
        let value = serde_json::to_value(&attrs).expect("serialize");
        assert_eq!(value, json!({ "name": "", "ingredients": [] }));
    }

    #[test]
    fn record_uses_camel_case_and_recipe_key() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = Record {
            id: 7,
            attributes: RecipeAttributes::new("Pancakes", vec!["flour".to_string()]),
            created_at: at,
            updated_at: at,
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": 7,
                "recipe": { "name": "Pancakes", "ingredients": ["flour"] },
                "createdAt": "2024-03-01T12:00:00Z",
                "updatedAt": "2024-03-01T12:00:00Z",
            })
        );
    }
}
