use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The struct used for storing a habit on the disk and in exported documents. Completions are
/// kept as the `{"YYYY-MM-DD": true}` object older documents use; [super::Habit] is the typed
/// form the rest of the crate works with.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct HabitEntity {
    #[serde(with = "id_ser")]
    pub id: String,
    pub name: String,
    #[serde(
        default,
        alias = "dates",
        alias = "log",
        deserialize_with = "completions_ser::deserialize"
    )]
    pub completions: BTreeMap<String, bool>,
}

/// Ids have been written both as strings and as plain numbers.
mod id_ser {
    use serde::{self, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn serialize<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        })
    }
}

/// Only `true` marks a day as done. `false`, `null` and anything else count as absent. A value
/// that isn't an object (`null`, `[]`, `"x"`) is the same as an empty map, the habit itself is
/// still kept.
mod completions_ser {
    use std::collections::BTreeMap;

    use serde::{self, Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::debug;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let days = match Value::deserialize(deserializer)? {
            Value::Object(days) => days,
            Value::Null => return Ok(BTreeMap::new()),
            other => {
                debug!("Ignoring completions that aren't an object: {other}");
                return Ok(BTreeMap::new());
            }
        };
        Ok(days
            .into_iter()
            .filter(|(_, value)| *value == Value::Bool(true))
            .map(|(key, _)| (key, true))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use super::HabitEntity;

    #[test]
    fn test_numeric_id_becomes_text() -> Result<()> {
        let entity: HabitEntity =
            serde_json::from_value(json!({ "id": 1712, "name": "Read", "completions": {} }))?;
        assert_eq!(entity.id, "1712");
        Ok(())
    }

    #[test]
    fn test_completion_aliases() -> Result<()> {
        for field in ["completions", "dates", "log"] {
            let entity: HabitEntity = serde_json::from_value(json!({
                "id": "a",
                "name": "Read",
                field: { "2025-03-01": true },
            }))?;
            assert_eq!(entity.completions.len(), 1, "alias {field}");
        }
        Ok(())
    }

    #[test]
    fn test_only_true_values_are_kept() -> Result<()> {
        let entity: HabitEntity = serde_json::from_value(json!({
            "id": "a",
            "name": "Read",
            "completions": {
                "2025-03-01": true,
                "2025-03-02": false,
                "2025-03-03": null,
                "2025-03-04": 1,
            },
        }))?;
        assert_eq!(
            entity.completions.keys().collect::<Vec<_>>(),
            vec!["2025-03-01"]
        );
        Ok(())
    }

    #[test]
    fn test_missing_or_null_completions_are_empty() -> Result<()> {
        let missing: HabitEntity = serde_json::from_value(json!({ "id": "a", "name": "Read" }))?;
        let null: HabitEntity =
            serde_json::from_value(json!({ "id": "a", "name": "Read", "completions": null }))?;
        assert!(missing.completions.is_empty());
        assert!(null.completions.is_empty());
        Ok(())
    }

    #[test]
    fn test_completions_of_wrong_shape_are_empty() -> Result<()> {
        for completions in [json!([]), json!("x"), json!(3), json!(["2025-03-01"])] {
            let entity: HabitEntity = serde_json::from_value(json!({
                "id": "a",
                "name": "Read",
                "log": completions,
            }))?;
            assert_eq!(entity.name, "Read");
            assert!(entity.completions.is_empty(), "{completions}");
        }
        Ok(())
    }

    #[test]
    fn test_serializes_id_as_string_and_canonical_field() -> Result<()> {
        let entity: HabitEntity =
            serde_json::from_value(json!({ "id": 7, "name": "Read", "log": { "2025-03-01": true } }))?;
        assert_eq!(
            serde_json::to_value(&entity)?,
            json!({ "id": "7", "name": "Read", "completions": { "2025-03-01": true } })
        );
        Ok(())
    }
}
