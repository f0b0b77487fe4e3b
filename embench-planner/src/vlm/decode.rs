//! Decoding of model replies into action indices.
use serde_json::Value;
use thiserror::Error;

/// Reasons a reply cannot be turned into a plan.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The reply is not valid JSON.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required key is missing or has an unexpected type.
    #[error("missing or malformed key: {0}")]
    MissingKey(String),

    /// The plan holds no action.
    #[error("empty plan")]
    EmptyPlan,

    /// No action id of the plan lies in `[0, n_actions)`.
    #[error("no action id in [0, {0})")]
    OutOfRange(usize),
}

/// Extracts action indices from the JSON reply of a model.
///
/// The reply is expected to hold a list under `json_key`, each entry carrying
/// an integer under `action_key`. Single quotes are replaced by double quotes
/// and markdown code fences are removed before parsing.
#[derive(Clone, Debug)]
pub struct ActionDecoder {
    json_key: String,
    action_key: String,
    n_actions: usize,
}

impl ActionDecoder {
    /// Constructs a decoder for a vocabulary of `n_actions` actions.
    pub fn new(json_key: impl Into<String>, action_key: impl Into<String>, n_actions: usize) -> Self {
        Self {
            json_key: json_key.into(),
            action_key: action_key.into(),
            n_actions,
        }
    }

    fn clean(text: &str) -> String {
        text.replace('\'', "\"")
            .replace("```json", "")
            .replace("```", "")
    }

    fn action_id(&self, entry: &Value) -> Result<Option<usize>, DecodeError> {
        let id = entry
            .get(&self.action_key)
            .ok_or_else(|| DecodeError::MissingKey(self.action_key.clone()))?;
        let id = match id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        Ok(id
            .filter(|&id| id >= 0 && (id as u64) < self.n_actions as u64)
            .map(|id| id as usize))
    }

    /// Decodes `text` into action indices within `[0, n_actions)`.
    ///
    /// Ids outside of the vocabulary are dropped; an error is returned when
    /// none remains.
    pub fn decode(&self, text: &str) -> Result<Vec<usize>, DecodeError> {
        let json: Value = serde_json::from_str(&Self::clean(text))?;
        let plan = json
            .get(&self.json_key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| DecodeError::MissingKey(self.json_key.clone()))?;
        if plan.is_empty() {
            return Err(DecodeError::EmptyPlan);
        }

        let mut ids = Vec::with_capacity(plan.len());
        for entry in plan.iter() {
            if let Some(id) = self.action_id(entry)? {
                ids.push(id);
            }
        }

        if ids.is_empty() {
            Err(DecodeError::OutOfRange(self.n_actions))
        } else {
            Ok(ids)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> ActionDecoder {
        ActionDecoder::new("executable_plan", "action_id", 5)
    }

    #[test]
    fn test_decode_valid_plan() {
        let text = r#"{"language_plan": "go", "executable_plan": [{"action_id": 1, "action_name": "Forward"}, {"action_id": 4, "action_name": "Pickup"}]}"#;
        assert_eq!(decoder().decode(text).unwrap(), vec![1, 4]);
    }

    #[test]
    fn test_decode_single_quotes_and_fences() {
        let text = "```json\n{'executable_plan': [{'action_id': 2, 'action_name': 'Turn Left'}]}\n```";
        assert_eq!(decoder().decode(text).unwrap(), vec![2]);
    }

    #[test]
    fn test_out_of_range_ids_are_dropped() {
        let text = r#"{"executable_plan": [{"action_id": 7}, {"action_id": 3}, {"action_id": -1}]}"#;
        assert_eq!(decoder().decode(text).unwrap(), vec![3]);

        let text = r#"{"executable_plan": [{"action_id": 7}, {"action_id": 5}]}"#;
        assert!(matches!(
            decoder().decode(text),
            Err(DecodeError::OutOfRange(5))
        ));
    }

    #[test]
    fn test_decode_failures() {
        let d = decoder();
        assert!(matches!(d.decode("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(d.decode("{}"), Err(DecodeError::MissingKey(_))));
        assert!(matches!(
            d.decode(r#"{"executable_plan": [{"name": "Stop"}]}"#),
            Err(DecodeError::MissingKey(_))
        ));
        assert!(matches!(
            d.decode(r#"{"executable_plan": []}"#),
            Err(DecodeError::EmptyPlan)
        ));
        assert!(matches!(
            d.decode(r#"{"executable_plan": 3}"#),
            Err(DecodeError::MissingKey(_))
        ));
    }

    #[test]
    fn test_string_ids_are_accepted() {
        let text = r#"{"executable_plan": [{"action_id": "3"}]}"#;
        assert_eq!(decoder().decode(text).unwrap(), vec![3]);
    }
}
