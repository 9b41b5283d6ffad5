use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::{Error, Result};
use crate::json::{arr, clean, is_empty};
use crate::keys::key;
use crate::sanitizer::Sanitizer;

/// Normalizes the shorthand forms accepted by [`Rule::remap`]:
/// string events become key objects, `from.modifiers` becomes
/// `{mandatory, optional}`, and event lists become arrays.
static REMAP_SANITIZER: Lazy<Sanitizer> = Lazy::new(|| {
    Sanitizer::new()
        .add_filter(["from", "to", "to[]"], |event| match event {
            Value::String(expr) => key(expr),
            other => other,
        })
        .and_then(|s| {
            s.add_filter(["from.modifiers"], |mods| match mods {
                Value::Array(_) => json!({ "mandatory": mods }),
                Value::String(name) => json!({ "mandatory": [name] }),
                other => other,
            })
        })
        .and_then(|s| {
            s.add_filter(
                [
                    "from.modifiers.mandatory",
                    "from.modifiers.optional",
                    "to",
                    "to[].modifiers",
                    "to_if_alone",
                    "to_if_held_down",
                    "to_after_key_up",
                    "to_delayed_action.to_if_invoked",
                    "to_delayed_action.to_if_canceled",
                ],
                arr,
            )
        })
        .expect("remap sanitizer paths")
});

/// A complex modification rule: a description and its manipulators.
///
/// Conditions added with [`Rule::cond`] are attached to every manipulator
/// remapped after them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rule {
    pub description: String,
    manipulators: Vec<Value>,
    #[serde(skip)]
    conditions: Vec<Value>,
}

impl Rule {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Builds a rule from `{description, manipulators}` as found in rule-set
    /// and config files. Manipulators are kept as they are.
    pub fn from_json(data: &Value) -> Result<Self> {
        let Value::Object(map) = data else {
            return Err(Error::InvalidArgument("rule must be a JSON object".into()));
        };
        let description = map
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let manipulators = match map.get("manipulators") {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other.clone()],
        };
        Ok(Self {
            description: description.to_string(),
            manipulators,
            conditions: Vec::new(),
        })
    }

    /// Adds a manipulator like `{"from": ..., "to": ...}`.
    ///
    /// `type` defaults to `"basic"`, registered conditions are attached and
    /// shorthand events are normalized. A non-object or empty result is
    /// dropped with a warning.
    pub fn remap(&mut self, map: Value) -> &mut Self {
        let Value::Object(map) = map else {
            warn!(rule = %self.description, "remap: empty argument");
            return self;
        };
        let mut manipulator = Map::new();
        let default_type = map.get("type").is_none_or(is_empty);
        if default_type {
            manipulator.insert("type".into(), json!("basic"));
        }
        manipulator.extend(map.into_iter().filter(|(k, _)| !(default_type && k == "type")));
        if !self.conditions.is_empty() {
            manipulator.insert("conditions".into(), Value::Array(self.conditions.clone()));
        }
        let manipulator = clean(REMAP_SANITIZER.sanitize(Value::Object(manipulator)));
        if is_empty(&manipulator) {
            warn!(rule = %self.description, "remap: empty argument");
        } else {
            self.manipulators.push(manipulator);
        }
        self
    }

    pub fn cond(&mut self, condition: Value) -> &mut Self {
        let condition = clean(condition);
        if is_empty(&condition) {
            warn!(rule = %self.description, "cond: empty argument");
        } else {
            self.conditions.push(condition);
        }
        self
    }

    pub fn manipulators(&self) -> &[Value] {
        &self.manipulators
    }

    pub fn conditions(&self) -> &[Value] {
        &self.conditions
    }

    pub fn to_json(&self) -> Value {
        json!({
            "description": self.description,
            "manipulators": self.manipulators,
        })
    }
}

impl FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(&serde_json::from_str(s)?)
    }
}

impl From<&str> for Rule {
    fn from(description: &str) -> Self {
        Self::new(description)
    }
}

impl From<String> for Rule {
    fn from(description: String) -> Self {
        Self::new(description)
    }
}

impl From<Rule> for Value {
    fn from(rule: Rule) -> Self {
        rule.to_json()
    }
}

impl From<&Rule> for Value {
    fn from(rule: &Rule) -> Self {
        rule.to_json()
    }
}
