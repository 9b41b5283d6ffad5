//! Key expressions and the `from`/`to` event objects built from them.
//!
//! | Expression | Meaning |
//! |:-----------|:--------|
//! | `a` | `a` key |
//! | `shift + a` | `a` with `shift` |
//! | `shift + control + a` | `a` with `shift` and `control` |
//! | `shift + (control) + a` | `a` with `shift`, `control` optional |

use std::convert::Infallible;
use std::str::FromStr;

use serde_json::{Map, Value, json};

use crate::json::merge;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub mandatory: Vec<String>,
    pub optional: Vec<String>,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `+`-joined list; `(name)` marks an optional modifier.
    pub fn parse(expr: &str) -> Self {
        Self::from_tokens(expr.split('+'))
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::default();
        for token in tokens {
            out.push_token(token.as_ref());
        }
        out
    }

    /// Takes both lists as given, without parsing parentheses.
    pub fn split<M, O, S, T>(mandatory: M, optional: O) -> Self
    where
        M: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            mandatory: mandatory.into_iter().map(Into::into).collect(),
            optional: optional.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push_token(&mut self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }
        let inner = token
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        match inner {
            Some(name) => self.optional.push(name.to_string()),
            None => self.mandatory.push(token.to_string()),
        }
    }

    /// Appends `other`; duplicates are kept.
    pub fn extend(&mut self, other: Modifiers) {
        self.mandatory.extend(other.mandatory);
        self.optional.extend(other.optional);
    }

    pub fn is_empty(&self) -> bool {
        self.mandatory.is_empty() && self.optional.is_empty()
    }

    /// A bare list when every modifier is mandatory, otherwise an
    /// `{optional, mandatory}` object. `None` when there are none.
    pub fn to_json(&self) -> Option<Value> {
        if self.optional.is_empty() {
            if self.mandatory.is_empty() {
                return None;
            }
            return Some(json!(self.mandatory));
        }
        let mut out = Map::new();
        out.insert("optional".into(), json!(self.optional));
        if !self.mandatory.is_empty() {
            out.insert("mandatory".into(), json!(self.mandatory));
        }
        Some(Value::Object(out))
    }
}

impl From<&str> for Modifiers {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

impl From<String> for Modifiers {
    fn from(expr: String) -> Self {
        Self::parse(&expr)
    }
}

impl From<&[&str]> for Modifiers {
    fn from(tokens: &[&str]) -> Self {
        Self::from_tokens(tokens)
    }
}

impl From<Vec<&str>> for Modifiers {
    fn from(tokens: Vec<&str>) -> Self {
        Self::from_tokens(tokens)
    }
}

impl<const N: usize> From<[&str; N]> for Modifiers {
    fn from(tokens: [&str; N]) -> Self {
        Self::from_tokens(tokens)
    }
}

/// A `key_code` event with its modifiers and any extra schema fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Key {
    pub key_code: String,
    pub modifiers: Modifiers,
    pub extra: Option<Value>,
}

impl Key {
    /// Parses `modifier + ... + key_code`. Never fails: the last `+`
    /// token is the key code, whatever it is.
    pub fn parse(expr: &str) -> Self {
        let mut tokens: Vec<&str> = expr.split('+').collect();
        let key_code = tokens.pop().unwrap_or_default().trim().to_string();
        Self {
            key_code,
            modifiers: Modifiers::from_tokens(tokens),
            extra: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: impl Into<Modifiers>) -> Self {
        self.modifiers.extend(modifiers.into());
        self
    }

    /// Deep-merges extra fields onto the output; arrays are unioned.
    pub fn with_extra(mut self, extra: Value) -> Self {
        match &mut self.extra {
            Some(existing) => merge(existing, extra),
            None => self.extra = Some(extra),
        }
        self
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({ "key_code": self.key_code });
        if let Some(modifiers) = self.modifiers.to_json() {
            out["modifiers"] = modifiers;
        }
        if let Some(extra) = &self.extra {
            merge(&mut out, extra.clone());
        }
        out
    }
}

impl FromStr for Key {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(Self::parse(s))
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        key.to_json()
    }
}

/// One entry of [`keys`]. Its own modifiers and extras, when given,
/// replace the shared ones.
#[derive(Debug, Clone, Default)]
pub struct KeySpec {
    pub code: String,
    pub modifiers: Option<Modifiers>,
    pub extra: Option<Value>,
}

impl From<&str> for KeySpec {
    fn from(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..Self::default()
        }
    }
}

impl From<String> for KeySpec {
    fn from(code: String) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }
}

impl<M: Into<Modifiers>> From<(&str, M)> for KeySpec {
    fn from((code, modifiers): (&str, M)) -> Self {
        Self {
            code: code.to_string(),
            modifiers: Some(modifiers.into()),
            extra: None,
        }
    }
}

impl<M: Into<Modifiers>> From<(&str, M, Value)> for KeySpec {
    fn from((code, modifiers, extra): (&str, M, Value)) -> Self {
        Self {
            code: code.to_string(),
            modifiers: Some(modifiers.into()),
            extra: Some(extra),
        }
    }
}

/// `key("shift + a")` → `{"key_code": "a", "modifiers": ["shift"]}`
pub fn key(code: impl ToString) -> Value {
    Key::parse(&code.to_string()).to_json()
}

/// Like [`key`], with extra modifiers appended and extra fields merged in.
pub fn key_with(code: impl ToString, modifiers: impl Into<Modifiers>, extra: Option<Value>) -> Value {
    let mut key = Key::parse(&code.to_string()).with_modifiers(modifiers);
    if let Some(extra) = extra {
        key = key.with_extra(extra);
    }
    key.to_json()
}

/// Maps [`key_with`] over several codes sharing `modifiers` and `extra`.
pub fn keys<I, K>(codes: I, modifiers: impl Into<Modifiers>, extra: Option<Value>) -> Value
where
    I: IntoIterator<Item = K>,
    K: Into<KeySpec>,
{
    let shared = modifiers.into();
    Value::Array(
        codes
            .into_iter()
            .map(Into::into)
            .map(|spec: KeySpec| {
                let modifiers = spec.modifiers.unwrap_or_else(|| shared.clone());
                let extra = spec.extra.or_else(|| extra.clone());
                key_with(spec.code, modifiers, extra)
            })
            .collect(),
    )
}

/// A `pointing_button` event; `left`, `right` and `middle` alias
/// `button1`..`button3`.
pub fn click(button: &str) -> Value {
    let button = match button {
        "left" => "button1",
        "right" => "button2",
        "middle" => "button3",
        other => other,
    };
    json!({ "pointing_button": button })
}

/// A `set_variable` event for `to`.
pub fn set_var(name: &str, value: impl Into<Value>, extra: Option<Value>) -> Value {
    let value: Value = value.into();
    let mut out = json!({
        "set_variable": {
            "name": name,
            "value": value,
        }
    });
    if let (Value::Object(out), Some(Value::Object(extra))) = (&mut out, extra) {
        out.extend(extra);
    }
    out
}
