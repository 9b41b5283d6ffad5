use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::io::{FileIo, IoOptions};
use crate::json::{RULESET_INDENT, to_string_indented};
use crate::rule::Rule;

/// A titled collection of rules, the shape of a
/// `complex_modifications/*.json` file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleSet {
    pub title: String,
    rules: Vec<Rule>,
    #[serde(skip)]
    io: Option<FileIo>,
}

impl RuleSet {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_json(data: &Value) -> Result<Self> {
        let mut out = Self::default();
        out.load_json(data)?;
        Ok(out)
    }

    pub fn from_file(path: impl AsRef<Path>, options: IoOptions) -> Result<Self> {
        let mut out = Self::default();
        out.set_io(path, options).load()?;
        Ok(out)
    }

    pub fn set_io(&mut self, path: impl AsRef<Path>, options: IoOptions) -> &mut Self {
        self.io = Some(FileIo::new(path, options));
        self
    }

    pub fn io(&self) -> Option<&FileIo> {
        self.io.as_ref()
    }

    /// Appends a rule (or a new rule with the given description) and
    /// returns it for chaining.
    pub fn add(&mut self, rule: impl Into<Rule>) -> &mut Rule {
        let index = self.rules.len();
        self.rules.push(rule.into());
        &mut self.rules[index]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Takes the title and appends the rules of `{title, rules}`.
    pub fn load_json(&mut self, data: &Value) -> Result<&mut Self> {
        let Value::Object(map) = data else {
            return Err(Error::InvalidArgument("rule set must be a JSON object".into()));
        };
        self.title = map
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Some(Value::Array(rules)) = map.get("rules") {
            for rule in rules {
                self.rules.push(Rule::from_json(rule)?);
            }
        }
        Ok(self)
    }

    pub fn load(&mut self) -> Result<&mut Self> {
        let io = self.io.as_ref().ok_or(Error::IoNotSet)?;
        let data: Value = serde_json::from_str(&io.read()?)?;
        self.load_json(&data)
    }

    pub fn save(&mut self) -> Result<&mut Self> {
        let io = self.io.as_ref().ok_or(Error::IoNotSet)?;
        io.write(&self.to_json_string()?)?;
        Ok(self)
    }

    pub fn to_json(&self) -> Value {
        let rules: Vec<Value> = self.rules.iter().map(Rule::to_json).collect();
        json!({
            "title": self.title,
            "rules": rules,
        })
    }

    /// Two-space indented JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(to_string_indented(self, RULESET_INDENT)?)
    }

    /// Prints [`RuleSet::to_json_string`] to stdout.
    pub fn out(&self) -> Result<()> {
        println!("{}", self.to_json_string()?);
        Ok(())
    }
}

impl FromStr for RuleSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(&serde_json::from_str(s)?)
    }
}
