use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::dig::{DigOptions, dig};
use crate::error::{Error, Result};
use crate::io::{FileIo, IoOptions};
use crate::json::{CONFIG_INDENT, to_string_indented};
use crate::paths;
use crate::rule::Rule;

const RULES_PATH: &str = "complex_modifications.rules";

/// Picks a profile by position, exact name, or a regex over the name.
#[derive(Debug, Clone)]
pub enum ProfileSelector {
    Index(usize),
    Name(String),
    Pattern(Regex),
}

impl ProfileSelector {
    /// `/re/` is a pattern, an integer is an index, anything else a name.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() >= 2
            && let Some(pattern) = s.strip_prefix('/').and_then(|r| r.strip_suffix('/'))
        {
            return Regex::new(pattern)
                .map(ProfileSelector::Pattern)
                .map_err(|e| Error::InvalidArgument(e.to_string()));
        }
        if let Ok(index) = s.parse::<usize>() {
            return Ok(ProfileSelector::Index(index));
        }
        Ok(ProfileSelector::Name(s.to_string()))
    }

    fn matches(&self, index: usize, profile: &Value) -> bool {
        let name = profile.get("name").and_then(Value::as_str);
        match self {
            ProfileSelector::Index(i) => *i == index,
            ProfileSelector::Name(n) => name == Some(n.as_str()),
            ProfileSelector::Pattern(re) => name.is_some_and(|name| re.is_match(name)),
        }
    }
}

impl fmt::Display for ProfileSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSelector::Index(i) => write!(f, "index {i}"),
            ProfileSelector::Name(n) => write!(f, "name {n:?}"),
            ProfileSelector::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<usize> for ProfileSelector {
    fn from(index: usize) -> Self {
        ProfileSelector::Index(index)
    }
}

impl From<&str> for ProfileSelector {
    fn from(name: &str) -> Self {
        ProfileSelector::Name(name.to_string())
    }
}

impl From<String> for ProfileSelector {
    fn from(name: String) -> Self {
        ProfileSelector::Name(name)
    }
}

impl From<Regex> for ProfileSelector {
    fn from(pattern: Regex) -> Self {
        ProfileSelector::Pattern(pattern)
    }
}

/// The root `karabiner.json` document.
///
/// Exactly one entry of `profiles` is expected to carry `"selected": true`;
/// [`Config::select_profile`] keeps it that way.
#[derive(Debug, Clone, Default)]
pub struct Config {
    data: Value,
    io: Option<FileIo>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(data: Value) -> Self {
        Self { data, io: None }
    }

    pub fn from_file(path: impl AsRef<Path>, options: IoOptions) -> Result<Self> {
        let mut out = Self::default();
        out.set_io(Some(path.as_ref()), options)?.load()?;
        Ok(out)
    }

    /// Uses `~/.config/karabiner/karabiner.json` when `path` is `None`.
    pub fn set_io(&mut self, path: Option<&Path>, options: IoOptions) -> Result<&mut Self> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => paths::config_file().ok_or(Error::NoHomeDir)?,
        };
        self.io = Some(FileIo::new(path, options));
        Ok(self)
    }

    pub fn io(&self) -> Option<&FileIo> {
        self.io.as_ref()
    }

    pub fn to_json(&self) -> &Value {
        &self.data
    }

    pub fn to_json_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    /// Four-space indented JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(to_string_indented(&self.data, CONFIG_INDENT)?)
    }

    pub fn out(&self) -> Result<()> {
        println!("{}", self.to_json_string()?);
        Ok(())
    }

    pub fn load_json(&mut self, data: Value) -> &mut Self {
        self.data = data;
        self
    }

    pub fn load(&mut self) -> Result<&mut Self> {
        let io = self.io.as_ref().ok_or(Error::IoNotSet)?;
        let data = serde_json::from_str(&io.read()?)?;
        Ok(self.load_json(data))
    }

    /// Fails with [`Error::NotLoaded`] rather than writing `null` over the file.
    pub fn save(&mut self) -> Result<&mut Self> {
        let io = self.io.as_ref().ok_or(Error::IoNotSet)?;
        if self.data.is_null() {
            return Err(Error::NotLoaded);
        }
        io.write(&self.to_json_string()?)?;
        Ok(self)
    }

    /// Writes the current data to `<file>.bak`, replacing an older one.
    pub fn backup(&self) -> Result<PathBuf> {
        let io = self.io.as_ref().ok_or(Error::IoNotSet)?;
        if self.data.is_null() {
            return Err(Error::NotLoaded);
        }
        let dest = io.backup_path();
        let options = IoOptions {
            backup: false,
            ..io.options().clone()
        };
        FileIo::new(&dest, options).write(&self.to_json_string()?)?;
        Ok(dest)
    }

    /// Replaces the data with the contents of `<file>.bak`.
    pub fn load_backup(&mut self) -> Result<&mut Self> {
        let io = self.io.as_ref().ok_or(Error::IoNotSet)?;
        let text = fs::read_to_string(io.backup_path())?;
        let data = serde_json::from_str(&text)?;
        Ok(self.load_json(data))
    }

    pub fn delete_backup(&self) -> Result<()> {
        let io = self.io.as_ref().ok_or(Error::IoNotSet)?;
        fs::remove_file(io.backup_path())?;
        Ok(())
    }

    pub fn profiles(&self) -> &[Value] {
        match self.data.get("profiles") {
            Some(Value::Array(profiles)) => profiles.as_slice(),
            _ => &[],
        }
    }

    fn profiles_mut(&mut self) -> Result<&mut Vec<Value>> {
        match self.data.get_mut("profiles") {
            Some(Value::Array(profiles)) if !profiles.is_empty() => Ok(profiles),
            _ => Err(Error::NoProfiles),
        }
    }

    /// Read accessors never load; an unloaded config reports
    /// [`Error::NotLoaded`]. Call [`Config::ensure_loaded`] first.
    pub fn current_index(&self) -> Result<usize> {
        if self.data.is_null() {
            return Err(Error::NotLoaded);
        }
        let profiles = self.profiles();
        if profiles.is_empty() {
            return Err(Error::NoProfiles);
        }
        profiles
            .iter()
            .position(is_selected)
            .ok_or(Error::NoActiveProfile)
    }

    pub fn current_profile(&self) -> Result<&Value> {
        let index = self.current_index()?;
        Ok(&self.profiles()[index])
    }

    pub fn current_profile_mut(&mut self) -> Result<&mut Value> {
        self.ensure_loaded()?;
        let index = self.current_index()?;
        Ok(&mut self.profiles_mut()?[index])
    }

    /// Deselects the current profile and selects the one matching `selector`.
    pub fn select_profile(&mut self, selector: impl Into<ProfileSelector>) -> Result<&mut Self> {
        let selector = selector.into();
        self.ensure_loaded()?;
        let current = self.current_index()?;
        let profiles = self.profiles_mut()?;
        let target = match &selector {
            ProfileSelector::Index(index) if *index >= profiles.len() => {
                return Err(Error::IndexOutOfBounds {
                    index: *index,
                    len: profiles.len(),
                });
            }
            _ => profiles
                .iter()
                .enumerate()
                .position(|(i, p)| selector.matches(i, p))
                .ok_or_else(|| Error::NoMatchingProfile {
                    selector: selector.to_string(),
                })?,
        };
        set_selected(&mut profiles[current], false)?;
        set_selected(&mut profiles[target], true)?;
        debug!(from = current, to = target, "profile selected");
        Ok(self)
    }

    /// Rules of the current profile; none when the path is absent.
    pub fn rules(&self) -> Result<Vec<Rule>> {
        let profile = self.current_profile()?;
        match profile.pointer("/complex_modifications/rules") {
            Some(Value::Array(rules)) => rules.iter().map(Rule::from_json).collect(),
            _ => Ok(Vec::new()),
        }
    }

    pub fn clear_rules(&mut self) -> Result<&mut Self> {
        self.set_rules(Vec::<Value>::new())
    }

    /// Replaces `complex_modifications.rules` of the current profile,
    /// creating the path when missing.
    pub fn set_rules<I, R>(&mut self, rules: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Value>,
    {
        let rules: Vec<Value> = rules.into_iter().map(Into::into).collect();
        let count = rules.len();
        let profile = self.current_profile_mut()?;
        dig(profile, RULES_PATH, &DigOptions::new().set(rules).make_path())?;
        debug!(count, "rules set on current profile");
        Ok(self)
    }

    /// Loads from the file once, when nothing is loaded yet and io is set.
    pub fn ensure_loaded(&mut self) -> Result<&mut Self> {
        if self.data.is_null() && self.io.is_some() {
            self.load()?;
        }
        Ok(self)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::from_json(serde_json::from_str(s)?))
    }
}

fn is_selected(profile: &Value) -> bool {
    profile.get("selected").and_then(Value::as_bool) == Some(true)
}

fn set_selected(profile: &mut Value, selected: bool) -> Result<()> {
    let map = profile
        .as_object_mut()
        .ok_or_else(|| Error::InvalidArgument("profile is not an object".into()))?;
    map.insert("selected".into(), Value::Bool(selected));
    Ok(())
}
