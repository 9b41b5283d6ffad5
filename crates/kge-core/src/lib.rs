//! kge-core: building Karabiner-Elements complex modifications
//!
//! This crate keeps a small surface:
//! - `dig`: path get/set/mutate over `serde_json::Value` with `*` and `name[]` segments
//! - `Sanitizer`: path-scoped transforms, used to normalize remap shorthand
//! - `key` and friends: `"shift + (control) + a"` expressions to host event objects
//! - `Rule`, `RuleSet`, `Config`: builders over rule-set files and `karabiner.json`
//! - File IO with timestamped backups, default host paths
//!
pub mod cond;
pub mod config;
pub mod dig;
pub mod error;
pub mod io;
pub mod json;
pub mod keys;
pub mod paths;
pub mod rule;
pub mod ruleset;
pub mod sanitizer;

pub use cond::{if_app, if_lang, if_var, unless_app, unless_lang, unless_var};
pub use config::{Config, ProfileSelector};
pub use dig::{DigOptions, DigResult, DigPath, Dug, MakePath, Segment, dig, dig_path, is_diggable};
pub use error::{DigError, Error, Expected, Result};
pub use io::{FileIo, IoOptions, untilde};
pub use keys::{Key, KeySpec, Modifiers, click, key, key_with, keys, set_var};
pub use rule::Rule;
pub use ruleset::RuleSet;
pub use sanitizer::Sanitizer;
