//! Porting job configuration.
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid (if
//! useless) config:
//!
//! ```json
//! {
//!   "include_paths": ["/usr/include/legacy"],
//!   "defines": { "LEGACY_API": "1", "VERSION(major, minor)": "((major) * 100 + (minor))" },
//!   "header_rules": { "old.h": "new.h" },
//!   "token_rules": [
//!     { "kind": "rename", "from": "OldWidget", "to": "NewWidget" },
//!     { "kind": "scoped", "scope": "Qt", "name": "WFlags", "to": "Qt::WindowFlags" }
//!   ],
//!   "abort_on_include_cycle": false,
//!   "port_inactive_branches": true
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use porta_edit::{HeaderRules, RenameToken, RuleTable, ScopedRename};
use porta_pp::{EvalOptions, MacroEnv};
use serde::Deserialize;

use crate::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortConfig {
    /// Searched in order for `#include` targets.
    pub include_paths: Vec<PathBuf>,
    /// Macro head (`NAME` or `NAME(a, b)`) to replacement text.
    pub defines: BTreeMap<String, String>,
    /// Legacy header name to new header name.
    pub header_rules: BTreeMap<String, String>,
    pub token_rules: Vec<TokenRuleConfig>,
    pub abort_on_include_cycle: bool,
    /// When false, only tokens of branches selected under `defines` are
    /// rewritten.
    pub port_inactive_branches: bool,
}

impl Default for PortConfig {
    fn default() -> Self {
        PortConfig {
            include_paths: Vec::new(),
            defines: BTreeMap::new(),
            header_rules: BTreeMap::new(),
            token_rules: Vec::new(),
            abort_on_include_cycle: false,
            port_inactive_branches: true,
        }
    }
}

/// One token rule as written in the config file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenRuleConfig {
    Rename {
        from: String,
        to: String,
        #[serde(default)]
        in_directives: bool,
    },
    Scoped {
        scope: String,
        name: String,
        to: String,
        #[serde(default)]
        in_directives: bool,
    },
}

impl PortConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The initial macro environment every file is evaluated under.
    pub fn macro_env(&self) -> Result<MacroEnv, ConfigError> {
        let mut env = MacroEnv::new();
        for (head, body) in &self.defines {
            if env.define_from_source(head, body).is_none() {
                return Err(ConfigError::InvalidDefine { head: head.clone() });
            }
        }
        Ok(env)
    }

    pub fn rule_table(&self) -> RuleTable {
        let mut table = RuleTable::new();
        for rule in &self.token_rules {
            match rule {
                TokenRuleConfig::Rename {
                    from,
                    to,
                    in_directives,
                } => table.add(RenameToken::new(from, to).with_directives(*in_directives)),
                TokenRuleConfig::Scoped {
                    scope,
                    name,
                    to,
                    in_directives,
                } => table.add(ScopedRename::new(scope, name, to).with_directives(*in_directives)),
            }
        }
        table
    }

    pub fn header_rules(&self) -> HeaderRules {
        self.header_rules
            .iter()
            .map(|(legacy, new)| (legacy.as_str(), new.as_str()))
            .collect()
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            abort_on_include_cycle: self.abort_on_include_cycle,
        }
    }
}
