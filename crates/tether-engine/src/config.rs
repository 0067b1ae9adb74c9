//! Binding options (tether.toml)
//!
//! `BindOptions` controls how host methods are exposed: guest-visible naming,
//! null handling for non-nullable parameters, which returned host types are
//! re-bound, and two invocation switches.
//!
//! ```toml
//! naming = "camel_case"
//! null_policy = "strict"
//! rebind = ["Engine", "Session"]
//! spread_variadic_array = true
//! catch_panics = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading binding options
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the options file
    #[error("Failed to read bind options: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse bind options: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid bind options: {0}")]
    Invalid(String),
}

/// Guest-visible member naming
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// Use the declared host method name unchanged
    #[default]
    Declared,
    /// `no_arg` → `noArg`
    CamelCase,
    /// `no_arg` → `NoArg`
    PascalCase,
}

impl Naming {
    /// Guest-visible name for a declared method name
    pub fn apply(self, declared: &str) -> String {
        match self {
            Naming::Declared => declared.to_string(),
            Naming::CamelCase => {
                let pascal = to_pascal(declared);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            Naming::PascalCase => to_pascal(declared),
        }
    }
}

fn to_pascal(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// What a null/undefined argument becomes for a non-nullable parameter
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// The parameter type's zero value
    #[default]
    Zero,
    /// A coercion error
    Strict,
}

/// Blanket rebind modes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RebindMode {
    /// Every bindable host type is re-bound
    All,
    /// Nothing is re-bound; bindable returns become opaque handles
    None,
}

/// Which returned host types are re-bound to method tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RebindPolicy {
    /// `"all"` or `"none"`
    Mode(RebindMode),
    /// An explicit list of host type names
    Only(Vec<String>),
}

impl Default for RebindPolicy {
    fn default() -> Self {
        RebindPolicy::Mode(RebindMode::All)
    }
}

impl RebindPolicy {
    /// Whether a returned value of host type `type_name` is re-bound
    pub fn allows(&self, type_name: &str) -> bool {
        match self {
            RebindPolicy::Mode(RebindMode::All) => true,
            RebindPolicy::Mode(RebindMode::None) => false,
            RebindPolicy::Only(names) => names.iter().any(|n| n == type_name),
        }
    }
}

/// Binding options carried by a `Bridge`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BindOptions {
    /// Guest-visible member naming
    pub naming: Naming,

    /// Null handling for non-nullable parameters
    pub null_policy: NullPolicy,

    /// Which returned host types are re-bound
    pub rebind: RebindPolicy,

    /// A lone array argument in variadic position is spread into elements
    pub spread_variadic_array: bool,

    /// Host panics become guest exceptions instead of unwinding
    pub catch_panics: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            naming: Naming::default(),
            null_policy: NullPolicy::default(),
            rebind: RebindPolicy::default(),
            spread_variadic_array: true,
            catch_panics: true,
        }
    }
}

impl BindOptions {
    /// Parse options from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse options from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let options: BindOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let RebindPolicy::Only(names) = &self.rebind {
            for name in names {
                if name.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "rebind type names cannot be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Set the naming mode
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Set the null policy
    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    /// Set the rebind policy
    pub fn with_rebind(mut self, rebind: RebindPolicy) -> Self {
        self.rebind = rebind;
        self
    }

    /// Enable or disable spreading a lone array in variadic position
    pub fn with_spread_variadic_array(mut self, spread: bool) -> Self {
        self.spread_variadic_array = spread;
        self
    }

    /// Enable or disable panic containment
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BindOptions::from_str("").unwrap();
        assert_eq!(options, BindOptions::default());
        assert_eq!(options.naming, Naming::Declared);
        assert_eq!(options.null_policy, NullPolicy::Zero);
        assert!(options.rebind.allows("Anything"));
        assert!(options.spread_variadic_array);
        assert!(options.catch_panics);
    }

    #[test]
    fn test_parse_full_options() {
        let toml = r#"
naming = "camel_case"
null_policy = "strict"
rebind = ["Engine", "Session"]
spread_variadic_array = false
catch_panics = false
"#;

        let options = BindOptions::from_str(toml).unwrap();
        assert_eq!(options.naming, Naming::CamelCase);
        assert_eq!(options.null_policy, NullPolicy::Strict);
        assert!(options.rebind.allows("Session"));
        assert!(!options.rebind.allows("Rows"));
        assert!(!options.spread_variadic_array);
        assert!(!options.catch_panics);
    }

    #[test]
    fn test_parse_rebind_modes() {
        let options = BindOptions::from_str(r#"rebind = "none""#).unwrap();
        assert!(!options.rebind.allows("Engine"));

        let options = BindOptions::from_str(r#"rebind = "all""#).unwrap();
        assert!(options.rebind.allows("Engine"));
    }

    #[test]
    fn test_empty_rebind_name_is_invalid() {
        let result = BindOptions::from_str(r#"rebind = ["Engine", " "]"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_naming_is_parse_error() {
        let result = BindOptions::from_str(r#"naming = "kebab""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_naming_apply() {
        assert_eq!(Naming::Declared.apply("no_arg"), "no_arg");
        assert_eq!(Naming::CamelCase.apply("no_arg"), "noArg");
        assert_eq!(Naming::PascalCase.apply("no_arg"), "NoArg");
        assert_eq!(Naming::CamelCase.apply("NoArg"), "noArg");
        assert_eq!(Naming::PascalCase.apply("take_uint32"), "TakeUint32");
    }
}
