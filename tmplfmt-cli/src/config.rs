use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Error};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tmplfmt::Value;

/// Holds in-memory config state for the execution.
///
/// The layers are applied in this order: defaults, the config file, the
/// `TMPLFMT_*` environment variables and finally the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    format: String,
    newline: bool,
    globals: bool,
    env: bool,
    defines: Arc<BTreeMap<String, JsonValue>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: "auto".to_string(),
            newline: true,
            globals: true,
            env: false,
            defines: Default::default(),
        }
    }
}

impl Config {
    pub fn update_from_matches(&mut self, matches: &ArgMatches) -> Result<(), Error> {
        if let Some(format) = matches.get_one::<String>("format") {
            self.format = format.clone();
        }
        if matches.get_flag("no-newline") {
            self.newline = false;
        }
        if matches.get_flag("no-globals") {
            self.globals = false;
        }
        if matches.get_flag("env") {
            self.env = true;
        }
        self.add_defines_from_matches(matches)?;
        Ok(())
    }

    #[cfg(feature = "toml")]
    pub fn load_from_toml(p: &std::path::Path) -> Result<Config, Error> {
        let contents = std::fs::read_to_string(p)
            .with_context(|| format!("unable to read config file '{}'", p.display()))?;
        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("invalid config file '{}'", p.display()))?;
        Ok(cfg)
    }

    pub fn update_from_env(&mut self) -> Result<(), Error> {
        if let Ok(format) = env::var("TMPLFMT_FORMAT") {
            self.format = format;
        }
        if let Ok(newline) = env::var("TMPLFMT_NEWLINE") {
            self.newline = parse_env_bool(&newline, "TMPLFMT_NEWLINE")?;
        }
        if let Ok(globals) = env::var("TMPLFMT_GLOBALS") {
            self.globals = parse_env_bool(&globals, "TMPLFMT_GLOBALS")?;
        }
        if let Ok(env_flag) = env::var("TMPLFMT_ENV") {
            self.env = parse_env_bool(&env_flag, "TMPLFMT_ENV")?;
        }
        Ok(())
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn newline(&self) -> bool {
        self.newline
    }

    pub fn globals(&self) -> bool {
        self.globals
    }

    /// Returns the variables the config adds on top of the data file.
    pub fn extra_context(&self) -> Value {
        let mut rv = Value::from_serialize(&*self.defines);
        if self.env {
            let env = Value::from_iter([("ENV", Value::from_iter(std::env::vars()))]);
            rv = tmplfmt::value::merge_maps([env, rv]);
        }
        rv
    }

    fn add_defines_from_matches(&mut self, matches: &ArgMatches) -> Result<(), Error> {
        let defines = Arc::make_mut(&mut self.defines);
        if let Some(items) = matches.get_many::<String>("define") {
            for item in items {
                if let Some((key, raw_value)) = item.split_once(":=") {
                    defines.insert(key.to_string(), interpret_raw_value(raw_value)?);
                } else if let Some((key, string_value)) = item.split_once('=') {
                    defines.insert(key.to_string(), JsonValue::from(string_value));
                } else {
                    defines.insert(item.to_string(), JsonValue::from(true));
                }
            }
        }
        Ok(())
    }
}

fn interpret_raw_value(s: &str) -> Result<JsonValue, Error> {
    serde_json::from_str(s).with_context(|| format!("invalid raw value '{}' (not valid JSON)", s))
}

fn parse_env_bool(s: &str, var_name: &str) -> Result<bool, Error> {
    match s.to_lowercase().as_str() {
        "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => bail!("Invalid boolean value for {}: {}", var_name, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_bool() {
        assert!(parse_env_bool("Yes", "X").unwrap());
        assert!(!parse_env_bool("off", "X").unwrap());
        assert!(parse_env_bool("maybe", "X").is_err());
    }

    #[test]
    fn test_defines() {
        let matches = crate::command::make_command()
            .try_get_matches_from(["tmplfmt-cli", "-Dname=Amy", "-Dcount:=3", "-Dflag"])
            .unwrap();
        let mut config = Config::default();
        config.update_from_matches(&matches).unwrap();
        let ctx = config.extra_context();
        assert_eq!(ctx.get_attr("name").as_str(), Some("Amy"));
        assert_eq!(ctx.get_attr("count"), Value::from(3));
        assert_eq!(ctx.get_attr("flag"), Value::from(true));
        assert!(ctx.get_attr("ENV").is_undefined());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_layer() {
        let cfg: Config = toml::from_str("newline = false\n[defines]\nsite = \"x\"\n").unwrap();
        assert!(!cfg.newline());
        assert!(cfg.globals());
        assert_eq!(cfg.format(), "auto");
        assert_eq!(cfg.extra_context().get_attr("site").as_str(), Some("x"));
    }
}
