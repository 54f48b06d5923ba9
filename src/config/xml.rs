//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde; unknown fields are an error).
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - Text values are trimmed; patterns that need leading or trailing
//!   whitespace have to come from the command line.
//! - Repeated `<remove>` elements form the ordered pattern list.

use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::platform::write_config_secure_new_0600;
use crate::unique::CounterTemplate;

/// Mirror of config.xml for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "remove", default)]
    remove: Vec<String>,
    #[serde(rename = "remove_spaces")]
    remove_spaces: Option<bool>,
    #[serde(rename = "counter_format")]
    counter_format: Option<String>,
    #[serde(rename = "lowercase")]
    lowercase: Option<bool>,
    #[serde(rename = "output_path")]
    output_path: Option<String>,
    #[serde(rename = "preserve_metadata")]
    preserve_metadata: Option<bool>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let log_level = match non_empty(parsed.log_level.as_deref()) {
        Some(s) => s.parse::<LogLevel>().map_err(|e| anyhow!(e))?,
        None => LogLevel::default(),
    };
    Ok(Config {
        patterns: parsed
            .remove
            .iter()
            .filter_map(|p| non_empty(Some(p.as_str())))
            .map(str::to_string)
            .collect(),
        remove_spaces: parsed.remove_spaces.unwrap_or(false),
        counter_format: non_empty(parsed.counter_format.as_deref()).map(str::to_string),
        lowercase: parsed.lowercase.unwrap_or(false),
        output_path: non_empty(parsed.output_path.as_deref()).map(PathBuf::from),
        dry_run: false,
        preserve_metadata: parsed.preserve_metadata.unwrap_or(false),
        log_level,
        log_file: non_empty(parsed.log_file.as_deref()).map(PathBuf::from),
    })
}

/// Load a Config from a specific XML file.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("config xml '{}'", path.display()))
}

/// Load the config file in use (see [`default_config_path`]).
/// Ok(None) when the file does not exist; a file that exists but is invalid is an error.
pub fn load_config_from_xml() -> Result<Option<Config>> {
    let path = default_config_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(None);
    }
    let cfg = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), patterns = cfg.patterns.len(), "loaded config file");
    Ok(Some(cfg))
}

/// Write a commented template config to `path` (0600 on Unix, never overwrites).
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        return Err(anyhow!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        ));
    }

    let content = format!(
        "<!--\n  smart_rename configuration (XML)\n\n  remove             -> one element per pattern, applied in order; repeat as needed\n                        re:<regex>  regular expression\n                        lit:<text>  literal (use when the text starts with re:)\n                        <text>      literal\n  remove_spaces      -> true/false: strip all whitespace after pattern removal\n  counter_format     -> duplicate-name format; {{name}} and {{n}} (required)\n  lowercase          -> true/false: lowercase names after pattern removal\n  output_path        -> write results there and leave the input untouched (optional)\n  preserve_metadata  -> true/false: copy timestamps and permissions\n  log_level          -> quiet | normal | info | debug\n  log_file           -> path to a log file (optional)\n\n  CLI flags override these values; CLI patterns are appended after these.\n-->\n<config>\n  <remove>re:\\s*\\(copy\\)</remove>\n  <remove_spaces>false</remove_spaces>\n  <counter_format>{}</counter_format>\n  <lowercase>false</lowercase>\n  <preserve_metadata>false</preserve_metadata>\n  <log_level>normal</log_level>\n</config>\n",
        CounterTemplate::DEFAULT
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    info!("Created template config at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_full_config() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(
            &p,
            r#"<config>
  <remove>-icon</remove>
  <remove>re:\d+</remove>
  <remove_spaces>true</remove_spaces>
  <counter_format>{name}_{n}</counter_format>
  <lowercase>true</lowercase>
  <preserve_metadata>true</preserve_metadata>
  <log_level>debug</log_level>
  <log_file>/tmp/sr.log</log_file>
</config>"#,
        )
        .unwrap();
        let cfg = load_config_from_xml_path(&p).unwrap();
        assert_eq!(cfg.patterns, vec!["-icon".to_string(), r"re:\d+".to_string()]);
        assert!(cfg.remove_spaces && cfg.lowercase && cfg.preserve_metadata);
        assert_eq!(cfg.counter_format.as_deref(), Some("{name}_{n}"));
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/sr.log")));
        assert_eq!(cfg.output_path, None);
    }

    #[test]
    fn empty_config_gives_defaults() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config></config>").unwrap();
        assert_eq!(load_config_from_xml_path(&p).unwrap(), Config::default());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config><bogus>1</bogus></config>").unwrap();
        assert!(load_config_from_xml_path(&p).is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config><log_level>loud</log_level></config>").unwrap();
        let err = load_config_from_xml_path(&p).unwrap_err();
        assert!(format!("{err:#}").contains("invalid log level"));
    }

    #[test]
    fn template_round_trips() {
        let td = tempdir().unwrap();
        let base = fs::canonicalize(td.path()).unwrap();
        let p = base.join("smart_rename").join("config.xml");
        create_template_config(&p).unwrap();
        let cfg = load_config_from_xml_path(&p).unwrap();
        assert_eq!(cfg.patterns, vec![r"re:\s*\(copy\)".to_string()]);
        assert_eq!(cfg.counter_format.as_deref(), Some(CounterTemplate::DEFAULT));
        assert!(create_template_config(&p).is_err(), "template must not overwrite");
    }
}
