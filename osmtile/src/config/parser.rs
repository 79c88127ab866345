//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;

use ini::Ini;

use super::file::{ConfigFile, ConfigFileError};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
/// Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("tile_size") {
            config.cache.tile_size = parse_positive(v).ok_or_else(|| ConfigFileError::InvalidValue {
                section: "cache".to_string(),
                key: "tile_size".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer (metres)".to_string(),
            })?;
        }
    }

    // [overpass] section
    if let Some(section) = ini.section(Some("overpass")) {
        if let Some(v) = section.get("urls") {
            let urls: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if urls.is_empty() {
                return Err(ConfigFileError::InvalidValue {
                    section: "overpass".to_string(),
                    key: "urls".to_string(),
                    value: v.to_string(),
                    reason: "must list at least one URL".to_string(),
                });
            }
            config.overpass.urls = urls;
        }
        if let Some(v) = section.get("timeout") {
            config.overpass.timeout =
                parse_positive(v).ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "overpass".to_string(),
                    key: "timeout".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
    }

    Ok(config)
}

fn parse_positive<T: std::str::FromStr + Default + PartialEq>(v: &str) -> Option<T> {
    v.trim().parse().ok().filter(|n| *n != T::default())
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_all_values() {
        let config = parse(
            "[cache]\ndirectory = /var/cache/osm\ntile_size = 500\n\
             [overpass]\nurls = http://a/api, http://b/api ,\ntimeout = 60\n",
        )
        .unwrap();
        assert_eq!(config.cache.directory, PathBuf::from("/var/cache/osm"));
        assert_eq!(config.cache.tile_size, 500);
        assert_eq!(config.overpass.urls, vec!["http://a/api", "http://b/api"]);
        assert_eq!(config.overpass.timeout, 60);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = parse("[cache]\ncolour = blue\n[extra]\nfoo = bar\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_tile_size() {
        for value in ["zero", "0", "-5"] {
            let err = parse(&format!("[cache]\ntile_size = {value}\n")).unwrap_err();
            assert!(
                matches!(&err, ConfigFileError::InvalidValue { key, .. } if key == "tile_size"),
                "{value}: {err}"
            );
        }
    }

    #[test]
    fn test_empty_url_list_rejected() {
        let err = parse("[overpass]\nurls = , ,\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { key, .. } if key == "urls"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/tiles");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("tiles"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
