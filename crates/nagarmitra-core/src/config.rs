use crate::app_config::AppConfig;
use crate::location::parse_manual_coordinates;
use crate::ConfigError;

/// Placeholder key shipped in sample `.env` files. Treated the same as an
/// absent key so a fresh checkout runs in degraded mode instead of sending
/// a junk credential to the geocoder.
pub const PLACEHOLDER_API_KEY: &str = "demo_key_replace_with_actual_key";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value. No var is
/// required; every field has a default.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use crate::location::Coordinates;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_coords = |var: &str, default: &str| -> Result<Coordinates, ConfigError> {
        let raw = or_default(var, default);
        parse_manual_coordinates(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected \"lat, lng\" within valid ranges, got {raw:?}"),
        })
    };

    let geocoder_api_key = normalize_api_key(lookup("NAGARMITRA_MAPS_API_KEY").ok());
    let geocoder_base_url = or_default(
        "NAGARMITRA_MAPS_BASE_URL",
        "https://maps.googleapis.com/maps/api",
    );
    let request_timeout_secs = parse_u64("NAGARMITRA_REQUEST_TIMEOUT_SECS", "10")?;
    let country_bias = or_default("NAGARMITRA_COUNTRY_BIAS", "in");
    let default_center = parse_coords("NAGARMITRA_DEFAULT_CENTER", "28.6139, 77.2090")?;
    let search_radius_m = parse_u32("NAGARMITRA_SEARCH_RADIUS_M", "50000")?;
    let sensor_timeout_secs = parse_u64("NAGARMITRA_SENSOR_TIMEOUT_SECS", "10")?;
    let sensor_max_age_secs = parse_u64("NAGARMITRA_SENSOR_MAX_AGE_SECS", "60")?;

    let device_position = match lookup("NAGARMITRA_DEVICE_POSITION") {
        Ok(raw) => Some(parse_manual_coordinates(&raw).ok_or_else(|| {
            ConfigError::InvalidEnvVar {
                var: "NAGARMITRA_DEVICE_POSITION".to_string(),
                reason: format!("expected \"lat, lng\" within valid ranges, got {raw:?}"),
            }
        })?),
        Err(_) => None,
    };

    let log_level = or_default("NAGARMITRA_LOG_LEVEL", "info");

    Ok(AppConfig {
        geocoder_api_key,
        geocoder_base_url,
        request_timeout_secs,
        country_bias,
        default_center,
        search_radius_m,
        sensor_timeout_secs,
        sensor_max_age_secs,
        device_position,
        log_level,
    })
}

/// Collapse placeholder and blank keys to `None`.
fn normalize_api_key(raw: Option<String>) -> Option<String> {
    match raw {
        Some(key) => {
            let key = key.trim();
            if key.is_empty() || key == PLACEHOLDER_API_KEY {
                None
            } else {
                Some(key.to_string())
            }
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert!(cfg.geocoder_api_key.is_none());
        assert_eq!(cfg.geocoder_base_url, "https://maps.googleapis.com/maps/api");
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.country_bias, "in");
        assert_eq!(cfg.default_center.as_summary(), "28.613900, 77.209000");
        assert_eq!(cfg.search_radius_m, 50_000);
        assert_eq!(cfg.sensor_timeout_secs, 10);
        assert_eq!(cfg.sensor_max_age_secs, 60);
        assert!(cfg.device_position.is_none());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn placeholder_api_key_is_treated_as_unset() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_MAPS_API_KEY", PLACEHOLDER_API_KEY);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.geocoder_api_key.is_none());
    }

    #[test]
    fn blank_api_key_is_treated_as_unset() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_MAPS_API_KEY", "   ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.geocoder_api_key.is_none());
    }

    #[test]
    fn real_api_key_is_kept_and_trimmed() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_MAPS_API_KEY", " AIzaFakeKey123 ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.geocoder_api_key.as_deref(), Some("AIzaFakeKey123"));
    }

    #[test]
    fn build_app_config_fails_with_invalid_timeout() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NAGARMITRA_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(NAGARMITRA_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_default_center() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_DEFAULT_CENTER", "91.0, 10.0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NAGARMITRA_DEFAULT_CENTER"),
            "expected InvalidEnvVar(NAGARMITRA_DEFAULT_CENTER), got: {result:?}"
        );
    }

    #[test]
    fn default_center_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_DEFAULT_CENTER", "19.0760, 72.8777");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.default_center.as_summary(), "19.076000, 72.877700");
    }

    #[test]
    fn device_position_is_parsed_when_present() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_DEVICE_POSITION", "28.5355, 77.3910");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let pos = cfg.device_position.expect("position should be set");
        assert_eq!(pos.as_summary(), "28.535500, 77.391000");
    }

    #[test]
    fn device_position_invalid_is_an_error() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_DEVICE_POSITION", "somewhere in Delhi");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NAGARMITRA_DEVICE_POSITION"),
            "expected InvalidEnvVar(NAGARMITRA_DEVICE_POSITION), got: {result:?}"
        );
    }

    #[test]
    fn sensor_timings_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_SENSOR_TIMEOUT_SECS", "5");
        map.insert("NAGARMITRA_SENSOR_MAX_AGE_SECS", "120");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.sensor_timeout_secs, 5);
        assert_eq!(cfg.sensor_max_age_secs, 120);
    }

    #[test]
    fn search_radius_invalid_is_an_error() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_SEARCH_RADIUS_M", "-3");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NAGARMITRA_SEARCH_RADIUS_M"),
            "expected InvalidEnvVar(NAGARMITRA_SEARCH_RADIUS_M), got: {result:?}"
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NAGARMITRA_MAPS_API_KEY", "AIzaFakeKey123");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("AIzaFakeKey123"));
        assert!(rendered.contains("[redacted]"));
    }
}
