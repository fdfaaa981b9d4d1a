//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TablecastConfig;
use super::secret::secret_string;
use crate::domain::errors::TablecastError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TablecastConfig
/// 4. Applies environment variable overrides (TABLECAST_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsing fails, a
/// referenced environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<TablecastConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TablecastError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TablecastError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TablecastConfig = toml::from_str(&contents)
        .map_err(|e| TablecastError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        TablecastError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Returns an error listing every
/// referenced variable that is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TablecastError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the TABLECAST_* prefix
///
/// Variables follow the pattern TABLECAST_<SECTION>_<KEY>, for example
/// TABLECAST_SOURCE_TABLE or TABLECAST_EXPORT_RETRIES.
fn apply_env_overrides(config: &mut TablecastConfig) {
    if let Ok(val) = std::env::var("TABLECAST_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Source overrides
    if let Ok(val) = std::env::var("TABLECAST_SOURCE_PROJECT") {
        config.source.project = val;
    }
    if let Ok(val) = std::env::var("TABLECAST_SOURCE_DATASET") {
        config.source.dataset = val;
    }
    if let Ok(val) = std::env::var("TABLECAST_SOURCE_TABLE") {
        config.source.table = val;
    }
    if let Ok(val) = std::env::var("TABLECAST_SOURCE_ACCESS_TOKEN") {
        config.source.access_token = Some(secret_string(val));
    }

    // Destination overrides
    if let Ok(val) = std::env::var("TABLECAST_DESTINATION_BUCKET") {
        config.destination.bucket = val;
    }
    if let Ok(val) = std::env::var("TABLECAST_DESTINATION_OBJECT_PATH") {
        config.destination.object_path = Some(val);
    }
    if let Ok(val) = std::env::var("TABLECAST_DESTINATION_ACCESS_TOKEN") {
        config.destination.access_token = Some(secret_string(val));
    }

    // Export overrides
    if let Ok(val) = std::env::var("TABLECAST_EXPORT_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.export.retries = retries;
        }
    }
    if let Ok(val) = std::env::var("TABLECAST_EXPORT_BACKOFF_BASE_SECS") {
        if let Ok(secs) = val.parse() {
            config.export.backoff_base_secs = secs;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("TABLECAST_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("TABLECAST_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("TABLECAST_TEST_VAR", "test_value");
        let input = "access_token = \"${TABLECAST_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "access_token = \"test_value\"\n");
        std::env::remove_var("TABLECAST_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("TABLECAST_MISSING_VAR");
        let input = "access_token = \"${TABLECAST_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("TABLECAST_COMMENTED_VAR");
        let input = "# token = \"${TABLECAST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[source]
project = "student-00380"
dataset = "CL_TRANSFORMED"
table = "defaulters"

[destination]
bucket = "ikl-finance-bucket-002"
object_path = "transformed_xml_files/defaulters.xml"

[export]
format = "xml"
retries = 3
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.source.table, "defaulters");
        assert_eq!(
            config.destination.object_path.as_deref(),
            Some("transformed_xml_files/defaulters.xml")
        );
    }
}
