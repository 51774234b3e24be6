use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - build.prog_name is not blank (it names both artifacts)
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.build.prog_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "build.prog_name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_blank_prog_name_fails() {
        let config = Config {
            build: BuildConfig {
                prog_name: "  ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
