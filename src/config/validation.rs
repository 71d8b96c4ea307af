use crate::constants::cache_ttl;
use crate::error::AppError;
use std::path::Path;

/// Validates that an endpoint looks like an http(s) URL or a bare domain.
pub fn validate_endpoint(name: &str, endpoint: &str) -> Result<(), AppError> {
    if endpoint.is_empty() {
        return Err(AppError::config_error(format!("{name} cannot be empty")));
    }

    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        // Without a protocol it should at least look like a domain
        if !endpoint.contains('.') && !endpoint.starts_with("localhost") {
            return Err(AppError::config_error(format!(
                "{name} must be a valid URL or domain name"
            )));
        }
    }

    Ok(())
}

/// Validates the configuration settings
///
/// # Validation Rules
/// - Both endpoints must be non-empty URLs or domain names
/// - HTTP timeout and cache TTL must be positive, the TTL at most `cache_ttl::MAX_DAYS`
/// - If log file path is provided, it cannot be empty and its parent must be creatable
pub fn validate_config(
    soap_url: &str,
    web_base_url: &str,
    log_file_path: &Option<String>,
    http_timeout_seconds: u64,
    cache_ttl_days: u64,
) -> Result<(), AppError> {
    validate_endpoint("SOAP URL", soap_url)?;
    validate_endpoint("Web base URL", web_base_url)?;

    if http_timeout_seconds == 0 {
        return Err(AppError::config_error("HTTP timeout must be at least 1 second"));
    }

    if cache_ttl_days == 0 {
        return Err(AppError::config_error("Cache TTL must be at least 1 day"));
    }

    if cache_ttl_days > cache_ttl::MAX_DAYS {
        return Err(AppError::config_error(format!(
            "Cache TTL must be at most {} days",
            cache_ttl::MAX_DAYS
        )));
    }

    if let Some(log_path) = log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
