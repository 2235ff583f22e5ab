// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing contestants, rejected keys, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate a stage name: non-empty, no leading/trailing whitespace, no control characters
pub fn validate_stage_name(name: &str) -> Result<(), String> {
    validate_non_empty(name, "Stage name")?;

    if name.trim() != name {
        return Err(format!("Invalid stage name: '{}'. Remove leading or trailing spaces.", name));
    }
    if name.chars().any(char::is_control) {
        return Err("Invalid stage name: control characters are not allowed.".to_string());
    }
    Ok(())
}

/// Validate a media link (audio or video); only http(s) URLs are accepted
pub fn validate_media_url(url: &str, field_name: &str) -> Result<(), String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| format!("Invalid {} URL: '{}'. Must start with http:// or https://.", field_name, url))?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    if host.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(format!("Invalid {} URL: '{}'.", field_name, url));
    }
    Ok(())
}

/// Validate an access key as typed by the operator
pub fn validate_access_key(key: &str) -> Result<(), String> {
    validate_non_empty(key, "Access key")?;
    if key.chars().any(char::is_whitespace) {
        return Err("Access key cannot contain whitespace".to_string());
    }
    Ok(())
}
