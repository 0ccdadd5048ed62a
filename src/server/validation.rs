use crate::server::response::ApiError;

const MAX_NAME_LEN: usize = 64;
const MAX_VERSION_LEN: usize = 100;
const MAX_TYPE_DEFS_LEN: usize = 10_000;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn validate_name(name: &str, entity: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot be empty"
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_name_char) {
        return Err(ApiError::bad_request(format!(
            "{entity} name can only contain alphanumeric characters, hyphens, and underscores"
        )));
    }
    Ok(())
}

pub fn validate_graph_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "graph")
}

pub fn validate_service_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "service")
}

pub fn validate_version(version: &str) -> Result<(), ApiError> {
    if version.is_empty() {
        return Err(ApiError::bad_request("version cannot be empty"));
    }
    if version.len() > MAX_VERSION_LEN {
        return Err(ApiError::bad_request(format!(
            "version cannot exceed {MAX_VERSION_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_type_defs(type_defs: &str) -> Result<(), ApiError> {
    if type_defs.is_empty() {
        return Err(ApiError::bad_request("type_defs cannot be empty"));
    }
    if type_defs.len() > MAX_TYPE_DEFS_LEN {
        return Err(ApiError::bad_request(format!(
            "type_defs cannot exceed {MAX_TYPE_DEFS_LEN} bytes"
        )));
    }
    Ok(())
}

/// Unwraps a required body property. The message shape is part of the wire
/// contract; clients match on it.
pub fn require<T>(field: Option<T>, name: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| {
        ApiError::bad_request(format!("body should have required property '{name}'"))
    })
}
