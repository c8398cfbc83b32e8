use super::ApiError;

/// Longest selection the resolver accepts. Real selections are a few
/// hundred bytes.
pub const MAX_SELECTION_LEN: usize = 4096;

pub fn validate_selection_text(text: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = text.map(str::trim).unwrap_or_default();

    if trimmed.is_empty() {
        return Err(ApiError::validation("Missing text parameter"));
    }

    if trimmed.len() > MAX_SELECTION_LEN {
        return Err(ApiError::validation(format!(
            "Selection too long: {} bytes (max {})",
            trimmed.len(),
            MAX_SELECTION_LEN
        )));
    }

    Ok(trimmed)
}
