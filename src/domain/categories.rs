use crate::domain::error::DomainError;

pub const CATEGORY_NAME_REQUIRED: &str = "カテゴリー名を入力してください";

/// Trims a submitted category name, rejecting names that are blank after trimming.
pub fn normalize_category_name(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(CATEGORY_NAME_REQUIRED));
    }
    Ok(trimmed.to_string())
}
