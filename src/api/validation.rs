use super::ApiError;
use crate::services::Role;

/// Categories uploads may land in. Anything else is rejected so clients
/// cannot invent directories under the upload root.
const UPLOAD_CATEGORIES: &[&str] = &["avatars", "images", "pdfs", "chat", "csv"];

pub fn validate_article_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid article ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_username(name: &str) -> Result<&str, ApiError> {
    if name.is_empty() {
        return Err(ApiError::validation("Username cannot be empty"));
    }

    if name.len() > 50 {
        return Err(ApiError::validation(
            "Username must be 50 characters or less",
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, dots, hyphens, and underscores",
        ));
    }

    Ok(name)
}

pub fn validate_role(role: &str) -> Result<Role, ApiError> {
    Role::parse(role).ok_or_else(|| {
        ApiError::validation(format!(
            "Invalid role: '{}'. Must be one of: user, editor, admin",
            role
        ))
    })
}

pub fn validate_upload_category(category: &str) -> Result<&str, ApiError> {
    if UPLOAD_CATEGORIES.contains(&category) {
        Ok(category)
    } else {
        Err(ApiError::validation(format!(
            "Invalid upload category: '{}'. Must be one of: {}",
            category,
            UPLOAD_CATEGORIES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_article_ids() {
        assert!(validate_article_id(0).is_err());
        assert!(validate_article_id(-3).is_err());
        assert_eq!(validate_article_id(7).ok(), Some(7));
    }

    #[test]
    fn rejects_usernames_with_path_characters() {
        assert!(validate_username("../etc").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username("alice.b-c_1").is_ok());
    }

    #[test]
    fn upload_category_is_a_closed_set() {
        assert!(validate_upload_category("avatars").is_ok());
        assert!(validate_upload_category("..").is_err());
        assert!(validate_upload_category("videos").is_err());
    }
}
