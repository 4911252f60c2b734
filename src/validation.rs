use crate::error::AppError;

pub fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(require_non_empty("prompt", "").is_err());
        assert!(require_non_empty("prompt", "   \n\t").is_err());
        assert!(require_non_empty("prompt", "hello").is_ok());
    }
}
