use ::uuid::Uuid;

use crate::error::{AppError, ErrorKind};

/// Non-empty string holding a UUID (hyphenated, simple, braced or urn form).
pub fn is_uuid(value: &str) -> bool {
    !value.is_empty() && Uuid::parse_str(value).is_ok()
}

pub fn parse_uuid(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value).map_err(|e| {
        AppError::new(ErrorKind::Validation, format!("invalid uuid: {value:?}")).with_cause(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid() {
        let id = Uuid::new_v4().to_string();
        assert!(is_uuid(&id));
        assert_eq!(parse_uuid(&id).unwrap().to_string(), id);
    }

    #[test]
    fn rejects_garbage_and_empty() {
        assert!(!is_uuid(""));
        assert!(!is_uuid("not-a-uuid"));

        let err = parse_uuid("123").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.cause().is_some());
    }
}
