use crate::error::{AppError, ErrorKind};

/// Returns the inner value, or fails with `kind` when it is absent.
///
/// ```ignore
/// let user_id = assert(params.get("id"), "id is required", ErrorKind::Validation)?;
/// ```
pub fn assert<T>(value: Option<T>, message: &str, kind: ErrorKind) -> Result<T, AppError> {
    value.ok_or_else(|| kind.constructor()(Some(message.to_string()), None))
}

/// Boolean flavour of [`assert`]: `false` fails.
pub fn assert_true(value: bool, message: &str, kind: ErrorKind) -> Result<(), AppError> {
    assert(value.then_some(()), message, kind)
}

/// Fails with `kind` unless `predicate` accepts the value; returns the value untouched.
pub fn assert_with<T, P>(
    value: T,
    predicate: P,
    message: &str,
    kind: ErrorKind,
) -> Result<T, AppError>
where
    P: FnOnce(&T) -> bool,
{
    if !predicate(&value) {
        return Err(kind.constructor()(Some(message.to_string()), None));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_value_passes_through() {
        let v = assert(Some("k1"), "missing", ErrorKind::Authentication).unwrap();
        assert_eq!(v, "k1");
    }

    #[test]
    fn none_fails_with_given_kind_and_message() {
        let err = assert(
            None::<String>,
            "No authentication method found",
            ErrorKind::Authentication,
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status().as_u16(), 401);
        assert_eq!(err.message(), "No authentication method found");
    }

    #[test]
    fn false_fails() {
        assert!(assert_true(true, "x", ErrorKind::BadRequest).is_ok());

        let err = assert_true(false, "flag must be set", ErrorKind::BadRequest).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn predicate_guards_value() {
        let ok = assert_with(42, |n| *n > 0, "must be positive", ErrorKind::Validation);
        assert_eq!(ok.unwrap(), 42);

        let err =
            assert_with(-1, |n| *n > 0, "must be positive", ErrorKind::Validation).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "must be positive");
    }
}
