use crate::error::{AppError, ErrorKind};

/// Pragmatic address check: `local@domain.tld`, no whitespace, no empty domain labels.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty() && !label.starts_with('-') && !label.ends_with('-')
    })
}

/// Trims and validates; the trimmed address is returned.
pub fn parse_email(value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if !is_email(trimmed) {
        return Err(AppError::new(ErrorKind::Validation, "invalid email address"));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_email("a@example.com"));
        assert!(is_email("first.last+tag@sub.example.co.jp"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "plain",
            "@example.com",
            "a@",
            "a@localhost",
            "a@@example.com",
            "a@example..com",
            "a b@example.com",
            "a@-example.com",
        ] {
            assert!(!is_email(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn parse_trims_input() {
        assert_eq!(parse_email("  a@example.com ").unwrap(), "a@example.com");
        assert_eq!(
            parse_email("nope").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
}
