use serde::Deserialize;

pub const DEFAULT_JWT_COOKIE_NAME: &str = "jwt";
pub const DEFAULT_EMAIL_FIELD: &str = "email";
pub const DEFAULT_PASSWORD_FIELD: &str = "password";

/// Field-name overrides used while detecting credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
    /// Cookie carrying the session token.
    pub jwt_cookie_name: String,
    /// Body field holding the email of an email/password login.
    pub email_field: String,
    /// Body field holding the password of an email/password login.
    pub password_field: String,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            jwt_cookie_name: DEFAULT_JWT_COOKIE_NAME.to_string(),
            email_field: DEFAULT_EMAIL_FIELD.to_string(),
            password_field: DEFAULT_PASSWORD_FIELD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_overrides_keep_defaults() {
        let options: AuthOptions =
            serde_json::from_value(serde_json::json!({ "jwt_cookie_name": "sid" })).unwrap();

        assert_eq!(options.jwt_cookie_name, "sid");
        assert_eq!(options.email_field, "email");
        assert_eq!(options.password_field, "password");
    }
}
