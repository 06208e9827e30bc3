use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Credentials for authenticating with the Cirrus API.
///
/// Catalog endpoints (images, server types) answer anonymous requests;
/// everything account-scoped needs a token.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Personal access token, sent as `Authorization: Bearer <token>`.
    Token(SecretString),
    /// No authentication. Only public catalog endpoints will succeed.
    Anonymous,
}

impl Credentials {
    /// Build the `Authorization` header value, if any.
    ///
    /// The value is marked sensitive so it never shows up in debug output.
    pub fn authorization_header(&self) -> Result<Option<HeaderValue>, Error> {
        match self {
            Self::Token(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|e| Error::Authentication {
                        message: format!("invalid token header value: {e}"),
                    })?;
                value.set_sensitive(true);
                Ok(Some(value))
            }
            Self::Anonymous => Ok(None),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_produces_sensitive_bearer_header() {
        let creds = Credentials::Token(SecretString::from("abc123".to_owned()));
        let header = creds.authorization_header().unwrap().unwrap();
        assert!(header.is_sensitive());
        assert_eq!(header.to_str().unwrap(), "Bearer abc123");
    }

    #[test]
    fn anonymous_has_no_header() {
        assert!(Credentials::Anonymous.authorization_header().unwrap().is_none());
        assert!(Credentials::Anonymous.is_anonymous());
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let creds = Credentials::Token(SecretString::from("bad\ntoken".to_owned()));
        assert!(matches!(
            creds.authorization_header(),
            Err(Error::Authentication { .. })
        ));
    }
}
