use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Username and password decoded from a `Basic` authorization header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn strip_scheme<'a>(header: &'a str, scheme: &str) -> Option<&'a str> {
    let header = header.trim();
    let (given, rest) = header.split_once(' ')?;
    given.eq_ignore_ascii_case(scheme).then(|| rest.trim())
}

/// Decodes `Basic <base64(username:password)>`. Returns `None` when the
/// header uses another scheme or is malformed.
#[must_use]
pub fn parse_basic(header: &str) -> Option<BasicCredentials> {
    let encoded = strip_scheme(header, "Basic")?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(BasicCredentials {
        username: username.to_owned(),
        password: password.to_owned(),
    })
}

/// Extracts the token from `Bearer <token>`.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    strip_scheme(header, "Bearer").filter(|token| !token.is_empty())
}
