use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Name of the attribute that keys user items in the store.
pub const KEY_ATTRIBUTE: &str = "email";

/// A user record. Missing fields decode as empty strings, so an update body
/// always replaces the whole record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(email: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self { email: email.into(), first_name: first_name.into(), last_name: last_name.into() }
    }
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .unwrap()
});

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Syntactic email check used before a user is created.
pub fn is_email_valid(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_LEN => {}
        _ => return false,
    }
    if email.contains("..") || email.starts_with('.') || email.contains(".@") {
        return false;
    }
    EMAIL_RE.is_match(email)
}
