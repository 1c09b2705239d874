use std::fmt;

/// Names a CRS (or any other registry object) by its authority and code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthorityCode<'a> {
    pub auth_name: &'a str,
    pub code: &'a str,
}

impl<'a> AuthorityCode<'a> {
    pub const fn new(auth_name: &'a str, code: &'a str) -> Self {
        AuthorityCode { auth_name, code }
    }
}

impl fmt::Display for AuthorityCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.auth_name, self.code)
    }
}

pub mod defaults {
    use super::AuthorityCode;

    /// WGS 84 geographic 2D, latitude first, the reference every accuracy is measured against
    pub const WGS84: AuthorityCode<'static> = AuthorityCode::new("EPSG", "4326");
}
