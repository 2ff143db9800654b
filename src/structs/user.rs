use std::fmt::Display;

use super::*;

impl User {
    pub fn new(login: &str, password: &str) -> Result<Self, Error> {
        Ok(Self {
            login: name_to_bytes(login)?,
            password_hash: *blake3::hash(password.as_bytes()).as_bytes(),
            in_use: 1,
        })
    }

    pub fn is_free(&self) -> bool {
        self.in_use == 0
    }

    pub fn login(&self) -> String {
        name_from_bytes(&self.login)
    }

    pub fn password_matches(&self, password: &str) -> bool {
        blake3::hash(password.as_bytes()) == blake3::Hash::from(self.password_hash)
    }
}

impl PermanentIndexed for User {
    const START: u64 = USERS_START;
    const COUNT: usize = NB_USERS;
}

impl Default for User {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "login: {}", self.login())
    }
}
