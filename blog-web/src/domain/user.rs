use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// The authenticated user acting on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Fields submitted by the register and login forms.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

impl CredentialsForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.is_empty() {
            return Err("Username is required.");
        }
        if self.password.is_empty() {
            return Err("Password is required.");
        }
        Ok(())
    }
}
