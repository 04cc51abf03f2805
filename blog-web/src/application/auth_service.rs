use crate::data::user_repository::UserRepository;
use crate::domain::{BlogError, CredentialsForm, CurrentUser, User};
use crate::infrastructure::jwt::JwtService;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::SaltString;
use rand_core::OsRng;
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    pub async fn register(&self, form: CredentialsForm) -> Result<User, BlogError> {
        form.validate()
            .map_err(|msg| BlogError::Validation(msg.to_string()))?;

        tracing::debug!("Registering user: {}", form.username);

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(form.password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                BlogError::Internal(format!("Password hashing failed: {}", e))
            })?
            .to_string();

        let user = self.user_repo.create(&form.username, password_hash).await?;

        tracing::info!(
            "User registered successfully: id={}, username={}",
            user.id,
            user.username
        );

        Ok(user)
    }

    /// Verifies the credentials and returns a session token for the user.
    pub async fn login(&self, form: CredentialsForm) -> Result<(String, CurrentUser), BlogError> {
        form.validate()
            .map_err(|msg| BlogError::Validation(msg.to_string()))?;

        let user = match self.user_repo.find_by_username(&form.username).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login failed: unknown user {}", form.username);
                return Err(BlogError::InvalidUsername);
            }
        };

        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            BlogError::Internal(format!("Invalid password hash: {}", e))
        })?;

        if Argon2::default()
            .verify_password(form.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid password for user {}", user.username);
            return Err(BlogError::InvalidPassword);
        }

        let current = CurrentUser::from(&user);
        let token = self.jwt_service.generate_token(&current)?;

        tracing::info!(
            "User logged in successfully: id={}, username={}",
            user.id,
            user.username
        );

        Ok((token, current))
    }

    /// Resolves a session token to the user it was issued for. Tokens that
    /// fail verification, or whose user is no longer in the store under the
    /// same name, yield `None`.
    pub async fn current_user(&self, token: &str) -> Result<Option<CurrentUser>, BlogError> {
        let claimed = match self.jwt_service.verify_token(token) {
            Ok(claimed) => claimed,
            Err(_) => return Ok(None),
        };

        match self.user_repo.find_by_id(claimed.id).await? {
            Some(user) if user.username == claimed.username => Ok(Some(CurrentUser::from(&user))),
            _ => {
                tracing::warn!(
                    "Session token for unknown user: id={}, username={}",
                    claimed.id,
                    claimed.username
                );
                Ok(None)
            }
        }
    }
}
