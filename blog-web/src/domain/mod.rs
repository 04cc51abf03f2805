pub mod error;
pub mod post;
pub mod user;

pub use error::BlogError;
pub use post::{Post, PostForm, PostWithAuthor};
pub use user::{CredentialsForm, CurrentUser, User};
