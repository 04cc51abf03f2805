//! In-memory repositories - used when `DATABASE_URL` is not configured.
//!
//! Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::{BlogError, Post, PostForm, PostWithAuthor, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    next_user_id: i64,
    next_post_id: i64,
}

impl Tables {
    fn joined(&self, post: &Post) -> Result<PostWithAuthor, BlogError> {
        let author = self.users.get(&post.author_id).ok_or_else(|| {
            BlogError::Internal(format!(
                "post {} references missing user {}",
                post.id, post.author_id
            ))
        })?;
        Ok(PostWithAuthor::from_post(post.clone(), author.username.clone()))
    }
}

/// Users and posts behind a single lock so the author join sees a
/// consistent snapshot.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, BlogError> {
        let tables = self.tables.read().await;

        let mut posts = tables
            .posts
            .values()
            .map(|post| tables.joined(post))
            .collect::<Result<Vec<_>, _>>()?;
        posts.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));

        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<PostWithAuthor, BlogError> {
        let tables = self.tables.read().await;
        match tables.posts.get(&id) {
            Some(post) => tables.joined(post),
            None => Err(BlogError::NotFound(id)),
        }
    }

    async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post, BlogError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&author_id) {
            return Err(BlogError::Database(format!(
                "author {} does not exist",
                author_id
            )));
        }

        tables.next_post_id += 1;
        let post = Post {
            id: tables.next_post_id,
            title: form.title.clone(),
            body: form.body.clone(),
            created: Utc::now(),
            author_id,
        };
        tables.posts.insert(post.id, post.clone());

        Ok(post)
    }

    async fn update(&self, id: i64, form: &PostForm) -> Result<(), BlogError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(BlogError::NotFound(id))?;

        post.title = form.title.clone();
        post.body = form.body.clone();

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), BlogError> {
        let mut tables = self.tables.write().await;
        tables
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(BlogError::NotFound(id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, username: &str, password_hash: String) -> Result<User, BlogError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == username) {
            return Err(BlogError::UserAlreadyExists(username.to_string()));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password_hash,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BlogError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, BlogError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, body: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[actix_rt::test]
    async fn posts_are_joined_with_their_author() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, "alice", "hash".to_string())
            .await
            .unwrap();

        let post = PostRepository::create(&store, user.id, &form("Hello", "World"))
            .await
            .unwrap();

        let found = PostRepository::find_by_id(&store, post.id).await.unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.author_id, user.id);
        assert_eq!(found.title, "Hello");
    }

    #[actix_rt::test]
    async fn listing_is_newest_first() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, "alice", "hash".to_string())
            .await
            .unwrap();

        for title in ["first", "second", "third"] {
            PostRepository::create(&store, user.id, &form(title, ""))
                .await
                .unwrap();
        }

        let posts = store.list_with_authors().await.unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);
        assert!(posts.windows(2).all(|w| w[0].created >= w[1].created));
    }

    #[actix_rt::test]
    async fn duplicate_usernames_are_rejected() {
        let store = InMemoryStore::new();
        UserRepository::create(&store, "alice", "hash".to_string())
            .await
            .unwrap();

        let err = UserRepository::create(&store, "alice", "other".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::UserAlreadyExists(name) if name == "alice"));
    }

    #[actix_rt::test]
    async fn users_are_found_by_id() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, "alice", "hash".to_string())
            .await
            .unwrap();

        let found = UserRepository::find_by_id(&store, user.id).await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("alice".to_string()));
        assert!(UserRepository::find_by_id(&store, 99)
            .await
            .unwrap()
            .is_none());
    }

    #[actix_rt::test]
    async fn missing_posts_are_not_found() {
        let store = InMemoryStore::new();

        assert!(matches!(
            PostRepository::find_by_id(&store, 7).await,
            Err(BlogError::NotFound(7))
        ));
        assert!(matches!(
            store.update(7, &form("x", "")).await,
            Err(BlogError::NotFound(7))
        ));
        assert!(matches!(store.delete(7).await, Err(BlogError::NotFound(7))));
    }
}
