use crate::data::post_repository::PostRepository;
use crate::domain::{BlogError, CurrentUser, Post, PostForm, PostWithAuthor};
use std::sync::Arc;

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
}

impl BlogService {
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>) -> Self {
        Self { post_repo }
    }

    pub async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, BlogError> {
        self.post_repo.list_with_authors().await
    }

    /// Loads a post for `user`. With `check_author`, anyone other than the
    /// author gets `Forbidden`.
    pub async fn get_post(
        &self,
        id: i64,
        user: &CurrentUser,
        check_author: bool,
    ) -> Result<PostWithAuthor, BlogError> {
        let post = self.post_repo.find_by_id(id).await?;

        if check_author && post.author_id != user.id {
            tracing::warn!(
                "User {} attempted to access post {} owned by {}",
                user.id,
                id,
                post.author_id
            );
            return Err(BlogError::Forbidden);
        }

        Ok(post)
    }

    pub async fn create_post(
        &self,
        author: &CurrentUser,
        form: PostForm,
    ) -> Result<Post, BlogError> {
        form.validate()
            .map_err(|msg| BlogError::Validation(msg.to_string()))?;

        let post = self.post_repo.create(author.id, &form).await?;

        tracing::info!("Post created: id={}, author_id={}", post.id, author.id);

        Ok(post)
    }

    /// Applies `form` to a post already returned by [`Self::get_post`].
    pub async fn update_post(
        &self,
        post: &PostWithAuthor,
        form: PostForm,
    ) -> Result<(), BlogError> {
        form.validate()
            .map_err(|msg| BlogError::Validation(msg.to_string()))?;

        self.post_repo.update(post.id, &form).await?;

        tracing::info!("Post updated: id={}, author_id={}", post.id, post.author_id);

        Ok(())
    }

    pub async fn delete_post(&self, id: i64, user: &CurrentUser) -> Result<(), BlogError> {
        self.get_post(id, user, true).await?;

        self.post_repo.delete(id).await?;

        tracing::info!("Post deleted: id={}, author_id={}", id, user.id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{InMemoryStore, UserRepository};

    struct Fixture {
        service: BlogService,
        alice: CurrentUser,
        bob: CurrentUser,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let alice = UserRepository::create(&*store, "alice", "hash".to_string())
            .await
            .unwrap();
        let bob = UserRepository::create(&*store, "bob", "hash".to_string())
            .await
            .unwrap();

        Fixture {
            service: BlogService::new(store),
            alice: CurrentUser::from(&alice),
            bob: CurrentUser::from(&bob),
        }
    }

    fn form(title: &str, body: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[actix_rt::test]
    async fn author_can_look_up_own_post() {
        let f = fixture().await;
        let post = f.service.create_post(&f.alice, form("Hello", "World")).await.unwrap();

        let found = f.service.get_post(post.id, &f.alice, true).await.unwrap();
        assert_eq!(found.id, post.id);
        assert_eq!(found.username, "alice");
    }

    #[actix_rt::test]
    async fn other_users_are_forbidden() {
        let f = fixture().await;
        let post = f.service.create_post(&f.alice, form("Hello", "World")).await.unwrap();

        let err = f.service.get_post(post.id, &f.bob, true).await.unwrap_err();
        assert!(matches!(err, BlogError::Forbidden));

        // Existence-only lookups skip the ownership check.
        let found = f.service.get_post(post.id, &f.bob, false).await.unwrap();
        assert_eq!(found.author_id, f.alice.id);
    }

    #[actix_rt::test]
    async fn missing_post_is_not_found_for_everyone() {
        let f = fixture().await;

        for user in [&f.alice, &f.bob] {
            let err = f.service.get_post(99, user, true).await.unwrap_err();
            assert!(matches!(err, BlogError::NotFound(99)));
            assert_eq!(err.to_string(), "Post id 99 doesn't exist.");
        }
    }

    #[actix_rt::test]
    async fn empty_title_is_not_persisted() {
        let f = fixture().await;

        let err = f.service.create_post(&f.alice, form("", "body")).await.unwrap_err();
        assert!(matches!(&err, BlogError::Validation(msg) if msg == "Title is required."));
        assert!(f.service.list_posts().await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn update_changes_only_title_and_body() {
        let f = fixture().await;
        let created = f.service.create_post(&f.alice, form("Hello", "World")).await.unwrap();
        let post = f.service.get_post(created.id, &f.alice, true).await.unwrap();

        f.service.update_post(&post, form("Hi", "There")).await.unwrap();

        let updated = f.service.get_post(created.id, &f.alice, true).await.unwrap();
        assert_eq!(updated.title, "Hi");
        assert_eq!(updated.body, "There");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.author_id, created.author_id);
        assert_eq!(updated.created, created.created);
    }

    #[actix_rt::test]
    async fn invalid_update_leaves_post_unchanged() {
        let f = fixture().await;
        let created = f.service.create_post(&f.alice, form("Hello", "World")).await.unwrap();
        let post = f.service.get_post(created.id, &f.alice, true).await.unwrap();

        let err = f.service.update_post(&post, form("", "ignored")).await.unwrap_err();
        assert!(matches!(err, BlogError::Validation(_)));

        let unchanged = f.service.get_post(created.id, &f.alice, true).await.unwrap();
        assert_eq!(unchanged, post);
    }

    #[actix_rt::test]
    async fn only_the_author_can_delete() {
        let f = fixture().await;
        let post = f.service.create_post(&f.alice, form("Hello", "World")).await.unwrap();

        let err = f.service.delete_post(post.id, &f.bob).await.unwrap_err();
        assert!(matches!(err, BlogError::Forbidden));
        assert_eq!(f.service.list_posts().await.unwrap().len(), 1);

        f.service.delete_post(post.id, &f.alice).await.unwrap();
        assert!(f.service.list_posts().await.unwrap().is_empty());

        let err = f.service.get_post(post.id, &f.alice, true).await.unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));
    }
}
