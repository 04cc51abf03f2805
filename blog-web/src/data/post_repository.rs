use crate::domain::{BlogError, Post, PostForm, PostWithAuthor};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Every post with its author's username, newest first.
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, BlogError>;
    /// Fails with `NotFound` when no post has this id.
    async fn find_by_id(&self, id: i64) -> Result<PostWithAuthor, BlogError>;
    async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post, BlogError>;
    async fn update(&self, id: i64, form: &PostForm) -> Result<(), BlogError>;
    async fn delete(&self, id: i64) -> Result<(), BlogError>;
}

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_with_author(row: &PgRow) -> Result<PostWithAuthor, sqlx::Error> {
    Ok(PostWithAuthor {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        created: row.try_get("created")?,
        author_id: row.try_get("author_id")?,
        username: row.try_get("username")?,
    })
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, BlogError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.title, p.body, p.created, p.author_id, u.username
            FROM posts p
            JOIN users u ON p.author_id = u.id
            ORDER BY p.created DESC, p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {}", e);
            BlogError::from(e)
        })?;

        let posts = rows
            .iter()
            .map(post_with_author)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<PostWithAuthor, BlogError> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.title, p.body, p.created, p.author_id, u.username
            FROM posts p
            JOIN users u ON p.author_id = u.id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(post_with_author(&row)?),
            None => Err(BlogError::NotFound(id)),
        }
    }

    async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post, BlogError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO posts (title, body, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, body, created, author_id
            "#,
        )
        .bind(&form.title)
        .bind(&form.body)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {}", e);
            BlogError::from(e)
        })?;

        let post = Post {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            created: row.try_get("created")?,
            author_id: row.try_get("author_id")?,
        };

        tx.commit().await?;

        Ok(post)
    }

    async fn update(&self, id: i64, form: &PostForm) -> Result<(), BlogError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, body = $2
            WHERE id = $3
            "#,
        )
        .bind(&form.title)
        .bind(&form.body)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post {}: {}", id, e);
            BlogError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(BlogError::NotFound(id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), BlogError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete post {}: {}", id, e);
            BlogError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(BlogError::NotFound(id));
        }

        tx.commit().await?;
        Ok(())
    }
}

// These run against a throwaway database created by `sqlx::test` from
// DATABASE_URL: `cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::user_repository::{PostgresUserRepository, UserRepository};

    fn form(title: &str, body: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    async fn author(pool: &PgPool, username: &str) -> i64 {
        PostgresUserRepository::new(pool.clone())
            .create(username, "hash".to_string())
            .await
            .unwrap()
            .id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at Postgres"]
    async fn created_post_is_committed_with_its_author(pool: PgPool) {
        let alice = author(&pool, "alice").await;
        let repo = PostgresPostRepository::new(pool.clone());

        let post = repo.create(alice, &form("Hello", "World")).await.unwrap();
        assert_eq!(post.author_id, alice);

        let found = repo.find_by_id(post.id).await.unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.title, "Hello");
        assert_eq!(found.body, "World");

        let stored: String = sqlx::query_scalar("SELECT title FROM posts WHERE id = $1")
            .bind(post.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, "Hello");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at Postgres"]
    async fn listing_orders_by_created_then_id(pool: PgPool) {
        let alice = author(&pool, "alice").await;
        let bob = author(&pool, "bob").await;

        for (author_id, title, created) in [
            (alice, "old", "2024-01-01T00:00:00Z"),
            (bob, "tie-a", "2024-02-01T00:00:00Z"),
            (alice, "tie-b", "2024-02-01T00:00:00Z"),
        ] {
            sqlx::query(
                "INSERT INTO posts (author_id, title, body, created) VALUES ($1, $2, '', $3::timestamptz)",
            )
            .bind(author_id)
            .bind(title)
            .bind(created)
            .execute(&pool)
            .await
            .unwrap();
        }

        let posts = PostgresPostRepository::new(pool)
            .list_with_authors()
            .await
            .unwrap();
        let listed: Vec<_> = posts
            .iter()
            .map(|p| (p.title.as_str(), p.username.as_str()))
            .collect();
        assert_eq!(
            listed,
            [("tie-b", "alice"), ("tie-a", "bob"), ("old", "alice")]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at Postgres"]
    async fn update_and_delete_are_committed(pool: PgPool) {
        let alice = author(&pool, "alice").await;
        let repo = PostgresPostRepository::new(pool.clone());
        let post = repo.create(alice, &form("Hello", "")).await.unwrap();

        repo.update(post.id, &form("Edited", "text")).await.unwrap();
        let found = repo.find_by_id(post.id).await.unwrap();
        assert_eq!((found.title.as_str(), found.body.as_str()), ("Edited", "text"));

        repo.delete(post.id).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at Postgres"]
    async fn missing_posts_are_not_found(pool: PgPool) {
        let repo = PostgresPostRepository::new(pool);

        assert!(matches!(repo.find_by_id(7).await, Err(BlogError::NotFound(7))));
        assert!(matches!(
            repo.update(7, &form("x", "")).await,
            Err(BlogError::NotFound(7))
        ));
        assert!(matches!(repo.delete(7).await, Err(BlogError::NotFound(7))));
    }
}
