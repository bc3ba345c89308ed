use savanna_db::{Database, DbError, Result};

use super::models::{BlogPost, BlogPostInput, PostTags};
use crate::utils::clock;

#[derive(Debug, Clone, sqlx::FromRow)]
struct BlogPostRow {
    id: i64,
    title: String,
    excerpt: String,
    content: String,
    category: String,
    author: String,
    read_time: String,
    status: String,
    image_url: Option<String>,
    tags: String,
    created_at: String,
}

impl TryFrom<BlogPostRow> for BlogPost {
    type Error = DbError;

    fn try_from(row: BlogPostRow) -> Result<Self> {
        let tags: Vec<String> = serde_json::from_str(&row.tags)
            .map_err(|err| DbError::InvalidData(format!("blog post {} tags: {err}", row.id)))?;

        Ok(BlogPost {
            id: row.id,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            category: row.category,
            author: row.author,
            read_time: row.read_time,
            status: row.status.parse()?,
            image_url: row.image_url,
            tags: PostTags::new(tags),
            created_at: clock::parse_timestamp("created_at", &row.created_at)?,
        })
    }
}

const SELECT: &str = r#"
    SELECT id, title, excerpt, content, category, author, read_time,
           status, image_url, tags, created_at
    FROM blog_posts
"#;

fn encode_tags(tags: &PostTags) -> Result<String> {
    serde_json::to_string(tags.as_slice()).map_err(|err| DbError::InvalidData(format!("tags: {err}")))
}

#[derive(Clone)]
pub struct BlogStore {
    db: Database,
}

impl BlogStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<BlogPost>> {
        let rows = sqlx::query_as::<_, BlogPostRow>(&format!("{SELECT} ORDER BY id"))
            .fetch_all(self.db.pool())
            .await?;
        rows.into_iter().map(BlogPost::try_from).collect()
    }

    pub async fn get(&self, id: i64) -> Result<BlogPost> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|err| DbError::or_not_found(err, || format!("blog post {id} not found")))?;
        row.try_into()
    }

    pub async fn create(&self, input: &BlogPostInput) -> Result<BlogPost> {
        let result = sqlx::query(
            r#"
            INSERT INTO blog_posts
                (title, excerpt, content, category, author, read_time,
                 status, image_url, tags, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&input.category)
        .bind(&input.author)
        .bind(input.read_time())
        .bind(input.status.as_str())
        .bind(input.image_url())
        .bind(encode_tags(&input.tags)?)
        .bind(clock::now_text())
        .execute(self.db.pool())
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn update(&self, id: i64, input: &BlogPostInput) -> Result<BlogPost> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts
            SET title = ?, excerpt = ?, content = ?, category = ?, author = ?,
                read_time = ?, status = ?, image_url = ?, tags = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&input.category)
        .bind(&input.author)
        .bind(input.read_time())
        .bind(input.status.as_str())
        .bind(input.image_url())
        .bind(encode_tags(&input.tags)?)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("blog post {id} not found")));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("blog post {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        blog::models::{sample_post, PostStatus},
        test_database,
    };

    #[tokio::test]
    async fn create_fills_read_time_and_keeps_tags() {
        let store = BlogStore::new(test_database().await);
        let post = store
            .create(&sample_post("Great Migration", PostStatus::Published))
            .await
            .unwrap();

        assert_eq!(post.read_time, "1 min read");
        assert_eq!(post.tags, PostTags::new(["migration", "serengeti"]));
        assert_eq!(post.image_url, None);
        assert_eq!(store.get(post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn update_keeps_id_and_created_at() {
        let store = BlogStore::new(test_database().await);
        let post = store
            .create(&sample_post("Great Migration", PostStatus::Draft))
            .await
            .unwrap();

        let mut input = post.input();
        input.status = PostStatus::Published;
        input.image_url = Some("/images/blog/mara.jpg".into());
        let updated = store.update(post.id, &input).await.unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(updated.status, PostStatus::Published);
        assert_eq!(updated.image_url.as_deref(), Some("/images/blog/mara.jpg"));
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let store = BlogStore::new(test_database().await);
        assert!(matches!(store.get(7).await, Err(DbError::NotFound(_))));
        assert!(matches!(store.delete(7).await, Err(DbError::NotFound(_))));
    }
}
