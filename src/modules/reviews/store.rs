use savanna_db::{Database, DbError, Result};

use super::models::{NewReview, Review};
use crate::utils::clock;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    name: String,
    email: String,
    rating: i64,
    review: String,
    is_featured: bool,
    created_at: String,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DbError;

    fn try_from(row: ReviewRow) -> Result<Self> {
        Ok(Review {
            id: row.id,
            name: row.name,
            email: row.email,
            rating: row.rating,
            review: row.review,
            is_featured: row.is_featured,
            created_at: clock::parse_timestamp("created_at", &row.created_at)?,
        })
    }
}

const SELECT: &str = r#"
    SELECT id, name, email, rating, review, is_featured, created_at
    FROM reviews
"#;

#[derive(Clone)]
pub struct ReviewStore {
    db: Database,
}

impl ReviewStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Review>> {
        self.fetch(&format!("{SELECT} ORDER BY id")).await
    }

    pub async fn featured(&self) -> Result<Vec<Review>> {
        self.fetch(&format!("{SELECT} WHERE is_featured = 1 ORDER BY id"))
            .await
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(sql)
            .fetch_all(self.db.pool())
            .await?;
        rows.into_iter().map(Review::try_from).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|err| DbError::or_not_found(err, || format!("review {id} not found")))?;
        row.try_into()
    }

    /// Submitted reviews start out unfeatured.
    pub async fn create(&self, review: &NewReview) -> Result<Review> {
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (name, email, rating, review, is_featured, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(review.name.trim())
        .bind(review.email.trim())
        .bind(review.rating)
        .bind(review.review.trim())
        .bind(clock::now_text())
        .execute(self.db.pool())
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    /// Writes the featured flag and nothing else.
    pub async fn set_featured(&self, id: i64, is_featured: bool) -> Result<Review> {
        let result = sqlx::query("UPDATE reviews SET is_featured = ? WHERE id = ?")
            .bind(is_featured)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("review {id} not found")));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("review {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{reviews::models::sample_review, test_database};

    #[tokio::test]
    async fn featuring_changes_only_the_flag() {
        let store = ReviewStore::new(test_database().await);
        let review = store.create(&sample_review("Ines", 5)).await.unwrap();
        assert!(!review.is_featured);

        let featured = store.set_featured(review.id, true).await.unwrap();
        assert_eq!(featured, Review { is_featured: true, ..review.clone() });

        let unfeatured = store.set_featured(review.id, false).await.unwrap();
        assert_eq!(unfeatured, review);
    }

    #[tokio::test]
    async fn featured_lists_flagged_reviews_only() {
        let store = ReviewStore::new(test_database().await);
        let ines = store.create(&sample_review("Ines", 5)).await.unwrap();
        store.create(&sample_review("Tomas", 4)).await.unwrap();
        store.set_featured(ines.id, true).await.unwrap();

        let featured = store.featured().await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].name, "Ines");
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_review_is_not_found() {
        let store = ReviewStore::new(test_database().await);
        assert!(matches!(store.set_featured(3, true).await, Err(DbError::NotFound(_))));
        assert!(matches!(store.delete(3).await, Err(DbError::NotFound(_))));
    }
}
