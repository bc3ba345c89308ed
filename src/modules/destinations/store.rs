use savanna_db::{Database, DbError, Result};

use super::models::{Destination, DestinationInput, TourTags};
use crate::utils::clock;

#[derive(Debug, Clone, sqlx::FromRow)]
struct DestinationRow {
    id: i64,
    name: String,
    location: String,
    kind: String,
    category: String,
    tour: String,
    description: String,
    info: String,
    rating: f64,
    duration: String,
    group_size: String,
    status: String,
    image: String,
}

impl TryFrom<DestinationRow> for Destination {
    type Error = DbError;

    fn try_from(row: DestinationRow) -> Result<Self> {
        let tour: TourTags = serde_json::from_str(&row.tour)
            .map_err(|err| DbError::InvalidData(format!("destination {} tour: {err}", row.id)))?;

        Ok(Destination {
            id: row.id,
            name: row.name,
            location: row.location,
            kind: row.kind,
            category: row.category,
            tour,
            description: row.description,
            info: row.info,
            rating: row.rating,
            duration: row.duration,
            group_size: row.group_size,
            status: row.status.parse()?,
            image: row.image,
        })
    }
}

const SELECT: &str = r#"
    SELECT id, name, location, kind, category, tour, description, info,
           rating, duration, group_size, status, image
    FROM destinations
"#;

fn encode_tour(tour: &TourTags) -> Result<String> {
    serde_json::to_string(tour).map_err(|err| DbError::InvalidData(format!("tour: {err}")))
}

#[derive(Clone)]
pub struct DestinationStore {
    db: Database,
}

impl DestinationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Destination>> {
        let rows = sqlx::query_as::<_, DestinationRow>(&format!("{SELECT} ORDER BY id"))
            .fetch_all(self.db.pool())
            .await?;
        rows.into_iter().map(Destination::try_from).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Destination> {
        let row = sqlx::query_as::<_, DestinationRow>(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|err| DbError::or_not_found(err, || format!("destination {id} not found")))?;
        row.try_into()
    }

    pub async fn create(&self, input: &DestinationInput) -> Result<Destination> {
        let result = sqlx::query(
            r#"
            INSERT INTO destinations
                (name, location, kind, category, tour, description, info,
                 rating, duration, group_size, status, image, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.kind)
        .bind(&input.category)
        .bind(encode_tour(&input.tour)?)
        .bind(&input.description)
        .bind(&input.info)
        .bind(input.rating)
        .bind(&input.duration)
        .bind(&input.group_size)
        .bind(input.status.as_str())
        .bind(&input.image)
        .bind(clock::now_text())
        .execute(self.db.pool())
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    /// Overwrite every editable column; `id` never changes.
    pub async fn update(&self, id: i64, input: &DestinationInput) -> Result<Destination> {
        let result = sqlx::query(
            r#"
            UPDATE destinations
            SET name = ?, location = ?, kind = ?, category = ?, tour = ?,
                description = ?, info = ?, rating = ?, duration = ?,
                group_size = ?, status = ?, image = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.kind)
        .bind(&input.category)
        .bind(encode_tour(&input.tour)?)
        .bind(&input.description)
        .bind(&input.info)
        .bind(input.rating)
        .bind(&input.duration)
        .bind(&input.group_size)
        .bind(input.status.as_str())
        .bind(&input.image)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("destination {id} not found")));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM destinations WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("destination {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        destinations::models::{sample_input, DestinationStatus},
        test_database,
    };
    use crate::utils::filter::ListFilter;

    #[tokio::test]
    async fn create_then_get_preserves_fields() {
        let store = DestinationStore::new(test_database().await);
        let mut input = sample_input("Serengeti", "Wildlife");
        input.tour = TourTags::One("Great Migration".into());
        input.rating = 4.85;

        let created = store.create(&input).await.unwrap();
        let fetched = store.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.input(), input);
        assert_eq!(fetched.rating, 4.85);
        assert_eq!(fetched.tour, TourTags::One("Great Migration".into()));
    }

    #[tokio::test]
    async fn list_is_in_insertion_order() {
        let store = DestinationStore::new(test_database().await);
        for name in ["Serengeti", "Zanzibar", "Kilimanjaro"] {
            store.create(&sample_input(name, "Wildlife")).await.unwrap();
        }

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Serengeti", "Zanzibar", "Kilimanjaro"]);
    }

    #[tokio::test]
    async fn category_filter_returns_only_exact_matches() {
        let store = DestinationStore::new(test_database().await);
        store.create(&sample_input("Serengeti", "Wildlife")).await.unwrap();
        store.create(&sample_input("Zanzibar", "Beach")).await.unwrap();
        store.create(&sample_input("Tarangire", "Wildlife")).await.unwrap();

        let hits = ListFilter::default()
            .category("Wildlife")
            .apply(store.list().await.unwrap());
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|d| d.category == "Wildlife"));

        let none = ListFilter::default()
            .category("wildlife")
            .apply(store.list().await.unwrap());
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_id() {
        let store = DestinationStore::new(test_database().await);
        let created = store
            .create(&sample_input("Ruaha", "Wildlife"))
            .await
            .unwrap();

        let mut input = created.input();
        input.status = DestinationStatus::Inactive;
        let updated = store.update(created.id, &input).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status, DestinationStatus::Inactive);
    }

    #[tokio::test]
    async fn delete_removes_from_list_and_missing_is_not_found() {
        let store = DestinationStore::new(test_database().await);
        let kept = store.create(&sample_input("Ruaha", "Wildlife")).await.unwrap();
        let gone = store.create(&sample_input("Mikumi", "Wildlife")).await.unwrap();

        store.delete(gone.id).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![kept.id]);
        assert!(matches!(
            store.delete(gone.id).await,
            Err(DbError::NotFound(_))
        ));
        assert!(matches!(store.get(gone.id).await, Err(DbError::NotFound(_))));
    }
}
