use std::collections::HashMap;

use savanna_db::{Database, DbError, Result};
use sqlx::{Sqlite, Transaction};

use super::models::{Accommodation, AccommodationInput};

#[derive(Debug, Clone, sqlx::FromRow)]
struct AccommodationRow {
    id: i64,
    name: String,
    location: String,
    rating: f64,
    description: String,
    website: String,
    image_url: Option<String>,
}

impl AccommodationRow {
    fn with_links(self, destination_ids: Vec<i64>) -> Accommodation {
        Accommodation {
            id: self.id,
            name: self.name,
            location: self.location,
            rating: self.rating,
            description: self.description,
            website: self.website,
            image_url: self.image_url,
            destination_ids,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LinkRow {
    accommodation_id: i64,
    destination_id: i64,
}

const SELECT: &str = r#"
    SELECT id, name, location, rating, description, website, image_url
    FROM accommodations
"#;

#[derive(Clone)]
pub struct AccommodationStore {
    db: Database,
}

impl AccommodationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Accommodation>> {
        let rows = sqlx::query_as::<_, AccommodationRow>(&format!("{SELECT} ORDER BY id"))
            .fetch_all(self.db.pool())
            .await?;
        let links = sqlx::query_as::<_, LinkRow>(
            "SELECT accommodation_id, destination_id FROM destination_accommodations \
             ORDER BY accommodation_id, destination_id",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut by_accommodation: HashMap<i64, Vec<i64>> = HashMap::new();
        for link in links {
            by_accommodation
                .entry(link.accommodation_id)
                .or_default()
                .push(link.destination_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let ids = by_accommodation.remove(&row.id).unwrap_or_default();
                row.with_links(ids)
            })
            .collect())
    }

    /// Accommodations linked to one destination, in insertion order.
    pub async fn for_destination(&self, destination_id: i64) -> Result<Vec<Accommodation>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|accommodation| accommodation.serves(destination_id))
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<Accommodation> {
        let row = sqlx::query_as::<_, AccommodationRow>(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|err| DbError::or_not_found(err, || format!("accommodation {id} not found")))?;
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT destination_id FROM destination_accommodations \
             WHERE accommodation_id = ? ORDER BY destination_id",
        )
        .bind(id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(row.with_links(ids))
    }

    /// Requested destination ids that do not exist.
    pub async fn unknown_destinations(&self, ids: &[i64]) -> Result<Vec<i64>> {
        let mut unknown = Vec::new();
        for &id in ids {
            let found = sqlx::query_scalar::<_, i64>("SELECT id FROM destinations WHERE id = ?")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;
            if found.is_none() {
                unknown.push(id);
            }
        }
        Ok(unknown)
    }

    /// Inserts the record and its links in one transaction.
    pub async fn create(&self, input: &AccommodationInput) -> Result<Accommodation> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO accommodations
                (name, location, rating, description, website, image_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.location)
        .bind(input.rating)
        .bind(&input.description)
        .bind(&input.website)
        .bind(input.image_url())
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();
        link(&mut tx, id, &input.destination_ids()).await?;
        tx.commit().await?;

        self.get(id).await
    }

    /// Overwrites the record and replaces its links in one transaction.
    pub async fn update(&self, id: i64, input: &AccommodationInput) -> Result<Accommodation> {
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE accommodations
            SET name = ?, location = ?, rating = ?, description = ?,
                website = ?, image_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.location)
        .bind(input.rating)
        .bind(&input.description)
        .bind(&input.website)
        .bind(input.image_url())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("accommodation {id} not found")));
        }

        sqlx::query("DELETE FROM destination_accommodations WHERE accommodation_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link(&mut tx, id, &input.destination_ids()).await?;
        tx.commit().await?;

        self.get(id).await
    }

    /// Link rows go with the record through the cascading foreign key.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM accommodations WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("accommodation {id} not found")));
        }
        Ok(())
    }
}

async fn link(
    tx: &mut Transaction<'_, Sqlite>,
    accommodation_id: i64,
    destination_ids: &[i64],
) -> Result<()> {
    for &destination_id in destination_ids {
        sqlx::query(
            "INSERT INTO destination_accommodations (destination_id, accommodation_id) VALUES (?, ?)",
        )
        .bind(destination_id)
        .bind(accommodation_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        accommodations::models::sample_lodge,
        destinations::{models::sample_input, DestinationStore},
        test_database,
    };

    async fn two_destinations(db: &Database) -> (i64, i64) {
        let destinations = DestinationStore::new(db.clone());
        let serengeti = destinations.create(&sample_input("Serengeti", "Wildlife")).await.unwrap();
        let zanzibar = destinations.create(&sample_input("Zanzibar", "Beach")).await.unwrap();
        (serengeti.id, zanzibar.id)
    }

    #[tokio::test]
    async fn links_are_stored_and_looked_up_per_destination() {
        let db = test_database().await;
        let (serengeti, zanzibar) = two_destinations(&db).await;
        let store = AccommodationStore::new(db);

        let camp = store.create(&sample_lodge("Kati Kati", vec![serengeti])).await.unwrap();
        let villa = store
            .create(&sample_lodge("Beach Villa", vec![zanzibar, serengeti, zanzibar]))
            .await
            .unwrap();

        assert_eq!(camp.destination_ids, vec![serengeti]);
        assert_eq!(villa.destination_ids, vec![serengeti, zanzibar]);

        let names: Vec<_> = store
            .for_destination(serengeti)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Kati Kati", "Beach Villa"]);
        assert_eq!(store.for_destination(zanzibar).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_links() {
        let db = test_database().await;
        let (serengeti, zanzibar) = two_destinations(&db).await;
        let store = AccommodationStore::new(db);
        let camp = store.create(&sample_lodge("Kati Kati", vec![serengeti])).await.unwrap();

        let mut input = camp.input();
        input.destination_ids = vec![zanzibar];
        let updated = store.update(camp.id, &input).await.unwrap();

        assert_eq!(updated.destination_ids, vec![zanzibar]);
        assert!(store.for_destination(serengeti).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_destination_drops_its_links() {
        let db = test_database().await;
        let (serengeti, zanzibar) = two_destinations(&db).await;
        let store = AccommodationStore::new(db.clone());
        let villa = store
            .create(&sample_lodge("Beach Villa", vec![serengeti, zanzibar]))
            .await
            .unwrap();

        DestinationStore::new(db).delete(serengeti).await.unwrap();

        assert_eq!(store.get(villa.id).await.unwrap().destination_ids, vec![zanzibar]);
    }

    #[tokio::test]
    async fn unknown_destinations_are_reported_and_rejected() {
        let db = test_database().await;
        let (serengeti, _) = two_destinations(&db).await;
        let store = AccommodationStore::new(db);

        assert_eq!(store.unknown_destinations(&[serengeti, 404]).await.unwrap(), vec![404]);
        assert!(store.create(&sample_lodge("Ghost Camp", vec![404])).await.is_err());
        assert!(store.list().await.unwrap().is_empty());
    }
}
