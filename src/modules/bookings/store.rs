use savanna_db::{Database, DbError, Result};

use super::models::{Booking, BookingStatus, NewBooking};
use crate::utils::clock;

#[derive(Debug, Clone, sqlx::FromRow)]
struct BookingRow {
    id: i64,
    destination_id: Option<i64>,
    destination_name: Option<String>,
    name: String,
    email: String,
    phone: String,
    country: String,
    travel_date: String,
    group_size: i64,
    special_requests: Option<String>,
    status: String,
    created_at: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DbError;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(Booking {
            id: row.id,
            destination_id: row.destination_id,
            destination_name: row.destination_name,
            name: row.name,
            email: row.email,
            phone: row.phone,
            country: row.country,
            travel_date: clock::parse_date("travel_date", &row.travel_date)?,
            group_size: row.group_size,
            special_requests: row.special_requests,
            status: row.status.parse()?,
            created_at: clock::parse_timestamp("created_at", &row.created_at)?,
        })
    }
}

// Weak reference: a deleted destination leaves destination_name NULL.
const SELECT: &str = r#"
    SELECT b.id, b.destination_id, d.name AS destination_name, b.name, b.email,
           b.phone, b.country, b.travel_date, b.group_size, b.special_requests,
           b.status, b.created_at
    FROM bookings b
    LEFT JOIN destinations d ON d.id = b.destination_id
"#;

#[derive(Clone)]
pub struct BookingStore {
    db: Database,
}

impl BookingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!("{SELECT} ORDER BY b.id"))
            .fetch_all(self.db.pool())
            .await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{SELECT} WHERE b.id = ?"))
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|err| DbError::or_not_found(err, || format!("booking {id} not found")))?;
        row.try_into()
    }

    /// Store a validated submission; new bookings start out pending.
    pub async fn create(&self, booking: &NewBooking) -> Result<Booking> {
        let travel_date = booking
            .travel_date
            .ok_or_else(|| DbError::InvalidData("booking without travel_date".to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO bookings
                (destination_id, name, email, phone, country, travel_date,
                 group_size, special_requests, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.destination_id)
        .bind(booking.name.trim())
        .bind(booking.email.trim())
        .bind(booking.phone.trim())
        .bind(booking.country.trim())
        .bind(travel_date.format("%Y-%m-%d").to_string())
        .bind(booking.group_size)
        .bind(booking.special_requests())
        .bind(BookingStatus::Pending.as_str())
        .bind(clock::now_text())
        .execute(self.db.pool())
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    /// Plain overwrite, any status may follow any other.
    pub async fn set_status(&self, id: i64, status: BookingStatus) -> Result<Booking> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("booking {id} not found")));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("booking {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        bookings::models::sample_booking,
        destinations::{models::sample_input, DestinationStore},
        test_database,
    };
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 7, 14).unwrap()
    }

    #[tokio::test]
    async fn new_booking_is_pending_and_keeps_fields() {
        let store = BookingStore::new(test_database().await);
        let mut submitted = sample_booking("Amina", "amina@example.com", date());
        submitted.special_requests = Some("Window seat on the flight".into());

        let booking = store.create(&submitted).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.travel_date, date());
        assert_eq!(booking.group_size, 2);
        assert_eq!(booking.special_requests.as_deref(), Some("Window seat on the flight"));
        assert_eq!(booking.destination_name, None);
    }

    #[tokio::test]
    async fn destination_name_follows_weak_reference() {
        let db = test_database().await;
        let destinations = DestinationStore::new(db.clone());
        let store = BookingStore::new(db);
        let serengeti = destinations
            .create(&sample_input("Serengeti", "Wildlife"))
            .await
            .unwrap();

        let mut submitted = sample_booking("Amina", "amina@example.com", date());
        submitted.destination_id = Some(serengeti.id);
        let booking = store.create(&submitted).await.unwrap();
        assert_eq!(booking.destination_name.as_deref(), Some("Serengeti"));

        destinations.delete(serengeti.id).await.unwrap();
        let booking = store.get(booking.id).await.unwrap();
        assert_eq!(booking.destination_id, Some(serengeti.id));
        assert_eq!(booking.destination_name, None);
    }

    #[tokio::test]
    async fn status_is_a_plain_overwrite() {
        let store = BookingStore::new(test_database().await);
        let booking = store
            .create(&sample_booking("Amina", "amina@example.com", date()))
            .await
            .unwrap();

        let cancelled = store
            .set_status(booking.id, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let pending = store
            .set_status(booking.id, BookingStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.status, BookingStatus::Pending);
        assert_eq!(pending.created_at, booking.created_at);
    }

    #[tokio::test]
    async fn missing_booking_is_not_found() {
        let store = BookingStore::new(test_database().await);
        assert!(matches!(
            store.set_status(99, BookingStatus::Confirmed).await,
            Err(DbError::NotFound(_))
        ));
        assert!(matches!(store.delete(99).await, Err(DbError::NotFound(_))));
    }
}
