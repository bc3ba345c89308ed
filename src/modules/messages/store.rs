use savanna_db::{Database, DbError, Result};

use super::models::{Message, MessageStatus, NewMessage};
use crate::utils::clock;

#[derive(Debug, Clone, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    name: String,
    email: String,
    contact_number: Option<String>,
    adults: i64,
    children: i64,
    subject: String,
    message: String,
    status: String,
    created_at: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = DbError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: row.id,
            name: row.name,
            email: row.email,
            contact_number: row.contact_number,
            adults: row.adults,
            children: row.children,
            subject: row.subject,
            message: row.message,
            status: row.status.parse()?,
            created_at: clock::parse_timestamp("created_at", &row.created_at)?,
        })
    }
}

const SELECT: &str = r#"
    SELECT id, name, email, contact_number, adults, children, subject,
           message, status, created_at
    FROM messages
"#;

#[derive(Clone)]
pub struct MessageStore {
    db: Database,
}

impl MessageStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!("{SELECT} ORDER BY id"))
            .fetch_all(self.db.pool())
            .await?;
        rows.into_iter().map(Message::try_from).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Message> {
        let row = sqlx::query_as::<_, MessageRow>(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|err| DbError::or_not_found(err, || format!("message {id} not found")))?;
        row.try_into()
    }

    /// New messages start out unread.
    pub async fn create(&self, message: &NewMessage) -> Result<Message> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages
                (name, email, contact_number, adults, children, subject,
                 message, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.name.trim())
        .bind(message.email.trim())
        .bind(message.contact_number())
        .bind(message.adults)
        .bind(message.children)
        .bind(message.subject.trim())
        .bind(&message.message)
        .bind(MessageStatus::Unread.as_str())
        .bind(clock::now_text())
        .execute(self.db.pool())
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    /// Fetch a message for display, advancing `unread` to `read`.
    ///
    /// The update is conditional on the stored status, so of any number of
    /// opens only the first reports a transition.
    pub async fn open(&self, id: i64) -> Result<(Message, bool)> {
        let result = sqlx::query("UPDATE messages SET status = ? WHERE id = ? AND status = ?")
            .bind(MessageStatus::Read.as_str())
            .bind(id)
            .bind(MessageStatus::Unread.as_str())
            .execute(self.db.pool())
            .await?;
        let message = self.get(id).await?;
        Ok((message, result.rows_affected() == 1))
    }

    pub async fn set_status(&self, id: i64, status: MessageStatus) -> Result<Message> {
        let result = sqlx::query("UPDATE messages SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("message {id} not found")));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("message {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{messages::models::sample_message, test_database};

    #[tokio::test]
    async fn first_open_reads_and_later_opens_do_not() {
        let store = MessageStore::new(test_database().await);
        let message = store
            .create(&sample_message("Oliver", "Family safari"))
            .await
            .unwrap();
        assert_eq!(message.status, MessageStatus::Unread);

        let (opened, transitioned) = store.open(message.id).await.unwrap();
        assert!(transitioned);
        assert_eq!(opened.status, MessageStatus::Read);

        let (opened, transitioned) = store.open(message.id).await.unwrap();
        assert!(!transitioned);
        assert_eq!(opened.status, MessageStatus::Read);
    }

    #[tokio::test]
    async fn opening_a_replied_message_leaves_it_replied() {
        let store = MessageStore::new(test_database().await);
        let message = store
            .create(&sample_message("Oliver", "Family safari"))
            .await
            .unwrap();
        store.set_status(message.id, MessageStatus::Replied).await.unwrap();

        let (opened, transitioned) = store.open(message.id).await.unwrap();
        assert!(!transitioned);
        assert_eq!(opened.status, MessageStatus::Replied);
    }

    #[tokio::test]
    async fn opening_a_missing_message_is_not_found() {
        let store = MessageStore::new(test_database().await);
        assert!(matches!(store.open(12).await, Err(DbError::NotFound(_))));
        assert!(matches!(store.delete(12).await, Err(DbError::NotFound(_))));
    }
}
