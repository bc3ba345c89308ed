use std::future::Future;

/// A status control: the last value the server acknowledged, plus the value
/// the operator has picked but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusToggle<T> {
    current: T,
    pending: Option<T>,
}

impl<T: Clone + PartialEq> StatusToggle<T> {
    pub fn new(current: T) -> Self {
        Self {
            current,
            pending: None,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    /// Pick a new value; picking the acknowledged one clears the selection.
    pub fn select(&mut self, value: T) {
        self.pending = (value != self.current).then_some(value);
    }

    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Send the pending value through `mutate`.
    ///
    /// Nothing is sent when no change is pending. `current` only moves to the
    /// value the server returns; a failed call keeps both `current` and the
    /// selection so the operator can retry. Returns whether a call was made.
    pub async fn apply<F, Fut, E>(&mut self, mutate: F) -> Result<bool, E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(next) = self.pending.clone() else {
            return Ok(false);
        };
        let acknowledged = mutate(next).await?;
        self.current = acknowledged;
        self.pending = None;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        bookings::{models::sample_booking, BookingStatus},
        messages::MessageStatus,
        test_support::TestApp,
    };
    use crate::utils::clock;
    use chrono::Days;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn unchanged_selection_sends_nothing() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let mut toggle = StatusToggle::new(MessageStatus::Read);
        toggle.select(MessageStatus::Read);

        let sent = toggle
            .apply(move |status| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(status)
            })
            .await;

        assert_eq!(sent, Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_keeps_the_acknowledged_value() {
        let mut toggle = StatusToggle::new(MessageStatus::Read);
        toggle.select(MessageStatus::Replied);

        let sent = toggle
            .apply(|_| async { Err::<MessageStatus, _>("offline") })
            .await;

        assert_eq!(sent, Err("offline"));
        assert_eq!(toggle.current(), &MessageStatus::Read);
        assert_eq!(toggle.pending(), Some(&MessageStatus::Replied));
    }

    #[tokio::test]
    async fn success_adopts_the_server_value() {
        let app = TestApp::new().await;
        let date = clock::today().checked_add_days(Days::new(14)).unwrap();
        let (_, created) = app
            .post("/bookings", &sample_booking("Amina", "amina@example.com", date))
            .await;
        let uri = format!("/admin/bookings/{}/status", created["data"]["id"]);
        let (app_ref, uri) = (&app, uri.as_str());

        let mut toggle = StatusToggle::new(BookingStatus::Pending);
        toggle.select(BookingStatus::Confirmed);
        assert!(toggle.is_dirty());

        let sent = toggle
            .apply(move |status| async move {
                let (code, body) = app_ref.put(uri, &json!({ "status": status })).await;
                if !code.is_success() {
                    return Err(code);
                }
                body["data"]["status"]
                    .as_str()
                    .and_then(|text| text.parse::<BookingStatus>().ok())
                    .ok_or(code)
            })
            .await;

        assert_eq!(sent, Ok(true));
        assert_eq!(toggle.current(), &BookingStatus::Confirmed);
        assert!(!toggle.is_dirty());
    }
}
