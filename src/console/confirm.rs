use std::future::Future;

use serde::Serialize;

/// Confirmation step in front of a destructive action.
///
/// The prompt is consumed by whichever answer it gets, so it can run its
/// action at most once and is closed afterwards whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub danger: bool,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
            danger: false,
        }
    }

    /// Standard prompt for deleting one record, e.g. `delete("destination", "Serengeti")`.
    pub fn delete(resource: &str, name: &str) -> Self {
        Self::new(
            format!("Delete {resource}"),
            format!("Are you sure you want to delete \"{name}\"? This action cannot be undone."),
        )
        .labels("Delete", "Cancel")
        .danger()
    }

    pub fn labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    /// Run the gated action once and hand back its outcome.
    pub async fn confirm<F, Fut, T, E>(self, action: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        tracing::debug!(title = %self.title, "confirmed");
        action().await
    }

    /// Dismiss without running anything.
    pub fn cancel(self) {
        tracing::debug!(title = %self.title, "cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{destinations::models::sample_input, test_support::TestApp};
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn delete_prompt_is_dangerous_and_names_the_record() {
        let prompt = ConfirmPrompt::delete("destination", "Serengeti");
        assert_eq!(prompt.title, "Delete destination");
        assert!(prompt.message.contains("\"Serengeti\""));
        assert_eq!(prompt.confirm_label, "Delete");
        assert!(prompt.danger);
    }

    #[tokio::test]
    async fn confirm_runs_the_action_once_and_surfaces_failure() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let outcome: Result<(), &str> = ConfirmPrompt::delete("review", "Ines")
            .confirm(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("review 3 not found")
            })
            .await;

        assert_eq!(outcome, Err("review 3 not found"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_delete_leaves_the_destination_listed() {
        let app = TestApp::new().await;
        let (_, created) = app
            .post("/admin/destinations", &sample_input("Serengeti", "Wildlife"))
            .await;
        let id = created["data"]["id"].as_i64().unwrap();

        ConfirmPrompt::delete("destination", "Serengeti").cancel();

        let (_, listing) = app.get("/admin/destinations").await;
        assert_eq!(listing["total"], 1);
        assert_eq!(listing["items"][0]["id"], id);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_the_destination_from_the_next_list() {
        let app = TestApp::new().await;
        let (_, created) = app
            .post("/admin/destinations", &sample_input("Serengeti", "Wildlife"))
            .await;
        let id = created["data"]["id"].as_i64().unwrap();
        let uri = format!("/admin/destinations/{id}");
        let (app_ref, uri) = (&app, uri.as_str());

        let status = ConfirmPrompt::delete("destination", "Serengeti")
            .confirm(move || async move {
                let (status, _) = app_ref.delete(uri).await;
                if status.is_success() {
                    Ok(status)
                } else {
                    Err(status)
                }
            })
            .await;

        assert_eq!(status, Ok(StatusCode::OK));
        let (_, listing) = app.get("/admin/destinations").await;
        assert_eq!(listing["total"], 0);
    }
}
