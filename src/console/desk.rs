//! Booking desk actions for operators working from a terminal.

use savanna_db::Result;

use super::{ConfirmPrompt, StatusToggle};
use crate::modules::bookings::{BookingStatus, BookingStore};

/// Move a booking to `status`. Returns the stored status and whether a write
/// was needed.
pub async fn set_booking_status(
    store: &BookingStore,
    id: i64,
    status: BookingStatus,
) -> Result<(BookingStatus, bool)> {
    let booking = store.get(id).await?;
    let mut toggle = StatusToggle::new(booking.status);
    toggle.select(status);

    let written = toggle
        .apply(|next| async move { store.set_status(id, next).await.map(|b| b.status) })
        .await?;
    if written {
        tracing::info!(booking_id = id, status = %toggle.current(), "booking status updated");
    }
    Ok((*toggle.current(), written))
}

/// Delete a booking once `answer` accepts the prompt. Returns whether the
/// booking was deleted.
pub async fn delete_booking<A>(store: &BookingStore, id: i64, answer: A) -> Result<bool>
where
    A: FnOnce(&ConfirmPrompt) -> bool,
{
    let booking = store.get(id).await?;
    let prompt = ConfirmPrompt::delete("booking", &booking.name);
    if !answer(&prompt) {
        prompt.cancel();
        return Ok(false);
    }

    prompt.confirm(|| store.delete(id)).await?;
    tracing::info!(booking_id = id, "booking deleted");
    Ok(true)
}
