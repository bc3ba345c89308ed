use chrono::{DateTime, NaiveDate, Utc};
use savanna_http::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::{closed_enum, filter::Filterable};

closed_enum! {
    pub enum BookingStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    /// Not enforced; the destination may since have been deleted.
    pub destination_id: Option<i64>,
    /// Name of the referenced destination when it still exists.
    pub destination_name: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub travel_date: NaiveDate,
    pub group_size: i64,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Filterable for Booking {
    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.name.as_str(), self.email.as_str()];
        if let Some(destination) = &self.destination_name {
            text.push(destination);
        }
        text
    }

    fn country(&self) -> Option<&str> {
        Some(self.country.as_str())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

/// Public booking form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NewBooking {
    pub destination_id: Option<i64>,
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: String,
    pub country: String,
    pub travel_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub group_size: i64,
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

impl NewBooking {
    /// Form constraints, checked against `today` so a trip cannot start in the past.
    pub fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("name", &self.name)
            .required("email", &self.email)
            .required("phone", &self.phone)
            .required("country", &self.country)
            .present("travel_date", self.travel_date.as_ref());
        if let Some(date) = self.travel_date {
            if date < today {
                errors.add("travel_date", "The travel date must be today or a later date.");
            }
        }
        errors.merge(Validate::validate(self));
        errors.finish()
    }

    /// Blank optional text is stored as absent.
    pub fn special_requests(&self) -> Option<&str> {
        self.special_requests
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

#[cfg(test)]
pub(crate) fn sample_booking(name: &str, email: &str, travel_date: NaiveDate) -> NewBooking {
    NewBooking {
        destination_id: None,
        name: name.to_string(),
        email: email.to_string(),
        phone: "+255 700 000 000".to_string(),
        country: "Kenya".to_string(),
        travel_date: Some(travel_date),
        group_size: 2,
        special_requests: None,
    }
}
