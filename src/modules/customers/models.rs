use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::bookings::Booking;
use crate::utils::filter::Filterable;

/// One person who has booked, derived from their bookings and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub bookings_count: usize,
    pub first_booking: DateTime<Utc>,
    pub last_booking: DateTime<Utc>,
}

impl Filterable for Customer {
    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn country(&self) -> Option<&str> {
        Some(self.country.as_str())
    }
}

/// Group bookings by email, ignoring case and surrounding blanks.
///
/// Contact details come from the earliest booking of each customer, and
/// customers are listed in the order they first booked.
pub fn aggregate(bookings: &[Booking]) -> Vec<Customer> {
    let mut ordered = bookings.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|booking| (booking.created_at, booking.id));

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut customers: Vec<Customer> = Vec::new();

    for booking in ordered {
        let key = booking.email.trim().to_lowercase();
        match index.get(&key) {
            Some(&at) => {
                let customer = &mut customers[at];
                customer.bookings_count += 1;
                customer.last_booking = customer.last_booking.max(booking.created_at);
            }
            None => {
                index.insert(key, customers.len());
                customers.push(Customer {
                    name: booking.name.clone(),
                    email: booking.email.clone(),
                    phone: booking.phone.clone(),
                    country: booking.country.clone(),
                    bookings_count: 1,
                    first_booking: booking.created_at,
                    last_booking: booking.created_at,
                });
            }
        }
    }

    customers
}
