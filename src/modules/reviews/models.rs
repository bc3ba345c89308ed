use chrono::{DateTime, Utc};
use savanna_http::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::filter::Filterable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub rating: i64,
    pub review: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Filterable for Review {
    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.review.as_str()]
    }

    /// `featured` or `regular`, so the admin list can narrow on the flag.
    fn status(&self) -> Option<&str> {
        Some(if self.is_featured { "featured" } else { "regular" })
    }
}

/// Public testimonial form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NewReview {
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i64,
    #[validate(length(max = 2000))]
    pub review: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("name", &self.name)
            .required("email", &self.email)
            .required("review", &self.review)
            .merge(Validate::validate(self));
        errors.finish()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetFeatured {
    pub is_featured: bool,
}

#[cfg(test)]
pub(crate) fn sample_review(name: &str, rating: i64) -> NewReview {
    NewReview {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        rating,
        review: "Saw a leopard on day one. Unforgettable.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_is_one_to_five() {
        for rating in 1..=5 {
            assert!(sample_review("Ines", rating).validate().is_ok());
        }
        for rating in [0, 6] {
            let Err(AppError::Validation { details, .. }) = sample_review("Ines", rating).validate()
            else {
                panic!("rating {rating} should be rejected");
            };
            assert_eq!(details[0]["field"], "rating");
        }
    }

    #[test]
    fn fractional_rating_does_not_deserialize() {
        let parsed = serde_json::from_str::<NewReview>(r#"{ "rating": 4.5 }"#);
        assert!(parsed.is_err());
    }
}
