use savanna_http::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::filter::Filterable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accommodation {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub rating: f64,
    pub description: String,
    pub website: String,
    pub image_url: Option<String>,
    /// Destinations this lodge serves, ascending.
    pub destination_ids: Vec<i64>,
}

impl Accommodation {
    pub fn input(&self) -> AccommodationInput {
        AccommodationInput {
            name: self.name.clone(),
            location: self.location.clone(),
            rating: self.rating,
            description: self.description.clone(),
            website: self.website.clone(),
            image_url: self.image_url.clone(),
            destination_ids: self.destination_ids.clone(),
        }
    }

    pub fn serves(&self, destination_id: i64) -> bool {
        self.destination_ids.contains(&destination_id)
    }
}

impl Filterable for Accommodation {
    fn search_text(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.location.as_str(),
            self.description.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AccommodationInput {
    #[validate(length(max = 255))]
    pub name: String,
    pub location: String,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    pub description: String,
    #[validate(length(max = 2048))]
    pub website: String,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub destination_ids: Vec<i64>,
}

impl AccommodationInput {
    /// Field checks that need no storage; unknown destinations are checked
    /// separately against the destinations table.
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .required("name", &self.name)
            .required("location", &self.location)
            .required("description", &self.description)
            .required("website", &self.website);
        if !self.rating.is_finite() {
            errors.add("rating", "The rating must be a number.");
        }
        errors.merge(Validate::validate(self));
        errors
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.check().finish()
    }

    /// Linked destinations without repeats, ascending.
    pub fn destination_ids(&self) -> Vec<i64> {
        let mut ids = self.destination_ids.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccommodationPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub destination_ids: Option<Vec<i64>>,
}

impl AccommodationPatch {
    pub fn apply(self, mut base: AccommodationInput) -> AccommodationInput {
        if let Some(name) = self.name {
            base.name = name;
        }
        if let Some(location) = self.location {
            base.location = location;
        }
        if let Some(rating) = self.rating {
            base.rating = rating;
        }
        if let Some(description) = self.description {
            base.description = description;
        }
        if let Some(website) = self.website {
            base.website = website;
        }
        if let Some(image_url) = self.image_url {
            base.image_url = Some(image_url);
        }
        if let Some(destination_ids) = self.destination_ids {
            base.destination_ids = destination_ids;
        }
        base
    }
}

#[cfg(test)]
pub(crate) fn sample_lodge(name: &str, destination_ids: Vec<i64>) -> AccommodationInput {
    AccommodationInput {
        name: name.to_string(),
        location: "Central Serengeti".to_string(),
        rating: 4.5,
        description: "Tented camp on a kopje".to_string(),
        website: "https://example.com/lodge".to_string(),
        image_url: None,
        destination_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outside_zero_to_five_is_rejected() {
        let mut lodge = sample_lodge("Kati Kati", vec![]);
        lodge.rating = 5.0;
        assert!(lodge.validate().is_ok());

        lodge.rating = 5.5;
        let errors = lodge.check();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["rating"]);
    }

    #[test]
    fn destination_ids_are_deduplicated() {
        let lodge = sample_lodge("Kati Kati", vec![3, 1, 3]);
        assert_eq!(lodge.destination_ids(), vec![1, 3]);
    }

    #[test]
    fn patch_can_relink_without_touching_other_fields() {
        let base = sample_lodge("Kati Kati", vec![1]);
        let patch: AccommodationPatch =
            serde_json::from_str(r#"{ "destination_ids": [2, 4] }"#).unwrap();

        let merged = patch.apply(base.clone());
        assert_eq!(merged.destination_ids, vec![2, 4]);
        assert_eq!(merged.name, base.name);
        assert_eq!(merged.rating, base.rating);
    }
}
