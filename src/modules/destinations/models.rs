use savanna_http::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::{closed_enum, filter::Filterable};

/// Labels a destination may be filed under.
pub const CATEGORIES: &[&str] = &["Wildlife", "Beach", "Cultural", "Adventure", "Mountain"];

closed_enum! {
    #[derive(Default)]
    pub enum DestinationStatus {
        #[default]
        Active => "active",
        Inactive => "inactive",
    }
}

/// Tour category tags. Submissions may send a single tag or a list and the
/// record keeps whichever shape it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TourTags {
    One(String),
    Many(Vec<String>),
}

impl Default for TourTags {
    fn default() -> Self {
        TourTags::Many(Vec::new())
    }
}

impl TourTags {
    pub fn tags(&self) -> Vec<&str> {
        match self {
            TourTags::One(tag) => vec![tag.as_str()],
            TourTags::Many(tags) => tags.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.tags().iter().all(|tag| tag.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub tour: TourTags,
    pub description: String,
    pub info: String,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    pub duration: String,
    pub group_size: String,
    pub status: DestinationStatus,
    pub image: String,
}

impl Destination {
    /// Editable fields of this record, the base an edit is merged onto.
    pub fn input(&self) -> DestinationInput {
        DestinationInput {
            name: self.name.clone(),
            location: self.location.clone(),
            kind: self.kind.clone(),
            category: self.category.clone(),
            tour: self.tour.clone(),
            description: self.description.clone(),
            info: self.info.clone(),
            rating: self.rating,
            duration: self.duration.clone(),
            group_size: self.group_size.clone(),
            status: self.status,
            image: self.image.clone(),
        }
    }
}

impl Filterable for Destination {
    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn tags(&self) -> Vec<&str> {
        self.tour.tags()
    }
}

/// Full set of editable fields, as posted by the create form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DestinationInput {
    #[validate(length(max = 255))]
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub tour: TourTags,
    pub description: String,
    pub info: String,
    pub rating: f64,
    pub duration: String,
    pub group_size: String,
    pub status: DestinationStatus,
    pub image: String,
}

impl DestinationInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("name", &self.name)
            .required("location", &self.location)
            .required("type", &self.kind)
            .one_of("category", &self.category, CATEGORIES)
            .required("description", &self.description)
            .required("duration", &self.duration)
            .required("group_size", &self.group_size)
            .required("image", &self.image);
        if self.tour.is_blank() {
            errors.add("tour", "At least one tour category is required.");
        }
        if !self.rating.is_finite() {
            errors.add("rating", "The rating must be a number.");
        }
        errors.merge(Validate::validate(self));
        errors.finish()
    }
}

/// Edit form payload; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DestinationPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub tour: Option<TourTags>,
    pub description: Option<String>,
    pub info: Option<String>,
    pub rating: Option<f64>,
    pub duration: Option<String>,
    pub group_size: Option<String>,
    pub status: Option<DestinationStatus>,
    pub image: Option<String>,
}

impl DestinationPatch {
    pub fn apply(self, mut base: DestinationInput) -> DestinationInput {
        if let Some(name) = self.name {
            base.name = name;
        }
        if let Some(location) = self.location {
            base.location = location;
        }
        if let Some(kind) = self.kind {
            base.kind = kind;
        }
        if let Some(category) = self.category {
            base.category = category;
        }
        if let Some(tour) = self.tour {
            base.tour = tour;
        }
        if let Some(description) = self.description {
            base.description = description;
        }
        if let Some(info) = self.info {
            base.info = info;
        }
        if let Some(rating) = self.rating {
            base.rating = rating;
        }
        if let Some(duration) = self.duration {
            base.duration = duration;
        }
        if let Some(group_size) = self.group_size {
            base.group_size = group_size;
        }
        if let Some(status) = self.status {
            base.status = status;
        }
        if let Some(image) = self.image {
            base.image = image;
        }
        base
    }
}

/// What the public grid shows for one destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationCard {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub category: String,
    pub tour: TourTags,
    pub rating: f64,
    pub duration: String,
    pub image: String,
}

impl From<&Destination> for DestinationCard {
    fn from(destination: &Destination) -> Self {
        Self {
            id: destination.id,
            name: destination.name.clone(),
            location: destination.location.clone(),
            category: destination.category.clone(),
            tour: destination.tour.clone(),
            rating: destination.rating,
            duration: destination.duration.clone(),
            image: destination.image.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_input(name: &str, category: &str) -> DestinationInput {
    DestinationInput {
        name: name.to_string(),
        location: "Northern Tanzania".to_string(),
        kind: "National Park".to_string(),
        category: category.to_string(),
        tour: TourTags::Many(vec!["Game Drive".to_string(), "Photography".to_string()]),
        description: format!("{name} game viewing"),
        info: "Park fees included".to_string(),
        rating: 4.7,
        duration: "5 days".to_string(),
        group_size: "2-8 people".to_string(),
        status: DestinationStatus::Active,
        image: format!("/storage/destinations/{}.jpg", name.to_lowercase()),
    }
}
