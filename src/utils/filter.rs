//! List filtering over a fully fetched collection.
//!
//! Search is a case-insensitive substring match over a record's text fields;
//! facets (`category`, `country`, `status`, `tag`) are exact, case-sensitive
//! matches. A missing, blank, or `all` facet does not filter.

use serde::Deserialize;

/// Implemented by every record a list view can filter.
pub trait Filterable {
    /// Text searched by the free-text box, usually name and description.
    fn search_text(&self) -> Vec<&str>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn country(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    fn tags(&self) -> Vec<&str> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub status: Option<String>,
    pub tag: Option<String>,
}

impl ListFilter {
    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none()
            && facet(&self.category).is_none()
            && facet(&self.country).is_none()
            && facet(&self.status).is_none()
            && facet(&self.tag).is_none()
    }

    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        if let Some(needle) = self.needle() {
            let hit = item
                .search_text()
                .iter()
                .any(|text| text.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        exact(facet(&self.category), item.category())
            && exact(facet(&self.country), item.country())
            && exact(facet(&self.status), item.status())
            && match facet(&self.tag) {
                Some(tag) => item.tags().contains(&tag),
                None => true,
            }
    }

    /// Keep matching records, preserving their order.
    pub fn apply<T: Filterable>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase)
    }
}

fn facet(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|value| !value.is_empty() && *value != "all")
}

fn exact(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => actual == Some(wanted),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Park {
        name: &'static str,
        blurb: &'static str,
        category: &'static str,
        tags: Vec<&'static str>,
    }

    impl Filterable for Park {
        fn search_text(&self) -> Vec<&str> {
            vec![self.name, self.blurb]
        }

        fn category(&self) -> Option<&str> {
            Some(self.category)
        }

        fn tags(&self) -> Vec<&str> {
            self.tags.clone()
        }
    }

    fn parks() -> Vec<Park> {
        vec![
            Park {
                name: "Serengeti",
                blurb: "Endless plains and the great migration",
                category: "Wildlife",
                tags: vec!["Game Drive", "Balloon"],
            },
            Park {
                name: "Zanzibar",
                blurb: "Spice island beaches",
                category: "Beach",
                tags: vec!["Beach Holiday"],
            },
            Park {
                name: "Ngorongoro",
                blurb: "Crater teeming with wildlife",
                category: "wildlife",
                tags: vec!["Game Drive"],
            },
        ]
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        assert_eq!(ListFilter::default().apply(parks()), parks());
    }

    #[test]
    fn category_is_exact_and_case_sensitive() {
        let hits = ListFilter::default().category("Wildlife").apply(parks());
        assert_eq!(hits.len(), 1);
        assert!(hits.iter().all(|park| park.category == "Wildlife"));
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let names: Vec<_> = ListFilter::default()
            .search("WILDLIFE")
            .apply(parks())
            .into_iter()
            .map(|park| park.name)
            .collect();
        assert_eq!(names, vec!["Ngorongoro"]);

        let names: Vec<_> = ListFilter::default()
            .search("  zan ")
            .apply(parks())
            .into_iter()
            .map(|park| park.name)
            .collect();
        assert_eq!(names, vec!["Zanzibar"]);
    }

    #[test]
    fn all_and_blank_facets_do_not_filter() {
        let filter = ListFilter::default().category("all").status("").search("   ");
        assert!(filter.is_empty());
        assert_eq!(filter.apply(parks()).len(), 3);
    }

    #[test]
    fn missing_facet_on_record_never_matches() {
        let hits = ListFilter::default().country("Kenya").apply(parks());
        assert!(hits.is_empty());
    }

    #[test]
    fn tag_facet_matches_any_tag() {
        let hits = ListFilter::default().tag("Game Drive").apply(parks());
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn facets_combine_with_search() {
        let hits = ListFilter::default()
            .category("Wildlife")
            .search("migration")
            .apply(parks());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Serengeti");
    }
}
