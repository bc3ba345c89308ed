use chrono::{DateTime, Utc};
use savanna_http::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::{closed_enum, filter::Filterable};

/// Reading speed used when a post has no explicit read time.
const WORDS_PER_MINUTE: usize = 200;

closed_enum! {
    #[derive(Default)]
    pub enum PostStatus {
        #[default]
        Draft => "draft",
        Published => "published",
    }
}

/// Free-form post tags. The form may send a list or one comma-separated
/// string; both end up as a trimmed list without blanks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TagsField", into = "Vec<String>")]
pub struct PostTags(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsField {
    Text(String),
    List(Vec<String>),
}

impl From<TagsField> for PostTags {
    fn from(field: TagsField) -> Self {
        match field {
            TagsField::Text(text) => PostTags::new(text.split(',')),
            TagsField::List(list) => PostTags::new(list),
        }
    }
}

impl From<PostTags> for Vec<String> {
    fn from(tags: PostTags) -> Self {
        tags.0
    }
}

impl PostTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PostTags(
            tags.into_iter()
                .map(|tag| tag.as_ref().trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    /// Stored and served as-is; rendering is the client's concern.
    pub content: String,
    pub category: String,
    pub author: String,
    pub read_time: String,
    pub status: PostStatus,
    pub image_url: Option<String>,
    pub tags: PostTags,
    pub created_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn input(&self) -> BlogPostInput {
        BlogPostInput {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            author: self.author.clone(),
            read_time: self.read_time.clone(),
            status: self.status,
            image_url: self.image_url.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl Filterable for BlogPost {
    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.excerpt.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn tags(&self) -> Vec<&str> {
        self.tags.as_slice().iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BlogPostInput {
    #[validate(length(max = 255))]
    pub title: String,
    #[validate(length(max = 500))]
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub author: String,
    #[validate(length(max = 50))]
    pub read_time: String,
    pub status: PostStatus,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub tags: PostTags,
}

impl BlogPostInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("title", &self.title)
            .required("excerpt", &self.excerpt)
            .required("content", &self.content)
            .required("category", &self.category)
            .required("author", &self.author)
            .merge(Validate::validate(self));
        errors.finish()
    }

    /// The submitted read time, or an estimate from the content when blank.
    pub fn read_time(&self) -> String {
        let given = self.read_time.trim();
        if given.is_empty() {
            estimate_read_time(&self.content)
        } else {
            given.to_string()
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Word count of the visible text, markup skipped, rounded up to whole minutes.
pub fn estimate_read_time(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlogPostPatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<String>,
    pub status: Option<PostStatus>,
    pub image_url: Option<String>,
    pub tags: Option<PostTags>,
}

impl BlogPostPatch {
    pub fn apply(self, mut base: BlogPostInput) -> BlogPostInput {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            base.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            base.content = content;
        }
        if let Some(category) = self.category {
            base.category = category;
        }
        if let Some(author) = self.author {
            base.author = author;
        }
        if let Some(read_time) = self.read_time {
            base.read_time = read_time;
        }
        if let Some(status) = self.status {
            base.status = status;
        }
        if let Some(image_url) = self.image_url {
            base.image_url = Some(image_url);
        }
        if let Some(tags) = self.tags {
            base.tags = tags;
        }
        base
    }
}

#[cfg(test)]
pub(crate) fn sample_post(title: &str, status: PostStatus) -> BlogPostInput {
    BlogPostInput {
        title: title.to_string(),
        excerpt: format!("{title} in brief"),
        content: "<p>Dust rises as the herds cross the Mara river.</p>".to_string(),
        category: "Wildlife".to_string(),
        author: "Neema".to_string(),
        read_time: String::new(),
        status,
        image_url: None,
        tags: PostTags::new(["migration", "serengeti"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_accept_a_list_or_comma_text() {
        let from_text: PostTags = serde_json::from_str(r#"" safari, ,birds ,""#).unwrap();
        let from_list: PostTags = serde_json::from_str(r#"["safari", "birds", " "]"#).unwrap();

        assert_eq!(from_text, PostTags::new(["safari", "birds"]));
        assert_eq!(from_list, from_text);
        assert_eq!(
            serde_json::to_value(&from_text).unwrap(),
            serde_json::json!(["safari", "birds"])
        );
    }

    #[test]
    fn read_time_is_estimated_from_visible_words() {
        let words = vec!["word"; 401].join(" ");
        let html = format!("<p class=\"lead\">{words}</p>");
        assert_eq!(estimate_read_time(&html), "3 min read");
        assert_eq!(estimate_read_time("<img src=\"x.jpg\">"), "1 min read");
    }

    #[test]
    fn explicit_read_time_wins() {
        let mut post = sample_post("Great Migration", PostStatus::Draft);
        assert_eq!(post.read_time(), "1 min read");

        post.read_time = " 7 min read ".into();
        assert_eq!(post.read_time(), "7 min read");
    }

    #[test]
    fn validation_reports_missing_fields() {
        let post: BlogPostInput = serde_json::from_str(r#"{ "title": "Only a title" }"#).unwrap();
        let Err(AppError::Validation { details, .. }) = post.validate() else {
            panic!("expected a validation error");
        };
        let fields: Vec<_> = details.iter().map(|d| d["field"].as_str().unwrap()).collect();
        assert_eq!(fields, vec!["excerpt", "content", "category", "author"]);
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let base = sample_post("Great Migration", PostStatus::Draft);
        let patch: BlogPostPatch = serde_json::from_str(r#"{ "status": "published" }"#).unwrap();

        let merged = patch.apply(base.clone());
        assert_eq!(merged.status, PostStatus::Published);
        assert_eq!(merged.title, base.title);
        assert_eq!(merged.tags, base.tags);
    }
}
