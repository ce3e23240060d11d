use serde::{Deserialize, Serialize};

/// A published article.
#[derive(Debug, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier.
    /// @readonly
    pub id: u64,
    /// Headline shown in listings.
    #[validate(not_blank, length(min = 3, max = 120))]
    pub title: String,
    #[serde(rename = "body")]
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub status: Status,
    pub author: Author,
    /// Editorial notes.
    /// @groups admin
    pub internal_notes: String,
    #[serde(skip)]
    pub cache_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Status {
    Draft,
    #[serde(rename = "live")]
    Published,
}

/// Someone who writes articles.
#[derive(Debug, Serialize, Deserialize)]
pub struct Author {
    pub display_name: String,
    #[validate(required, range(min = 0, max = 150))]
    pub age: u8,
    pub articles: Vec<Article>,
}
