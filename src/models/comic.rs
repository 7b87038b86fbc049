use serde::{Deserialize, Serialize};

/// A chapter row as shown on the comic detail page.
/// `has_purchased` is the locally held ownership state the purchase handler
/// consults before going to the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: String,
    pub chapter_number: f64,
    /// Price in coins; 0 means the chapter is free.
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub has_purchased: bool,
}

impl ChapterSummary {
    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

/// A comic as shown on its detail page.
/// `followers_count` is mirrored locally so follow/unfollow can adjust it
/// without a refetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicSummary {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub followers_count: u64,
}
