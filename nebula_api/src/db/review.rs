use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ReviewModel {
    pub id: String,
    pub name: String,
    pub rating: u8,
    pub title: String,
    pub comment: String,
    pub mind_destroyed: bool,
    pub likes: u64,
    pub dislikes: u64,
    pub created_at: u64,
}

/// A reader's reaction to a review. Each one bumps its own counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    /// Path segment used by the http api, `/reviews/{id}/{segment}`
    pub fn path_segment(&self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
        }
    }
}

impl ReviewModel {
    pub fn react(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::Like => self.likes += 1,
            Reaction::Dislike => self.dislikes += 1,
        }
    }
}

#[cfg(feature = "server")]
impl redb::Value for ReviewModel {
    type SelfType<'a> = ReviewModel;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        bincode::deserialize(data).expect("Failed to deserialize ReviewModel")
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a> {
        bincode::serialize(value).expect("Failed to serialize ReviewModel")
    }

    fn type_name() -> redb::TypeName {
        redb::TypeName::new("ReviewModel")
    }
}
