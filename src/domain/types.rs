//! Enumerations offered by the composer form.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Audience tier a post is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Supporters,
    Collectors,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [
        Visibility::Public,
        Visibility::Supporters,
        Visibility::Collectors,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Supporters => "supporters",
            Visibility::Collectors => "collectors",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Supporters => "Supporters Only",
            Visibility::Collectors => "Collectors Only",
        }
    }

    pub fn is_gated(self) -> bool {
        !matches!(self, Visibility::Public)
    }
}

impl TryFrom<&str> for Visibility {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "public" => Ok(Visibility::Public),
            "supporters" => Ok(Visibility::Supporters),
            "collectors" => Ok(Visibility::Collectors),
            other => Err(DomainError::validation(format!(
                "unknown visibility `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Update,
    Artwork,
    Announcement,
    BehindScenes,
    Tutorial,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Update,
        Category::Artwork,
        Category::Announcement,
        Category::BehindScenes,
        Category::Tutorial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Update => "update",
            Category::Artwork => "artwork",
            Category::Announcement => "announcement",
            Category::BehindScenes => "behind-scenes",
            Category::Tutorial => "tutorial",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Update => "Update",
            Category::Artwork => "Artwork",
            Category::Announcement => "Announcement",
            Category::BehindScenes => "Behind the Scenes",
            Category::Tutorial => "Tutorial",
        }
    }

    /// Parse the select value; an empty value means nothing is selected.
    pub fn parse_selection(value: &str) -> Result<Option<Self>, DomainError> {
        if value.is_empty() {
            return Ok(None);
        }
        Self::try_from(value).map(Some)
    }
}

impl TryFrom<&str> for Category {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "update" => Ok(Category::Update),
            "artwork" => Ok(Category::Artwork),
            "announcement" => Ok(Category::Announcement),
            "behind-scenes" => Ok(Category::BehindScenes),
            "tutorial" => Ok(Category::Tutorial),
            other => Err(DomainError::validation(format!("unknown category `{other}`"))),
        }
    }
}

/// Which action button produced a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitIntent {
    Draft,
    Schedule,
    #[default]
    Publish,
}

impl SubmitIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitIntent::Draft => "draft",
            SubmitIntent::Schedule => "schedule",
            SubmitIntent::Publish => "publish",
        }
    }

    pub fn confirmation(self) -> &'static str {
        match self {
            SubmitIntent::Draft => "Draft saved",
            SubmitIntent::Schedule => "Post scheduled",
            SubmitIntent::Publish => "Post published",
        }
    }
}

impl TryFrom<&str> for SubmitIntent {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(SubmitIntent::Draft),
            "schedule" => Ok(SubmitIntent::Schedule),
            "publish" => Ok(SubmitIntent::Publish),
            other => Err(DomainError::validation(format!(
                "unknown submit intent `{other}`"
            ))),
        }
    }
}
