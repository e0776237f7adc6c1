//! Shared enums for uploads and the post feed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Destination folder for an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadFolder {
    /// Cover images attached to posts.
    BlogImages,
    /// Profile pictures.
    Avatars,
}

impl UploadFolder {
    /// Folder name as used in storage paths and public URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlogImages => "blog-images",
            Self::Avatars => "avatars",
        }
    }

    /// All known folders.
    pub fn all() -> &'static [UploadFolder] {
        &[UploadFolder::BlogImages, UploadFolder::Avatars]
    }
}

impl fmt::Display for UploadFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadFolder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog-images" => Ok(Self::BlogImages),
            "avatars" => Ok(Self::Avatars),
            other => Err(crate::Error::validation(format!(
                "Unknown upload folder '{}'",
                other
            ))),
        }
    }
}

/// Which posts the feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewFilter {
    /// Every post, newest first.
    #[default]
    All,
    /// Only posts written by the current user.
    MyPosts,
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::MyPosts => write!(f, "my-posts"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_folder_round_trips_through_str() {
        for folder in UploadFolder::all() {
            let parsed: UploadFolder = folder.as_str().parse().unwrap();
            assert_eq!(parsed, *folder);
        }
    }

    #[test]
    fn upload_folder_rejects_path_tricks() {
        assert!("../etc".parse::<UploadFolder>().is_err());
        assert!("".parse::<UploadFolder>().is_err());
    }

    #[test]
    fn view_filter_serde_is_kebab_case() {
        let json = serde_json::to_string(&ViewFilter::MyPosts).unwrap();
        assert_eq!(json, "\"my-posts\"");
        let parsed: ViewFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, ViewFilter::All);
    }
}
