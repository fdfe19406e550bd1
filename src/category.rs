//! Extension based media classification

use serde::Serialize;

const PICTURE_EXTENSIONS: &[&str] = &[".jpg", ".png", ".heic", ".jpeg", ".dng", ".arw"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".webp"];
const GIF_EXTENSIONS: &[&str] = &[".gif"];

/// Media category derived from a filename extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Picture,
    Video,
    Gif,
    Uncategorized,
}

impl Category {
    /// Folder name used when sorting into categories
    pub fn folder_name(&self) -> Option<&'static str> {
        match self {
            Category::Picture => Some("pictures"),
            Category::Video => Some("videos"),
            Category::Gif => Some("gifs"),
            Category::Uncategorized => None,
        }
    }
}

/// Classify a file by the suffix of its name (case-insensitive)
pub fn classify(file_name: &str) -> Category {
    let name = file_name.to_lowercase();
    let matches = |exts: &[&str]| exts.iter().any(|ext| name.ends_with(ext));

    if matches(PICTURE_EXTENSIONS) {
        Category::Picture
    } else if matches(VIDEO_EXTENSIONS) {
        Category::Video
    } else if matches(GIF_EXTENSIONS) {
        Category::Gif
    } else {
        Category::Uncategorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify("IMG_001.jpg"), Category::Picture);
        assert_eq!(classify("scan.JPEG"), Category::Picture);
        assert_eq!(classify("raw.Dng"), Category::Picture);
        assert_eq!(classify("a7.ARW"), Category::Picture);
        assert_eq!(classify("iphone.HEIC"), Category::Picture);
        assert_eq!(classify("clip.MOV"), Category::Video);
        assert_eq!(classify("clip.mp4"), Category::Video);
        assert_eq!(classify("sticker.webp"), Category::Video);
        assert_eq!(classify("funny.GIF"), Category::Gif);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("note.txt"), Category::Uncategorized);
        assert_eq!(classify("README"), Category::Uncategorized);
        assert_eq!(classify("jpg"), Category::Uncategorized);
        assert_eq!(classify("archive.jpg.zip"), Category::Uncategorized);
    }

    #[test]
    fn test_folder_names() {
        assert_eq!(Category::Picture.folder_name(), Some("pictures"));
        assert_eq!(Category::Video.folder_name(), Some("videos"));
        assert_eq!(Category::Gif.folder_name(), Some("gifs"));
        assert_eq!(Category::Uncategorized.folder_name(), None);
    }
}
