//! File categorization by extension.
//!
//! A [`CategoryTable`] is an ordered list of categories, each owning a set of
//! lowercase extensions. Exactly one category owns no extensions and catches
//! every file the others don't claim.
//!
//! # Examples
//!
//! ```
//! use filesorter::file_category::CategoryTable;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.classify("holiday.JPG"), "Images");
//! assert_eq!(table.classify("report.pdf"), "Documents");
//! assert_eq!(table.classify("README"), "Others");
//! ```

use crate::error::ConfigError;
use std::collections::HashMap;

/// A named bucket of extensions sharing a destination folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    label: String,
    extensions: Vec<String>,
}

impl Category {
    /// Creates a category. Extensions are normalized to `.ext` lowercase form.
    pub fn new<I, S>(label: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            label: label.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    /// The folder name for this category.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The extensions, each with a leading dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// True for the catch-all category.
    pub fn is_fallback(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Immutable, validated mapping from extension to category label.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
    extension_map: HashMap<String, usize>,
    fallback: usize,
}

impl CategoryTable {
    /// Builds a table, rejecting anything that would make lookups ambiguous.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if there are no categories, labels are not
    /// usable as folder names or repeat, there isn't exactly one fallback, an
    /// extension can never match, or two categories claim one extension.
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        if categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut extension_map: HashMap<String, usize> = HashMap::new();
        let mut fallback: Option<usize> = None;

        for (index, category) in categories.iter().enumerate() {
            validate_label(&category.label)?;
            if categories[..index]
                .iter()
                .any(|other| other.label == category.label)
            {
                return Err(ConfigError::DuplicateLabel(category.label.clone()));
            }

            if category.is_fallback() {
                if let Some(first) = fallback {
                    return Err(ConfigError::MultipleFallbacks {
                        first: categories[first].label.clone(),
                        second: category.label.clone(),
                    });
                }
                fallback = Some(index);
                continue;
            }

            for extension in &category.extensions {
                let suffix = &extension[1..];
                if suffix.is_empty() || suffix.contains('.') {
                    return Err(ConfigError::InvalidExtension {
                        label: category.label.clone(),
                        extension: extension.clone(),
                    });
                }
                if let Some(&owner) = extension_map.get(extension) {
                    if owner == index {
                        continue;
                    }
                    return Err(ConfigError::OverlappingExtension {
                        extension: extension.clone(),
                        first: categories[owner].label.clone(),
                        second: category.label.clone(),
                    });
                }
                extension_map.insert(extension.clone(), index);
            }
        }

        let fallback = fallback.ok_or(ConfigError::NoFallback)?;

        Ok(Self {
            categories,
            extension_map,
            fallback,
        })
    }

    /// Returns the category label for a file name.
    ///
    /// Only the text after the final dot counts, compared case-insensitively.
    /// Names without a dot, or ending in one, get the fallback label.
    ///
    /// ```
    /// use filesorter::file_category::CategoryTable;
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.classify("song.Mp3"), "Music");
    /// assert_eq!(table.classify("backup.tar.gz"), "Others");
    /// assert_eq!(table.classify("file."), "Others");
    /// ```
    pub fn classify(&self, file_name: &str) -> &str {
        let key = extension_key(file_name);
        let index = key
            .and_then(|key| self.extension_map.get(&key).copied())
            .unwrap_or(self.fallback);
        &self.categories[index].label
    }

    /// Categories in table order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Labels in table order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(Category::label)
    }

    /// The catch-all label.
    pub fn fallback_label(&self) -> &str {
        &self.categories[self.fallback].label
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let categories = default_categories();
        let extension_map = categories
            .iter()
            .enumerate()
            .flat_map(|(index, category)| {
                category
                    .extensions
                    .iter()
                    .map(move |extension| (extension.clone(), index))
            })
            .collect();
        let fallback = categories.len() - 1;

        Self {
            categories,
            extension_map,
            fallback,
        }
    }
}

/// The built-in table. The fallback is always the last entry.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Images", [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"]),
        Category::new(
            "Documents",
            [".pdf", ".docx", ".txt", ".xlsx", ".pptx", ".csv"],
        ),
        Category::new("Music", [".mp3", ".wav", ".flac", ".aac"]),
        Category::new("Videos", [".mp4", ".mkv", ".avi", ".mov"]),
        Category::new("Compressed", [".zip", ".rar", ".7z"]),
        Category::new("Executables", [".exe", ".msi"]),
        Category::new("Others", Vec::<&str>::new()),
    ]
}

/// Lowercases an extension and makes sure it carries a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// `.ext` lookup key for a file name, `None` when there is no usable suffix.
fn extension_key(file_name: &str) -> Option<String> {
    let (_, suffix) = file_name.rsplit_once('.')?;
    if suffix.is_empty() {
        None
    } else {
        Some(format!(".{}", suffix.to_lowercase()))
    }
}

fn validate_label(label: &str) -> Result<(), ConfigError> {
    let usable = !label.trim().is_empty()
        && label != "."
        && label != ".."
        && !label.contains(['/', '\\']);
    if usable {
        Ok(())
    } else {
        Err(ConfigError::InvalidLabel(label.to_string()))
    }
}
