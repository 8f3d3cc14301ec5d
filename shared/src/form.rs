use serde::{Deserialize, Serialize};

use crate::capabilities::MultipartForm;
use crate::selector::CategorySelector;
use crate::{DEFAULT_PROMPT_COUNT, MAX_DOCUMENT_BYTES};

pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["txt", "pdf", "doc", "docx"];
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub const FIELD_OVERVIEW: &str = "applicationOverview";
pub const FIELD_COUNT: &str = "numPrompts";
pub const FIELD_META_PROMPT: &str = "metaPrompt";
pub const FIELD_CATEGORIES: &str = "selectedCategories";
pub const FIELD_DOCUMENT: &str = "document";

/// An attached file, kept whole in memory until submission.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub file_name: String,
    pub mime_type: Option<String>,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    pub fn new(file_name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        }
    }

    /// Lowercased extension, if the name has one.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Upload hints for the user. Never blocks submission; the service has
    /// the final say.
    #[must_use]
    pub fn advisories(&self) -> Vec<DocumentAdvisory> {
        let mut advisories = Vec::new();
        let accepted = self
            .extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()));
        if !accepted {
            advisories.push(DocumentAdvisory::UnsupportedType {
                extension: self.extension(),
            });
        }
        if self.bytes.len() > MAX_DOCUMENT_BYTES {
            advisories.push(DocumentAdvisory::TooLarge {
                size_bytes: self.bytes.len(),
                max_bytes: MAX_DOCUMENT_BYTES,
            });
        }
        advisories
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentAdvisory {
    UnsupportedType { extension: Option<String> },
    TooLarge { size_bytes: usize, max_bytes: usize },
}

impl DocumentAdvisory {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UnsupportedType { .. } => format!(
                "Supported formats: {}",
                ACCEPTED_EXTENSIONS
                    .iter()
                    .map(|e| e.to_ascii_uppercase())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::TooLarge { max_bytes, .. } => {
                format!("Maximum file size is {} MB", max_bytes / (1024 * 1024))
            }
        }
    }
}

/// Every field the user can edit. Read, never mutated, by validation and
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub overview: String,
    pub count: i64,
    pub meta_prompt: String,
    pub document: Option<Document>,
    pub categories: CategorySelector,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            overview: String::new(),
            count: DEFAULT_PROMPT_COUNT,
            meta_prompt: String::new(),
            document: None,
            categories: CategorySelector::default(),
        }
    }
}

impl FormState {
    /// Generate request body. Text fields go as typed; one
    /// `selectedCategories` part per selection, in selection order.
    #[must_use]
    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text(FIELD_OVERVIEW, self.overview.clone())
            .text(FIELD_COUNT, self.count.to_string())
            .text(FIELD_META_PROMPT, self.meta_prompt.clone());

        for category in self.categories.selected() {
            form = form.text(FIELD_CATEGORIES, category.label());
        }

        if let Some(doc) = &self.document {
            form = form.file(
                FIELD_DOCUMENT,
                doc.file_name.clone(),
                doc.mime_type.clone().unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string()),
                doc.bytes.clone(),
            );
        }

        form
    }
}
