//! Request payloads for product and category mutations.
//!
//! Products are always sent as `multipart/form-data` because of the optional
//! image field, even when no image is attached. Categories are JSON.

use std::path::Path;

use emporium_core::{CategoryId, Price, Product};
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::ApiError;

/// An image file attached to a product form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Read an image from disk, guessing its content type from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
        let content_type = content_type_for(path);

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}

/// Product create/update form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub unit_price: Price,
    pub stock: u32,
    pub category: Option<CategoryId>,
    pub image: Option<ImageUpload>,
}

impl ProductDraft {
    /// Pre-fill a draft from an existing product. The image is never
    /// pre-filled; leaving it empty keeps the stored image.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            unit_price: product.unit_price,
            stock: product.stock,
            category: product.category,
            image: None,
        }
    }

    /// Check the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] naming the first missing field.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::InvalidRequest("title is required".to_owned()));
        }
        if self.description.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "description is required".to_owned(),
            ));
        }
        if self.category.is_none() {
            return Err(ApiError::InvalidRequest("category is required".to_owned()));
        }
        Ok(())
    }

    /// Text fields in form order; unset fields are omitted.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("unit_price", self.unit_price.to_form_value()),
            ("stock", self.stock.to_string()),
        ];
        if let Some(category) = self.category {
            fields.push(("category", category.to_string()));
        }
        fields
    }

    /// Encode as a multipart form.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the image content type is not
    /// a valid MIME type.
    pub fn to_multipart(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in self.text_fields() {
            form = form.text(name, value);
        }

        if let Some(image) = &self.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| ApiError::InvalidRequest(format!("invalid image type: {e}")))?;
            form = form.part("image", part);
        }

        Ok(form)
    }
}

/// Category create/update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CategoryDraft {
    /// A draft with just a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Check the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when the name is blank.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("name is required".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            title: "Mango Jam".to_string(),
            description: "Small batch".to_string(),
            unit_price: Price::parse("4.50").unwrap(),
            stock: 12,
            category: Some(CategoryId::new(2)),
            image: None,
        }
    }

    #[test]
    fn test_text_fields() {
        let fields = draft().text_fields();
        assert_eq!(
            fields,
            vec![
                ("title", "Mango Jam".to_string()),
                ("description", "Small batch".to_string()),
                ("unit_price", "4.5".to_string()),
                ("stock", "12".to_string()),
                ("category", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_multipart_without_image() {
        let form = draft().to_multipart().unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_multipart_rejects_bad_mime() {
        let mut d = draft();
        d.image = Some(ImageUpload {
            file_name: "x.png".to_string(),
            content_type: "not a mime".to_string(),
            bytes: vec![1, 2, 3],
        });
        assert!(matches!(d.to_multipart(), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(draft().validate().is_ok());
        let mut d = draft();
        d.title = "  ".to_string();
        assert!(d.validate().is_err());
        let mut d = draft();
        d.category = None;
        let err = d.validate().unwrap_err();
        assert_eq!(err.server_message().as_deref(), Some("category is required"));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type_for(Path::new("a/b.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("shelf.bmp")), "image/bmp");
        assert_eq!(content_type_for(Path::new("shelf.tiff")), "image/tiff");
        assert_eq!(content_type_for(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_category_draft_json() {
        let json = serde_json::to_value(CategoryDraft::named("Teas")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Teas"}));
        assert!(CategoryDraft::named("").validate().is_err());
    }
}
