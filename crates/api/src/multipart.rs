//! Decoding of `multipart/form-data` product forms.

use axum::extract::Multipart;

use crate::error::AppResult;
use crate::service::{ImageUpload, ProductForm};

/// Read a product form. Unknown fields are ignored; a repeated field keeps
/// its last value.
///
/// The image is expected in a file field named `image`. A file field sent
/// with no content (a browser form with no file chosen) counts as absent.
pub async fn read_product_form(mut multipart: Multipart) -> AppResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                form.image = if data.is_empty() {
                    None
                } else {
                    Some(ImageUpload {
                        data: data.to_vec(),
                        content_type,
                    })
                };
            }
            "name" => form.name = Some(field.text().await?),
            "slug" => form.slug = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            "price" => form.price = Some(field.text().await?),
            "stock" => form.stock = Some(field.text().await?),
            "categoryId" => form.category_id = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}
