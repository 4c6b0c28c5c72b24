//! Product commands.

use std::path::PathBuf;

use emporium_client::{ImageUpload, ProductDraft};
use emporium_core::{BulkChanges, CategoryId, Price, ProductId, ProductSort, StockFilter};
use emporium_dashboard::pages::{ProductFilters, ProductsController};

use super::{CommandError, Context, print, report};
use crate::ProductFields;

/// Build product filters from command-line values.
///
/// # Errors
///
/// Returns [`CommandError::InvalidArgument`] for an unknown stock filter or
/// sort order.
pub fn filters(
    search: String,
    category: Option<i64>,
    stock: Option<&str>,
    sort: Option<&str>,
) -> Result<ProductFilters, CommandError> {
    let stock = stock
        .map(str::parse::<StockFilter>)
        .transpose()
        .map_err(CommandError::InvalidArgument)?;
    let sort = sort
        .map(str::parse::<ProductSort>)
        .transpose()
        .map_err(CommandError::InvalidArgument)?
        .unwrap_or_default();

    Ok(ProductFilters {
        search,
        category: category.map(CategoryId::new),
        stock,
        sort,
    })
}

/// Build a product draft, reading the image from disk when given.
///
/// # Errors
///
/// Returns an error for an invalid price or an unreadable image.
pub(crate) async fn draft(fields: ProductFields) -> Result<ProductDraft, CommandError> {
    let unit_price = parse_price(&fields.price)?;
    let image = match fields.image {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };

    Ok(ProductDraft {
        title: fields.title,
        description: fields.description,
        unit_price,
        stock: fields.stock,
        category: Some(CategoryId::new(fields.category)),
        image,
    })
}

async fn read_image(path: PathBuf) -> Result<ImageUpload, CommandError> {
    tracing::debug!(path = %path.display(), "Reading product image");
    Ok(ImageUpload::from_path(path).await?)
}

fn parse_price(raw: &str) -> Result<Price, CommandError> {
    Price::parse(raw).map_err(|e| CommandError::InvalidArgument(e.to_string()))
}

/// Build bulk changes from command-line values.
///
/// # Errors
///
/// Returns [`CommandError::InvalidArgument`] for an invalid price or when
/// no field is given.
pub fn changes(
    stock: Option<u32>,
    price: Option<&str>,
    category: Option<i64>,
) -> Result<BulkChanges, CommandError> {
    let changes = BulkChanges {
        stock,
        unit_price: price.map(parse_price).transpose()?.map(|p| p.amount()),
        category: category.map(CategoryId::new),
    };
    if changes.is_empty() {
        return Err(CommandError::InvalidArgument(
            "give at least one of --stock, --price or --category".to_owned(),
        ));
    }
    Ok(changes)
}

/// List products matching `filters`.
pub async fn list(ctx: &Context, filters: ProductFilters) -> Result<(), CommandError> {
    let mut controller = ProductsController::new(ctx.api.clone());
    controller.set_filters(filters).await;
    print(&controller.render()?)?;
    match controller.products().error() {
        Some(e) => Err(CommandError::Failed(e.message.clone())),
        None => Ok(()),
    }
}

/// Show one product's fields.
pub async fn show(ctx: &Context, id: ProductId) -> Result<(), CommandError> {
    let product = ctx.api.product(id).await?.data;

    print(&format!("#{} {}", product.id, product.title))?;
    print(&format!("  Price: {}", product.unit_price))?;
    print(&format!("  Stock: {}", product.stock))?;
    if let Some(name) = &product.category_name {
        print(&format!("  Category: {name}"))?;
    }
    print(&format!("  {}", product.description))?;
    Ok(())
}

/// Create a product (`id` is `None`) or update one through the editor.
pub(crate) async fn save(
    ctx: &Context,
    id: Option<ProductId>,
    draft: ProductDraft,
) -> Result<(), CommandError> {
    let mut controller = ProductsController::new(ctx.api.clone());

    let done = match id {
        None => {
            controller.open_create();
            "Product created successfully"
        }
        Some(id) => {
            let product = ctx.api.product(id).await?.data;
            controller.open_edit(&product);
            "Product updated successfully"
        }
    };
    if let Some(editor) = controller.editor_mut() {
        editor.draft = draft;
    }

    let outcome = controller.submit_editor().await;
    report(outcome, done)
}

/// Delete a product after confirmation.
pub async fn delete(ctx: &Context, id: ProductId) -> Result<(), CommandError> {
    let mut controller = ProductsController::new(ctx.api.clone());
    let outcome = controller.delete(id, ctx.confirm.as_ref()).await;
    report(outcome, "Product deleted successfully")
}

/// Apply `changes` to every product in `ids` after confirmation.
pub async fn bulk_update(
    ctx: &Context,
    ids: &[ProductId],
    changes: &BulkChanges,
) -> Result<(), CommandError> {
    let mut controller = ProductsController::new(ctx.api.clone());
    let outcome = controller
        .bulk_update(ids, changes, ctx.confirm.as_ref())
        .await;
    let done = controller
        .notice()
        .map_or_else(|| "Products updated".to_owned(), str::to_owned);
    report(outcome, &done)
}
