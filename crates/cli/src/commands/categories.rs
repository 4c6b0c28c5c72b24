//! Category commands.

use emporium_client::CategoryDraft;
use emporium_core::CategoryId;
use emporium_dashboard::pages::CategoriesController;

use super::{CommandError, Context, print, report};

async fn loaded(ctx: &Context) -> CategoriesController {
    let mut controller = CategoriesController::new(ctx.api.clone());
    controller.load().await;
    controller
}

/// List every category.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let controller = loaded(ctx).await;
    print(&controller.render()?)?;
    match controller.categories().error() {
        Some(e) => Err(CommandError::Failed(e.message.clone())),
        None => Ok(()),
    }
}

/// Create a category.
pub async fn create(
    ctx: &Context,
    name: String,
    description: Option<String>,
) -> Result<(), CommandError> {
    let mut controller = CategoriesController::new(ctx.api.clone());
    let draft = CategoryDraft { name, description };
    let outcome = controller.create(&draft).await;
    report(outcome, "Category created successfully")
}

/// Replace a category's name and description.
pub async fn update(
    ctx: &Context,
    id: CategoryId,
    name: String,
    description: Option<String>,
) -> Result<(), CommandError> {
    let mut controller = CategoriesController::new(ctx.api.clone());
    let draft = CategoryDraft { name, description };
    let outcome = controller.update(id, &draft).await;
    report(outcome, "Category updated successfully")
}

/// Delete a category after confirmation.
pub async fn delete(ctx: &Context, id: CategoryId) -> Result<(), CommandError> {
    let mut controller = CategoriesController::new(ctx.api.clone());
    let outcome = controller.delete(id, ctx.confirm.as_ref()).await;
    report(outcome, "Category deleted successfully")
}
