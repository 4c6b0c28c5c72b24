//! Page controllers for the admin dashboard.

pub mod categories;
pub mod overview;
pub mod products;
pub mod reviews;
pub mod users;

pub use categories::CategoriesController;
pub use overview::OverviewController;
pub use products::{EditorMode, ProductEditor, ProductFilters, ProductsController, ProductsFetch};
pub use reviews::{ReviewFilters, ReviewsController, ReviewsFetch};
pub use users::UsersController;

use emporium_client::DashboardApi;

use crate::routes::Page;

/// Mount the controller behind `page`, load it and render it.
///
/// Returns `Ok(None)` for pages outside the dashboard.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub async fn mount(page: Page, api: DashboardApi) -> askama::Result<Option<String>> {
    let text = match page {
        Page::DashboardOverview => {
            let mut controller = OverviewController::new(api);
            controller.load().await;
            controller.render()?
        }
        Page::DashboardProducts => {
            let mut controller = ProductsController::new(api);
            controller.load().await;
            controller.render()?
        }
        Page::DashboardCategories => {
            let mut controller = CategoriesController::new(api);
            controller.load().await;
            controller.render()?
        }
        Page::DashboardReviews => {
            let mut controller = ReviewsController::new(api);
            controller.load().await;
            controller.render()?
        }
        Page::DashboardUsers => {
            let mut controller = UsersController::new(api);
            controller.load().await;
            controller.render()?
        }
        _ => return Ok(None),
    };
    Ok(Some(text))
}
