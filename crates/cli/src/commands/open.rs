//! Route resolution and the overview page.

use emporium_dashboard::pages::{self, OverviewController};
use emporium_dashboard::{Resolution, RouteTable, Viewer};

use super::{CommandError, Context, print};

/// Resolve `path` for the current viewer and render what it leads to.
///
/// Dashboard pages are loaded and rendered; other pages print their title
/// and captured parameters. Guard redirects are reported, not followed.
pub async fn open(ctx: &Context, path: &str) -> Result<(), CommandError> {
    let viewer = Viewer::from_session(&ctx.session).await;
    let table = RouteTable::new();

    match table.resolve(path, viewer) {
        Resolution::Render { page, params } => {
            tracing::debug!(?page, ?viewer, "Route resolved");
            if let Some(text) = pages::mount(page, ctx.api.clone()).await? {
                return print(&text);
            }
            print(page.title())?;
            for (name, value) in &params {
                print(&format!("  {name}: {value}"))?;
            }
            Ok(())
        }
        Resolution::Redirect(to) => print(&format!("Redirect: {to}")),
        Resolution::NotFound => print("Page not found"),
    }
}

/// Render the dashboard overview.
pub async fn stats(ctx: &Context) -> Result<(), CommandError> {
    let mut controller = OverviewController::new(ctx.api.clone());
    controller.load().await;
    print(&controller.render()?)?;

    match controller.stats().error() {
        Some(e) => Err(CommandError::Failed(e.message.clone())),
        None => Ok(()),
    }
}
