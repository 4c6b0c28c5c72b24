//! User administration commands.

use emporium_core::UserId;
use emporium_dashboard::pages::UsersController;

use super::{CommandError, Context, print, report};

/// List every user.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let mut controller = UsersController::new(ctx.api.clone());
    controller.load().await;
    print(&controller.render()?)?;
    match controller.users().error() {
        Some(e) => Err(CommandError::Failed(e.message.clone())),
        None => Ok(()),
    }
}

/// Grant admin rights to a user after confirmation.
///
/// The user list is loaded first so users who are already staff are
/// skipped without a request.
pub async fn promote(ctx: &Context, id: UserId) -> Result<(), CommandError> {
    let mut controller = UsersController::new(ctx.api.clone());
    controller.load().await;
    let outcome = controller.promote(id, ctx.confirm.as_ref()).await;
    report(outcome, "User has been made an admin successfully")
}
