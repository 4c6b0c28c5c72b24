//! Session commands: store, clear and show the bearer token.

use emporium_client::{Session, SessionUser};
use secrecy::SecretString;

use super::{CommandError, Context, print};

/// Store `token`, with an optional user summary, as the current session.
pub async fn set_token(
    ctx: &Context,
    token: String,
    email: Option<String>,
    staff: bool,
) -> Result<(), CommandError> {
    if token.trim().is_empty() {
        return Err(CommandError::InvalidArgument("token is empty".to_owned()));
    }

    let user = email.map(|email| SessionUser {
        email,
        is_staff: staff,
    });
    let session = Session::from_parts(Some(SecretString::from(token)), user);
    ctx.store.save(&session).await?;

    tracing::info!(path = %ctx.store.path().display(), "Session stored");
    print("Token stored.")
}

/// Forget the stored token and user.
pub async fn clear(ctx: &Context) -> Result<(), CommandError> {
    ctx.store.clear().await?;
    ctx.session.sign_out().await;
    print("Signed out.")
}

/// Print who the session belongs to, never the token itself.
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    print(&format!("API origin: {}", ctx.config.api_origin))?;
    print(&format!("Session file: {}", ctx.store.path().display()))?;

    if !ctx.session.is_authenticated().await {
        return print("Not signed in.");
    }
    match ctx.session.user().await {
        Some(user) if user.is_staff => print(&format!("Signed in as {} (staff)", user.email)),
        Some(user) => print(&format!("Signed in as {}", user.email)),
        None => print("Signed in (token only)"),
    }
}
