//! Review moderation commands.

use emporium_core::{ProductId, Rating, ReviewId};
use emporium_dashboard::pages::{ReviewFilters, ReviewsController};

use super::{CommandError, Context, print, report};

/// Build review filters from command-line values.
///
/// # Errors
///
/// Returns [`CommandError::InvalidArgument`] for a rating outside 1 to 5.
pub fn filters(
    search: String,
    rating: Option<i64>,
    product: Option<i64>,
) -> Result<ReviewFilters, CommandError> {
    let rating = rating
        .map(Rating::new)
        .transpose()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    Ok(ReviewFilters {
        search,
        rating,
        product: product.map(ProductId::new),
    })
}

/// List reviews matching `filters`.
pub async fn list(ctx: &Context, filters: ReviewFilters) -> Result<(), CommandError> {
    let mut controller = ReviewsController::new(ctx.api.clone());
    controller.set_filters(filters).await;
    print(&controller.render()?)?;
    match controller.reviews().error() {
        Some(e) => Err(CommandError::Failed(e.message.clone())),
        None => Ok(()),
    }
}

/// Delete a review after confirmation.
pub async fn delete(ctx: &Context, id: ReviewId) -> Result<(), CommandError> {
    let mut controller = ReviewsController::new(ctx.api.clone());
    let outcome = controller.delete(id, ctx.confirm.as_ref()).await;
    report(outcome, "Review deleted")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_reject_bad_rating() {
        assert!(matches!(
            filters(String::new(), Some(6), None),
            Err(CommandError::InvalidArgument(_))
        ));
        let ok = filters("great".to_string(), Some(5), Some(3)).unwrap();
        assert_eq!(ok.rating.map(|r| r.value()), Some(5));
        assert_eq!(ok.product, Some(ProductId::new(3)));
    }
}
