//! Review moderation: filtered list and deletion.

use askama::Template;
use emporium_client::{DashboardApi, ListOptions};
use emporium_core::{Page, ProductId, Rating, Review, ReviewId};
use tracing::instrument;

use crate::confirm::Confirm;
use crate::controller::{DisplayError, Loadable, Outcome, Sequencing, Settled, Ticket};

const FETCH_FALLBACK: &str = "Failed to fetch reviews";
const DELETE_FALLBACK: &str = "Failed to delete review";
const DELETE_PROMPT: &str = "Are you sure you want to delete this review?";

/// Filters applied to the review list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilters {
    pub search: String,
    pub rating: Option<Rating>,
    pub product: Option<ProductId>,
}

impl ReviewFilters {
    #[must_use]
    pub fn to_options(&self) -> ListOptions {
        ListOptions::new()
            .set("search", self.search.as_str())
            .set_opt("rating", self.rating.map(|r| r.value()))
            .set_opt("product", self.product)
    }
}

/// A review list request that has been issued but not yet sent.
#[derive(Debug, Clone)]
pub struct ReviewsFetch {
    ticket: Ticket,
    options: ListOptions,
}

impl ReviewsFetch {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    #[must_use]
    pub const fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Send the request.
    pub async fn run(self, api: &DashboardApi) -> Settled<Page<Review>> {
        let response = api.reviews(&self.options).await;
        Settled::from_response(self.ticket, response, FETCH_FALLBACK)
    }
}

/// Controller behind `/dashboard/reviews`.
#[derive(Debug)]
pub struct ReviewsController {
    api: DashboardApi,
    filters: ReviewFilters,
    reviews: Loadable<Page<Review>>,
    mutation_error: Option<DisplayError>,
}

impl ReviewsController {
    #[must_use]
    pub fn new(api: DashboardApi) -> Self {
        Self::with_sequencing(api, Sequencing::default())
    }

    #[must_use]
    pub fn with_sequencing(api: DashboardApi, sequencing: Sequencing) -> Self {
        Self {
            api,
            filters: ReviewFilters::default(),
            reviews: Loadable::new(sequencing),
            mutation_error: None,
        }
    }

    #[must_use]
    pub const fn filters(&self) -> &ReviewFilters {
        &self.filters
    }

    #[must_use]
    pub const fn reviews(&self) -> &Loadable<Page<Review>> {
        &self.reviews
    }

    #[must_use]
    pub const fn mutation_error(&self) -> Option<&DisplayError> {
        self.mutation_error.as_ref()
    }

    /// Fetch reviews for the current filters.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let fetch = self.begin_fetch();
        let settled = fetch.run(&self.api).await;
        self.reviews.settle(settled);
    }

    /// Replace the filters and reload.
    pub async fn set_filters(&mut self, filters: ReviewFilters) {
        self.filters = filters;
        self.load().await;
    }

    /// Replace the filters and issue a fetch without sending it.
    pub fn begin_filter_change(&mut self, filters: ReviewFilters) -> ReviewsFetch {
        self.filters = filters;
        self.begin_fetch()
    }

    /// Issue a fetch for the current filters.
    pub fn begin_fetch(&mut self) -> ReviewsFetch {
        ReviewsFetch {
            ticket: self.reviews.begin(),
            options: self.filters.to_options(),
        }
    }

    /// Apply a fetch result. Returns `false` if it was discarded as stale.
    pub fn apply(&mut self, settled: Settled<Page<Review>>) -> bool {
        self.reviews.settle(settled)
    }

    /// Delete a review after confirmation, then refetch the list once.
    #[instrument(skip(self, confirm), fields(review_id = %id))]
    pub async fn delete(&mut self, id: ReviewId, confirm: &dyn Confirm) -> Outcome {
        if !confirm.confirm(DELETE_PROMPT) {
            return Outcome::Declined;
        }
        match self.api.delete_review(id).await {
            Ok(_) => {
                self.mutation_error = None;
                self.load().await;
                Outcome::Completed
            }
            Err(e) => {
                let shown = DisplayError::from_api(&e, DELETE_FALLBACK);
                self.mutation_error = Some(shown.clone());
                Outcome::Failed(shown)
            }
        }
    }

    /// Render the page as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> askama::Result<String> {
        let rows = self
            .reviews
            .data()
            .map(|page| page.results.iter().map(ReviewRow::from).collect())
            .unwrap_or_default();

        ReviewsView {
            error: self
                .mutation_error
                .as_ref()
                .or_else(|| self.reviews.error())
                .map(|e| e.message.as_str()),
            search: &self.filters.search,
            rating: self
                .filters
                .rating
                .map_or_else(|| "All Ratings".to_owned(), rating_label),
            product: self
                .filters
                .product
                .map_or_else(String::new, |id| id.to_string()),
            loading: self.reviews.is_loading(),
            rows,
        }
        .render()
    }
}

fn rating_label(rating: Rating) -> String {
    if rating.value() == 1 {
        "1 Star".to_owned()
    } else {
        format!("{} Stars", rating.value())
    }
}

#[derive(Debug, Clone)]
struct ReviewRow {
    id: ReviewId,
    stars: String,
    date: String,
    title: String,
    content: String,
    author: String,
    product: String,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            stars: review.rating.stars(),
            date: review.created_at.format("%Y-%m-%d").to_string(),
            title: review.title.clone(),
            content: review.content.clone(),
            author: review.user_name.clone(),
            product: review.product_title.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "reviews.txt")]
struct ReviewsView<'a> {
    error: Option<&'a str>,
    search: &'a str,
    rating: String,
    product: String,
    loading: bool,
    rows: Vec<ReviewRow>,
}
