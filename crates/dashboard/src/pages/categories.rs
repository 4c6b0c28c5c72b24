//! Category management.

use std::time::Instant;

use askama::Template;
use emporium_client::{ApiError, CategoryDraft, DashboardApi};
use emporium_core::{Category, CategoryId};
use tracing::instrument;

use crate::confirm::Confirm;
use crate::controller::{DisplayError, Loadable, Notice, Outcome, Sequencing, Settled};

const FETCH_FALLBACK: &str = "Failed to fetch categories";
const SAVE_FALLBACK: &str = "Failed to save category";
const DELETE_FALLBACK: &str = "Failed to delete category";
const DELETE_PROMPT: &str = "Are you sure you want to delete this category?";

/// Controller behind `/dashboard/categories`.
#[derive(Debug)]
pub struct CategoriesController {
    api: DashboardApi,
    categories: Loadable<Vec<Category>>,
    mutation_error: Option<DisplayError>,
    notice: Option<Notice>,
}

impl CategoriesController {
    #[must_use]
    pub fn new(api: DashboardApi) -> Self {
        Self::with_sequencing(api, Sequencing::default())
    }

    #[must_use]
    pub const fn with_sequencing(api: DashboardApi, sequencing: Sequencing) -> Self {
        Self {
            api,
            categories: Loadable::new(sequencing),
            mutation_error: None,
            notice: None,
        }
    }

    #[must_use]
    pub const fn categories(&self) -> &Loadable<Vec<Category>> {
        &self.categories
    }

    #[must_use]
    pub const fn mutation_error(&self) -> Option<&DisplayError> {
        self.mutation_error.as_ref()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        let now = Instant::now();
        self.notice
            .as_ref()
            .filter(|n| n.visible_at(now))
            .map(Notice::message)
    }

    /// Fetch every category.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let ticket = self.categories.begin();
        let response = self.api.categories().await;
        self.categories
            .settle(Settled::from_response(ticket, response, FETCH_FALLBACK));
    }

    /// Create a category, then refetch.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&mut self, draft: &CategoryDraft) -> Outcome {
        match self.api.create_category(draft).await {
            Ok(_) => self.succeed("Category created successfully").await,
            Err(e) => self.fail(&e, SAVE_FALLBACK),
        }
    }

    /// Replace a category's fields, then refetch.
    #[instrument(skip(self, draft), fields(category_id = %id))]
    pub async fn update(&mut self, id: CategoryId, draft: &CategoryDraft) -> Outcome {
        match self.api.update_category(id, draft).await {
            Ok(_) => self.succeed("Category updated successfully").await,
            Err(e) => self.fail(&e, SAVE_FALLBACK),
        }
    }

    /// Delete a category after confirmation, then refetch. The backend
    /// refuses while products still reference it; its message is shown as-is.
    #[instrument(skip(self, confirm), fields(category_id = %id))]
    pub async fn delete(&mut self, id: CategoryId, confirm: &dyn Confirm) -> Outcome {
        if !confirm.confirm(DELETE_PROMPT) {
            return Outcome::Declined;
        }
        match self.api.delete_category(id).await {
            Ok(_) => self.succeed("Category deleted successfully").await,
            Err(e) => self.fail(&e, DELETE_FALLBACK),
        }
    }

    async fn succeed(&mut self, message: &str) -> Outcome {
        self.mutation_error = None;
        self.notice = Some(Notice::new(message));
        self.load().await;
        Outcome::Completed
    }

    fn fail(&mut self, err: &ApiError, fallback: &str) -> Outcome {
        let shown = DisplayError::from_api(err, fallback);
        self.mutation_error = Some(shown.clone());
        Outcome::Failed(shown)
    }

    /// Render the page as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> askama::Result<String> {
        let rows = self
            .categories
            .data()
            .map(|list| list.iter().map(CategoryRow::from).collect())
            .unwrap_or_default();

        CategoriesView {
            notice: self.notice(),
            error: self
                .mutation_error
                .as_ref()
                .or_else(|| self.categories.error())
                .map(|e| e.message.as_str()),
            loading: self.categories.is_loading(),
            rows,
        }
        .render()
    }
}

#[derive(Debug, Clone)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: String,
    products: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        let products = match category.product_count {
            Some(1) => "1 product".to_owned(),
            Some(n) => format!("{n} products"),
            None => String::new(),
        };
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            products,
        }
    }
}

#[derive(Template)]
#[template(path = "categories.txt")]
struct CategoriesView<'a> {
    notice: Option<&'a str>,
    error: Option<&'a str>,
    loading: bool,
    rows: Vec<CategoryRow>,
}
