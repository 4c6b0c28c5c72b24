//! Product management: filtered list, create/edit form and deletion.

use std::time::Instant;

use askama::Template;
use emporium_client::{DashboardApi, ListOptions, ProductDraft};
use emporium_core::{
    BulkChanges, Category, CategoryId, Page, Product, ProductId, ProductSort, StockFilter,
};
use tracing::{error, instrument};

use crate::confirm::Confirm;
use crate::controller::{DisplayError, Loadable, Notice, Outcome, Sequencing, Settled, Ticket};

const FETCH_FALLBACK: &str = "Failed to fetch products";
const SAVE_FALLBACK: &str = "Failed to save product";
const DELETE_FALLBACK: &str = "Failed to delete product";
const BULK_FALLBACK: &str = "Failed to update products";
const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";

/// Filters applied to the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub search: String,
    pub category: Option<CategoryId>,
    pub stock: Option<StockFilter>,
    pub sort: ProductSort,
}

impl ProductFilters {
    /// Query options in the order the filter bar lists them.
    #[must_use]
    pub fn to_options(&self) -> ListOptions {
        ListOptions::new()
            .set("search", self.search.as_str())
            .set_opt("category", self.category)
            .set_opt("stock", self.stock)
            .set("sort", self.sort.as_str())
    }
}

/// A product list request that has been issued but not yet sent.
#[derive(Debug, Clone)]
pub struct ProductsFetch {
    ticket: Ticket,
    options: ListOptions,
}

impl ProductsFetch {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    #[must_use]
    pub const fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Send the request.
    pub async fn run(self, api: &DashboardApi) -> Settled<Page<Product>> {
        let response = api.products(&self.options).await;
        Settled::from_response(self.ticket, response, FETCH_FALLBACK)
    }
}

/// Whether the form creates a new product or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(ProductId),
}

/// Open create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEditor {
    pub mode: EditorMode,
    pub draft: ProductDraft,
}

impl ProductEditor {
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "Add New Product",
            EditorMode::Edit(_) => "Edit Product",
        }
    }

    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "Create Product",
            EditorMode::Edit(_) => "Update Product",
        }
    }
}

/// Controller behind `/dashboard/products`.
#[derive(Debug)]
pub struct ProductsController {
    api: DashboardApi,
    filters: ProductFilters,
    products: Loadable<Page<Product>>,
    categories: Vec<Category>,
    editor: Option<ProductEditor>,
    mutation_error: Option<DisplayError>,
    notice: Option<Notice>,
}

impl ProductsController {
    #[must_use]
    pub fn new(api: DashboardApi) -> Self {
        Self::with_sequencing(api, Sequencing::default())
    }

    #[must_use]
    pub fn with_sequencing(api: DashboardApi, sequencing: Sequencing) -> Self {
        Self {
            api,
            filters: ProductFilters::default(),
            products: Loadable::new(sequencing),
            categories: Vec::new(),
            editor: None,
            mutation_error: None,
            notice: None,
        }
    }

    #[must_use]
    pub const fn filters(&self) -> &ProductFilters {
        &self.filters
    }

    #[must_use]
    pub const fn products(&self) -> &Loadable<Page<Product>> {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub const fn editor(&self) -> Option<&ProductEditor> {
        self.editor.as_ref()
    }

    pub const fn editor_mut(&mut self) -> Option<&mut ProductEditor> {
        self.editor.as_mut()
    }

    /// The last mutation failure, if any.
    #[must_use]
    pub const fn mutation_error(&self) -> Option<&DisplayError> {
        self.mutation_error.as_ref()
    }

    /// The success notice, while it is still visible.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        let now = Instant::now();
        self.notice
            .as_ref()
            .filter(|n| n.visible_at(now))
            .map(Notice::message)
    }

    /// Load products and categories for the current filters.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let fetch = self.begin_fetch();
        let api = self.api.clone();
        let (products, categories) = tokio::join!(fetch.run(&api), api.categories());

        self.products.settle(products);
        match categories {
            Ok(response) => self.categories = response.data,
            Err(e) => error!(error = %e, "Error fetching categories"),
        }
    }

    /// Replace the filters and reload.
    pub async fn set_filters(&mut self, filters: ProductFilters) {
        self.filters = filters;
        self.load().await;
    }

    /// Replace the filters and issue a product fetch without sending it.
    ///
    /// The caller runs the returned fetch and hands the result to
    /// [`ProductsController::apply`]; overlapping fetches may be applied in
    /// any order.
    pub fn begin_filter_change(&mut self, filters: ProductFilters) -> ProductsFetch {
        self.filters = filters;
        self.begin_fetch()
    }

    /// Issue a product fetch for the current filters.
    pub fn begin_fetch(&mut self) -> ProductsFetch {
        ProductsFetch {
            ticket: self.products.begin(),
            options: self.filters.to_options(),
        }
    }

    /// Apply a fetch result. Returns `false` if it was discarded as stale.
    pub fn apply(&mut self, settled: Settled<Page<Product>>) -> bool {
        self.products.settle(settled)
    }

    async fn refetch_products(&mut self) {
        let fetch = self.begin_fetch();
        let settled = fetch.run(&self.api).await;
        self.products.settle(settled);
    }

    /// Open an empty form.
    pub fn open_create(&mut self) {
        self.editor = Some(ProductEditor {
            mode: EditorMode::Create,
            draft: ProductDraft::default(),
        });
    }

    /// Open the form pre-filled from `product`.
    pub fn open_edit(&mut self, product: &Product) {
        self.editor = Some(ProductEditor {
            mode: EditorMode::Edit(product.id),
            draft: ProductDraft::from_product(product),
        });
    }

    /// Close the form, discarding its contents.
    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    /// Submit the open form. On success the form closes and the list is
    /// refetched; on failure the form stays open.
    #[instrument(skip(self))]
    pub async fn submit_editor(&mut self) -> Outcome {
        let Some(editor) = self.editor.clone() else {
            return Outcome::Declined;
        };

        let result = match editor.mode {
            EditorMode::Create => self.api.create_product(&editor.draft).await,
            EditorMode::Edit(id) => self.api.update_product(id, &editor.draft).await,
        };

        match result {
            Ok(_) => {
                self.editor = None;
                self.mutation_error = None;
                self.notice = Some(Notice::new(match editor.mode {
                    EditorMode::Create => "Product created successfully",
                    EditorMode::Edit(_) => "Product updated successfully",
                }));
                self.refetch_products().await;
                Outcome::Completed
            }
            Err(e) => self.fail(&e, SAVE_FALLBACK),
        }
    }

    /// Delete a product after confirmation, then refetch.
    #[instrument(skip(self, confirm))]
    pub async fn delete(&mut self, id: ProductId, confirm: &dyn Confirm) -> Outcome {
        if !confirm.confirm(DELETE_PROMPT) {
            return Outcome::Declined;
        }
        match self.api.delete_product(id).await {
            Ok(_) => {
                self.mutation_error = None;
                self.refetch_products().await;
                Outcome::Completed
            }
            Err(e) => self.fail(&e, DELETE_FALLBACK),
        }
    }

    /// Apply `changes` to every product in `ids` after confirmation, then
    /// refetch.
    #[instrument(skip(self, changes, confirm), fields(count = ids.len()))]
    pub async fn bulk_update(
        &mut self,
        ids: &[ProductId],
        changes: &BulkChanges,
        confirm: &dyn Confirm,
    ) -> Outcome {
        let prompt = format!("Apply these changes to {} products?", ids.len());
        if !confirm.confirm(&prompt) {
            return Outcome::Declined;
        }
        match self.api.bulk_update_products(ids, changes).await {
            Ok(response) => {
                self.mutation_error = None;
                self.notice = Some(Notice::new(response.data.message));
                self.refetch_products().await;
                Outcome::Completed
            }
            Err(e) => self.fail(&e, BULK_FALLBACK),
        }
    }

    fn fail(&mut self, err: &emporium_client::ApiError, fallback: &str) -> Outcome {
        let shown = DisplayError::from_api(err, fallback);
        self.mutation_error = Some(shown.clone());
        Outcome::Failed(shown)
    }

    fn category_label(&self, id: Option<CategoryId>) -> String {
        id.map_or_else(
            || "All Categories".to_owned(),
            |id| {
                self.categories
                    .iter()
                    .find(|c| c.id == id)
                    .map_or_else(|| id.to_string(), |c| c.name.clone())
            },
        )
    }

    /// Render the page as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> askama::Result<String> {
        let rows = self
            .products
            .data()
            .map(|page| page.results.iter().map(ProductRow::from).collect())
            .unwrap_or_default();

        let editor = self.editor.as_ref().map(|editor| EditorView {
            title: editor.title(),
            submit_label: editor.submit_label(),
            fields: vec![
                ("Title", editor.draft.title.clone()),
                ("Price", editor.draft.unit_price.to_form_value()),
                ("Stock", editor.draft.stock.to_string()),
                (
                    "Category",
                    editor
                        .draft
                        .category
                        .map_or_else(|| "Select Category".to_owned(), |id| {
                            self.category_label(Some(id))
                        }),
                ),
                ("Description", editor.draft.description.clone()),
                (
                    "Image",
                    editor
                        .draft
                        .image
                        .as_ref()
                        .map_or_else(|| "(unchanged)".to_owned(), |i| i.file_name.clone()),
                ),
            ],
        });

        ProductsView {
            notice: self.notice(),
            error: self
                .mutation_error
                .as_ref()
                .or_else(|| self.products.error())
                .map(|e| e.message.as_str()),
            search: &self.filters.search,
            category: self.category_label(self.filters.category),
            stock: self.filters.stock.map_or("All Stock", |s| s.label()),
            sort: self.filters.sort.label(),
            loading: self.products.is_loading(),
            rows,
            editor,
        }
        .render()
    }
}

/// One product line, pre-formatted.
#[derive(Debug, Clone)]
struct ProductRow {
    id: ProductId,
    title: String,
    price: String,
    stock: u32,
    badges: String,
    category: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let mut badges = String::new();
        if product.is_low_stock {
            badges.push_str(" [Low Stock]");
        }
        if product.is_out_of_stock {
            badges.push_str(" [Out of Stock]");
        }
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.unit_price.to_string(),
            stock: product.stock,
            badges,
            category: product
                .category_name
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_owned()),
        }
    }
}

struct EditorView {
    title: &'static str,
    submit_label: &'static str,
    fields: Vec<(&'static str, String)>,
}

#[derive(Template)]
#[template(path = "products.txt")]
struct ProductsView<'a> {
    notice: Option<&'a str>,
    error: Option<&'a str>,
    search: &'a str,
    category: String,
    stock: &'static str,
    sort: &'static str,
    loading: bool,
    rows: Vec<ProductRow>,
    editor: Option<EditorView>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::Price;

    use super::*;

    fn product(id: i64, low: bool, out: bool) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Product {id}"),
            "unit_price": "4.50",
            "stock": if out { 0 } else { 5 },
            "category_name": "Preserves",
            "is_low_stock": low,
            "is_out_of_stock": out,
        }))
        .unwrap()
    }

    #[test]
    fn test_default_filters_only_send_sort() {
        let options = ProductFilters::default().to_options();
        assert_eq!(options.to_query_string(), "sort=-date_added");
    }

    #[test]
    fn test_filters_keep_bar_order() {
        let filters = ProductFilters {
            search: "jam".to_string(),
            category: Some(CategoryId::new(3)),
            stock: Some(StockFilter::LowStock),
            sort: ProductSort::TitleAsc,
        };
        assert_eq!(
            filters.to_options().to_query_string(),
            "search=jam&category=3&stock=low_stock&sort=title"
        );
    }

    #[test]
    fn test_row_badges() {
        let row = ProductRow::from(&product(1, true, false));
        assert_eq!(row.badges, " [Low Stock]");
        assert_eq!(row.price, "$4.50");
        let row = ProductRow::from(&product(2, false, true));
        assert_eq!(row.badges, " [Out of Stock]");
    }

    #[test]
    fn test_editor_labels() {
        let create = ProductEditor {
            mode: EditorMode::Create,
            draft: ProductDraft::default(),
        };
        assert_eq!(create.title(), "Add New Product");
        assert_eq!(create.submit_label(), "Create Product");
        let edit = ProductEditor {
            mode: EditorMode::Edit(ProductId::new(4)),
            draft: ProductDraft {
                unit_price: Price::parse("1").unwrap(),
                ..ProductDraft::default()
            },
        };
        assert_eq!(edit.title(), "Edit Product");
        assert_eq!(edit.submit_label(), "Update Product");
    }

    #[test]
    fn test_render_empty_list() {
        let view = ProductsView {
            notice: None,
            error: None,
            search: "",
            category: "All Categories".to_string(),
            stock: "All Stock",
            sort: ProductSort::default().label(),
            loading: false,
            rows: Vec::new(),
            editor: None,
        };
        let text = view.render().unwrap();
        assert!(text.starts_with("Products"));
        assert!(text.contains("Sort: Newest First"));
        assert!(text.contains("No products found"));
    }

    #[test]
    fn test_render_rows_and_editor() {
        let view = ProductsView {
            notice: Some("Product created successfully"),
            error: None,
            search: "jam",
            category: "Preserves".to_string(),
            stock: "All Stock",
            sort: ProductSort::default().label(),
            loading: false,
            rows: vec![ProductRow::from(&product(7, true, false))],
            editor: Some(EditorView {
                title: "Add New Product",
                submit_label: "Create Product",
                fields: vec![("Title", "Mango Jam".to_string())],
            }),
        };
        let text = view.render().unwrap();
        assert!(text.contains("Product created successfully"));
        assert!(text.contains("#7 Product 7  $4.50  Stock: 5 [Low Stock]  (Preserves)"));
        assert!(text.contains("Add New Product"));
        assert!(text.contains("  Title: Mango Jam"));
        assert!(!text.contains("No products found"));
    }
}
