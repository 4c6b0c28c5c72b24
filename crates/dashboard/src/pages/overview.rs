//! Dashboard overview: store-wide counters and quick links.

use askama::Template;
use emporium_client::DashboardApi;
use emporium_core::DashboardStats;
use tracing::instrument;

use crate::controller::{Loadable, Sequencing, Settled};

const FETCH_FALLBACK: &str = "Failed to fetch dashboard statistics";

/// One counter on the overview grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub name: &'static str,
    pub value: String,
}

/// A shortcut into another dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub href: &'static str,
}

pub const QUICK_ACTIONS: [QuickAction; 4] = [
    QuickAction {
        label: "Add Product",
        href: "/dashboard/products",
    },
    QuickAction {
        label: "Manage Categories",
        href: "/dashboard/categories",
    },
    QuickAction {
        label: "View Reviews",
        href: "/dashboard/reviews",
    },
    QuickAction {
        label: "Manage Users",
        href: "/dashboard/users",
    },
];

/// The six overview cards, in display order.
#[must_use]
pub fn stat_cards(stats: &DashboardStats) -> Vec<StatCard> {
    vec![
        StatCard {
            name: "Total Products",
            value: stats.total_products.to_string(),
        },
        StatCard {
            name: "Categories",
            value: stats.total_categories.to_string(),
        },
        StatCard {
            name: "Reviews",
            value: stats.total_reviews.to_string(),
        },
        StatCard {
            name: "In Stock",
            value: stats.products_with_stock.to_string(),
        },
        StatCard {
            name: "Out of Stock",
            value: stats.products_out_of_stock.to_string(),
        },
        StatCard {
            name: "Avg Rating",
            value: format!("{:.1}", stats.average_rating),
        },
    ]
}

#[derive(Template)]
#[template(path = "overview.txt")]
struct OverviewView<'a> {
    loading: bool,
    error: Option<&'a str>,
    cards: Vec<StatCard>,
    actions: &'a [QuickAction],
}

/// Controller behind `/dashboard`.
#[derive(Debug)]
pub struct OverviewController {
    api: DashboardApi,
    stats: Loadable<DashboardStats>,
}

impl OverviewController {
    #[must_use]
    pub fn new(api: DashboardApi) -> Self {
        Self::with_sequencing(api, Sequencing::default())
    }

    #[must_use]
    pub const fn with_sequencing(api: DashboardApi, sequencing: Sequencing) -> Self {
        Self {
            api,
            stats: Loadable::new(sequencing),
        }
    }

    /// Fetch the statistics.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let ticket = self.stats.begin();
        let response = self.api.stats().await;
        self.stats
            .settle(Settled::from_response(ticket, response, FETCH_FALLBACK));
    }

    #[must_use]
    pub const fn stats(&self) -> &Loadable<DashboardStats> {
        &self.stats
    }

    /// Cards for the loaded statistics; empty until loaded.
    #[must_use]
    pub fn cards(&self) -> Vec<StatCard> {
        self.stats.data().map(stat_cards).unwrap_or_default()
    }

    /// Render the page as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> askama::Result<String> {
        OverviewView {
            loading: self.stats.is_loading(),
            error: self.stats.error().map(|e| e.message.as_str()),
            cards: self.cards(),
            actions: &QUICK_ACTIONS,
        }
        .render()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_cards() {
        let stats = DashboardStats {
            total_products: 12,
            total_categories: 3,
            total_reviews: 40,
            products_with_stock: 10,
            products_out_of_stock: 2,
            average_rating: 4.26,
            recent_products: 1,
        };
        let cards = stat_cards(&stats);
        let names: Vec<_> = cards.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            [
                "Total Products",
                "Categories",
                "Reviews",
                "In Stock",
                "Out of Stock",
                "Avg Rating"
            ]
        );
        assert_eq!(cards[0].value, "12");
        assert_eq!(cards[5].value, "4.3");
    }

    #[test]
    fn test_zero_rating_renders_with_one_decimal() {
        let cards = stat_cards(&DashboardStats::default());
        assert_eq!(cards[5].value, "0.0");
    }

    #[test]
    fn test_render_view() {
        let view = OverviewView {
            loading: false,
            error: None,
            cards: stat_cards(&DashboardStats::default()),
            actions: &QUICK_ACTIONS,
        };
        let text = view.render().unwrap();
        assert!(text.starts_with("Dashboard Overview"));
        assert!(text.contains("Avg Rating: 0.0"));
        assert!(text.contains("Manage Users -> /dashboard/users"));
    }

    #[test]
    fn test_render_error() {
        let view = OverviewView {
            loading: false,
            error: Some(FETCH_FALLBACK),
            cards: Vec::new(),
            actions: &QUICK_ACTIONS,
        };
        let text = view.render().unwrap();
        assert!(text.contains("Error: Failed to fetch dashboard statistics"));
    }
}
