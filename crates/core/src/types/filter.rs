//! Filter and sort values accepted by the dashboard list endpoints.

use serde::{Deserialize, Serialize};

/// Stock status filter for the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    /// Stock above zero.
    InStock,
    /// Stock exactly zero.
    OutOfStock,
    /// Stock between one and ten.
    LowStock,
}

impl StockFilter {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::LowStock => "low_stock",
        }
    }

    /// Label shown in filter menus.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::OutOfStock => "Out of Stock",
            Self::LowStock => "Low Stock",
        }
    }
}

impl std::fmt::Display for StockFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            "low_stock" => Ok(Self::LowStock),
            _ => Err(format!("invalid stock filter: {s}")),
        }
    }
}

/// Sort order for the product list. A leading `-` means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductSort {
    #[serde(rename = "title")]
    TitleAsc,
    #[serde(rename = "-title")]
    TitleDesc,
    #[serde(rename = "unit_price")]
    PriceAsc,
    #[serde(rename = "-unit_price")]
    PriceDesc,
    #[serde(rename = "stock")]
    StockAsc,
    #[serde(rename = "-stock")]
    StockDesc,
    #[serde(rename = "date_added")]
    Oldest,
    #[default]
    #[serde(rename = "-date_added")]
    Newest,
}

impl ProductSort {
    /// Every sort order the backend accepts.
    pub const ALL: [Self; 8] = [
        Self::Newest,
        Self::Oldest,
        Self::TitleAsc,
        Self::TitleDesc,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::StockAsc,
        Self::StockDesc,
    ];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TitleAsc => "title",
            Self::TitleDesc => "-title",
            Self::PriceAsc => "unit_price",
            Self::PriceDesc => "-unit_price",
            Self::StockAsc => "stock",
            Self::StockDesc => "-stock",
            Self::Oldest => "date_added",
            Self::Newest => "-date_added",
        }
    }

    /// Label shown in sort menus.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TitleAsc => "Name A-Z",
            Self::TitleDesc => "Name Z-A",
            Self::PriceAsc => "Price Low-High",
            Self::PriceDesc => "Price High-Low",
            Self::StockAsc => "Stock Low-High",
            Self::StockDesc => "Stock High-Low",
            Self::Oldest => "Oldest First",
            Self::Newest => "Newest First",
        }
    }
}

impl std::fmt::Display for ProductSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| format!("invalid sort order: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_round_trips_through_str() {
        for sort in ProductSort::ALL {
            assert_eq!(sort.as_str().parse::<ProductSort>().unwrap(), sort);
        }
        assert!("price".parse::<ProductSort>().is_err());
    }

    #[test]
    fn test_default_sort_is_newest() {
        assert_eq!(ProductSort::default().as_str(), "-date_added");
    }

    #[test]
    fn test_stock_filter_parse() {
        assert_eq!(
            "low_stock".parse::<StockFilter>().unwrap(),
            StockFilter::LowStock
        );
        assert!("some".parse::<StockFilter>().is_err());
    }
}
