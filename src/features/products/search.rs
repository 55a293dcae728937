//! Product search building blocks shared by both catalog stores: the
//! filter predicate set, the sort policy and the pagination window.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::features::products::models::{Product, ProductListing};
use crate::features::products::pricing;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Filters applied on top of the implicit "listed products only" rule.
/// All present filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    /// Lowercased, trimmed free-text term. Matched as a substring of the
    /// product name, description, category name or brand name.
    pub text: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub on_sale: bool,
    pub in_stock: bool,
    pub featured: bool,
}

impl SearchCriteria {
    /// Normalize a raw free-text term; blank input means no text filter
    pub fn normalize_text(raw: Option<&str>) -> Option<String> {
        raw.map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    pub fn for_category(category_id: Uuid) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn for_brand(brand_id: Uuid) -> Self {
        Self {
            brand_id: Some(brand_id),
            ..Self::default()
        }
    }

    /// `ILIKE` pattern for the text term with LIKE wildcards escaped
    pub fn like_pattern(&self) -> Option<String> {
        self.text.as_deref().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for ch in term.chars() {
                if matches!(ch, '\\' | '%' | '_') {
                    pattern.push('\\');
                }
                pattern.push(ch);
            }
            pattern.push('%');
            pattern
        })
    }

    /// In-process evaluation of the same predicate the SQL store builds
    pub fn matches(&self, listing: &ProductListing) -> bool {
        let product = &listing.product;

        if !product.status.is_listed() {
            return false;
        }

        if let Some(term) = &self.text {
            let contains = |field: Option<&str>| {
                field
                    .map(|value| value.to_lowercase().contains(term.as_str()))
                    .unwrap_or(false)
            };
            let hit = contains(Some(&product.name))
                || contains(product.description.as_deref())
                || contains(Some(&listing.category_name))
                || contains(listing.brand_name.as_deref());
            if !hit {
                return false;
            }
        }

        if self.category_id.is_some_and(|id| product.category_id != id) {
            return false;
        }
        if self.brand_id.is_some() && product.brand_id != self.brand_id {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.on_sale && !pricing::is_on_sale(product.price, product.original_price) {
            return false;
        }
        if self.in_stock && !pricing::is_in_stock(product.stock_quantity) {
            return false;
        }
        if self.featured && !product.is_featured {
            return false;
        }

        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Name,
    Price,
    Rating,
    Newest,
    Popularity,
}

impl SortBy {
    /// Unknown or missing values fall back to name
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("price") => SortBy::Price,
            Some("rating") => SortBy::Rating,
            Some("newest") => SortBy::Newest,
            Some("popularity") => SortBy::Popularity,
            _ => SortBy::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Unknown or missing values fall back to ascending
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    Name,
    Price,
    Rating,
    CreatedAt,
    ViewCount,
}

impl OrderColumn {
    /// SQL expression over the `p` products alias
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderColumn::Name => "LOWER(p.name)",
            OrderColumn::Price => "p.price",
            OrderColumn::Rating => "p.rating",
            OrderColumn::CreatedAt => "p.created_at",
            OrderColumn::ViewCount => "p.view_count",
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            OrderColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            OrderColumn::Price => a.price.cmp(&b.price),
            OrderColumn::Rating => a.rating.total_cmp(&b.rating),
            OrderColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            OrderColumn::ViewCount => a.view_count.cmp(&b.view_count),
        }
    }
}

/// Ordered list of sort keys. `id ASC` is always appended as the final
/// tie-break by both stores, so it is not stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOrdering {
    pub terms: Vec<(OrderColumn, SortDirection)>,
}

impl ProductOrdering {
    pub fn for_sort(sort_by: SortBy, direction: SortDirection) -> Self {
        let term = match sort_by {
            SortBy::Name => (OrderColumn::Name, direction),
            SortBy::Price => (OrderColumn::Price, direction),
            SortBy::Rating => (OrderColumn::Rating, direction),
            // Newest and most popular first regardless of direction
            SortBy::Newest => (OrderColumn::CreatedAt, SortDirection::Desc),
            SortBy::Popularity => (OrderColumn::ViewCount, SortDirection::Desc),
        };
        Self { terms: vec![term] }
    }

    /// Ordering of the featured products shelf
    pub fn featured() -> Self {
        Self {
            terms: vec![
                (OrderColumn::Rating, SortDirection::Desc),
                (OrderColumn::ViewCount, SortDirection::Desc),
            ],
        }
    }

    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        self.terms
            .iter()
            .map(|(column, direction)| direction.apply(column.compare(a, b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// `ORDER BY` body including the id tie-break
    pub fn to_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .terms
            .iter()
            .map(|(column, direction)| format!("{} {}", column.as_sql(), direction.as_sql()))
            .collect();
        parts.push("p.id ASC".to_string());
        parts.join(", ")
    }
}

/// Stateless page window, already clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
}

impl PageWindow {
    /// Pages below 1 become 1; page size defaults to 12 and is clamped to 1..=100
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE) as u32;
        Self { page, page_size }
    }

    /// A single page holding the first `count` rows
    pub fn first(count: u32) -> Self {
        Self {
            page: 1,
            page_size: count.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata for a filtered total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub page_size: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl PageInfo {
    pub fn new(total_count: i64, window: PageWindow) -> Self {
        let page_size = window.page_size as i64;
        let total_pages = (total_count.max(0) + page_size - 1) / page_size;
        Self {
            total_count,
            total_pages,
            current_page: window.page,
            page_size: window.page_size,
            has_previous_page: window.page > 1,
            has_next_page: (window.page as i64) < total_pages,
        }
    }
}

/// Apply criteria, ordering and window to an in-memory listing set and
/// return the filtered total alongside the requested page
pub fn paginate_in_memory(
    mut listings: Vec<ProductListing>,
    criteria: &SearchCriteria,
    ordering: &ProductOrdering,
    window: PageWindow,
) -> (i64, Vec<ProductListing>) {
    listings.retain(|listing| criteria.matches(listing));
    let total = listings.len() as i64;
    listings.sort_by(|a, b| ordering.compare(&a.product, &b.product));

    let page = listings
        .into_iter()
        .skip(window.offset() as usize)
        .take(window.limit() as usize)
        .collect();
    (total, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::models::ProductStatus;
    use chrono::{Duration, TimeZone, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn listing(n: u128, name: &str, price: &str) -> ProductListing {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        ProductListing {
            product: Product {
                id: Uuid::from_u128(n),
                category_id: Uuid::from_u128(1000),
                brand_id: None,
                name: name.to_string(),
                description: None,
                detailed_description: None,
                sku: format!("SKU-{}", n),
                price: dec(price),
                original_price: None,
                stock_quantity: 5,
                low_stock_threshold: 10,
                status: ProductStatus::Active,
                is_featured: false,
                main_image_url: None,
                rating: 0.0,
                review_count: 0,
                view_count: 0,
                created_at: created + Duration::days(n as i64),
                updated_at: created,
            },
            category_name: "Gadgets".to_string(),
            category_image_url: None,
            brand_name: None,
            brand_logo_url: None,
        }
    }

    fn ids(rows: &[ProductListing]) -> Vec<u128> {
        rows.iter().map(|l| l.product.id.as_u128()).collect()
    }

    #[test]
    fn test_page_window_defaults_and_clamps() {
        assert_eq!(PageWindow::new(None, None), PageWindow { page: 1, page_size: 12 });
        assert_eq!(PageWindow::new(Some(0), Some(0)).page, 1);
        assert_eq!(PageWindow::new(Some(-5), Some(0)).page_size, 1);
        assert_eq!(PageWindow::new(Some(3), Some(1000)).page_size, 100);
        assert_eq!(PageWindow::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn test_page_info_math() {
        let info = PageInfo::new(25, PageWindow::new(Some(1), Some(10)));
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_previous_page);
        assert!(info.has_next_page);

        let last = PageInfo::new(25, PageWindow::new(Some(3), Some(10)));
        assert!(last.has_previous_page);
        assert!(!last.has_next_page);

        let beyond = PageInfo::new(25, PageWindow::new(Some(9), Some(10)));
        assert_eq!(beyond.total_pages, 3);
        assert!(!beyond.has_next_page);

        let empty = PageInfo::new(0, PageWindow::default());
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_previous_page);
    }

    #[test]
    fn test_pagination_item_counts() {
        let rows: Vec<ProductListing> = (1..=23)
            .map(|n| listing(n, &format!("Item {:02}", n), "10"))
            .collect();
        let ordering = ProductOrdering::for_sort(SortBy::Name, SortDirection::Asc);
        let criteria = SearchCriteria::default();

        for (page, expected) in [(1, 10), (2, 10), (3, 3), (4, 0)] {
            let window = PageWindow::new(Some(page), Some(10));
            let (total, items) = paginate_in_memory(rows.clone(), &criteria, &ordering, window);
            assert_eq!(total, 23);
            assert_eq!(items.len(), expected, "page {}", page);
        }
    }

    #[test]
    fn test_sort_parse_fallbacks() {
        assert_eq!(SortBy::parse(Some("PRICE")), SortBy::Price);
        assert_eq!(SortBy::parse(Some("bogus")), SortBy::Name);
        assert_eq!(SortBy::parse(None), SortBy::Name);
        assert_eq!(SortDirection::parse(Some("Desc")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("sideways")), SortDirection::Asc);
    }

    #[test]
    fn test_newest_and_popularity_ignore_direction() {
        assert_eq!(
            ProductOrdering::for_sort(SortBy::Newest, SortDirection::Asc),
            ProductOrdering::for_sort(SortBy::Newest, SortDirection::Desc)
        );
        assert_eq!(
            ProductOrdering::for_sort(SortBy::Popularity, SortDirection::Asc).to_sql(),
            "p.view_count DESC, p.id ASC"
        );
    }

    #[test]
    fn test_ties_broken_by_id_ascending() {
        let rows = vec![
            listing(3, "Same", "10"),
            listing(1, "same", "10"),
            listing(2, "SAME", "10"),
        ];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            for sort_by in [SortBy::Name, SortBy::Price, SortBy::Rating] {
                let ordering = ProductOrdering::for_sort(sort_by, direction);
                let (_, first) = paginate_in_memory(
                    rows.clone(),
                    &SearchCriteria::default(),
                    &ordering,
                    PageWindow::default(),
                );
                let (_, second) = paginate_in_memory(
                    rows.clone(),
                    &SearchCriteria::default(),
                    &ordering,
                    PageWindow::default(),
                );
                assert_eq!(ids(&first), vec![1, 2, 3]);
                assert_eq!(ids(&first), ids(&second));
            }
        }
    }

    #[test]
    fn test_price_sort_direction() {
        let rows = vec![
            listing(1, "A", "30"),
            listing(2, "B", "10"),
            listing(3, "C", "20"),
        ];
        let asc = ProductOrdering::for_sort(SortBy::Price, SortDirection::Asc);
        let desc = ProductOrdering::for_sort(SortBy::Price, SortDirection::Desc);
        let criteria = SearchCriteria::default();

        let (_, page) = paginate_in_memory(rows.clone(), &criteria, &asc, PageWindow::default());
        assert_eq!(ids(&page), vec![2, 3, 1]);
        let (_, page) = paginate_in_memory(rows, &criteria, &desc, PageWindow::default());
        assert_eq!(ids(&page), vec![1, 3, 2]);
    }

    #[test]
    fn test_filter_composition_is_intersection() {
        let mut sale = listing(1, "Sale phone", "80");
        sale.product.original_price = Some(dec("100"));
        let mut sale_empty = listing(2, "Sale case", "5");
        sale_empty.product.original_price = Some(dec("10"));
        sale_empty.product.stock_quantity = 0;
        let full_price = listing(3, "Regular phone", "90");
        let rows = vec![sale, sale_empty, full_price];

        let on_sale = SearchCriteria {
            on_sale: true,
            ..Default::default()
        };
        let in_stock = SearchCriteria {
            in_stock: true,
            ..Default::default()
        };
        let both = SearchCriteria {
            on_sale: true,
            in_stock: true,
            ..Default::default()
        };

        let matching = |c: &SearchCriteria| -> Vec<u128> {
            rows.iter()
                .filter(|l| c.matches(l))
                .map(|l| l.product.id.as_u128())
                .collect()
        };

        assert_eq!(matching(&on_sale), vec![1, 2]);
        assert_eq!(matching(&in_stock), vec![1, 3]);
        assert_eq!(matching(&both), vec![1]);
    }

    #[test]
    fn test_text_matches_any_field_case_insensitive() {
        let mut row = listing(1, "Trail Runner", "10");
        row.product.description = Some("Lightweight shoe".to_string());
        row.brand_name = Some("Acme".to_string());

        let text = |t: &str| SearchCriteria {
            text: SearchCriteria::normalize_text(Some(t)),
            ..Default::default()
        };
        assert!(text("runner").matches(&row));
        assert!(text("LIGHTWEIGHT").matches(&row));
        assert!(text("gadg").matches(&row));
        assert!(text("acme").matches(&row));
        assert!(!text("nonexistent-xyz").matches(&row));
    }

    #[test]
    fn test_only_listed_products_match() {
        let mut draft = listing(1, "Draft", "10");
        draft.product.status = ProductStatus::Draft;
        assert!(!SearchCriteria::default().matches(&draft));
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let row = listing(1, "Ten", "10.00");
        let criteria = SearchCriteria {
            min_price: Some(dec("10")),
            max_price: Some(dec("10")),
            ..Default::default()
        };
        assert!(criteria.matches(&row));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let criteria = SearchCriteria {
            text: SearchCriteria::normalize_text(Some(" 100%_off\\ ")),
            ..Default::default()
        };
        assert_eq!(criteria.like_pattern().as_deref(), Some("%100\\%\\_off\\\\%"));
        assert_eq!(SearchCriteria::normalize_text(Some("   ")), None);
    }

    #[test]
    fn test_featured_ordering() {
        let mut a = listing(1, "A", "10");
        a.product.rating = 4.5;
        a.product.view_count = 10;
        let mut b = listing(2, "B", "10");
        b.product.rating = 4.5;
        b.product.view_count = 50;
        let mut c = listing(3, "C", "10");
        c.product.rating = 4.9;

        let (_, page) = paginate_in_memory(
            vec![a, b, c],
            &SearchCriteria::default(),
            &ProductOrdering::featured(),
            PageWindow::first(8),
        );
        assert_eq!(ids(&page), vec![3, 2, 1]);
    }
}
