//! Storage rows to response DTOs. No I/O; derived fields come from
//! `pricing`.

use crate::features::brands::dtos::BrandSummaryDto;
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::products::dtos::{
    ProductAttributeDto, ProductDetailDto, ProductImageDto, ProductSummaryDto,
};
use crate::features::products::models::{ProductAttribute, ProductImage, ProductListing};
use crate::features::products::pricing::DerivedFields;

/// Listing row to summary DTO with nested category and brand summaries
pub fn to_summary(listing: ProductListing) -> ProductSummaryDto {
    let ProductListing {
        product: p,
        category_name,
        category_image_url,
        brand_name,
        brand_logo_url,
    } = listing;

    let derived = DerivedFields::compute(
        p.price,
        p.original_price,
        p.stock_quantity,
        p.low_stock_threshold,
    );
    let brand = match (p.brand_id, brand_name) {
        (Some(id), Some(name)) => Some(BrandSummaryDto {
            id,
            name,
            logo_url: brand_logo_url,
        }),
        _ => None,
    };

    ProductSummaryDto {
        id: p.id,
        name: p.name,
        description: p.description,
        sku: p.sku,
        price: p.price,
        original_price: p.original_price,
        is_on_sale: derived.is_on_sale,
        discount_percentage: derived.discount_percentage,
        stock_quantity: p.stock_quantity,
        is_in_stock: derived.is_in_stock,
        is_low_stock: derived.is_low_stock,
        stock_status: derived.stock_status,
        is_featured: p.is_featured,
        main_image_url: p.main_image_url,
        rating: p.rating,
        review_count: p.review_count,
        category: CategorySummaryDto {
            id: p.category_id,
            name: category_name,
            image_url: category_image_url,
        },
        brand,
        created_at: p.created_at,
    }
}

/// Assemble the detail view. Images and attributes are ordered by display
/// order then id. Without a stored main image URL the image flagged main
/// is used, then the first image.
pub fn to_detail(
    listing: ProductListing,
    mut images: Vec<ProductImage>,
    mut attributes: Vec<ProductAttribute>,
) -> ProductDetailDto {
    images.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.id.cmp(&b.id))
    });
    attributes.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.id.cmp(&b.id))
    });

    let detailed_description = listing.product.detailed_description.clone();
    let low_stock_threshold = listing.product.low_stock_threshold;
    let status = listing.product.status;
    let view_count = listing.product.view_count;
    let updated_at = listing.product.updated_at;

    let mut summary = to_summary(listing);
    if summary.main_image_url.is_none() {
        summary.main_image_url = images
            .iter()
            .find(|i| i.is_main)
            .or_else(|| images.first())
            .map(|i| i.image_url.clone());
    }

    ProductDetailDto {
        summary,
        detailed_description,
        low_stock_threshold,
        status,
        view_count,
        images: images
            .into_iter()
            .map(|i| ProductImageDto {
                id: i.id,
                image_url: i.image_url,
                alt_text: i.alt_text,
                display_order: i.display_order,
                is_main: i.is_main,
            })
            .collect(),
        attributes: attributes
            .into_iter()
            .map(|a| ProductAttributeDto {
                id: a.id,
                name: a.name,
                value: a.value,
                display_order: a.display_order,
            })
            .collect(),
        updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::models::{Product, ProductStatus};
    use crate::features::products::pricing::StockStatus;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn listing() -> ProductListing {
        ProductListing {
            product: Product {
                id: Uuid::now_v7(),
                category_id: Uuid::now_v7(),
                brand_id: None,
                name: "Desk Lamp".to_string(),
                description: None,
                detailed_description: Some("Adjustable arm".to_string()),
                sku: "LAMP-1".to_string(),
                price: Decimal::new(80, 0),
                original_price: Some(Decimal::new(100, 0)),
                stock_quantity: 0,
                low_stock_threshold: 10,
                status: ProductStatus::Active,
                is_featured: false,
                main_image_url: None,
                rating: 4.0,
                review_count: 2,
                view_count: 7,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            category_name: "Lighting".to_string(),
            category_image_url: None,
            brand_name: None,
            brand_logo_url: None,
        }
    }

    fn image(product_id: Uuid, n: u128, order: i32, is_main: bool) -> ProductImage {
        ProductImage {
            id: Uuid::from_u128(n),
            product_id,
            image_url: format!("https://cdn.example.com/{}.jpg", n),
            alt_text: None,
            display_order: order,
            is_main,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_derived_fields() {
        let summary = to_summary(listing());
        assert!(summary.is_on_sale);
        assert_eq!(summary.discount_percentage, Some(Decimal::new(2000, 2)));
        assert!(!summary.is_in_stock);
        assert_eq!(summary.stock_status, StockStatus::OutOfStock);
        assert_eq!(summary.category.name, "Lighting");
        assert!(summary.brand.is_none());
    }

    #[test]
    fn test_summary_without_original_price() {
        let mut row = listing();
        row.product.original_price = None;
        let summary = to_summary(row);
        assert!(!summary.is_on_sale);
        assert!(summary.discount_percentage.is_none());

        let value = serde_json::to_value(&summary).unwrap();
        assert!(value["discountPercentage"].is_null());
    }

    #[test]
    fn test_summary_nests_brand() {
        let mut row = listing();
        row.product.brand_id = Some(Uuid::nil());
        row.brand_name = Some("Acme".to_string());
        let summary = to_summary(row);
        assert_eq!(summary.brand.map(|b| b.name).as_deref(), Some("Acme"));
    }

    #[test]
    fn test_detail_orders_images_and_falls_back_to_main() {
        let row = listing();
        let pid = row.product.id;
        let images = vec![
            image(pid, 3, 2, false),
            image(pid, 2, 1, true),
            image(pid, 1, 1, false),
        ];

        let detail = to_detail(row, images, vec![]);
        let ids: Vec<u128> = detail.images.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            detail.summary.main_image_url.as_deref(),
            Some("https://cdn.example.com/2.jpg")
        );
        assert_eq!(detail.view_count, 7);
    }

    #[test]
    fn test_detail_falls_back_to_first_image() {
        let row = listing();
        let pid = row.product.id;
        let detail = to_detail(row, vec![image(pid, 5, 3, false), image(pid, 4, 0, false)], vec![]);
        assert_eq!(
            detail.summary.main_image_url.as_deref(),
            Some("https://cdn.example.com/4.jpg")
        );
    }

    #[test]
    fn test_stored_main_image_wins() {
        let mut row = listing();
        row.product.main_image_url = Some("https://cdn.example.com/main.jpg".to_string());
        let pid = row.product.id;
        let detail = to_detail(row, vec![image(pid, 1, 0, true)], vec![]);
        assert_eq!(
            detail.summary.main_image_url.as_deref(),
            Some("https://cdn.example.com/main.jpg")
        );
    }
}
