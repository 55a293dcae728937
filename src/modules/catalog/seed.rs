//! Demo catalog used by local and demo deployments.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::error::{AppError, Result};
use crate::features::brands::models::BrandInput;
use crate::features::categories::models::CategoryInput;
use crate::features::products::models::{
    ProductAttributeInput, ProductImageInput, ProductInput, ProductStatus,
};
use crate::modules::catalog::store::CatalogStore;

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    parent: Option<&'static str>,
    display_order: i32,
}

struct SeedBrand {
    name: &'static str,
    description: &'static str,
    website: &'static str,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    sku: &'static str,
    category: &'static str,
    brand: Option<&'static str>,
    price: &'static str,
    original_price: Option<&'static str>,
    stock_quantity: i32,
    status: ProductStatus,
    is_featured: bool,
    rating: f64,
    review_count: i32,
    attributes: &'static [(&'static str, &'static str)],
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Electronics",
        description: "Latest electronic devices and gadgets",
        parent: None,
        display_order: 1,
    },
    SeedCategory {
        name: "Clothing",
        description: "Fashion and apparel for all occasions",
        parent: None,
        display_order: 2,
    },
    SeedCategory {
        name: "Home & Garden",
        description: "Everything for your home and garden",
        parent: None,
        display_order: 3,
    },
    SeedCategory {
        name: "Books",
        description: "Books and educational materials",
        parent: None,
        display_order: 4,
    },
    SeedCategory {
        name: "Audio",
        description: "Headphones, speakers and microphones",
        parent: Some("Electronics"),
        display_order: 1,
    },
    SeedCategory {
        name: "Wearables",
        description: "Smart watches and fitness trackers",
        parent: Some("Electronics"),
        display_order: 2,
    },
];

const BRANDS: &[SeedBrand] = &[
    SeedBrand {
        name: "TechnoCore",
        description: "Leading technology brand",
        website: "https://technocore.example.com",
    },
    SeedBrand {
        name: "StyleHub",
        description: "Premium fashion brand",
        website: "https://stylehub.example.com",
    },
    SeedBrand {
        name: "HomeComfort",
        description: "Quality home products",
        website: "https://homecomfort.example.com",
    },
    SeedBrand {
        name: "BookWorld",
        description: "Educational and entertainment books",
        website: "https://bookworld.example.com",
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Wireless Bluetooth Headphones",
        description: "Noise-canceling wireless headphones with 30-hour battery life",
        sku: "WBH-001",
        category: "Audio",
        brand: Some("TechnoCore"),
        price: "199.99",
        original_price: Some("249.99"),
        stock_quantity: 50,
        status: ProductStatus::Active,
        is_featured: true,
        rating: 4.5,
        review_count: 128,
        attributes: &[("Battery life", "30 hours"), ("Connectivity", "Bluetooth 5.3")],
    },
    SeedProduct {
        name: "Smart Watch Series X",
        description: "Fitness tracking smartwatch with health monitoring",
        sku: "SWX-002",
        category: "Wearables",
        brand: Some("TechnoCore"),
        price: "349.99",
        original_price: Some("399.99"),
        stock_quantity: 8,
        status: ProductStatus::Active,
        is_featured: true,
        rating: 4.7,
        review_count: 89,
        attributes: &[("Water resistance", "5 ATM")],
    },
    SeedProduct {
        name: "4K Ultra HD Webcam",
        description: "4K webcam for streaming and video calls",
        sku: "4KW-003",
        category: "Electronics",
        brand: Some("TechnoCore"),
        price: "129.99",
        original_price: None,
        stock_quantity: 25,
        status: ProductStatus::Active,
        is_featured: false,
        rating: 4.3,
        review_count: 67,
        attributes: &[],
    },
    SeedProduct {
        name: "Premium Cotton T-Shirt",
        description: "Breathable organic cotton t-shirt in multiple colors",
        sku: "PCT-004",
        category: "Clothing",
        brand: Some("StyleHub"),
        price: "29.99",
        original_price: Some("39.99"),
        stock_quantity: 100,
        status: ProductStatus::Active,
        is_featured: true,
        rating: 4.2,
        review_count: 156,
        attributes: &[("Material", "100% organic cotton")],
    },
    SeedProduct {
        name: "Denim Jacket Classic",
        description: "Timeless denim jacket with a modern fit",
        sku: "DJC-005",
        category: "Clothing",
        brand: Some("StyleHub"),
        price: "89.99",
        original_price: None,
        stock_quantity: 0,
        status: ProductStatus::Active,
        is_featured: false,
        rating: 4.4,
        review_count: 73,
        attributes: &[],
    },
    SeedProduct {
        name: "Ceramic Plant Pot Set",
        description: "Set of three glazed ceramic pots with drainage",
        sku: "CPP-006",
        category: "Home & Garden",
        brand: Some("HomeComfort"),
        price: "34.50",
        original_price: Some("45.00"),
        stock_quantity: 4,
        status: ProductStatus::Active,
        is_featured: false,
        rating: 4.6,
        review_count: 41,
        attributes: &[("Pieces", "3")],
    },
    SeedProduct {
        name: "Memory Foam Pillow",
        description: "Contoured memory foam pillow for side sleepers",
        sku: "MFP-007",
        category: "Home & Garden",
        brand: None,
        price: "49.00",
        original_price: None,
        stock_quantity: 60,
        status: ProductStatus::Active,
        is_featured: false,
        rating: 3.9,
        review_count: 22,
        attributes: &[],
    },
    SeedProduct {
        name: "Rust in Practice",
        description: "A hands-on guide to systems programming",
        sku: "BKR-008",
        category: "Books",
        brand: Some("BookWorld"),
        price: "39.95",
        original_price: None,
        stock_quantity: 15,
        status: ProductStatus::Active,
        is_featured: true,
        rating: 4.9,
        review_count: 310,
        attributes: &[("Pages", "512"), ("Format", "Paperback")],
    },
    SeedProduct {
        name: "Portable Bluetooth Speaker",
        description: "Waterproof speaker, launching next season",
        sku: "PBS-009",
        category: "Audio",
        brand: Some("TechnoCore"),
        price: "79.99",
        original_price: None,
        stock_quantity: 0,
        status: ProductStatus::Draft,
        is_featured: false,
        rating: 0.0,
        review_count: 0,
        attributes: &[],
    },
];

fn money(value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| AppError::Internal(format!("Invalid seed price '{}': {}", value, e)))
}

fn resolve(ids: &[(&'static str, uuid::Uuid)], name: &str) -> Result<uuid::Uuid> {
    ids.iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| *id)
        .ok_or_else(|| AppError::Internal(format!("Seed reference '{}' not found", name)))
}

/// Populate an empty catalog with demo data.
///
/// Returns `false` without touching anything when any category already
/// exists, so running it on every startup is safe.
pub async fn seed_demo_catalog(store: &dyn CatalogStore, low_stock_threshold: i32) -> Result<bool> {
    if !store.list_categories(true).await?.is_empty() {
        tracing::info!("Catalog already populated, skipping demo seed");
        return Ok(false);
    }

    // Parents are listed before their children
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for seed in CATEGORIES {
        let parent_id = match seed.parent {
            Some(parent) => Some(resolve(&category_ids, parent)?),
            None => None,
        };
        let category = store
            .insert_category(&CategoryInput {
                parent_id,
                name: seed.name.to_string(),
                description: Some(seed.description.to_string()),
                image_url: None,
                display_order: seed.display_order,
                is_active: true,
            })
            .await?;
        category_ids.push((seed.name, category.id));
    }

    let mut brand_ids = Vec::with_capacity(BRANDS.len());
    for seed in BRANDS {
        let brand = store
            .insert_brand(&BrandInput {
                name: seed.name.to_string(),
                description: Some(seed.description.to_string()),
                logo_url: None,
                website: Some(seed.website.to_string()),
                is_active: true,
            })
            .await?;
        brand_ids.push((seed.name, brand.id));
    }

    for seed in PRODUCTS {
        let brand_id = match seed.brand {
            Some(brand) => Some(resolve(&brand_ids, brand)?),
            None => None,
        };
        let image_url = format!(
            "https://cdn.example.com/products/{}.jpg",
            seed.sku.to_lowercase()
        );
        let input = ProductInput {
            category_id: resolve(&category_ids, seed.category)?,
            brand_id,
            name: seed.name.to_string(),
            description: Some(seed.description.to_string()),
            detailed_description: None,
            sku: seed.sku.to_string(),
            price: money(seed.price)?,
            original_price: seed.original_price.map(money).transpose()?,
            stock_quantity: seed.stock_quantity,
            low_stock_threshold,
            status: seed.status,
            is_featured: seed.is_featured,
            main_image_url: Some(image_url.clone()),
            rating: seed.rating,
            review_count: seed.review_count,
        };
        let images = [ProductImageInput {
            image_url,
            alt_text: Some(seed.name.to_string()),
            display_order: 0,
            is_main: true,
        }];
        let attributes: Vec<ProductAttributeInput> = seed
            .attributes
            .iter()
            .enumerate()
            .map(|(i, (name, value))| ProductAttributeInput {
                name: name.to_string(),
                value: value.to_string(),
                display_order: i as i32,
            })
            .collect();

        store.insert_product(&input, &images, &attributes).await?;
    }

    tracing::info!(
        categories = CATEGORIES.len(),
        brands = BRANDS.len(),
        products = PRODUCTS.len(),
        "Demo catalog seeded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::search::SearchCriteria;
    use crate::modules::catalog::MemoryCatalogStore;

    #[tokio::test]
    async fn test_seed_populates_empty_catalog() {
        let store = MemoryCatalogStore::new();
        assert!(seed_demo_catalog(&store, 10).await.unwrap());

        assert_eq!(
            store.list_categories(true).await.unwrap().len(),
            CATEGORIES.len()
        );
        assert_eq!(store.list_brands(true).await.unwrap().len(), BRANDS.len());

        let listed = PRODUCTS
            .iter()
            .filter(|p| p.status == ProductStatus::Active)
            .count() as i64;
        assert_eq!(
            store.count_products(&SearchCriteria::default()).await.unwrap(),
            listed
        );
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryCatalogStore::new();
        assert!(seed_demo_catalog(&store, 10).await.unwrap());
        assert!(!seed_demo_catalog(&store, 10).await.unwrap());
        assert_eq!(store.list_brands(true).await.unwrap().len(), BRANDS.len());
    }
}
