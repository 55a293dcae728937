mod product;
mod product_attribute;
mod product_image;

pub use product::{PriceBounds, Product, ProductInput, ProductListing, ProductStatus};
pub use product_attribute::{ProductAttribute, ProductAttributeInput};
pub use product_image::{ProductImage, ProductImageInput};
