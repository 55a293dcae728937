mod product_dto;

pub use product_dto::{
    FeaturedQuery, ProductAttributeDto, ProductAttributeRequestDto, ProductDetailDto,
    ProductImageDto, ProductImageRequestDto, ProductRequestDto, ProductSearchQuery,
    ProductSearchResponseDto, ProductSummaryDto, ProductWrite,
};
