mod brand_dto;

pub use brand_dto::{BrandRequestDto, BrandResponseDto, BrandSummaryDto, ListBrandsQuery};
