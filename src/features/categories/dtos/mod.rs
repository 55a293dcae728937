mod category_dto;

pub use category_dto::{
    CategoryDetailDto, CategoryRequestDto, CategoryResponseDto, CategorySummaryDto,
    CategoryTreeDto, ListCategoriesQuery,
};
