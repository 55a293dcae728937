mod brand;

pub use brand::{Brand, BrandInput};
