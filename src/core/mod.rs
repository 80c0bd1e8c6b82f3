pub mod bom;
pub mod etl;
pub mod fetch;
pub mod parts;
pub mod pipeline;
pub mod pricing;

pub use crate::domain::model::{BomTable, PricedBom, ResultSet};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
