//! Series transformations: monthly aggregation, scaling and gap filling.

pub mod aggregate;
pub mod fill;
pub mod scale;

pub use aggregate::{aggregate_monthly, EmptyMonthPolicy};
pub use fill::forward_back_fill;
pub use scale::{abs_max_scale, is_binary, standardize, ScaleResult};
