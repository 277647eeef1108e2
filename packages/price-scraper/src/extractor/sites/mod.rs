pub(crate) mod black_belt;
pub(crate) mod bulk_nutrients;
pub(crate) mod chemist_warehouse;
pub(crate) mod cost_price;
pub(crate) mod myprotein;
