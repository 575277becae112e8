//! Search module - request/response models, the index trait and pagination.

mod pagination;
mod search_model;
mod search_traits;


pub use pagination::{page_bounds, page_count, paginate};
pub use search_model::{
    FacetCounts, FacetFilter, NumericFilter, NumericOp, SearchIndexes, SearchPage, SearchRequest,
    SearchResponse,
};
pub use search_traits::SearchIndexTrait;
