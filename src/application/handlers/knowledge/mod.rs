//! Knowledge query handlers - read-only views over the passage collection.

mod inspect_passages;
mod search_passages;

pub use inspect_passages::{
    CollectionOverview, IndexedPassage, InspectPassagesHandler, InspectPassagesQuery,
    InspectPassagesResult, OVERVIEW_SAMPLE_SIZE,
};
pub use search_passages::{
    SearchPassagesError, SearchPassagesHandler, SearchPassagesQuery, DEFAULT_SEARCH_K,
    MAX_SEARCH_K,
};
