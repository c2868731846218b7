//! UI rendering for the lookup view.

mod result;
mod search;

pub use result::render_result;
pub use search::render_search_bar;
