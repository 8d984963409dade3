//! Row-processing pipeline
//!
//! Each stage is a pure function of its input rows and its own state:
//! filter → search → sort → paginate. Selection and distinct values observe
//! the pipeline without feeding back into it.
//!
//! # Example
//!
//! ```
//! use gridline_lib::model::{ColumnDescriptor, Row};
//! use gridline_lib::pipeline::{filter, search, FilterState, Pagination, SortEngine};
//!
//! let columns = vec![ColumnDescriptor::new("name", "Name"), ColumnDescriptor::new("team", "Team")];
//! let rows = vec![
//!     Row::new().set("name", "Ada").set("team", "core"),
//!     Row::new().set("name", "Bob").set("team", "web"),
//!     Row::new().set("name", "Cy").set("team", "core"),
//! ];
//!
//! let mut filters = FilterState::for_columns(&columns);
//! filters.set("team", ["core"]);
//! let filtered = filter::apply(&rows, &filters, &columns);
//! let searched = search::apply(&filtered, "", &["name".to_string()]);
//!
//! let mut sort = SortEngine::new();
//! sort.sort_by("name", &columns);
//! sort.sort_by("name", &columns);
//! let sorted = sort.sorted(&searched, &columns);
//!
//! let pagination = Pagination::new(1);
//! let page = pagination.paginate(&sorted);
//! assert_eq!(page[0].get_string("name").unwrap(), Some("Cy"));
//! ```

pub mod distinct;
pub mod filter;
pub mod page;
pub mod search;
pub mod selection;
pub mod sort;

pub use distinct::DistinctValueIndex;
pub use filter::FilterState;
pub use page::Page;
pub use page::PageInfo;
pub use page::Pagination;
pub use search::SearchState;
pub use selection::SelectionTracker;
pub use sort::Direction;
pub use sort::SortEngine;
pub use sort::SortState;
