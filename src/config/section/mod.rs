//! Configuration section definitions.
//!
//! Each module corresponds to a section in `kittenfeed.toml`:
//!
//! | Module     | TOML Section | Purpose                                |
//! |------------|--------------|----------------------------------------|
//! | `feed`     | `[feed]`     | Channel metadata and output document   |
//! | `store`    | `[store]`    | Bucket location and key selection      |
//! | `pipeline` | `[pipeline]` | Concurrency tuning                     |

mod feed;
mod pipeline;
mod store;

pub use feed::{FeedFormat, FeedSectionConfig};
pub use pipeline::PipelineConfig;
pub use store::StoreSectionConfig;
