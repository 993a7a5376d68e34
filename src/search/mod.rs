pub mod display;
pub mod normalize;
pub mod rank;
pub mod session;
pub mod types;

pub use normalize::{dedup_by_content, normalize};
pub use session::SessionRegistry;
pub use types::{InvalidRecordPolicy, RankingCriterion, RawSearchResult};
