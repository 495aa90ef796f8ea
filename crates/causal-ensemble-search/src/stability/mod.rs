//! Stability selection (CStaS) over subsampled effect rankings.

pub mod bounds;
mod record;
pub mod screening;
mod selector;
pub mod threshold;


pub use bounds::{er, pcer};
pub use record::{sort_records, Record};
pub use screening::{screen_variables, Screening, ScreeningTask};
pub use selector::{EffectRankingTask, StabilityReport, StabilitySelector};
pub use threshold::{inclusion_probabilities, search_threshold, Selection};
