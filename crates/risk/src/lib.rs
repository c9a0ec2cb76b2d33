pub mod correct;
pub mod sizer;

pub use correct::correct;
pub use sizer::{RiskFileConfig, RiskSettings, RiskSizer, StopBasis, WorstEntry, DEFAULT_BASE_RISK};
