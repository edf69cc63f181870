//! Stage executors for the research pipeline
//!
//! Each stage implements `Stage<AnalysisState>`: it reads the fields earlier
//! stages wrote, performs its collaborator round trip(s), and writes its own
//! fields. The two fetch stages recover from collaborator failures locally
//! via sentinel substitution; synthesis failures abort the run.

pub mod financials;
pub mod news;
pub mod synthesis;

pub use financials::{FINANCIALS_ERROR_SENTINEL, FinancialsStage};
pub use news::NewsStage;
pub use synthesis::SynthesisStage;
