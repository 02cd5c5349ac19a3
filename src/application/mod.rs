pub mod use_cases;

pub use use_cases::generation::{GenerationInvoker, TestcaseGenerationUseCase};
pub use use_cases::testcase::TestcaseUseCase;
