pub mod error;
pub mod generation;
pub mod llm_config;
pub mod testcase;
