pub mod generation;
pub mod testcase;
