pub mod extraction_tests;
pub mod render_tests;
