mod loader_tests;
mod render_tests;
