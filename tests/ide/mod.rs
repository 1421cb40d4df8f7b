//! IDE feature tests.

mod tests_analysis;
