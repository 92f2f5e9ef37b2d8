mod fixture;

mod archive_tests;
mod pipeline_tests;
