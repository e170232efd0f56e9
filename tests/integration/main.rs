// Integration tests

mod common;
mod pipeline_test;
