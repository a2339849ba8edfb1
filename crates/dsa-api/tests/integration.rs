mod common;

mod health_tests;
mod quiz_tests;
