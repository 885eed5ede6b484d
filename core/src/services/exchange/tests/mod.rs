//! Exchange engine tests

mod service_tests;
