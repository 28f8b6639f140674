//! Common test utilities for mini-ai-gateway
//!
//! # Usage
//!
//! ```rust
//! use crate::common::fixtures::TestEnv;
//!
//! #[actix_web::test]
//! async fn my_test() {
//!     let env = TestEnv::with_tools();
//!     let app = actix_web::test::init_service(create_app(env.state())).await;
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::assert_error;
pub use fixtures::{MultipartBody, TestEnv};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
