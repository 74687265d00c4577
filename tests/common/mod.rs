#![allow(dead_code)]

pub use assetpipe_test_utils::{builders, fake_compiler, init_tracing, logs, with_timeout};
