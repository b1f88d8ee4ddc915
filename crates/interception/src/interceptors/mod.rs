//! Interceptors shipped with the crate.

mod log;
mod retry;
mod timing;

pub use log::{LogInterceptor, LogLevel};
pub use retry::{RetryInterceptor, RetryPolicy};
pub use timing::{MethodStats, TimingInterceptor, TimingRecorder};
