pub mod intelligence;
pub mod pipeline;
pub mod scheduler;
pub mod scout;
pub mod sources;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod vocabulary;
