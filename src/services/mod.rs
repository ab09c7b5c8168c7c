pub mod lookup;
pub mod report;
pub mod store;
pub mod upload;
pub mod verifier;
