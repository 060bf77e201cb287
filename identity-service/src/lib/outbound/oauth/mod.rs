pub mod google;

pub use google::GoogleVerifier;
