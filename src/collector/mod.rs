pub mod hkjc;

pub use hkjc::HkjcClient;
