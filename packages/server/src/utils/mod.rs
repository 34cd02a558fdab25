pub mod cookies;
pub mod hash;
pub mod id;
pub mod jwt;
