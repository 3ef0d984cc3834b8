//! Wire types shared by the scenecraft client.

mod base64_serde;

pub mod config;
pub mod content;
pub mod enums;
pub mod http;
pub mod models;
pub mod response;
pub mod scene;
