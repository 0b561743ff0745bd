//! HTTP front end for sitechat: crawl the demo storefront, then answer
//! questions grounded in its text.

pub mod args;
pub mod env_file;
pub mod server;
pub mod state;
