pub mod article;
pub mod save;
pub mod search;
pub mod toolkit;
