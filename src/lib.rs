pub mod chats;
pub mod constants;
pub mod converter;
pub mod error;
pub mod logging;
pub mod output;
pub mod sbr;
pub mod types;
