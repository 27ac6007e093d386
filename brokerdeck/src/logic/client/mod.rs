pub mod command;
pub mod gateway;
pub mod list;
pub mod transport;
pub mod url_utils;
