pub mod auth;
pub mod auto_update;
pub mod logging;
