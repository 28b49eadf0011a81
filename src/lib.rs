pub mod auction;
pub mod binder;
pub mod clock;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod discord;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod locks;
pub mod scheduler;
pub mod store;
