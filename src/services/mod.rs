pub mod database;
pub mod mailer;
pub mod memory;
pub mod seed;
pub mod tasks;
