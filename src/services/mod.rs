pub mod announcer;
pub mod invite;
pub mod message_log;
