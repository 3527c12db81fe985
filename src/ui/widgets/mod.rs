pub mod connection_panel;
pub mod log_panel;
pub mod message_panel;
