//! Outbound node streaming.

mod sender;

pub use sender::NodeStreamSender;
