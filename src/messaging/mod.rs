// Messaging - control thread to audio callback

pub mod channels;
pub mod command;
