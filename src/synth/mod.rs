// Synthesis - oscillator, envelope and voice of a scheduled tone

pub mod envelope;
pub mod oscillator;
pub mod voice;
