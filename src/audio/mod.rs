// Audio - tone scheduling backends and the real-time mix

pub mod dsp_utils;
pub mod engine;
pub mod format_conversion;
pub mod mixer;
pub mod scheduler;
pub mod timing;
pub mod virtual_scheduler;
