// Commands - control thread -> audio callback

use crate::audio::scheduler::{ToneHandle, ToneRequest};

#[derive(Debug, Clone, Copy)]
pub enum AudioCommand {
    Schedule {
        handle: ToneHandle,
        request: ToneRequest,
    },
    Cancel(ToneHandle),
    CancelAll,
}
