// Lock-free communication channel to the audio callback

use crate::messaging::command::AudioCommand;
use ringbuf::HeapRb;
use ringbuf::traits::{Observer, Producer, Split};

pub type CommandProducer = ringbuf::HeapProd<AudioCommand>;
pub type CommandConsumer = ringbuf::HeapCons<AudioCommand>;

/// Slots only `CancelAll` may fill
pub const CANCEL_ALL_RESERVE: usize = 1;

/// Creates a channel holding `capacity` ordinary commands plus the reserved slot
pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<AudioCommand>::new(capacity + CANCEL_ALL_RESERVE);
    rb.split()
}

/// Pushes a command. Anything but `CancelAll` is refused once only the
/// reserved slot is left; `CancelAll` on a full ring is already covered by
/// the one queued in that slot.
pub fn push_command(tx: &mut CommandProducer, command: AudioCommand) -> bool {
    match command {
        AudioCommand::CancelAll => tx.is_full() || tx.try_push(command).is_ok(),
        _ if tx.vacant_len() <= CANCEL_ALL_RESERVE => false,
        _ => tx.try_push(command).is_ok(),
    }
}
