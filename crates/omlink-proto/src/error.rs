/// Errors produced while decoding a validated payload.
///
/// None of these are fatal to the link; the frame is dropped and the next
/// one is decoded normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The payload had no id byte.
    #[error("empty payload")]
    Empty,

    /// The payload is shorter than the layout for its id.
    #[error("truncated payload for id 0x{id:02X} ({got} bytes, need {needed})")]
    Truncated { id: u8, needed: usize, got: usize },

    /// Response id not in the catalog.
    #[error("unknown response id 0x{0:02X}")]
    UnknownResponse(u8),

    /// Event id not in the catalog.
    #[error("unknown event id 0x{0:02X}")]
    UnknownEvent(u8),
}

impl DecodeError {
    /// The message id the error refers to, when there was one.
    pub fn id(&self) -> Option<u8> {
        match self {
            DecodeError::Empty => None,
            DecodeError::Truncated { id, .. } => Some(*id),
            DecodeError::UnknownResponse(id) | DecodeError::UnknownEvent(id) => Some(*id),
        }
    }
}

/// Errors produced while building or parsing an outbound command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The command word is not known.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument is missing.
    #[error("{command}: missing argument <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    /// An argument could not be parsed.
    #[error("{command}: invalid {argument} '{value}'")]
    InvalidArgument {
        command: &'static str,
        argument: &'static str,
        value: String,
    },

    /// A node id does not fit in 24 bits.
    #[error("node id {0} exceeds 24 bits")]
    NodeIdOutOfRange(u64),

    /// Relayed data does not fit in one frame.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}
