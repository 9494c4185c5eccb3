pub mod conversation;

pub use crate::conversation::{ConversationController, TurnOutcome};
