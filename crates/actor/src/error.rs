use thiserror::Error;

/// Returned when a message cannot reach an actor, or its answer never
/// arrives, because the actor has stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("actor stopped before handling the message")]
pub struct ActorDeadError;
