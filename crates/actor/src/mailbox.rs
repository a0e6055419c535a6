use std::fmt::Debug;

use tokio::sync::{mpsc, watch};

use crate::{Actor, ActorDeadError};

/// Object-safe form of [`Message`], so that messages of any type can
/// share one queue.
pub trait ErasedMessage<S>: Send + Debug + 'static {
    /// Unboxes the message and handles it.
    fn handle_erased(self: Box<Self>, state: &mut S, handle: &Actor<S>);
}

/// A message that an actor with state `S` can handle.
///
/// Handlers run on the actor task and must not block. Slow work belongs
/// in a spawned task that reports back with another message.
pub trait Message<S>: ErasedMessage<S> {
    /// Handles the message with exclusive access to the state.
    fn handle(self, state: &mut S, handle: &Actor<S>);
}

impl<S, M: Message<S>> ErasedMessage<S> for M {
    #[inline]
    fn handle_erased(self: Box<Self>, state: &mut S, handle: &Actor<S>) {
        (*self).handle(state, handle)
    }
}

impl<S, M: Message<S> + ?Sized> Message<S> for Box<M> {
    #[inline]
    fn handle(self, state: &mut S, handle: &Actor<S>) {
        self.handle_erased(state, handle)
    }
}

pub type Envelope<S> = Box<dyn Message<S>>;

/// Receiving side, owned by the actor task.
pub struct Inbox<S> {
    pub messages: mpsc::UnboundedReceiver<Envelope<S>>,
    pub killed: watch::Receiver<bool>,
}

/// Sending side, shared by every handle of one actor.
pub struct Mailbox<S> {
    messages: mpsc::UnboundedSender<Envelope<S>>,
    killed: watch::Sender<bool>,
}

impl<S: Send + Sync + 'static> Mailbox<S> {
    pub fn open() -> (Self, Inbox<S>) {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);
        let mailbox = Mailbox {
            messages: msg_tx,
            killed: kill_tx,
        };
        let inbox = Inbox {
            messages: msg_rx,
            killed: kill_rx,
        };
        (mailbox, inbox)
    }

    /// Queues a message. Fails once the actor is killed, even if its task
    /// has not noticed yet.
    pub fn post(&self, msg: Envelope<S>) -> Result<(), ActorDeadError> {
        if *self.killed.borrow() {
            return Err(ActorDeadError);
        }
        self.messages.send(msg).map_err(|_| ActorDeadError)
    }

    #[inline]
    pub fn kill(&self) {
        self.killed.send_replace(true);
    }
}
