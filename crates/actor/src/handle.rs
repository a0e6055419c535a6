use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::Instrument;

use crate::mailbox::Mailbox;
use crate::scheduler::run_actor;
use crate::{ActorDeadError, Message};

/// Handle to an actor.
pub struct Actor<S> {
    mailbox: Arc<Mailbox<S>>,
}

impl<S: Send + Sync + 'static> Actor<S> {
    /// Spawn a new actor with the specified state and an optional label.
    ///
    /// The actor runs on the current tokio runtime until it is killed or
    /// every handle to it has been dropped.
    pub fn spawn(state: S, label: Option<&str>) -> Self {
        let (mailbox, inbox) = Mailbox::open();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, inbox)
                .instrument(trace_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<S>>) -> Self {
        Self { mailbox }
    }

    /// Sends a message to the actor.
    #[inline]
    pub fn send<M: Message<S> + 'static>(
        &self,
        msg: M,
    ) -> Result<(), ActorDeadError> {
        self.mailbox.post(Box::new(msg))
    }

    /// Runs `f` against the actor's state, after all previously sent
    /// messages have been handled, and returns its result.
    pub async fn ask<R, F>(&self, f: F) -> Result<R, ActorDeadError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Ask { f, reply_tx })?;
        reply_rx.await.map_err(|_| ActorDeadError)
    }

    /// Attempts to kill the actor.
    ///
    /// The actor is not guaranteed to be killed immediately, but it
    /// will stop handling further messages and quit soon.
    #[inline]
    pub fn try_kill(&self) {
        self.mailbox.kill();
    }
}

impl<S> Clone for Actor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}

struct Ask<F, R> {
    f: F,
    reply_tx: oneshot::Sender<R>,
}

impl<F, R> fmt::Debug for Ask<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ask").finish_non_exhaustive()
    }
}

impl<S, F, R> Message<S> for Ask<F, R>
where
    F: FnOnce(&mut S) -> R + Send + 'static,
    R: Send + 'static,
{
    #[inline]
    fn handle(self, state: &mut S, _handle: &Actor<S>) {
        // The asker may have given up waiting.
        self.reply_tx.send((self.f)(state)).ok();
    }
}
