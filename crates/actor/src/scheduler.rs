use std::sync::Weak;

use tokio::select;

use crate::mailbox::{Inbox, Mailbox};
use crate::{Actor, Message};

/// Handles messages until the actor is killed or its last handle is gone.
pub async fn run_actor<S: Send + Sync + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    inbox: Inbox<S>,
) {
    let Inbox {
        mut messages,
        mut killed,
    } = inbox;

    debug!("started");
    let mut handled = 0u64;
    loop {
        let msg = select! {
            biased;

            _ = killed.changed() => break,
            msg = messages.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };
        trace!("received message: {msg:?}");

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("no handles left, dropping the message");
            break;
        };
        trace_span!("proc msg", seq = handled).in_scope(|| {
            msg.handle(&mut state, &Actor::from_mailbox(mailbox));
        });
        handled += 1;
    }
    debug!(handled, "stopped");
}
