//! A lightweight actor runtime.
//!
//! An actor owns a piece of state and handles its messages one at a time on
//! a dedicated task, which makes it a natural single writer for state that
//! would otherwise need locking.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::ActorDeadError;
pub use handle::Actor;
pub use mailbox::Message;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;

    #[derive(Default)]
    struct Counter {
        value: u32,
        log: Vec<u32>,
    }

    #[derive(Debug)]
    struct AddMessage(u32);

    impl Message<Counter> for AddMessage {
        fn handle(self, state: &mut Counter, _handle: &Actor<Counter>) {
            state.value += self.0;
            state.log.push(self.0);
        }
    }

    #[derive(Debug)]
    struct GetMessage(oneshot::Sender<u32>);

    impl Message<Counter> for GetMessage {
        fn handle(self, state: &mut Counter, _handle: &Actor<Counter>) {
            self.0.send(state.value).unwrap();
        }
    }

    #[derive(Debug)]
    struct AddLater(u32);

    impl Message<Counter> for AddLater {
        fn handle(self, _state: &mut Counter, handle: &Actor<Counter>) {
            let handle = handle.clone();
            let value = self.0;
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                handle.send(AddMessage(value)).ok();
            });
        }
    }

    #[tokio::test]
    async fn test_send_message() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.send(AddMessage(42)).unwrap();

        let (tx, rx) = oneshot::channel();
        actor.send(GetMessage(tx)).unwrap();
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_messages_are_handled_in_order() {
        let actor = Actor::spawn(Counter::default(), Some("counter"));
        for i in 1..=5 {
            actor.send(AddMessage(i)).unwrap();
        }
        let log = actor.ask(|state| state.log.clone()).await.unwrap();
        assert_eq!(log, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_message_from_spawned_task() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.send(AddLater(7)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(actor.ask(|state| state.value).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_killed_actor() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.try_kill();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(actor.ask(|state| state.value).await.is_err());
    }

    #[tokio::test]
    async fn test_send_after_kill() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.try_kill();
        assert_eq!(actor.send(AddMessage(1)), Err(ActorDeadError));
        assert_eq!(
            ActorDeadError.to_string(),
            "actor stopped before handling the message"
        );
    }
}
