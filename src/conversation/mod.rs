pub mod client;

use chrono::Utc;
use log::{ info, warn, error };
use std::sync::{ Arc, Mutex, MutexGuard };

use crate::error::ChatError;
use crate::history::MessageStore;
use crate::models::chat::Turn;
use self::client::ChatApi;

/// Busy state of a controller: at most one send is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    Sending,
}

impl SendState {
    /// `idle → sending`. Returns `false` and stays put when already sending.
    pub fn begin(&mut self) -> bool {
        match self {
            SendState::Idle => {
                *self = SendState::Sending;
                true
            }
            SendState::Sending => false,
        }
    }

    pub fn finish(&mut self) {
        *self = SendState::Idle;
    }
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Another send was in flight; nothing happened.
    Dropped,
    Replied(Turn),
    /// The gateway call failed. The user's turn stays in the conversation.
    Failed(ChatError),
}

#[derive(Default)]
struct Session {
    state: SendState,
    turns: Vec<Turn>,
    errors: Vec<ChatError>,
}

/// Owns the live conversation and mirrors it to the message store.
pub struct ConversationController {
    store: Arc<dyn MessageStore>,
    api: Arc<dyn ChatApi>,
    greeting_text: String,
    session: Mutex<Session>,
}

/// Returns the controller to `idle` however the send ends.
struct SendingGuard<'a>(&'a ConversationController);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.session().state.finish();
    }
}

impl ConversationController {
    pub fn new(
        store: Arc<dyn MessageStore>,
        api: Arc<dyn ChatApi>,
        greeting_text: impl Into<String>
    ) -> Self {
        Self {
            store,
            api,
            greeting_text: greeting_text.into(),
            session: Mutex::new(Session::default()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn messages(&self) -> Vec<Turn> {
        self.session().turns.clone()
    }

    pub fn state(&self) -> SendState {
        self.session().state
    }

    /// Drains the persistence errors swallowed since the last call.
    pub fn take_errors(&self) -> Vec<ChatError> {
        std::mem::take(&mut self.session().errors)
    }

    fn record(&self, err: ChatError) {
        self.session().errors.push(err);
    }

    /// Stamps `turn` with the current time and writes it to the store.
    /// A failed write is logged and recorded; the stamped turn is returned either way.
    async fn persist(&self, turn: Turn) -> Turn {
        let stamped = turn.with_timestamp(Utc::now());
        if let Err(e) = self.store.add_message(&stamped).await {
            error!("Error saving message: {}", e);
            self.record(e);
        }
        stamped
    }

    /// Replaces the conversation with every persisted turn, oldest first.
    pub async fn load(&self) -> Result<usize, ChatError> {
        match self.store.list_messages().await {
            Ok(turns) => {
                let count = turns.len();
                self.session().turns = turns;
                info!("Loaded {} message(s) from history", count);
                Ok(count)
            }
            Err(e) => {
                error!("Error loading messages: {}", e);
                Err(e)
            }
        }
    }

    pub async fn send(&self, turn: Turn) -> SendOutcome {
        if !self.session().state.begin() {
            warn!("Send ignored: a reply is still pending");
            return SendOutcome::Dropped;
        }
        let _guard = SendingGuard(self);

        let stamped = self.persist(turn).await;
        let updated = {
            let mut session = self.session();
            session.turns.push(stamped);
            session.turns.clone()
        };

        let reply = match self.api.post_chat(&updated).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Chat request failed: {}", e);
                return SendOutcome::Failed(e);
            }
        };

        let stamped = self.persist(reply).await;
        self.session().turns.push(stamped.clone());
        SendOutcome::Replied(stamped)
    }

    /// Persists a fresh greeting and makes it the whole conversation.
    /// Previously persisted turns are left in the store.
    pub async fn reset(&self) {
        let greeting = self.persist(Turn::model(self.greeting_text.clone())).await;
        self.session().turns = vec![greeting];
    }

    /// Deletes every persisted turn, then resets.
    pub async fn clear(&self) -> Result<(), ChatError> {
        match self.store.clear_messages().await {
            Ok(removed) => info!("Cleared {} persisted message(s)", removed),
            Err(e) => {
                error!("Error clearing messages: {}", e);
                return Err(e);
            }
        }

        self.reset().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_state_rejects_reentry() {
        let mut state = SendState::default();
        assert!(state.begin());
        assert_eq!(state, SendState::Sending);
        assert!(!state.begin());
        assert_eq!(state, SendState::Sending);
        state.finish();
        assert_eq!(state, SendState::Idle);
        assert!(state.begin());
    }
}
