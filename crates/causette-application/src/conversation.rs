//! Conversation controller.
//!
//! Drives one full turn - user input to persisted, displayable outcome - and
//! keeps the cached history consistent with what was shown. The presentation
//! shell calls [`ConversationController::submit`] / [`retry`] / [`reset`] and
//! reads `messages()` plus `is_sending()` for UI gating.
//!
//! [`retry`]: ConversationController::retry
//! [`reset`]: ConversationController::reset

use causette_core::config::WELCOME_MESSAGES;
use causette_core::message::now_iso;
use causette_core::{
    ChatMessage, DispatchOutcome, Dispatcher, FailureKind, WidgetConfig, WidgetStore,
};
use causette_interaction::DispatchClient;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Outcome of one submitted turn, for the shell to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing happened: the input was blank, or a turn is already in flight.
    Ignored,
    /// The assistant answered; the message is already appended and persisted.
    Reply(ChatMessage),
    /// The turn failed. `original_text` carries the submitted text when a
    /// manual retry makes sense (it is `None` for local validation
    /// rejections, which have nothing to resend).
    Failed {
        kind: FailureKind,
        original_text: Option<String>,
    },
}

/// Orchestrates turns over the store and the dispatcher.
///
/// One controller runs one logical conversation on one logical thread; the
/// only suspension point is the network await inside the dispatcher. The
/// `sending` gate is checked synchronously before that await, so no two
/// dispatches ever run concurrently.
pub struct ConversationController {
    store: Arc<WidgetStore>,
    dispatcher: Arc<dyn Dispatcher>,
    messages: Vec<ChatMessage>,
    sending: bool,
    max_message_length: usize,
}

impl ConversationController {
    /// Creates a controller over an arbitrary dispatcher.
    ///
    /// Call [`start`](Self::start) before the first turn.
    pub fn new(
        store: Arc<WidgetStore>,
        dispatcher: Arc<dyn Dispatcher>,
        config: &WidgetConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            messages: Vec::new(),
            sending: false,
            max_message_length: config.max_message_length,
        }
    }

    /// Creates a controller wired to the HTTP [`DispatchClient`] configured
    /// by `config`.
    pub fn with_http_client(store: Arc<WidgetStore>, config: &WidgetConfig) -> Self {
        let client = DispatchClient::from_config(config, config.endpoint_url.clone(), store.clone());
        Self::new(store, Arc::new(client), config)
    }

    /// Explicit startup: ensures the user identifier exists, then adopts the
    /// cached history if one is present and fresh, otherwise seeds a welcome
    /// message and persists it immediately.
    pub fn start(&mut self) {
        self.store.get_or_create_user_id();

        match self.store.load_cache().into_messages() {
            Some(messages) => {
                tracing::debug!(count = messages.len(), "restored messages from cache");
                self.messages = messages;
            }
            None => self.seed_welcome(),
        }
    }

    /// Submits one user turn.
    ///
    /// Blank input and submissions while a turn is in flight are ignored.
    /// The `&mut self` receiver already rules out overlapping turns through
    /// this API; the explicit gate keeps the single-turn invariant local and
    /// mirrors the in-flight state that `is_sending` exposes to the shell.
    /// Over-length input is rejected synchronously with no network call. For
    /// valid input the user message is appended and persisted *before* the
    /// dispatch, so history survives even if the process dies mid-flight. On
    /// failure the user message is not rolled back.
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() || self.sending {
            return TurnOutcome::Ignored;
        }
        if text.chars().count() > self.max_message_length {
            return TurnOutcome::Failed {
                kind: FailureKind::InvalidMessage,
                original_text: None,
            };
        }

        self.messages.push(ChatMessage::user(text));
        self.store.save_cache(&self.messages);

        self.dispatch(text.to_string()).await
    }

    /// Resubmits the exact text of a failed turn as a fresh turn.
    ///
    /// No re-validation and no second user-message append: the message is
    /// already in the history from the original submission.
    pub async fn retry(&mut self, text: &str) -> TurnOutcome {
        if text.is_empty() || self.sending {
            return TurnOutcome::Ignored;
        }
        self.dispatch(text.to_string()).await
    }

    async fn dispatch(&mut self, text: String) -> TurnOutcome {
        self.sending = true;
        let outcome = self.dispatcher.send(&text).await;
        self.sending = false;

        match outcome {
            DispatchOutcome::Success {
                response,
                timestamp,
                agent_type,
            } => {
                let reply = ChatMessage::assistant(response, timestamp, agent_type);
                self.messages.push(reply.clone());
                self.store.save_cache(&self.messages);
                TurnOutcome::Reply(reply)
            }
            DispatchOutcome::Failure { kind } => TurnOutcome::Failed {
                kind,
                original_text: Some(text),
            },
        }
    }

    /// Starts a new conversation: per-conversation store reset, cleared
    /// in-memory history, and a fresh welcome message.
    pub fn reset(&mut self) {
        self.store.reset_conversation();
        self.messages.clear();
        self.seed_welcome();
    }

    fn seed_welcome(&mut self) {
        let welcome = WELCOME_MESSAGES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(WELCOME_MESSAGES[0]);
        self.messages
            .push(ChatMessage::assistant(welcome, now_iso(), None));
        self.store.save_cache(&self.messages);
    }

    /// The current message sequence, in insertion order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a turn is currently in flight.
    pub fn is_sending(&self) -> bool {
        self.sending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use causette_core::MessageRole;
    use causette_infrastructure::MemoryStoreBackend;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Dispatcher that records how often it was called and what the cache
    /// held at dispatch time.
    struct StubDispatcher {
        outcome: DispatchOutcome,
        calls: AtomicUsize,
        store: Arc<WidgetStore>,
        cache_at_send: Mutex<Option<Vec<ChatMessage>>>,
    }

    impl StubDispatcher {
        fn new(outcome: DispatchOutcome, store: Arc<WidgetStore>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
                store,
                cache_at_send: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Dispatcher for StubDispatcher {
        async fn send(&self, _message: &str) -> DispatchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.cache_at_send.lock().unwrap() = self.store.load_cache().into_messages();
            self.outcome.clone()
        }
    }

    fn success_outcome(response: &str) -> DispatchOutcome {
        DispatchOutcome::Success {
            response: response.to_string(),
            timestamp: now_iso(),
            agent_type: Some("audrey".to_string()),
        }
    }

    fn setup(outcome: DispatchOutcome) -> (ConversationController, Arc<StubDispatcher>, Arc<WidgetStore>) {
        let store = Arc::new(WidgetStore::new(
            Arc::new(MemoryStoreBackend::new()),
            Duration::from_secs(300),
        ));
        let dispatcher = StubDispatcher::new(outcome, store.clone());
        let mut controller =
            ConversationController::new(store.clone(), dispatcher.clone(), &WidgetConfig::default());
        controller.start();
        (controller, dispatcher, store)
    }

    #[test]
    fn startup_seeds_one_welcome_message_and_persists_it() {
        let (controller, _, store) = setup(success_outcome("x"));

        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].role, MessageRole::Assistant);
        assert!(WELCOME_MESSAGES.contains(&controller.messages()[0].content.as_str()));

        // The welcome message is persisted immediately.
        let cached = store.load_cache().into_messages().unwrap();
        assert_eq!(cached, controller.messages().to_vec());
    }

    #[test]
    fn startup_adopts_cached_history() {
        let store = Arc::new(WidgetStore::new(
            Arc::new(MemoryStoreBackend::new()),
            Duration::from_secs(300),
        ));
        let previous = vec![
            ChatMessage::assistant("Salut !", now_iso(), None),
            ChatMessage::user("bonjour"),
        ];
        store.save_cache(&previous);

        let dispatcher = StubDispatcher::new(success_outcome("x"), store.clone());
        let mut controller =
            ConversationController::new(store, dispatcher, &WidgetConfig::default());
        controller.start();

        assert_eq!(controller.messages(), previous.as_slice());
    }

    #[tokio::test]
    async fn submit_persists_user_message_before_dispatching() {
        let (mut controller, dispatcher, _) = setup(success_outcome("Bonjour !"));

        controller.submit("coucou").await;

        // The cache observed by the dispatcher already held the user message.
        let seen = dispatcher.cache_at_send.lock().unwrap().clone().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.role, MessageRole::User);
        assert_eq!(last.content, "coucou");
    }

    #[tokio::test]
    async fn successful_turn_appends_and_persists_the_reply() {
        let (mut controller, dispatcher, store) = setup(success_outcome("Bonjour !"));

        let outcome = controller.submit("coucou").await;

        let TurnOutcome::Reply(reply) = outcome else {
            panic!("expected reply, got {outcome:?}");
        };
        assert_eq!(reply.content, "Bonjour !");
        assert_eq!(reply.agent_type.as_deref(), Some("audrey"));
        assert_eq!(dispatcher.calls(), 1);

        // welcome + user + assistant, both in memory and in the cache
        assert_eq!(controller.messages().len(), 3);
        let cached = store.load_cache().into_messages().unwrap();
        assert_eq!(cached, controller.messages().to_vec());
        assert!(!controller.is_sending());
    }

    #[tokio::test]
    async fn failed_turn_keeps_user_message_and_returns_retry_payload() {
        let (mut controller, _, store) = setup(DispatchOutcome::Failure {
            kind: FailureKind::ServiceError,
        });

        let outcome = controller.submit("coucou").await;

        assert_eq!(
            outcome,
            TurnOutcome::Failed {
                kind: FailureKind::ServiceError,
                original_text: Some("coucou".to_string()),
            }
        );

        // The user message stays in history and in the cache; no rollback.
        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[1].content, "coucou");
        let cached = store.load_cache().into_messages().unwrap();
        assert_eq!(cached.len(), 2);
        assert!(!controller.is_sending());
    }

    #[tokio::test]
    async fn blank_input_is_ignored_without_network_activity() {
        let (mut controller, dispatcher, _) = setup(success_outcome("x"));

        assert_eq!(controller.submit("   ").await, TurnOutcome::Ignored);
        assert_eq!(dispatcher.calls(), 0);
        assert_eq!(controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn submissions_while_a_turn_is_in_flight_are_ignored() {
        let (mut controller, dispatcher, _) = setup(success_outcome("x"));
        controller.sending = true;

        assert_eq!(controller.submit("coucou").await, TurnOutcome::Ignored);
        assert_eq!(controller.retry("coucou").await, TurnOutcome::Ignored);
        assert_eq!(dispatcher.calls(), 0);
        assert_eq!(controller.messages().len(), 1);
        assert!(controller.is_sending());
    }

    #[tokio::test]
    async fn over_length_input_is_rejected_synchronously() {
        let (mut controller, dispatcher, _) = setup(success_outcome("x"));

        let text = "a".repeat(2001);
        let outcome = controller.submit(&text).await;

        assert_eq!(
            outcome,
            TurnOutcome::Failed {
                kind: FailureKind::InvalidMessage,
                original_text: None,
            }
        );
        assert_eq!(dispatcher.calls(), 0);
        assert_eq!(controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn length_limit_counts_characters_not_bytes() {
        let (mut controller, dispatcher, _) = setup(success_outcome("x"));

        // 2000 two-byte characters: exactly at the limit, must pass.
        let text = "é".repeat(2000);
        let outcome = controller.submit(&text).await;

        assert!(matches!(outcome, TurnOutcome::Reply(_)));
        assert_eq!(dispatcher.calls(), 1);
    }

    #[tokio::test]
    async fn retry_does_not_append_a_second_user_message() {
        let (mut controller, dispatcher, _) = setup(DispatchOutcome::Failure {
            kind: FailureKind::NetworkError,
        });

        let outcome = controller.submit("coucou").await;
        let TurnOutcome::Failed {
            original_text: Some(text),
            ..
        } = outcome
        else {
            panic!("expected failure with retry payload");
        };

        controller.retry(&text).await;

        assert_eq!(dispatcher.calls(), 2);
        // welcome + single user message, despite two dispatches
        assert_eq!(controller.messages().len(), 2);
    }

    #[test]
    fn reset_preserves_user_id_and_reseeds_welcome() {
        let (mut controller, _, store) = setup(success_outcome("x"));
        let user_id = store.get_or_create_user_id();
        let old_conversation = store.get_or_create_conversation_id();

        controller.reset();

        assert_eq!(store.get_or_create_user_id(), user_id);
        assert_ne!(store.get_or_create_conversation_id(), old_conversation);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].role, MessageRole::Assistant);
        assert!(WELCOME_MESSAGES.contains(&controller.messages()[0].content.as_str()));
    }
}
