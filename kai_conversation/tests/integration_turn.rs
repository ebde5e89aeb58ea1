//! End-to-end turn flow against recording fake collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use kai_conversation::{ChatOrchestrator, TurnError, TurnPhase};
use kai_core::{ContextEntry, GenerationResult, GenerationService, Sender, SessionService};

fn reply_payload(text: &str) -> String {
    format!(r#"{{"candidates":[{{"content":{{"parts":[{{"text":"{text}"}}]}}}}]}}"#)
}

/// Fake session store that records every call.
#[derive(Default)]
struct FakeStore {
    create_calls: AtomicUsize,
    fail_create: AtomicBool,
    blank_id: AtomicBool,
    fail_add: AtomicBool,
    interactions: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl SessionService for &FakeStore {
    async fn create_session(&self, _first_prompt: &str) -> anyhow::Result<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            anyhow::bail!("chat store unavailable");
        }
        if self.blank_id.load(Ordering::SeqCst) {
            return Ok("   ".to_string());
        }
        Ok("session-1".to_string())
    }

    async fn add_interaction(
        &self,
        session_id: &str,
        prompt: &str,
        reply: &str,
    ) -> anyhow::Result<()> {
        if self.fail_add.load(Ordering::SeqCst) {
            anyhow::bail!("write rejected");
        }
        if let Ok(mut interactions) = self.interactions.lock() {
            interactions.push((
                session_id.to_string(),
                prompt.to_string(),
                reply.to_string(),
            ));
        }
        Ok(())
    }
}

/// Fake generation service driven by a scripted response queue.
#[derive(Default)]
struct FakeGenerator {
    calls: Mutex<Vec<(String, Vec<ContextEntry>)>>,
    script: Mutex<VecDeque<anyhow::Result<GenerationResult>>>,
}

impl FakeGenerator {
    fn push(&self, result: anyhow::Result<GenerationResult>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn context_of_call(&self, index: usize) -> Vec<ContextEntry> {
        self.calls
            .lock()
            .ok()
            .and_then(|calls| calls.get(index).map(|(_, context)| context.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationService for &FakeGenerator {
    async fn generate_reply(
        &self,
        prompt: &str,
        context: &[ContextEntry],
    ) -> anyhow::Result<GenerationResult> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt.to_string(), context.to_vec()));
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| Ok(GenerationResult::Ok(reply_payload("Hi"))))
    }
}

#[tokio::test]
async fn first_turn_creates_session_with_empty_context() {
    let store = FakeStore::default();
    let generator = FakeGenerator::default();
    generator.push(Ok(GenerationResult::Ok(reply_payload("Hi"))));

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");

    let reply = orchestrator.submit().await;

    assert_eq!(reply.ok().as_deref(), Some("Hi"));
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    assert!(generator.context_of_call(0).is_empty());

    let conversation = orchestrator.conversation();
    assert_eq!(conversation.session_id.as_deref(), Some("session-1"));
    assert_eq!(conversation.message_count(), 2);
    assert_eq!(conversation.messages[0].sender, Sender::User);
    assert_eq!(conversation.messages[0].text, "Hello");
    assert_eq!(conversation.messages[1].sender, Sender::Model);
    assert_eq!(conversation.messages[1].text, "Hi");
    assert!(!conversation.busy);
    assert_eq!(conversation.status, "Ready.");
    assert_eq!(orchestrator.phase(), TurnPhase::Idle);
}

#[tokio::test]
async fn second_turn_reuses_session_and_sends_prior_history() {
    let store = FakeStore::default();
    let generator = FakeGenerator::default();
    generator.push(Ok(GenerationResult::Ok(reply_payload("Hi"))));
    generator.push(Ok(GenerationResult::Ok(reply_payload("Sure"))));

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");
    assert!(orchestrator.submit().await.is_ok());

    orchestrator.set_draft("More");
    assert!(orchestrator.submit().await.is_ok());

    // Session created exactly once across both turns.
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

    // The second call's context holds the first turn only; the current
    // prompt travels separately and is never duplicated into history.
    let context = generator.context_of_call(1);
    assert_eq!(context.len(), 2);
    assert_eq!(context[0].role, "user");
    assert_eq!(context[0].parts[0].text, "Hello");
    assert_eq!(context[1].role, "model");
    assert_eq!(context[1].parts[0].text, "Hi");

    let interactions = store
        .interactions
        .lock()
        .map(|i| i.clone())
        .unwrap_or_default();
    assert_eq!(interactions.len(), 2);
    assert_eq!(
        interactions[1],
        (
            "session-1".to_string(),
            "More".to_string(),
            "Sure".to_string()
        )
    );
}

#[tokio::test]
async fn logical_generation_error_rolls_back_the_turn() {
    let store = FakeStore::default();
    let generator = FakeGenerator::default();
    generator.push(Ok(GenerationResult::Ok(reply_payload("Hi"))));
    generator.push(Ok(GenerationResult::Err("quota exceeded".to_string())));

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");
    assert!(orchestrator.submit().await.is_ok());
    let before = orchestrator.conversation().messages.clone();

    orchestrator.set_draft("More");
    let err = orchestrator.submit().await;

    assert!(matches!(err, Err(TurnError::Generation(_))));
    let conversation = orchestrator.conversation();
    assert_eq!(conversation.messages, before);
    assert!(conversation.status.contains("quota exceeded"));
    assert!(!conversation.busy);
    // The typed prompt is considered lost on failure.
    assert!(conversation.draft.is_empty());
}

#[tokio::test]
async fn transport_failure_is_folded_into_the_error_branch() {
    let store = FakeStore::default();
    let generator = FakeGenerator::default();
    generator.push(Err(anyhow::anyhow!("connection reset")));

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");

    let err = orchestrator.submit().await;

    assert!(matches!(err, Err(TurnError::Generation(_))));
    let conversation = orchestrator.conversation();
    assert!(conversation.messages.is_empty());
    assert!(conversation.status.contains("connection reset"));
    assert!(!conversation.busy);
}

#[tokio::test]
async fn payload_without_candidates_rolls_back_like_an_error() {
    let store = FakeStore::default();
    let generator = FakeGenerator::default();
    generator.push(Ok(GenerationResult::Ok(r#"{"candidates":[]}"#.to_string())));

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");

    let err = orchestrator.submit().await;

    assert!(matches!(err, Err(TurnError::ResponseShape(_))));
    let conversation = orchestrator.conversation();
    assert!(conversation.messages.is_empty());
    assert!(!conversation.busy);

    // Nothing was persisted for the failed turn.
    let interactions = store
        .interactions
        .lock()
        .map(|i| i.clone())
        .unwrap_or_default();
    assert!(interactions.is_empty());
}

#[tokio::test]
async fn persistence_failure_hides_the_reply_and_rolls_back() {
    let store = FakeStore::default();
    store.fail_add.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::default();
    generator.push(Ok(GenerationResult::Ok(reply_payload("Hi"))));

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");

    let err = orchestrator.submit().await;

    assert!(matches!(err, Err(TurnError::Persistence(_))));
    let conversation = orchestrator.conversation();
    assert!(conversation.messages.is_empty());
    assert!(conversation.status.contains("write rejected"));
    assert!(!conversation.busy);
    // Generation did run; the reply is withheld because it could not
    // be durably recorded.
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn failed_session_creation_leaves_id_unset_for_retry() {
    let store = FakeStore::default();
    store.fail_create.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::default();

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");

    let err = orchestrator.submit().await;
    assert!(matches!(err, Err(TurnError::SessionCreation(_))));
    assert!(orchestrator.conversation().session_id.is_none());
    assert!(orchestrator.conversation().messages.is_empty());
    assert_eq!(generator.call_count(), 0);

    // A later submission retries creation and succeeds.
    store.fail_create.store(false, Ordering::SeqCst);
    generator.push(Ok(GenerationResult::Ok(reply_payload("Hi"))));
    orchestrator.set_draft("Hello");
    assert!(orchestrator.submit().await.is_ok());

    assert_eq!(store.create_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        orchestrator.conversation().session_id.as_deref(),
        Some("session-1")
    );
}

#[tokio::test]
async fn blank_session_id_is_rejected_as_creation_failure() {
    let store = FakeStore::default();
    store.blank_id.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::default();

    let mut orchestrator = ChatOrchestrator::new(&store, &generator, true);
    orchestrator.set_draft("Hello");

    let err = orchestrator.submit().await;

    assert!(matches!(err, Err(TurnError::SessionCreation(_))));
    assert!(orchestrator.conversation().session_id.is_none());
    assert!(orchestrator.conversation().messages.is_empty());
}
