//! Conversation orchestrator — routes chat events through the per-user
//! state machine and drives the capture and query flows.
//!
//! # Capture flow
//!
//! ```text
//! Voice ──▶ download, seed entry ─▶ ask topic              [CapturingTopic]
//! Topic ──▶ convert audio ─▶ auto-detect recognition       [AutoLanguageDetect]
//!             ├─ ok, text      → persist, confirm          [Idle]
//!             ├─ ok, empty     → "try re-recording"        [Idle]
//!             ├─ access denied → ask language              [CapturingLanguage]
//!             └─ other error   → error reply, clear        [Idle]
//! Language ─▶ dictation recognition                        [ProcessingAudio]
//!             ├─ ok   → sentence-split, persist or report  [Idle]
//!             └─ err  → error reply, clear                 [Idle]
//! ```
//!
//! Query triggers prompt for their parameter (or run immediately for
//! "all"), and the parameter message runs the store query and renders the
//! result cards. Malformed parameters are dropped silently with the state
//! kept, so the user can retry.
//!
//! Every external call is awaited in place; failures are logged and turned
//! into a user-visible message or a silent no-op. Nothing propagates to
//! the event loop.

use std::sync::Arc;

use crate::audio::VoiceAudio;
use crate::journal::dates::{date_to_timestamp, days_ago, normalize_date_input, now_date,
    split_dual_date_input};
use crate::journal::formatter::{format_entry, process_text, sort_for_display};
use crate::journal::Entry;
use crate::recognize::{Language, RecognitionGateway, Recognized, RecognizeError};
use crate::session::commands::{
    is_start_command, parse_count, parse_delete_command, DateShortcut, QueryTrigger,
};
use crate::session::reply::{responses, Reply};
use crate::session::session::SessionStore;
use crate::session::state::SessionState;
use crate::store::{EntryStore, StoreError, UserId};

// ---------------------------------------------------------------------------
// ChatEvent
// ---------------------------------------------------------------------------

/// One inbound chat event, reduced to what the conversation layer needs.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Text { user: UserId, text: String },
    Voice { user: UserId, file_id: String },
}

// ---------------------------------------------------------------------------
// ConversationMachine
// ---------------------------------------------------------------------------

/// Drives every user conversation.
///
/// Owns the session store; talks to the entry store, the two recognition
/// strategies and the voice-file pipeline through their trait seams.
/// [`dispatch`](Self::dispatch) consumes one event and returns the replies
/// to send — the machine itself never touches the transport.
pub struct ConversationMachine {
    sessions: SessionStore,
    store: Arc<dyn EntryStore>,
    auto_recognizer: Arc<dyn RecognitionGateway>,
    manual_recognizer: Arc<dyn RecognitionGateway>,
    voice: Arc<dyn VoiceAudio>,
}

impl ConversationMachine {
    pub fn new(
        sessions: SessionStore,
        store: Arc<dyn EntryStore>,
        auto_recognizer: Arc<dyn RecognitionGateway>,
        manual_recognizer: Arc<dyn RecognitionGateway>,
        voice: Arc<dyn VoiceAudio>,
    ) -> Self {
        Self {
            sessions,
            store,
            auto_recognizer,
            manual_recognizer,
            voice,
        }
    }

    /// Handle one inbound event and return the replies to send.
    pub async fn dispatch(&mut self, event: ChatEvent) -> Vec<Reply> {
        match event {
            ChatEvent::Text { user, text } => self.handle_text(user, &text).await,
            ChatEvent::Voice { user, file_id } => self.handle_voice(user, &file_id).await,
        }
    }

    // -----------------------------------------------------------------------
    // Text routing
    // -----------------------------------------------------------------------

    async fn handle_text(&mut self, user: UserId, text: &str) -> Vec<Reply> {
        if is_start_command(text) {
            self.sessions.register(user);
            return vec![responses::start(user)];
        }

        let state = self.sessions.get_mut(user).state;

        if let Some(timestamp) = parse_delete_command(text) {
            if state == SessionState::Idle {
                return self.delete_entry(user, timestamp).await;
            }
        }

        if let Some(trigger) = QueryTrigger::parse(text) {
            if state.is_capturing() {
                log::debug!("user {user}: query trigger ignored mid-capture");
                return Vec::new();
            }
            return self.handle_trigger(user, trigger).await;
        }

        match state {
            SessionState::CapturingTopic => self.capture_topic(user, text).await,
            SessionState::CapturingLanguage => self.capture_language(user, text).await,
            SessionState::QueryByDate | SessionState::QueryAfter => {
                self.run_single_date_query(user, state, text).await
            }
            SessionState::QueryBetween => self.run_between_query(user, text).await,
            SessionState::QueryLastN => self.run_last_n_query(user, text).await,
            SessionState::QueryByTopic => self.run_topic_query(user, text).await,
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Voice capture
    // -----------------------------------------------------------------------

    /// A voice message opens a capture — unless one is already in flight
    /// for this user, in which case the message is dropped.
    async fn handle_voice(&mut self, user: UserId, file_id: &str) -> Vec<Reply> {
        if self.sessions.get_mut(user).state.is_capturing() {
            log::debug!("user {user}: voice message ignored mid-capture");
            return Vec::new();
        }

        let date = now_date();
        let timestamp = match date_to_timestamp(&date) {
            Ok(ts) => ts,
            Err(e) => {
                log::error!("user {user}: current date not convertible: {e}");
                return vec![responses::error()];
            }
        };

        let voice = Arc::clone(&self.voice);
        let session = self.sessions.get_mut(user);
        session.seed_entry(date, timestamp);
        session.state = SessionState::CapturingTopic;
        let Some(stem) = session.stem(user) else {
            session.clear();
            return vec![responses::error()];
        };

        match voice.fetch(file_id, &stem).await {
            Ok(()) => vec![responses::choose_topic()],
            Err(e) => {
                log::error!("user {user}: voice download failed: {e}");
                voice.discard(&stem);
                self.sessions.get_mut(user).clear();
                vec![responses::error()]
            }
        }
    }

    /// Topic received: cache it and try the auto-detect strategy.
    async fn capture_topic(&mut self, user: UserId, text: &str) -> Vec<Reply> {
        let auto = Arc::clone(&self.auto_recognizer);
        let voice = Arc::clone(&self.voice);

        let session = self.sessions.get_mut(user);
        session.cache_topic(text);
        session.state = SessionState::AutoLanguageDetect;
        let Some(stem) = session.stem(user) else {
            session.clear();
            return vec![responses::error()];
        };

        let wav = match voice.prepare_wav(&stem).await {
            Ok(path) => path,
            Err(e) => {
                log::error!("user {user}: audio preparation failed: {e}");
                return self.fail_capture(user, &stem);
            }
        };

        match auto.recognize(&wav, None).await {
            Ok(Recognized::Detected {
                language,
                transcript,
            }) => {
                // Segment transcripts arrive already period-joined.
                self.finish_capture(user, &stem, language, transcript).await
            }
            Ok(Recognized::Transcript(transcript)) => {
                // A dictation strategy wired into the auto slot returns no
                // locale; keep the primary one and sentence-split ourselves.
                self.finish_capture(user, &stem, Language::EnUs, process_text(&transcript))
                    .await
            }
            Err(RecognizeError::AccessDenied(reason)) => {
                log::warn!(
                    "user {user}: auto-detect denied ({reason}); asking for the language"
                );
                self.sessions.get_mut(user).state = SessionState::CapturingLanguage;
                vec![responses::choose_language()]
            }
            Err(e) => {
                log::error!("user {user}: auto-detect failed: {e}");
                self.fail_capture(user, &stem)
            }
        }
    }

    /// Manual language received: run the dictation strategy with it.
    async fn capture_language(&mut self, user: UserId, text: &str) -> Vec<Reply> {
        // Unknown locale — drop silently, keep waiting; the keyboard offers
        // the valid choices.
        let Some(language) = Language::from_user_input(text) else {
            log::debug!("user {user}: unrecognised language choice {text:?}");
            return Vec::new();
        };

        let manual = Arc::clone(&self.manual_recognizer);
        let voice = Arc::clone(&self.voice);

        let session = self.sessions.get_mut(user);
        session.set_language(language.code());
        session.state = SessionState::ProcessingAudio;
        let Some(stem) = session.stem(user) else {
            session.clear();
            return vec![responses::error()];
        };

        let wav = match voice.prepare_wav(&stem).await {
            Ok(path) => path,
            Err(e) => {
                log::error!("user {user}: audio preparation failed: {e}");
                return self.fail_capture(user, &stem);
            }
        };

        match manual.recognize(&wav, Some(language)).await {
            Ok(recognized) => {
                let text = process_text(recognized.transcript());
                self.finish_capture(user, &stem, language, text).await
            }
            Err(e) => {
                log::error!("user {user}: dictation failed: {e}");
                self.fail_capture(user, &stem)
            }
        }
    }

    /// Persist the completed entry (or report an unusable transcript) and
    /// release the session either way.
    async fn finish_capture(
        &mut self,
        user: UserId,
        stem: &str,
        language: Language,
        text: String,
    ) -> Vec<Reply> {
        let store = Arc::clone(&self.store);
        let voice = Arc::clone(&self.voice);

        if text.is_empty() {
            voice.discard(stem);
            self.sessions.get_mut(user).clear();
            return vec![responses::not_recognized()];
        }

        let entry: Entry = {
            let session = self.sessions.get_mut(user);
            session.set_language(language.code());
            session.set_text(&text);
            match session.pending_entry() {
                Some(entry) => entry.clone(),
                None => {
                    session.clear();
                    return vec![responses::error()];
                }
            }
        };

        let reply = match store.create(user, &entry).await {
            Ok(key) => responses::entry_stored(&key),
            Err(e) => {
                log::error!("user {user}: entry not stored: {e}");
                responses::error()
            }
        };

        voice.discard(stem);
        self.sessions.get_mut(user).clear();
        vec![reply]
    }

    /// Terminal capture failure: files dropped, session cleared.
    fn fail_capture(&mut self, user: UserId, stem: &str) -> Vec<Reply> {
        self.voice.discard(stem);
        self.sessions.get_mut(user).clear();
        vec![responses::error()]
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    async fn handle_trigger(&mut self, user: UserId, trigger: QueryTrigger) -> Vec<Reply> {
        match trigger {
            QueryTrigger::All => {
                self.sessions.get_mut(user).state = SessionState::QueryAll;
                let result = self.store.fetch_all(user).await;
                self.sessions.get_mut(user).state = SessionState::Idle;
                render_entries(user, result)
            }
            QueryTrigger::ByDate => {
                self.sessions.get_mut(user).state = SessionState::QueryByDate;
                vec![responses::ask_for_date()]
            }
            QueryTrigger::After => {
                self.sessions.get_mut(user).state = SessionState::QueryAfter;
                vec![responses::ask_for_date()]
            }
            QueryTrigger::Between => {
                self.sessions.get_mut(user).state = SessionState::QueryBetween;
                vec![responses::ask_for_two_dates()]
            }
            QueryTrigger::LastN => {
                self.sessions.get_mut(user).state = SessionState::QueryLastN;
                vec![responses::ask_for_count()]
            }
            QueryTrigger::ByTopic => {
                self.sessions.get_mut(user).state = SessionState::QueryByTopic;
                vec![responses::ask_for_topic()]
            }
        }
    }

    /// Parameter message for the two single-date query states.
    async fn run_single_date_query(
        &mut self,
        user: UserId,
        state: SessionState,
        text: &str,
    ) -> Vec<Reply> {
        let result = if let Some(shortcut) = DateShortcut::parse(text) {
            let date = days_ago(shortcut.days_ago);
            if state == SessionState::QueryByDate {
                self.store.fetch_by_day(user, &date).await
            } else {
                self.store.fetch_after(user, &date).await
            }
        } else if let Some((date, is_exact)) = normalize_date_input(text) {
            match state {
                SessionState::QueryByDate if is_exact => self
                    .store
                    .fetch_exact(user, &date)
                    .await
                    .map(|found| found.into_iter().collect()),
                SessionState::QueryByDate => self.store.fetch_by_day(user, &date).await,
                _ => self.store.fetch_after(user, &date).await,
            }
        } else {
            // Not a shortcut, not a date — no query, no reply; the state is
            // kept so the user can retry.
            return Vec::new();
        };

        self.sessions.get_mut(user).state = SessionState::Idle;
        render_entries(user, result)
    }

    async fn run_between_query(&mut self, user: UserId, text: &str) -> Vec<Reply> {
        let Some((date1, date2)) = split_dual_date_input(text) else {
            return Vec::new();
        };

        let result = self.store.fetch_between(user, &date1, &date2).await;
        self.sessions.get_mut(user).state = SessionState::Idle;
        render_entries(user, result)
    }

    async fn run_last_n_query(&mut self, user: UserId, text: &str) -> Vec<Reply> {
        let Some(count) = parse_count(text) else {
            return Vec::new();
        };

        let result = self.store.fetch_last_n(user, count).await;
        self.sessions.get_mut(user).state = SessionState::Idle;
        render_entries(user, result)
    }

    async fn run_topic_query(&mut self, user: UserId, text: &str) -> Vec<Reply> {
        let result = self.store.fetch_by_topic(user, text).await;
        self.sessions.get_mut(user).state = SessionState::Idle;
        render_entries(user, result)
    }

    async fn delete_entry(&mut self, user: UserId, timestamp: i64) -> Vec<Reply> {
        match self.store.delete(user, timestamp).await {
            Ok(key) => vec![responses::entry_removed(&key)],
            Err(e) => {
                log::warn!("user {user}: delete failed: {e}");
                vec![responses::error()]
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Turn a fetch result into reply cards; a store failure renders the same
/// as an empty result.
fn render_entries(user: UserId, result: Result<Vec<Entry>, StoreError>) -> Vec<Reply> {
    let entries = match result {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("user {user}: fetch failed: {e}");
            Vec::new()
        }
    };

    let entries = sort_for_display(entries);
    if entries.is_empty() {
        return vec![responses::no_entries()];
    }

    entries
        .iter()
        .map(|entry| responses::entry_card(format_entry(entry)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{FailingVoiceAudio, MockVoiceAudio};
    use crate::audio::AudioError;
    use crate::journal::dates::timestamp_to_date;
    use crate::recognize::MockRecognizer;
    use crate::session::reply::Keyboard;
    use crate::store::MemoryStore;

    const USER: UserId = 42;

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    struct Fixture {
        machine: ConversationMachine,
        store: Arc<MemoryStore>,
    }

    fn fixture(auto: MockRecognizer, manual: MockRecognizer) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let machine = ConversationMachine::new(
            SessionStore::new(),
            store.clone(),
            Arc::new(auto),
            Arc::new(manual),
            Arc::new(MockVoiceAudio::new("/tmp/mock.wav")),
        );
        Fixture { machine, store }
    }

    fn auto_ok(language: Language, transcript: &str) -> Fixture {
        fixture(
            MockRecognizer::detected(language, transcript),
            MockRecognizer::transcript("unused"),
        )
    }

    fn entry_at(timestamp: i64, topic: &str) -> Entry {
        Entry {
            topic: topic.into(),
            text: "text.".into(),
            date: timestamp_to_date(timestamp).unwrap(),
            timestamp,
            language: "en-US".into(),
        }
    }

    async fn seed(store: &MemoryStore, entries: &[Entry]) {
        for entry in entries {
            store.create(USER, entry).await.unwrap();
        }
    }

    fn text(user: UserId, s: &str) -> ChatEvent {
        ChatEvent::Text {
            user,
            text: s.into(),
        }
    }

    fn voice(user: UserId) -> ChatEvent {
        ChatEvent::Voice {
            user,
            file_id: "voice-file-1".into(),
        }
    }

    fn state_of(machine: &ConversationMachine, user: UserId) -> SessionState {
        machine.sessions.get(user).map(|s| s.state).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn start_registers_and_welcomes() {
        let mut fx = auto_ok(Language::EnUs, "Hello world.");
        let replies = fx.machine.dispatch(text(USER, "/start")).await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Hello there!"));
        assert_eq!(replies[0].keyboard, Some(Keyboard::Entries));
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);
    }

    #[tokio::test]
    async fn start_mid_capture_resets_the_session() {
        let mut fx = auto_ok(Language::EnUs, "Hello world.");
        fx.machine.dispatch(voice(USER)).await;
        assert_eq!(state_of(&fx.machine, USER), SessionState::CapturingTopic);

        fx.machine.dispatch(text(USER, "/start")).await;
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);
    }

    // -----------------------------------------------------------------------
    // Capture flow
    // -----------------------------------------------------------------------

    /// Voice → topic → auto-detect success persists the complete entry and
    /// returns to idle.
    #[tokio::test]
    async fn voice_topic_autodetect_persists_entry() {
        let mut fx = auto_ok(Language::EnUs, "Hello world.");

        let replies = fx.machine.dispatch(voice(USER)).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("topic"));
        assert_eq!(state_of(&fx.machine, USER), SessionState::CapturingTopic);

        let replies = fx.machine.dispatch(text(USER, "Meeting")).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Message stored"));
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);

        let stored = fx.store.fetch_all(USER).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].topic, "Meeting");
        assert_eq!(stored[0].language, "en-US");
        assert_eq!(stored[0].text, "Hello world.");
        assert_eq!(
            stored[0].timestamp,
            date_to_timestamp(&stored[0].date).unwrap()
        );
    }

    /// Two voice messages back-to-back must not open two captures or store
    /// two entries.
    #[tokio::test]
    async fn second_voice_mid_capture_is_ignored() {
        let mut fx = auto_ok(Language::EnUs, "Hello world.");

        fx.machine.dispatch(voice(USER)).await;
        let first_ts = fx
            .machine
            .sessions
            .get(USER)
            .unwrap()
            .pending_entry()
            .unwrap()
            .timestamp;

        let replies = fx.machine.dispatch(voice(USER)).await;
        assert!(replies.is_empty());
        assert_eq!(
            fx.machine
                .sessions
                .get(USER)
                .unwrap()
                .pending_entry()
                .unwrap()
                .timestamp,
            first_ts
        );

        fx.machine.dispatch(text(USER, "Meeting")).await;
        assert_eq!(fx.store.fetch_all(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn query_trigger_mid_capture_is_ignored() {
        let mut fx = auto_ok(Language::EnUs, "Hello world.");
        fx.machine.dispatch(voice(USER)).await;

        let replies = fx.machine.dispatch(text(USER, "by date")).await;
        assert!(replies.is_empty());
        assert_eq!(state_of(&fx.machine, USER), SessionState::CapturingTopic);
    }

    /// Access-denied from auto-detect falls back to the manual language
    /// path without losing the captured topic.
    #[tokio::test]
    async fn access_denied_falls_back_to_manual_language() {
        let mut fx = fixture(
            MockRecognizer::err(RecognizeError::AccessDenied("no credentials".into())),
            MockRecognizer::transcript("привіт усім"),
        );

        fx.machine.dispatch(voice(USER)).await;
        let replies = fx.machine.dispatch(text(USER, "Meeting")).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("language"));
        assert_eq!(replies[0].keyboard, Some(Keyboard::Languages));
        assert_eq!(state_of(&fx.machine, USER), SessionState::CapturingLanguage);

        let replies = fx.machine.dispatch(text(USER, "🇺🇦 uk-UA")).await;
        assert!(replies[0].text.contains("Message stored"));
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);

        let stored = fx.store.fetch_all(USER).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].topic, "Meeting");
        assert_eq!(stored[0].language, "uk-UA");
        assert_eq!(stored[0].text, "привіт усім.");
    }

    #[tokio::test]
    async fn unknown_language_choice_is_ignored_and_state_kept() {
        let mut fx = fixture(
            MockRecognizer::err(RecognizeError::AccessDenied("denied".into())),
            MockRecognizer::transcript("ok"),
        );

        fx.machine.dispatch(voice(USER)).await;
        fx.machine.dispatch(text(USER, "Meeting")).await;

        let replies = fx.machine.dispatch(text(USER, "klingon")).await;
        assert!(replies.is_empty());
        assert_eq!(state_of(&fx.machine, USER), SessionState::CapturingLanguage);
    }

    /// An empty transcript is a valid outcome — the user is asked to
    /// re-record and the session is released.
    #[tokio::test]
    async fn empty_transcript_asks_for_rerecord() {
        let mut fx = auto_ok(Language::EnUs, "");

        fx.machine.dispatch(voice(USER)).await;
        let replies = fx.machine.dispatch(text(USER, "Meeting")).await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("re-recording"));
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);
        assert!(fx.store.fetch_all(USER).await.unwrap().is_empty());
    }

    /// File problems during processing are terminal for the turn.
    #[tokio::test]
    async fn audio_failure_is_terminal() {
        let store = Arc::new(MemoryStore::new());
        let mut machine = ConversationMachine::new(
            SessionStore::new(),
            store.clone(),
            Arc::new(MockRecognizer::detected(Language::EnUs, "unused")),
            Arc::new(MockRecognizer::transcript("unused")),
            Arc::new(FailingVoiceAudio::new(AudioError::FileAccess(
                "gone.wav".into(),
            ))),
        );

        machine.dispatch(voice(USER)).await;
        let replies = machine.dispatch(text(USER, "Meeting")).await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("error"));
        assert_eq!(
            machine.sessions.get(USER).unwrap().state,
            SessionState::Idle
        );
        assert!(store.fetch_all(USER).await.unwrap().is_empty());
    }

    /// A voice message while waiting for a query parameter abandons the
    /// query and opens a capture — only capture states block it.
    #[tokio::test]
    async fn voice_during_query_state_opens_capture() {
        let mut fx = auto_ok(Language::EnUs, "Hello world.");
        fx.machine.dispatch(text(USER, "by date")).await;
        assert_eq!(state_of(&fx.machine, USER), SessionState::QueryByDate);

        let replies = fx.machine.dispatch(voice(USER)).await;
        assert!(replies[0].text.contains("topic"));
        assert_eq!(state_of(&fx.machine, USER), SessionState::CapturingTopic);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn get_all_renders_cards_in_chronological_order() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        seed(
            &fx.store,
            &[entry_at(1_700_000_100, "b"), entry_at(1_700_000_000, "a")],
        )
        .await;

        let replies = fx.machine.dispatch(text(USER, "Get all the entries")).await;
        assert_eq!(replies.len(), 2);
        assert!(replies[0].text.contains("| 🇺🇸 a"));
        assert!(replies[1].text.contains("| 🇺🇸 b"));
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);
    }

    #[tokio::test]
    async fn get_all_with_nothing_stored_says_no_entries() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let replies = fx.machine.dispatch(text(USER, "Get all the entries")).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, "No entries found!");
    }

    #[tokio::test]
    async fn by_date_day_query_matches_whole_day() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let inside = date_to_timestamp("2024-03-15 10:00:00").unwrap();
        let outside = date_to_timestamp("2024-03-16 10:00:00").unwrap();
        seed(&fx.store, &[entry_at(inside, "in"), entry_at(outside, "out")]).await;

        let replies = fx.machine.dispatch(text(USER, "by date")).await;
        assert!(replies[0].text.contains("Send me a date"));
        assert_eq!(replies[0].keyboard, Some(Keyboard::FrequentDates));

        let replies = fx.machine.dispatch(text(USER, "2024-03-15")).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("| 🇺🇸 in"));
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);
    }

    #[tokio::test]
    async fn by_date_exact_query_matches_single_entry() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let ts = date_to_timestamp("2024-03-15 10:00:00").unwrap();
        seed(&fx.store, &[entry_at(ts, "target"), entry_at(ts + 60, "other")]).await;

        fx.machine.dispatch(text(USER, "by date")).await;
        let replies = fx
            .machine
            .dispatch(text(USER, "2024-03-15 10:00:00"))
            .await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("| 🇺🇸 target"));
    }

    #[tokio::test]
    async fn today_shortcut_runs_the_day_query() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let now = date_to_timestamp(&now_date()).unwrap();
        seed(&fx.store, &[entry_at(now, "today")]).await;

        fx.machine.dispatch(text(USER, "by date")).await;
        let replies = fx.machine.dispatch(text(USER, "Today")).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("| 🇺🇸 today"));
    }

    #[tokio::test]
    async fn malformed_date_is_dropped_and_state_kept() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        fx.machine.dispatch(text(USER, "by date")).await;

        let replies = fx.machine.dispatch(text(USER, "not a date")).await;
        assert!(replies.is_empty());
        assert_eq!(state_of(&fx.machine, USER), SessionState::QueryByDate);

        // The user can still retry with a valid date.
        let replies = fx.machine.dispatch(text(USER, "2024-03-15")).await;
        assert_eq!(replies.len(), 1);
    }

    #[tokio::test]
    async fn after_date_is_exclusive() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let bound = date_to_timestamp("2024-03-15 00:00:00").unwrap();
        seed(
            &fx.store,
            &[entry_at(bound, "at-bound"), entry_at(bound + 60, "later")],
        )
        .await;

        fx.machine.dispatch(text(USER, "after date")).await;
        let replies = fx.machine.dispatch(text(USER, "2024-03-15")).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("| 🇺🇸 later"));
    }

    #[tokio::test]
    async fn between_reversed_bounds_match_forward_order() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let base = date_to_timestamp("2024-01-02 12:00:00").unwrap();
        seed(
            &fx.store,
            &[entry_at(base, "a"), entry_at(base + 86_400, "b")],
        )
        .await;

        fx.machine.dispatch(text(USER, "between two dates")).await;
        let forward = fx
            .machine
            .dispatch(text(USER, "2024-01-01 2024-01-05"))
            .await;

        fx.machine.dispatch(text(USER, "between two dates")).await;
        let reversed = fx
            .machine
            .dispatch(text(USER, "2024-01-05 2024-01-01"))
            .await;

        assert_eq!(forward.len(), 2);
        assert_eq!(
            forward.iter().map(|r| &r.text).collect::<Vec<_>>(),
            reversed.iter().map(|r| &r.text).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn last_n_renders_the_n_most_recent() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let base = 1_700_000_000;
        seed(
            &fx.store,
            &(1..=5).map(|i| entry_at(base + i, &format!("t{i}"))).collect::<Vec<_>>(),
        )
        .await;

        let replies = fx.machine.dispatch(text(USER, "last N entries")).await;
        assert!(replies[0].text.contains("number of entries"));

        let replies = fx.machine.dispatch(text(USER, "3")).await;
        assert_eq!(replies.len(), 3);
        // Most recent three, displayed oldest-first.
        assert!(replies[0].text.contains("| 🇺🇸 t3"));
        assert!(replies[2].text.contains("| 🇺🇸 t5"));
    }

    #[tokio::test]
    async fn non_numeric_count_is_dropped_and_state_kept() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        fx.machine.dispatch(text(USER, "last N entries")).await;

        let replies = fx.machine.dispatch(text(USER, "three")).await;
        assert!(replies.is_empty());
        assert_eq!(state_of(&fx.machine, USER), SessionState::QueryLastN);
    }

    #[tokio::test]
    async fn topic_query_filters_by_equality() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        seed(
            &fx.store,
            &[
                entry_at(1_700_000_000, "work"),
                entry_at(1_700_000_100, "home"),
                entry_at(1_700_000_200, "work"),
            ],
        )
        .await;

        fx.machine.dispatch(text(USER, "by topic")).await;
        let replies = fx.machine.dispatch(text(USER, "work")).await;
        assert_eq!(replies.len(), 2);
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_command_removes_and_confirms() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let ts = 1_700_000_000;
        seed(&fx.store, &[entry_at(ts, "gone")]).await;

        let replies = fx.machine.dispatch(text(USER, &format!("/d_{ts}"))).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Successfully removed"));
        assert!(replies[0].text.contains(&timestamp_to_date(ts).unwrap()));
        assert!(fx.store.fetch_all(USER).await.unwrap().is_empty());
    }

    /// Deleting a timestamp with no matching entry still confirms with the
    /// derived key — the store is idempotent.
    #[tokio::test]
    async fn delete_of_missing_entry_still_confirms() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let replies = fx.machine.dispatch(text(USER, "/d_1700000000")).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Successfully removed"));
    }

    // -----------------------------------------------------------------------
    // Idle noise
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unrelated_text_while_idle_is_ignored() {
        let mut fx = auto_ok(Language::EnUs, "unused");
        let replies = fx.machine.dispatch(text(USER, "hello bot")).await;
        assert!(replies.is_empty());
        assert_eq!(state_of(&fx.machine, USER), SessionState::Idle);
    }
}
