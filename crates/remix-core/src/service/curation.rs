//! Curation controller.
//!
//! Runs generation cycles, tracks the review state of each working
//! candidate and each displayed saved post, and keeps a read-through view of
//! the saved collection. The repository is the source of truth: after every
//! mutation the view is re-fetched instead of patched locally.
//!
//! Session state sits behind an async mutex that is only held for
//! bookkeeping, never across a provider or repository call, so operations
//! on different items can be in flight at the same time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

use remix_types::error::{CurationError, GenerationError, RepositoryError};
use remix_types::generation::GenerationRequest;
use remix_types::platform::Platform;
use remix_types::post::{
    Candidate, CandidateState, CandidateView, FeedbackKey, NewPost, OwnerId, PostId, PostState,
    SavedPost, SavedPostView,
};

use crate::generation::box_provider::BoxGenerationProvider;
use crate::prompt;
use crate::repository::post::{PostFilter, PostRepository};
use crate::segment::segment;

/// Tunables for a [`CurationController`].
#[derive(Debug, Clone)]
pub struct CurationSettings {
    /// Upper bound on one generation call. Elapsing surfaces as a network error.
    pub generation_timeout: Option<Duration>,
    /// How long "just saved" feedback stays on.
    pub feedback_window: Duration,
    /// Platform whose saved posts are displayed initially.
    pub platform: Platform,
}

impl Default for CurationSettings {
    fn default() -> Self {
        Self {
            generation_timeout: Some(Duration::from_secs(60)),
            feedback_window: Duration::from_millis(1_500),
            platform: Platform::default(),
        }
    }
}

struct WorkingCandidate {
    candidate: Candidate,
    state: CandidateState,
}

/// Read-through copy of the saved collection for one platform.
struct SavedView {
    /// Platform the posts below belong to.
    platform: Platform,
    /// Platform the most recent fetch asked for. Differs from `platform`
    /// while a platform switch is in flight.
    target: Platform,
    posts: Vec<SavedPost>,
    /// A post-mutation refresh failed; `posts` may lag the store.
    stale: bool,
    /// Sequence number of the last fetch issued / applied. Responses older
    /// than the applied one are dropped, so a slow list cannot overwrite a
    /// newer one.
    issued: u64,
    applied: u64,
}

struct Session {
    cycle: u64,
    candidates: Vec<WorkingCandidate>,
    view: SavedView,
    /// Only non-`Viewing` states are stored.
    post_states: HashMap<PostId, PostState>,
    feedback: HashMap<FeedbackKey, Instant>,
}

/// Orchestrates generation and curation for one user session.
pub struct CurationController<R: PostRepository> {
    provider: Arc<BoxGenerationProvider>,
    store: R,
    owner_id: OwnerId,
    settings: CurationSettings,
    session: Mutex<Session>,
}

impl<R: PostRepository> CurationController<R> {
    /// Create a controller for `owner_id`.
    ///
    /// The saved view starts empty; call [`load_saved`](Self::load_saved)
    /// or [`refresh_saved`](Self::refresh_saved) to populate it.
    pub fn new(
        provider: Arc<BoxGenerationProvider>,
        store: R,
        owner_id: OwnerId,
        settings: CurationSettings,
    ) -> Self {
        let platform = settings.platform;
        Self {
            provider,
            store,
            owner_id,
            settings,
            session: Mutex::new(Session {
                cycle: 0,
                candidates: Vec::new(),
                view: SavedView {
                    platform,
                    target: platform,
                    posts: Vec::new(),
                    stale: false,
                    issued: 0,
                    applied: 0,
                },
                post_states: HashMap::new(),
                feedback: HashMap::new(),
            }),
        }
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    /// Run one generation cycle and return the segmented candidates.
    ///
    /// Invalid input fails before any call and leaves the working set alone.
    /// Otherwise the previous cycle's candidates are discarded up front; on
    /// failure the working set stays empty and the saved view is untouched.
    /// Zero candidates is a valid outcome. Returned candidates carry the
    /// cycle number; [`save`](Self::save) rejects them once a newer cycle
    /// has started.
    pub async fn run_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<Candidate>, CurationError> {
        let platform = request.platform;
        let prompt = prompt::build(&request.source_text, &request.prompt_template)?;

        let cycle = {
            let mut session = self.session.lock().await;
            session.cycle += 1;
            session.candidates.clear();
            let window = self.settings.feedback_window;
            session.feedback.retain(|key, at| {
                matches!(key, FeedbackKey::Post { .. }) && at.elapsed() < window
            });
            session.cycle
        };

        let span = info_span!(
            "gen_ai.generate",
            gen_ai.provider.name = self.provider.name(),
            gen_ai.request.model = self.provider.model().unwrap_or("unknown"),
            remix.platform = %platform,
            remix.cycle = cycle,
            remix.source_len = request.source_text.len(),
        );

        let call = self.provider.generate(&prompt, platform);
        let result = match self.settings.generation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).instrument(span).await {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Network(format!(
                    "generation timed out after {}ms",
                    limit.as_millis()
                ))),
            },
            None => call.instrument(span).await,
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(cycle, kind = e.kind(), error = %e, "Generation failed");
                return Err(e.into());
            }
        };

        let mut candidates = segment(&reply, platform);
        for candidate in &mut candidates {
            candidate.cycle = cycle;
        }
        debug!(
            cycle,
            reply_len = reply.as_str().len(),
            candidates = candidates.len(),
            "Segmented reply"
        );

        let mut session = self.session.lock().await;
        if session.cycle == cycle {
            session.candidates = candidates
                .iter()
                .cloned()
                .map(|candidate| WorkingCandidate {
                    candidate,
                    state: CandidateState::Generated,
                })
                .collect();
        } else {
            debug!(cycle, current = session.cycle, "Generation superseded by a newer cycle");
        }

        Ok(candidates)
    }

    // ------------------------------------------------------------------
    // Candidates
    // ------------------------------------------------------------------

    /// Persist a working candidate.
    ///
    /// The candidate must come from the current cycle and be in `Generated`
    /// or `SaveFailed`; one from an earlier cycle is `UnknownCandidate` even
    /// when the new reply has the same text at the same position. On success the saved view is re-fetched when it shows
    /// the candidate's platform.
    pub async fn save(&self, candidate: &Candidate) -> Result<SavedPost, CurationError> {
        let ordinal = candidate.ordinal;
        let cycle = {
            let mut session = self.session.lock().await;
            let cycle = session.cycle;
            if candidate.cycle != cycle {
                debug!(
                    ordinal,
                    stale = candidate.cycle,
                    cycle,
                    "Rejecting candidate from an older cycle"
                );
                return Err(CurationError::UnknownCandidate(ordinal));
            }
            let entry = session
                .candidates
                .get_mut(ordinal)
                .filter(|w| w.candidate == *candidate)
                .ok_or(CurationError::UnknownCandidate(ordinal))?;

            if !entry.state.can_save() {
                return Err(CurationError::InvalidTransition {
                    action: "save",
                    state: entry.state.to_string(),
                });
            }
            entry.state = CandidateState::Saving;
            cycle
        };

        let new_post = NewPost {
            content: candidate.content.clone(),
            platform: candidate.platform,
            owner_id: self.owner_id.clone(),
        };
        let result = self.store.create(&new_post).await;

        let mut session = self.session.lock().await;
        let current = session.cycle == cycle;
        match result {
            Ok(saved) => {
                let now = Instant::now();
                let window = self.settings.feedback_window;
                session.feedback.retain(|_, at| at.elapsed() < window);
                if current {
                    if let Some(entry) = session.candidates.get_mut(ordinal) {
                        entry.state = CandidateState::Saved { id: saved.id };
                    }
                    session
                        .feedback
                        .insert(FeedbackKey::Candidate { cycle, ordinal }, now);
                }
                session.feedback.insert(FeedbackKey::Post { id: saved.id }, now);
                let shows_platform = session.view.target == saved.platform;
                drop(session);

                info!(id = %saved.id, ordinal, platform = %saved.platform, "Saved candidate");
                if shows_platform {
                    self.refresh_after_mutation().await;
                }
                Ok(saved)
            }
            Err(e) => {
                let err = CurationError::from(e);
                if current {
                    if let Some(entry) = session.candidates.get_mut(ordinal) {
                        entry.state = CandidateState::SaveFailed {
                            reason: err.to_string(),
                        };
                    }
                }
                warn!(ordinal, error = %err, "Saving candidate failed");
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Saved view
    // ------------------------------------------------------------------

    /// Switch the displayed platform and fetch its saved posts.
    ///
    /// On failure the previous view (platform and posts) stays displayed.
    pub async fn load_saved(&self, platform: Platform) -> Result<Vec<SavedPost>, CurationError> {
        self.fetch(platform).await
    }

    /// Re-fetch the displayed platform's saved posts.
    pub async fn refresh_saved(&self) -> Result<Vec<SavedPost>, CurationError> {
        let platform = self.session.lock().await.view.target;
        self.fetch(platform).await
    }

    async fn fetch(&self, platform: Platform) -> Result<Vec<SavedPost>, CurationError> {
        let seq = {
            let mut session = self.session.lock().await;
            session.view.issued += 1;
            session.view.target = platform;
            session.view.issued
        };

        let filter = PostFilter::platform(platform).owned_by(self.owner_id.clone());
        let result = self.store.list(&filter).await;

        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let view = &mut session.view;
        match result {
            Ok(posts) => {
                if seq > view.applied {
                    view.applied = seq;
                    view.platform = platform;
                    view.posts = posts.clone();
                    view.stale = false;

                    let present: HashSet<PostId> = posts.iter().map(|p| p.id).collect();
                    session.post_states.retain(|id, _| present.contains(id));
                } else {
                    debug!(seq, applied = view.applied, "Dropping out-of-date saved-post listing");
                }
                Ok(posts)
            }
            Err(e) => {
                if seq == view.issued {
                    view.target = view.platform;
                }
                warn!(platform = %platform, error = %e, "Fetching saved posts failed");
                Err(e.into())
            }
        }
    }

    /// Refresh after a mutation the store already confirmed.
    ///
    /// A failure here must not turn the confirmed mutation into an error, so
    /// the view is flagged stale and kept as it was.
    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.refresh_saved().await {
            self.session.lock().await.view.stale = true;
            warn!(error = %e, "Saved view may be out of date");
        }
    }

    // ------------------------------------------------------------------
    // Saved posts
    // ------------------------------------------------------------------

    /// Start editing a displayed post. Returns the initial draft.
    pub async fn begin_edit(&self, id: &PostId) -> Result<String, CurationError> {
        let mut session = self.session.lock().await;
        let content = session
            .view
            .posts
            .iter()
            .find(|p| p.id == *id)
            .map(|p| p.content.clone())
            .ok_or(CurationError::NotFound)?;

        match session.post_states.get(id) {
            None | Some(PostState::Viewing) => {
                session.post_states.insert(
                    *id,
                    PostState::Editing {
                        draft: content.clone(),
                    },
                );
                Ok(content)
            }
            Some(other) => Err(CurationError::InvalidTransition {
                action: "edit",
                state: other.to_string(),
            }),
        }
    }

    /// Abandon an edit without touching the store.
    pub async fn cancel_edit(&self, id: &PostId) -> Result<(), CurationError> {
        let mut session = self.session.lock().await;
        match session.post_states.get(id) {
            Some(PostState::Editing { .. }) => {
                session.post_states.remove(id);
                Ok(())
            }
            Some(other) => Err(CurationError::InvalidTransition {
                action: "cancel edit",
                state: other.to_string(),
            }),
            None => Err(CurationError::InvalidTransition {
                action: "cancel edit",
                state: PostState::Viewing.to_string(),
            }),
        }
    }

    /// Write an edited post's new content to the store.
    ///
    /// The post must be in `Editing`. On a store failure it returns to
    /// `Editing` with the draft kept so the user can retry.
    pub async fn commit_edit(&self, id: &PostId, content: &str) -> Result<SavedPost, CurationError> {
        {
            let mut session = self.session.lock().await;
            match session.post_states.get(id) {
                Some(PostState::Editing { .. }) => {}
                Some(other) => {
                    return Err(CurationError::InvalidTransition {
                        action: "update",
                        state: other.to_string(),
                    });
                }
                None => {
                    return Err(CurationError::InvalidTransition {
                        action: "update",
                        state: PostState::Viewing.to_string(),
                    });
                }
            }

            if content.trim().is_empty() {
                session.post_states.insert(
                    *id,
                    PostState::Editing {
                        draft: content.to_string(),
                    },
                );
                return Err(CurationError::InvalidInput(
                    "post content cannot be empty".to_string(),
                ));
            }

            session.post_states.insert(
                *id,
                PostState::Updating {
                    draft: content.to_string(),
                },
            );
        }

        let result = self.store.update(id, content).await;

        match result {
            Ok(updated) => {
                self.session.lock().await.post_states.remove(id);
                info!(id = %id, "Updated saved post");
                self.refresh_after_mutation().await;
                Ok(updated)
            }
            Err(RepositoryError::NotFound) => {
                self.session.lock().await.post_states.remove(id);
                warn!(id = %id, "Post vanished before update");
                self.refresh_after_mutation().await;
                Err(CurationError::NotFound)
            }
            Err(e) => {
                self.session.lock().await.post_states.insert(
                    *id,
                    PostState::Editing {
                        draft: content.to_string(),
                    },
                );
                warn!(id = %id, error = %e, "Updating saved post failed");
                Err(e.into())
            }
        }
    }

    /// Delete a saved post.
    ///
    /// The store decides whether the id exists; deleting an id that is not
    /// displayed is allowed and reported as `NotFound` if the store agrees.
    pub async fn delete(&self, id: &PostId) -> Result<(), CurationError> {
        {
            let mut session = self.session.lock().await;
            if let Some(state) = session.post_states.get(id) {
                if *state != PostState::Viewing {
                    return Err(CurationError::InvalidTransition {
                        action: "delete",
                        state: state.to_string(),
                    });
                }
            }
            if session.view.posts.iter().any(|p| p.id == *id) {
                session.post_states.insert(*id, PostState::Deleting);
            }
        }

        let result = self.store.delete(id).await;
        self.session.lock().await.post_states.remove(id);

        match result {
            Ok(()) => {
                info!(id = %id, "Deleted saved post");
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                debug!(id = %id, "Delete of unknown post");
                self.refresh_after_mutation().await;
                Err(CurationError::NotFound)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Deleting saved post failed");
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Working candidates of the current cycle with their review state.
    pub async fn candidates(&self) -> Vec<CandidateView> {
        let session = self.session.lock().await;
        let cycle = session.cycle;
        session
            .candidates
            .iter()
            .map(|w| CandidateView {
                candidate: w.candidate.clone(),
                state: w.state.clone(),
                just_saved: self.feedback_active(
                    &session,
                    &FeedbackKey::Candidate {
                        cycle,
                        ordinal: w.candidate.ordinal,
                    },
                ),
            })
            .collect()
    }

    /// Displayed saved posts, newest first, with their interaction state.
    pub async fn saved_posts(&self) -> Vec<SavedPostView> {
        let session = self.session.lock().await;
        session
            .view
            .posts
            .iter()
            .map(|post| SavedPostView {
                post: post.clone(),
                state: session.post_states.get(&post.id).cloned().unwrap_or_default(),
                just_saved: self.feedback_active(&session, &FeedbackKey::Post { id: post.id }),
            })
            .collect()
    }

    /// Platform whose saved posts are currently displayed.
    pub async fn displayed_platform(&self) -> Platform {
        self.session.lock().await.view.platform
    }

    /// Whether the last post-mutation refresh failed.
    pub async fn is_view_stale(&self) -> bool {
        self.session.lock().await.view.stale
    }

    /// Number of generation cycles started so far.
    pub async fn current_cycle(&self) -> u64 {
        self.session.lock().await.cycle
    }

    /// Whether "just saved" feedback is on for `key`.
    pub async fn is_recently_saved(&self, key: &FeedbackKey) -> bool {
        let mut session = self.session.lock().await;
        let window = self.settings.feedback_window;
        session.feedback.retain(|_, at| at.elapsed() < window);
        session.feedback.contains_key(key)
    }

    fn feedback_active(&self, session: &Session, key: &FeedbackKey) -> bool {
        session
            .feedback
            .get(key)
            .is_some_and(|at| at.elapsed() < self.settings.feedback_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::Utc;
    use remix_types::generation::{FinalPrompt, GenerationReply};

    use crate::generation::provider::GenerationProvider;

    // --- Mock provider ---

    #[derive(Clone)]
    enum Reply {
        Text(String),
        Fail(GenerationError),
        Hang,
    }

    struct MockProvider {
        reply: Reply,
        calls: Arc<AtomicUsize>,
    }

    impl GenerationProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(
            &self,
            _prompt: &FinalPrompt,
            _platform: Platform,
        ) -> Result<GenerationReply, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Text(text) => Ok(GenerationReply::new(text.clone())),
                Reply::Fail(err) => Err(err.clone()),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(GenerationReply::new("too late"))
                }
            }
        }
    }

    // --- Mock store ---

    #[derive(Default)]
    struct MemoryStore {
        posts: std::sync::Mutex<Vec<SavedPost>>,
        fail_create: AtomicBool,
        fail_list: AtomicBool,
        fail_update: AtomicBool,
        fail_delete: AtomicBool,
    }

    fn unavailable() -> RepositoryError {
        RepositoryError::Query("unable to open database file".to_string())
    }

    impl PostRepository for Arc<MemoryStore> {
        async fn create(&self, post: &NewPost) -> Result<SavedPost, RepositoryError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let mut posts = self.posts.lock().unwrap();
            let now = Utc::now() + chrono::Duration::microseconds(posts.len() as i64);
            let saved = SavedPost {
                id: PostId::new(),
                content: post.content.clone(),
                platform: post.platform,
                owner_id: post.owner_id.clone(),
                created_at: now,
                updated_at: now,
            };
            posts.push(saved.clone());
            Ok(saved)
        }

        async fn get(&self, id: &PostId) -> Result<Option<SavedPost>, RepositoryError> {
            Ok(self.posts.lock().unwrap().iter().find(|p| p.id == *id).cloned())
        }

        async fn list(&self, filter: &PostFilter) -> Result<Vec<SavedPost>, RepositoryError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(RepositoryError::Connection);
            }
            let mut posts: Vec<SavedPost> = self
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.platform == filter.platform)
                .filter(|p| filter.owner_id.as_ref().is_none_or(|o| *o == p.owner_id))
                .cloned()
                .collect();
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(posts)
        }

        async fn update(&self, id: &PostId, content: &str) -> Result<SavedPost, RepositoryError> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let mut posts = self.posts.lock().unwrap();
            let post = posts
                .iter_mut()
                .find(|p| p.id == *id)
                .ok_or(RepositoryError::NotFound)?;
            post.content = content.to_string();
            post.updated_at = Utc::now();
            Ok(post.clone())
        }

        async fn delete(&self, id: &PostId) -> Result<(), RepositoryError> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let mut posts = self.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| p.id != *id);
            if posts.len() == before {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
    }

    // --- Helpers ---

    struct Harness {
        controller: CurationController<Arc<MemoryStore>>,
        store: Arc<MemoryStore>,
        calls: Arc<AtomicUsize>,
    }

    fn harness_with(reply: Reply, settings: CurationSettings) -> Harness {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = BoxGenerationProvider::new(MockProvider {
            reply,
            calls: calls.clone(),
        });
        let store = Arc::new(MemoryStore::default());
        let controller = CurationController::new(
            Arc::new(provider),
            store.clone(),
            OwnerId::new("user-1"),
            settings,
        );
        Harness {
            controller,
            store,
            calls,
        }
    }

    fn harness(reply: &str) -> Harness {
        harness_with(Reply::Text(reply.to_string()), CurationSettings::default())
    }

    const SOURCE: &str = "AI is changing how we work.";
    const TEMPLATE: &str = "Write tweets separated by |||";

    // --- Generation ---

    #[tokio::test]
    async fn test_run_generation_drops_preamble_segment() {
        let h = harness("Post one ||| Post two ||| Here are the posts ||| Post three");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();

        let texts: Vec<&str> = candidates.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(texts, ["Post one", "Post two", "Post three"]);

        let views = h.controller.candidates().await;
        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|v| v.state == CandidateState::Generated));
    }

    #[tokio::test]
    async fn test_run_generation_rejects_empty_input_without_calling_provider() {
        let h = harness("a ||| b");
        let err = h
            .controller
            .run_generation(&GenerationRequest::new("  ", TEMPLATE, Platform::Twitter))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CurationError::Generation(GenerationError::InvalidInput(_))
        ));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);

        let err = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, "", Platform::Twitter))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_candidates_is_not_an_error() {
        let h = harness("Here are your tweets!");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_network_error_and_keeps_saved_view() {
        let h = harness_with(
            Reply::Hang,
            CurationSettings {
                generation_timeout: Some(Duration::from_millis(50)),
                ..Default::default()
            },
        );
        h.store
            .create(&NewPost {
                content: "kept".into(),
                platform: Platform::Twitter,
                owner_id: OwnerId::new("user-1"),
            })
            .await
            .unwrap();
        h.controller.load_saved(Platform::Twitter).await.unwrap();

        let err = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CurationError::Generation(GenerationError::Network(_))
        ));

        let saved = h.controller.saved_posts().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].post.content, "kept");
    }

    #[tokio::test]
    async fn test_provider_error_keeps_code() {
        let h = harness_with(
            Reply::Fail(GenerationError::Provider {
                status: Some(401),
                code: Some("authentication_error".into()),
                message: "invalid x-api-key".into(),
            }),
            CurationSettings::default(),
        );
        let err = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap_err();
        match err {
            CurationError::Generation(GenerationError::Provider { status, code, .. }) => {
                assert_eq!(status, Some(401));
                assert_eq!(code.as_deref(), Some("authentication_error"));
            }
            other => panic!("expected provider error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_new_cycle_discards_previous_candidates() {
        let h = harness("a ||| b");
        let first = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        h.controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        assert_eq!(h.controller.current_cycle().await, 2);
        assert_eq!(h.controller.candidates().await.len(), 2);

        // Same text at the same position, but from the previous cycle.
        assert_eq!(first[0].cycle, 1);
        let err = h.controller.save(&first[0]).await.unwrap_err();
        assert!(matches!(err, CurationError::UnknownCandidate(0)));
        assert!(h.store.posts.lock().unwrap().is_empty());

        let views = h.controller.candidates().await;
        assert!(views.iter().all(|v| v.state == CandidateState::Generated));
        assert!(views.iter().all(|v| v.candidate.cycle == 2));
        assert!(!views[0].just_saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_feedback_is_pruned_across_cycles() {
        let h = harness("a ||| b ||| c");
        for _ in 0..50 {
            let candidates = h
                .controller
                .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
                .await
                .unwrap();
            for candidate in &candidates {
                h.controller.save(candidate).await.unwrap();
            }
            h.controller.saved_posts().await;
            tokio::time::advance(Duration::from_millis(1_600)).await;
        }

        // Only the last cycle's three candidate keys and three post keys remain.
        assert!(h.controller.session.lock().await.feedback.len() <= 6);

        h.controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        assert!(h.controller.session.lock().await.feedback.is_empty());
    }

    // --- Saving ---

    #[tokio::test]
    async fn test_save_then_list_contains_candidate() {
        let h = harness("first ||| second");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();

        let saved = h.controller.save(&candidates[1]).await.unwrap();
        assert_eq!(saved.content, "second");
        assert_eq!(saved.platform, Platform::Twitter);
        assert_eq!(saved.owner_id, OwnerId::new("user-1"));

        let listed = h
            .store
            .list(&PostFilter::platform(Platform::Twitter))
            .await
            .unwrap();
        assert!(listed.iter().any(|p| p.content == "second" && p.platform == Platform::Twitter));

        // View was re-fetched from the store, not spliced.
        let view = h.controller.saved_posts().await;
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].post.id, saved.id);
        assert!(view[0].just_saved);

        let states = h.controller.candidates().await;
        assert_eq!(states[1].state, CandidateState::Saved { id: saved.id });
        assert_eq!(states[0].state, CandidateState::Generated);
    }

    #[tokio::test]
    async fn test_feedback_is_keyed_by_ordinal_not_content() {
        let h = harness("same text ||| same text");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        h.controller.save(&candidates[0]).await.unwrap();

        let views = h.controller.candidates().await;
        assert!(views[0].just_saved);
        assert!(!views[1].just_saved);
        assert_eq!(views[1].state, CandidateState::Generated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_feedback_expires_after_window() {
        let h = harness("one");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        let saved = h.controller.save(&candidates[0]).await.unwrap();
        let key = FeedbackKey::Post { id: saved.id };
        assert!(h.controller.is_recently_saved(&key).await);

        tokio::time::advance(Duration::from_millis(1_600)).await;
        assert!(!h.controller.is_recently_saved(&key).await);
        assert!(!h.controller.candidates().await[0].just_saved);
    }

    #[tokio::test]
    async fn test_save_twice_is_rejected() {
        let h = harness("only");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        h.controller.save(&candidates[0]).await.unwrap();
        let err = h.controller.save(&candidates[0]).await.unwrap_err();
        assert!(matches!(err, CurationError::InvalidTransition { action: "save", .. }));
        assert_eq!(h.store.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_is_retryable_and_leaves_view_alone() {
        let h = harness("retry me");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();

        h.store.fail_create.store(true, Ordering::SeqCst);
        let err = h.controller.save(&candidates[0]).await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");
        assert!(matches!(
            h.controller.candidates().await[0].state,
            CandidateState::SaveFailed { .. }
        ));
        assert!(h.controller.saved_posts().await.is_empty());

        h.store.fail_create.store(false, Ordering::SeqCst);
        let saved = h.controller.save(&candidates[0]).await.unwrap();
        assert_eq!(
            h.controller.candidates().await[0].state,
            CandidateState::Saved { id: saved.id }
        );
    }

    #[tokio::test]
    async fn test_save_rejects_candidate_not_in_working_set() {
        let h = harness("a");
        h.controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        let foreign = Candidate {
            content: "not generated".into(),
            platform: Platform::Twitter,
            ordinal: 0,
            cycle: 1,
        };
        let err = h.controller.save(&foreign).await.unwrap_err();
        assert!(matches!(err, CurationError::UnknownCandidate(0)));
    }

    #[tokio::test]
    async fn test_save_on_other_platform_does_not_refresh_view() {
        let h = harness("long form post");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::LinkedIn))
            .await
            .unwrap();
        h.controller.save(&candidates[0]).await.unwrap();

        assert_eq!(h.controller.displayed_platform().await, Platform::Twitter);
        assert!(h.controller.saved_posts().await.is_empty());

        let linkedin = h.controller.load_saved(Platform::LinkedIn).await.unwrap();
        assert_eq!(linkedin.len(), 1);
        assert_eq!(h.controller.displayed_platform().await, Platform::LinkedIn);
    }

    #[tokio::test]
    async fn test_refresh_failure_after_save_marks_view_stale() {
        let h = harness("x");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        h.store.fail_list.store(true, Ordering::SeqCst);

        let saved = h.controller.save(&candidates[0]).await;
        assert!(saved.is_ok());
        assert!(h.controller.is_view_stale().await);

        h.store.fail_list.store(false, Ordering::SeqCst);
        h.controller.refresh_saved().await.unwrap();
        assert!(!h.controller.is_view_stale().await);
        assert_eq!(h.controller.saved_posts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_saves_both_land() {
        let h = harness("left ||| right");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            h.controller.save(&candidates[0]),
            h.controller.save(&candidates[1])
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        h.controller.refresh_saved().await.unwrap();
        assert_eq!(h.controller.saved_posts().await.len(), 2);
    }

    // --- Loading ---

    #[tokio::test]
    async fn test_load_failure_keeps_previous_view() {
        let h = harness("a");
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        h.controller.save(&candidates[0]).await.unwrap();

        h.store.fail_list.store(true, Ordering::SeqCst);
        let err = h.controller.load_saved(Platform::LinkedIn).await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");
        assert_eq!(h.controller.displayed_platform().await, Platform::Twitter);
        assert_eq!(h.controller.saved_posts().await.len(), 1);

        // A later refresh targets the still-displayed platform.
        h.store.fail_list.store(false, Ordering::SeqCst);
        let posts = h.controller.refresh_saved().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].platform, Platform::Twitter);
    }

    // --- Editing ---

    async fn saved_one(h: &Harness) -> SavedPost {
        let candidates = h
            .controller
            .run_generation(&GenerationRequest::new(SOURCE, TEMPLATE, Platform::Twitter))
            .await
            .unwrap();
        h.controller.save(&candidates[0]).await.unwrap()
    }

    #[tokio::test]
    async fn test_edit_cancel_returns_to_viewing() {
        let h = harness("draft me");
        let post = saved_one(&h).await;

        let draft = h.controller.begin_edit(&post.id).await.unwrap();
        assert_eq!(draft, "draft me");
        assert!(matches!(
            h.controller.saved_posts().await[0].state,
            PostState::Editing { .. }
        ));

        h.controller.cancel_edit(&post.id).await.unwrap();
        assert_eq!(h.controller.saved_posts().await[0].state, PostState::Viewing);
        assert_eq!(h.store.posts.lock().unwrap()[0].content, "draft me");
    }

    #[tokio::test]
    async fn test_commit_edit_updates_content_keeps_id() {
        let h = harness("before");
        let post = saved_one(&h).await;

        h.controller.begin_edit(&post.id).await.unwrap();
        let updated = h.controller.commit_edit(&post.id, "after").await.unwrap();
        assert_eq!(updated.id, post.id);
        assert_eq!(updated.content, "after");

        let view = h.controller.saved_posts().await;
        assert_eq!(view[0].post.content, "after");
        assert_eq!(view[0].state, PostState::Viewing);
    }

    #[tokio::test]
    async fn test_update_with_same_content_twice_is_idempotent() {
        let h = harness("steady");
        let post = saved_one(&h).await;

        for _ in 0..2 {
            h.controller.begin_edit(&post.id).await.unwrap();
            h.controller.commit_edit(&post.id, "steady").await.unwrap();
        }
        let stored = h.store.get(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.id, post.id);
        assert_eq!(stored.content, "steady");
        assert_eq!(stored.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_commit_without_begin_is_rejected() {
        let h = harness("x");
        let post = saved_one(&h).await;
        let err = h.controller.commit_edit(&post.id, "y").await.unwrap_err();
        assert!(matches!(err, CurationError::InvalidTransition { action: "update", .. }));
    }

    #[tokio::test]
    async fn test_commit_empty_content_is_invalid_input() {
        let h = harness("x");
        let post = saved_one(&h).await;
        h.controller.begin_edit(&post.id).await.unwrap();
        let err = h.controller.commit_edit(&post.id, "   ").await.unwrap_err();
        assert!(matches!(err, CurationError::InvalidInput(_)));
        assert!(matches!(
            h.controller.saved_posts().await[0].state,
            PostState::Editing { .. }
        ));
    }

    #[tokio::test]
    async fn test_update_failure_keeps_draft() {
        let h = harness("original");
        let post = saved_one(&h).await;
        h.controller.begin_edit(&post.id).await.unwrap();

        h.store.fail_update.store(true, Ordering::SeqCst);
        let err = h.controller.commit_edit(&post.id, "rewritten").await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");

        let view = h.controller.saved_posts().await;
        assert_eq!(view[0].post.content, "original");
        assert_eq!(
            view[0].state,
            PostState::Editing {
                draft: "rewritten".into()
            }
        );
    }

    #[tokio::test]
    async fn test_update_of_vanished_post_refreshes_view() {
        let h = harness("ghost");
        let post = saved_one(&h).await;
        h.controller.begin_edit(&post.id).await.unwrap();

        h.store.posts.lock().unwrap().clear();
        let err = h.controller.commit_edit(&post.id, "boo").await.unwrap_err();
        assert!(matches!(err, CurationError::NotFound));
        assert!(h.controller.saved_posts().await.is_empty());
    }

    #[tokio::test]
    async fn test_begin_edit_unknown_post_is_not_found() {
        let h = harness("x");
        let err = h.controller.begin_edit(&PostId::new()).await.unwrap_err();
        assert!(matches!(err, CurationError::NotFound));
    }

    // --- Deleting ---

    #[tokio::test]
    async fn test_delete_removes_and_second_delete_is_not_found() {
        let h = harness("doomed");
        let post = saved_one(&h).await;

        h.controller.delete(&post.id).await.unwrap();
        assert!(h.controller.saved_posts().await.is_empty());
        let listed = h
            .store
            .list(&PostFilter::platform(Platform::Twitter))
            .await
            .unwrap();
        assert!(listed.iter().all(|p| p.id != post.id));

        let err = h.controller.delete(&post.id).await.unwrap_err();
        assert!(matches!(err, CurationError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_view_unchanged() {
        let h = harness("survivor");
        let post = saved_one(&h).await;

        h.store.fail_delete.store(true, Ordering::SeqCst);
        let err = h.controller.delete(&post.id).await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");

        let view = h.controller.saved_posts().await;
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].state, PostState::Viewing);
    }

    #[tokio::test]
    async fn test_delete_while_editing_is_rejected() {
        let h = harness("busy");
        let post = saved_one(&h).await;
        h.controller.begin_edit(&post.id).await.unwrap();

        let err = h.controller.delete(&post.id).await.unwrap_err();
        assert!(matches!(err, CurationError::InvalidTransition { action: "delete", .. }));
        assert_eq!(h.store.posts.lock().unwrap().len(), 1);
    }
}
