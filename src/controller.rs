//! Theme controller: turns user intents into store dispatches.
//!
//! The controller owns the interaction with the color source. Random-theme
//! fetches run as spawned tokio tasks and report back through the store,
//! which applies only the resolution of the most recently issued request.

use crate::error::{ColorSourceError, ThemeError};
use crate::source::ColorSource;
use crate::store::{RequestId, ThemeAction, ThemeStore};
use crate::theme::ThemeDraft;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Mutation API used by the presentation layer.
pub struct ThemeController {
    store: Arc<ThemeStore>,
    source: Arc<dyn ColorSource>,
    next_request: AtomicU64,
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("store", &self.store)
            .field("next_request", &self.next_request.load(Ordering::SeqCst))
            .finish()
    }
}

impl ThemeController {
    /// Wrap an existing store. Request ids continue after the last one the
    /// store has seen.
    pub fn new(store: Arc<ThemeStore>, source: Arc<dyn ColorSource>) -> Self {
        let first = store
            .state()
            .latest_request
            .map_or(1, |latest| latest.0.saturating_add(1));
        Self {
            store,
            source,
            next_request: AtomicU64::new(first),
        }
    }

    /// Build a fresh store seeded by one synchronous call to `source`.
    pub fn bootstrap(source: Arc<dyn ColorSource>) -> Result<Self, ThemeError> {
        let store = ThemeStore::bootstrap(source.as_ref())?;
        Ok(Self::new(Arc::new(store), source))
    }

    pub fn store(&self) -> &Arc<ThemeStore> {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn ColorSource> {
        &self.source
    }

    /// Replace the theme. Fails with [`ThemeError::MalformedTheme`] if any
    /// field is missing; state is untouched in that case.
    pub fn set_theme(&self, theme: impl Into<ThemeDraft>) -> Result<(), ThemeError> {
        self.store.dispatch(ThemeAction::ThemeChanged(theme.into()))
    }

    /// Decode a JSON theme object and apply it with [`Self::set_theme`].
    pub fn set_theme_json(&self, payload: &str) -> Result<(), ThemeError> {
        self.set_theme(ThemeDraft::from_json(payload)?)
    }

    /// Apply one of the color source's named presets.
    pub fn apply_preset(&self, name: &str) -> Result<(), ThemeError> {
        let theme = self
            .source
            .preset(name)
            .ok_or_else(|| ThemeError::UnknownPreset(name.to_string()))?;
        self.set_theme(theme)
    }

    /// Fetch a new theme from the color source and apply it when it arrives.
    ///
    /// The request state becomes `Pending` before this returns. Failures are
    /// recorded as `Rejected` in the store and never returned here. Must be
    /// called from within a tokio runtime.
    pub fn request_random_theme(&self) -> PendingRequest {
        let id = RequestId(self.next_request.fetch_add(1, Ordering::SeqCst));
        if let Err(err) = self.store.dispatch(ThemeAction::RandomThemeRequested(id)) {
            error!(request = %id, error = %err, "failed to mark request pending");
        }
        debug!(request = %id, "requesting random theme");

        let store = Arc::clone(&self.store);
        let source = Arc::clone(&self.source);
        let handle = tokio::spawn(async move {
            // A panicking source surfaces as a join error on the inner task.
            let fetch = tokio::spawn(async move { source.generate_async().await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(join_err) => Err(ColorSourceError::new(format!(
                    "color source task aborted: {join_err}"
                ))),
            };
            let action = match result {
                Ok(theme) => ThemeAction::RandomThemeFulfilled(id, theme),
                Err(err) => ThemeAction::RandomThemeRejected(id, err),
            };
            if let Err(err) = store.dispatch(action) {
                error!(request = %id, error = %err, "failed to record theme resolution");
            }
        });

        PendingRequest { id, handle }
    }
}

/// Handle to one in-flight random-theme request.
///
/// Dropping it does not cancel anything; the fetch runs to completion and
/// its result is applied or discarded by the store.
#[derive(Debug)]
pub struct PendingRequest {
    id: RequestId,
    handle: JoinHandle<()>,
}

impl PendingRequest {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Wait until the resolution has been dispatched to the store.
    pub async fn settled(self) {
        if let Err(err) = self.handle.await {
            error!(request = %self.id, error = %err, "theme request task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RequestState;
    use crate::testsupport::{
        bootstrap_theme, mocked_theme, FailingColorSource, ScriptedColorSource,
    };
    use crate::theme::Theme;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    fn scripted() -> (Arc<ScriptedColorSource>, ThemeController) {
        let source = Arc::new(ScriptedColorSource::new(bootstrap_theme()));
        let controller = ThemeController::bootstrap(source.clone()).expect("bootstrap");
        (source, controller)
    }

    async fn wait_for_calls(source: &ScriptedColorSource, calls: usize) {
        while source.calls() < calls {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn random_theme_scenario_applies_mocked_value() {
        let (source, controller) = scripted();
        assert_eq!(controller.store().theme(), bootstrap_theme());
        assert_eq!(controller.store().request_state(), RequestState::Fulfilled);

        let reply = source.expect_call();
        let pending = controller.request_random_theme();
        reply.send(Ok(mocked_theme())).expect("release reply");
        pending.settled().await;

        assert_eq!(controller.store().theme(), mocked_theme());
        assert_eq!(controller.store().request_state(), RequestState::Fulfilled);
    }

    #[tokio::test]
    async fn request_is_pending_before_source_resolves() {
        let (source, controller) = scripted();
        let reply = source.expect_call();
        let pending = controller.request_random_theme();

        assert_eq!(controller.store().request_state(), RequestState::Pending);
        wait_for_calls(&source, 1).await;
        assert_eq!(controller.store().request_state(), RequestState::Pending);
        assert_eq!(controller.store().theme(), bootstrap_theme());

        reply.send(Ok(mocked_theme())).expect("release reply");
        pending.settled().await;
        assert_eq!(controller.store().request_state(), RequestState::Fulfilled);
    }

    #[tokio::test]
    async fn latest_issued_request_wins_when_earlier_resolves_last() {
        let (source, controller) = scripted();
        let first_reply = source.expect_call();
        let second_reply = source.expect_call();
        let stale = Theme::parse("#222222", "#dddddd", "#0000ff").expect("theme");

        let first = controller.request_random_theme();
        let second = controller.request_random_theme();
        assert!(first.id() < second.id());
        wait_for_calls(&source, 2).await;

        second_reply.send(Ok(mocked_theme())).expect("release second");
        second.settled().await;
        assert_eq!(controller.store().theme(), mocked_theme());

        first_reply.send(Ok(stale)).expect("release first");
        first.settled().await;
        assert_eq!(controller.store().theme(), mocked_theme());
        assert_eq!(controller.store().request_state(), RequestState::Fulfilled);
    }

    #[tokio::test]
    async fn earlier_request_resolving_first_is_still_discarded() {
        let (source, controller) = scripted();
        let first_reply = source.expect_call();
        let second_reply = source.expect_call();
        let stale = Theme::parse("#222222", "#dddddd", "#0000ff").expect("theme");

        let first = controller.request_random_theme();
        let second = controller.request_random_theme();
        wait_for_calls(&source, 2).await;

        first_reply.send(Ok(stale)).expect("release first");
        first.settled().await;
        assert_eq!(controller.store().theme(), bootstrap_theme());
        assert_eq!(controller.store().request_state(), RequestState::Pending);

        second_reply.send(Ok(mocked_theme())).expect("release second");
        second.settled().await;
        assert_eq!(controller.store().theme(), mocked_theme());
    }

    #[tokio::test]
    async fn source_failure_is_recorded_not_returned() {
        let (source, controller) = scripted();
        let reply = source.expect_call();
        let pending = controller.request_random_theme();
        reply
            .send(Err(ColorSourceError::new("generator offline")))
            .expect("release reply");
        pending.settled().await;

        assert_eq!(
            controller.store().request_state(),
            RequestState::Rejected(ColorSourceError::new("generator offline"))
        );
        assert_eq!(controller.store().theme(), bootstrap_theme());
    }

    struct PanickingColorSource;

    #[async_trait]
    impl ColorSource for PanickingColorSource {
        fn generate(&self) -> Result<Theme, ColorSourceError> {
            Ok(bootstrap_theme())
        }

        async fn generate_async(&self) -> Result<Theme, ColorSourceError> {
            panic!("generator crashed")
        }
    }

    #[tokio::test]
    async fn panicking_source_becomes_rejection() {
        let controller =
            ThemeController::bootstrap(Arc::new(PanickingColorSource)).expect("bootstrap");
        controller.request_random_theme().settled().await;
        match controller.store().request_state() {
            RequestState::Rejected(err) => {
                assert!(err.message().contains("aborted"), "got: {err}");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn one_notification_per_applied_dispatch() {
        let (source, controller) = scripted();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let _sub = controller.store().subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let reply = source.expect_call();
        let pending = controller.request_random_theme();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "pending notifies");
        reply.send(Ok(mocked_theme())).expect("release reply");
        pending.settled().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2, "fulfilled notifies");

        controller.set_theme(bootstrap_theme()).expect("set theme");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn set_theme_round_trips() {
        let (_, controller) = scripted();
        controller.set_theme(mocked_theme()).expect("set theme");
        assert_eq!(controller.store().theme(), mocked_theme());
    }

    #[test]
    fn set_theme_rejects_partial_theme() {
        let (_, controller) = scripted();
        let draft = ThemeDraft {
            primary: None,
            ..ThemeDraft::from(mocked_theme())
        };
        let err = controller.set_theme(draft).expect_err("partial theme");
        assert_eq!(
            err,
            ThemeError::MalformedTheme {
                missing: vec!["primary"]
            }
        );
        assert_eq!(controller.store().theme(), bootstrap_theme());
    }

    #[test]
    fn set_theme_json_validates_payload() {
        let (_, controller) = scripted();
        controller
            .set_theme_json(r##"{"background":"#111111","foreground":"#eeeeee","primary":"#00ff00"}"##)
            .expect("valid payload");
        assert_eq!(controller.store().theme(), mocked_theme());

        let err = controller
            .set_theme_json(r##"{"background":"#000000"}"##)
            .expect_err("partial payload");
        assert!(matches!(err, ThemeError::MalformedTheme { .. }), "got: {err:?}");
        assert_eq!(controller.store().theme(), mocked_theme());
    }

    #[test]
    fn apply_preset_resolves_names() {
        let (_, controller) = scripted();
        controller.apply_preset("mocked").expect("known preset");
        assert_eq!(controller.store().theme(), mocked_theme());

        let err = controller.apply_preset("neon").expect_err("unknown preset");
        assert_eq!(err, ThemeError::UnknownPreset("neon".to_string()));
    }

    #[test]
    fn bootstrap_failure_is_returned() {
        let err = ThemeController::bootstrap(Arc::new(FailingColorSource)).expect_err("must fail");
        assert!(matches!(err, ThemeError::ColorSource(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn request_ids_continue_after_store_history() {
        let store = Arc::new(ThemeStore::new(bootstrap_theme()));
        store
            .dispatch(ThemeAction::RandomThemeRequested(RequestId(7)))
            .expect("seed request");
        let source = Arc::new(ScriptedColorSource::new(bootstrap_theme()));
        let reply = source.expect_call();
        let controller = ThemeController::new(store, source);
        let pending = controller.request_random_theme();
        assert_eq!(pending.id(), RequestId(8));
        reply.send(Ok(mocked_theme())).expect("release reply");
        pending.settled().await;
        assert_eq!(controller.store().theme(), mocked_theme());
    }
}
