//! Focus page controller: the lifecycle of one embedded game session.
//!
//! Phases run `Idle -> Loading -> Ready | Error`. `Ready` and `Error` go back
//! to `Loading` only on an explicit reload. The controller never touches the
//! page; every event handler returns the [`Effect`]s the page must carry out.
//! Timers are identified by [`TimerId`]s that the controller hands out and
//! cancels on every phase exit, so a timer firing after it was cancelled is
//! recognised as stale and ignored.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::{LOADING_MESSAGES, PortalConfig};
use crate::fullscreen::{Fullscreen, FullscreenEffect};
use crate::launch::LaunchRequest;
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::settings::Settings;
use crate::storage::KeyValueStore;
use crate::tracker::{RecentEntry, SessionRecord, Tracker};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorReason {
    MissingParameters,
    LoadFailed,
    TimedOut,
}

impl ErrorReason {
    /// Text for the error overlay.
    pub fn message(self) -> &'static str {
        match self {
            ErrorReason::MissingParameters => "No game specified",
            ErrorReason::LoadFailed => "Failed to load game",
            ErrorReason::TimedOut => "The game took too long to load",
        }
    }
}

impl std::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorReason::MissingParameters => "missing parameters",
            ErrorReason::LoadFailed => "load failed",
            ErrorReason::TimedOut => "timed out",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    SetTitle(String),
    LoadFrame(String),
    FocusFrame,
    ShowLoading,
    HideLoading,
    SetStatus(&'static str),
    ShowError(ErrorReason),
    HideError,
    StartTimeout { id: TimerId, ms: u32 },
    StartInterval { id: TimerId, ms: u32 },
    CancelTimer(TimerId),
    Post(OutboundMessage),
    Fullscreen(FullscreenEffect),
    Navigate(String),
}

#[derive(Debug, Default)]
struct Timers {
    timeout: Option<TimerId>,
    rotation: Option<TimerId>,
    next: u32,
}

impl Timers {
    fn issue(&mut self) -> TimerId {
        self.next += 1;
        TimerId(self.next)
    }

    fn cancel_all(&mut self, out: &mut Vec<Effect>) {
        out.extend(self.timeout.take().map(Effect::CancelTimer));
        out.extend(self.rotation.take().map(Effect::CancelTimer));
    }
}

pub struct SessionController<S> {
    config: PortalConfig,
    tracker: Tracker<S>,
    settings: Settings,
    request: Option<LaunchRequest>,
    phase: LoadPhase,
    timers: Timers,
    status_index: usize,
    fullscreen: Fullscreen,
    started_at: Option<DateTime<Utc>>,
    last_score: Option<f64>,
}

impl<S: KeyValueStore> SessionController<S> {
    pub fn new(
        config: &PortalConfig,
        tracker: Tracker<S>,
        settings: Settings,
        native_fullscreen: bool,
    ) -> Self {
        Self {
            config: config.clone(),
            tracker,
            settings,
            request: None,
            phase: LoadPhase::Idle,
            timers: Timers::default(),
            status_index: 0,
            fullscreen: Fullscreen::new(native_fullscreen),
            started_at: None,
            last_score: None,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn request(&self) -> Option<&LaunchRequest> {
        self.request.as_ref()
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    pub fn fullscreen(&self) -> &Fullscreen {
        &self.fullscreen
    }

    pub fn last_score(&self) -> Option<f64> {
        self.last_score
    }

    /// Timers the page should currently have running.
    pub fn pending_timers(&self) -> Vec<TimerId> {
        self.timers
            .timeout
            .into_iter()
            .chain(self.timers.rotation)
            .collect()
    }

    /// Page entry: resolves the request from the query string and starts
    /// loading, or fails straight away when `src` or `title` is missing.
    pub fn enter(&mut self, query: &str, catalog: Option<&Catalog>, now: DateTime<Utc>) -> Vec<Effect> {
        if self.phase != LoadPhase::Idle {
            return Vec::new();
        }
        self.started_at = Some(now);
        match LaunchRequest::from_query(query, catalog) {
            Ok(request) => {
                info!(game = ?request.game_id, src = %request.source_url, "session starting");
                let mut out = vec![Effect::SetTitle(format!("{} - SCUHA", request.title))];
                self.request = Some(request);
                self.begin_loading(&mut out);
                out
            }
            Err(err) => {
                warn!(error = %err, query, "cannot start session");
                let mut out = Vec::new();
                self.fail(ErrorReason::MissingParameters, &mut out);
                out
            }
        }
    }

    /// The frame finished loading.
    pub fn frame_loaded(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        if self.phase != LoadPhase::Loading {
            debug!(phase = ?self.phase, "ignoring frame load outside loading phase");
            return Vec::new();
        }
        let mut out = Vec::new();
        self.timers.cancel_all(&mut out);
        self.set_phase(LoadPhase::Ready);
        self.record_played(now);
        out.push(Effect::HideLoading);
        out.push(Effect::FocusFrame);
        if self.settings.auto_fullscreen {
            out.extend(self.fullscreen.enter().into_iter().map(Effect::Fullscreen));
        }
        out
    }

    pub fn frame_failed(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.phase == LoadPhase::Loading {
            self.fail(ErrorReason::LoadFailed, &mut out);
        }
        out
    }

    pub fn timer_fired(&mut self, id: TimerId) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.phase != LoadPhase::Loading {
            return out;
        }
        if self.timers.timeout == Some(id) {
            self.timers.timeout = None;
            self.fail(ErrorReason::TimedOut, &mut out);
        } else if self.timers.rotation == Some(id) {
            self.status_index = (self.status_index + 1) % LOADING_MESSAGES.len();
            out.push(Effect::SetStatus(LOADING_MESSAGES[self.status_index]));
        } else {
            debug!(?id, "stale timer");
        }
        out
    }

    /// Explicit reload from any phase once a game has been resolved.
    pub fn reload(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.request.is_none() {
            return out;
        }
        self.timers.cancel_all(&mut out);
        if self.phase == LoadPhase::Error {
            out.push(Effect::HideError);
        }
        self.begin_loading(&mut out);
        out
    }

    /// Stores the session record and navigates to the catalog. Allowed in
    /// every phase.
    pub fn return_to_catalog(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let mut out = Vec::new();
        self.timers.cancel_all(&mut out);
        self.save_session(now);
        out.push(Effect::Navigate(self.config.catalog_url.clone()));
        out
    }

    /// The page is being unloaded without going through the catalog link.
    pub fn leave(&mut self, now: DateTime<Utc>) {
        self.save_session(now);
    }

    pub fn visibility_changed(&mut self, hidden: bool) -> Vec<Effect> {
        let msg = if hidden {
            OutboundMessage::PageHidden
        } else {
            OutboundMessage::PageVisible
        };
        vec![Effect::Post(msg)]
    }

    pub fn message(&mut self, msg: InboundMessage, now: DateTime<Utc>) -> Vec<Effect> {
        match msg {
            InboundMessage::GameReady => {
                info!("game reported ready");
                vec![Effect::Post(OutboundMessage::Init {
                    settings: self.settings.clone(),
                })]
            }
            InboundMessage::GameScore { score } => {
                debug!(score, "score update");
                self.last_score = Some(score);
                Vec::new()
            }
            InboundMessage::GameComplete { data } => {
                if let Some(id) = self.request.as_ref().and_then(|r| r.game_id.clone()) {
                    if let Err(err) = self.tracker.record_completion(&id, data, now) {
                        warn!(error = %err, "could not store completion");
                    }
                }
                Vec::new()
            }
            InboundMessage::RequestFullscreen => self.fullscreen_effects(|fs| fs.enter()),
            InboundMessage::ExitGame => self.return_to_catalog(now),
        }
    }

    pub fn toggle_fullscreen(&mut self) -> Vec<Effect> {
        self.fullscreen_effects(|fs| fs.toggle())
    }

    pub fn fullscreen_changed(&mut self, active: bool) -> Vec<Effect> {
        self.fullscreen_effects(|fs| fs.host_changed(active))
    }

    pub fn native_fullscreen_failed(&mut self) -> Vec<Effect> {
        self.fullscreen_effects(|fs| fs.native_failed())
    }

    /// Escape leaves fullscreen first, then the page.
    pub fn escape(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        if self.fullscreen.is_active() {
            self.fullscreen_effects(|fs| fs.exit())
        } else {
            self.return_to_catalog(now)
        }
    }

    fn fullscreen_effects(&mut self, f: impl FnOnce(&mut Fullscreen) -> Vec<FullscreenEffect>) -> Vec<Effect> {
        f(&mut self.fullscreen)
            .into_iter()
            .map(Effect::Fullscreen)
            .collect()
    }

    fn begin_loading(&mut self, out: &mut Vec<Effect>) {
        let Some(src) = self.request.as_ref().map(|r| r.source_url.clone()) else {
            return;
        };
        self.set_phase(LoadPhase::Loading);
        out.push(Effect::ShowLoading);
        out.push(Effect::LoadFrame(src));

        let timeout = self.timers.issue();
        self.timers.timeout = Some(timeout);
        out.push(Effect::StartTimeout {
            id: timeout,
            ms: self.config.load_timeout_ms,
        });

        self.status_index = 0;
        out.push(Effect::SetStatus(LOADING_MESSAGES[0]));
        let rotation = self.timers.issue();
        self.timers.rotation = Some(rotation);
        out.push(Effect::StartInterval {
            id: rotation,
            ms: self.config.status_rotation_ms,
        });
    }

    fn fail(&mut self, reason: ErrorReason, out: &mut Vec<Effect>) {
        self.timers.cancel_all(out);
        self.set_phase(LoadPhase::Error);
        warn!(%reason, request = ?self.request, "session failed");
        out.push(Effect::HideLoading);
        out.push(Effect::ShowError(reason));
    }

    fn set_phase(&mut self, phase: LoadPhase) {
        info!(from = ?self.phase, to = ?phase, "session phase");
        self.phase = phase;
    }

    fn record_played(&self, now: DateTime<Utc>) {
        let Some(request) = &self.request else { return };
        let Some(id) = &request.game_id else { return };
        let entry = RecentEntry {
            id: id.clone(),
            title: request.title.clone(),
            played_at: now,
            source_url: request.source_url.clone(),
        };
        if let Err(err) = self.tracker.record_played(entry) {
            warn!(error = %err, "could not update recently played");
        }
    }

    fn save_session(&self, now: DateTime<Utc>) {
        let Some(id) = self.request.as_ref().and_then(|r| r.game_id.as_ref()) else {
            return;
        };
        let started = self.started_at.unwrap_or(now);
        let record = SessionRecord {
            game_id: id.clone(),
            last_played: now,
            session_duration: (now - started).num_milliseconds().max(0) as u64,
        };
        if let Err(err) = self.tracker.save_session(&record) {
            warn!(error = %err, "could not store session record");
        }
    }
}
