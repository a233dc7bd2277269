//! The hover state machine behind a tooltip.
//!
//! It doesn't know anything about windows: it is fed pointer events and timer
//! expirations, and tells through [`PopupState`] where and what the popup should be.
//! The druid binding in [`crate::tooltip`] reconciles this state with a real sub-window.

use std::time::{Duration, Instant};

use druid::{ArcStr, Point, TimerToken, Vec2};

use crate::config::{TextSource, TooltipConfig, PLACEHOLDER_TEXT};

/// The popup is placed this far south of the pointer.
pub const POINTER_OFFSET: Vec2 = Vec2::new(0., 20.);

/// The extra wait added on top of the hover delay before trying to show the popup.
const SHOW_GRACE: Duration = Duration::from_secs(1);

/// The longest wait handed to the timer queue. Longer delays are clamped to it.
pub const MAX_TIMER_DELAY: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Something able to schedule deferred callbacks on the event loop.
pub trait TimerQueue {
    /// Requests a timer event after `delay`. The returned token identifies it.
    fn schedule(&mut self, delay: Duration) -> TimerToken;
}

/// Where the tooltip stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Not displayed and not waiting to be.
    Hidden,
    /// The pointer is over the widget, the popup waits for the pointer to rest.
    PendingShow,
    /// The popup is displayed.
    Shown,
}

/// What a timer was scheduled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    /// Show the popup if the pointer rested long enough.
    AttemptShow,
    /// Hide a popup which has been shown for its visible duration.
    AutoHide,
}

/// The single outstanding timer.
#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    /// The token of the timer.
    token: TimerToken,
    /// Why it was scheduled.
    kind: TimerKind,
}

/// The desired state of the popup surface.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupState {
    /// Whether the popup should be on screen.
    pub visible: bool,
    /// The position of the top-left corner of the popup, in the coordinates of the
    /// window hosting the widget.
    pub position: Point,
    /// The text displayed.
    pub text: ArcStr,
}

/// The hover logic of one tooltip.
pub struct HoverTip {
    /// Where the text comes from.
    source: TextSource,
    /// The hover delay.
    delay: Duration,
    /// Whether the popup tracks the pointer while shown.
    follow: bool,
    /// The visible duration, if the popup hides itself.
    visible_duration: Option<Duration>,
    /// The current state.
    visibility: Visibility,
    /// The popup as it should be displayed.
    popup: PopupState,
    /// The last time the pointer moved over the widget.
    last_motion: Option<Instant>,
    /// The outstanding timer. There is never more than one.
    pending: Option<PendingTimer>,
}

impl HoverTip {
    /// Creates the hover logic from a tooltip configuration.
    pub fn new(config: &TooltipConfig) -> Self {
        let source = config.text_source();
        let text = match &source {
            TextSource::Static(text) => text.clone(),
            TextSource::Dynamic(_) => {
                ArcStr::from(config.message.as_deref().unwrap_or(PLACEHOLDER_TEXT))
            }
        };

        Self {
            source,
            delay: config.delay,
            follow: config.follow,
            visible_duration: Some(config.visible_duration).filter(|d| !d.is_zero()),
            visibility: Visibility::Hidden,
            popup: PopupState {
                visible: false,
                position: Point::ZERO,
                text,
            },
            last_motion: None,
            pending: None,
        }
    }

    /// The current state.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The popup as it should be displayed.
    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    /// The token of the outstanding timer, if any.
    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.pending.map(|timer| timer.token)
    }

    /// The pointer entered the widget at `pointer`, in window coordinates.
    pub fn enter(&mut self, pointer: Point, timers: &mut impl TimerQueue) {
        if self.visibility != Visibility::Hidden {
            return;
        }

        tracing::trace!("tooltip: pointer entered");
        self.visibility = Visibility::PendingShow;
        self.popup.position = pointer + POINTER_OFFSET;
        self.refresh_text();

        if self.delay.is_zero() {
            self.show(timers);
        } else {
            self.arm(TimerKind::AttemptShow, self.delay.saturating_add(SHOW_GRACE), timers);
        }
    }

    /// The pointer moved to `pointer`, in window coordinates.
    pub fn motion(&mut self, now: Instant, pointer: Point, timers: &mut impl TimerQueue) {
        if self.visibility == Visibility::Hidden {
            return;
        }

        self.last_motion = Some(now);

        if !self.follow
            && !self.delay.is_zero()
            && self.visible_duration.is_none()
            && self.visibility == Visibility::Shown
        {
            tracing::trace!("tooltip: withdrawn by motion");
            self.popup.visible = false;
            self.visibility = Visibility::PendingShow;
        }

        // a hidden popup keeps tracking the pointer so it shows up under it.
        if self.follow || !self.popup.visible {
            self.popup.position = pointer + POINTER_OFFSET;
        }

        self.refresh_text();

        if !self.delay.is_zero() && self.visibility == Visibility::PendingShow {
            self.arm(TimerKind::AttemptShow, self.delay.saturating_add(SHOW_GRACE), timers);
        }
    }

    /// The pointer left the widget.
    pub fn leave(&mut self) {
        tracing::trace!("tooltip: pointer left");
        self.hide();
    }

    /// The widget was clicked.
    pub fn click(&mut self) {
        tracing::trace!("tooltip: widget clicked");
        self.hide();
    }

    /// A timer fired. Returns whether the timer belonged to this tooltip.
    ///
    /// Tokens of superseded or cancelled timers are not recognized.
    pub fn timer(
        &mut self,
        now: Instant,
        token: TimerToken,
        timers: &mut impl TimerQueue,
    ) -> bool {
        let timer = match self.pending {
            Some(timer) if timer.token == token => timer,
            _ => return false,
        };
        self.pending = None;

        match timer.kind {
            TimerKind::AttemptShow => self.attempt_show(now, timers),
            TimerKind::AutoHide => {
                tracing::trace!("tooltip: visible duration elapsed");
                self.hide();
            }
        }

        true
    }

    /// Shows the popup if the pointer has been resting for longer than the delay.
    fn attempt_show(&mut self, now: Instant, timers: &mut impl TimerQueue) {
        if self.visibility != Visibility::PendingShow {
            return;
        }

        let rested = self
            .last_motion
            .map_or(true, |last| now.saturating_duration_since(last) > self.delay);

        if rested {
            self.show(timers);
        }
    }

    /// Makes the popup visible and arms the auto-hide timer if needed.
    fn show(&mut self, timers: &mut impl TimerQueue) {
        tracing::debug!("tooltip: shown at {:?}", self.popup.position);
        self.visibility = Visibility::Shown;
        self.popup.visible = true;
        self.pending = None;

        if let Some(duration) = self.visible_duration {
            self.arm(TimerKind::AutoHide, duration, timers);
        }
    }

    /// Withdraws the popup and forgets the outstanding timer.
    fn hide(&mut self) {
        self.pending = None;
        self.popup.visible = false;
        self.visibility = Visibility::Hidden;
    }

    /// Schedules a timer, superseding the outstanding one.
    fn arm(&mut self, kind: TimerKind, delay: Duration, timers: &mut impl TimerQueue) {
        let token = timers.schedule(delay.min(MAX_TIMER_DELAY));
        self.pending = Some(PendingTimer { token, kind });
    }

    /// Re-evaluates the text producer. A failing producer leaves the text as it was.
    fn refresh_text(&mut self) {
        if let TextSource::Dynamic(producer) = &self.source {
            match producer() {
                Ok(text) => self.popup.text = text.into(),
                Err(err) => tracing::debug!("tooltip text producer failed: {}", err),
            }
        }
    }
}

/// Tests of the hover logic, driven by a fake timer queue and synthetic instants.
#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    /// Records the timers requested, without ever firing them.
    #[derive(Default)]
    struct FakeTimers {
        /// The timers requested, in order.
        scheduled: Vec<(TimerToken, Duration)>,
    }

    impl TimerQueue for FakeTimers {
        fn schedule(&mut self, delay: Duration) -> TimerToken {
            let token = TimerToken::next();
            self.scheduled.push((token, delay));
            token
        }
    }

    impl FakeTimers {
        /// The last timer requested.
        fn last(&self) -> (TimerToken, Duration) {
            *self.scheduled.last().expect("no timer scheduled")
        }
    }

    /// A duration of `s` seconds.
    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    /// The instant `millis` milliseconds after `base`.
    fn at(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    /// Without delay the popup shows on enter, then follows the pointer.
    #[test]
    fn zero_delay_shows_on_enter() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(secs(0)));
        let now = Instant::now();

        tip.enter(Point::new(10., 10.), &mut timers);

        assert_eq!(tip.visibility(), Visibility::Shown);
        assert!(tip.popup().visible);
        assert_eq!(tip.popup().position, Point::new(10., 30.));
        assert_eq!(&*tip.popup().text, "hi");
        assert!(timers.scheduled.is_empty());
        assert_eq!(tip.pending_timer(), None);

        tip.motion(at(now, 10), Point::new(50., 60.), &mut timers);
        assert!(tip.popup().visible);
        assert_eq!(tip.popup().position, Point::new(50., 80.));
        assert_eq!(&*tip.popup().text, "hi");
        assert!(timers.scheduled.is_empty());
    }

    /// The show attempt is scheduled at delay + 1s.
    #[test]
    fn delayed_show_waits_for_the_grace_period() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(secs(2)));
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        assert_eq!(tip.visibility(), Visibility::PendingShow);
        assert!(!tip.popup().visible);

        let (token, delay) = timers.last();
        assert_eq!(delay, secs(3));

        assert!(tip.timer(at(now, 3000), token, &mut timers));
        assert_eq!(tip.visibility(), Visibility::Shown);
        assert!(tip.popup().visible);
    }

    /// Motion replaces the outstanding show attempt.
    #[test]
    fn motion_rearms_and_supersedes_the_show_attempt() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(secs(2)));
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        let (first, _) = timers.last();

        tip.motion(at(now, 1000), Point::new(5., 5.), &mut timers);
        let (second, delay) = timers.last();
        assert_ne!(first, second);
        assert_eq!(delay, secs(3));
        assert_eq!(tip.pending_timer(), Some(second));

        // the superseded timer is ignored.
        assert!(!tip.timer(at(now, 3000), first, &mut timers));
        assert!(!tip.popup().visible);

        assert!(tip.timer(at(now, 4000), second, &mut timers));
        assert!(tip.popup().visible);
        assert_eq!(tip.popup().position, Point::new(5., 25.));
    }

    /// A show attempt fails if the pointer didn't rest for the delay.
    #[test]
    fn no_show_while_the_pointer_is_moving() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(secs(2)));
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        tip.motion(at(now, 2500), Point::ZERO, &mut timers);
        let (token, _) = timers.last();

        // fired after only 0.5s of rest.
        assert!(tip.timer(at(now, 3000), token, &mut timers));
        assert_eq!(tip.visibility(), Visibility::PendingShow);
        assert!(!tip.popup().visible);
    }

    /// Leaving forgets the pending show attempt.
    #[test]
    fn leave_cancels_the_pending_show() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(secs(1)));
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        let (token, _) = timers.last();
        tip.leave();

        assert_eq!(tip.visibility(), Visibility::Hidden);
        assert_eq!(tip.pending_timer(), None);
        assert!(!tip.timer(at(now, 2000), token, &mut timers));
        assert!(!tip.popup().visible);
    }

    /// Clicking the widget hides the popup.
    #[test]
    fn click_hides() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(secs(0)));

        tip.enter(Point::ZERO, &mut timers);
        assert!(tip.popup().visible);

        tip.click();
        assert_eq!(tip.visibility(), Visibility::Hidden);
        assert!(!tip.popup().visible);
    }

    /// Motion before entering does nothing.
    #[test]
    fn motion_is_ignored_while_hidden() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(secs(1)));

        tip.motion(Instant::now(), Point::new(3., 3.), &mut timers);
        assert_eq!(tip.visibility(), Visibility::Hidden);
        assert!(timers.scheduled.is_empty());
    }

    /// A shown popup hides after its visible duration.
    #[test]
    fn auto_hide_after_visible_duration() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(
            &TooltipConfig::new("hi")
                .with_delay(secs(0))
                .with_visible_duration(secs(2)),
        );
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        let (token, delay) = timers.last();
        assert_eq!(delay, secs(2));

        assert!(tip.timer(at(now, 2000), token, &mut timers));
        assert_eq!(tip.visibility(), Visibility::Hidden);
        assert!(!tip.popup().visible);

        // stays hidden until the pointer re-enters.
        tip.motion(at(now, 2100), Point::ZERO, &mut timers);
        assert!(!tip.popup().visible);
        assert_eq!(timers.scheduled.len(), 1);
    }

    /// Without follow, motion withdraws the popup until the pointer rests again.
    #[test]
    fn unfollowing_tip_is_withdrawn_by_motion() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(
            &TooltipConfig::new("hi")
                .with_delay(secs(1))
                .with_follow(false),
        );
        let now = Instant::now();

        tip.enter(Point::new(1., 1.), &mut timers);
        let (token, _) = timers.last();
        assert!(tip.timer(at(now, 2000), token, &mut timers));
        assert!(tip.popup().visible);

        tip.motion(at(now, 2100), Point::new(9., 9.), &mut timers);
        assert_eq!(tip.visibility(), Visibility::PendingShow);
        assert!(!tip.popup().visible);

        // it can reappear once the pointer rests again, under the pointer.
        let (token, _) = timers.last();
        assert!(tip.timer(at(now, 4100), token, &mut timers));
        assert!(tip.popup().visible);
        assert_eq!(tip.popup().position, Point::new(9., 29.));
    }

    /// Without follow nor delay, the popup stays where it appeared.
    #[test]
    fn unfollowing_tip_stays_put_without_delay() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(
            &TooltipConfig::new("hi")
                .with_delay(secs(0))
                .with_follow(false),
        );
        let now = Instant::now();

        tip.enter(Point::new(1., 1.), &mut timers);
        tip.motion(at(now, 100), Point::new(9., 9.), &mut timers);

        assert!(tip.popup().visible);
        assert_eq!(tip.popup().position, Point::new(1., 21.));
    }

    /// A failing producer leaves the text unchanged.
    #[test]
    fn failing_producer_keeps_the_previous_text() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let config = TooltipConfig::dynamic(move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Ok("first".to_owned()),
                _ => Err("broken".into()),
            }
        })
        .with_delay(secs(0));

        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&config);
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        assert_eq!(&*tip.popup().text, "first");

        tip.motion(at(now, 10), Point::ZERO, &mut timers);
        assert_eq!(&*tip.popup().text, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// The producer is evaluated on every motion.
    #[test]
    fn producer_runs_on_every_motion() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let config =
            TooltipConfig::dynamic(move || Ok(counter.fetch_add(1, Ordering::SeqCst).to_string()))
                .with_delay(secs(0));

        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&config);
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        tip.motion(at(now, 10), Point::ZERO, &mut timers);
        tip.motion(at(now, 20), Point::ZERO, &mut timers);

        assert_eq!(&*tip.popup().text, "2");
    }

    /// Motion while shown doesn't postpone the auto-hide.
    #[test]
    fn resting_then_auto_hiding_despite_motion() {
        let config = TooltipConfig::dynamic(|| Ok("now".to_owned()))
            .with_delay(secs(2))
            .with_visible_duration(secs(2));

        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&config);
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        tip.motion(at(now, 500), Point::ZERO, &mut timers);
        assert!(!tip.popup().visible);

        let (show, delay) = timers.last();
        assert_eq!(delay, secs(3));
        assert!(tip.timer(at(now, 3500), show, &mut timers));
        assert!(tip.popup().visible);

        let (hide, delay) = timers.last();
        assert_eq!(delay, secs(2));

        // moving while shown doesn't postpone the auto-hide.
        tip.motion(at(now, 4000), Point::new(4., 4.), &mut timers);
        assert!(tip.popup().visible);
        assert_eq!(tip.pending_timer(), Some(hide));

        assert!(tip.timer(at(now, 5500), hide, &mut timers));
        assert!(!tip.popup().visible);
        assert_eq!(tip.visibility(), Visibility::Hidden);
    }

    /// Leaving a shown popup forgets its auto-hide timer.
    #[test]
    fn leave_cancels_the_auto_hide() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(
            &TooltipConfig::new("hi")
                .with_delay(secs(0))
                .with_visible_duration(secs(2)),
        );
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        assert_eq!(tip.visibility(), Visibility::Shown);
        let (hide, _) = timers.last();

        tip.leave();
        assert_eq!(tip.visibility(), Visibility::Hidden);
        assert_eq!(tip.pending_timer(), None);
        assert!(!tip.popup().visible);
        assert!(!tip.timer(at(now, 2000), hide, &mut timers));

        // re-entering starts over with a new auto-hide timer.
        tip.enter(Point::new(7., 7.), &mut timers);
        let (fresh, delay) = timers.last();
        assert_ne!(fresh, hide);
        assert_eq!(delay, secs(2));
        assert_eq!(tip.pending_timer(), Some(fresh));
        assert!(tip.popup().visible);
        assert_eq!(tip.popup().position, Point::new(7., 27.));
    }

    /// Delays too long for the timer queue are clamped.
    #[test]
    fn huge_delays_are_clamped() {
        let mut timers = FakeTimers::default();
        let mut tip = HoverTip::new(&TooltipConfig::new("hi").with_delay(Duration::MAX));
        let now = Instant::now();

        tip.enter(Point::ZERO, &mut timers);
        assert_eq!(timers.last().1, MAX_TIMER_DELAY);

        tip.motion(at(now, 10), Point::ZERO, &mut timers);
        assert_eq!(timers.last().1, MAX_TIMER_DELAY);

        // the pointer never rested long enough.
        let (token, _) = timers.last();
        assert!(tip.timer(at(now, 20), token, &mut timers));
        assert!(!tip.popup().visible);

        let mut tip = HoverTip::new(
            &TooltipConfig::new("hi")
                .with_delay(secs(0))
                .with_visible_duration(Duration::MAX),
        );
        tip.enter(Point::ZERO, &mut timers);
        assert!(tip.popup().visible);
        assert_eq!(timers.last().1, MAX_TIMER_DELAY);
    }
}
