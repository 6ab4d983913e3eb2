//! Motion layer: poses, easing curves, tweens, timelines and the two-panel
//! slide used between screens.
//!
//! Nothing here touches the DOM. A [`Stage`] records, per [`Target`], a resting
//! [`Pose`] and at most one running tween; the browser shell samples
//! `Stage::pose(target, now)` every animation frame and writes it to the
//! element's style. Completion is observed by polling (`is_animating`) from the
//! owning controller's `tick`, the same way hop arrival is detected from
//! `hop_start_ms + hop_duration_ms`.

use std::collections::HashMap;
use std::f64::consts::PI;

/// Stable handle for an animated element. The string doubles as the DOM id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target(pub &'static str);

impl Target {
    pub fn id(self) -> &'static str {
        self.0
    }
}

/// Axis-aligned rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }
}

/// What the motion layer needs from whoever draws the story: whether an
/// element exists at all, and where it currently sits on screen.
pub trait Surface {
    fn has_handle(&self, target: Target) -> bool;
    fn measure(&self, target: Target) -> Option<Rect>;
}

/// Easing curves (named after the tweening presets the story was designed with).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    /// Cubic ease-in.
    Power2In,
    /// Cubic ease-in-out.
    Power2InOut,
    /// Quartic ease-in.
    Power3In,
    /// Overshooting ease-out, `back.out(1.7)`.
    BackOut,
    SineInOut,
}

impl Easing {
    /// Map linear progress `t` in `[0,1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2In => t * t * t,
            Easing::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Power3In => t * t * t * t,
            Easing::BackOut => {
                let c1 = 1.7;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Visual state of one element. Percent offsets are relative to the element's
/// own box (CSS `translate` semantics); pixel offsets stack on top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x_pct: f64,
    pub y_pct: f64,
    pub dx_px: f64,
    pub dy_px: f64,
    pub scale: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
    pub blur_px: f64,
    pub display: bool,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            x_pct: 0.0,
            y_pct: 0.0,
            dx_px: 0.0,
            dy_px: 0.0,
            scale: 1.0,
            rotation_deg: 0.0,
            opacity: 1.0,
            blur_px: 0.0,
            display: true,
        }
    }
}

impl Pose {
    /// Parked just off the right edge, hidden. Where every incoming panel waits.
    pub fn offscreen_right() -> Self {
        Self {
            x_pct: 100.0,
            display: false,
            ..Self::default()
        }
    }

    pub fn with_x_pct(mut self, x: f64) -> Self {
        self.x_pct = x;
        self
    }

    pub fn with_y_pct(mut self, y: f64) -> Self {
        self.y_pct = y;
        self
    }

    pub fn with_offset_px(mut self, dx: f64, dy: f64) -> Self {
        self.dx_px = dx;
        self.dy_px = dy;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, deg: f64) -> Self {
        self.rotation_deg = deg;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blur(mut self, px: f64) -> Self {
        self.blur_px = px;
        self
    }

    pub fn shown(mut self) -> Self {
        self.display = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.display = false;
        self
    }

    /// Interpolate every numeric channel; `display` is not animatable and is
    /// taken from `self`.
    pub fn lerp(&self, to: &Pose, k: f64) -> Pose {
        let mix = |a: f64, b: f64| a + (b - a) * k;
        Pose {
            x_pct: mix(self.x_pct, to.x_pct),
            y_pct: mix(self.y_pct, to.y_pct),
            dx_px: mix(self.dx_px, to.dx_px),
            dy_px: mix(self.dy_px, to.dy_px),
            scale: mix(self.scale, to.scale),
            rotation_deg: mix(self.rotation_deg, to.rotation_deg),
            opacity: mix(self.opacity, to.opacity),
            blur_px: mix(self.blur_px, to.blur_px),
            display: self.display,
        }
    }

    pub fn css_transform(&self) -> String {
        format!(
            "translate(calc({:.3}% + {:.2}px), calc({:.3}% + {:.2}px)) scale({:.4}) rotate({:.2}deg)",
            self.x_pct, self.dx_px, self.y_pct, self.dy_px, self.scale, self.rotation_deg
        )
    }

    pub fn css_filter(&self) -> String {
        if self.blur_px > 0.0 {
            format!("blur({:.2}px)", self.blur_px)
        } else {
            "none".to_string()
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Tween {
    from: Pose,
    to: Pose,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
}

impl Tween {
    fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }

    fn sample(&self, now: f64) -> Pose {
        if now >= self.end_ms() {
            return self.to;
        }
        if self.duration_ms <= 0.0 || now < self.start_ms {
            return self.from;
        }
        let t = ((now - self.start_ms) / self.duration_ms).clamp(0.0, 1.0);
        self.from.lerp(&self.to, self.easing.apply(t))
    }
}

/// Resting poses plus scheduled tweens for every element the story animates.
///
/// A target may have several tweens queued (timeline entries); the pose at any
/// instant comes from the latest one that has started.
#[derive(Debug, Default)]
pub struct Stage {
    poses: HashMap<Target, Pose>,
    tweens: HashMap<Target, Vec<Tween>>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `pose` immediately, cancelling any tween on the target.
    pub fn set(&mut self, target: Target, pose: Pose) {
        self.tweens.remove(&target);
        self.poses.insert(target, pose);
    }

    /// Tween from wherever the target is at `now` to `to`.
    pub fn animate_to(
        &mut self,
        target: Target,
        to: Pose,
        now: f64,
        duration_ms: f64,
        easing: Easing,
    ) {
        self.animate_from_at(target, to, now, now, duration_ms, easing);
    }

    /// Tween that begins at `start_ms`, which may be in the future. Its start
    /// pose is wherever the target will be at that moment; tweens queued to
    /// start at or after `start_ms` are dropped.
    pub fn animate_from_at(
        &mut self,
        target: Target,
        to: Pose,
        now: f64,
        start_ms: f64,
        duration_ms: f64,
        easing: Easing,
    ) {
        let from = self.pose(target, start_ms.max(now));
        let queue = self.tweens.entry(target).or_default();
        if start_ms <= now {
            queue.clear();
            self.poses.insert(target, from);
        } else {
            queue.retain(|tween| tween.start_ms < start_ms);
        }
        // Tweens never change visibility; that goes through `set_display`.
        queue.push(Tween {
            from,
            to: Pose {
                display: from.display,
                ..to
            },
            start_ms,
            duration_ms: duration_ms.max(0.0),
            easing,
        });
    }

    /// Stop the target where it currently is.
    pub fn kill(&mut self, target: Target, now: f64) {
        let pose = self.pose(target, now);
        if self.tweens.remove(&target).is_some() {
            self.poses.insert(target, pose);
        }
    }

    pub fn pose(&self, target: Target, now: f64) -> Pose {
        let active = self
            .tweens
            .get(&target)
            .and_then(|queue| queue.iter().rev().find(|tween| tween.start_ms <= now));
        match active {
            Some(tween) => tween.sample(now),
            None => self.poses.get(&target).copied().unwrap_or_default(),
        }
    }

    pub fn is_animating(&self, target: Target, now: f64) -> bool {
        self.ends_at(target).is_some_and(|end| now < end)
    }

    /// When the last tween queued on `target` ends, if any.
    pub fn ends_at(&self, target: Target) -> Option<f64> {
        self.tweens
            .get(&target)?
            .iter()
            .map(Tween::end_ms)
            .reduce(f64::max)
    }

    /// Fold fully finished tween queues into resting poses.
    pub fn settle(&mut self, now: f64) {
        let done: Vec<Target> = self
            .tweens
            .iter()
            .filter(|(_, queue)| queue.iter().all(|tween| now >= tween.end_ms()))
            .map(|(target, _)| *target)
            .collect();
        for target in done {
            let pose = self.pose(target, now);
            self.tweens.remove(&target);
            self.poses.insert(target, pose);
        }
    }

    pub fn set_display(&mut self, target: Target, display: bool, now: f64) {
        let mut pose = self.pose(target, now);
        pose.display = display;
        if let Some(queue) = self.tweens.get_mut(&target) {
            for tween in queue {
                tween.from.display = display;
                tween.to.display = display;
            }
        }
        self.poses.insert(target, pose);
    }

    /// Every target with a recorded pose or tween, for the renderer.
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.poses.keys().copied().chain(
            self.tweens
                .keys()
                .filter(|target| !self.poses.contains_key(target))
                .copied(),
        )
    }

    pub fn clear(&mut self) {
        self.poses.clear();
        self.tweens.clear();
    }
}

/// Where a timeline entry starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum At {
    /// Milliseconds after the timeline's own start.
    Start(f64),
    /// Relative to the end of the previous entry (negative overlaps it).
    Previous(f64),
}

/// A group of tweens placed at relative offsets. The timeline only tracks its
/// extent; the tweens themselves live on the [`Stage`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeline {
    start_ms: f64,
    end_ms: f64,
    last_end_ms: f64,
}

impl Timeline {
    pub fn begin(now: f64) -> Self {
        Self {
            start_ms: now,
            end_ms: now,
            last_end_ms: now,
        }
    }

    pub fn to(
        &mut self,
        stage: &mut Stage,
        target: Target,
        pose: Pose,
        at: At,
        duration_ms: f64,
        easing: Easing,
    ) -> &mut Self {
        let start = match at {
            At::Start(offset) => self.start_ms + offset,
            At::Previous(delta) => self.last_end_ms + delta,
        };
        stage.animate_from_at(target, pose, self.start_ms, start, duration_ms, easing);
        self.last_end_ms = start + duration_ms;
        self.end_ms = self.end_ms.max(self.last_end_ms);
        self
    }

    pub fn end_ms(&self) -> f64 {
        self.end_ms
    }

    pub fn is_done(&self, now: f64) -> bool {
        now >= self.end_ms
    }
}

/// Two simultaneous motions: `outgoing` exits to the left while `incoming`
/// enters from the right. Done only when both have finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlideTransition {
    pub outgoing: Target,
    pub incoming: Target,
    end_ms: f64,
}

impl SlideTransition {
    pub fn start(
        stage: &mut Stage,
        outgoing: Target,
        incoming: Target,
        now: f64,
        duration_ms: f64,
    ) -> Self {
        stage.set(incoming, Pose::offscreen_right().shown());
        stage.animate_to(
            outgoing,
            Pose::default().with_x_pct(-100.0),
            now,
            duration_ms,
            Easing::Power2InOut,
        );
        stage.animate_to(incoming, Pose::default(), now, duration_ms, Easing::Power2InOut);
        Self {
            outgoing,
            incoming,
            end_ms: now + duration_ms,
        }
    }

    pub fn outgoing_done(&self, stage: &Stage, now: f64) -> bool {
        !stage.is_animating(self.outgoing, now)
    }

    pub fn is_done(&self, stage: &Stage, now: f64) -> bool {
        now >= self.end_ms
            && !stage.is_animating(self.outgoing, now)
            && !stage.is_animating(self.incoming, now)
    }
}
