//! Animation selection.
//!
//! The controller picks one of nine flipbook clips and asks the
//! [`FlipbookAnimator`] to play it. A non-looping clip that has not finished
//! blocks every selection that is not allowed to interrupt it.

use bevy::prelude::*;

use crate::config::PenguinConfig;
use crate::state::LocomotionState;

/// The canonical penguin clips.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PenguinClip {
    Falling,
    #[default]
    Idle,
    Waddle,
    Belly,
    BellyFast,
    SlidePush,
    OnHead,
    InWater,
    Swimming,
}

impl PenguinClip {
    pub const ALL: [PenguinClip; 9] = [
        PenguinClip::Falling,
        PenguinClip::Idle,
        PenguinClip::Waddle,
        PenguinClip::Belly,
        PenguinClip::BellyFast,
        PenguinClip::SlidePush,
        PenguinClip::OnHead,
        PenguinClip::InWater,
        PenguinClip::Swimming,
    ];
}

/// A request to play a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRequest {
    pub clip: PenguinClip,
    pub looping: bool,
    /// Whether the request may replace an unfinished one-shot clip.
    pub interrupts: bool,
}

impl ClipRequest {
    /// A looping clip that yields to one-shots.
    pub const fn looping(clip: PenguinClip) -> Self {
        Self {
            clip,
            looping: true,
            interrupts: false,
        }
    }

    /// A looping clip that always takes over.
    pub const fn forced(clip: PenguinClip) -> Self {
        Self {
            clip,
            looping: true,
            interrupts: true,
        }
    }

    /// A one-shot clip that always takes over.
    pub const fn one_shot(clip: PenguinClip) -> Self {
        Self {
            clip,
            looping: false,
            interrupts: true,
        }
    }
}

/// Selection and playback cursor for a penguin's flipbook.
///
/// The controller only calls [`select`](Self::select) and
/// [`set_mirrored`](Self::set_mirrored). The playback host advances `frame`
/// and reports completion through [`on_playback_finished`](Self::on_playback_finished).
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct FlipbookAnimator {
    clip: PenguinClip,
    looping: bool,
    busy_with_one_shot: bool,
    mirrored: bool,
    /// Current frame within the clip.
    pub frame: usize,
    /// Seconds spent on the current frame.
    pub frame_elapsed: f32,
    /// Whether playback is running.
    pub playing: bool,
    restarts: u32,
}

impl Default for FlipbookAnimator {
    fn default() -> Self {
        Self {
            clip: PenguinClip::Idle,
            looping: true,
            busy_with_one_shot: false,
            mirrored: false,
            frame: 0,
            frame_elapsed: 0.0,
            playing: true,
            restarts: 0,
        }
    }
}

impl FlipbookAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play `clip` unless an unfinished one-shot blocks it.
    ///
    /// Succeeds when no one-shot is in flight or `interrupts` is set. A new
    /// clip, or one whose playback had stopped, starts from frame zero; the
    /// clip that is already playing keeps its cursor. Returns whether the
    /// selection took effect.
    pub fn select(&mut self, clip: PenguinClip, looping: bool, interrupts: bool) -> bool {
        if self.busy_with_one_shot && !interrupts {
            return false;
        }
        if self.clip != clip || !self.playing {
            self.clip = clip;
            self.frame = 0;
            self.frame_elapsed = 0.0;
            self.playing = true;
            self.restarts = self.restarts.wrapping_add(1);
        }
        self.looping = looping;
        self.busy_with_one_shot = !looping;
        true
    }

    /// [`select`](Self::select) from a request.
    pub fn request(&mut self, request: ClipRequest) -> bool {
        self.select(request.clip, request.looping, request.interrupts)
    }

    /// Playback of the current clip finished. Clears the one-shot latch.
    pub fn on_playback_finished(&mut self) {
        self.busy_with_one_shot = false;
    }

    /// Mirror or un-mirror the sprite. Independent of clip selection.
    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    pub fn clip(&self) -> PenguinClip {
        self.clip
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_busy_with_one_shot(&self) -> bool {
        self.busy_with_one_shot
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// +1 when facing right, -1 when mirrored to face left.
    pub fn facing_sign(&self) -> f32 {
        if self.mirrored {
            -1.0
        } else {
            1.0
        }
    }

    /// Number of successful selections so far.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

/// Clip for a tick in which the horizontal axis is outside the dead zone.
///
/// Only walking has a dedicated clip; other states keep whatever is playing.
pub fn steering_clip(state: LocomotionState) -> Option<ClipRequest> {
    match state {
        LocomotionState::OnFeet => Some(ClipRequest::looping(PenguinClip::Waddle)),
        _ => None,
    }
}

/// Clip for a tick with no horizontal input.
pub fn resting_clip(
    state: LocomotionState,
    speed_sq: f32,
    config: &PenguinConfig,
) -> Option<ClipRequest> {
    match state {
        LocomotionState::OnFeet => Some(ClipRequest::looping(PenguinClip::Idle)),
        LocomotionState::OnBellyLeft | LocomotionState::OnBellyRight => {
            if speed_sq > config.slide_fast_speed * config.slide_fast_speed {
                Some(ClipRequest::looping(PenguinClip::BellyFast))
            } else {
                Some(ClipRequest::looping(PenguinClip::Belly))
            }
        }
        LocomotionState::OnHead => Some(ClipRequest::looping(PenguinClip::OnHead)),
        LocomotionState::Falling | LocomotionState::Swimming => None,
    }
}

/// Clip while swimming.
pub fn swimming_clip(thrusting: bool) -> ClipRequest {
    if thrusting {
        ClipRequest::forced(PenguinClip::Swimming)
    } else {
        ClipRequest::forced(PenguinClip::InWater)
    }
}

/// Clip while falling.
pub fn falling_clip() -> ClipRequest {
    ClipRequest::forced(PenguinClip::Falling)
}
