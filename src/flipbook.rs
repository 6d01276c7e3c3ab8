//! Flipbook playback.
//!
//! A minimal playback host for [`FlipbookAnimator`]: it advances frames with
//! frame time, reports one-shot completion through [`FlipbookFinished`] and
//! mirrors the animator onto a `Sprite` when one is present.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::animation::{FlipbookAnimator, PenguinClip};
use crate::events::FlipbookFinished;

/// Frame range of one clip inside the sprite atlas.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ClipFrames {
    /// Atlas index of the first frame.
    pub first_index: usize,
    /// Number of frames (at least 1).
    pub frame_count: usize,
    /// Seconds per frame.
    pub frame_duration: f32,
}

impl ClipFrames {
    pub fn new(first_index: usize, frame_count: usize, frame_duration: f32) -> Self {
        Self {
            first_index,
            frame_count: frame_count.max(1),
            frame_duration,
        }
    }
}

/// Clip to atlas layout table.
#[derive(Resource, Debug, Clone)]
pub struct FlipbookLibrary {
    clips: HashMap<PenguinClip, ClipFrames>,
}

impl Default for FlipbookLibrary {
    /// Clips laid out back to back in the atlas at 12 frames per second.
    fn default() -> Self {
        let counts = [
            (PenguinClip::Falling, 2),
            (PenguinClip::Idle, 4),
            (PenguinClip::Waddle, 6),
            (PenguinClip::Belly, 2),
            (PenguinClip::BellyFast, 4),
            (PenguinClip::SlidePush, 5),
            (PenguinClip::OnHead, 2),
            (PenguinClip::InWater, 4),
            (PenguinClip::Swimming, 6),
        ];
        Self::sequential(&counts, 1.0 / 12.0)
    }
}

impl FlipbookLibrary {
    /// Lay the given clips out contiguously in the atlas.
    pub fn sequential(clips: &[(PenguinClip, usize)], frame_duration: f32) -> Self {
        let mut next = 0;
        let mut table = HashMap::new();
        for &(clip, count) in clips {
            let frames = ClipFrames::new(next, count, frame_duration);
            next += frames.frame_count;
            table.insert(clip, frames);
        }
        Self { clips: table }
    }

    /// Replace the layout of one clip.
    pub fn with_clip(mut self, clip: PenguinClip, frames: ClipFrames) -> Self {
        self.clips.insert(clip, frames);
        self
    }

    pub fn get(&self, clip: PenguinClip) -> Option<&ClipFrames> {
        self.clips.get(&clip)
    }

    /// Atlas index for a frame of a clip, clamped to the clip's range.
    pub fn atlas_index(&self, clip: PenguinClip, frame: usize) -> Option<usize> {
        self.get(clip)
            .map(|frames| frames.first_index + frame.min(frames.frame_count - 1))
    }
}

/// Shortest frame duration honoured, so a zero duration cannot spin.
const MIN_FRAME_DURATION: f32 = 1e-3;

/// Advance one animator by `delta` seconds.
///
/// Returns `true` when a non-looping clip reached its end during this step.
pub fn advance_animator(animator: &mut FlipbookAnimator, frames: &ClipFrames, delta: f32) -> bool {
    if !animator.playing {
        return false;
    }

    let duration = frames.frame_duration.max(MIN_FRAME_DURATION);
    animator.frame_elapsed += delta;

    while animator.frame_elapsed >= duration {
        animator.frame_elapsed -= duration;
        animator.frame += 1;

        if animator.frame >= frames.frame_count {
            if animator.is_looping() {
                animator.frame = 0;
            } else {
                animator.frame = frames.frame_count - 1;
                animator.frame_elapsed = 0.0;
                animator.playing = false;
                return true;
            }
        }
    }
    false
}

/// Advance every animator and report finished one-shots.
pub fn advance_flipbooks(
    time: Res<Time>,
    library: Res<FlipbookLibrary>,
    mut q_animators: Query<(Entity, &mut FlipbookAnimator)>,
    mut finished: EventWriter<FlipbookFinished>,
) {
    let delta = time.delta_secs();
    for (entity, mut animator) in &mut q_animators {
        let Some(frames) = library.get(animator.clip()) else {
            continue;
        };
        if advance_animator(&mut animator, frames, delta) {
            finished.write(FlipbookFinished { entity });
        }
    }
}

/// Clear the one-shot latch of animators whose clip finished.
pub fn apply_flipbook_finished(
    mut events: EventReader<FlipbookFinished>,
    mut q_animators: Query<&mut FlipbookAnimator>,
) {
    for event in events.read() {
        if let Ok(mut animator) = q_animators.get_mut(event.entity) {
            animator.on_playback_finished();
        }
    }
}

/// Copy mirroring and the current atlas frame onto the sprite.
pub fn sync_flipbook_sprites(
    library: Res<FlipbookLibrary>,
    mut q_sprites: Query<(&FlipbookAnimator, &mut Sprite), Changed<FlipbookAnimator>>,
) {
    for (animator, mut sprite) in &mut q_sprites {
        sprite.flip_x = animator.is_mirrored();
        if let (Some(atlas), Some(index)) = (
            sprite.texture_atlas.as_mut(),
            library.atlas_index(animator.clip(), animator.frame),
        ) {
            atlas.index = index;
        }
    }
}
