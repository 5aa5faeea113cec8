// Logical animation playback for the player
//
// The real skinned animator lives in the rendering layer. Gameplay only needs
// which clip is active, how far through it is, and a couple of smoothed blend
// parameters, so that is all this player tracks. Clips that drive gameplay
// transitions carry a transition point; crossing it queues an event the
// controller forwards to the state machine.

use std::collections::HashMap;

use crate::core::math::lerp;

/// Every animation clip the character can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    Idle,
    Move,
    Landing,
    StopRun,
    Fall,
    Jump,
    JumpSuper,
    JumpBack,
    Dash,
    DashAir,
    WallJumpAttach,
    WallJumpJump,
    LedgeGrab,
    LedgeGetupNormal,
    LedgeGetupFast,
    RecoilJump,
    RecoilPound,
    RecoilPoundLanding,
    RecoilPoundBounceJump,
}

/// Blend parameters fed to the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendParam {
    /// 0 = standing, 1 = full run. Drives the idle/move blend tree.
    MoveScale,
    /// Signed lean while turning, -1 to 1.
    TiltScale,
}

#[derive(Debug, Clone, Copy)]
pub struct ClipDef {
    pub duration: f32,
    pub looping: bool,
    /// Normalized time at which the clip hands control back to gameplay.
    /// None for clips that exit through other means.
    pub transition_point: Option<f32>,
}

impl ClipDef {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            looping: false,
            transition_point: None,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn transition_at(mut self, normalized_time: f32) -> Self {
        self.transition_point = Some(normalized_time);
        self
    }
}

#[derive(Debug)]
pub struct AnimationPlayer {
    clips: HashMap<Clip, ClipDef>,
    current: Clip,
    normalized_time: f32,
    speed: f32,
    transition_fired: bool,
    move_scale: f32,
    tilt_scale: f32,
    tilt_layer_weight: f32,
    events: Vec<Clip>,
}

impl AnimationPlayer {
    pub fn new(clips: HashMap<Clip, ClipDef>) -> Self {
        Self {
            clips,
            current: Clip::Idle,
            normalized_time: 0.0,
            speed: 1.0,
            transition_fired: false,
            move_scale: 0.0,
            tilt_scale: 0.0,
            tilt_layer_weight: 0.0,
            events: Vec::new(),
        }
    }

    /// The full clip set for the player character.
    pub fn with_player_clips() -> Self {
        let mut clips = HashMap::new();
        clips.insert(Clip::Idle, ClipDef::new(2.0).looping());
        clips.insert(Clip::Move, ClipDef::new(0.8).looping());
        clips.insert(Clip::Landing, ClipDef::new(0.3));
        clips.insert(Clip::StopRun, ClipDef::new(0.5).transition_at(0.85));
        clips.insert(Clip::Fall, ClipDef::new(1.0).looping());
        clips.insert(Clip::Jump, ClipDef::new(0.9));
        clips.insert(Clip::JumpSuper, ClipDef::new(0.9));
        clips.insert(Clip::JumpBack, ClipDef::new(0.9));
        clips.insert(Clip::Dash, ClipDef::new(0.55).transition_at(0.9));
        clips.insert(Clip::DashAir, ClipDef::new(0.8));
        clips.insert(Clip::WallJumpAttach, ClipDef::new(1.0).looping());
        clips.insert(Clip::WallJumpJump, ClipDef::new(0.85));
        clips.insert(Clip::LedgeGrab, ClipDef::new(1.0).looping());
        clips.insert(Clip::LedgeGetupNormal, ClipDef::new(0.7).transition_at(0.9));
        clips.insert(Clip::LedgeGetupFast, ClipDef::new(0.5).transition_at(0.9));
        clips.insert(Clip::RecoilJump, ClipDef::new(1.0).transition_at(0.95));
        clips.insert(Clip::RecoilPound, ClipDef::new(0.7));
        clips.insert(Clip::RecoilPoundLanding, ClipDef::new(0.6).transition_at(0.9));
        clips.insert(Clip::RecoilPoundBounceJump, ClipDef::new(0.9));
        Self::new(clips)
    }

    pub fn current(&self) -> Clip {
        self.current
    }

    pub fn normalized_time(&self) -> f32 {
        self.normalized_time
    }

    /// Whether `clip` is playing past `normalized_time`.
    pub fn playing_past(&self, clip: Clip, normalized_time: f32) -> bool {
        self.current == clip && self.normalized_time > normalized_time
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Play a clip from the start. Replaying the current clip restarts it.
    pub fn play(&mut self, clip: Clip) {
        self.play_at(clip, 0.0);
    }

    /// Play a clip from a given normalized time.
    pub fn play_at(&mut self, clip: Clip, normalized_time: f32) {
        self.current = clip;
        self.normalized_time = normalized_time;
        self.transition_fired = false;
    }

    /// Blend into a clip. Gameplay treats this the same as `play`; the fade
    /// time only matters to the renderer.
    pub fn cross_fade(&mut self, clip: Clip, _fade_time: f32) {
        if self.current != clip {
            self.play(clip);
        }
    }

    pub fn param(&self, param: BlendParam) -> f32 {
        match param {
            BlendParam::MoveScale => self.move_scale,
            BlendParam::TiltScale => self.tilt_scale,
        }
    }

    pub fn set_param(&mut self, param: BlendParam, value: f32) {
        match param {
            BlendParam::MoveScale => self.move_scale = value,
            BlendParam::TiltScale => self.tilt_scale = value,
        }
    }

    /// Damp a parameter towards a target over roughly `smooth_time` seconds.
    pub fn set_param_smoothed(&mut self, param: BlendParam, target: f32, smooth_time: f32, dt: f32) {
        let t = if smooth_time <= 0.0 {
            1.0
        } else {
            (dt / smooth_time).clamp(0.0, 1.0)
        };
        let value = lerp(self.param(param), target, t);
        self.set_param(param, value);
    }

    pub fn tilt_layer_weight(&self) -> f32 {
        self.tilt_layer_weight
    }

    pub fn set_tilt_layer_weight(&mut self, weight: f32) {
        self.tilt_layer_weight = weight.clamp(0.0, 1.0);
    }

    /// Advance playback. Transition events queue up for `take_events`.
    pub fn update(&mut self, dt: f32) {
        let Some(def) = self.clips.get(&self.current) else {
            return;
        };
        if def.duration <= 0.0 {
            return;
        }
        self.normalized_time += dt * self.speed / def.duration;
        if def.looping {
            if self.normalized_time >= 1.0 {
                self.normalized_time %= 1.0;
            }
            return;
        }
        if let Some(point) = def.transition_point {
            if !self.transition_fired && self.normalized_time >= point {
                self.transition_fired = true;
                self.events.push(self.current);
            }
        }
        if self.normalized_time > 1.0 {
            self.normalized_time = 1.0;
        }
    }

    /// Drain the transition events crossed since the last call.
    pub fn take_events(&mut self) -> Vec<Clip> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_restarts_clip() {
        let mut anim = AnimationPlayer::with_player_clips();
        anim.play(Clip::Dash);
        anim.update(0.2);
        assert!(anim.normalized_time() > 0.0);
        anim.play(Clip::Dash);
        assert_eq!(anim.normalized_time(), 0.0);
    }

    #[test]
    fn test_cross_fade_keeps_current_clip_position() {
        let mut anim = AnimationPlayer::with_player_clips();
        anim.play(Clip::Fall);
        anim.update(0.3);
        let nt = anim.normalized_time();
        anim.cross_fade(Clip::Fall, 0.2);
        assert_eq!(anim.normalized_time(), nt);
        anim.cross_fade(Clip::Idle, 0.2);
        assert_eq!(anim.current(), Clip::Idle);
        assert_eq!(anim.normalized_time(), 0.0);
    }

    #[test]
    fn test_transition_event_fires_once() {
        let mut anim = AnimationPlayer::with_player_clips();
        anim.play(Clip::Dash); // 0.55s, transition at 0.9
        for _ in 0..40 {
            anim.update(1.0 / 60.0);
        }
        assert_eq!(anim.take_events(), vec![Clip::Dash]);
        anim.update(1.0 / 60.0);
        assert!(anim.take_events().is_empty());
    }

    #[test]
    fn test_looping_clip_wraps_without_events() {
        let mut anim = AnimationPlayer::with_player_clips();
        anim.play(Clip::Fall);
        for _ in 0..120 {
            anim.update(1.0 / 60.0);
        }
        assert!(anim.normalized_time() < 1.0);
        assert!(anim.take_events().is_empty());
    }

    #[test]
    fn test_playback_speed_scales_advance() {
        let mut anim = AnimationPlayer::with_player_clips();
        anim.play(Clip::RecoilPoundBounceJump); // 0.9s
        anim.set_speed(1.5);
        anim.update(0.3);
        assert!((anim.normalized_time() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_param_smoothing_moves_towards_target() {
        let mut anim = AnimationPlayer::with_player_clips();
        anim.set_param(BlendParam::MoveScale, 0.0);
        anim.set_param_smoothed(BlendParam::MoveScale, 1.0, 0.15, 0.05);
        let first = anim.param(BlendParam::MoveScale);
        assert!(first > 0.0 && first < 1.0);
        anim.set_param_smoothed(BlendParam::MoveScale, 1.0, 0.15, 1.0);
        assert_eq!(anim.param(BlendParam::MoveScale), 1.0);
    }
}
