//! Transition kinds, the in-flight transition state and per-frame geometry

use ionos_display::Viewport;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::easing::Easing;
use super::ScreenId;
use crate::config::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Visual style of a screen change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransitionKind {
    /// Switch on the next update
    #[default]
    None,
    /// New screen enters from the right, moving left
    SlideLeft,
    /// New screen enters from the left, moving right
    SlideRight,
    /// New screen enters from the bottom, moving up
    SlideUp,
    /// New screen enters from the top, moving down
    SlideDown,
    Fade,
    /// New screen grows from half size
    ZoomIn,
    /// New screen shrinks from one and a half size
    ZoomOut,
}

impl TransitionKind {
    /// Transition that visually undoes this one
    pub const fn reversed(self) -> Self {
        match self {
            TransitionKind::None => TransitionKind::None,
            TransitionKind::SlideLeft => TransitionKind::SlideRight,
            TransitionKind::SlideRight => TransitionKind::SlideLeft,
            TransitionKind::SlideUp => TransitionKind::SlideDown,
            TransitionKind::SlideDown => TransitionKind::SlideUp,
            TransitionKind::Fade => TransitionKind::Fade,
            TransitionKind::ZoomIn => TransitionKind::ZoomOut,
            TransitionKind::ZoomOut => TransitionKind::ZoomIn,
        }
    }
}

/// Transition engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransitionState {
    #[default]
    Idle,
    Animating {
        kind: TransitionKind,
        from: ScreenId,
        to: ScreenId,
        start_ms: u32,
        duration_ms: u32,
        easing: Easing,
    },
}

impl TransitionState {
    pub fn is_animating(&self) -> bool {
        matches!(self, TransitionState::Animating { .. })
    }

    /// Linear progress in `[0, 1]`; `Idle` reports 1
    pub fn progress(&self, now_ms: u32) -> f32 {
        match *self {
            TransitionState::Idle => 1.0,
            TransitionState::Animating {
                kind,
                start_ms,
                duration_ms,
                ..
            } => {
                if kind == TransitionKind::None || duration_ms == 0 {
                    return 1.0;
                }
                let elapsed = now_ms.wrapping_sub(start_ms);
                if elapsed >= duration_ms {
                    1.0
                } else {
                    elapsed as f32 / duration_ms as f32
                }
            }
        }
    }

    /// Whether the transition has run its full duration
    pub fn is_complete(&self, now_ms: u32) -> bool {
        match *self {
            TransitionState::Idle => true,
            TransitionState::Animating {
                kind,
                start_ms,
                duration_ms,
                ..
            } => kind == TransitionKind::None || now_ms.wrapping_sub(start_ms) >= duration_ms,
        }
    }
}

/// Geometry of one rendered frame of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransitionFrame {
    pub kind: TransitionKind,
    pub from: ScreenId,
    pub to: ScreenId,
    /// Eased progress in `[0, 1]`
    pub progress: f32,
    /// Horizontal offset of the incoming screen (px)
    pub offset_x: i16,
    /// Vertical offset of the incoming screen (px)
    pub offset_y: i16,
    /// Incoming screen opacity, 0..=255
    pub opacity: u8,
    /// Incoming screen zoom, percent
    pub scale_pct: u8,
}

impl TransitionFrame {
    /// Compute the frame for an eased progress value
    pub fn compute(kind: TransitionKind, from: ScreenId, to: ScreenId, progress: f32) -> Self {
        let p = progress.clamp(0.0, 1.0);
        let remaining = 1.0 - p;

        let mut frame = Self {
            kind,
            from,
            to,
            progress: p,
            offset_x: 0,
            offset_y: 0,
            opacity: 255,
            scale_pct: 100,
        };

        match kind {
            TransitionKind::None => {}
            TransitionKind::SlideLeft => frame.offset_x = scaled(DISPLAY_WIDTH, remaining),
            TransitionKind::SlideRight => frame.offset_x = -scaled(DISPLAY_WIDTH, remaining),
            TransitionKind::SlideUp => frame.offset_y = scaled(DISPLAY_HEIGHT, remaining),
            TransitionKind::SlideDown => frame.offset_y = -scaled(DISPLAY_HEIGHT, remaining),
            TransitionKind::Fade => frame.opacity = round_unit(p * 255.0) as u8,
            TransitionKind::ZoomIn => frame.scale_pct = round_unit(50.0 + 50.0 * p) as u8,
            TransitionKind::ZoomOut => frame.scale_pct = round_unit(150.0 - 50.0 * p) as u8,
        }

        frame
    }

    /// Viewport the display backend applies for this frame
    pub fn viewport(&self) -> Viewport {
        Viewport {
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            opacity: self.opacity,
            scale_pct: self.scale_pct,
        }
    }
}

fn scaled(extent: u16, fraction: f32) -> i16 {
    round_unit(extent as f32 * fraction) as i16
}

// Values here are never negative
fn round_unit(value: f32) -> u16 {
    (value + 0.5) as u16
}
