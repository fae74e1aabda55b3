//! Fit-to-page scaling: pure functions, no state.
//!
//! The factor is always derived from the intrinsic (unscaled) size of the CV box.
//! The browser reports `offsetWidth`/`offsetHeight`, which CSS transforms do not
//! affect, so a previous factor never leaks into the next computation.

use serde::{Deserialize, Serialize};

/// Width threshold above which the page is shown at natural size.
pub const DEFAULT_BREAKPOINT_PX: f64 = 900.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitConstraints {
    /// Viewports wider than this bypass scaling entirely.
    pub breakpoint_px: f64,
    /// Optional lower bound on the factor, for legibility over exact fit.
    pub min_scale: Option<f64>,
}

impl Default for FitConstraints {
    fn default() -> Self {
        Self {
            breakpoint_px: DEFAULT_BREAKPOINT_PX,
            min_scale: None,
        }
    }
}

/// Browser measurements taken when a trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub viewport_width: f64,
    /// `clientWidth` of the container, padding included.
    pub container_width: f64,
    #[serde(default)]
    pub padding_x: f64,
    #[serde(default)]
    pub padding_y: f64,
    /// Unscaled CV box. Zero while the document has not rendered.
    pub intrinsic: Size,
    /// True while the print medium is active.
    #[serde(default)]
    pub print: bool,
}

impl Measurements {
    pub fn available_width(&self) -> f64 {
        (self.container_width - self.padding_x).max(1.0)
    }
}

/// Factor plus the base dimensions it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleState {
    pub factor: f64,
    pub base_width: f64,
    pub base_height: f64,
}

impl ScaleState {
    pub fn scaled_height(&self) -> f64 {
        self.base_height * self.factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitOutcome {
    /// Apply `state.factor` and pin the container to `container_height` px.
    Scaled {
        state: ScaleState,
        container_height: f64,
    },
    /// Factor 1, compensating container height cleared.
    Reset,
    /// Nothing to fit yet.
    Skip,
}

/// `min(1, available / intrinsic)`, clamped below by `min_scale`. Never scales up.
pub fn compute_scale(container: Size, intrinsic: Size, constraints: &FitConstraints) -> f64 {
    let available = container.width.max(1.0);
    let intrinsic_width = intrinsic.width.max(1.0);
    let factor = (available / intrinsic_width).min(1.0);
    match constraints.min_scale {
        Some(min) => factor.max(min.min(1.0)),
        None => factor,
    }
}

/// Decides what the page should do for one set of measurements.
pub fn fit(m: &Measurements, constraints: &FitConstraints) -> FitOutcome {
    if m.print || m.viewport_width > constraints.breakpoint_px {
        return FitOutcome::Reset;
    }
    if m.intrinsic.width <= 0.0 || m.intrinsic.height <= 0.0 {
        return FitOutcome::Skip;
    }

    let container = Size {
        width: m.available_width(),
        height: 0.0,
    };
    let factor = compute_scale(container, m.intrinsic, constraints);
    let state = ScaleState {
        factor,
        base_width: m.intrinsic.width,
        base_height: m.intrinsic.height,
    };
    FitOutcome::Scaled {
        state,
        container_height: (state.scaled_height() + m.padding_y).ceil(),
    }
}
