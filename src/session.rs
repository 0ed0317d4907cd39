//! Explicit request/response handling for viewer interactions.
//!
//! Each user action is applied to an immutable [`ViewerState`] snapshot and
//! yields the next snapshot together with the chart to draw. Nothing here
//! holds state between calls; the host keeps whichever snapshot it wants.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::channels::classify_channels;
use crate::display::DisplayState;
use crate::error::{Result, ViewerError};
use crate::graph::{Figure, FigureOptions, Layout, build_figure};
use crate::pipeline::render_pipeline;
use crate::range::ViewportRange;
use crate::table::SampleTable;

/// Point budget offered before the user changes it.
pub const DEFAULT_POINT_BUDGET: i64 = 10_000;

/// Everything the viewer needs to re-render the current file.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ViewerState {
    /// Identifies the upload this state belongs to
    pub upload_id: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub point_budget: i64,
    #[serde(default)]
    pub range: Option<ViewportRange>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub display: DisplayState,
}

impl Default for ViewerState {
    fn default() -> Self {
        ViewerState {
            upload_id: 0,
            uploaded_at: None,
            point_budget: DEFAULT_POINT_BUDGET,
            range: None,
            layout: Layout::Combined,
            display: DisplayState::default(),
        }
    }
}

/// A single user interaction.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewerAction {
    /// A new file replaced the previous one
    Loaded {
        upload_id: u64,
        uploaded_at: DateTime<Utc>,
    },
    SetPointBudget {
        points: i64,
    },
    /// The chart was zoomed to `[low, high]` (bounds in either order)
    Zoom {
        low: f64,
        high: f64,
    },
    /// Autoscale / double-click: show the whole record again
    ResetZoom,
    SetLayout {
        layout: Layout,
    },
    /// Give `channel` a new legend name (blank restores the original)
    Rename {
        channel: String,
        name: String,
    },
    SetVisibility {
        name: String,
        visible: bool,
    },
    ToggleVisibility {
        name: String,
    },
    /// Re-render without changing anything
    Refresh,
}

/// Result of handling an action: the next state plus what to draw.
#[derive(Clone, Serialize, Debug)]
pub struct Step {
    pub state: ViewerState,
    pub figure: Figure,
    /// Rows in the rendered (filtered, decimated) table
    pub rows_shown: usize,
    /// Rows in the uploaded table
    pub rows_total: usize,
}

/// Applies `action` to `state` without touching the table
///
/// # Errors
/// * `InvalidArgument` for a non-positive point budget, non-finite zoom
///   bounds, or a rename to a name another channel already shows
pub fn apply(
    state: &ViewerState,
    channels: &[String],
    action: &ViewerAction,
) -> Result<ViewerState> {
    let mut next = state.clone();
    match action {
        ViewerAction::Loaded {
            upload_id,
            uploaded_at,
        } => {
            next.upload_id = *upload_id;
            next.uploaded_at = Some(*uploaded_at);
            next.range = None;
            next.display = state.display.reconcile(channels);
        }
        ViewerAction::SetPointBudget { points } => {
            if *points <= 0 {
                return Err(ViewerError::InvalidArgument(format!(
                    "point budget must be positive, got {}",
                    points
                )));
            }
            next.point_budget = *points;
        }
        ViewerAction::Zoom { low, high } => {
            next.range = Some(ViewportRange::new(*low, *high)?);
        }
        ViewerAction::ResetZoom => next.range = None,
        ViewerAction::SetLayout { layout } => next.layout = *layout,
        ViewerAction::Rename { channel, name } => {
            let wanted = match name.trim() {
                "" => channel.as_str(),
                trimmed => trimmed,
            };
            // Visibility is keyed by legend name, so two traces cannot share one.
            if let Some(other) = channels
                .iter()
                .find(|c| *c != channel && state.display.display_name(c) == wanted)
            {
                return Err(ViewerError::InvalidArgument(format!(
                    "'{}' is already the name of {}",
                    wanted, other
                )));
            }
            next.display = state.display.rename(channel, name);
        }
        ViewerAction::SetVisibility { name, visible } => {
            next.display = state.display.set_visible(name, *visible);
        }
        ViewerAction::ToggleVisibility { name } => {
            next.display = state.display.toggle(name);
        }
        ViewerAction::Refresh => {}
    }
    next.display = next.display.with_defaults(channels);
    Ok(next)
}

/// Renders `table` as described by `state`.
pub fn render(state: &ViewerState, table: &SampleTable, options: &FigureOptions) -> Result<Step> {
    let channels = classify_channels(&table.columns);
    let shown = render_pipeline(table, state.range.as_ref(), state.point_budget)?;
    let figure = build_figure(&shown, &channels, &state.display, state.layout, options)?;
    Ok(Step {
        state: state.clone(),
        figure,
        rows_shown: shown.len(),
        rows_total: table.len(),
    })
}

/// Handles one user action against the raw table of the current upload
///
/// The returned [`Step`] carries the next state; on error the caller keeps
/// its previous state.
pub fn handle(
    state: &ViewerState,
    table: &SampleTable,
    action: &ViewerAction,
    options: &FigureOptions,
) -> Result<Step> {
    let channels = classify_channels(&table.columns);
    let next = apply(state, &channels, action)?;
    debug!("action {:?} -> budget {} range {:?}", action, next.point_budget, next.range);
    render(&next, table, options)
}
