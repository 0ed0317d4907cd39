/*!
# Oscilloscope Data Viewer

A browser-based viewer for oscilloscope CSV exports, built in Rust.

## Overview

Oscilloscope exports routinely hold millions of samples per channel, far more
than a browser chart can draw. The viewer reads the export, reduces it to a
bounded number of points that still look like the original waveform, and
hands the result to Plotly.js. Zooming re-samples only the visible window,
so detail appears as the user narrows in.

## Architecture

### Core (pure, synchronous)
- **Channel Classifier** - picks the `CH*` / `REF*` columns out of a header
- **Decimator** - equally spaced point sampling down to a point budget
- **Range Filter** - keeps the rows inside the current time window
- **Pipeline** - range filter first, then decimation

### Collaborators
- **Loader** - fixed-header CSV reader (20 instrument-settings lines, then the table)
- **Graph** - builds a Plotly figure, combined or one subplot per channel
- **Display State** - trace renames and visibility, as an explicit value
- **Session** - one handler per user action: old state in, new state and figure out

### Web Layer (feature `web`)
- axum server holding the last uploaded table, serving the viewer page
  and a small JSON API

## Modules

- **table**: Sample table type
- **channels**: Channel classification and trace colors
- **decimate**: Point-budget decimation
- **range**: Viewport range and range filter
- **pipeline**: Filter-then-decimate composition
- **loader**: CSV ingestion
- **display**: Trace display state
- **graph**: Figure construction
- **session**: Per-action state transitions
- **downloader**: CSV export of the rendered view
- **config**: Viewer configuration
- **app**: Routing and handlers

## REST API Endpoints

- `GET /` - The viewer page
- `POST /api/upload` - Multipart upload (`file`, optional `state`), returns the first render
- `POST /api/action` - `{ state, action }`, returns the next state and figure
- `POST /api/export` - `{ state }`, returns the rendered rows as CSV
*/

pub mod channels;
pub mod config;
pub mod decimate;
pub mod display;
pub mod downloader;
pub mod error;
pub mod graph;
pub mod loader;
pub mod pipeline;
pub mod range;
pub mod session;
pub mod table;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the core operations to make them easier to use
pub use channels::classify_channels;
pub use decimate::decimate;
pub use error::{Result, ViewerError};
pub use pipeline::render_pipeline;
pub use range::{ViewportRange, filter_range};
pub use table::SampleTable;
