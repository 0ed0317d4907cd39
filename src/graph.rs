use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

use crate::channels::channel_color;
use crate::display::DisplayState;
use crate::error::{Result, ViewerError};
use crate::table::{SampleTable, TIME_COLUMN};

/// How channel traces are arranged in the chart
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// All channels overlaid in one plot
    #[default]
    Combined,

    /// One subplot row per channel, sharing the time axis
    Split,
}

impl FromStr for Layout {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "combined" => Ok(Layout::Combined),
            "split" => Ok(Layout::Split),
            other => Err(ViewerError::InvalidArgument(format!(
                "unknown layout '{}', expected 'combined' or 'split'",
                other
            ))),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Combined => write!(f, "combined"),
            Layout::Split => write!(f, "split"),
        }
    }
}

/// Styling options for figure generation
///
/// This structure contains the customizable text and theme of the chart.
#[derive(Clone, Debug)]
pub struct FigureOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the time axis
    pub x_label: String,

    /// Plotly template name
    pub template: String,
}

impl Default for FigureOptions {
    /// Dark oscilloscope look: `plotly_dark` template and a plain title.
    fn default() -> Self {
        Self {
            title: "Oscilloscope Data".to_string(),
            x_label: TIME_COLUMN.to_string(),
            template: "plotly_dark".to_string(),
        }
    }
}

/// Plotly `visible` attribute: `true` or `"legendonly"`.
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum TraceVisibility {
    Shown(bool),
    Hidden(&'static str),
}

impl TraceVisibility {
    pub fn from_flag(visible: bool) -> Self {
        if visible {
            TraceVisibility::Shown(true)
        } else {
            TraceVisibility::Hidden("legendonly")
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
}

/// One line trace, serialised in Plotly.js form.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    /// Original channel name, so the browser can report events per channel
    pub meta: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub line: LineStyle,
    pub visible: TraceVisibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

/// A complete chart description, ready for `Plotly.react(div, data, layout)`.
#[derive(Clone, Serialize, Debug)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Value,
}

/// Builds the chart for a (filtered, decimated) table
///
/// One trace per channel in `channels`, in that order. Trace names come
/// from the rename map, colors from the original channel name, and hidden
/// traces stay in the legend so they can be toggled back on.
///
/// # Errors
/// * `MissingTimeColumn` if the table has no `TIME` column
pub fn build_figure(
    table: &SampleTable,
    channels: &[String],
    display: &DisplayState,
    layout: Layout,
    options: &FigureOptions,
) -> Result<Figure> {
    let t = table.time_index()?;
    let x: Vec<f64> = table.rows.iter().map(|row| row[t]).collect();

    let mut data = Vec::with_capacity(channels.len());
    for channel in channels {
        let Some(y) = table.column_values(channel) else {
            continue;
        };
        let name = display.display_name(channel).to_string();
        let visible = TraceVisibility::from_flag(display.is_visible(&name));
        data.push(Trace {
            kind: "scattergl",
            mode: "lines",
            meta: channel.clone(),
            name,
            x: x.clone(),
            y,
            line: LineStyle {
                color: channel_color(channel),
            },
            visible,
            xaxis: None,
            yaxis: None,
        });
    }

    let layout = match layout {
        Layout::Combined => combined_layout(options),
        Layout::Split => split_layout(&mut data, options),
    };

    Ok(Figure { data, layout })
}

fn axis(extra: Value) -> Value {
    let mut axis = json!({ "griddash": "dot", "zeroline": false });
    if let (Some(base), Value::Object(extra)) = (axis.as_object_mut(), extra) {
        base.extend(extra);
    }
    axis
}

fn combined_layout(options: &FigureOptions) -> Value {
    json!({
        "template": options.template,
        "title": { "text": options.title },
        "xaxis": axis(json!({ "title": { "text": options.x_label } })),
        "yaxis": axis(json!({})),
        "uirevision": "scope",
    })
}

// Assigns each trace its own row and returns the matching grid layout.
fn split_layout(data: &mut [Trace], options: &FigureOptions) -> Value {
    let mut layout = json!({
        "template": options.template,
        "title": { "text": options.title },
        "grid": { "rows": data.len().max(1), "columns": 1, "pattern": "independent" },
        "showlegend": true,
        "uirevision": "scope",
    });

    let rows = data.len();
    if let Some(obj) = layout.as_object_mut() {
        for (i, trace) in data.iter_mut().enumerate() {
            let suffix = if i == 0 { String::new() } else { (i + 1).to_string() };
            trace.xaxis = Some(format!("x{}", suffix));
            trace.yaxis = Some(format!("y{}", suffix));

            let mut x_extra = json!({});
            if i > 0 {
                x_extra["matches"] = json!("x");
            }
            if i + 1 == rows {
                x_extra["title"] = json!({ "text": options.x_label });
            } else {
                x_extra["showticklabels"] = json!(false);
            }
            obj.insert(format!("xaxis{}", suffix), axis(x_extra));
            obj.insert(
                format!("yaxis{}", suffix),
                axis(json!({ "title": { "text": trace.name } })),
            );
        }
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::classify_channels;

    fn sample() -> SampleTable {
        let columns = ["TIME", "CH1", "FOO", "REF2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![vec![0.0, 1.0, 9.0, -1.0], vec![1.0, 2.0, 9.0, -2.0]];
        SampleTable::from_rows(columns, rows).unwrap()
    }

    #[test]
    fn test_combined_figure() {
        let table = sample();
        let channels = classify_channels(&table.columns);
        let fig = build_figure(
            &table,
            &channels,
            &DisplayState::default(),
            Layout::Combined,
            &FigureOptions::default(),
        )
        .unwrap();

        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.data[0].name, "CH1");
        assert_eq!(fig.data[0].x, vec![0.0, 1.0]);
        assert_eq!(fig.data[0].y, vec![1.0, 2.0]);
        assert_eq!(fig.data[0].line.color, "yellow");
        assert_eq!(fig.data[1].line.color, "lightgray");
        assert!(fig.data.iter().all(|t| t.xaxis.is_none()));
        assert_eq!(fig.layout["template"], "plotly_dark");
        assert_eq!(fig.layout["xaxis"]["griddash"], "dot");
        assert_eq!(fig.layout["yaxis"]["zeroline"], false);
    }

    #[test]
    fn test_split_figure_assigns_axes() {
        let table = sample();
        let channels = classify_channels(&table.columns);
        let fig = build_figure(
            &table,
            &channels,
            &DisplayState::default(),
            Layout::Split,
            &FigureOptions::default(),
        )
        .unwrap();

        assert_eq!(fig.data[0].xaxis.as_deref(), Some("x"));
        assert_eq!(fig.data[1].yaxis.as_deref(), Some("y2"));
        assert_eq!(fig.layout["grid"]["rows"], 2);
        assert_eq!(fig.layout["xaxis2"]["matches"], "x");
        assert_eq!(fig.layout["yaxis2"]["title"]["text"], "REF2");
    }

    #[test]
    fn test_display_state_applied() {
        let table = sample();
        let channels = classify_channels(&table.columns);
        let display = DisplayState::default()
            .rename("CH1", "Vout")
            .set_visible("REF2", false);
        let fig = build_figure(
            &table,
            &channels,
            &display,
            Layout::Combined,
            &FigureOptions::default(),
        )
        .unwrap();

        assert_eq!(fig.data[0].name, "Vout");
        assert_eq!(fig.data[0].meta, "CH1");
        assert_eq!(fig.data[0].line.color, "yellow");

        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["data"][0]["visible"], true);
        assert_eq!(json["data"][1]["visible"], "legendonly");
        assert_eq!(json["data"][0]["type"], "scattergl");
    }

    #[test]
    fn test_empty_table_renders_empty_traces() {
        let table = SampleTable::new(vec!["TIME".to_string(), "CH1".to_string()]);
        let fig = build_figure(
            &table,
            &["CH1".to_string()],
            &DisplayState::default(),
            Layout::Split,
            &FigureOptions::default(),
        )
        .unwrap();
        assert_eq!(fig.data.len(), 1);
        assert!(fig.data[0].x.is_empty());
    }

    #[test]
    fn test_missing_time_column() {
        let table = SampleTable::new(vec!["CH1".to_string()]);
        assert!(matches!(
            build_figure(
                &table,
                &["CH1".to_string()],
                &DisplayState::default(),
                Layout::Combined,
                &FigureOptions::default()
            ),
            Err(ViewerError::MissingTimeColumn)
        ));
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("Split".parse::<Layout>().unwrap(), Layout::Split);
        assert_eq!("combined".parse::<Layout>().unwrap(), Layout::Combined);
        assert!("grid".parse::<Layout>().is_err());
        assert_eq!(Layout::Split.to_string(), "split");
    }
}
