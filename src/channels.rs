use lazy_static::lazy_static;
use std::collections::HashMap;

/// Column-name prefixes that mark a column as an oscilloscope channel.
pub const CHANNEL_PREFIXES: [&str; 2] = ["CH", "REF"];

/// Color used for channels that are not in the palette.
pub const FALLBACK_COLOR: &str = "white";

lazy_static! {
    static ref CHANNEL_COLORS: HashMap<&'static str, &'static str> = {
        let mut colors = HashMap::new();
        colors.insert("CH1", "yellow");
        colors.insert("CH2", "cyan");
        colors.insert("CH3", "purple");
        colors.insert("CH4", "lime");
        colors.insert("REF1", "lightgray");
        colors.insert("REF2", "lightgray");
        colors.insert("REF3", "lightgray");
        colors.insert("REF4", "lightgray");
        colors
    };
}

/// Returns true if `name` is a channel column (`CH*` or `REF*`).
pub fn is_channel(name: &str) -> bool {
    CHANNEL_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Selects the channel columns from a table header
///
/// Non-channel columns (the time axis and any metadata) are dropped. The
/// result keeps the order of `columns`, so trace ordering and coloring stay
/// stable from one render to the next.
///
/// # Examples
/// ```
/// use scopeview::channels::classify_channels;
///
/// let columns = ["TIME", "CH1", "FOO", "REF2"];
/// assert_eq!(classify_channels(&columns), vec!["CH1", "REF2"]);
/// ```
pub fn classify_channels<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns
        .iter()
        .map(|c| c.as_ref())
        .filter(|name| is_channel(name))
        .map(|name| name.to_string())
        .collect()
}

/// Trace color for a channel, keyed by its original column name.
pub fn channel_color(channel: &str) -> &'static str {
    CHANNEL_COLORS.get(channel).copied().unwrap_or(FALLBACK_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_channels() {
        let columns = ["TIME", "CH1", "FOO", "REF2"];
        assert_eq!(classify_channels(&columns), vec!["CH1", "REF2"]);
    }

    #[test]
    fn test_classify_channels_preserves_order() {
        let columns = vec![
            "REF1".to_string(),
            "TIME".to_string(),
            "CH3".to_string(),
            "CH1".to_string(),
        ];
        assert_eq!(classify_channels(&columns), vec!["REF1", "CH3", "CH1"]);
    }

    #[test]
    fn test_classify_channels_no_match() {
        let columns = ["TIME", "TRIGGER", "ch1"];
        assert!(classify_channels(&columns).is_empty());
        assert!(classify_channels::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_channel_color() {
        assert_eq!(channel_color("CH1"), "yellow");
        assert_eq!(channel_color("CH4"), "lime");
        assert_eq!(channel_color("REF3"), "lightgray");
        assert_eq!(channel_color("CH7"), FALLBACK_COLOR);
    }
}
