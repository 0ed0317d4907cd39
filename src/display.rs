use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-file trace presentation choices made by the user
///
/// `renames` maps an original channel name to the name shown in the legend.
/// `visibility` is keyed by that shown name; a missing entry means visible.
/// Every method returns a new value, the caller decides what to keep.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct DisplayState {
    #[serde(default)]
    pub visibility: BTreeMap<String, bool>,
    #[serde(default)]
    pub renames: BTreeMap<String, String>,
}

impl DisplayState {
    /// Legend name for `channel`.
    pub fn display_name<'a>(&'a self, channel: &'a str) -> &'a str {
        self.renames.get(channel).map_or(channel, String::as_str)
    }

    pub fn is_visible(&self, display_name: &str) -> bool {
        self.visibility.get(display_name).copied().unwrap_or(true)
    }

    /// Marks every channel without a visibility entry as visible.
    pub fn with_defaults<S: AsRef<str>>(&self, channels: &[S]) -> DisplayState {
        let mut next = self.clone();
        for channel in channels {
            let name = next.display_name(channel.as_ref()).to_string();
            next.visibility.entry(name).or_insert(true);
        }
        next
    }

    /// Renames `channel`, carrying its visibility flag over to the new name.
    ///
    /// A blank `new_name` (or one equal to the channel) removes the rename.
    pub fn rename(&self, channel: &str, new_name: &str) -> DisplayState {
        let mut next = self.clone();
        let old_name = next.display_name(channel).to_string();
        let new_name = new_name.trim();

        if new_name.is_empty() || new_name == channel {
            next.renames.remove(channel);
        } else {
            next.renames.insert(channel.to_string(), new_name.to_string());
        }

        let target = next.display_name(channel).to_string();
        if target != old_name {
            if let Some(flag) = next.visibility.remove(&old_name) {
                next.visibility.insert(target, flag);
            }
        }
        next
    }

    pub fn set_visible(&self, display_name: &str, visible: bool) -> DisplayState {
        let mut next = self.clone();
        next.visibility.insert(display_name.to_string(), visible);
        next
    }

    pub fn toggle(&self, display_name: &str) -> DisplayState {
        let visible = self.is_visible(display_name);
        self.set_visible(display_name, !visible)
    }

    /// Fits the state to a newly loaded channel set
    ///
    /// Renames of channels that no longer exist are dropped, visibility
    /// entries that do not name a current trace are dropped, and every
    /// current trace without an entry is shown.
    pub fn reconcile<S: AsRef<str>>(&self, channels: &[S]) -> DisplayState {
        let renames: BTreeMap<String, String> = self
            .renames
            .iter()
            .filter(|(from, _)| channels.iter().any(|c| c.as_ref() == from.as_str()))
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();

        let mut next = DisplayState {
            visibility: BTreeMap::new(),
            renames,
        };
        for channel in channels {
            let name = next.display_name(channel.as_ref()).to_string();
            let flag = self.visibility.get(&name).copied().unwrap_or(true);
            next.visibility.insert(name, flag);
        }
        next
    }
}
