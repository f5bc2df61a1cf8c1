//! # Configuration
//!
//! The editor's tunables. Loading these from a file (an `/etc`- or `$XDG_CONFIG_HOME`-style INI,
//! as earlier drafts of this module explored) is out of scope: the values below are the ones a
//! user would actually get, so they are simply the defaults.

use std::time::Duration;

/// The number of columns a tab advances to the next multiple of.
pub const TAB_STOP: usize = 8;

/// The number of extra Ctrl-Q presses required to quit with unsaved changes.
pub const QUIT_TIMES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// The size of a tab. Must be > 0.
    pub tab_stop: usize,
    /// The number of confirmations needed before quitting, when changes have been made since the
    /// file was last saved.
    pub quit_times: usize,
    /// The duration for which messages are shown in the status bar.
    pub message_dur: Duration,
}

impl Default for Config {
    /// Default configuration.
    fn default() -> Self {
        Self { tab_stop: TAB_STOP, quit_times: QUIT_TIMES, message_dur: Duration::new(5, 0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let config = Config::default();
        assert_eq!(config.tab_stop, 8);
        assert_eq!(config.quit_times, 1);
        assert_eq!(config.message_dur, Duration::new(5, 0));
    }
}
