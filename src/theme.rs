// Ambient dark-mode preference

/// Environment signal consulted when no theme preference has been stored
pub trait ThemeSignal {
    fn prefers_dark(&self) -> bool;
}

/// A signal with a known answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTheme(pub bool);

impl ThemeSignal for FixedTheme {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

/// Reads the terminal background from `COLORFGBG` ("fg;bg" or "fg;default;bg")
#[derive(Debug, Clone, Default)]
pub struct TerminalTheme {
    colorfgbg: Option<String>,
}

impl TerminalTheme {
    pub fn from_env() -> Self {
        Self {
            colorfgbg: std::env::var("COLORFGBG").ok(),
        }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            colorfgbg: Some(value.into()),
        }
    }
}

impl ThemeSignal for TerminalTheme {
    fn prefers_dark(&self) -> bool {
        let Some(value) = self.colorfgbg.as_deref() else {
            return false;
        };

        // Background is the last field; 0-6 and 8 are the dark ANSI colours
        match value.rsplit(';').next().and_then(|bg| bg.trim().parse::<u8>().ok()) {
            Some(bg) => bg <= 6 || bg == 8,
            None => false,
        }
    }
}
