use serde::{Deserialize, Serialize};

/// User-facing toggles that persist alongside progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    sound_enabled: bool,
    has_seen_onboarding: bool,
}

impl AppSettings {
    #[must_use]
    pub fn new(sound_enabled: bool, has_seen_onboarding: bool) -> Self {
        Self {
            sound_enabled,
            has_seen_onboarding,
        }
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn has_seen_onboarding(&self) -> bool {
        self.has_seen_onboarding
    }

    #[must_use]
    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_onboarding_seen(mut self) -> Self {
        self.has_seen_onboarding = true;
        self
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            has_seen_onboarding: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_sound_and_show_onboarding() {
        let settings = AppSettings::default();
        assert!(settings.sound_enabled());
        assert!(!settings.has_seen_onboarding());
    }

    #[test]
    fn builders_update_flags() {
        let settings = AppSettings::default()
            .with_sound_enabled(false)
            .with_onboarding_seen();
        assert_eq!(settings, AppSettings::new(false, true));
    }
}
