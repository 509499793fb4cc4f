use std::time::{Duration, Instant};

/// Hidden key chord that opens the owner login prompt: Shift+O three times,
/// each press within five seconds of the previous one. Only hides the prompt; every mutation is still
/// re-authorized on the server.
#[derive(Debug, Clone)]
pub struct OwnerTrigger {
    key: char,
    presses_required: u32,
    window: Duration,
    count: u32,
    last_press: Option<Instant>,
}

impl Default for OwnerTrigger {
    fn default() -> Self {
        Self::new('O', 3, Duration::from_secs(5))
    }
}

impl OwnerTrigger {
    pub fn new(key: char, presses_required: u32, window: Duration) -> Self {
        Self {
            key: key.to_ascii_uppercase(),
            presses_required: presses_required.max(1),
            window,
            count: 0,
            last_press: None,
        }
    }

    /// Feed one key press. Returns true when the chord completes; the counter
    /// then starts over.
    pub fn press(&mut self, key: char, shift: bool, at: Instant) -> bool {
        if !shift || key.to_ascii_uppercase() != self.key {
            return false;
        }

        // Every press restarts the window.
        match self.last_press {
            Some(last) if at.saturating_duration_since(last) <= self.window => self.count += 1,
            _ => self.count = 1,
        }
        self.last_press = Some(at);

        if self.count >= self.presses_required {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.last_press = None;
    }

    /// Attributes read by the browser script.
    pub fn data_attributes(&self) -> String {
        format!(
            "data-trigger-key=\"{}\" data-trigger-count=\"{}\" data-trigger-window-ms=\"{}\"",
            self.key,
            self.presses_required,
            self.window.as_millis()
        )
    }
}
