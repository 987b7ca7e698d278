//! Fullscreen state for the game container, independent of the load phase.
//!
//! With the native API the state follows the host's change notifications;
//! without it the container is expanded with a CSS class and the state flips
//! immediately.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullscreenEffect {
    RequestNative,
    ExitNative,
    /// Add or remove the CSS-only fullscreen class.
    Simulate(bool),
    /// Refresh the toggle button icon and title.
    Button(bool),
    /// Toggle the focused-game body class.
    BodyFocused(bool),
}

#[derive(Clone, Debug)]
pub struct Fullscreen {
    native: bool,
    active: bool,
    simulated: bool,
}

impl Fullscreen {
    pub fn new(native_supported: bool) -> Self {
        Self {
            native: native_supported,
            active: false,
            simulated: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    pub fn toggle(&mut self) -> Vec<FullscreenEffect> {
        if self.active { self.exit() } else { self.enter() }
    }

    pub fn enter(&mut self) -> Vec<FullscreenEffect> {
        if self.active {
            return Vec::new();
        }
        if self.native {
            vec![FullscreenEffect::RequestNative]
        } else {
            self.set_simulated(true)
        }
    }

    pub fn exit(&mut self) -> Vec<FullscreenEffect> {
        if !self.active {
            return Vec::new();
        }
        if self.simulated {
            self.set_simulated(false)
        } else {
            vec![FullscreenEffect::ExitNative]
        }
    }

    /// The host reported a native fullscreen change.
    pub fn host_changed(&mut self, active: bool) -> Vec<FullscreenEffect> {
        self.active = active;
        self.simulated = false;
        vec![
            FullscreenEffect::Button(active),
            FullscreenEffect::BodyFocused(active),
        ]
    }

    /// A native request was refused; fall back to the CSS variant from now on.
    pub fn native_failed(&mut self) -> Vec<FullscreenEffect> {
        self.native = false;
        self.set_simulated(true)
    }

    fn set_simulated(&mut self, on: bool) -> Vec<FullscreenEffect> {
        self.active = on;
        self.simulated = on;
        vec![FullscreenEffect::Simulate(on), FullscreenEffect::Button(on)]
    }
}
