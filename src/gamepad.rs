use hand_synergy_controller::types::ControlVector;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
pub enum InputAction {
    /// Step to the next dataset sample.
    Advance,
    /// Replace the live control vector.
    Live(ControlVector),
}

#[cfg(feature = "gamepad")]
pub use self::pad::GamepadInput;

#[cfg(not(feature = "gamepad"))]
pub use self::none::GamepadInput;

#[cfg(feature = "gamepad")]
mod pad {
    use super::InputAction;
    use gilrs::{Axis, Button, Event, EventType, Gilrs};
    use hand_synergy_controller::types::ControlVector;
    use log::*;

    /// South advances the dataset, East toggles live stick control.
    pub struct GamepadInput {
        gilrs: Option<Gilrs>,
        live: bool,
    }

    /// Stick range -1..1 onto 0..1 closure.
    fn closure(value: f32) -> f32 {
        (value + 1.0) / 2.0
    }

    impl Default for GamepadInput {
        fn default() -> Self {
            Self::new()
        }
    }

    impl GamepadInput {
        pub fn new() -> Self {
            let gilrs = match Gilrs::new() {
                Ok(gilrs) => Some(gilrs),
                Err(e) => {
                    warn!("Gamepad input unavailable: {}", e);
                    None
                }
            };
            Self { gilrs, live: false }
        }

        pub fn poll(&mut self) -> Vec<InputAction> {
            let gilrs = match self.gilrs.as_mut() {
                Some(gilrs) => gilrs,
                None => return Vec::new(),
            };
            let mut actions = Vec::new();
            while let Some(Event { event, .. }) = gilrs.next_event() {
                match event {
                    EventType::ButtonPressed(Button::South, _) => {
                        actions.push(InputAction::Advance)
                    }
                    EventType::ButtonPressed(Button::East, _) => {
                        self.live = !self.live;
                        info!("Live stick control {}", if self.live { "on" } else { "off" });
                    }
                    _ => {}
                }
            }
            if self.live {
                if let Some((_, gamepad)) = gilrs.gamepads().next() {
                    if gamepad.is_connected() {
                        actions.push(InputAction::Live(ControlVector::new(
                            closure(gamepad.value(Axis::LeftStickY)),
                            closure(gamepad.value(Axis::RightStickY)),
                            closure(gamepad.value(Axis::RightStickX)),
                            closure(gamepad.value(Axis::LeftStickX)),
                        )));
                    }
                }
            }
            actions
        }
    }
}

#[cfg(not(feature = "gamepad"))]
mod none {
    use super::InputAction;

    /// Built without the `gamepad` feature. Never produces input.
    pub struct GamepadInput;

    impl Default for GamepadInput {
        fn default() -> Self {
            Self::new()
        }
    }

    impl GamepadInput {
        pub fn new() -> Self {
            log::debug!("Built without gamepad support");
            GamepadInput
        }

        pub fn poll(&mut self) -> Vec<InputAction> {
            Vec::new()
        }
    }
}

#[cfg(all(test, not(feature = "gamepad")))]
mod tests {
    use super::*;

    #[test]
    fn headless_input_is_silent() {
        let mut input = GamepadInput::default();
        assert!(input.poll().is_empty());
        assert!(GamepadInput::new().poll().is_empty());
    }
}
