use super::{input::InputState, renderer::Frame};

/// A trait that represents a scene driven by the application loop.
#[allow(unused)]
pub trait Scene {
    /// Called each frame with the `delta_time` based on the time the last frame took and the state
    /// of all input devices.
    fn update(&mut self, delta_time: f32, input: &InputState) {}

    /// Called to render the frame.
    fn render(&mut self, frame: &mut Frame);
}
