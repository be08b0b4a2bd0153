/// A single frame of text output.
#[derive(Debug, Default)]
pub struct Frame {
    pub index: u64,
    /// Seconds since the renderer was created.
    pub time: f32,
    lines: Vec<String>,
}

impl Frame {
    pub fn draw_text(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Presents frames as log output, skipping frames that show nothing new.
#[derive(Default)]
pub struct Renderer {
    frame_index: u64,
    last_lines: Vec<String>,
}

impl Renderer {
    pub fn begin_frame(&mut self, time: f32) -> Frame {
        let frame = Frame {
            index: self.frame_index,
            time,
            lines: Vec::default(),
        };
        self.frame_index += 1;
        frame
    }

    /// Returns true if the frame differed from the last one presented.
    pub fn present(&mut self, frame: Frame) -> bool {
        if frame.lines() == self.last_lines.as_slice() {
            return false;
        }

        for line in frame.lines.iter() {
            tracing::info!(frame = frame.index, time = frame.time, "{line}");
        }

        self.last_lines = frame.lines;
        true
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_index
    }
}
