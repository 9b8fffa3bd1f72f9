use transport::Resolution;

/// Display switches for one rendering session. Never mutated while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// color each note by pitch class
    pub color: bool,
    /// wrap the frame in a box
    pub border: bool,
    /// draw a keyboard aligned with the pitch lanes
    pub keyboard: bool,
    /// scroll in real time instead of printing once
    pub play: bool,
    /// follow audio playback of the file
    pub music: bool,
    pub resolution: Resolution,
}

impl DisplayOptions {
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}
