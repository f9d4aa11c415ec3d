/// Commands sent from the input forwarder to the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Toggle the capture session: start when idle, stop when recording.
    ToggleRecording,
    /// Switch the observed display theme.
    CycleTheme,
    /// Request application shutdown.
    Shutdown,
}
