use keymap::KeyMap;

#[derive(KeyMap, Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Quit the application
    #[key("q")]
    Quit,
    /// Clear the tape and state, keeping the loaded rules
    #[key("r")]
    Reset,
    /// Seed the machine again from the loaded definition
    #[key("i")]
    Initialize,
    /// Advance the machine by one step
    #[key("space")]
    Step,
    /// Start or stop the automatic run
    #[key("p")]
    ToggleAutoRun,
    /// Toggle help display
    #[key("h")]
    ToggleHelp,
    /// Load the previous built-in machine
    #[key("left")]
    PreviousPreset,
    /// Load the next built-in machine
    #[key("right")]
    NextPreset,
    /// Scroll the log up
    #[key("up")]
    ScrollUp,
    /// Scroll the log down
    #[key("down")]
    ScrollDown,
}
