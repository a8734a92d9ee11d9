/// Everything the event loop can ask the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveDown,
    MoveUp,
    PageDown,
    PageUp,
    GoTop,
    GoBottom,
    /// Enter: toggle the detail pane, or confirm inside a modal.
    DrillIn,
    /// Esc: close the topmost overlay.
    NavigateBack,

    // Filters
    CycleStatus,
    CycleCategory,
    CycleField,
    CycleTask,
    ToggleSort,
    StartSearch,
    StartDateInput,
    CycleMonth,

    // Selection & export
    ToggleSelect,
    SelectRendered,
    ClearSelection,
    Export,
    EditExportPath,
    CopyBibtex,

    CycleTheme,
    SaveConfig,
    ToggleHelp,

    /// A typed character in a text mode; `'\x08'` is backspace.
    TextInput(char),
    TextConfirm,
    TextCancel,

    Resize(u16, u16),
    Tick,
    None,
}
