//! Keyboard shortcuts and menu entries, mapped onto lifecycle commands.

/// Everything the user can ask the file lifecycle to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    New,
    Open,
    Save,
}

impl Command {
    pub const ALL: [Self; 3] = [Self::New, Self::Open, Self::Save];

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Open => "Open",
            Self::Save => "Save",
        }
    }

    /// The letter that, held with Ctrl, triggers this command.
    pub const fn key(self) -> char {
        match self {
            Self::New => 'n',
            Self::Open => 'o',
            Self::Save => 's',
        }
    }
}

/// A key press reduced to what the dispatcher cares about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: Option<char>,
}

impl KeyChord {
    pub const fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            alt: false,
            shift: false,
            key: Some(key),
        }
    }
}

/// Map a key press to a command. `None` means the key belongs to the editor.
pub fn dispatch_key(chord: KeyChord) -> Option<Command> {
    if !chord.ctrl || chord.alt {
        return None;
    }
    let key = chord.key?.to_ascii_lowercase();
    Command::ALL.into_iter().find(|command| command.key() == key)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub command: Command,
    pub accelerator: &'static str,
    pub help: &'static str,
}

impl MenuEntry {
    pub const fn label(&self) -> &'static str {
        self.command.label()
    }
}

/// The File menu, top to bottom.
pub const FILE_MENU: [MenuEntry; 3] = [
    MenuEntry {
        command: Command::New,
        accelerator: "Ctrl+N",
        help: "Create a new Markdown file",
    },
    MenuEntry {
        command: Command::Open,
        accelerator: "Ctrl+O",
        help: "Open a Markdown file",
    },
    MenuEntry {
        command: Command::Save,
        accelerator: "Ctrl+S",
        help: "Save the Markdown file",
    },
];
