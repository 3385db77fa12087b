//! Static command table: name → {description, required role}.

/// Access level required to run a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Public,
    Admin,
}

/// Every command the bot understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandId {
    Start,
    Auth,
    Logout,
    Add,
    List,
    DeleteAll,
    DeleteTrack,
    ListTracks,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub id: CommandId,
    /// Full command token including the leading `/`.
    pub name: &'static str,
    pub description: &'static str,
    pub role: Role,
}

impl CommandDescriptor {
    /// Command name without the leading marker, as the Telegram menu expects it.
    pub fn bare_name(&self) -> &'static str {
        self.name.trim_start_matches(COMMAND_MARKER)
    }
}

pub const COMMAND_MARKER: char = '/';

pub const START: &str = "/start";
pub const AUTH: &str = "/auth";
pub const LOGOUT: &str = "/logout";
pub const ADD: &str = "/add";
pub const LIST: &str = "/list";
pub const DELETE_ALL: &str = "/delete";
pub const DELETE_TRACK: &str = "/deletetrack";
pub const LIST_TRACKS: &str = "/listtracks";

const START_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::Start,
    name: START,
    description: "Start the bot and show instructions",
    role: Role::Public,
};

const AUTH_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::Auth,
    name: AUTH,
    description: "Log in as administrator",
    role: Role::Public,
};

const LOGOUT_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::Logout,
    name: LOGOUT,
    description: "Leave administrator mode",
    role: Role::Admin,
};

const ADD_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::Add,
    name: ADD,
    description: "Add a new affirmation",
    role: Role::Admin,
};

const LIST_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::List,
    name: LIST,
    description: "List all affirmations",
    role: Role::Admin,
};

const DELETE_ALL_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::DeleteAll,
    name: DELETE_ALL,
    description: "Delete all affirmations",
    role: Role::Admin,
};

const DELETE_TRACK_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::DeleteTrack,
    name: DELETE_TRACK,
    description: "Delete a music track",
    role: Role::Admin,
};

const LIST_TRACKS_CMD: CommandDescriptor = CommandDescriptor {
    id: CommandId::ListTracks,
    name: LIST_TRACKS,
    description: "List all music tracks",
    role: Role::Admin,
};

static DEFAULT_COMMANDS: [CommandDescriptor; 2] = [START_CMD, AUTH_CMD];

static ADMIN_COMMANDS: [CommandDescriptor; 8] = [
    START_CMD,
    AUTH_CMD,
    LOGOUT_CMD,
    ADD_CMD,
    LIST_CMD,
    DELETE_ALL_CMD,
    DELETE_TRACK_CMD,
    LIST_TRACKS_CMD,
];

/// Menu for regular users, in presentation order.
pub fn default_commands() -> &'static [CommandDescriptor] {
    &DEFAULT_COMMANDS
}

/// Menu for administrators, in presentation order.
///
/// Every public command appears here too, in the same relative order.
pub fn admin_commands() -> &'static [CommandDescriptor] {
    &ADMIN_COMMANDS
}

fn all_commands() -> impl Iterator<Item = &'static CommandDescriptor> {
    ADMIN_COMMANDS.iter()
}

pub fn role_required(descriptor: &CommandDescriptor) -> Role {
    descriptor.role
}

/// A resolved command plus its trimmed argument text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub descriptor: &'static CommandDescriptor,
    pub args: String,
}

/// Split `text` into its leading token and the trimmed remainder.
///
/// Telegram may send `/cmd@botname arg1 ...`; the `@botname` part is dropped here. Use
/// [`addressed_to`] to reject commands meant for another bot.
pub fn split_command(text: &str) -> (&str, &str) {
    let (first, rest) = leading_token(text);
    let token = first.split('@').next().unwrap_or("");
    (token, rest)
}

/// Whether the command in `text` is meant for the bot named `bot_username`.
///
/// A command without an `@botname` suffix is addressed to every bot in the chat.
/// Telegram usernames are case-insensitive.
pub fn addressed_to(text: &str, bot_username: &str) -> bool {
    let (first, _) = leading_token(text);
    match first.split_once('@') {
        None => true,
        Some((_, target)) => target.eq_ignore_ascii_case(bot_username.trim_start_matches('@')),
    }
}

fn leading_token(text: &str) -> (&str, &str) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();
    (first, rest)
}

/// Match the leading token of `text` case-sensitively against the known commands.
pub fn resolve(text: &str) -> Option<ParsedCommand> {
    let (token, rest) = split_command(text);
    all_commands()
        .find(|c| c.name == token)
        .map(|descriptor| ParsedCommand {
            descriptor,
            args: rest.to_string(),
        })
}
