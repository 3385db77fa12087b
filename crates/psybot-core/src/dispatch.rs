//! Event dispatcher: classify → authorize → execute → respond.
//!
//! Authorization is read once, from the command's declared role, before any handler
//! runs. Audio submissions are gated the same way. Handlers return an [`Outcome`]; the
//! response is assembled afterwards so the menu reflects any auth change the handler made.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    admin::AdminCache,
    commands::{self, CommandDescriptor, CommandId, ParsedCommand, Role},
    content::{self, DeleteTrackOutcome, UNKNOWN_TAG},
    domain::{AdminRecord, NewTrack, Sender},
    formatting::escape_html,
    menu::menu_for,
    messaging::{
        port::MessagingPort,
        types::{AudioAttachment, EventMeta, InboundEvent},
    },
    ports::{AffirmationStore, TrackStore},
    response::{
        assemble, deliver, Outcome, OutboundResponse, AFFIRMATION_PREFIX, GET_AFFIRMATION_BUTTON,
        GET_MUSIC_BUTTON,
    },
    Result,
};

/// Fixed user-facing replies.
pub mod replies {
    pub const ADMIN_ONLY: &str = "This command is only available to administrators";
    pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /start for instructions";
    pub const HELP_REDIRECT: &str = "Use the /start command to see instructions";
    pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

    pub const ALREADY_ADMIN: &str = "You are already an administrator";
    pub const AUTH_USAGE: &str = "To log in, use the command in the format: /auth &lt;password&gt;";
    pub const WRONG_PASSWORD: &str = "Wrong password";
    pub const AUTH_OK: &str = "You are now logged in as administrator";
    pub const LOGOUT_OK: &str = "You have left administrator mode";

    pub const ADD_USAGE: &str = "Please provide the affirmation text after the /add command";
    pub const ADD_OK: &str = "Affirmation added";
    pub const AFFIRMATIONS_EMPTY: &str = "The affirmation list is empty";
    pub const NO_AFFIRMATIONS: &str = "Sorry, there are no affirmations available right now";

    pub const DELETE_TRACK_USAGE: &str = "Please provide the track id after the /deletetrack command";
    pub const BAD_TRACK_ID: &str = "Invalid id format";
    pub const TRACK_DELETED: &str = "Track deleted";
    pub const TRACKS_EMPTY: &str = "The music track list is empty";
    pub const NO_TRACKS: &str = "No music tracks available";
    pub const TRACK_ADDED: &str = "Music track added";
}

pub struct Dispatcher {
    admins: Arc<AdminCache>,
    affirmations: Arc<dyn AffirmationStore>,
    tracks: Arc<dyn TrackStore>,
    admin_password: String,
}

impl Dispatcher {
    pub fn new(
        admins: Arc<AdminCache>,
        affirmations: Arc<dyn AffirmationStore>,
        tracks: Arc<dyn TrackStore>,
        admin_password: String,
    ) -> Self {
        Self {
            admins,
            affirmations,
            tracks,
            admin_password,
        }
    }

    pub fn admins(&self) -> &AdminCache {
        &self.admins
    }

    /// Process one event end to end and deliver whatever it produced.
    pub async fn handle(&self, messenger: &dyn MessagingPort, event: InboundEvent) {
        if let Some(response) = self.dispatch(&event).await {
            deliver(messenger, &response).await;
        }
    }

    /// Compute the response for one event without sending anything.
    pub async fn dispatch(&self, event: &InboundEvent) -> Option<OutboundResponse> {
        let meta = event.meta();
        info!(
            chat_id = meta.chat_id.0,
            user_id = meta.sender.id.0,
            kind = event.kind(),
            "inbound event"
        );

        let outcome = match event {
            InboundEvent::Ignore { .. } => Outcome::Silent,
            InboundEvent::Command { meta, text } => self.on_command(meta, text).await,
            InboundEvent::Audio { meta, audio } => self.on_audio(meta, audio).await,
            InboundEvent::Text { text, .. } => self.on_text(text).await,
        };

        let outcome = match outcome {
            Outcome::Silent => return None,
            other => other,
        };

        let menu = menu_for(&self.admins, meta.sender.id).await;
        debug!(user_id = meta.sender.id.0, menu = ?menu_names(menu), "menu projected");
        assemble(meta.chat_id, outcome, menu)
    }

    async fn on_command(&self, meta: &EventMeta, text: &str) -> Outcome {
        let Some(parsed) = commands::resolve(text) else {
            return Outcome::reply(replies::UNKNOWN_COMMAND);
        };

        if !self.authorized(parsed.descriptor.role, &meta.sender).await {
            warn!(
                user_id = meta.sender.id.0,
                command = parsed.descriptor.name,
                "admin command denied"
            );
            return Outcome::reply(replies::ADMIN_ONLY);
        }

        let name = parsed.descriptor.name;
        self.execute(&meta.sender, parsed)
            .await
            .unwrap_or_else(|e| failure(name, e))
    }

    async fn authorized(&self, role: Role, sender: &Sender) -> bool {
        match role {
            Role::Public => true,
            Role::Admin => self.admins.is_admin(sender.id).await,
        }
    }

    async fn execute(&self, sender: &Sender, cmd: ParsedCommand) -> Result<Outcome> {
        let args = cmd.args.as_str();
        match cmd.descriptor.id {
            CommandId::Start => Ok(self.start(sender).await),
            CommandId::Auth => self.auth(sender, args).await,
            CommandId::Logout => {
                self.admins.demote(sender.id).await?;
                info!(user_id = sender.id.0, "admin logged out");
                Ok(Outcome::reply(replies::LOGOUT_OK))
            }
            CommandId::Add => self.add_affirmation(sender, args).await,
            CommandId::List => self.list_affirmations().await,
            CommandId::DeleteAll => {
                let n = self.affirmations.delete_all().await?;
                info!(user_id = sender.id.0, count = n, "affirmations deleted");
                Ok(Outcome::reply(format!("Deleted {n} affirmations")))
            }
            CommandId::DeleteTrack => self.delete_track(args).await,
            CommandId::ListTracks => self.list_tracks().await,
        }
    }

    async fn start(&self, sender: &Sender) -> Outcome {
        let mut help = String::new();
        help.push_str("👋 Hi! I share affirmations and music tracks.\n\n");
        help.push_str(&format!(
            "🔍 Tap \"{GET_AFFIRMATION_BUTTON}\" on the keyboard to get a random affirmation.\n\n"
        ));
        help.push_str(&format!(
            "🎵 Tap \"{GET_MUSIC_BUTTON}\" on the keyboard to get a random music track.\n\n"
        ));

        if self.admins.is_admin(sender.id).await {
            help.push_str("👑 You are an administrator. Available commands:\n");
            help.push_str(&command_help(&[
                (commands::ADD, Some("text"), "add a new affirmation"),
                (commands::LIST, None, "list all affirmations"),
                (commands::DELETE_ALL, None, "delete all affirmations"),
                (commands::LIST_TRACKS, None, "list all music tracks"),
                (commands::DELETE_TRACK, Some("id"), "delete a music track"),
                (commands::LOGOUT, None, "leave administrator mode"),
            ]));
            help.push_str("\nSend an audio file to add it to the music collection.\n");
        } else {
            help.push_str("🔐 If you are an administrator, use:\n");
            help.push_str(&command_help(&[(
                commands::AUTH,
                Some("password"),
                "log in as administrator",
            )]));
        }

        Outcome::Reply(help)
    }

    async fn auth(&self, sender: &Sender, args: &str) -> Result<Outcome> {
        if self.admins.is_admin(sender.id).await {
            return Ok(Outcome::reply(replies::ALREADY_ADMIN));
        }

        if args.split_whitespace().count() != 1 {
            return Ok(Outcome::reply(replies::AUTH_USAGE));
        }

        if args != self.admin_password {
            warn!(user_id = sender.id.0, "wrong admin password");
            return Ok(Outcome::reply(replies::WRONG_PASSWORD));
        }

        let saved = self.admins.promote(AdminRecord::from_sender(sender)).await?;
        info!(
            user_id = saved.telegram_id.0,
            record_id = saved.id,
            "admin logged in"
        );
        Ok(Outcome::reply(replies::AUTH_OK))
    }

    async fn add_affirmation(&self, sender: &Sender, text: &str) -> Result<Outcome> {
        if text.is_empty() {
            return Ok(Outcome::reply(replies::ADD_USAGE));
        }

        let saved = self
            .affirmations
            .add(text, sender.id, sender.username.as_deref())
            .await?;
        info!(user_id = sender.id.0, affirmation_id = saved.id, "affirmation added");
        Ok(Outcome::reply(replies::ADD_OK))
    }

    async fn list_affirmations(&self) -> Result<Outcome> {
        let items = self.affirmations.list_ordered_by_creation().await?;
        if items.is_empty() {
            return Ok(Outcome::reply(replies::AFFIRMATIONS_EMPTY));
        }

        let mut out = String::from("📝 All affirmations:\n\n");
        for (idx, a) in items.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", idx + 1, escape_html(&a.text)));
            out.push_str(&format!(
                "   <i>Added by @{}</i>\n\n",
                escape_html(a.author_username.as_deref().unwrap_or("unknown"))
            ));
        }
        Ok(Outcome::Reply(out))
    }

    async fn delete_track(&self, raw_id: &str) -> Result<Outcome> {
        if raw_id.is_empty() {
            return Ok(Outcome::reply(replies::DELETE_TRACK_USAGE));
        }

        let text = match content::delete_track(self.tracks.as_ref(), raw_id).await? {
            DeleteTrackOutcome::BadFormat => replies::BAD_TRACK_ID.to_string(),
            DeleteTrackOutcome::NotFound => {
                format!("No track found with id={}", escape_html(raw_id))
            }
            DeleteTrackOutcome::Deleted => replies::TRACK_DELETED.to_string(),
        };
        Ok(Outcome::Reply(text))
    }

    async fn list_tracks(&self) -> Result<Outcome> {
        let tracks = self.tracks.list_all().await?;
        if tracks.is_empty() {
            return Ok(Outcome::reply(replies::TRACKS_EMPTY));
        }

        let mut out = String::from("🎵 All music tracks:\n\n");
        for t in &tracks {
            out.push_str(&format!(
                "ID: {}, Artist: {}, Title: {}, Added by: @{}\n",
                t.id,
                escape_html(&t.artist),
                escape_html(&t.title),
                escape_html(t.author_username.as_deref().unwrap_or("unknown")),
            ));
        }
        Ok(Outcome::Reply(out))
    }

    async fn on_audio(&self, meta: &EventMeta, audio: &AudioAttachment) -> Outcome {
        // Non-admins get no hint that audio submissions exist.
        if !self.authorized(Role::Admin, &meta.sender).await {
            return Outcome::Silent;
        }

        let track = NewTrack {
            file_id: audio.file_id.clone(),
            author_id: meta.sender.id,
            author_username: meta.sender.username.clone(),
            artist: audio
                .performer
                .clone()
                .unwrap_or_else(|| UNKNOWN_TAG.to_string()),
            title: audio.title.clone().unwrap_or_else(|| UNKNOWN_TAG.to_string()),
        };

        match self.tracks.add(track).await {
            Ok(saved) => {
                info!(user_id = meta.sender.id.0, track_id = saved.id, "track added");
                Outcome::reply(replies::TRACK_ADDED)
            }
            Err(e) => failure("audio", e),
        }
    }

    async fn on_text(&self, text: &str) -> Outcome {
        let result = match text {
            GET_AFFIRMATION_BUTTON => self.random_affirmation().await,
            GET_MUSIC_BUTTON => self.random_track().await,
            _ => Ok(Outcome::reply(replies::HELP_REDIRECT)),
        };
        result.unwrap_or_else(|e| failure("button", e))
    }

    async fn random_affirmation(&self) -> Result<Outcome> {
        Ok(match self.affirmations.random().await? {
            Some(a) => Outcome::Reply(format!("{AFFIRMATION_PREFIX} {}", escape_html(&a.text))),
            None => Outcome::reply(replies::NO_AFFIRMATIONS),
        })
    }

    async fn random_track(&self) -> Result<Outcome> {
        Ok(match self.tracks.random().await? {
            Some(t) => Outcome::Audio(t.file_id),
            None => Outcome::reply(replies::NO_TRACKS),
        })
    }
}

fn failure(action: &str, e: crate::Error) -> Outcome {
    error!(action, "handler failed: {e}");
    Outcome::reply(replies::GENERIC_FAILURE)
}

fn command_help(entries: &[(&str, Option<&str>, &str)]) -> String {
    entries
        .iter()
        .map(|(name, arg, what)| match arg {
            Some(arg) => format!("• {name} &lt;{arg}&gt; - {what}\n"),
            None => format!("• {name} - {what}\n"),
        })
        .collect()
}

/// Command names of `menu`, in order.
pub fn menu_names(menu: &[CommandDescriptor]) -> Vec<&'static str> {
    menu.iter().map(|c| c.name).collect()
}
