//! Line commands typed at the prompt.
//!
//! Anything not starting with `/` is sent to the open room as text.

pub mod messaging;
pub mod rooms;

use std::sync::MutexGuard;

use murmur_shared::RoomId;
use murmur_store::Database;

use crate::error::{ClientError, Result};
use crate::state::AppState;

pub const HELP: &str = "\
/rooms                   list rooms
/new <name>              create a room
/delete <n|id>           delete a room and its history
/open <n|id>             open a room
/leave                   close the open room
/older                   load the previous page
/image <ref> [caption]   send an image
/copy [n]                print the n-th newest message as plain text
/status                  show the window state
/help                    show this help
/quit                    exit
<text>                   send a message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rooms,
    Create(String),
    Delete(String),
    Open(String),
    Leave,
    Older,
    Image {
        reference: String,
        caption: Option<String>,
    },
    Copy(usize),
    Status,
    Help,
    Quit,
    Say(String),
    Unknown(String),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Say(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let cmd = match (name, arg) {
        ("rooms", _) => Command::Rooms,
        ("new", name) if !name.is_empty() => Command::Create(name.to_string()),
        ("delete", target) if !target.is_empty() => Command::Delete(target.to_string()),
        ("open", target) if !target.is_empty() => Command::Open(target.to_string()),
        ("leave", _) => Command::Leave,
        ("older", _) => Command::Older,
        ("image", arg) if !arg.is_empty() => {
            let (reference, caption) = match arg.split_once(char::is_whitespace) {
                Some((r, c)) => (r, Some(c.trim().to_string())),
                None => (arg, None),
            };
            Command::Image {
                reference: reference.to_string(),
                caption,
            }
        }
        ("copy", "") => Command::Copy(1),
        ("copy", n) => match n.parse() {
            Ok(n) if n > 0 => Command::Copy(n),
            _ => Command::Unknown(line.to_string()),
        },
        ("status", _) => Command::Status,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(cmd)
}

/// Run a command, printing its output. `Quit` is handled by the caller.
pub async fn dispatch(state: &mut AppState, cmd: Command) -> Result<()> {
    match cmd {
        Command::Rooms => {
            let rooms = rooms::list_rooms(state)?;
            if rooms.is_empty() {
                println!("no rooms yet, create one with /new <name>");
            }
            for (i, room) in rooms.iter().enumerate() {
                println!("{:>3}. {}  ({})", i + 1, room.name, room.id);
            }
        }
        Command::Create(name) => {
            let room = rooms::create_room(state, &name)?;
            println!("created {} ({})", room.name, room.id);
        }
        Command::Delete(target) => {
            let id = resolve_room(state, &target)?;
            if rooms::delete_room(state, id).await? {
                println!("deleted {id}");
            } else {
                println!("no such room");
            }
        }
        Command::Open(target) => {
            let id = resolve_room(state, &target)?;
            messaging::open_room(state, id).await?;
        }
        Command::Leave => state.close_active().await,
        Command::Older => messaging::load_older(state).await?,
        Command::Image { reference, caption } => {
            messaging::send_image(state, &reference, caption.as_deref()).await?
        }
        Command::Copy(n) => println!("{}", messaging::copy_message(state, n).await?),
        Command::Status => {
            let s = messaging::status(state).await?;
            println!(
                "{}: {} of {} messages, page {}/{}{}{}",
                s.room.name,
                s.window.len(),
                s.total_len,
                s.page_count,
                s.total_pages,
                if s.loading_older { ", loading older" } else { "" },
                if s.composing { ", assistant typing" } else { "" },
            );
        }
        Command::Help => println!("{HELP}"),
        Command::Say(text) => messaging::send_text(state, &text).await?,
        Command::Unknown(line) => println!("unknown command: {line} (try /help)"),
        Command::Quit => {}
    }
    Ok(())
}

/// Accept either a 1-based index into `/rooms` or a room id.
pub fn resolve_room(state: &AppState, target: &str) -> Result<RoomId> {
    if let Ok(n) = target.parse::<usize>() {
        let rooms = rooms::list_rooms(state)?;
        return n
            .checked_sub(1)
            .and_then(|i| rooms.get(i))
            .map(|r| r.id)
            .ok_or(ClientError::UnknownRoomIndex(n));
    }
    Ok(RoomId::parse(target)?)
}

pub(crate) fn lock_db(state: &AppState) -> Result<MutexGuard<'_, Database>> {
    state
        .database
        .lock()
        .map_err(|_| ClientError::LockPoisoned("database"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_sent() {
        assert_eq!(parse("  hi there "), Some(Command::Say("hi there".into())));
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(parse("/new  Lobby  "), Some(Command::Create("Lobby".into())));
        assert_eq!(parse("/open 2"), Some(Command::Open("2".into())));
        assert_eq!(
            parse("/image cat.png look at this"),
            Some(Command::Image {
                reference: "cat.png".into(),
                caption: Some("look at this".into()),
            })
        );
        assert_eq!(
            parse("/image cat.png"),
            Some(Command::Image {
                reference: "cat.png".into(),
                caption: None,
            })
        );
        assert_eq!(parse("/copy"), Some(Command::Copy(1)));
        assert_eq!(parse("/copy 3"), Some(Command::Copy(3)));
        assert_eq!(parse("/exit"), Some(Command::Quit));
    }

    #[test]
    fn missing_or_bad_arguments_are_unknown() {
        assert_eq!(parse("/new"), Some(Command::Unknown("/new".into())));
        assert_eq!(parse("/copy 0"), Some(Command::Unknown("/copy 0".into())));
        assert_eq!(parse("/dance"), Some(Command::Unknown("/dance".into())));
    }
}
