use crate::error::{JResult, MusicPlayerError};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a shake gesture is detected.
///
/// Variant names match the values stored under the `shake_action` preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Nothing,
    PlayPause,
    NextSong,
    PreviousSong,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Nothing,
        ActionKind::PlayPause,
        ActionKind::NextSong,
        ActionKind::PreviousSong,
    ];

    /// Stable integer code used across the JNI boundary
    pub fn code(self) -> i32 {
        match self {
            ActionKind::Nothing => 0,
            ActionKind::PlayPause => 1,
            ActionKind::NextSong => 2,
            ActionKind::PreviousSong => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        ActionKind::ALL.into_iter().find(|a| a.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Nothing => "Nothing",
            ActionKind::PlayPause => "PlayPause",
            ActionKind::NextSong => "NextSong",
            ActionKind::PreviousSong => "PreviousSong",
        }
    }

    /// Resolve to the concrete music service command.
    /// `Nothing` resolves to no command at all.
    pub fn resolve(self, is_playing: bool) -> Option<PlaybackCommand> {
        match self {
            ActionKind::Nothing => None,
            ActionKind::PlayPause if is_playing => Some(PlaybackCommand::Pause),
            ActionKind::PlayPause => Some(PlaybackCommand::Play),
            ActionKind::NextSong => Some(PlaybackCommand::Next),
            ActionKind::PreviousSong => Some(PlaybackCommand::Previous),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = MusicPlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| MusicPlayerError::InvalidParameters(format!("Unknown action: {}", s)))
    }
}

/// Command understood by the playback service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Next,
    Previous,
}

impl PlaybackCommand {
    /// Intent action string the music service listens for
    pub fn intent_action(self) -> &'static str {
        match self {
            PlaybackCommand::Play => "com.frontier.musicplayer.action.PLAY",
            PlaybackCommand::Pause => "com.frontier.musicplayer.action.PAUSE",
            PlaybackCommand::Next => "com.frontier.musicplayer.action.NEXT",
            PlaybackCommand::Previous => "com.frontier.musicplayer.action.PREVIOUS",
        }
    }
}

/// Receives actions emitted by the shake detector
pub trait ActionExecutor {
    fn execute(&mut self, action: ActionKind) -> JResult<()>;
}

/// Hands actions to another thread (the playback side) over a channel
pub struct ChannelExecutor {
    tx: Sender<ActionKind>,
    rx: Receiver<ActionKind>,
}

impl ChannelExecutor {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        ChannelExecutor { tx, rx }
    }

    /// Clone of the receiving end for a consumer thread
    pub fn receiver(&self) -> Receiver<ActionKind> {
        self.rx.clone()
    }

    /// Pop the next pending action without blocking
    pub fn try_next(&self) -> JResult<Option<ActionKind>> {
        match self.rx.try_recv() {
            Ok(action) => Ok(Some(action)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(MusicPlayerError::Dispatch("Action channel disconnected".to_string()))
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Default for ChannelExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionExecutor for ChannelExecutor {
    fn execute(&mut self, action: ActionKind) -> JResult<()> {
        self.tx
            .send(action)
            .map_err(|e| MusicPlayerError::Dispatch(e.to_string()))
    }
}
