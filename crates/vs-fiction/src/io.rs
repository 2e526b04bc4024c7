//! Console input and output.
//!
//! The menu engine reads from an [`Input`] and writes to an [`Output`]; the
//! runtime presents lines through a [`Presenter`]. [`StdConsole`] wires all
//! three to the terminal, and [`ScriptedInput`] with [`Transcript`] replay a
//! fixed session for tests and non-interactive runs.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use vs_core::Speaker;

/// A source of player input lines.
pub trait Input {
    /// Read one line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// A sink for menu text.
pub trait Output {
    /// Write one line.
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// A dialogue line ready to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedLine<'a> {
    /// Who says it.
    pub speaker: Speaker,
    /// What they say.
    pub text: &'a str,
    /// 1-based source line.
    pub line: usize,
    /// Whether the next line follows without waiting.
    pub interrupt: bool,
}

impl PresentedLine<'_> {
    /// Plain rendering: narrators speak bare text, others are prefixed.
    pub fn plain(&self) -> String {
        if self.speaker.is_narrator() {
            self.text.to_string()
        } else {
            format!("{}: {}", display_name(self.speaker), self.text)
        }
    }
}

/// A speaker name as shown to players.
pub fn display_name(speaker: Speaker) -> String {
    match speaker {
        Speaker::Narrator(_) => "The Narrator".to_string(),
        Speaker::Princess => "The Princess".to_string(),
        Speaker::Player => "You".to_string(),
        Speaker::Voice(persona) => {
            let name = persona.name();
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => format!("Voice of the {}{}", first.to_uppercase(), chars.as_str()),
                None => String::new(),
            }
        }
    }
}

/// Where the runtime sends lines and timing events.
pub trait Presenter {
    /// Show one dialogue line.
    fn present(&mut self, line: &PresentedLine<'_>) -> io::Result<()>;

    /// Block until the player acknowledges the last line.
    fn acknowledge(&mut self) -> io::Result<()>;

    /// Wait for a fixed duration.
    fn pause(&mut self, duration: Duration) -> io::Result<()>;

    /// A new music track starts.
    fn now_playing(&mut self, track: &str) -> io::Result<()>;
}

/// Standard input and output.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    /// Create a console on stdin/stdout.
    pub fn new() -> Self {
        Self
    }
}

impl Input for StdConsole {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut out = io::stdout().lock();
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

impl Output for StdConsole {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{line}")
    }
}

impl Presenter for StdConsole {
    fn present(&mut self, line: &PresentedLine<'_>) -> io::Result<()> {
        self.write_line(&line.plain())
    }

    fn acknowledge(&mut self) -> io::Result<()> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> io::Result<()> {
        std::thread::sleep(duration);
        Ok(())
    }

    fn now_playing(&mut self, track: &str) -> io::Result<()> {
        self.write_line(&format!("~ Now playing: {track} ~"))
    }
}

/// Input replayed from a fixed list of lines.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    /// Replay these lines, then report end of input.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Lines not yet read.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl Input for ScriptedInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// A recorded event in a [`Transcript`].
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// Menu text or a rebuff.
    Text(String),
    /// A presented dialogue line.
    Line {
        /// Who spoke.
        speaker: Speaker,
        /// What they said.
        text: String,
        /// 1-based source line.
        line: usize,
    },
    /// The player acknowledged a line.
    Acknowledge,
    /// A pause.
    Pause(Duration),
    /// A track started.
    NowPlaying(String),
}

/// Records everything written and presented, without blocking.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    events: Vec<TranscriptEvent>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded event in order.
    pub fn events(&self) -> &[TranscriptEvent] {
        &self.events
    }

    /// The text of every presented dialogue line.
    pub fn spoken(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TranscriptEvent::Line { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every line written through [`Output`].
    pub fn written(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TranscriptEvent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of acknowledgements requested.
    pub fn acknowledgements(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TranscriptEvent::Acknowledge))
            .count()
    }

    /// Forget everything recorded.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Output for Transcript {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.events.push(TranscriptEvent::Text(line.to_string()));
        Ok(())
    }
}

impl Presenter for Transcript {
    fn present(&mut self, line: &PresentedLine<'_>) -> io::Result<()> {
        self.events.push(TranscriptEvent::Line {
            speaker: line.speaker,
            text: line.text.to_string(),
            line: line.line,
        });
        Ok(())
    }

    fn acknowledge(&mut self) -> io::Result<()> {
        self.events.push(TranscriptEvent::Acknowledge);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> io::Result<()> {
        self.events.push(TranscriptEvent::Pause(duration));
        Ok(())
    }

    fn now_playing(&mut self, track: &str) -> io::Result<()> {
        self.events.push(TranscriptEvent::NowPlaying(track.to_string()));
        Ok(())
    }
}
