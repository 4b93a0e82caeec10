//! Operator console abstraction.
//!
//! The admin menu talks to a [`Console`] rather than stdin directly, so the
//! whole menu flow can run against a scripted double in tests. The stdin
//! frontend owns the actual terminal and forwards console lines through a
//! [`ChannelConsole`].

use std::collections::VecDeque;
use std::io;
use tokio::sync::mpsc;

/// Line-oriented operator console.
pub trait Console: Send {
    /// Show `prompt` and read one trimmed line of input.
    async fn prompt(&mut self, prompt: &str) -> io::Result<String>;

    /// Print one line of output.
    fn say(&mut self, text: &str);
}

/// Console fed by the stdin frontend: prompts and output go to stdout,
/// input arrives over a channel. A closed channel answers with empty
/// lines, which every menu path treats as "keep default" or "exit".
pub struct ChannelConsole {
    input: mpsc::Receiver<String>,
}

impl ChannelConsole {
    #[must_use]
    pub fn new(input: mpsc::Receiver<String>) -> Self {
        ChannelConsole { input }
    }
}

impl Console for ChannelConsole {
    async fn prompt(&mut self, prompt: &str) -> io::Result<String> {
        println!("{prompt}");
        Ok(self
            .input
            .recv()
            .await
            .map(|line| line.trim().to_string())
            .unwrap_or_default())
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Scripted console for tests: canned answers in, transcript out.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Everything printed or prompted, in order.
    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Whether any transcript line contains `needle`.
    #[must_use]
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Console for ScriptedConsole {
    async fn prompt(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript.push(prompt.to_string());
        // An exhausted script answers with empty lines, which every menu
        // path treats as "keep default" or "exit".
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn say(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_console_trims_forwarded_lines() {
        let (tx, rx) = mpsc::channel(4);
        let mut console = ChannelConsole::new(rx);
        tx.send(" 1 ".to_string()).await.unwrap();
        assert_eq!(console.prompt("choice:").await.unwrap(), "1");

        // A closed frontend reads as empty lines, which exits every menu.
        drop(tx);
        assert_eq!(console.prompt("choice:").await.unwrap(), "");
    }

    #[tokio::test]
    async fn scripted_console_replays_answers_in_order() {
        let mut console = ScriptedConsole::new(["first", "second"]);
        assert_eq!(console.prompt("a?").await.unwrap(), "first");
        assert_eq!(console.prompt("b?").await.unwrap(), "second");
        assert_eq!(console.prompt("c?").await.unwrap(), "");
        assert!(console.saw("a?"));
    }
}
