// src/telegram/handler.rs
//! Turns one Telegram update into one reply.
//!
//! Plain text and `/emoji <text>` go through the translator; `/sentiment` and
//! `/entities` expose the raw analysis; `/start` and `/help` print usage.
//! Failures are relayed to the chat instead of being dropped.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::{ReplySink, Update};
use crate::error::TranslateError;
use crate::metrics::{record_translation, record_update};
use crate::remote::{DynEntityAnalyzer, DynSentimentAnalyzer};
use crate::translate::EmojiTranslator;

pub const HELP_TEXT: &str = "Send me any text and I will answer with the things it mentions and an emoji for each.\n\
Commands:\n\
/emoji <text> - same as sending plain text\n\
/entities <text> - list the entities found in the text\n\
/sentiment <text> - overall sentiment of the text\n\
/help - this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Emoji(&'a str),
    Entities(&'a str),
    Sentiment(&'a str),
}

impl<'a> Command<'a> {
    /// Plain text is `Emoji`. `/cmd@botname` is accepted; unknown commands fall back to `Help`.
    pub fn parse(text: &'a str) -> Self {
        let trimmed = text.trim_start();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Emoji(text);
        };
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((h, a)) => (h, a.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "emoji" => Command::Emoji(args),
            "entities" => Command::Entities(args),
            "sentiment" => Command::Sentiment(args),
            _ => Command::Help,
        }
    }
}

#[derive(Clone)]
pub struct BotHandler {
    translator: EmojiTranslator,
    entities: DynEntityAnalyzer,
    sentiment: DynSentimentAnalyzer,
    sink: Arc<dyn ReplySink>,
    default_count: usize,
}

impl BotHandler {
    pub fn new(
        translator: EmojiTranslator,
        entities: DynEntityAnalyzer,
        sentiment: DynSentimentAnalyzer,
        sink: Arc<dyn ReplySink>,
        default_count: usize,
    ) -> Self {
        Self {
            translator,
            entities,
            sentiment,
            sink,
            default_count,
        }
    }

    pub fn translator(&self) -> &EmojiTranslator {
        &self.translator
    }

    pub fn default_count(&self) -> usize {
        self.default_count
    }

    /// Handle a single update end to end. Updates without text are ignored.
    pub async fn handle_update(&self, update: &Update) {
        let Some(message) = &update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let chat_id = message.chat.id;

        let id = anon_hash(text);
        info!(
            target: "bot",
            %id,
            chat_id,
            update_id = update.update_id,
            sent_at = ?message.sent_at(),
            "message received"
        );

        let reply = match self.reply_for(text).await {
            Ok(r) => {
                record_update("ok");
                r
            }
            Err(e) => {
                record_update("error");
                warn!(target: "bot", %id, chat_id, stage = e.stage(), error = %e, "message failed");
                format!("Exception occurred:\n{e}")
            }
        };

        if let Err(e) = self.sink.send_message(chat_id, &reply).await {
            warn!(target: "bot", %id, chat_id, error = %e, "reply not delivered");
        }
    }

    /// Reply text for `text`, without sending it anywhere.
    pub async fn reply_for(&self, text: &str) -> Result<String, TranslateError> {
        match Command::parse(text) {
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Emoji(body) => {
                let started = Instant::now();
                let res = self.translator.translate(body, self.default_count).await;
                record_translation(&res, started.elapsed());
                Ok(res?.render())
            }
            Command::Entities(body) => {
                if body.trim().is_empty() {
                    return Err(TranslateError::EmptyInput);
                }
                let all = self.entities.analyze_entities(body).await?;
                Ok(all
                    .iter()
                    .map(|e| format!("Name: {}\n{}\n{}\n", e.name, e.entity_type, e.sentiment))
                    .collect::<Vec<_>>()
                    .join("-----\n"))
            }
            Command::Sentiment(body) => {
                if body.trim().is_empty() {
                    return Err(TranslateError::EmptyInput);
                }
                let s = self.sentiment.analyze_sentiment(body).await?;
                Ok(format!(
                    "Detected language: {}\nSentiment score: {}\nSentiment magnitude: {}\n",
                    s.language, s.score, s.magnitude
                ))
            }
        }
    }
}

/// Short, stable id for a message so logs never carry the raw text.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_emoji() {
        assert_eq!(Command::parse("I love it"), Command::Emoji("I love it"));
    }

    #[test]
    fn commands_with_bot_suffix_and_args() {
        assert_eq!(
            Command::parse("/sentiment@emoji_bot  great day "),
            Command::Sentiment("great day")
        );
        assert_eq!(Command::parse("/ENTITIES Paris"), Command::Entities("Paris"));
        assert_eq!(Command::parse("/emoji"), Command::Emoji(""));
        assert_eq!(Command::parse("/start"), Command::Help);
        assert_eq!(Command::parse("/whatever x"), Command::Help);
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("hello");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("hello"));
        assert_ne!(a, anon_hash("hello!"));
    }
}
