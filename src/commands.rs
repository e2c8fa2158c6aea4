//! Submission types. What an inbound message asks the bot to do.

/// Parsed inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Begin a new report, discarding any session in progress.
    Start,
    /// Abandon the session in progress.
    Cancel,
    Help,
    /// Anything else is fed to the collection flow as-is.
    Input { content: String },
}

/// Parses message content into Submission types.
pub struct SubmissionParser;

impl SubmissionParser {
    /// Parse message content into a Submission.
    ///
    /// Commands may carry a bot mention (`/start@logbook_bot`) as Telegram
    /// sends in group chats.
    pub fn parse(content: &str) -> Submission {
        let trimmed = content.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Submission::Input {
                content: content.to_string(),
            };
        };

        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match name.as_str() {
            "start" | "basla" | "başla" => Submission::Start,
            "cancel" | "iptal" => Submission::Cancel,
            "help" | "yardim" | "yardım" => Submission::Help,
            _ => Submission::Input {
                content: content.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_start_variants() {
        for text in ["/start", "/START", " /start ", "/start@logbook_bot", "/başla"] {
            assert_eq!(SubmissionParser::parse(text), Submission::Start, "{text:?}");
        }
    }

    #[test]
    fn parse_cancel_and_help() {
        assert_eq!(SubmissionParser::parse("/iptal"), Submission::Cancel);
        assert_eq!(SubmissionParser::parse("/cancel"), Submission::Cancel);
        assert_eq!(SubmissionParser::parse("/help"), Submission::Help);
        assert_eq!(SubmissionParser::parse("/yardım"), Submission::Help);
    }

    #[test]
    fn plain_text_is_input_verbatim() {
        assert_eq!(
            SubmissionParser::parse(" 08:30 Kontrol "),
            Submission::Input {
                content: " 08:30 Kontrol ".into()
            }
        );
        assert_eq!(
            SubmissionParser::parse("bitir"),
            Submission::Input {
                content: "bitir".into()
            }
        );
    }

    #[test]
    fn unknown_commands_are_input() {
        assert_eq!(
            SubmissionParser::parse("/weather"),
            Submission::Input {
                content: "/weather".into()
            }
        );
        assert_eq!(
            SubmissionParser::parse("/"),
            Submission::Input { content: "/".into() }
        );
    }

    #[test]
    fn empty_message_is_input() {
        assert_eq!(
            SubmissionParser::parse(""),
            Submission::Input {
                content: String::new()
            }
        );
    }
}
