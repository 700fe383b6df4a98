//! Update classification.
//!
//! Text is matched against one ordered rule list; the first rule whose
//! predicate holds decides the intent. Keyword rules overlap on purpose
//! ("где оплатить тариф" contains two keywords), so the order of
//! [`TEXT_RULES`] is the precedence contract.

use crate::{
    intent::Intent,
    update::{Update, UpdateKind},
};

/// One classification rule: a pure predicate over normalized text.
pub struct TextRule {
    pub name: &'static str,
    pub intent: Intent,
    matches: fn(&str) -> bool,
}

impl TextRule {
    pub fn matches(&self, normalized: &str) -> bool {
        (self.matches)(normalized)
    }
}

pub const TEXT_RULES: &[TextRule] = &[
    // Exact commands.
    TextRule {
        name: "cmd:/start",
        intent: Intent::Start,
        matches: |t| t == "/start",
    },
    TextRule {
        name: "cmd:/contacts",
        intent: Intent::ShowContacts,
        matches: |t| t == "/contacts",
    },
    TextRule {
        name: "cmd:/pay",
        intent: Intent::ShowPayment,
        matches: |t| t == "/pay",
    },
    TextRule {
        name: "cmd:/help",
        intent: Intent::ShowHelp,
        matches: |t| t == "/help",
    },
    TextRule {
        name: "cmd:/tariffs",
        intent: Intent::ShowTariffs,
        matches: |t| t == "/tariffs",
    },
    // Keywords.
    TextRule {
        name: "kw:контакт",
        intent: Intent::ShowContacts,
        matches: |t| t.contains("контакт"),
    },
    TextRule {
        name: "kw:оплат",
        intent: Intent::ShowPayment,
        matches: |t| t.contains("оплат"),
    },
    TextRule {
        name: "kw:тариф",
        intent: Intent::ShowTariffs,
        matches: |t| t.contains("тариф"),
    },
    TextRule {
        name: "kw:показани|счетчик",
        intent: Intent::MeterReading,
        matches: |t| t.contains("показани") || t.contains("счетчик"),
    },
    TextRule {
        name: "kw:утечк|запах|104",
        intent: Intent::GasLeak,
        matches: |t| t.contains("утечк") || t.contains("запах") || t == "104",
    },
];

/// Trim, lowercase, and fold `ё` into `е` so "счётчик" matches "счетчик".
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace('ё', "е")
}

/// Classify free text. Never fails: unmatched text is a greeting fallback.
pub fn classify_text(text: &str) -> Intent {
    let normalized = normalize(text);
    TEXT_RULES
        .iter()
        .find(|rule| rule.matches(&normalized))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::GreetingFallback)
}

/// Classify a callback payload; anything outside the payload table is `Unknown`.
pub fn classify_payload(payload: &str) -> Intent {
    Intent::from_payload(payload).unwrap_or(Intent::Unknown)
}

/// Classify an update.
///
/// Returns `None` only for [`UpdateKind::BotRemoved`]: the bot can no longer
/// post into that chat, so there is nothing to answer.
pub fn classify(update: &Update) -> Option<Intent> {
    match update.kind {
        UpdateKind::Callback => Some(classify_payload(
            update.callback_payload.as_deref().unwrap_or_default(),
        )),
        UpdateKind::MessageCreated => {
            Some(classify_text(update.text.as_deref().unwrap_or_default()))
        }
        UpdateKind::BotAdded | UpdateKind::BotStarted => Some(Intent::Welcome),
        UpdateKind::BotRemoved => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatId;

    fn event(kind: UpdateKind) -> Update {
        Update {
            kind,
            chat_id: ChatId(1),
            user_id: None,
            user_name: None,
            text: None,
            callback_id: None,
            callback_payload: None,
        }
    }

    #[test]
    fn commands_ignore_case_and_surrounding_whitespace() {
        let cases = [
            ("/start", Intent::Start),
            ("/contacts", Intent::ShowContacts),
            ("/pay", Intent::ShowPayment),
            ("/help", Intent::ShowHelp),
            ("/tariffs", Intent::ShowTariffs),
        ];
        for (cmd, expected) in cases {
            for variant in [
                cmd.to_string(),
                cmd.to_uppercase(),
                format!("  {cmd}\n"),
                format!("\t{}  ", cmd.to_uppercase()),
            ] {
                assert_eq!(classify_text(&variant), expected, "{variant:?}");
            }
        }
    }

    #[test]
    fn command_must_be_exact() {
        assert_eq!(classify_text("/start now"), Intent::GreetingFallback);
        assert_eq!(classify_text("/payment"), Intent::GreetingFallback);
    }

    #[test]
    fn keywords() {
        assert_eq!(classify_text("Где оплатить?"), Intent::ShowPayment);
        assert_eq!(classify_text("Дайте КОНТАКТЫ"), Intent::ShowContacts);
        assert_eq!(classify_text("какие тарифы"), Intent::ShowTariffs);
        assert_eq!(classify_text("передать показания"), Intent::MeterReading);
        assert_eq!(classify_text("Сломался счётчик"), Intent::MeterReading);
        assert_eq!(classify_text("утечка на кухне"), Intent::GasLeak);
        assert_eq!(classify_text("Чувствую ЗАПАХ газа"), Intent::GasLeak);
        assert_eq!(classify_text(" 104 "), Intent::GasLeak);
        assert_eq!(classify_text("1040"), Intent::GreetingFallback);
    }

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(classify_text("оплата по тарифу"), Intent::ShowPayment);
        assert_eq!(classify_text("контакты для оплаты"), Intent::ShowContacts);
        assert_eq!(classify_text("тариф и показания"), Intent::ShowTariffs);
        assert_eq!(
            classify_text("запах газа, где контакты аварийной службы"),
            Intent::ShowContacts
        );
    }

    #[test]
    fn unmatched_text_falls_back() {
        for text in ["привет", "", "   ", "hello /start"] {
            assert_eq!(classify_text(text), Intent::GreetingFallback, "{text:?}");
        }
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<_> = TEXT_RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TEXT_RULES.len());
    }

    #[test]
    fn update_kinds() {
        let mut cb = event(UpdateKind::Callback);
        cb.callback_payload = Some("show_contacts".to_string());
        assert_eq!(classify(&cb), Some(Intent::ShowContacts));

        cb.callback_payload = Some("definitely_not_a_payload".to_string());
        assert_eq!(classify(&cb), Some(Intent::Unknown));

        let mut msg = event(UpdateKind::MessageCreated);
        msg.text = Some("/HELP".to_string());
        assert_eq!(classify(&msg), Some(Intent::ShowHelp));

        // Chat events never look at text.
        let mut added = event(UpdateKind::BotAdded);
        added.text = Some("/pay".to_string());
        assert_eq!(classify(&added), Some(Intent::Welcome));
        assert_eq!(classify(&event(UpdateKind::BotStarted)), Some(Intent::Welcome));
        assert_eq!(classify(&event(UpdateKind::BotRemoved)), None);
    }
}
