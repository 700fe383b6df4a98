//! Closed set of things the bot can answer with.

use std::fmt;

/// Symbolic classification of an inbound update.
///
/// Every variant has exactly one reply in [`crate::catalog`]; the `match` there
/// is exhaustive, so adding a variant without a reply does not compile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// `/start`: full welcome with the main menu.
    Start,
    /// Bot added to a chat or started by a user.
    Welcome,
    ShowContacts,
    ShowPayment,
    ShowHelp,
    ShowTariffs,
    MeterReading,
    GasLeak,
    BackToMenu,
    /// Callback payload that is not in the payload table.
    Unknown,
    /// Free text that matched no command or keyword.
    GreetingFallback,
}

impl Intent {
    pub const ALL: [Intent; 11] = [
        Intent::Start,
        Intent::Welcome,
        Intent::ShowContacts,
        Intent::ShowPayment,
        Intent::ShowHelp,
        Intent::ShowTariffs,
        Intent::MeterReading,
        Intent::GasLeak,
        Intent::BackToMenu,
        Intent::Unknown,
        Intent::GreetingFallback,
    ];

    /// Stable key, also used as the callback payload of buttons that lead here.
    pub fn key(self) -> &'static str {
        match self {
            Intent::Start => "start",
            Intent::Welcome => "welcome",
            Intent::ShowContacts => "show_contacts",
            Intent::ShowPayment => "show_payment",
            Intent::ShowHelp => "show_help",
            Intent::ShowTariffs => "show_tariffs",
            Intent::MeterReading => "meter_reading",
            Intent::GasLeak => "gas_leak",
            Intent::BackToMenu => "back_to_menu",
            Intent::Unknown => "unknown",
            Intent::GreetingFallback => "greeting_fallback",
        }
    }

    /// Look up a callback payload.
    ///
    /// Accepts the canonical key of every button-reachable intent plus the
    /// short aliases older keyboards used. `unknown`, `welcome` and
    /// `greeting_fallback` are not reachable from a button.
    pub fn from_payload(payload: &str) -> Option<Intent> {
        let intent = match payload.trim() {
            "start" | "menu" => Intent::Start,
            "show_contacts" | "contacts" => Intent::ShowContacts,
            "show_payment" | "pay" | "payment" => Intent::ShowPayment,
            "show_help" | "help" => Intent::ShowHelp,
            "show_tariffs" | "tariffs" => Intent::ShowTariffs,
            "meter_reading" => Intent::MeterReading,
            "gas_leak" => Intent::GasLeak,
            "back_to_menu" => Intent::BackToMenu,
            _ => return None,
        };
        Some(intent)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
