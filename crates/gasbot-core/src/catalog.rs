//! Static reply catalog: intent -> text + keyboard.
//!
//! `render` is pure. User-supplied text is interpolated verbatim; replies
//! that echo it are sent as plain text so markup in the input stays inert.

use crate::{
    intent::Intent,
    messaging::types::{FormatMode, InlineButton, InlineKeyboard, Reply},
};

pub const COMPANY_NAME: &str = "ООО \"Газпром межрегионгаз Самара\"";
pub const SITE_URL: &str = "https://samararegiongaz.ru/";
pub const PAYMENT_URL: &str = "https://samararegiongaz.ru/consumer/online/";
pub const PHONE: &str = "8 846 212-32-12";
pub const HOTLINE: &str = "8 800 201-04-04";
pub const EMERGENCY_PHONE: &str = "104";

/// Placeholder used when the sender's name is not known.
pub const DEFAULT_USER_NAME: &str = "друг";

/// Per-update values some replies interpolate.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderContext<'a> {
    pub user_name: Option<&'a str>,
    /// Message text for the greeting fallback, raw payload for `Unknown`.
    pub original_text: Option<&'a str>,
}

pub fn render(intent: Intent, ctx: &RenderContext<'_>) -> Reply {
    match intent {
        Intent::Start => markdown(
            format!(
                "👋 Добро пожаловать в бот {COMPANY_NAME}!\n\n\
                 Мы предоставляем услуги по поставке газа в Самарской области.\n\n\
                 🛠️ **Выберите нужный раздел:**\n\n\
                 📞 Контакты - контактная информация\n\
                 💳 Оплатить - оплата услуг онлайн\n\
                 📊 Тарифы - цены на газ\n\
                 🔢 Показания - передача показаний счетчика\n\
                 🚨 Запах газа - что делать при утечке\n\
                 🆘 Помощь - справка по использованию"
            ),
            main_menu(),
        ),
        Intent::Welcome => markdown(
            format!(
                "👋 Привет! Я бот {COMPANY_NAME}.\n\n\
                 Используйте /start для начала работы или выберите раздел ниже."
            ),
            main_menu(),
        ),
        Intent::ShowContacts => markdown(
            format!(
                "📞 **Контактная информация:**\n\n\
                 • Телефон: {PHONE}\n\
                 • Горячая линия: {HOTLINE}\n\
                 • Адрес: ул. Ново-Садовая, 307А, Самара\n\
                 • Email: srg@samgas.ru\n\n\
                 ⏰ **Режим работы:**\n\
                 Пн-Чт: 8:30-17:30\n\
                 Пт: 8:30-16:15\n\
                 Обед: 13:00-13:45"
            ),
            InlineKeyboard::new(vec![vec![back_to_menu("🔙 Назад в меню")]]),
        ),
        Intent::ShowPayment => markdown(
            format!(
                "💳 **Оплата за газ:**\n\n\
                 Для оплаты услуг перейдите по ссылке:\n\
                 {PAYMENT_URL}\n\n\
                 📱 **Мобильные приложения:**\n\
                 • Сбербанк Онлайн\n\
                 • Тинькофф\n\
                 • Госуслуги\n\n\
                 🏛️ **Терминалы оплаты:**\n\
                 • Отделения банков\n\
                 • Почта России\n\
                 • Платежные терминалы"
            ),
            InlineKeyboard::new(vec![
                vec![
                    InlineButton::link("💳 Оплатить онлайн", PAYMENT_URL),
                    contacts_button(),
                ],
                vec![back_to_menu("🔙 Назад")],
            ]),
        ),
        Intent::ShowHelp => markdown(
            "📱 **Помощь по использованию бота:**\n\n\
             **Доступные команды:**\n\
             /start - Главное меню\n\
             /contacts - Контактная информация\n\
             /pay - Оплата услуг\n\
             /tariffs - Тарифы на газ\n\
             /help - Эта справка\n\n\
             Можно просто написать вопрос: «оплата», «контакты», «показания», \
             «запах газа».\n\n\
             Также вы можете использовать кнопки ниже:"
                .to_string(),
            InlineKeyboard::new(vec![
                vec![contacts_button(), pay_link()],
                vec![back_to_menu("🔙 Назад в меню")],
            ]),
        ),
        Intent::ShowTariffs => markdown(
            format!(
                "📊 **Тарифы на газ:**\n\n\
                 Розничные цены на газ для населения Самарской области \
                 устанавливаются региональным регулятором.\n\n\
                 Актуальные тарифы опубликованы на сайте компании:\n\
                 {SITE_URL}\n\n\
                 По вопросам начислений звоните на горячую линию: {HOTLINE}"
            ),
            InlineKeyboard::new(vec![
                vec![InlineButton::link("🌐 Сайт компании", SITE_URL)],
                vec![back_to_menu("🔙 Назад в меню")],
            ]),
        ),
        Intent::MeterReading => markdown(
            format!(
                "🔢 **Передача показаний счетчика:**\n\n\
                 • Онлайн в личном кабинете: {PAYMENT_URL}\n\
                 • По телефону горячей линии: {HOTLINE}\n\
                 • Лично в абонентском отделе\n\n\
                 ℹ️ Указывайте номер лицевого счета и показания без дробной части."
            ),
            InlineKeyboard::new(vec![
                vec![InlineButton::link("👤 Личный кабинет", PAYMENT_URL)],
                vec![contacts_button(), back_to_menu("🔙 Назад")],
            ]),
        ),
        Intent::GasLeak => markdown(
            format!(
                "🚨 **Почувствовали запах газа?**\n\n\
                 1. Перекройте газовый кран.\n\
                 2. Не включайте и не выключайте свет и электроприборы.\n\
                 3. Не пользуйтесь открытым огнем.\n\
                 4. Откройте окна и двери.\n\
                 5. Покиньте помещение и предупредите соседей.\n\n\
                 📞 **Аварийная газовая служба: {EMERGENCY_PHONE}**\n\
                 📱 С мобильного: {EMERGENCY_PHONE} или 112"
            ),
            InlineKeyboard::new(vec![vec![back_to_menu("🔙 Назад в меню")]]),
        ),
        Intent::BackToMenu => markdown(
            "🏠 **Главное меню**\n\nВыберите раздел:".to_string(),
            main_menu(),
        ),
        Intent::Unknown => {
            let text = match ctx.original_text.map(str::trim).filter(|s| !s.is_empty()) {
                Some(payload) => format!("Неизвестная команда: {payload}"),
                None => "Неизвестная команда".to_string(),
            };
            plain(
                text,
                InlineKeyboard::new(vec![vec![back_to_menu("🏠 В меню")]]),
            )
        }
        Intent::GreetingFallback => {
            let name = ctx
                .user_name
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_USER_NAME);
            let original = ctx.original_text.unwrap_or_default();
            plain(
                format!(
                    "👋 Привет, {name}!\n\n\
                     Вы написали: \"{original}\"\n\n\
                     Для получения информации используйте:\n\
                     • /start - главное меню\n\
                     • /contacts - контакты\n\
                     • /pay - оплата\n\
                     • /tariffs - тарифы\n\
                     • /help - помощь\n\n\
                     Или выберите нужный раздел ниже:"
                ),
                InlineKeyboard::new(vec![
                    vec![contacts_button(), pay_link()],
                    vec![InlineButton::callback("🆘 Помощь", Intent::ShowHelp)],
                ]),
            )
        }
    }
}

fn markdown(text: String, keyboard: InlineKeyboard) -> Reply {
    Reply {
        text,
        keyboard,
        format: FormatMode::Markdown,
    }
}

fn plain(text: String, keyboard: InlineKeyboard) -> Reply {
    Reply {
        text,
        keyboard,
        format: FormatMode::Plain,
    }
}

fn main_menu() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![contacts_button(), pay_link()],
        vec![
            InlineButton::callback("📊 Тарифы", Intent::ShowTariffs),
            InlineButton::callback("🔢 Показания", Intent::MeterReading),
        ],
        vec![
            InlineButton::callback("🚨 Запах газа", Intent::GasLeak),
            InlineButton::callback("🆘 Помощь", Intent::ShowHelp),
        ],
    ])
}

fn contacts_button() -> InlineButton {
    InlineButton::callback("📞 Контакты", Intent::ShowContacts)
}

fn pay_link() -> InlineButton {
    InlineButton::link("💳 Оплатить", PAYMENT_URL)
}

fn back_to_menu(label: &str) -> InlineButton {
    InlineButton::callback(label, Intent::BackToMenu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{messaging::types::ButtonAction, router};

    fn ctx() -> RenderContext<'static> {
        RenderContext::default()
    }

    #[test]
    fn keyboards_only_point_at_routable_intents_or_static_links() {
        for intent in Intent::ALL {
            let reply = render(intent, &ctx());
            for button in reply.keyboard.buttons() {
                match &button.action {
                    ButtonAction::Callback(target) => {
                        // What the router would make of the payload we emit.
                        assert_eq!(
                            router::classify_payload(target.key()),
                            *target,
                            "{intent}: button {:?} is not routable",
                            button.label
                        );
                        assert_ne!(*target, Intent::Unknown);
                    }
                    ButtonAction::Link(url) => {
                        assert!(url.starts_with("https://"), "{intent}: {url}");
                    }
                }
                assert!(!button.label.trim().is_empty());
            }
        }
    }

    #[test]
    fn every_intent_renders_text() {
        for intent in Intent::ALL {
            assert!(!render(intent, &ctx()).text.trim().is_empty(), "{intent}");
        }
    }

    #[test]
    fn render_is_deterministic() {
        let c = RenderContext {
            user_name: Some("Ольга"),
            original_text: Some("когда приедет мастер?"),
        };
        for intent in Intent::ALL {
            assert_eq!(render(intent, &c), render(intent, &c), "{intent}");
        }
    }

    #[test]
    fn start_opens_with_welcome_and_contacts_first() {
        let reply = render(router::classify_text("/start"), &ctx());
        assert!(reply.text.starts_with("👋 Добро пожаловать"));
        let first_row = &reply.keyboard.rows[0];
        assert!(first_row.iter().any(|b| b.label.contains("Контакты")
            && b.action == ButtonAction::Callback(Intent::ShowContacts)));
        assert_eq!(Intent::ShowContacts.key(), "show_contacts");
    }

    #[test]
    fn contacts_callback_has_phone_and_single_back_button() {
        let reply = render(router::classify_payload("show_contacts"), &ctx());
        assert!(reply.text.contains("8 846 212-32-12"));
        let buttons: Vec<_> = reply.keyboard.buttons().collect();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].action, ButtonAction::Callback(Intent::BackToMenu));
        assert_eq!(Intent::BackToMenu.key(), "back_to_menu");
    }

    #[test]
    fn payment_keyword_renders_payment_url() {
        let intent = router::classify_text("Где оплатить?");
        assert_eq!(intent, Intent::ShowPayment);
        assert!(render(intent, &ctx()).text.contains(PAYMENT_URL));
    }

    #[test]
    fn fallback_embeds_text_verbatim() {
        for original in ["привет", "**не жирный** _текст_", "a \"quoted\" <b>x</b>", ""] {
            let reply = render(
                Intent::GreetingFallback,
                &RenderContext {
                    user_name: Some("Иван"),
                    original_text: Some(original),
                },
            );
            assert!(reply.text.contains(&format!("Вы написали: \"{original}\"")));
            assert!(reply.text.starts_with("👋 Привет, Иван!"));
            assert_eq!(reply.format, FormatMode::Plain);
        }
    }

    #[test]
    fn fallback_without_name_uses_placeholder() {
        let reply = render(Intent::GreetingFallback, &ctx());
        assert!(reply.text.starts_with(&format!("👋 Привет, {DEFAULT_USER_NAME}!")));
    }

    #[test]
    fn unknown_names_the_payload() {
        let reply = render(
            Intent::Unknown,
            &RenderContext {
                user_name: None,
                original_text: Some("mystery"),
            },
        );
        assert_eq!(reply.text, "Неизвестная команда: mystery");
        assert_eq!(reply.keyboard.rows.len(), 1);
    }

    #[test]
    fn gas_leak_mentions_emergency_number() {
        let reply = render(router::classify_text("104"), &ctx());
        assert!(reply.text.contains("Аварийная газовая служба: 104"));
    }
}
