//! The (state, event) transition table.
//!
//! One async function per dispatch: given the loaded session and the
//! inbound event, perform the backend calls and gateway sends for the
//! matching table row and return the next session. Unmatched pairs return
//! the session unchanged with no effects.
//!
//! Dependencies are passed explicitly; the function holds no state of its
//! own, which keeps every row unit-testable with mock collaborators.

use fishcart_types::chat::{ChatId, ChatSession, ConversationState};
use fishcart_types::error::{CommerceError, DispatchError};
use fishcart_types::event::{CallbackToken, Event, EventKind};

use crate::commerce::CommerceBackend;
use crate::gateway::MessagingGateway;

use super::render;

/// Resolve one event against the transition table.
///
/// `/start` is global: it re-renders the menu from any state. Everything
/// else matches on the current state. Side effects happen inside; the
/// caller persists the returned session only after this succeeds.
pub async fn transition<C, G>(
    session: ChatSession,
    event: &Event,
    backend: &C,
    gateway: &G,
) -> Result<ChatSession, DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    // `/start` wins over any state, same as a command handler would.
    if let EventKind::Text(text) = &event.kind {
        if text.trim() == "/start" {
            send_menu(&session.chat_id, backend, gateway).await?;
            return Ok(session.cleared(ConversationState::Menu));
        }
    }

    match session.state {
        ConversationState::Start => {
            // Only `/start` leaves Start; anything else is unmatched.
            unmatched(&session, event);
            Ok(session)
        }
        ConversationState::Menu => on_menu(session, event, backend, gateway).await,
        ConversationState::ProductDescription => {
            on_description(session, event, backend, gateway).await
        }
        ConversationState::QuantitySelect => on_quantity(session, event, backend, gateway).await,
        ConversationState::Cart => on_cart(session, event, backend, gateway).await,
        ConversationState::AwaitingEmail => on_email(session, event, backend, gateway).await,
    }
}

async fn on_menu<C, G>(
    session: ChatSession,
    event: &Event,
    backend: &C,
    gateway: &G,
) -> Result<ChatSession, DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    match button(event) {
        Some(CallbackToken::Cart) => {
            send_cart(&session.chat_id, backend, gateway).await?;
            Ok(session.with_state(ConversationState::Cart))
        }
        Some(CallbackToken::Number(product_id)) => {
            let (product, image) = backend.get_product(product_id).await?;
            gateway
                .send_photo(
                    &session.chat_id,
                    &image,
                    &product.description,
                    Some(&render::product_keyboard(product_id)),
                )
                .await?;
            // The menu message is stale once the product view is up.
            gateway
                .delete_message(&session.chat_id, event.message_id)
                .await?;
            Ok(session.with_state(ConversationState::ProductDescription))
        }
        _ => {
            unmatched(&session, event);
            Ok(session)
        }
    }
}

async fn on_description<C, G>(
    session: ChatSession,
    event: &Event,
    backend: &C,
    gateway: &G,
) -> Result<ChatSession, DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    match button(event) {
        Some(CallbackToken::Back) => {
            send_menu(&session.chat_id, backend, gateway).await?;
            Ok(session.with_state(ConversationState::Menu))
        }
        Some(CallbackToken::Add(product_id)) => {
            gateway
                .send_message(
                    &session.chat_id,
                    render::QUANTITY_PROMPT,
                    Some(&render::quantity_keyboard()),
                )
                .await?;
            Ok(session.with_pending(ConversationState::QuantitySelect, product_id))
        }
        Some(CallbackToken::Cart) => {
            send_cart(&session.chat_id, backend, gateway).await?;
            Ok(session.with_state(ConversationState::Cart))
        }
        _ => {
            unmatched(&session, event);
            Ok(session)
        }
    }
}

async fn on_quantity<C, G>(
    session: ChatSession,
    event: &Event,
    backend: &C,
    gateway: &G,
) -> Result<ChatSession, DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    match button(event) {
        Some(CallbackToken::Cart) => {
            send_cart(&session.chat_id, backend, gateway).await?;
            Ok(session.with_state(ConversationState::Cart))
        }
        Some(CallbackToken::Menu) => {
            send_menu(&session.chat_id, backend, gateway).await?;
            Ok(session.with_state(ConversationState::Menu))
        }
        Some(CallbackToken::Number(raw)) => {
            let Ok(quantity) = u32::try_from(raw) else {
                unmatched(&session, event);
                return Ok(session);
            };
            let Some(product_id) = session.pending_product else {
                // Context was never stashed (or a stale keyboard was
                // pressed); there is no product to add.
                tracing::debug!(chat_id = %session.chat_id, "quantity pressed with no pending product");
                return Ok(session);
            };
            backend
                .upsert_cart_line(&session.chat_id, product_id, quantity)
                .await?;
            gateway
                .send_message(&session.chat_id, render::ADDED_TEXT, None)
                .await?;
            send_menu(&session.chat_id, backend, gateway).await?;
            Ok(session.cleared(ConversationState::Menu))
        }
        _ => {
            unmatched(&session, event);
            Ok(session)
        }
    }
}

async fn on_cart<C, G>(
    session: ChatSession,
    event: &Event,
    backend: &C,
    gateway: &G,
) -> Result<ChatSession, DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    match button(event) {
        Some(CallbackToken::Menu) => {
            send_menu(&session.chat_id, backend, gateway).await?;
            Ok(session.with_state(ConversationState::Menu))
        }
        Some(CallbackToken::Pay) => {
            gateway
                .send_message(&session.chat_id, render::EMAIL_PROMPT, None)
                .await?;
            Ok(session.with_state(ConversationState::AwaitingEmail))
        }
        Some(CallbackToken::Delete(line_id)) => {
            // An already-deleted line still gets the confirmation + menu:
            // from the user's side the line is gone either way.
            match backend.delete_cart_line(line_id).await {
                Ok(()) | Err(CommerceError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }
            gateway
                .send_message(&session.chat_id, render::LINE_DELETED_TEXT, None)
                .await?;
            send_menu(&session.chat_id, backend, gateway).await?;
            Ok(session.with_state(ConversationState::Menu))
        }
        _ => {
            unmatched(&session, event);
            Ok(session)
        }
    }
}

async fn on_email<C, G>(
    session: ChatSession,
    event: &Event,
    backend: &C,
    gateway: &G,
) -> Result<ChatSession, DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    let EventKind::Text(text) = &event.kind else {
        unmatched(&session, event);
        return Ok(session);
    };

    let stored = backend
        .set_checkout_email(&session.chat_id, text.trim())
        .await?;
    if !stored {
        gateway
            .send_message(&session.chat_id, render::EMAIL_RETRY_TEXT, None)
            .await?;
        return Ok(session);
    }

    let email = backend
        .get_checkout_email(&session.chat_id)
        .await?
        .unwrap_or_else(|| text.trim().to_string());
    gateway
        .send_message(&session.chat_id, &render::email_saved_text(&email), None)
        .await?;
    send_menu(&session.chat_id, backend, gateway).await?;
    Ok(session.with_state(ConversationState::Menu))
}

/// Render and send the catalog menu.
async fn send_menu<C, G>(chat_id: &ChatId, backend: &C, gateway: &G) -> Result<(), DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    let products = backend.list_catalog().await?;
    gateway
        .send_message(
            chat_id,
            render::MENU_TEXT,
            Some(&render::menu_keyboard(&products)),
        )
        .await?;
    Ok(())
}

/// Render and send the cart view.
async fn send_cart<C, G>(chat_id: &ChatId, backend: &C, gateway: &G) -> Result<(), DispatchError>
where
    C: CommerceBackend,
    G: MessagingGateway,
{
    let cart = backend.list_cart(chat_id).await?;
    let (text, keyboard) = render::cart_view(cart.as_ref());
    gateway
        .send_message(chat_id, &text, Some(&keyboard))
        .await?;
    Ok(())
}

fn button(event: &Event) -> Option<CallbackToken> {
    match &event.kind {
        EventKind::ButtonPress(token) => Some(CallbackToken::parse(token)),
        EventKind::Text(_) => None,
    }
}

fn unmatched(session: &ChatSession, event: &Event) {
    tracing::debug!(
        chat_id = %session.chat_id,
        state = %session.state,
        kind = ?event.kind,
        "unmatched event, no transition"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockCommerce, RecordingGateway, Sent};
    use fishcart_types::catalog::CartLine;

    fn chat() -> ChatId {
        ChatId::from(42)
    }

    fn text_event(text: &str) -> Event {
        Event {
            chat_id: chat(),
            message_id: 100,
            kind: EventKind::Text(text.to_string()),
        }
    }

    fn press(token: &str) -> Event {
        Event {
            chat_id: chat(),
            message_id: 100,
            kind: EventKind::ButtonPress(token.to_string()),
        }
    }

    fn session(state: ConversationState) -> ChatSession {
        ChatSession {
            chat_id: chat(),
            state,
            pending_product: None,
        }
    }

    #[tokio::test]
    async fn test_start_renders_catalog_and_moves_to_menu() {
        let backend = MockCommerce::with_products(3);
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::Start),
            &text_event("/start"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::Menu);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        let Sent::Message { text, keyboard } = &sent[0] else {
            panic!("expected a text message");
        };
        assert_eq!(text, render::MENU_TEXT);
        // 3 product rows + cart row.
        assert_eq!(keyboard.as_ref().unwrap().rows.len(), 4);
    }

    #[tokio::test]
    async fn test_start_works_from_any_state() {
        let backend = MockCommerce::with_products(1);
        for state in [
            ConversationState::Cart,
            ConversationState::AwaitingEmail,
            ConversationState::QuantitySelect,
        ] {
            let gateway = RecordingGateway::new();
            let next = transition(session(state), &text_event("/start"), &backend, &gateway)
                .await
                .unwrap();
            assert_eq!(next.state, ConversationState::Menu);
        }
    }

    #[tokio::test]
    async fn test_start_clears_pending_product() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();
        let stale = session(ConversationState::QuantitySelect)
            .with_pending(ConversationState::QuantitySelect, 7);

        let next = transition(stale, &text_event("/start"), &backend, &gateway)
            .await
            .unwrap();
        assert!(next.pending_product.is_none());
    }

    #[tokio::test]
    async fn test_random_text_in_start_is_noop() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::Start),
            &text_event("hello"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::Start);
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_menu_product_press_shows_description_and_deletes_menu() {
        let backend = MockCommerce::with_products(3);
        let gateway = RecordingGateway::new();

        let next = transition(session(ConversationState::Menu), &press("7"), &backend, &gateway)
            .await
            .unwrap();

        assert_eq!(next.state, ConversationState::ProductDescription);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 2);
        let Sent::Photo { caption, keyboard } = &sent[0] else {
            panic!("expected a photo");
        };
        assert!(caption.contains("product 7"));
        let tokens: Vec<String> = keyboard
            .as_ref()
            .unwrap()
            .rows
            .iter()
            .flatten()
            .map(|b| b.token.clone())
            .collect();
        assert_eq!(tokens, vec!["back", "add:7", "cart"]);
        assert_eq!(sent[1], Sent::Deleted { message_id: 100 });
    }

    #[tokio::test]
    async fn test_menu_cart_press_shows_cart() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::Menu),
            &press("cart"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::Cart);
        let sent = gateway.sent();
        let Sent::Message { text, .. } = &sent[0] else {
            panic!("expected a text message");
        };
        assert_eq!(text, render::EMPTY_CART_TEXT);
    }

    #[tokio::test]
    async fn test_add_press_stashes_product_and_offers_quantities() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::ProductDescription),
            &press("add:7"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::QuantitySelect);
        assert_eq!(next.pending_product, Some(7));
        let sent = gateway.sent();
        let Sent::Message { text, keyboard } = &sent[0] else {
            panic!("expected a text message");
        };
        assert_eq!(text, render::QUANTITY_PROMPT);
        assert_eq!(keyboard.as_ref().unwrap().rows.len(), 4);
    }

    #[tokio::test]
    async fn test_quantity_press_upserts_once_and_returns_to_menu() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();
        let staged = session(ConversationState::QuantitySelect)
            .with_pending(ConversationState::QuantitySelect, 7);

        let next = transition(staged, &press("5"), &backend, &gateway)
            .await
            .unwrap();

        assert_eq!(next.state, ConversationState::Menu);
        assert!(next.pending_product.is_none());
        assert_eq!(backend.upsert_calls(), vec![(chat(), 7, 5)]);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 2);
        let Sent::Message { text, .. } = &sent[0] else {
            panic!("expected a text message");
        };
        assert_eq!(text, render::ADDED_TEXT);
        let Sent::Message { text, .. } = &sent[1] else {
            panic!("expected the menu");
        };
        assert_eq!(text, render::MENU_TEXT);
    }

    #[tokio::test]
    async fn test_quantity_without_pending_product_is_noop() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::QuantitySelect),
            &press("5"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::QuantitySelect);
        assert!(backend.upsert_calls().is_empty());
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_negative_quantity_is_noop() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();
        let staged = session(ConversationState::QuantitySelect)
            .with_pending(ConversationState::QuantitySelect, 7);

        let next = transition(staged.clone(), &press("-5"), &backend, &gateway)
            .await
            .unwrap();

        assert_eq!(next, staged);
        assert!(backend.upsert_calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_line_still_renders_menu() {
        let backend = MockCommerce::with_products(1);
        backend.fail_delete_with_not_found();
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::Cart),
            &press("del:31"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::Menu);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 2);
        let Sent::Message { text, .. } = &sent[1] else {
            panic!("expected the menu");
        };
        assert_eq!(text, render::MENU_TEXT);
    }

    #[tokio::test]
    async fn test_delete_line_confirms_and_renders_menu() {
        let backend = MockCommerce::with_products(1);
        backend.put_cart_line(
            &chat(),
            CartLine {
                id: 31,
                product_title: "Cod".to_string(),
                quantity: 5,
            },
        );
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::Cart),
            &press("del:31"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::Menu);
        assert_eq!(backend.deleted_lines(), vec![31]);
    }

    #[tokio::test]
    async fn test_pay_prompts_for_email() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::Cart),
            &press("pay"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::AwaitingEmail);
        let sent = gateway.sent();
        let Sent::Message { text, keyboard } = &sent[0] else {
            panic!("expected a text message");
        };
        assert_eq!(text, render::EMAIL_PROMPT);
        assert!(keyboard.is_none());
    }

    #[tokio::test]
    async fn test_email_without_cart_prompts_retry_and_stays() {
        // No cart exists for the chat: set_checkout_email reports failure.
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::AwaitingEmail),
            &text_event("user@example.com"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::AwaitingEmail);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        let Sent::Message { text, .. } = &sent[0] else {
            panic!("expected a text message");
        };
        assert_eq!(text, render::EMAIL_RETRY_TEXT);
    }

    #[tokio::test]
    async fn test_email_success_confirms_and_returns_to_menu() {
        let backend = MockCommerce::with_products(1);
        backend.put_cart_line(
            &chat(),
            CartLine {
                id: 31,
                product_title: "Cod".to_string(),
                quantity: 5,
            },
        );
        let gateway = RecordingGateway::new();

        let next = transition(
            session(ConversationState::AwaitingEmail),
            &text_event("user@example.com"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::Menu);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 2);
        let Sent::Message { text, .. } = &sent[0] else {
            panic!("expected a text message");
        };
        assert_eq!(text, &render::email_saved_text("user@example.com"));
    }

    #[tokio::test]
    async fn test_unmatched_pair_is_noop() {
        let backend = MockCommerce::with_products(1);
        let gateway = RecordingGateway::new();

        // Free text in Cart has no transition.
        let next = transition(
            session(ConversationState::Cart),
            &text_event("what do I do"),
            &backend,
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(next.state, ConversationState::Cart);
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = MockCommerce::with_products(1);
        backend.fail_catalog();
        let gateway = RecordingGateway::new();

        let result = transition(
            session(ConversationState::Start),
            &text_event("/start"),
            &backend,
            &gateway,
        )
        .await;

        assert!(matches!(result, Err(DispatchError::Commerce(_))));
    }
}
