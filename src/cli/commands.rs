use serde_json::Value;

use crate::app::{AppContext, Result, ShortlineError};
use crate::cli::{AdminAction, AdminResource};
use crate::domain::{Credentials, FeedFilter, Registration, Resource};
use crate::router::{self, Navigation};
use crate::store::ListStore;

/// Run the route guard for a command. Returns an error describing the redirect.
pub async fn check_route(ctx: &AppContext, route_name: &str) -> Result<()> {
    let route = router::find(route_name)
        .ok_or_else(|| ShortlineError::Other(format!("Unknown route: {}", route_name)))?;

    match router::guard(&ctx.session, route).await {
        Navigation::Proceed => Ok(()),
        Navigation::Redirect(router::LOGIN_PATH) => Err(ShortlineError::Other(
            "You need to log in first (shortline login)".into(),
        )),
        Navigation::Redirect(router::SIGNED_IN_PATH) => Err(ShortlineError::Other(
            "Already logged in (shortline logout to switch accounts)".into(),
        )),
        Navigation::Redirect(path) => Err(ShortlineError::Other(format!(
            "Not allowed here, redirected to {}",
            path
        ))),
    }
}

fn failure(message: Option<String>, fallback: &str) -> ShortlineError {
    ShortlineError::Other(message.unwrap_or_else(|| fallback.to_string()))
}

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let credentials = Credentials {
        email: email.to_string(),
        password: password.to_string(),
    };
    if !ctx.session.login(&credentials).await {
        return Err(failure(ctx.session.error(), "Login failed"));
    }
    if let Some(user) = ctx.session.user() {
        println!("Logged in as {}", user.name);
    }
    Ok(())
}

pub async fn register(ctx: &AppContext, name: &str, email: &str, password: &str) -> Result<()> {
    let details = Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        password_confirmation: password.to_string(),
    };
    if !ctx.session.register(&details).await {
        return Err(failure(ctx.session.error(), "Registration failed"));
    }
    println!("Registered and logged in as {}", name);
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.logout().await;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    ctx.session.fetch_current_user().await;
    match ctx.session.user() {
        Some(user) => {
            let role = user.role.as_deref().unwrap_or("user");
            match &user.email {
                Some(email) => println!("{} <{}> ({})", user.name, email, role),
                None => println!("{} ({})", user.name, role),
            }
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

pub async fn feed(
    ctx: &AppContext,
    hashtag: Option<String>,
    channel: Option<String>,
    pages: usize,
) -> Result<()> {
    let filter = FeedFilter {
        hashtag,
        channel_id: channel,
    };

    ctx.feed.fetch(filter.clone(), true).await;
    for _ in 1..pages {
        if !ctx.feed.has_more() {
            break;
        }
        ctx.feed.fetch(filter.clone(), false).await;
    }

    let state = ctx.feed.snapshot();
    if let Some(error) = state.error {
        return Err(ShortlineError::Other(error));
    }
    if state.items.is_empty() {
        println!("No shorts");
        return Ok(());
    }

    for short in &state.items {
        let star = if short.is_favorited { "*" } else { " " };
        let channel = short.channel_title.as_deref().unwrap_or("");
        let subscribed = short
            .channel_id
            .as_deref()
            .is_some_and(|id| ctx.subscriptions.is_subscribed(id));
        println!(
            "{} {}  {}{}  {}",
            star,
            short.display_title(),
            channel,
            if subscribed { " [subscribed]" } else { "" },
            short.watch_url()
        );
    }
    if state.cursor.has_more() {
        println!("(more available, use --pages to load further)");
    }
    Ok(())
}

pub async fn favorite(ctx: &AppContext, video_id: &str) -> Result<()> {
    if !ctx.feed.toggle_favorite(video_id).await {
        return Err(failure(ctx.feed.snapshot().error, "Failed to update favorite"));
    }
    println!("Toggled favorite for {}", video_id);
    Ok(())
}

pub async fn subscriptions(ctx: &AppContext) -> Result<()> {
    let state = ctx.subscriptions.snapshot();
    if let Some(error) = state.error {
        return Err(ShortlineError::Other(error));
    }
    if state.channel_ids.is_empty() {
        println!("No subscriptions");
    }
    for id in state.channel_ids {
        println!("{}", id);
    }
    Ok(())
}

pub async fn subscribe(ctx: &AppContext, channel_id: &str) -> Result<()> {
    if !ctx.subscriptions.toggle(channel_id).await {
        return Err(failure(
            ctx.subscriptions.snapshot().error,
            "Failed to update subscription",
        ));
    }
    if ctx.subscriptions.is_subscribed(channel_id) {
        println!("Subscribed to {}", channel_id);
    } else {
        println!("Unsubscribed from {}", channel_id);
    }
    Ok(())
}

/// Print one page of a list store, after applying search and page.
pub async fn list<R, F>(
    store: &ListStore<R>,
    search: Option<String>,
    page: u32,
    describe: F,
) -> Result<()>
where
    R: Resource,
    F: Fn(&R) -> String,
{
    match search {
        Some(query) => store.set_search(query).await,
        None => store.fetch(true).await,
    }
    if R::PAGINATED && page > 1 {
        store.set_page(page).await;
    }

    let state = store.snapshot();
    if let Some(error) = state.error {
        return Err(ShortlineError::Other(error));
    }
    if state.items.is_empty() {
        println!("No {}", R::NAME);
        return Ok(());
    }
    for record in &state.items {
        println!("{:>5}  {}", record.id(), describe(record));
    }
    if R::PAGINATED {
        println!("Page {} of {}", state.current_page, state.total_pages);
    }
    Ok(())
}

pub async fn admin(ctx: &AppContext, resource: AdminResource, action: AdminAction) -> Result<()> {
    let ok = match (resource, action) {
        (AdminResource::Shorts, AdminAction::Create { json }) => {
            ctx.feed.create(&parse_payload(&json)?).await
        }
        (AdminResource::Shorts, AdminAction::Update { .. }) => {
            return Err(ShortlineError::Other(
                "Shorts cannot be edited, delete and re-create instead".into(),
            ));
        }
        (AdminResource::Shorts, AdminAction::Delete { id }) => ctx.feed.delete(id).await,
        (AdminResource::Categories, action) => write(&ctx.categories, action).await?,
        (AdminResource::Channels, action) => write(&ctx.channels, action).await?,
        (AdminResource::Hashtags, action) => write(&ctx.hashtags, action).await?,
    };

    if !ok {
        let error = match resource {
            AdminResource::Shorts => ctx.feed.snapshot().error,
            AdminResource::Categories => ctx.categories.error(),
            AdminResource::Channels => ctx.channels.error(),
            AdminResource::Hashtags => ctx.hashtags.error(),
        };
        return Err(failure(error, "Request failed"));
    }
    println!("Done");
    Ok(())
}

async fn write<R: Resource>(store: &ListStore<R>, action: AdminAction) -> Result<bool> {
    Ok(match action {
        AdminAction::Create { json } => store.create(&parse_payload(&json)?).await,
        AdminAction::Update { id, json } => store.update(id, &parse_payload(&json)?).await,
        AdminAction::Delete { id } => store.delete(id).await,
    })
}

fn parse_payload(json: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ShortlineError::Other("Payload must be a JSON object".into()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::config::Config;
    use crate::session::MemoryTokenStorage;

    fn context(token: Option<&str>) -> (Arc<MockTransport>, AppContext) {
        let transport = Arc::new(MockTransport::new());
        let storage = match token {
            Some(token) => MemoryTokenStorage::with_token(token),
            None => MemoryTokenStorage::new(),
        };
        let ctx =
            AppContext::with_parts(Config::default(), transport.clone(), Arc::new(storage))
                .unwrap();
        (transport, ctx)
    }

    #[test]
    fn test_parse_payload_requires_object() {
        assert!(parse_payload(r#"{"name":"x"}"#).is_ok());
        assert!(matches!(
            parse_payload("[1,2]"),
            Err(ShortlineError::Other(_))
        ));
        assert!(matches!(
            parse_payload("{oops"),
            Err(ShortlineError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_check_route_requires_login() {
        let (_, ctx) = context(None);
        let err = check_route(&ctx, "favorites").await.unwrap_err();
        assert!(err.to_string().contains("log in"));
        assert!(check_route(&ctx, "home").await.is_ok());
    }

    #[tokio::test]
    async fn test_check_route_rejects_non_admin() {
        let (transport, ctx) = context(Some("tok"));
        transport.push_data(json!({ "id": 1, "name": "Bo", "role": "user" }));

        let err = check_route(&ctx, "admin-hashtags").await.unwrap_err();
        assert!(err.to_string().contains("redirected to /"));
    }

    #[tokio::test]
    async fn test_admin_write_reports_server_message() {
        let (transport, ctx) = context(Some("tok"));
        transport.push_err(422, Some("The name field is required."));

        let err = admin(
            &ctx,
            AdminResource::Channels,
            AdminAction::Create { json: "{}".into() },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "The name field is required.");
    }

    #[tokio::test]
    async fn test_admin_delete_category() {
        let (transport, ctx) = context(Some("tok"));
        transport.push_ok(crate::api::Envelope::default());

        admin(&ctx, AdminResource::Categories, AdminAction::Delete { id: 9 })
            .await
            .unwrap();
        assert_eq!(transport.last_request().unwrap().path, "/admin/categories/9");
    }
}
