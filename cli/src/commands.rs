//! Subcommand bodies. Item commands check for a session before any request
//! and print the refreshed list after every change.

use anyhow::{Context, Result};
use catalog_core::{
    ApiError, Credentials, Item, ItemPayload, SessionContext, SessionStore, Transport,
};
use tracing::debug;

pub fn register<S: SessionStore, T: Transport>(
    ctx: &SessionContext<S, T>,
    email: String,
    password: String,
) -> Result<()> {
    ctx.register(&Credentials::new(email, password))?;
    println!("Registration successful! Please login.");
    Ok(())
}

pub fn login<S: SessionStore, T: Transport>(
    ctx: &SessionContext<S, T>,
    email: String,
    password: String,
) -> Result<()> {
    let credentials = Credentials::new(email, password);
    ctx.login(&credentials)?;
    println!("Logged in as {}.", credentials.email);
    Ok(())
}

pub fn list<S: SessionStore, T: Transport>(ctx: &SessionContext<S, T>) -> Result<()> {
    ctx.require_session()?;
    refresh(ctx)
}

pub fn add<S: SessionStore, T: Transport>(
    ctx: &SessionContext<S, T>,
    name: String,
    description: String,
) -> Result<()> {
    ctx.require_session()?;
    let item = ctx.create_item(&ItemPayload::new(name, description))?;
    debug!(id = item.id, "created item");
    refresh(ctx)
}

pub fn update<S: SessionStore, T: Transport>(
    ctx: &SessionContext<S, T>,
    id: i64,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    ctx.require_session()?;
    let payload = match (name, description) {
        (Some(name), Some(description)) => ItemPayload::new(name, description),
        (name, description) => {
            let current = ctx
                .get_item(id)
                .with_context(|| format!("unable to load item {id}"))?;
            ItemPayload {
                name: name.unwrap_or(current.name),
                description: description.or(current.description),
            }
        }
    };
    ctx.update_item(id, &payload)?;
    refresh(ctx)
}

pub fn delete<S: SessionStore, T: Transport>(ctx: &SessionContext<S, T>, id: i64) -> Result<()> {
    ctx.require_session()?;
    ctx.delete_item(id)?;
    refresh(ctx)
}

fn refresh<S: SessionStore, T: Transport>(ctx: &SessionContext<S, T>) -> Result<()> {
    let items = ctx.list_items()?;
    print!("{}", render_items(&items));
    Ok(())
}

pub fn render_items(items: &[Item]) -> String {
    if items.is_empty() {
        return "No items yet.\n".to_string();
    }
    items
        .iter()
        .map(|item| {
            let description = item
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("-");
            format!("{}\t{}\t{}\n", item.id, item.name, description)
        })
        .collect()
}

/// Text shown for a failed command. A rejected or missing session points the
/// user back to `login`; the stored token is already gone at this point.
pub fn describe_error(err: &anyhow::Error) -> String {
    let unauthorized = err
        .chain()
        .any(|cause| cause.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized));
    if unauthorized {
        "Unauthorized. Please login with `catalog login`.".to_string()
    } else {
        format!("error: {err:#}")
    }
}
