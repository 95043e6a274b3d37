//! Read-only command handlers: read, show, describe.

use crate::document::KeyPath;
use crate::error::Result;
use crate::session::SecretSession;

/// Handle the read command - print one value, unquoted
pub async fn handle_read(session: &SecretSession, key: &KeyPath) -> Result<()> {
    let value = session.read_key(key).await?;
    println!("{}", value);
    Ok(())
}

/// Handle the show command - print the raw document
pub async fn handle_show(session: &SecretSession) -> Result<()> {
    let raw = session.show().await?;
    println!("{}", raw);
    Ok(())
}

/// Handle the describe command - print metadata as JSON
pub async fn handle_describe(session: &SecretSession) -> Result<()> {
    let metadata = session.describe().await?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
