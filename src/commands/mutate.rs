//! Mutating command handlers: add, update, remove.

use serde_json::Value;

use crate::document::KeyPath;
use crate::error::Result;
use crate::session::SecretSession;

/// Handle the add command - insert a key that must not exist yet
pub async fn handle_add(session: &SecretSession, key: &KeyPath, value: Value) -> Result<()> {
    session.add_key(key, value).await?;
    println!("secret '{}' updated", session.secret());
    Ok(())
}

/// Handle the update command - replace the value of an existing key
pub async fn handle_update(session: &SecretSession, key: &KeyPath, value: Value) -> Result<()> {
    session.update_key(key, value).await?;
    println!("secret '{}' updated", session.secret());
    Ok(())
}

/// Handle the remove command - delete an existing key
pub async fn handle_remove(session: &SecretSession, key: &KeyPath) -> Result<()> {
    session.remove_key(key).await?;
    println!("secret '{}' updated", session.secret());
    Ok(())
}
