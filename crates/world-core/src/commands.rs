//! Chat-command handlers and the name-to-handler registry the host
//! dispatches through.
//!
//! Argument parsing, permissions, and surfacing handler errors back to the
//! invoking player belong to the dispatch framework outside this core; a
//! handler signals failure by returning a descriptive error and otherwise
//! reports through the player's message channel.

use std::collections::BTreeMap;
use std::fmt;

use contracts::{Item, INVENTORY_SIZE};
use serde_json::Value;

use crate::actor::Actor;

/// Hard cap on a single give request.
pub const MAX_GIVE_AMOUNT: u64 = 2_000_000_000;

// ---------------------------------------------------------------------------
// Invocation surface
// ---------------------------------------------------------------------------

/// Named arguments of a structured command invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    values: BTreeMap<String, Value>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn integer(&self, name: &str) -> Option<u64> {
        self.values.get(name).and_then(Value::as_u64)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    AmountTooLarge,
    ItemNotFound(u64),
    MissingArgument(&'static str),
    NotAPlayer,
    UnknownCommand(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::AmountTooLarge => write!(f, "Unable to give more than 2,000,000,000."),
            CommandError::ItemNotFound(item_id) => write!(f, "Item ID {item_id} not found!"),
            CommandError::MissingArgument(name) => write!(f, "missing argument: {name}"),
            CommandError::NotAPlayer => write!(f, "command requires a player actor"),
            CommandError::UnknownCommand(name) => write!(f, "unknown command: {name}"),
        }
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Spawns items into the invoking player's inventory.
///
/// Validation failures (over-cap amount, unknown item id) are raised before
/// any inventory mutation. Capacity is not an error: non-stackable gives
/// place as many units as fit and the chat message reports the placed count.
pub fn give_item_command(player: &mut Actor, args: &CommandArgs) -> Result<(), CommandError> {
    if player.player_data().is_none() {
        return Err(CommandError::NotAPlayer);
    }

    if player.inventory().first_open_slot().is_none() {
        player.send_message("You don't have enough free space to do that.");
        return Ok(());
    }

    let raw_item_id = args
        .integer("item_id")
        .ok_or(CommandError::MissingArgument("item_id"))?;
    let amount = args.integer("amount").unwrap_or(1);

    if amount > MAX_GIVE_AMOUNT {
        return Err(CommandError::AmountTooLarge);
    }

    let catalog = player.item_catalog();
    let definition = u32::try_from(raw_item_id)
        .ok()
        .and_then(|item_id| catalog.lookup(item_id))
        .ok_or(CommandError::ItemNotFound(raw_item_id))?;

    let actual_amount = if definition.stackable {
        player.give_item(Item::new(definition.item_id, amount as u32));
        amount
    } else {
        let capped = amount.min(INVENTORY_SIZE as u64);
        let mut placed = 0;
        for _ in 0..capped {
            if !player.give_item(Item::single(definition.item_id)) {
                break;
            }
            placed += 1;
        }
        placed
    };

    player.send_message(&format!(
        "Added {}x {} to inventory.",
        actual_amount, definition.name
    ));
    Ok(())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub type CommandHandler = fn(&mut Actor, &CommandArgs) -> Result<(), CommandError>;

/// Maps command names (aliases included) to handlers.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, names: &[&str], handler: CommandHandler) {
        for name in names {
            self.handlers.insert((*name).to_string(), handler);
        }
    }

    pub fn dispatch(
        &self,
        command: &str,
        player: &mut Actor,
        args: &CommandArgs,
    ) -> Result<(), CommandError> {
        let handler = self
            .handlers
            .get(command)
            .ok_or_else(|| CommandError::UnknownCommand(command.to_string()))?;
        handler(player, args)
    }
}

/// The built-in command set.
pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(&["give", "item", "spawn"], give_item_command);
    registry
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
