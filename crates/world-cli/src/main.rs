//! Thin host binary around the world core: boots a world from configuration,
//! spawns wandering NPCs, runs ticks on the configured cadence, and demos the
//! command dispatch path.

use std::env;
use std::time::Duration;

use contracts::{Item, ItemDefinition, Position, WorldConfig};
use serde_json::json;
use world_core::commands::{default_registry, CommandArgs};
use world_core::items::ItemCatalog;
use world_core::{OutgoingPackets, World};

fn print_usage() {
    println!("world-cli <command>");
    println!("commands:");
    println!("  simulate <seed> [ticks] [npcs]");
    println!("    runs the tick loop with wandering npcs and prints positions");
    println!("    defaults: ticks=25 npcs=5");
    println!("  give <item_id> [amount]");
    println!("    dispatches the give command against a demo player");
}

fn parse_u64(value: Option<&String>, label: &str) -> Result<u64, String> {
    let raw = value.ok_or_else(|| format!("missing {}", label))?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid {}: {}", label, raw))
}

fn demo_catalog() -> ItemCatalog {
    let mut catalog = ItemCatalog::new();
    catalog.register(ItemDefinition {
        item_id: 995,
        name: "Coins".to_string(),
        stackable: true,
        value: 1,
    });
    catalog.register(ItemDefinition {
        item_id: 1011,
        name: "Black skirt".to_string(),
        stackable: false,
        value: 144,
    });
    catalog.register(ItemDefinition {
        item_id: 1215,
        name: "Dragon dagger".to_string(),
        stackable: false,
        value: 30_000,
    });
    catalog
}

/// Prints client-bound traffic instead of encoding it.
#[derive(Debug)]
struct ConsolePackets;

impl OutgoingPackets for ConsolePackets {
    fn send_update_single_widget_item(&mut self, widget_id: u16, slot: usize, item: Option<Item>) {
        log::debug!("widget {widget_id} slot {slot} <- {item:?}");
    }

    fn send_update_all_widget_items(&mut self, widget_id: u16, items: &[Option<Item>]) {
        log::debug!(
            "widget {widget_id} <- full update ({} occupied)",
            items.iter().flatten().count()
        );
    }

    fn show_screen_and_tab_widgets(&mut self, screen_widget_id: u16, tab_widget_id: u16) {
        log::debug!("show widgets screen={screen_widget_id} tab={tab_widget_id}");
    }

    fn send_message(&mut self, message: &str) {
        println!("[game] {message}");
    }
}

async fn run_simulation(args: &[String]) -> Result<(), String> {
    let seed = parse_u64(args.get(2), "seed")?;
    let ticks = args
        .get(3)
        .map(|value| parse_u64(Some(value), "ticks"))
        .transpose()?
        .unwrap_or(25);
    let npc_count = args
        .get(4)
        .map(|value| parse_u64(Some(value), "npcs"))
        .transpose()?
        .unwrap_or(5);

    let config = WorldConfig {
        seed,
        ..WorldConfig::default()
    };
    let tick_millis = config.tick_millis;
    let mut world = World::new(config, demo_catalog());

    for offset in 0..npc_count {
        let position = Position::new(3200 + (offset as i32) * 6, 3200);
        world.spawn_npc(offset as u32 + 1, position, 4).await;
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(tick_millis));
    for _ in 0..ticks {
        ticker.tick().await;
        world.step().await;
    }

    println!(
        "simulated seed={} ticks={} npcs={}",
        seed,
        world.current_tick(),
        world.actor_count()
    );
    for (index, handle) in world.actors() {
        let actor = handle.lock().await;
        println!(
            "  actor {} at {} (queued steps: {})",
            index,
            actor.position(),
            actor.walking_queue().len()
        );
    }
    Ok(())
}

async fn run_give(args: &[String]) -> Result<(), String> {
    let item_id = parse_u64(args.get(2), "item_id")?;
    let amount = args
        .get(3)
        .map(|value| parse_u64(Some(value), "amount"))
        .transpose()?
        .unwrap_or(1);

    let mut world = World::new(WorldConfig::default(), demo_catalog());
    let player = world
        .spawn_player("demo", Box::new(ConsolePackets), Position::new(3222, 3222))
        .await;

    let registry = default_registry();
    let command_args = CommandArgs::new()
        .with("item_id", json!(item_id))
        .with("amount", json!(amount));

    let mut actor = player.lock().await;
    registry
        .dispatch("give", &mut actor, &command_args)
        .map_err(|err| err.to_string())?;
    println!(
        "inventory: {}/{} slots occupied",
        actor.inventory().occupied_slot_count(),
        actor.inventory().capacity()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("simulate") => {
            if let Err(err) = run_simulation(&args).await {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        Some("give") => {
            if let Err(err) = run_give(&args).await {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        _ => {
            print_usage();
        }
    }
}
