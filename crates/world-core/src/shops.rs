//! Shop registry and the open-shop player action.

use contracts::{widgets, ActiveWidget, Item, Shop, WidgetDisplay, SHOP_INTERFACE_SIZE};
use serde_json::json;

use crate::actor::Actor;

/// Registry backing the `find_by_identification -> shop | absent` contract.
/// An unknown identification is a normal absent result, never a panic.
#[derive(Debug, Clone, Default)]
pub struct ShopRegistry {
    shops: Vec<Shop>,
}

impl ShopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, shop: Shop) {
        self.shops.push(shop);
    }

    pub fn find_by_identification(&self, identification: &str) -> Option<&Shop> {
        self.shops
            .iter()
            .find(|shop| shop.identification == identification)
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// No shop carries the requested identification.
    ShopNotFound(String),
    /// Shops can only be opened on player-controlled actors.
    NotAPlayer,
}

impl std::fmt::Display for ShopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShopError::ShopNotFound(identification) => {
                write!(f, "unable to find shop with identification: {identification}")
            }
            ShopError::NotAPlayer => write!(f, "shops require a player actor"),
        }
    }
}

impl std::error::Error for ShopError {}

/// Opens a shop on a player's screen: fills all thirty shop interface slots
/// (vacant ones cleared explicitly), mirrors the player inventory into both
/// inventory surfaces, shows the screen-and-tab widget pair, and records the
/// open surface on the player.
pub fn open_shop(
    player: &mut Actor,
    registry: &ShopRegistry,
    identification: &str,
    close_on_walk: bool,
) -> Result<(), ShopError> {
    let shop = registry
        .find_by_identification(identification)
        .ok_or_else(|| ShopError::ShopNotFound(identification.to_string()))?;

    let inventory_items: Vec<Option<Item>> = player.inventory().items().to_vec();
    let Some(data) = player.player_data_mut() else {
        return Err(ShopError::NotAPlayer);
    };

    for slot in 0..SHOP_INTERFACE_SIZE {
        let stocked = shop
            .items
            .get(slot)
            .map(|line| Item::new(line.item_id, line.amount_in_stock));
        data.outgoing
            .send_update_single_widget_item(widgets::shop::SHOP_INVENTORY, slot, stocked);
    }

    data.outgoing
        .send_update_all_widget_items(widgets::shop::PLAYER_INVENTORY, &inventory_items);

    data.active_widget = Some(ActiveWidget {
        widget_id: widgets::shop::SHOP_SCREEN,
        secondary_widget_id: widgets::shop::PLAYER_TAB,
        display: WidgetDisplay::ScreenAndTab,
        close_on_walk,
    });

    data.outgoing
        .send_update_all_widget_items(widgets::INVENTORY, &inventory_items);
    data.outgoing
        .show_screen_and_tab_widgets(widgets::shop::SHOP_SCREEN, widgets::shop::PLAYER_TAB);

    for (slot, item) in inventory_items.iter().enumerate() {
        data.outgoing.send_update_single_widget_item(
            widgets::shop::PLAYER_INVENTORY,
            slot,
            *item,
        );
    }

    player.set_metadata("open_shop", json!(identification));
    Ok(())
}
