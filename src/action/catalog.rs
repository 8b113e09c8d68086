// Static catalog responders
// Menu and stock answers; no inventory backend exists yet

use super::types::{MenuItem, ResponseBody};

pub const CURRENCY: &str = "IDR";

/// Reported for every item until a real inventory source is wired in
pub const DEFAULT_STOCK: u32 = 10;

const MENU: [(&str, u32); 4] = [
    ("Kopi Susu", 25_000),
    ("Americano", 22_000),
    ("Latte", 28_000),
    ("Matcha Latte", 30_000),
];

pub fn menu() -> ResponseBody {
    ResponseBody::Menu {
        menu: MENU
            .iter()
            .map(|(name, price)| MenuItem {
                name: (*name).to_string(),
                price: *price,
            })
            .collect(),
        currency: CURRENCY.to_string(),
    }
}

pub fn stock(item: &str) -> ResponseBody {
    ResponseBody::Stock {
        item: item.to_string(),
        stock: DEFAULT_STOCK,
        available: true,
    }
}

pub fn unknown_action(api_path: &str) -> ResponseBody {
    ResponseBody::Error {
        error: format!("Unknown action: {api_path}"),
    }
}
