/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Demo page catalog.
//!
//! A small game UI: a hub page with an inventory, a world map, a handbook and
//! a few pages behind them. Titled and anchored pages are mixed, and one
//! event page has no inbound link so unreachable targets can be exercised.

use std::sync::Arc;

use pagenav_core::{
    GraphError, PageAction, PageGraph, PageGraphBuilder, PageKey, ScreenRegion, TextAnchor,
    VisualAnchor,
};

pub struct DemoCatalog {
    pub graph: Arc<PageGraph>,
    pub main: PageKey,
    pub loading: PageKey,
    pub inventory: PageKey,
    pub crafting: PageKey,
    pub map: PageKey,
    pub shop: PageKey,
    pub handbook: PageKey,
    pub quests: PageKey,
    pub event: PageKey,
}

impl DemoCatalog {
    pub fn key(&self, name: &str) -> Option<PageKey> {
        self.graph.key_of(name)
    }
}

pub fn demo_catalog() -> Result<DemoCatalog, GraphError> {
    let mut builder = PageGraphBuilder::new();

    let main = builder.page(
        "main",
        vec![
            VisualAnchor::new("hub_compass")
                .in_region(ScreenRegion::new(1180, 24, 96, 96))
                .into(),
        ],
    )?;
    builder.add_check_anchor(main, TextAnchor::new("Adventure"))?;
    let loading = builder.page(
        "loading",
        vec![
            TextAnchor::new("Now Loading")
                .in_region(ScreenRegion::new(520, 640, 240, 40))
                .into(),
        ],
    )?;
    let inventory = builder.page("inventory", vec![VisualAnchor::new("bag_tab").into()])?;
    let crafting = builder.title_page("crafting", "Crafting")?;
    let map = builder.page("map", vec![VisualAnchor::new("map_legend").into()])?;
    let shop = builder.title_page("shop", "Shop")?;
    let handbook = builder.title_page("handbook", "Adventurer's Handbook")?;
    let quests = builder.page("quests", vec![TextAnchor::new("Quest Log").into()])?;
    let event = builder.title_page("event", "Limited Event")?;

    builder.set_main(main)?;
    builder.set_loading(loading)?;

    builder.link(main, inventory, "i")?;
    builder.link(inventory, main, "i")?;
    builder.link(main, map, "m")?;
    builder.link(map, main, "esc")?;
    builder.link(main, handbook, "f1")?;
    builder.link(handbook, main, "esc")?;
    builder.link(
        inventory,
        crafting,
        PageAction::click_icon(VisualAnchor::new("anvil")),
    )?;
    builder.link(crafting, inventory, "esc")?;
    builder.link(map, shop, PageAction::click_text(TextAnchor::new("Merchant")))?;
    builder.link(shop, map, "esc")?;
    builder.link(handbook, quests, PageAction::click_text(TextAnchor::new("Quests")))?;
    builder.link(quests, main, "esc")?;
    builder.link(event, main, "esc")?;

    Ok(DemoCatalog {
        graph: Arc::new(builder.build()?),
        main,
        loading,
        inventory,
        crafting,
        map,
        shop,
        handbook,
        quests,
        event,
    })
}

#[cfg(test)]
mod tests {
    use pagenav_core::{Anchor, plan_path};

    use super::*;

    #[test]
    fn demo_catalog_builds() {
        let catalog = demo_catalog().unwrap();
        assert_eq!(catalog.graph.len(), 9);
        assert_eq!(catalog.graph.main(), catalog.main);
        assert_eq!(catalog.key("shop"), Some(catalog.shop));
        assert!(!catalog.graph.detection_order().contains(&catalog.loading));
        let hub = &catalog.graph.page(catalog.main).unwrap().check_anchors()[0];
        assert!(matches!(hub, Anchor::Visual(icon) if icon.region.is_some()));
    }

    #[test]
    fn every_page_but_the_event_is_reachable_from_main() {
        let catalog = demo_catalog().unwrap();
        for (key, page) in catalog.graph.pages() {
            let reachable = plan_path(&catalog.graph, catalog.main, key).is_ok();
            let expected = key != catalog.event && key != catalog.loading;
            assert_eq!(reachable, expected, "{page}");
        }
    }

    #[test]
    fn crafting_to_shop_goes_through_the_hub() {
        let catalog = demo_catalog().unwrap();
        let route = plan_path(&catalog.graph, catalog.crafting, catalog.shop).unwrap();
        assert_eq!(
            route.describe(&catalog.graph),
            "crafting -> inventory -> main -> map -> shop"
        );
    }
}
