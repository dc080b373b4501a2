//! Between-run flow: run end → shop → next run.
//!
//! A run that stops on its own shows its result for
//! `run_end_shop_delay_secs` before the shop opens; breaking a gate opens the
//! shop at once.
//!
//! ## Shop keys
//!
//! | Key | Action |
//! |-----|--------|
//! | 1–4 | Buy the next level of Power / Bounce / Stomp Power / Stomp Cooldown |
//! | Enter | Start the next run |
//! | Backspace | Reset all progression |

use bevy::prelude::*;

use super::{forward_effects, ActiveRun, GameEffect, GameState};
use crate::config::TuningConfig;
use crate::progression::ProgressionStore;
use crate::run::{RunEnd, RunPhase};
use crate::upgrades::{self, UpgradeCategory};

/// Seconds left before the shop opens; `None` while no run has ended.
#[derive(Resource, Default, Debug)]
pub struct RunEndDelay(pub Option<f32>);

/// Last purchase result, shown at the bottom of the shop.
#[derive(Resource, Default, Debug)]
pub struct ShopMessage(pub Option<String>);

/// Root node of the shop overlay; despawned on `OnExit(Shop)`.
#[derive(Component)]
pub struct ShopRoot;

const SHOP_KEYS: [(KeyCode, UpgradeCategory); 4] = [
    (KeyCode::Digit1, UpgradeCategory::Power),
    (KeyCode::Digit2, UpgradeCategory::Bounce),
    (KeyCode::Digit3, UpgradeCategory::StompPower),
    (KeyCode::Digit4, UpgradeCategory::StompCooldown),
];

/// Open the shop once the current run has ended.
pub fn run_end_system(
    time: Res<Time>,
    config: Res<TuningConfig>,
    run: Res<ActiveRun>,
    mut delay: ResMut<RunEndDelay>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if run.0.phase() != RunPhase::Ended {
        delay.0 = None;
        return;
    }

    if run.0.state().end == Some(RunEnd::GateUnlocked) {
        delay.0 = None;
        next_state.set(GameState::Shop);
        return;
    }

    let remaining = delay.0.get_or_insert(config.run_end_shop_delay_secs);
    *remaining -= time.delta_secs();
    if *remaining <= 0.0 {
        delay.0 = None;
        next_state.set(GameState::Shop);
    }
}

fn shop_text(store: &ProgressionStore, message: Option<&str>) -> String {
    let record = store.record();
    let mut lines = vec![
        "UPGRADE SHOP".to_string(),
        format!(
            "Hearts: {}   Best: {}m   Level: {}",
            record.currency, record.best_distance, record.unlocked_level
        ),
        String::new(),
    ];

    for (slot, category) in UpgradeCategory::ALL.iter().enumerate() {
        let level = store.upgrades().get(*category);
        let price = match upgrades::cost_for_next_level(level) {
            Some(cost) => format!("{cost} hearts"),
            None => "MAX".to_string(),
        };
        lines.push(format!(
            "[{}] {} (Lv {})  {}  -  {}",
            slot + 1,
            category.label(),
            level,
            price,
            category.description()
        ));
    }

    lines.push(String::new());
    lines.push("ENTER: next run    BACKSPACE: reset progress".to_string());
    if let Some(message) = message {
        lines.push(message.to_string());
    }
    lines.join("\n")
}

pub fn setup_shop(
    mut commands: Commands,
    config: Res<TuningConfig>,
    store: Res<ProgressionStore>,
    mut message: ResMut<ShopMessage>,
) {
    message.0 = None;
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
            ShopRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(shop_text(&store, None)),
                TextFont {
                    font_size: config.hud_font_size * 1.25,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.95, 0.95)),
            ));
        });
}

pub fn cleanup_shop(mut commands: Commands, query: Query<Entity, With<ShopRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

pub fn shop_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut run: ResMut<ActiveRun>,
    mut store: ResMut<ProgressionStore>,
    mut message: ResMut<ShopMessage>,
    mut effects: MessageWriter<GameEffect>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for (key, category) in SHOP_KEYS {
        if !keys.just_pressed(key) {
            continue;
        }
        message.0 = Some(match run.0.purchase(category, &mut store) {
            Ok(spent) => format!("{} upgraded for {} hearts!", category.label(), spent),
            Err(err) => err.player_message().to_string(),
        });
    }

    if keys.just_pressed(KeyCode::Backspace) {
        store.reset();
        message.0 = Some("Progress reset.".to_string());
    }

    forward_effects(&mut run.0, &mut effects);

    if keys.just_pressed(KeyCode::Enter) {
        run.0.restart(&mut store);
        next_state.set(GameState::Playing);
    }
}

/// Refresh the shop text after purchases.
pub fn shop_text_system(
    store: Res<ProgressionStore>,
    message: Res<ShopMessage>,
    parent_query: Query<&Children, With<ShopRoot>>,
    mut text_query: Query<&mut Text>,
) {
    if !store.is_changed() && !message.is_changed() {
        return;
    }
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(shop_text(&store, message.0.as_deref()));
            }
        }
    }
}
