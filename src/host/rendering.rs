//! Camera, gizmo drawing and the HUD.
//!
//! Everything is drawn with gizmos straight from core state each frame; no
//! meshes or sprites are kept in sync.
//!
//! ## Systems
//!
//! | System | Schedule | Purpose |
//! |---|---|---|
//! | `setup_camera` | Startup | Spawn the 2D camera |
//! | `setup_hud` | Startup | Spawn the top-left HUD text |
//! | `effect_feedback_system` | Update | Log cues, keep the latest one as a toast |
//! | `hud_system` | Update | Refresh HUD text from the run snapshot |
//! | `gizmo_system` | Update | Ground, gates, enemies, collectibles, character, aim guide |
//! | `camera_follow_system` | Update | Keep the character near the left edge |

use bevy::prelude::*;

use super::{to_world, ActiveRun, GameEffect};
use crate::collision::PowerUp;
use crate::config::TuningConfig;
use crate::constants::{CHARACTER_RADIUS, COLLECTIBLE_RADIUS, ENEMY_RADIUS};
use crate::effects::EffectCue;
use crate::level::EnemyKind;
use crate::progression::ProgressionStore;
use crate::run::RunPhase;

/// How long a cue's text stays on the HUD.
const TOAST_SECS: f32 = 1.5;

/// Marker for the HUD root node.
#[derive(Component)]
pub struct HudDisplay;

/// Short text shown under the HUD after a notable cue.
#[derive(Resource, Default, Debug)]
pub struct EffectToast {
    pub text: String,
    pub remaining: f32,
}

fn cue_text(cue: &EffectCue) -> Option<String> {
    let text = match cue {
        EffectCue::PowerUp(power_up) => power_up.label().to_string(),
        EffectCue::GateLocked => "Gate locked! Unlock it in a later run.".to_string(),
        EffectCue::GateBreak => "Gate smashed!".to_string(),
        EffectCue::LevelUnlocked { level } => format!("Level {level} unlocked!"),
        EffectCue::RunComplete {
            distance,
            session_currency,
        } => format!("{distance}m! +{session_currency} hearts"),
        EffectCue::Purchase(category) => format!("{} upgraded!", category.label()),
        EffectCue::PurchaseRejected(message) => (*message).to_string(),
        EffectCue::Launch { .. } | EffectCue::Squish { .. } | EffectCue::Collect | EffectCue::Stomp => {
            return None
        }
    };
    Some(text)
}

// ── Startup ───────────────────────────────────────────────────────────────────

pub fn setup_camera(mut commands: Commands, config: Res<TuningConfig>) {
    let center = Vec2::new(
        config.window_width as f32 / 2.0,
        config.window_height as f32 / 2.0,
    );
    commands.spawn((Camera2d, Transform::from_translation(to_world(center).extend(0.0))));
}

pub fn setup_hud(mut commands: Commands, config: Res<TuningConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            HudDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
            ));
        });
}

// ── Update ────────────────────────────────────────────────────────────────────

pub fn effect_feedback_system(
    time: Res<Time>,
    mut effects: MessageReader<GameEffect>,
    mut toast: ResMut<EffectToast>,
) {
    toast.remaining = (toast.remaining - time.delta_secs()).max(0.0);

    for GameEffect(effect) in effects.read() {
        debug!("Effect {:?} at {:?}", effect.cue, effect.position);
        if let Some(text) = cue_text(&effect.cue) {
            toast.text = text;
            toast.remaining = TOAST_SECS;
        }
    }
}

pub fn hud_system(
    run: Res<ActiveRun>,
    store: Res<ProgressionStore>,
    toast: Res<EffectToast>,
    parent_query: Query<&Children, With<HudDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    let snapshot = run.0.snapshot(&store);

    let stomp = match (snapshot.stomp_available, snapshot.stomp_cooldown) {
        (true, _) => "ready".to_string(),
        (false, Some(left)) => format!("{:.1}s", left.as_secs_f32()),
        (false, None) => "-".to_string(),
    };
    let hint = match snapshot.phase {
        RunPhase::Idle | RunPhase::Aiming => "Drag the luchador back and release to launch",
        RunPhase::Launched => "SPACE / click: stomp    R: restart",
        RunPhase::Ended => "Run over!",
    };
    let mut lines = vec![
        format!(
            "Distance: {}m  (best {}m)",
            snapshot.distance,
            snapshot.best_distance.max(snapshot.best_distance_this_run)
        ),
        format!(
            "Hearts: {} (+{} this run)",
            snapshot.total_currency, snapshot.session_currency
        ),
        format!("Level: {}   Stomp: {}", snapshot.unlocked_level, stomp),
    ];
    if snapshot.magnet_active {
        lines.push(PowerUp::GummyMagnet.label().to_string());
    }
    if toast.remaining > 0.0 {
        lines.push(toast.text.clone());
    }
    lines.push(hint.to_string());

    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(lines.join("\n"));
            }
        }
    }
}

pub fn gizmo_system(mut gizmos: Gizmos, run: Res<ActiveRun>, store: Res<ProgressionStore>) {
    let config = run.0.config();
    let level = run.0.level();
    let state = run.0.state();

    // ── Ground ────────────────────────────────────────────────────────────────
    let ground_left = to_world(Vec2::new(state.character.position.x - 2000.0, config.ground_y));
    let ground_right = to_world(Vec2::new(state.character.position.x + 2000.0, config.ground_y));
    gizmos.line_2d(ground_left, ground_right, Color::srgb(0.45, 0.32, 0.2));

    // ── Gates: green once passable, red while locked ──────────────────────────
    let unlocked = store.record().unlocked_level;
    for gate in level.gates.iter().filter(|g| g.active) {
        let color = if gate.required_unlock_level <= unlocked {
            Color::srgb(0.3, 0.9, 0.4)
        } else {
            Color::srgb(0.9, 0.2, 0.2)
        };
        let top = to_world(Vec2::new(gate.boundary_position, 0.0));
        let bottom = to_world(Vec2::new(gate.boundary_position, config.ground_y));
        gizmos.line_2d(top, bottom, color);
    }

    // ── Enemies and collectibles ──────────────────────────────────────────────
    for enemy in level.enemies.iter().filter(|e| e.active) {
        let color = match enemy.kind {
            EnemyKind::Regular => Color::srgb(0.9, 0.5, 0.2),
            EnemyKind::Bouncy => Color::srgb(0.3, 0.6, 1.0),
            EnemyKind::Special => Color::srgb(0.9, 0.3, 0.9),
        };
        gizmos.circle_2d(to_world(enemy.position), ENEMY_RADIUS, color);
    }
    for collectible in level.collectibles.iter().filter(|c| c.active) {
        gizmos.circle_2d(
            to_world(collectible.position),
            COLLECTIBLE_RADIUS,
            Color::srgb(1.0, 0.4, 0.6),
        );
    }

    // ── Character ─────────────────────────────────────────────────────────────
    let character = to_world(state.character.position);
    gizmos.circle_2d(character, CHARACTER_RADIUS, Color::WHITE);
    if !state.stomp_available {
        gizmos.circle_2d(character, CHARACTER_RADIUS + 4.0, Color::srgba(1.0, 1.0, 1.0, 0.3));
    }

    // ── Aim guide ─────────────────────────────────────────────────────────────
    if let Some(guide) = run.0.aim_guide() {
        let band = Color::srgb(1.0, 1.0 - guide.power_ratio, 0.2);
        gizmos.line_2d(to_world(guide.anchor), character, band);
        for dot in &guide.preview {
            gizmos.circle_2d(to_world(*dot), 3.0, Color::srgba(1.0, 1.0, 1.0, 0.6));
        }
    }
}

/// Keep the character `camera_lead` pixels from the left edge of the view.
pub fn camera_follow_system(
    run: Res<ActiveRun>,
    mut q_camera: Query<&mut Transform, With<Camera>>,
) {
    let Ok(mut cam) = q_camera.single_mut() else {
        return;
    };
    let config = run.0.config();
    let lead_x = run.0.state().character.position.x - config.camera_lead;
    cam.translation.x = lead_x.max(0.0) + config.window_width as f32 / 2.0;
}
