use bevy::prelude::*;

use crate::components::HeadlessMode;
use crate::game_runtime::Session;
use crate::snapshot::{BossHud, HudState};

#[derive(Component, Clone, Copy, PartialEq, Eq, Debug)]
enum HudText {
    Status,
    Abilities,
    Message,
}

#[derive(Component, Clone, Copy, PartialEq, Eq, Debug)]
enum HealthBar {
    Boss,
    Player,
}

#[derive(Component)]
struct BossPanel;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, (update_hud_text, update_boss_panel));
    }
}

/// Top-left status line.
pub fn status_line(hud: &HudState) -> String {
    let lives = if hud.infinite_lives {
        "inf".to_string()
    } else {
        hud.lives.to_string()
    };
    let mut line = format!(
        "Stars: {}/{}   Lives: {}   Deaths: {}",
        hud.stars, hud.star_total, lives, hud.deaths
    );
    if let Some(seconds) = hud.power_up_seconds {
        line.push_str(&format!("   Power-up: {:.1}s", seconds));
    }
    line
}

pub fn ability_line(boss: &BossHud) -> String {
    let buttons: Vec<String> = boss
        .abilities
        .iter()
        .enumerate()
        .map(|(i, a)| format!("[{}] {}", i + 1, a.label))
        .collect();
    let mut line = buttons.join("  ");
    if let Some(countdown) = boss.countdown {
        line = format!("Fight in {countdown}...   {line}");
    }
    line
}

fn spawn_hud(mut commands: Commands, headless: Res<HeadlessMode>) {
    if headless.0 {
        return;
    }
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(12.0)),
                row_gap: Val::Px(6.0),
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new(""),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                HudText::Status,
            ));
            root.spawn((
                Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(4.0),
                    ..default()
                },
                Visibility::Hidden,
                BossPanel,
            ))
            .with_children(|panel| {
                for (bar, color) in [
                    (HealthBar::Boss, Color::srgb(0.7, 0.1, 0.8)),
                    (HealthBar::Player, Color::srgb(0.2, 0.85, 0.3)),
                ] {
                    panel
                        .spawn((
                            Node {
                                width: Val::Px(240.0),
                                height: Val::Px(14.0),
                                ..default()
                            },
                            BackgroundColor(Color::srgb(0.3, 0.05, 0.05)),
                        ))
                        .with_children(|track| {
                            track.spawn((
                                Node {
                                    width: Val::Percent(100.0),
                                    height: Val::Percent(100.0),
                                    ..default()
                                },
                                BackgroundColor(color),
                                bar,
                            ));
                        });
                }
                panel.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(Color::srgb(1.0, 0.9, 0.5)),
                    HudText::Abilities,
                ));
            });
            root.spawn((
                Text::new(""),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 0.6)),
                Node {
                    align_self: AlignSelf::Center,
                    margin: UiRect::top(Val::Percent(20.0)),
                    ..default()
                },
                HudText::Message,
            ));
        });
}

fn update_hud_text(session: Res<Session>, mut texts: Query<(&HudText, &mut Text)>) {
    let hud = session.0.hud();
    for (kind, mut text) in texts.iter_mut() {
        let next = match kind {
            HudText::Status => status_line(&hud),
            HudText::Abilities => hud.boss.as_ref().map(ability_line).unwrap_or_default(),
            HudText::Message => hud.message.clone().unwrap_or_default(),
        };
        if text.0 != next {
            text.0 = next;
        }
    }
}

fn update_boss_panel(
    session: Res<Session>,
    mut panel: Query<&mut Visibility, With<BossPanel>>,
    mut bars: Query<(&HealthBar, &mut Node)>,
) {
    let hud = session.0.hud();
    if let Ok(mut visibility) = panel.get_single_mut() {
        *visibility = if hud.boss.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    let Some(boss) = hud.boss else {
        return;
    };
    for (bar, mut node) in bars.iter_mut() {
        let pct = match bar {
            HealthBar::Boss => boss.boss_health_pct,
            HealthBar::Player => boss.player_health_pct,
        };
        node.width = Val::Percent(pct.clamp(0.0, 100.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::PlayerAbility;
    use crate::snapshot::AbilityHud;

    fn hud() -> HudState {
        HudState {
            stars: 3,
            star_total: 8,
            lives: 2,
            infinite_lives: false,
            deaths: 1,
            power_up_seconds: None,
            boss: None,
            message: None,
        }
    }

    #[test]
    fn status_line_shows_counts_and_power_up() {
        let mut state = hud();
        assert_eq!(status_line(&state), "Stars: 3/8   Lives: 2   Deaths: 1");
        state.infinite_lives = true;
        state.power_up_seconds = Some(2.4);
        assert_eq!(
            status_line(&state),
            "Stars: 3/8   Lives: inf   Deaths: 1   Power-up: 2.4s"
        );
    }

    #[test]
    fn ability_line_lists_buttons_and_countdown() {
        let boss = BossHud {
            boss_health_pct: 100.0,
            player_health_pct: 100.0,
            countdown: Some(2),
            abilities: vec![
                AbilityHud {
                    ability: PlayerAbility::Dagger,
                    ready: false,
                    seconds_left: 2,
                    label: "2s".into(),
                },
                AbilityHud {
                    ability: PlayerAbility::Heal,
                    ready: false,
                    seconds_left: 0,
                    label: "FULL".into(),
                },
            ],
        };
        assert_eq!(ability_line(&boss), "Fight in 2...   [1] 2s  [2] FULL");
    }

    #[test]
    fn hud_text_tracks_the_session() {
        let mut app = App::new();
        app.insert_resource(HeadlessMode(false))
            .insert_resource(Session(crate::session::GameSession::new(
                crate::config::GameTuning::default(),
            )))
            .add_plugins(HudPlugin);
        app.update();
        app.update();

        let mut query = app.world_mut().query::<(&HudText, &Text)>();
        let status = query
            .iter(app.world())
            .find(|(kind, _)| **kind == HudText::Status)
            .map(|(_, text)| text.0.clone());
        assert_eq!(status.as_deref(), Some("Stars: 0/8   Lives: 3   Deaths: 0"));
    }
}
