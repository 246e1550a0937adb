use bevy::prelude::*;
use play_helpers::restart::{CleanupMarker, spawn_restart_button};

use crate::Session;
use crate::palette;

#[derive(Component)]
pub struct ScoreValue;

#[derive(Component)]
pub struct BestValue;

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Px(24.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            column_gap: Val::Px(8.0),
            ..default()
        })
        .with_children(|parent| {
            spawn_counter(parent, "SCORE", ScoreValue);
            spawn_counter(parent, "BEST", BestValue);
        });
}

fn spawn_counter(parent: &mut ChildBuilder, label: &str, marker: impl Component) {
    parent
        .spawn((
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                min_width: Val::Px(100.0),
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::WHITE),
            BorderRadius::all(Val::Px(8.0)),
        ))
        .with_children(|counter| {
            counter.spawn((
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(palette::MUTED),
            ));
            counter.spawn((
                Text::new("0"),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(palette::INK),
                marker,
            ));
        });
}

pub fn update_scores(
    session: Res<Session>,
    mut score_text: Query<&mut Text, (With<ScoreValue>, Without<BestValue>)>,
    mut best_text: Query<&mut Text, (With<BestValue>, Without<ScoreValue>)>,
) {
    if !session.is_changed() {
        return;
    }
    for mut text in &mut score_text {
        **text = session.score().to_string();
    }
    for mut text in &mut best_text {
        **text = session.best_score().to_string();
    }
}

pub fn spawn_game_over(mut commands: Commands, session: Res<Session>) {
    info!("Game over, score {} (best {})", session.score(), session.best_score());
    commands
        .spawn((
            CleanupMarker,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.85)),
        ))
        .with_children(|overlay| {
            overlay.spawn((
                Text::new("Game Over!"),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(palette::INK),
            ));
            overlay.spawn((
                Text::new(format!("Score: {}", session.score())),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(palette::MUTED),
            ));
            spawn_restart_button(overlay, "Try Again");
        });
}
