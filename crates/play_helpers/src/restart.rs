use bevy::prelude::*;
use bevy::state::state::FreelyMutableState;

const BUTTON_IDLE: Color = Color::srgb(0.23, 0.51, 0.96);
const BUTTON_HOVERED: Color = Color::srgb(0.15, 0.39, 0.92);

#[derive(Component)]
pub struct RestartButton;

/// Entities despawned by [`cleanup_marked_entities`], e.g. a game over overlay.
#[derive(Component)]
pub struct CleanupMarker;

/// A resource that knows how to start its game over.
pub trait Restartable: Resource {
    type State: States + FreelyMutableState;

    fn restart(&mut self);

    /// State to enter once restarted.
    fn restart_state() -> Self::State;
}

/// Spawns a restart button as a child of `parent`.
pub fn spawn_restart_button(parent: &mut ChildBuilder, label: &str) {
    parent
        .spawn((
            RestartButton,
            Button,
            Node {
                padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BorderRadius::all(Val::Px(8.0)),
            BackgroundColor(BUTTON_IDLE),
        ))
        .with_child((
            Text::new(label),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(Color::WHITE),
        ));
}

pub fn handle_restart<T: Restartable>(
    mut next_state: ResMut<NextState<T::State>>,
    mut restartable: ResMut<T>,
    mut interaction_query: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<RestartButton>),
    >,
) {
    for (interaction, mut background) in &mut interaction_query {
        match *interaction {
            Interaction::Pressed => {
                info!("Restart requested");
                restartable.restart();
                next_state.set(T::restart_state());
            }
            Interaction::Hovered => background.0 = BUTTON_HOVERED,
            Interaction::None => background.0 = BUTTON_IDLE,
        }
    }
}

pub fn cleanup_marked_entities(mut commands: Commands, query: Query<Entity, With<CleanupMarker>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
