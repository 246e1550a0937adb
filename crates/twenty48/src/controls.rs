use std::collections::VecDeque;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use play_helpers::input::{PointerEvent, PointerKind, pointer_events};
use tile_engine::{InputEvent, InputTranslator, Key, Point};

use crate::board_view::{SettleTimer, TileVisual, start_slide};
use crate::{PlayConfig, Session, TileState};

#[derive(Resource, Deref, DerefMut)]
pub struct Controls(pub InputTranslator);

const fn key_of(code: KeyCode) -> Key {
    match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        _ => Key::Other,
    }
}

const fn point_of(position: Vec2) -> Point {
    Point::new(position.x, position.y)
}

fn pointer_input(event: PointerEvent) -> InputEvent {
    match event {
        PointerEvent::Pressed {
            position,
            kind: PointerKind::Mouse,
        } => InputEvent::PointerDown(point_of(position)),
        PointerEvent::Released {
            position,
            kind: PointerKind::Mouse,
        } => InputEvent::PointerUp(point_of(position)),
        PointerEvent::Pressed {
            position,
            kind: PointerKind::Touch,
        } => InputEvent::TouchStart(point_of(position)),
        PointerEvent::Released {
            position,
            kind: PointerKind::Touch,
        } => InputEvent::TouchEnd(point_of(position)),
    }
}

/// This frame's input in the order the translator reads it: keys first,
/// then pointer presses before releases.
fn frame_events(keys: &ButtonInput<KeyCode>, pointers: Vec<PointerEvent>) -> VecDeque<InputEvent> {
    keys.get_just_pressed()
        .map(|code| InputEvent::KeyDown(key_of(*code)))
        .chain(pointers.into_iter().map(pointer_input))
        .collect()
}

pub fn read_input(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    window: Query<&Window, With<PrimaryWindow>>,
    config: Res<PlayConfig>,
    mut controls: ResMut<Controls>,
    mut session: ResMut<Session>,
    visuals: Query<(Entity, &TileVisual)>,
    mut next_tile_state: ResMut<NextState<TileState>>,
) {
    let mut events = frame_events(&keys, pointer_events(&mouse, &touches, window.get_single().ok()));
    if events.is_empty() {
        return;
    }

    let gate = session.input_gate();
    let Some(direction) = controls.poll(&mut events, gate) else {
        return;
    };
    let Some(slide) = session.begin_move(direction) else {
        return;
    };

    info!("Move {direction}");
    start_slide(&mut commands, &config, slide, &visuals);
    commands.insert_resource(SettleTimer(Timer::new(config.settle_delay, TimerMode::Once)));
    next_tile_state.set(TileState::Slide);
}
