//! Feeds egui pointer input on the rendering surface into the gesture machine.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::AppConfig;
use crate::overlay::OverlayStore;
use crate::surface::SurfaceMetrics;
use crate::sync::SyncCommand;
use crate::ui::DialogState;

use super::hit_detection::hit_test;
use super::state::{GestureEnd, InteractionMachine, MoveOutcome};

/// Pointer state sampled once per frame.
struct PointerFrame {
    pressed: bool,
    released: bool,
    position: Option<egui::Pos2>,
}

fn sample_pointer(ctx: &egui::Context) -> PointerFrame {
    ctx.input(|input| PointerFrame {
        pressed: input.pointer.primary_pressed(),
        released: input.pointer.primary_released(),
        position: input.pointer.latest_pos(),
    })
}

/// The surface is drawn on the background layer; anything else on top (windows,
/// side panels, popups) owns the pointer.
fn is_pointer_on_surface(ctx: &egui::Context, position: egui::Pos2, metrics: &SurfaceMetrics) -> bool {
    let local = metrics.to_local(Vec2::new(position.x, position.y));
    let size = metrics.size();
    if !metrics.is_mounted() || local.x < 0.0 || local.y < 0.0 || local.x > size.x || local.y > size.y {
        return false;
    }
    ctx.layer_id_at(position)
        .map(|layer| layer.order == egui::Order::Background)
        .unwrap_or(true)
}

fn commit_gesture(end: GestureEnd, commands: &mut MessageWriter<SyncCommand>) {
    debug!(
        "Committing {:?} at {:.2}%, {:.2}% ({:.2}% x {:.2}%)",
        end.target, end.geometry.x, end.geometry.y, end.geometry.width, end.geometry.height
    );
    commands.write(SyncCommand::Commit {
        key: end.target,
        patch: None,
    });
}

/// Press/move/release handling for drag and resize gestures.
#[allow(clippy::too_many_arguments)]
pub fn drive_gestures(
    mut contexts: EguiContexts,
    metrics: Res<SurfaceMetrics>,
    config: Res<AppConfig>,
    dialog_state: Res<DialogState>,
    mut machine: ResMut<InteractionMachine>,
    mut store: ResMut<OverlayStore>,
    mut sync_commands: MessageWriter<SyncCommand>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let pointer = sample_pointer(ctx);
    let surface = metrics.size();
    let handle_px = config.data.resize_handle_px;

    let local = pointer
        .position
        .map(|pos| metrics.to_local(Vec2::new(pos.x, pos.y)));

    if pointer.pressed
        && !dialog_state.any_modal_open
        && let (Some(position), Some(local)) = (pointer.position, local)
    {
        let hit = if is_pointer_on_surface(ctx, position, &metrics) {
            hit_test(&store, local, surface, handle_px)
        } else {
            None
        };
        if let Some(end) = machine.press(&store, hit, local, surface) {
            commit_gesture(end, &mut sync_commands);
        }
    }

    if machine.gesture().is_active()
        && let Some(local) = local
    {
        match machine.pointer_move(&mut store, local, surface) {
            MoveOutcome::Floored(_, notice) => debug!("{}", notice),
            MoveOutcome::TargetLost => info!("Overlay removed during gesture; gesture dropped"),
            MoveOutcome::Updated(_) | MoveOutcome::Idle => {}
        }
    }

    if pointer.released
        && let Some(end) = machine.release(&store)
    {
        commit_gesture(end, &mut sync_commands);
    }

    // Cursor feedback
    if let Some(icon) = machine.gesture().cursor_icon() {
        ctx.set_cursor_icon(icon);
    } else if let (Some(position), Some(local)) = (pointer.position, local)
        && is_pointer_on_surface(ctx, position, &metrics)
        && let Some(hit) = hit_test(&store, local, surface, handle_px)
    {
        ctx.set_cursor_icon(hit.part.cursor_icon());
    }

    Ok(())
}
