use bevy_ecs::{prelude::*, schedule::ScheduleLabel};
use gait::{GaitController, GaitState, RequestOutcome, TransitionGraph};

use crate::{
    engine::{input::InputState, renderer::Frame, scene::Scene},
    game::player::{ClipLibrary, SimulatedPlayer},
};

#[derive(Clone, Debug, Eq, Hash, PartialEq, ScheduleLabel)]
struct UpdateSchedule;

#[derive(Resource)]
pub struct GaitGraph(pub TransitionGraph);

#[derive(Default, Resource)]
pub struct Time {
    pub delta_time: f32,
}

/// Gait requests gathered from input this frame.
#[derive(Default, Resource)]
pub struct GaitRequests(Vec<GaitState>);

/// Clips that become available once `remaining` runs out.
#[derive(Resource)]
pub struct PendingClipLoad {
    remaining: f32,
    library: Option<ClipLibrary>,
}

#[derive(Component)]
pub struct GaitModel {
    pub name: String,
    pub controller: GaitController,
}

fn finish_clip_loading(
    mut pending: ResMut<PendingClipLoad>,
    time: Res<Time>,
    graph: Res<GaitGraph>,
    mut models: Query<(&mut GaitModel, &mut SimulatedPlayer)>,
) {
    if pending.library.is_none() {
        return;
    }

    pending.remaining -= time.delta_time;
    if pending.remaining > 0.0 {
        return;
    }

    let Some(library) = pending.library.take() else {
        return;
    };

    for (mut model, mut player) in models.iter_mut() {
        tracing::info!(model = %model.name, clips = library.len(), "Clips loaded");
        player.set_library(library.clone());
        if let Err(err) = model.controller.on_clips_loaded(&graph.0, &mut *player) {
            tracing::error!(model = %model.name, "Could not start initial gait: {err}");
        }
    }
}

fn apply_gait_requests(
    mut requests: ResMut<GaitRequests>,
    graph: Res<GaitGraph>,
    mut models: Query<(&mut GaitModel, &mut SimulatedPlayer)>,
) {
    for target in requests.0.drain(..) {
        for (mut model, mut player) in models.iter_mut() {
            match model.controller.request_gait(target, &graph.0, &mut *player) {
                RequestOutcome::Failed(err) => {
                    tracing::warn!(model = %model.name, %target, "Gait request failed: {err}");
                }
                outcome => {
                    tracing::debug!(model = %model.name, %target, ?outcome, "Gait requested");
                }
            }
        }
    }
}

fn update_players(mut players: Query<&mut SimulatedPlayer>, time: Res<Time>) {
    for mut player in players.iter_mut() {
        player.update(time.delta_time);
    }
}

fn tick_gait_controllers(
    graph: Res<GaitGraph>,
    mut models: Query<(&mut GaitModel, &mut SimulatedPlayer)>,
) {
    for (mut model, mut player) in models.iter_mut() {
        model.controller.tick(&graph.0, &mut *player);
    }
}

/// Drives one model through its gaits from keyboard input.
pub struct GaitViewerScene {
    world: World,
    update_schedule: Schedule,
    model: Entity,
}

impl GaitViewerScene {
    pub fn new(
        graph: TransitionGraph,
        library: ClipLibrary,
        initial_gait: GaitState,
        load_delay: f32,
    ) -> Self {
        let mut world = World::new();

        world.insert_resource(GaitGraph(graph));
        world.init_resource::<Time>();
        world.init_resource::<GaitRequests>();
        world.insert_resource(PendingClipLoad {
            remaining: load_delay.max(0.0),
            library: Some(library),
        });

        let model = world
            .spawn((
                GaitModel {
                    name: String::from("quadruped"),
                    controller: GaitController::new(initial_gait),
                },
                SimulatedPlayer::default(),
            ))
            .id();

        let mut update_schedule = Schedule::new(UpdateSchedule);
        update_schedule.add_systems(
            (
                finish_clip_loading,
                apply_gait_requests,
                update_players,
                tick_gait_controllers,
            )
                .chain(),
        );

        Self {
            world,
            update_schedule,
            model,
        }
    }

    pub fn request_gait(&mut self, gait: GaitState) {
        self.world.resource_mut::<GaitRequests>().0.push(gait);
    }

    pub fn controller(&self) -> Option<&GaitController> {
        self.world
            .get::<GaitModel>(self.model)
            .map(|model| &model.controller)
    }

    pub fn player(&self) -> Option<&SimulatedPlayer> {
        self.world.get::<SimulatedPlayer>(self.model)
    }

    fn status_line(&self) -> String {
        let (Some(controller), Some(player)) = (self.controller(), self.player()) else {
            return String::from("no model");
        };

        let sequencer = match controller {
            GaitController::Loading {
                initial_gait,
                parked,
            } => {
                return match parked {
                    Some(parked) => format!("loading clips, gait {initial_gait}, parked {parked}"),
                    None => format!("loading clips, gait {initial_gait}"),
                };
            }
            GaitController::Ready(sequencer) => sequencer,
        };

        let mut status = format!(
            "gait {} | clip {}",
            sequencer.current_gait(),
            sequencer.selected_animation_name().unwrap_or("-"),
        );

        if sequencer.is_transitioning() {
            status.push_str(&format!(
                " | transition {}/{}",
                sequencer.queue_cursor() + 1,
                sequencer.active_queue().len(),
            ));
        }

        if let Some(pending) = sequencer.pending_target() {
            if sequencer.is_waiting_for_loop_end() {
                status.push_str(&format!(" | next {pending} at loop end"));
            } else {
                status.push_str(&format!(" | next {pending}"));
            }
        }

        if let Some(fading) = player.fading_clip() {
            status.push_str(&format!(
                " | fading from {} ({:.1})",
                fading.name,
                player.blend_weight()
            ));
        }

        status
    }
}

impl Scene for GaitViewerScene {
    fn update(&mut self, delta_time: f32, input: &InputState) {
        for gait in GaitState::ALL {
            if input.key_just_pressed(gait.hotkey()) {
                self.request_gait(gait);
            }
        }

        self.world.resource_mut::<Time>().delta_time = delta_time;
        self.update_schedule.run(&mut self.world);
    }

    fn render(&mut self, frame: &mut Frame) {
        frame.draw_text(self.status_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GaitDefs;

    const DT: f32 = 1.0 / 60.0;

    fn scene(load_delay: f32) -> GaitViewerScene {
        let defs = GaitDefs::builtin();
        GaitViewerScene::new(
            defs.graph().unwrap(),
            defs.clip_library(),
            GaitState::Stand,
            load_delay,
        )
    }

    fn run(scene: &mut GaitViewerScene, input: &mut InputState, seconds: f32) {
        let frames = (seconds / DT).round() as usize;
        for _ in 0..frames {
            scene.update(DT, input);
            input.reset_current_frame();
        }
    }

    fn sequencer(scene: &GaitViewerScene) -> &gait::GaitSequencer {
        scene.controller().and_then(GaitController::sequencer).unwrap()
    }

    #[test]
    fn starts_idling_in_initial_gait() {
        let mut scene = scene(0.0);
        let mut input = InputState::default();
        run(&mut scene, &mut input, 0.5);

        let sequencer = sequencer(&scene);
        assert_eq!(sequencer.current_gait(), GaitState::Stand);
        assert_eq!(sequencer.selected_animation_name(), Some("stand"));
        assert!(!sequencer.is_transitioning());

        let mut frame = Frame::default();
        scene.render(&mut frame);
        assert_eq!(frame.lines(), ["gait stand | clip stand"]);
    }

    #[test]
    fn hotkey_moves_model_to_new_gait() {
        let mut scene = scene(0.0);
        let mut input = InputState::default();
        run(&mut scene, &mut input, 0.1);

        input.handle_key_event(GaitState::Walk.hotkey(), true);
        run(&mut scene, &mut input, DT);
        input.handle_key_event(GaitState::Walk.hotkey(), false);
        assert_eq!(sequencer(&scene).pending_target(), Some(GaitState::Walk));
        assert!(sequencer(&scene).is_waiting_for_loop_end());

        run(&mut scene, &mut input, 5.0);
        let sequencer = sequencer(&scene);
        assert_eq!(sequencer.current_gait(), GaitState::Walk);
        assert_eq!(sequencer.selected_animation_name(), Some("walk"));
        assert!(!sequencer.is_transitioning());
    }

    #[test]
    fn routes_through_intermediate_gaits() {
        let mut scene = scene(0.0);
        let mut input = InputState::default();
        run(&mut scene, &mut input, 0.1);

        scene.request_gait(GaitState::Sit);
        run(&mut scene, &mut input, 6.0);
        assert_eq!(sequencer(&scene).current_gait(), GaitState::Sit);

        scene.request_gait(GaitState::Gallop);
        run(&mut scene, &mut input, 10.0);
        assert_eq!(sequencer(&scene).current_gait(), GaitState::Gallop);
    }

    #[test]
    fn requests_during_loading_are_parked() {
        let mut scene = scene(0.5);
        let mut input = InputState::default();

        scene.request_gait(GaitState::Trot);
        run(&mut scene, &mut input, 0.25);
        assert!(!scene.controller().unwrap().is_ready());

        let mut frame = Frame::default();
        scene.render(&mut frame);
        assert_eq!(frame.lines(), ["loading clips, gait stand, parked trot"]);

        run(&mut scene, &mut input, 0.5);
        assert!(scene.controller().unwrap().is_ready());
        assert_eq!(sequencer(&scene).pending_target(), Some(GaitState::Trot));

        run(&mut scene, &mut input, 5.0);
        assert_eq!(sequencer(&scene).current_gait(), GaitState::Trot);
    }

    #[test]
    fn status_shows_transition_progress() {
        let mut scene = scene(0.0);
        let mut input = InputState::default();
        run(&mut scene, &mut input, 0.1);

        scene.request_gait(GaitState::Reach);
        // The stand loop is 2 seconds, the deferral fires 0.3 seconds before its end.
        run(&mut scene, &mut input, 1.8);

        let mut frame = Frame::default();
        scene.render(&mut frame);
        let status = &frame.lines()[0];
        assert!(status.starts_with("gait stand | clip stand_to_reach | transition 1/2"));
        assert!(status.contains("| fading from stand ("));
    }
}
