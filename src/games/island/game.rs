//=========================================================================
// Game
//=========================================================================
//
// The island at sea. Per tick:
//
//   pause key → steer local boat → network sync → visual systems
//             → Sprite3D pass → DrawList + SceneView resources
//
// The scene keeps running under the transparent Pause overlay so the
// networked world does not stall; only steering stops.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::f32::consts::TAU;

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::{actions, fail, IslandAction, IslandScene, Paused, Session};
use crate::components::{Sprite, Transform2D};
use crate::config::{KeyBindings, PlayerConfig};
use crate::core::ecs::{Entity, World};
use crate::core::input::InputContext;
use crate::core::memory::MatrixPool;
use crate::core::scene::{Scene, SceneTransition};
use crate::core::{EngineCommand, GlobalContext, Viewport};
use crate::net::{NetError, Packet, PlayerId};
use crate::render::{DrawList, Sprite3D, Sprite3DSystem};
use crate::systems::{
    AudioEmitter, AudioSystem, Camera3D, CameraSystem, DayNightCycle, Foliage, FoliageSystem, Lighting, Mixer,
    MixerChannel, ShadowCaster, ShadowSystem, Wave, WaveSpawner, WaveSystem, Wind,
};

//=== Constants ===========================================================

const ISLAND_RADIUS: f32 = 6.0;
const BOAT_RADIUS: f32 = 0.8;
const SEA_RADIUS: f32 = 30.0;
const START_RING: f32 = 11.0;
const PALM_COUNT: usize = 5;

const SAIL_SPEED: f32 = 5.0;
const TURN_SPEED: f32 = 2.4;
const BEACHING_TRAUMA: f32 = 0.5;

/// Seconds between PlayerUpdate packets.
const SEND_INTERVAL: f32 = 0.1;

const DAY_LENGTH: f32 = 240.0;
const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 14.0, 10.0);
const FOV_Y: f32 = 0.8;
const NEAR: f32 = 0.1;
const FAR: f32 = 200.0;

//=== SceneView ===========================================================

/// Camera and light state for the renderer, refreshed every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    pub view: Mat4,
    pub projection: Mat4,
    pub lighting: Lighting,
}

//=== Voyage ==============================================================

/// Everything one game round owns. Rebuilt on every enter.
struct Voyage {
    player_id: PlayerId,
    keys: KeyBindings,
    local_boat: Entity,
    camera: Entity,
    remote: HashMap<PlayerId, Entity>,
    owned: Vec<Entity>,
    aground: bool,
    send_timer: f32,

    day_night: DayNightCycle,
    wind: Wind,
    spawner: WaveSpawner,
    sprites: Sprite3DSystem,
    foliage: FoliageSystem,
    waves: WaveSystem,
    shadows: ShadowSystem,
    cameras: CameraSystem,
    audio: AudioSystem,
}

impl Voyage {
    fn build(context: &mut GlobalContext) -> Self {
        let (player_id, seed, roster) = match context.resources.get::<Session>() {
            Some(session) => (session.player_id(), session.seed().unwrap_or(0), session.roster().to_vec()),
            None => (0, 0, Vec::new()),
        };
        let keys = context
            .resources
            .get::<PlayerConfig>()
            .map(|c| c.keybinds.clone())
            .unwrap_or_default();

        let world = &mut context.world;
        let matrices = &mut context.matrices;
        let mut owned = Vec::new();

        //--- Island -------------------------------------------------------

        owned.push(
            world
                .build()
                .with(Transform2D::default())
                .with(Sprite::new("island", Vec2::splat(ISLAND_RADIUS * 2.0)))
                .with(Sprite3D::allocate(matrices, 0.0, false))
                .with(AudioEmitter::new("surf", MixerChannel::Ambience).looping().with_range(ISLAND_RADIUS, 0.5))
                .id(),
        );
        owned.push(world.build().with(AudioEmitter::new("shanty", MixerChannel::Music).looping()).id());

        for i in 0..PALM_COUNT {
            let angle = i as f32 / PALM_COUNT as f32 * TAU;
            let palm = world
                .build()
                .with(Transform2D::at(Vec2::from_angle(angle) * ISLAND_RADIUS * 0.55).with_origin(Vec2::new(0.0, 1.5)))
                .with(Sprite::new("palm", Vec2::new(1.5, 3.0)))
                .with(Sprite3D::allocate(matrices, 1.5, true))
                .with(Foliage {
                    base_rotation: 0.0,
                    amplitude: 0.15,
                    frequency: 1.2 + i as f32 * 0.1,
                    phase: angle,
                })
                .id();
            owned.push(palm);
            owned.push(spawn_shadow(world, matrices, palm, Vec2::new(1.5, 0.8)));
        }

        //--- Boats --------------------------------------------------------

        let slots = roster.len().max(1);
        let slot_of = |id: PlayerId| roster.iter().position(|p| p.id == id).unwrap_or(0);

        let (position, rotation) = start_pose(slot_of(player_id), slots);
        let local_boat = spawn_boat(world, matrices, position, rotation, &mut owned);

        let mut remote = HashMap::new();
        for player in roster.iter().filter(|p| p.id != player_id) {
            let (position, rotation) = start_pose(slot_of(player.id), slots);
            remote.insert(player.id, spawn_boat(world, matrices, position, rotation, &mut owned));
        }

        //--- Camera -------------------------------------------------------

        let mut camera3d = Camera3D::new(CAMERA_OFFSET).following(local_boat);
        camera3d.snap_to(position);
        let camera = world.build().with(camera3d).id();
        owned.push(camera);

        info!("Voyage built: seed {}, {} boats, player {}", seed, remote.len() + 1, player_id);

        Self {
            player_id,
            keys,
            local_boat,
            camera,
            remote,
            owned,
            aground: false,
            send_timer: 0.0,
            day_night: DayNightCycle::new(DAY_LENGTH).with_time_of_day(0.3),
            wind: Wind::default(),
            spawner: WaveSpawner::new(seed, Vec2::ZERO, ISLAND_RADIUS + 1.0, ISLAND_RADIUS + 4.0),
            sprites: Sprite3DSystem::new(),
            foliage: FoliageSystem::new(),
            waves: WaveSystem::new(),
            shadows: ShadowSystem::new(),
            cameras: CameraSystem::new(),
            audio: AudioSystem::new(),
        }
    }

    //--- Steering ---------------------------------------------------------

    fn steer(&mut self, context: &mut GlobalContext, dt: f32) {
        let input = &context.input_state;
        let turn = input.axis(self.keys.right, self.keys.left);
        let thrust = input.axis(self.keys.down, self.keys.up);

        let Some(transform) = context.world.get_mut::<Transform2D>(self.local_boat) else {
            return;
        };
        transform.rotation += turn * TURN_SPEED * dt;
        transform.position += transform.forward() * thrust * SAIL_SPEED * dt;
        transform.position = transform.position.clamp_length_max(SEA_RADIUS);

        let shore = ISLAND_RADIUS + BOAT_RADIUS;
        let beached = transform.position.length() < shore;
        if beached {
            transform.position = transform.position.try_normalize().unwrap_or(Vec2::Y) * shore;
        }

        if beached && !self.aground {
            debug!("Boat ran aground");
            if let Some(camera) = context.world.get_mut::<Camera3D>(self.camera) {
                camera.add_trauma(BEACHING_TRAUMA);
            }
        }
        self.aground = beached;
    }

    //--- Network ----------------------------------------------------------

    fn sync_network(&mut self, context: &mut GlobalContext, dt: f32) -> Result<(), String> {
        let Some(session) = context.resources.get_mut::<Session>() else {
            return Ok(());
        };
        let lost = |e: NetError| match e {
            NetError::Disconnected => "The server closed the game".to_string(),
            e => format!("Lost connection: {}", e),
        };

        let packets = session.poll().map_err(lost)?;

        self.send_timer += dt;
        if self.send_timer >= SEND_INTERVAL {
            self.send_timer = 0.0;
            if let Some(t) = context.world.get::<Transform2D>(self.local_boat) {
                let update = Packet::PlayerUpdate {
                    id: self.player_id,
                    x: t.position.x,
                    y: t.position.y,
                    rotation: t.rotation,
                };
                session.send(&update).map_err(lost)?;
            }
        }

        let world = &mut context.world;
        for packet in packets {
            match packet {
                Packet::PlayerUpdate { id, x, y, rotation } if id != self.player_id => {
                    let known = self.remote.get(&id).copied().filter(|&boat| world.is_alive(boat));
                    let boat = match known {
                        Some(boat) => boat,
                        None => {
                            let boat = spawn_boat(world, &mut context.matrices, Vec2::new(x, y), rotation, &mut self.owned);
                            self.remote.insert(id, boat);
                            boat
                        }
                    };
                    if let Some(t) = world.get_mut::<Transform2D>(boat) {
                        t.position = Vec2::new(x, y);
                        t.rotation = rotation;
                    }
                }
                Packet::LobbyState { players } => {
                    self.remote.retain(|id, boat| {
                        let present = players.iter().any(|p| p.id == *id);
                        if !present {
                            info!("Player {} left the game", id);
                            world.destroy(*boat);
                        }
                        present
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    //--- Systems ----------------------------------------------------------

    fn run_systems(&mut self, context: &mut GlobalContext, dt: f32) {
        let lighting = self.day_night.update(dt);
        let world = &mut context.world;

        self.foliage.update(world, context.time.elapsed, self.wind);
        self.spawner.update(world, &mut context.matrices, dt);
        self.waves.update(world, dt);
        self.shadows.update(world, &lighting);
        self.cameras.update(world, dt);

        let camera = world.get::<Camera3D>(self.camera).cloned();
        let listener = camera.as_ref().map_or(Vec2::ZERO, |c| c.focus().truncate());
        let mixer = context.resources.get_or_default::<Mixer>();
        self.audio.update(world, mixer, listener);

        let draw_list = context.resources.get_or_default::<DrawList>();
        self.sprites.update(world, &mut context.matrices, draw_list);

        let aspect = context.resources.get::<Viewport>().map_or(16.0 / 9.0, Viewport::aspect);
        context.resources.insert(SceneView {
            view: camera.map_or(Mat4::IDENTITY, |c| c.view_matrix()),
            projection: Mat4::perspective_rh(FOV_Y, aspect, NEAR, FAR),
            lighting,
        });
    }

    fn teardown(mut self, world: &mut World) {
        for entity in self.owned.drain(..) {
            world.destroy(entity);
        }
        for wave in world.entities_with::<Wave>() {
            world.destroy(wave);
        }
    }
}

//=== Spawning ============================================================

/// Evenly spaced on the start ring, bow pointing along the ring.
fn start_pose(slot: usize, slots: usize) -> (Vec2, f32) {
    let angle = slot as f32 / slots as f32 * TAU;
    (Vec2::from_angle(angle) * START_RING, angle)
}

fn spawn_boat(
    world: &mut World,
    matrices: &mut MatrixPool,
    position: Vec2,
    rotation: f32,
    owned: &mut Vec<Entity>,
) -> Entity {
    let boat = world
        .build()
        .with(Transform2D::at(position).with_rotation(rotation))
        .with(Sprite::new("boat", Vec2::new(1.6, 2.4)))
        .with(Sprite3D::allocate(matrices, 0.4, true))
        .with(AudioEmitter::new("creak", MixerChannel::Effects).looping().with_range(2.0, 1.0))
        .id();
    owned.push(boat);
    owned.push(spawn_shadow(world, matrices, boat, Vec2::new(1.8, 1.0)));
    boat
}

fn spawn_shadow(world: &mut World, matrices: &mut MatrixPool, parent: Entity, size: Vec2) -> Entity {
    let position = world.get::<Transform2D>(parent).map_or(Vec2::ZERO, |t| t.position);
    world
        .build()
        .with(Transform2D::at(position))
        .with(Sprite::new("shadow", size).with_tint(Vec4::new(0.0, 0.0, 0.0, 0.5)))
        .with(Sprite3D::allocate(matrices, 0.01, false))
        .with(ShadowCaster::new(parent))
        .id()
}

//=== GameScene ===========================================================

pub(crate) struct GameScene {
    voyage: Option<Voyage>,
}

impl GameScene {
    pub(crate) fn new() -> Self {
        Self { voyage: None }
    }
}

impl Scene<IslandScene> for GameScene {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        context
            .message_bus
            .push(EngineCommand::SetInputContext(InputContext::Primary));
        context.resources.insert(Paused(false));
        self.voyage = Some(Voyage::build(context));
    }

    fn on_exit(&mut self, context: &mut GlobalContext) {
        if let Some(voyage) = self.voyage.take() {
            voyage.teardown(&mut context.world);
        }
        context.resources.get_or_default::<DrawList>().clear();
        context.resources.remove::<SceneView>();
    }

    fn update(&mut self, context: &mut GlobalContext) {
        let Some(voyage) = self.voyage.as_mut() else {
            return;
        };
        let dt = context.time.delta;

        if actions(context).contains(&IslandAction::Pause) {
            context.message_bus.push(SceneTransition::Push(IslandScene::Pause));
        }

        let paused = context.resources.get::<Paused>().is_some_and(|p| p.0);
        if !paused {
            voyage.steer(context, dt);
        }

        if let Err(message) = voyage.sync_network(context, dt) {
            fail(context, message);
            return;
        }

        voyage.run_systems(context, dt);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
