#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for the stealth maze.
//!
//! The world owns the level grid, the player, the pulse, and every enemy and
//! collectible. All mutation flows through [`apply`], which consumes
//! [`Command`]s and appends the resulting [`Event`]s; systems observe those
//! events and read state back through [`query`] views only.

use std::time::Duration;

use rand::Rng;
use veil_core::{
    CellCoord, Command, Direction, EnemyId, EnemyState, Event, LevelConfig, MaskKind, NoteText,
    HUD_ROWS,
};

mod distance_field;
mod grid;
mod placement;
mod topology;
mod vision;

pub use grid::{Cell, CellGrid};
pub use vision::Pulse;

use distance_field::DistanceField;

/// Number of narrative note slots tracked on the player.
pub const STORY_NOTE_SLOTS: usize = 10;

/// Base radius of the player's ambient vision, in cells.
pub const DEFAULT_VISION_RADIUS: f32 = 2.0;

/// Pulse duration bonus granted by the yellow mask. Carried state for
/// pacing consumers; the pulse radius itself stays a fixed multiple of the
/// vision radius.
pub const YELLOW_PULSE_BONUS: f32 = 2.0;

/// The player avatar and everything it carries.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    cell: CellCoord,
    vision_radius: f32,
    pulse_duration_bonus: f32,
    has_yellow_mask: bool,
    has_blue_mask: bool,
    has_red_mask: bool,
    found_story_notes: [bool; STORY_NOTE_SLOTS],
}

impl Player {
    fn at(cell: CellCoord) -> Self {
        Self {
            cell,
            vision_radius: DEFAULT_VISION_RADIUS,
            pulse_duration_bonus: 0.0,
            has_yellow_mask: false,
            has_blue_mask: false,
            has_red_mask: false,
            found_story_notes: [false; STORY_NOTE_SLOTS],
        }
    }

    fn has_all_masks(&self) -> bool {
        self.has_yellow_mask && self.has_blue_mask && self.has_red_mask
    }
}

/// A collectible mask lying on the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mask {
    kind: MaskKind,
    cell: CellCoord,
    collected: bool,
    revealed: bool,
}

impl Mask {
    /// Which of the three masks this is.
    #[must_use]
    pub const fn kind(&self) -> MaskKind {
        self.kind
    }

    /// Cell the mask occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Whether the player already holds this mask.
    #[must_use]
    pub const fn collected(&self) -> bool {
        self.collected
    }

    /// Whether render layers may show the mask through fog.
    #[must_use]
    pub const fn revealed(&self) -> bool {
        self.revealed
    }
}

/// A readable story note placed on the level.
#[derive(Clone, Debug, PartialEq)]
pub struct StoryNote {
    cell: CellCoord,
    text: NoteText,
    read: bool,
    revealed: bool,
    tutorial: bool,
}

impl StoryNote {
    /// Cell the note occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Narrative text carried by the note.
    #[must_use]
    pub const fn text(&self) -> &NoteText {
        &self.text
    }

    /// Whether the player already read this note.
    #[must_use]
    pub const fn read(&self) -> bool {
        self.read
    }

    /// Whether render layers may show the note through fog.
    #[must_use]
    pub const fn revealed(&self) -> bool {
        self.revealed
    }

    /// Whether this is the spawn-side tutorial note rather than a narrative
    /// one.
    #[must_use]
    pub const fn tutorial(&self) -> bool {
        self.tutorial
    }
}

/// The level exit. Locked until the player holds all three masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exit {
    cell: CellCoord,
    open: bool,
    revealed: bool,
}

impl Exit {
    /// Cell the exit occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Whether the exit accepts the player.
    #[must_use]
    pub const fn open(&self) -> bool {
        self.open
    }

    /// Whether render layers may show the exit through fog.
    #[must_use]
    pub const fn revealed(&self) -> bool {
        self.revealed
    }
}

/// A patrolling or pursuing enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Enemy {
    id: EnemyId,
    cell: CellCoord,
    facing: Direction,
    state: EnemyState,
    last_known_player: Option<CellCoord>,
    stunned: bool,
}

impl Enemy {
    /// Stable identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Cell the enemy occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Direction the enemy currently faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Behavioural state of the enemy.
    #[must_use]
    pub const fn state(&self) -> EnemyState {
        self.state
    }

    /// Player position recorded at the most recent alert, if any.
    #[must_use]
    pub const fn last_known_player(&self) -> Option<CellCoord> {
        self.last_known_player
    }

    /// Whether the enemy loses its next turn to a collision stun.
    #[must_use]
    pub const fn stunned(&self) -> bool {
        self.stunned
    }
}

/// Dense map from cells to the enemy standing on them.
#[derive(Clone, Debug, Default)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    occupants: Vec<Option<EnemyId>>,
}

impl OccupancyGrid {
    fn from_enemies(columns: u32, rows: u32, enemies: &[Enemy]) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut grid = Self {
            columns,
            rows,
            occupants: vec![None; capacity],
        };
        for enemy in enemies {
            grid.occupy(enemy.cell, enemy.id);
        }
        grid
    }

    fn occupant(&self, cell: CellCoord) -> Option<EnemyId> {
        self.index(cell).and_then(|index| self.occupants[index])
    }

    fn occupy(&mut self, cell: CellCoord, enemy: EnemyId) {
        if let Some(index) = self.index(cell) {
            self.occupants[index] = Some(enemy);
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.occupants[index] = None;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.columns && cell.y() < self.rows {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Authoritative state for one level of play.
#[derive(Clone, Debug, Default)]
pub struct World {
    columns: u32,
    rows: u32,
    level: u32,
    config: LevelConfig,
    cells: CellGrid,
    player: Option<Player>,
    pulse: Option<Pulse>,
    enemies: Vec<Enemy>,
    masks: Vec<Mask>,
    notes: Vec<StoryNote>,
    exit: Option<Exit>,
    occupancy: OccupancyGrid,
}

impl World {
    /// Creates an empty world with no level. Apply
    /// [`Command::GenerateLevel`] before anything else.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Applies a command to the world, appending the events it produced.
///
/// The RNG drives level generation only; every other command is
/// deterministic.
pub fn apply<R: Rng>(world: &mut World, command: Command, rng: &mut R, out_events: &mut Vec<Event>) {
    match command {
        Command::GenerateLevel {
            columns,
            rows,
            level,
            config,
            note_text,
        } => generate_level(world, columns, rows, level, config, note_text, rng, out_events),
        Command::Tick { dt } => tick(world, dt, out_events),
        Command::TriggerPulse => vision::trigger_pulse(world, out_events),
        Command::StepPlayer { direction } => step_player(world, direction, out_events),
        Command::RecoverEnemy { enemy } => recover_enemy(world, enemy, out_events),
        Command::AlertEnemy { enemy, player } => alert_enemy(world, enemy, player, out_events),
        Command::StepEnemy { enemy, direction } => step_enemy(world, enemy, direction, out_events),
        Command::FaceEnemy { enemy, facing } => face_enemy(world, enemy, facing, out_events),
    }
}

#[allow(clippy::too_many_arguments)]
fn generate_level<R: Rng>(
    world: &mut World,
    columns: u32,
    rows: u32,
    level: u32,
    config: LevelConfig,
    note_text: NoteText,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) {
    world.columns = columns;
    world.rows = rows;
    world.level = level;
    world.config = config;
    world.pulse = None;
    world.enemies.clear();
    world.masks.clear();
    world.notes.clear();
    world.exit = None;

    world.cells = topology::generate(columns, rows, config.topology, rng);
    if columns == 0 || rows <= HUD_ROWS {
        world.player = None;
        world.occupancy = OccupancyGrid::from_enemies(columns, rows, &[]);
        out_events.push(Event::ExitUnplaced);
        out_events.push(Event::LevelGenerated {
            columns,
            rows,
            level,
            enemies: 0,
        });
        return;
    }

    let spawn = CellCoord::new(columns / 2, HUD_ROWS + (rows - HUD_ROWS) / 2);
    placement::clear_spawn_area(&mut world.cells, spawn);

    let mut field = DistanceField::default();
    field.rebuild_with(columns, rows, spawn, |cell| world.cells.is_wall(cell));
    let _ = placement::fill_islands(&mut world.cells, &field);

    world.player = Some(Player::at(spawn));

    for (kind, min_fraction, max_fraction) in [
        (MaskKind::Yellow, 0.2, 0.4),
        (MaskKind::Blue, 0.4, 0.6),
        (MaskKind::Red, 0.8, 0.95),
    ] {
        if let Some(cell) = placement::find_cell_in_band(&field, min_fraction, max_fraction, rng) {
            world.masks.push(Mask {
                kind,
                cell,
                collected: false,
                // The yellow mask shows through fog from level two onward.
                revealed: kind == MaskKind::Yellow && level != 1,
            });
        }
    }

    if let Some(cell) = placement::find_cell_in_band(&field, 0.6, 0.8, rng) {
        world.notes.push(StoryNote {
            cell,
            text: note_text,
            read: false,
            revealed: false,
            tutorial: false,
        });
    }

    match placement::find_cell_in_band(&field, 0.95, 1.0, rng) {
        Some(cell) => {
            world.exit = Some(Exit {
                cell,
                open: false,
                revealed: false,
            });
        }
        None => match placement::farthest_cell(&field) {
            Some(cell) => {
                world.exit = Some(Exit {
                    cell,
                    open: false,
                    revealed: false,
                });
                out_events.push(Event::ExitFallback { cell });
            }
            None => out_events.push(Event::ExitUnplaced),
        },
    }

    let enemy_count = config.enemy_base_count.min(level.saturating_sub(1));
    for (index, cell) in placement::enemy_spawn_cells(&field, enemy_count, rng)
        .into_iter()
        .enumerate()
    {
        world.enemies.push(Enemy {
            id: EnemyId::new(index as u32),
            cell,
            facing: Direction::ALL[rng.gen_range(0..Direction::ALL.len())],
            state: EnemyState::Idle,
            last_known_player: None,
            stunned: false,
        });
    }

    if level == 1 {
        world.notes.push(StoryNote {
            cell: spawn,
            text: NoteText::default(),
            read: false,
            revealed: true,
            tutorial: true,
        });
    }

    world.occupancy = OccupancyGrid::from_enemies(columns, rows, &world.enemies);
    out_events.push(Event::LevelGenerated {
        columns,
        rows,
        level,
        enemies: world.enemies.len() as u32,
    });
}

fn tick(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    out_events.push(Event::TimeAdvanced { dt });
    vision::update(world, dt, out_events);
}

fn step_player(world: &mut World, direction: Direction, out_events: &mut Vec<Event>) {
    let Some(from) = world.player.as_ref().map(|player| player.cell) else {
        return;
    };
    let Some(to) = direction.offset(from, world.columns, world.rows) else {
        return;
    };
    if world.cells.is_wall(to) {
        return;
    }
    if let Some(player) = world.player.as_mut() {
        player.cell = to;
    }
    out_events.push(Event::PlayerMoved { from, to });

    collect_mask(world, to, out_events);
    read_note(world, to, out_events);

    if let Some(exit) = &world.exit {
        if exit.cell == to && exit.open {
            out_events.push(Event::ExitReached);
        }
    }
}

fn collect_mask(world: &mut World, cell: CellCoord, out_events: &mut Vec<Event>) {
    let Some(index) = world
        .masks
        .iter()
        .position(|mask| mask.cell == cell && !mask.collected)
    else {
        return;
    };
    let kind = {
        let mask = &mut world.masks[index];
        mask.collected = true;
        mask.revealed = true;
        mask.kind
    };

    match kind {
        MaskKind::Yellow => {
            if let Some(player) = world.player.as_mut() {
                player.has_yellow_mask = true;
                player.pulse_duration_bonus += YELLOW_PULSE_BONUS;
            }
        }
        MaskKind::Blue => {
            if let Some(player) = world.player.as_mut() {
                player.has_blue_mask = true;
            }
            for note in &mut world.notes {
                if !note.read {
                    note.revealed = true;
                }
            }
        }
        MaskKind::Red => {
            if let Some(player) = world.player.as_mut() {
                player.has_red_mask = true;
            }
        }
    }
    out_events.push(Event::MaskCollected { kind, cell });

    let all_masks = world
        .player
        .as_ref()
        .is_some_and(Player::has_all_masks);
    if all_masks {
        if let Some(exit) = world.exit.as_mut() {
            if !exit.open {
                exit.open = true;
                exit.revealed = true;
                out_events.push(Event::ExitOpened);
            }
        }
    }
}

fn read_note(world: &mut World, cell: CellCoord, out_events: &mut Vec<Event>) {
    let Some(index) = world
        .notes
        .iter()
        .position(|note| note.cell == cell && !note.read)
    else {
        return;
    };
    let tutorial = {
        let note = &mut world.notes[index];
        note.read = true;
        note.revealed = true;
        note.tutorial
    };

    if !tutorial {
        if let Some(slot) = world.level.checked_sub(1) {
            if let Some(player) = world.player.as_mut() {
                if let Some(flag) = player.found_story_notes.get_mut(slot as usize) {
                    *flag = true;
                }
            }
        }
    }
    out_events.push(Event::NoteRead { cell });
}

fn recover_enemy(world: &mut World, enemy: EnemyId, out_events: &mut Vec<Event>) {
    if let Some(found) = world.enemies.iter_mut().find(|e| e.id == enemy) {
        if found.stunned {
            found.stunned = false;
            out_events.push(Event::EnemyRecovered { enemy });
        }
    }
}

fn alert_enemy(world: &mut World, enemy: EnemyId, player: CellCoord, out_events: &mut Vec<Event>) {
    if let Some(found) = world.enemies.iter_mut().find(|e| e.id == enemy) {
        let was_chasing = found.state == EnemyState::Chase;
        found.state = EnemyState::Chase;
        found.last_known_player = Some(player);
        if !was_chasing {
            out_events.push(Event::EnemyAlerted { enemy, player });
        }
    }
}

fn step_enemy(world: &mut World, enemy: EnemyId, direction: Direction, out_events: &mut Vec<Event>) {
    let Some(index) = world.enemies.iter().position(|e| e.id == enemy) else {
        return;
    };
    // A stun earlier in the same batch silently cancels the step.
    if world.enemies[index].stunned {
        return;
    }
    let from = world.enemies[index].cell;
    let Some(to) = direction.offset(from, world.columns, world.rows) else {
        return;
    };
    if world.cells.is_wall(to) {
        return;
    }
    if let Some(occupant) = world.occupancy.occupant(to) {
        if occupant != enemy {
            world.enemies[index].stunned = true;
            if let Some(other) = world.enemies.iter_mut().find(|e| e.id == occupant) {
                other.stunned = true;
            }
            out_events.push(Event::EnemiesCollided {
                mover: enemy,
                occupant,
                cell: to,
            });
        }
        return;
    }
    world.occupancy.vacate(from);
    world.occupancy.occupy(to, enemy);
    world.enemies[index].cell = to;
    out_events.push(Event::EnemyMoved { enemy, from, to });
}

fn face_enemy(world: &mut World, enemy: EnemyId, facing: Direction, out_events: &mut Vec<Event>) {
    if let Some(found) = world.enemies.iter_mut().find(|e| e.id == enemy) {
        if found.stunned {
            return;
        }
        found.facing = facing;
        out_events.push(Event::EnemyTurned { enemy, facing });
    }
}

/// Read-only views over the world for systems and render layers.
pub mod query {
    use veil_core::{CellCoord, Direction, EnemyId, EnemyState};

    use crate::grid::CellGrid;
    use crate::{Enemy, Exit, Mask, OccupancyGrid, StoryNote, World, STORY_NOTE_SLOTS};

    /// Immutable view of the wall layout.
    #[derive(Clone, Copy, Debug)]
    pub struct TerrainView<'a> {
        grid: &'a CellGrid,
    }

    impl TerrainView<'_> {
        /// Whether the cell blocks movement. Out-of-bounds cells count as
        /// walls.
        #[must_use]
        pub fn is_wall(&self, cell: CellCoord) -> bool {
            self.grid.is_wall(cell)
        }

        /// Grid dimensions as `(columns, rows)`.
        #[must_use]
        pub fn dimensions(&self) -> (u32, u32) {
            (self.grid.columns(), self.grid.rows())
        }
    }

    /// Borrows the terrain view.
    #[must_use]
    pub fn terrain(world: &World) -> TerrainView<'_> {
        TerrainView { grid: &world.cells }
    }

    /// Immutable view of which enemy stands on which cell.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        grid: &'a OccupancyGrid,
    }

    impl OccupancyView<'_> {
        /// The enemy standing on the cell, if any.
        #[must_use]
        pub fn occupant(&self, cell: CellCoord) -> Option<EnemyId> {
            self.grid.occupant(cell)
        }
    }

    /// Borrows the occupancy view.
    #[must_use]
    pub fn occupancy(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            grid: &world.occupancy,
        }
    }

    /// Point-in-time copy of one enemy's observable state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EnemySnapshot {
        /// Stable identifier of the enemy.
        pub id: EnemyId,
        /// Cell the enemy occupies.
        pub cell: CellCoord,
        /// Direction the enemy faces.
        pub facing: Direction,
        /// Behavioural state of the enemy.
        pub state: EnemyState,
        /// Player position recorded at the most recent alert.
        pub last_known_player: Option<CellCoord>,
        /// Whether the enemy loses its next turn to a collision stun.
        pub stunned: bool,
    }

    /// Snapshots of every enemy, ordered by identifier.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterates the snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of enemies in the view.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Whether the view holds no enemies.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }
    }

    /// Snapshots every enemy, ordered by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy: &Enemy| EnemySnapshot {
                id: enemy.id,
                cell: enemy.cell,
                facing: enemy.facing,
                state: enemy.state,
                last_known_player: enemy.last_known_player,
                stunned: enemy.stunned,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id.get());
        EnemyView { snapshots }
    }

    /// Point-in-time copy of the player's observable state.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Cell the player occupies.
        pub cell: CellCoord,
        /// Base radius of ambient vision, in cells.
        pub vision_radius: f32,
        /// Pulse duration bonus from the yellow mask.
        pub pulse_duration_bonus: f32,
        /// Whether the yellow mask is held.
        pub has_yellow_mask: bool,
        /// Whether the blue mask is held.
        pub has_blue_mask: bool,
        /// Whether the red mask is held.
        pub has_red_mask: bool,
        /// Which narrative notes have been read, by level slot.
        pub found_story_notes: [bool; STORY_NOTE_SLOTS],
    }

    /// Snapshots the player, or `None` before the first level generates.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world.player.as_ref().map(|player| PlayerSnapshot {
            cell: player.cell,
            vision_radius: player.vision_radius,
            pulse_duration_bonus: player.pulse_duration_bonus,
            has_yellow_mask: player.has_yellow_mask,
            has_blue_mask: player.has_blue_mask,
            has_red_mask: player.has_red_mask,
            found_story_notes: player.found_story_notes,
        })
    }

    /// Point-in-time copy of the pulse state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PulseSnapshot {
        /// Cell the pulse expands from.
        pub origin: CellCoord,
        /// Current radius of the expanding front, in cells.
        pub current_radius: f32,
        /// Radius at which the pulse stops expanding.
        pub max_radius: f32,
        /// Whether the front is still expanding.
        pub active: bool,
    }

    /// Snapshots the pulse, if one has ever been triggered this level.
    #[must_use]
    pub fn pulse(world: &World) -> Option<PulseSnapshot> {
        world.pulse.as_ref().map(|pulse| PulseSnapshot {
            origin: pulse.origin,
            current_radius: pulse.current_radius,
            max_radius: pulse.max_radius,
            active: pulse.active,
        })
    }

    /// Borrows the cell grid for fog and terrain rendering.
    #[must_use]
    pub fn cells(world: &World) -> &CellGrid {
        &world.cells
    }

    /// Borrows the level's masks.
    #[must_use]
    pub fn masks(world: &World) -> &[Mask] {
        &world.masks
    }

    /// Borrows the level's story notes.
    #[must_use]
    pub fn notes(world: &World) -> &[StoryNote] {
        &world.notes
    }

    /// Borrows the level's exit, if one was placed.
    #[must_use]
    pub fn exit(world: &World) -> Option<&Exit> {
        world.exit.as_ref()
    }

    /// One-based number of the current level, zero before generation.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Generation knobs the current level was built with.
    #[must_use]
    pub fn config(world: &World) -> veil_core::LevelConfig {
        world.config
    }
}
