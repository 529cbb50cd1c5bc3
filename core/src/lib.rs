#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Veil simulation.
//!
//! This crate defines the message surface that connects drivers, the
//! authoritative world, and pure systems. Callers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! render consumers to react to. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of reserved rows at the top of every grid. The band hosts the HUD
/// and is excluded from placement and connectivity logic.
pub const HUD_ROWS: u32 = 3;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Euclidean distance between two cell centres.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Cardinal facing and movement directions available to entities.
///
/// Rows grow downward, so [`Direction::North`] points toward row zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in a fixed scan order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Clockwise-perpendicular direction, used when a full reversal must be
    /// substituted with a quarter turn.
    #[must_use]
    pub const fn perpendicular(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Cell reached by stepping once from `cell`, if it stays inside a grid
    /// of `columns` by `rows` cells.
    #[must_use]
    pub fn offset(self, cell: CellCoord, columns: u32, rows: u32) -> Option<CellCoord> {
        let (x, y) = match self {
            Direction::North => (Some(cell.x()), cell.y().checked_sub(1)),
            Direction::East => (cell.x().checked_add(1), Some(cell.y())),
            Direction::South => (Some(cell.x()), cell.y().checked_add(1)),
            Direction::West => (cell.x().checked_sub(1), Some(cell.y())),
        };
        match (x, y) {
            (Some(x), Some(y)) if x < columns && y < rows => Some(CellCoord::new(x, y)),
            _ => None,
        }
    }

    /// Direction of the single orthogonal step from `from` to `to`, if the
    /// two cells are adjacent.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        let column_diff = from.x().abs_diff(to.x());
        let row_diff = from.y().abs_diff(to.y());
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.x() > from.x() {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.y() > from.y() {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioural state of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Patrolling with no knowledge of the player.
    Idle,
    /// Heightened awareness. Declared for completeness; the stock planner
    /// never enters this state.
    Alert,
    /// Active pursuit of the last known player position. Permanent once
    /// entered.
    Chase,
}

/// The three collectible mask kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskKind {
    /// Easy-band mask; grants the pulse duration bonus.
    Yellow,
    /// Medium-band mask; reveals story notes on the map.
    Blue,
    /// Hard-band mask placed deep in the level.
    Red,
}

/// Procedural topology strategies available to the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyKind {
    /// Cellular-automata caves: organic, narrow, risky.
    Organic,
    /// Stamped city blocks: wide corridors and loops by construction.
    Block,
}

/// Generation knobs consumed by the world when building a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Topology strategy used for the wall layout.
    pub topology: TopologyKind,
    /// Cap on the number of enemies; the spawned count is
    /// `min(enemy_base_count, level - 1)`.
    pub enemy_base_count: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            topology: TopologyKind::Block,
            enemy_base_count: 24,
        }
    }
}

/// Narrative text attached to a story note.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteText {
    /// Text shown to the player, possibly cipher-mangled by a render layer.
    pub display: String,
    /// Raw reference text kept for comparison and decryption effects.
    pub reference: String,
}

impl NoteText {
    /// Creates note text where the display and reference strings match.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            display: text.clone(),
            reference: text,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards the current level and generates a fresh one.
    GenerateLevel {
        /// Number of grid columns.
        columns: u32,
        /// Number of grid rows, including the HUD band.
        rows: u32,
        /// One-based level number driving difficulty scaling.
        level: u32,
        /// Generation knobs for this level.
        config: LevelConfig,
        /// Narrative text for the level's story note, supplied by the story
        /// provider.
        note_text: NoteText,
    },
    /// Advances the simulation clock, updating the pulse and fog state.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Emits a vision pulse from the player's current position, replacing
    /// any active pulse.
    TriggerPulse,
    /// Requests that the player advance one cell in the given direction.
    StepPlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Clears an enemy's stun, consuming its turn for this tick.
    RecoverEnemy {
        /// Identifier of the stunned enemy.
        enemy: EnemyId,
    },
    /// Escalates an enemy into pursuit of the given player position.
    AlertEnemy {
        /// Identifier of the enemy entering pursuit.
        enemy: EnemyId,
        /// Player position observed at the moment of the alert.
        player: CellCoord,
    },
    /// Requests that an enemy advance one cell in the given direction.
    StepEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Rotates an enemy in place without moving it.
    FaceEnemy {
        /// Identifier of the enemy that turns.
        enemy: EnemyId,
        /// Facing the enemy adopts.
        facing: Direction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A fresh level finished generating and is ready for play.
    LevelGenerated {
        /// Number of grid columns.
        columns: u32,
        /// Number of grid rows.
        rows: u32,
        /// Level number the world now represents.
        level: u32,
        /// Number of enemies placed during generation.
        enemies: u32,
    },
    /// The exit band produced no candidate and the farthest reachable cell
    /// was used instead.
    ExitFallback {
        /// Cell the exit landed on.
        cell: CellCoord,
    },
    /// Even the fallback scan produced no exit; the level has none.
    ExitUnplaced,
    /// The simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A vision pulse started expanding from the given origin.
    PulseTriggered {
        /// Cell the pulse is centred on.
        origin: CellCoord,
        /// Radius at which the pulse stops expanding.
        max_radius: f32,
    },
    /// The active pulse reached its maximum radius and deactivated.
    PulseFaded,
    /// The player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after the move.
        to: CellCoord,
    },
    /// The player picked up a mask.
    MaskCollected {
        /// Kind of mask collected.
        kind: MaskKind,
        /// Cell the mask occupied.
        cell: CellCoord,
    },
    /// The player read a story note.
    NoteRead {
        /// Cell the note occupies.
        cell: CellCoord,
    },
    /// All three masks are held and the exit unlocked.
    ExitOpened,
    /// The player stepped onto the open exit.
    ExitReached,
    /// An enemy transitioned into pursuit.
    EnemyAlerted {
        /// Identifier of the alerted enemy.
        enemy: EnemyId,
        /// Player position recorded as the pursuit target.
        player: CellCoord,
    },
    /// An enemy moved between two cells.
    EnemyMoved {
        /// Identifier of the enemy that advanced.
        enemy: EnemyId,
        /// Cell the enemy occupied before moving.
        from: CellCoord,
        /// Cell the enemy occupies after the move.
        to: CellCoord,
    },
    /// An enemy rotated in place.
    EnemyTurned {
        /// Identifier of the enemy that turned.
        enemy: EnemyId,
        /// Facing the enemy adopted.
        facing: Direction,
    },
    /// A moving enemy ran into another; both are stunned and neither moved.
    EnemiesCollided {
        /// Enemy whose step caused the contact.
        mover: EnemyId,
        /// Enemy already occupying the contested cell.
        occupant: EnemyId,
        /// The contested cell.
        cell: CellCoord,
    },
    /// A stunned enemy shook off its stun and lost the tick.
    EnemyRecovered {
        /// Identifier of the recovered enemy.
        enemy: EnemyId,
    },
}
