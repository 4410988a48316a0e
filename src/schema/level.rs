//! Level representations: a dense cell grid and a sparse list of rooms.

use serde::{Deserialize, Serialize};

/// Integer cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Contents of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Door,
    Enemy,
    Treasure,
    Start,
    End,
}

impl Cell {
    /// Character used when drawing the level.
    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Door => '-',
            Cell::Enemy => 'E',
            Cell::Treasure => 'T',
            Cell::Start => 'S',
            Cell::End => 'F',
        }
    }

    /// Whether a path may step onto this cell. Enemies do not block movement.
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall | Cell::Treasure | Cell::Door)
    }
}

/// Dense square grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGridLevel")]
pub struct GridLevel {
    size: usize,
    cells: Vec<Cell>,
}

/// Unchecked serialized form of [`GridLevel`].
#[derive(Deserialize)]
struct RawGridLevel {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGridLevel> for GridLevel {
    type Error = String;

    fn try_from(raw: RawGridLevel) -> Result<Self, Self::Error> {
        if raw.cells.len() != raw.size * raw.size {
            return Err(format!(
                "grid of size {} needs {} cells, got {}",
                raw.size,
                raw.size * raw.size,
                raw.cells.len()
            ));
        }
        Ok(Self {
            size: raw.size,
            cells: raw.cells,
        })
    }
}

impl GridLevel {
    /// Create an all-empty grid.
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }

    #[inline]
    fn index(&self, pos: Coord) -> usize {
        pos.y as usize * self.size + pos.x as usize
    }

    /// Cell at `pos`. Panics if `pos` is out of bounds.
    #[inline]
    pub fn get(&self, pos: Coord) -> Cell {
        self.cells[self.index(pos)]
    }

    #[inline]
    pub fn set(&mut self, pos: Coord, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    /// Iterate all cells with their coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        let size = self.size;
        self.cells.iter().enumerate().map(move |(i, &cell)| {
            let pos = Coord::new((i % size) as i32, (i / size) as i32);
            (pos, cell)
        })
    }

    /// Number of cells holding `kind`.
    pub fn count(&self, kind: Cell) -> usize {
        self.cells.iter().filter(|&&cell| cell == kind).count()
    }
}

/// Axis-aligned room with explicit enemy and treasure positions.
///
/// The rectangle spans `[x, x + width] × [y, y + height]`; its outline is the
/// wall and entities live strictly inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub enemies: Vec<Coord>,
    #[serde(default)]
    pub treasures: Vec<Coord>,
}

impl Room {
    /// Create a room without entities.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            enemies: Vec::new(),
            treasures: Vec::new(),
        }
    }

    #[inline]
    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Open interior test: points on the outline are outside.
    #[inline]
    pub fn contains_point(&self, p: Coord) -> bool {
        self.x < p.x && p.x < self.x + self.width && self.y < p.y && p.y < self.y + self.height
    }

    /// Whether `p` lies on the room outline.
    pub fn is_margin(&self, p: Coord) -> bool {
        let within_rows = p.y >= self.y && p.y <= self.y + self.height;
        let within_cols = p.x >= self.x && p.x <= self.x + self.width;
        ((p.x == self.x || p.x == self.x + self.width) && within_rows)
            || ((p.y == self.y || p.y == self.y + self.height) && within_cols)
    }

    /// Whether `p` is already taken by an enemy or a treasure.
    pub fn is_occupied(&self, p: Coord) -> bool {
        self.enemies.contains(&p) || self.treasures.contains(&p)
    }

    /// Drop entities that no longer lie inside the interior.
    pub fn retain_interior_entities(&mut self) {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        let inside = |p: &Coord| x < p.x && p.x < x + w && y < p.y && p.y < y + h;
        self.enemies.retain(inside);
        self.treasures.retain(inside);
    }
}

/// Rectangle intersection with inclusive bounds, so rooms sharing an edge
/// count as colliding.
pub fn are_rooms_colliding(a: &Room, b: &Room) -> bool {
    a.x <= b.x + b.width && a.x + a.width >= b.x && a.y <= b.y + b.height && a.y + a.height >= b.y
}

/// Ordered list of rooms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomLevel {
    pub rooms: Vec<Room>,
}

impl RoomLevel {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
