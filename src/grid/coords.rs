use bevy::prelude::*;

/// Offset coordinate of a cell: `x` is the column, `y` the row.
///
/// Odd rows are shifted right by half a cell width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct HexCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl HexCoord {
    /// Builds a coordinate from column and row.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the row is shifted by half a cell.
    pub fn is_odd_row(&self) -> bool {
        self.y.rem_euclid(2) == 1
    }

    /// Every coordinate of the axis-aligned rectangle spanned by two corners,
    /// row by row. Corners may be given in any order.
    pub fn rectangle(a: HexCoord, b: HexCoord) -> impl Iterator<Item = HexCoord> {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        (min_y..=max_y).flat_map(move |y| (min_x..=max_x).map(move |x| HexCoord::new(x, y)))
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Turning sense for rotation changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// Counter-clockwise seen from above.
    Left,
    /// Clockwise seen from above.
    Right,
}

/// One of the six neighbour directions of an offset hex grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum HexDirection {
    /// West.
    Left,
    /// East; the grid's reference direction.
    #[default]
    Right,
    /// North-west.
    UpLeft,
    /// North-east.
    UpRight,
    /// South-west.
    DownLeft,
    /// South-east.
    DownRight,
}

impl HexDirection {
    /// All directions, in declaration order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::Left,
        HexDirection::Right,
        HexDirection::UpLeft,
        HexDirection::UpRight,
        HexDirection::DownLeft,
        HexDirection::DownRight,
    ];

    /// `[turn left, turn right]` for each direction, indexed like [`Self::ALL`].
    const TURN_TABLE: [[HexDirection; 2]; 6] = [
        // Left
        [HexDirection::DownLeft, HexDirection::UpLeft],
        // Right
        [HexDirection::UpRight, HexDirection::DownRight],
        // UpLeft
        [HexDirection::Left, HexDirection::UpRight],
        // UpRight
        [HexDirection::UpLeft, HexDirection::Right],
        // DownLeft
        [HexDirection::DownRight, HexDirection::Left],
        // DownRight
        [HexDirection::Right, HexDirection::DownLeft],
    ];

    fn index(self) -> usize {
        match self {
            HexDirection::Left => 0,
            HexDirection::Right => 1,
            HexDirection::UpLeft => 2,
            HexDirection::UpRight => 3,
            HexDirection::DownLeft => 4,
            HexDirection::DownRight => 5,
        }
    }

    /// The neighbouring direction one sixth of a turn away.
    pub fn turned(self, turn: Turn) -> HexDirection {
        let [left, right] = Self::TURN_TABLE[self.index()];
        match turn {
            Turn::Left => left,
            Turn::Right => right,
        }
    }

    /// Yaw in degrees, clockwise from [`HexDirection::Right`].
    pub fn angle_degrees(self) -> f32 {
        match self {
            HexDirection::Right => 0.0,
            HexDirection::DownRight => 60.0,
            HexDirection::DownLeft => 120.0,
            HexDirection::Left => 180.0,
            HexDirection::UpLeft => 240.0,
            HexDirection::UpRight => 300.0,
        }
    }

    /// Clockwise angle in degrees that rotates `self` onto `other`, in `[0, 360)`.
    pub fn angle_to(self, other: HexDirection) -> f32 {
        crate::math::wrap_degrees(other.angle_degrees() - self.angle_degrees())
    }

    /// Short label used in placement info.
    pub fn label(self) -> &'static str {
        match self {
            HexDirection::Left => "Left",
            HexDirection::Right => "Right",
            HexDirection::UpLeft => "UpLeft",
            HexDirection::UpRight => "UpRight",
            HexDirection::DownLeft => "DownLeft",
            HexDirection::DownRight => "DownRight",
        }
    }
}
