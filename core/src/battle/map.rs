use serde::Serialize;

/// One board square from the initial object dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Square {
    pub x: i64,
    pub y: i64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub image_name: String,
    pub terrain: String,
}

/// A decorative board element (torches, rubble, victory point markers).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doodad {
    pub x: f64,
    pub y: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub image_name: String,
    pub marker: String,
}

/// The battle board. Populated once by the domain model builder,
/// append-only afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BattleMap {
    squares: Vec<Square>,
    doodads: Vec<Doodad>,
}

impl BattleMap {
    pub fn add_square(&mut self, square: Square) {
        self.squares.push(square);
    }

    pub fn add_doodad(&mut self, doodad: Doodad) {
        self.doodads.push(doodad);
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    pub fn doodads(&self) -> &[Doodad] {
        &self.doodads
    }

    pub fn square_at(&self, x: i64, y: i64) -> Option<&Square> {
        self.squares.iter().find(|s| s.x == x && s.y == y)
    }
}
