#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    pub id: &'static str,
    pub name: &'static str,
    /// Portrait, relative to the asset directory.
    pub portrait: &'static str,
}

pub const CHARACTERS: [Character; 4] = [
    Character {
        id: "bomber1",
        name: "Bomber Azul",
        portrait: "character1.png",
    },
    Character {
        id: "bomber2",
        name: "Bomber Rojo",
        portrait: "character2.png",
    },
    Character {
        id: "bomber3",
        name: "Bomber Verde",
        portrait: "character3.png",
    },
    Character {
        id: "bomber4",
        name: "Bomber Robot",
        portrait: "character4.png",
    },
];

pub fn find(id: &str) -> Option<&'static Character> {
    CHARACTERS.iter().find(|c| c.id == id)
}
