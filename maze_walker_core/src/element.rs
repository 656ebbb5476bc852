use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of distinct key and door ids the map format can encode.
pub const MAX_ENCODED_ID: usize = 5;

/// The semantic content of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Element {
    #[default]
    Empty,
    Start,
    Finish,
    Wall,
    Door { id: usize },
    Key { id: usize },
}

impl Element {
    pub const fn empty() -> Self {
        Element::Empty
    }

    pub const fn start() -> Self {
        Element::Start
    }

    pub const fn finish() -> Self {
        Element::Finish
    }

    pub const fn wall() -> Self {
        Element::Wall
    }

    pub const fn door(id: usize) -> Self {
        Element::Door { id }
    }

    pub const fn key(id: usize) -> Self {
        Element::Key { id }
    }

    /// Maps a map-file character to its element.
    ///
    /// | Char        | Element     |
    /// |-------------|-------------|
    /// | `0`         | Empty       |
    /// | `S`         | Start       |
    /// | `G`         | Finish      |
    /// | `W`         | Wall        |
    /// | `a`-`e`     | Key(0-4)    |
    /// | `A`-`E`     | Key(0-4)    |
    /// | `1`-`5`     | Door(0-4)   |
    ///
    /// Returns `None` for any other character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Element::Empty),
            'S' => Some(Element::Start),
            'G' => Some(Element::Finish),
            'W' => Some(Element::Wall),
            'a'..='e' => Some(Element::key(c as usize - 'a' as usize)),
            'A'..='E' => Some(Element::key(c as usize - 'A' as usize)),
            '1'..='5' => Some(Element::door(c as usize - '1' as usize)),
            _ => None,
        }
    }

    /// Inverse of [`Element::from_char`]. Keys are written in lowercase.
    /// Ids the format cannot encode come out as `'?'`.
    pub fn to_char(&self) -> char {
        match *self {
            Element::Empty => '0',
            Element::Start => 'S',
            Element::Finish => 'G',
            Element::Wall => 'W',
            Element::Key { id } if id < MAX_ENCODED_ID => (b'a' + id as u8) as char,
            Element::Door { id } if id < MAX_ENCODED_ID => (b'1' + id as u8) as char,
            Element::Key { .. } | Element::Door { .. } => '?',
        }
    }

    /// Whether this cell stops the player. Doors always block; there is no
    /// unlock mechanic.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Element::Wall | Element::Door { .. })
    }

    /// The id carried by a door or key.
    pub fn id(&self) -> Option<usize> {
        match *self {
            Element::Door { id } | Element::Key { id } => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Empty => write!(f, "empty"),
            Element::Start => write!(f, "start"),
            Element::Finish => write!(f, "finish"),
            Element::Wall => write!(f, "wall"),
            Element::Door { id } => write!(f, "door {id}"),
            Element::Key { id } => write!(f, "key {id}"),
        }
    }
}
