use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::debug;

use crate::{element::Element, map::Map};

/// Reasons a map file can fail to load. Row and column numbers are 0-based
/// grid coordinates (the first data line is row 0).
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Cannot read map file {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
    #[error("Unrecognized character {character:?} at row {row}, column {col}")]
    UnrecognizedCharacter { character: char, row: usize, col: usize },
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowWidthMismatch {
        expected: usize,
        actual: usize,
        row: usize,
    },
    #[error("Map has {actual} rows, expected {expected}")]
    RowCountMismatch { expected: usize, actual: usize },
}

/// Reads the plain-text map format:
///
/// ```text
/// <width> <height>
/// <height lines of exactly <width> characters>
/// ```
///
/// Blank lines are skipped. See [`Element::from_char`] for the character table.
pub struct MapParser;

impl MapParser {
    /// Loads and parses a map file.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Map, ParseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::parse_str(&text)?;
        debug!(
            path = %path.display(),
            width = map.width(),
            height = map.height(),
            "loaded map"
        );
        Ok(map)
    }

    /// Parses map text. The first problem found, in file order, is reported.
    pub fn parse_str(text: &str) -> Result<Map, ParseError> {
        let mut lines = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| ParseError::MalformedHeader("missing width and height".to_string()))?;
        let (width, height) = Self::parse_header(header)?;

        // Grows with the rows actually read; the header alone is untrusted.
        let mut elements = Vec::new();
        let mut rows = 0;
        for (row, line) in lines.enumerate() {
            rows += 1;
            if row >= height {
                // Keep counting so the error reports the real total.
                continue;
            }
            let mut cells = 0;
            for (col, character) in line.chars().enumerate() {
                let element = Element::from_char(character).ok_or(
                    ParseError::UnrecognizedCharacter {
                        character,
                        row,
                        col,
                    },
                )?;
                elements.push(element);
                cells += 1;
            }
            if cells != width {
                return Err(ParseError::RowWidthMismatch {
                    expected: width,
                    actual: cells,
                    row,
                });
            }
        }
        if rows != height {
            return Err(ParseError::RowCountMismatch {
                expected: height,
                actual: rows,
            });
        }

        Map::from_elements(width, height, elements)
            .map_err(|err| ParseError::MalformedHeader(err.to_string()))
    }

    fn parse_header(line: &str) -> Result<(usize, usize), ParseError> {
        let mut tokens = line.split_whitespace();
        let mut dimension = |name: &str| -> Result<usize, ParseError> {
            let token = tokens
                .next()
                .ok_or_else(|| ParseError::MalformedHeader(format!("missing {name}")))?;
            token.parse::<usize>().map_err(|_| {
                ParseError::MalformedHeader(format!("{name} {token:?} is not a non-negative integer"))
            })
        };
        let width = dimension("width")?;
        let height = dimension("height")?;

        if let Some(extra) = tokens.next() {
            return Err(ParseError::MalformedHeader(format!(
                "unexpected token {extra:?} after width and height"
            )));
        }
        if width == 0 || height == 0 {
            return Err(ParseError::MalformedHeader(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok((width, height))
    }
}

impl FromStr for Map {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapParser::parse_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "5 5\n0000G\n0W000\n00D00\n00000\n0000a\n";

    #[test]
    fn parses_sample_map() {
        let map = MapParser::parse_str(SAMPLE).unwrap();
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 5);
        assert_eq!(map.elements().len(), 25);
        assert_eq!(map.element(0, 0), Element::empty());
        assert_eq!(map.element(4, 0), Element::finish());
        assert_eq!(map.element(1, 1), Element::wall());
        assert_eq!(map.element(2, 2), Element::key(3));
        assert_eq!(map.element(4, 4), Element::key(0));
    }

    #[test]
    fn rows_follow_file_order() {
        let text = "3 3\nS00\n0W0\n12G\n";
        let map = MapParser::parse_str(text).unwrap();
        let lines: Vec<&str> = text.lines().skip(1).collect();
        for y in 0..map.height() {
            let row: String = (0..map.width()).map(|x| map.element(x, y).to_char()).collect();
            assert_eq!(row, lines[y]);
        }
        assert_eq!(map.element(0, 2), Element::door(0));
        assert_eq!(map.element(1, 2), Element::door(1));
    }

    #[test]
    fn display_output_parses_back() {
        let map = MapParser::parse_str("4 2\nSWab\n3C0G\n").unwrap();
        let reparsed: Map = map.to_string().parse().unwrap();
        assert_eq!(reparsed, map);
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let map = MapParser::parse_str("\r\n2 2\r\n\r\nS0\r\n\n0G\r\n\n").unwrap();
        assert_eq!(map.element(0, 0), Element::start());
        assert_eq!(map.element(1, 1), Element::finish());
    }

    #[test]
    fn short_row_is_a_width_mismatch() {
        let err = MapParser::parse_str("5 5\n000\n00000\n00000\n00000\n00000\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowWidthMismatch {
                expected: 5,
                actual: 3,
                row: 0
            }
        ));
    }

    #[test]
    fn long_row_is_a_width_mismatch() {
        let err = MapParser::parse_str("2 2\n00\n000\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowWidthMismatch {
                expected: 2,
                actual: 3,
                row: 1
            }
        ));
    }

    #[test]
    fn missing_rows_are_counted() {
        let err = MapParser::parse_str("2 3\n00\n00\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowCountMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn extra_rows_are_counted() {
        let err = MapParser::parse_str("2 1\n00\n00\n00\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowCountMismatch {
                expected: 1,
                actual: 3
            }
        ));
    }

    #[test]
    fn unknown_character_reports_position() {
        let err = MapParser::parse_str("3 2\n000\n0x0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnrecognizedCharacter {
                character: 'x',
                row: 1,
                col: 1
            }
        ));
        assert_eq!(
            err.to_string(),
            "Unrecognized character 'x' at row 1, column 1"
        );
    }

    #[test]
    fn huge_header_fails_on_the_first_row() {
        let err = MapParser::parse_str("4000000000 4000000000\n0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowWidthMismatch {
                expected: 4_000_000_000,
                actual: 1,
                row: 0
            }
        ));

        let err = MapParser::parse_str("100000 100000\n0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowWidthMismatch {
                expected: 100_000,
                actual: 1,
                row: 0
            }
        ));
    }

    #[test]
    fn malformed_headers() {
        for text in ["", "\n\n", "5\n00000\n", "a 5\n", "5 -1\n", "5 5 5\n", "0 3\n"] {
            let err = MapParser::parse_str(text).unwrap_err();
            assert!(
                matches!(err, ParseError::MalformedHeader(_)),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn missing_file_is_a_typed_error() {
        let err = MapParser::parse_file("/definitely/not/a/map.txt").unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
        assert!(err.to_string().contains("/definitely/not/a/map.txt"));
    }
}
