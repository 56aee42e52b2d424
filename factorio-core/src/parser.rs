//! Telemetry file decoding (pure, no filesystem access)
//!
//! The Factorio mod rewrites its output file every update cycle:
//!
//! ```text
//! XYZ header written by the mod
//! x:12.5
//! y:-40.25
//! z:0
//! p:1
//! u:1
//! s:hostplayer
//! ```
//!
//! The header line is skipped, every other line is a `token:value` pair. Lines
//! may come in any order, unknown tokens are ignored and a repeated token
//! overwrites the earlier value.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::ParseError;
use crate::record::PositionRecord;

/// Lines containing this marker carry no data.
pub const HEADER_MARKER: &str = "XYZ";

// =============================================================================
// Tokens
// =============================================================================

/// A recognised telemetry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    X,
    Y,
    Z,
    /// `p`: player index
    Player,
    /// `u`: surface index
    Surface,
    /// `s`: server identity
    Server,
}

impl Token {
    /// All tokens a complete record needs, in file order.
    pub const ALL: [Token; 6] = [
        Token::X,
        Token::Y,
        Token::Z,
        Token::Player,
        Token::Surface,
        Token::Server,
    ];

    /// Look up the token for a line key. Keys are case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "x" => Some(Token::X),
            "y" => Some(Token::Y),
            "z" => Some(Token::Z),
            "p" => Some(Token::Player),
            "u" => Some(Token::Surface),
            "s" => Some(Token::Server),
            _ => None,
        }
    }

    /// The key as written in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Token::X => "x",
            Token::Y => "y",
            Token::Z => "z",
            Token::Player => "p",
            Token::Surface => "u",
            Token::Server => "s",
        }
    }

    pub(crate) fn list(tokens: &[Token]) -> String {
        tokens
            .iter()
            .map(Token::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split one line into its token and raw value.
///
/// Returns `None` for the header line, empty lines, lines without a `:` and
/// unknown tokens. Only the first `:` separates, so the value may contain
/// further colons. Trailing `\r`/`\n` are stripped from the value.
pub fn parse_line(line: &str) -> Option<(Token, &str)> {
    if line.contains(HEADER_MARKER) {
        return None;
    }
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.is_empty() {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    Token::from_key(key).map(|token| (token, value))
}

// =============================================================================
// Record builder
// =============================================================================

/// In-progress record; every field starts unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBuilder {
    x: Option<f32>,
    y: Option<f32>,
    z: Option<f32>,
    player_id: Option<i32>,
    surface_id: Option<i32>,
    server_name: Option<String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value for `token`, replacing any earlier one.
    ///
    /// A numeric value that does not parse is dropped: the field keeps its
    /// earlier value, or stays unset if it never had one.
    pub fn apply(&mut self, token: Token, value: &str) {
        match token {
            Token::X => self.x = parse_coordinate(value).or(self.x),
            Token::Y => self.y = parse_coordinate(value).or(self.y),
            Token::Z => self.z = parse_coordinate(value).or(self.z),
            Token::Player => self.player_id = parse_number(value).or(self.player_id),
            Token::Surface => self.surface_id = parse_number(value).or(self.surface_id),
            Token::Server => self.server_name = Some(value.to_string()),
        }
    }

    /// Tokens that do not currently hold a valid value.
    pub fn missing(&self) -> Vec<Token> {
        Token::ALL
            .into_iter()
            .filter(|token| !self.is_set(*token))
            .collect()
    }

    fn is_set(&self, token: Token) -> bool {
        match token {
            Token::X => self.x.is_some(),
            Token::Y => self.y.is_some(),
            Token::Z => self.z.is_some(),
            Token::Player => self.player_id.is_some(),
            Token::Surface => self.surface_id.is_some(),
            Token::Server => self.server_name.is_some(),
        }
    }

    /// Finish the record, failing if any field is unset.
    pub fn build(self) -> Result<PositionRecord, ParseError> {
        match self {
            RecordBuilder {
                x: Some(x),
                y: Some(y),
                z: Some(z),
                player_id: Some(player_id),
                surface_id: Some(surface_id),
                server_name: Some(server_name),
            } => Ok(PositionRecord {
                x,
                y,
                z,
                player_id,
                surface_id,
                server_name,
            }),
            incomplete => Err(ParseError::Incomplete {
                missing: incomplete.missing(),
            }),
        }
    }
}

fn parse_number<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

// NaN and infinities are as useless to the host as a missing value.
fn parse_coordinate(value: &str) -> Option<f32> {
    parse_number::<f32>(value).filter(|v| v.is_finite())
}

// =============================================================================
// Entry points
// =============================================================================

/// Decode a whole telemetry file from a reader.
///
/// A read error (including invalid UTF-8) is reported as
/// [`ParseError::Unreadable`].
pub fn parse_reader<R: BufRead>(reader: R) -> Result<PositionRecord, ParseError> {
    let mut builder = RecordBuilder::new();
    for line in reader.lines() {
        let line = line?;
        if let Some((token, value)) = parse_line(&line) {
            builder.apply(token, value);
        }
    }
    builder.build()
}

/// Decode telemetry text already held in memory.
///
/// # Example
/// ```
/// use factorio_core::parser::parse_str;
///
/// let record = parse_str("XYZ\nx:1\ny:2\nz:0\np:1\nu:1\ns:host\n").unwrap();
/// assert_eq!(record.position(), [1.0, 2.0, 0.0]);
/// assert_eq!(record.server_name, "host");
/// ```
pub fn parse_str(text: &str) -> Result<PositionRecord, ParseError> {
    parse_reader(text.as_bytes())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = "XYZ header\nx:1.5\ny:-2.0\nz:0.25\np:3\nu:7\ns:hostplayer\n";

    fn expected_a() -> PositionRecord {
        PositionRecord {
            x: 1.5,
            y: -2.0,
            z: 0.25,
            player_id: 3,
            surface_id: 7,
            server_name: "hostplayer".to_string(),
        }
    }

    #[test]
    fn test_parse_well_formed_file() {
        assert_eq!(parse_str(SCENARIO_A), Ok(expected_a()));
    }

    #[test]
    fn test_missing_surface_is_incomplete() {
        let text = "XYZ header\nx:1.5\ny:-2.0\nz:0.25\np:3\ns:hostplayer\n";
        assert_eq!(
            parse_str(text),
            Err(ParseError::Incomplete {
                missing: vec![Token::Surface]
            })
        );
    }

    #[test]
    fn test_empty_file_misses_everything() {
        assert_eq!(
            parse_str(""),
            Err(ParseError::Incomplete {
                missing: Token::ALL.to_vec()
            })
        );
    }

    #[test]
    fn test_any_line_order() {
        let lines: Vec<&str> = SCENARIO_A.lines().skip(1).collect();
        for shift in 0..lines.len() {
            let mut rotated = lines.clone();
            rotated.rotate_left(shift);
            assert_eq!(parse_str(&rotated.join("\n")), Ok(expected_a()), "shift {shift}");

            rotated.reverse();
            assert_eq!(parse_str(&rotated.join("\n")), Ok(expected_a()), "reversed {shift}");
        }
    }

    #[test]
    fn test_header_may_appear_anywhere() {
        let text = "x:1.5\ny:-2.0\nXYZ\nz:0.25\np:3\nu:7\ns:hostplayer";
        assert_eq!(parse_str(text), Ok(expected_a()));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let text = "x:9\np:9\ns:old\nx:1.5\ny:-2.0\nz:0.25\np:3\nu:7\ns:hostplayer\n";
        assert_eq!(parse_str(text), Ok(expected_a()));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = SCENARIO_A.replace('\n', "\r\n");
        assert_eq!(parse_str(&text), Ok(expected_a()));
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(parse_str(SCENARIO_A.trim_end()), Ok(expected_a()));
    }

    #[test]
    fn test_server_name_keeps_colons_and_spaces() {
        let text = "x:0\ny:0\nz:0\np:1\nu:1\ns: host:34197 \n";
        let record = parse_str(text).unwrap();
        assert_eq!(record.server_name, " host:34197 ");
    }

    #[test]
    fn test_unknown_tokens_and_junk_ignored() {
        let text = "XYZ\nversion:2\nno separator here\n\nx:1.5\ny:-2.0\nz:0.25\nP:99\np:3\nu:7\ns:hostplayer\n";
        assert_eq!(parse_str(text), Ok(expected_a()));
    }

    #[test]
    fn test_malformed_number_keeps_earlier_value() {
        let text = "x:1.5\ny:-2.0\nz:0.25\np:3\nu:7\ns:hostplayer\nx:abc\np:\n";
        let record = parse_str(text).unwrap();
        assert_eq!(record.x, 1.5);
        assert_eq!(record.player_id, 3);
        assert_eq!(record, expected_a());
    }

    #[test]
    fn test_malformed_number_alone_leaves_field_unset() {
        let text = "x:abc\ny:-2.0\nz:0.25\np:3\nu:7\ns:hostplayer\n";
        assert_eq!(
            parse_str(text),
            Err(ParseError::Incomplete {
                missing: vec![Token::X]
            })
        );
    }

    #[test]
    fn test_malformed_number_recovers_on_later_line() {
        let text = "p:three\nx:1.5\ny:-2.0\nz:0.25\nu:7\ns:hostplayer\np:3\n";
        assert_eq!(parse_str(text), Ok(expected_a()));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let text = "x:NaN\ny:inf\nz:0\np:1\nu:1\ns:host\n";
        assert_eq!(
            parse_str(text),
            Err(ParseError::Incomplete {
                missing: vec![Token::X, Token::Y]
            })
        );
    }

    #[test]
    fn test_numeric_whitespace_trimmed() {
        let text = "x: 1.5\ny:-2.0 \nz:0.25\np: 3\nu:7\ns:hostplayer\n";
        assert_eq!(parse_str(text), Ok(expected_a()));
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let bytes: &[u8] = b"x:1\ns:\xff\xfe\n";
        assert!(matches!(
            parse_reader(bytes),
            Err(ParseError::Unreadable(_))
        ));
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("x:1.5\n"), Some((Token::X, "1.5")));
        assert_eq!(parse_line("s:a:b\r\n"), Some((Token::Server, "a:b")));
        assert_eq!(parse_line("XYZ header"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("q:1"), None);
        assert_eq!(parse_line("x"), None);
    }

    #[test]
    fn test_builder_reports_missing() {
        let mut builder = RecordBuilder::new();
        builder.apply(Token::X, "1");
        builder.apply(Token::Server, "srv");
        assert_eq!(
            builder.missing(),
            vec![Token::Y, Token::Z, Token::Player, Token::Surface]
        );
    }
}
