//! Plain-text board diagrams.

use chess_core::{Placement, Square};

/// Draws the board from White's side: rank 8 on top, FEN letters for pieces
/// and `.` for empty squares, with file and rank labels.
pub fn board_diagram(placement: &Placement) -> String {
    let mut out = String::new();
    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        for file in 0..8u8 {
            let cell = Square::from_coords(file, rank).and_then(|sq| placement[sq.index() as usize]);
            out.push(' ');
            out.push(match cell {
                Some((piece, color)) => piece.to_fen_char(color),
                None => '.',
            });
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::Position;

    #[test]
    fn start_position() {
        let diagram = board_diagram(&Position::startpos().board());
        let lines: Vec<&str> = diagram.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[4], "4 . . . . . . . .");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
