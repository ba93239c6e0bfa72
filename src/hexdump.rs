//! Diagnostic dump of a byte buffer, sixteen bytes per row.
use itertools::Itertools;

pub const HEADER: &str = "        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F";

const ROW_WIDTH: usize = 16;

/// Header, one row per sixteen bytes (offset, hex pairs and optionally the printable
/// characters), and the total length as the last row.
pub fn hexdump(bytes: &[u8], with_ascii: bool) -> String {
    let rows = bytes.chunks(ROW_WIDTH).enumerate().map(|(row, chunk)| {
        let hex = chunk.iter().map(|b| format!("{b:02x}")).join(" ");
        let mut line = format!("{:07x} {:<48}", row * ROW_WIDTH, hex);
        if with_ascii {
            let ascii: String = chunk.iter().copied().map(printable).collect();
            line.push_str(" |");
            line.push_str(&ascii);
            line.push('|');
        }
        line
    });
    std::iter::once(HEADER.to_string())
        .chain(rows)
        .chain(std::iter::once(format!("{:07x}", bytes.len())))
        .join("\n")
}

fn printable(byte: u8) -> char {
    if (b' '..=b'~').contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_row() {
        let dump = hexdump(&[0x00, 0x61, 0x73, 0x6d], false);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], format!("0000000 {:<48}", "00 61 73 6d"));
        assert_eq!(lines[2], "0000004");
    }

    #[test]
    fn rows_of_sixteen_with_ascii() {
        let bytes: Vec<u8> = (0x40..0x40 + 17).collect();
        let dump = hexdump(&bytes, true);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "0000000 40 41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f  |@ABCDEFGHIJKLMNO|"
        );
        assert!(lines[2].starts_with("0000010 50 "));
        assert!(lines[2].ends_with(" |P|"));
        assert_eq!(lines[3], "0000011");
    }

    #[test]
    fn non_printable_bytes_become_dots() {
        let dump = hexdump(&[0x00, b'a', 0x7f], true);
        assert!(dump.contains("|.a.|"));
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(hexdump(&[], false), format!("{HEADER}\n0000000"));
    }
}
