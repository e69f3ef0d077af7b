use crossword_engine::{checksum, encode_puz, PuzError, PuzzleModel};
use pretty_assertions::assert_eq;

fn sample() -> PuzzleModel {
    PuzzleModel {
        copyright: "The Sydney Morning Herald".into(),
        title: "Mini, Saturday, March 09, 2024".into(),
        author: "Created by Jane Doe".into(),
        width: 3,
        height: 3,
        solution: "CATA.OBEE".into(),
        fill: "----.----".into(),
        clues: vec![
            "Feline (3)".into(),
            "Taxi (3)".into(),
            "Digit on foot (3)".into(),
            "Buzzing insect (3)".into(),
        ],
        notes: Some("A gentle start".into()),
    }
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[test]
fn header_describes_the_grid() {
    let bytes = encode_puz(&sample()).unwrap();
    assert_eq!(&bytes[0x02..0x0E], b"ACROSS&DOWN\0");
    assert_eq!(&bytes[0x18..0x1C], b"1.3\0");
    assert_eq!(bytes[0x2C], 3);
    assert_eq!(bytes[0x2D], 3);
    assert_eq!(u16_at(&bytes, 0x2E), 4);
    assert_eq!(u16_at(&bytes, 0x30), 1);
    assert_eq!(u16_at(&bytes, 0x32), 0);
}

#[test]
fn body_holds_grids_then_strings() {
    let bytes = encode_puz(&sample()).unwrap();
    assert_eq!(&bytes[0x34..0x3D], b"CATA.OBEE");
    assert_eq!(&bytes[0x3D..0x46], b"----.----");

    let strings: Vec<&[u8]> = bytes[0x46..].split(|b| *b == 0).collect();
    // 3 header strings, 4 clues, notes, then the empty tail after the last NUL
    assert_eq!(strings.len(), 9);
    assert_eq!(strings[0], b"Mini, Saturday, March 09, 2024");
    assert_eq!(strings[1], b"Created by Jane Doe");
    assert_eq!(strings[2], b"The Sydney Morning Herald");
    assert_eq!(strings[3], b"Feline (3)");
    assert_eq!(strings[6], b"Buzzing insect (3)");
    assert_eq!(strings[7], b"A gentle start");
    assert!(strings[8].is_empty());
}

#[test]
fn checksums_cover_header_and_grids() {
    let bytes = encode_puz(&sample()).unwrap();
    let cib = checksum(&bytes[0x2C..0x34], 0);
    assert_eq!(u16_at(&bytes, 0x0E), cib);

    let sol = checksum(b"CATA.OBEE", 0);
    let fill = checksum(b"----.----", 0);
    assert_eq!(bytes[0x10], b'I' ^ cib.to_le_bytes()[0]);
    assert_eq!(bytes[0x11], b'C' ^ sol.to_le_bytes()[0]);
    assert_eq!(bytes[0x12], b'H' ^ fill.to_le_bytes()[0]);
    assert_eq!(bytes[0x14], b'A' ^ cib.to_le_bytes()[1]);
    assert_eq!(bytes[0x15], b'T' ^ sol.to_le_bytes()[1]);
    assert_eq!(bytes[0x16], b'E' ^ fill.to_le_bytes()[1]);
}

#[test]
fn file_checksum_chains_every_section() {
    let puzzle = sample();
    let bytes = encode_puz(&puzzle).unwrap();

    let mut sum = checksum(&bytes[0x2C..0x34], 0);
    sum = checksum(puzzle.solution.as_bytes(), sum);
    sum = checksum(puzzle.fill.as_bytes(), sum);
    for text in [&puzzle.title, &puzzle.author, &puzzle.copyright] {
        sum = checksum(&[0], checksum(text.as_bytes(), sum));
    }
    for clue in &puzzle.clues {
        sum = checksum(clue.as_bytes(), sum);
    }
    sum = checksum(&[0], checksum(b"A gentle start", sum));

    assert_eq!(u16_at(&bytes, 0x00), sum);
}

#[test]
fn missing_notes_are_an_empty_string() {
    let mut puzzle = sample();
    puzzle.notes = None;
    let bytes = encode_puz(&puzzle).unwrap();
    assert_eq!(bytes.last(), Some(&0));
    assert!(bytes.ends_with(b"Buzzing insect (3)\0\0"));
}

#[test]
fn oversized_or_inconsistent_grids_are_rejected() {
    let mut wide = sample();
    wide.width = 300;
    assert!(matches!(
        encode_puz(&wide),
        Err(PuzError::GridTooLarge { width: 300, .. })
    ));

    let mut short = sample();
    short.fill = "----".into();
    assert_eq!(
        encode_puz(&short).unwrap_err(),
        PuzError::GridLength {
            field: "fill",
            expected: 9,
            found: 4
        }
    );
}
