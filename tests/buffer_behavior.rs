use std::io::Write;

use rust_text_editor::{Buffer, HlClass};

fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

fn write_temp_c(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".c").tempfile().unwrap();
    file.write_all(contents).unwrap();
    file
}

#[test]
fn loading_a_three_line_file_expands_tabs_on_the_middle_row() {
    let file = write_temp(b"ab\n\tcd\nef");
    let buffer = Buffer::load(file.path()).unwrap();

    assert_eq!(buffer.num_rows(), 3);
    assert_eq!(buffer.rows[1].render, b"        cd");
    assert_eq!(buffer.rows[1].render_size(), 10);
}

#[test]
fn deleting_at_start_of_row_joins_it_onto_the_previous_row() {
    let mut buffer = Buffer::new();
    buffer.insert_row(0, b"ab".to_vec());
    buffer.insert_row(1, b"cd".to_vec());

    let (row, col) = buffer.delete_char_before(1, 0);

    assert_eq!((row, col), (0, 2));
    assert_eq!(buffer.num_rows(), 1);
    assert_eq!(buffer.rows[0].chars, b"abcd");
}

#[test]
fn unterminated_multiline_comment_continues_onto_the_next_row() {
    let file = write_temp_c(b"/* multi\nstill */ code");
    let buffer = Buffer::load(file.path()).unwrap();

    assert_eq!(buffer.syntax.name, "c");
    assert!(buffer.rows[0].hl_open_comment);
    let close_at = buffer.rows[1].render.windows(2).position(|w| w == b"*/").unwrap();
    assert!(buffer.rows[1].hl[..close_at + 2].iter().all(|h| *h == HlClass::MlComment));
    assert!(buffer.rows[1].hl[close_at + 2..].iter().all(|h| *h == HlClass::Normal));
}

#[test]
fn save_round_trip_normalizes_line_endings_and_trailing_newline() {
    let file = write_temp(b"one\r\ntwo\r\nthree");
    let mut buffer = Buffer::load(file.path()).unwrap();
    assert_eq!(buffer.num_rows(), 3);

    buffer.save().unwrap();
    let saved = std::fs::read(file.path()).unwrap();
    assert_eq!(saved, b"one\ntwo\nthree\n");
}

#[test]
fn row_idx_tracks_buffer_position_after_insert_and_delete() {
    let mut buffer = Buffer::new();
    for i in 0..5 {
        buffer.insert_row(i, format!("row{i}").into_bytes());
    }
    buffer.delete_row(2);
    for (i, row) in buffer.rows.iter().enumerate() {
        assert_eq!(row.idx, i);
    }
}

#[test]
fn saving_clears_the_dirty_counter() {
    let file = write_temp(b"x");
    let mut buffer = Buffer::load(file.path()).unwrap();
    buffer.insert_char(0, 1, b'y');
    assert_eq!(buffer.dirty, 1);
    buffer.save().unwrap();
    assert_eq!(buffer.dirty, 0);
}
