//! Frames and the sinks that paint them.
//!
//! A [`Frame`] is a plain copy of the overlay taken under the board lock;
//! once built it shares nothing with the match, so a slow sink can never hold
//! up the runners.

use bridgecross_logic::grid::Pos;
use serde::Serialize;
use std::io::{self, Write};

/// One rendered picture of the arena: layout glyphs plus agent markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    rows: Vec<Vec<char>>,
}

impl Frame {
    pub fn new(rows: Vec<Vec<char>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn get(&self, pos: Pos) -> Option<char> {
        self.rows.get(pos.row)?.get(pos.col).copied()
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    /// Every position showing `glyph`, row-major.
    pub fn find(&self, glyph: char) -> Vec<Pos> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(move |&(_, &g)| g == glyph)
                    .map(move |(c, _)| Pos::new(r, c))
            })
            .collect()
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            let line: String = row.iter().collect();
            f.write_str(&line)?;
        }
        Ok(())
    }
}

/// Consumer of frames: a terminal painter, a recorder, a network push.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Keeps every frame, in order.
impl FrameSink for Vec<Frame> {
    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        self.push(frame.clone());
        Ok(())
    }
}

/// Writes frames as text, separated by a blank line, flushing after each.
pub struct TextSink<W: Write> {
    out: W,
    frames: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TextSink<W> {
    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        writeln!(self.out, "{frame}")?;
        writeln!(self.out)?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(vec![
            "#####".chars().collect(),
            "#1C2#".chars().collect(),
            "#####".chars().collect(),
        ])
    }

    #[test]
    fn display_joins_rows() {
        assert_eq!(frame().to_string(), "#####\n#1C2#\n#####");
        assert_eq!(frame().width(), 5);
        assert_eq!(frame().height(), 3);
    }

    #[test]
    fn lookup_and_find() {
        let f = frame();
        assert_eq!(f.get(Pos::new(1, 2)), Some('C'));
        assert_eq!(f.get(Pos::new(9, 0)), None);
        assert_eq!(f.find('2'), vec![Pos::new(1, 3)]);
    }

    #[test]
    fn text_sink_writes_blank_separated_frames() {
        let mut sink = TextSink::new(Vec::new());
        sink.present(&frame()).unwrap();
        sink.present(&frame()).unwrap();
        assert_eq!(sink.frames_written(), 2);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.matches("#1C2#").count(), 2);
        assert!(text.contains("#####\n\n#####"));
    }

    #[test]
    fn vec_sink_records() {
        let mut frames: Vec<Frame> = Vec::new();
        frames.present(&frame()).unwrap();
        assert_eq!(frames, vec![frame()]);
    }
}
