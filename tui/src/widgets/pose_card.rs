//! PoseCard Widget
//!
//! The pose under the cursor: name, Sanskrit name, and wrapped cueing
//! instructions, each line centred. Lines that do not fit are dropped from
//! the bottom.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use practice_core::Pose;

use crate::theme::{MIST, SAGE};

/// A centred, borderless pose description
pub struct PoseCard<'a> {
    pose: &'a Pose,
}

impl<'a> PoseCard<'a> {
    /// Card for `pose`
    pub fn new(pose: &'a Pose) -> Self {
        Self { pose }
    }

    /// Lines to draw at `width`, with their styles
    fn lines(&self, width: usize) -> Vec<(String, Style)> {
        let mut lines = vec![(
            self.pose.name.clone(),
            Style::default().fg(SAGE).add_modifier(Modifier::BOLD),
        )];

        if !self.pose.sanskrit_name.is_empty() {
            lines.push((
                self.pose.sanskrit_name.clone(),
                Style::default().fg(MIST).add_modifier(Modifier::ITALIC),
            ));
        }

        if !self.pose.instructions.is_empty() {
            lines.push((String::new(), Style::default()));
            for line in self.pose.instructions.lines() {
                if line.is_empty() {
                    lines.push((String::new(), Style::default()));
                    continue;
                }
                for wrapped in wrap(line, width.max(1)) {
                    lines.push((wrapped.to_string(), Style::default()));
                }
            }
        }

        lines
    }
}

impl Widget for PoseCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        for (i, (line, style)) in self
            .lines(width.saturating_sub(4))
            .iter()
            .take(area.height as usize)
            .enumerate()
        {
            let line_width = line.width().min(width);
            let x = area.x + ((width - line_width) / 2) as u16;
            let y = area.y + i as u16;
            buf.set_stringn(x, y, line, width, *style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
    }

    #[test]
    fn test_name_is_centred() {
        let pose = Pose::new("Tree", 30);
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        PoseCard::new(&pose).render(area, &mut buf);
        assert_eq!(row(&buf, 0), "   Tree   ");
    }

    #[test]
    fn test_instructions_wrap_below_names() {
        let pose = Pose::new("Tree", 30)
            .with_sanskrit("Vrksasana")
            .with_instructions("press the foot into the thigh");
        let card = PoseCard::new(&pose);
        let lines: Vec<String> = card.lines(12).into_iter().map(|(l, _)| l).collect();
        assert_eq!(lines[0], "Tree");
        assert_eq!(lines[1], "Vrksasana");
        assert_eq!(lines[2], "");
        assert!(lines[3..].iter().all(|l| l.len() <= 12));
        assert_eq!(lines[3..].join(" "), "press the foot into the thigh");
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let pose = Pose::new("Downward-Facing Dog", 30).with_instructions("long text here");
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        PoseCard::new(&pose).render(area, &mut buf);
    }
}
