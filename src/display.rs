/// Rendering layer. All terminal output lives here.
///
/// The presenter receives an immutable `FrameSnapshot` each frame and only
/// translates it into terminal commands. World coordinates are scaled onto
/// the character grid inside the border.
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use space_groomers::entities::{EnemyKind, Rgb, C_BULLET, C_MUD, C_PLAYER};
use space_groomers::snapshot::{FrameSnapshot, Hud, Overlay, Presenter, Summary};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_WAVE: Color = Color::Cyan;
const C_HUD_LIVES: Color = Color::Red;
const C_COMBO: Color = Color::Magenta;
const C_SPECIAL: Color = Color::Green;
const C_DANGER: Color = Color::DarkRed;
const C_HINT: Color = Color::DarkGrey;

// ── Screen layout ─────────────────────────────────────────────────────────────

/// Rows 0 and 1 hold the HUD; the border's top edge sits on row 2.
const BORDER_TOP: u16 = 2;
/// Rows reserved below the playfield: bottom border and the touch bar.
const BOTTOM_ROWS: u16 = 2;
const SPECIAL_BAR_CELLS: usize = 10;

/// On-screen touch controls along the last row, clicked with the mouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchButton {
    Left,
    Fire,
    Right,
    Special,
}

impl TouchButton {
    const ALL: [TouchButton; 4] = [
        TouchButton::Left,
        TouchButton::Fire,
        TouchButton::Right,
        TouchButton::Special,
    ];

    fn label(self) -> &'static str {
        match self {
            TouchButton::Left => "◀",
            TouchButton::Fire => "FIRE",
            TouchButton::Right => "▶",
            TouchButton::Special => "SPECIAL",
        }
    }
}

/// The touch button under a terminal cell, if any. The bar splits the last
/// row into equal segments.
pub fn touch_button_at(col: u16, row: u16, cols: u16, rows: u16) -> Option<TouchButton> {
    if rows == 0 || row != rows - 1 || cols == 0 {
        return None;
    }
    let segment = (cols / TouchButton::ALL.len() as u16).max(1);
    TouchButton::ALL.get((col / segment) as usize).copied()
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn enemy_glyph(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::Flea => "ж",
        EnemyKind::Furball => "@",
        EnemyKind::Tick => "Ѫ",
    }
}

pub struct TerminalPresenter<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, cols: u16, rows: u16) -> Self {
        Self { out, cols, rows }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Map a world position onto a cell strictly inside the border.
    fn cell(&self, frame: &FrameSnapshot, x: f32, y: f32) -> Option<(u16, u16)> {
        let inner_w = self.cols.saturating_sub(2);
        let first_row = BORDER_TOP + 1;
        let last_row = self.rows.checked_sub(BOTTOM_ROWS + 1)?;
        if inner_w == 0 || last_row < first_row {
            return None;
        }
        let inner_h = last_row - first_row + 1;
        if x < 0.0 || y < 0.0 || x > frame.width || y > frame.height {
            return None;
        }
        let col = ((x / frame.width) * f32::from(inner_w)) as u16;
        let row = ((y / frame.height) * f32::from(inner_h)) as u16;
        Some((1 + col.min(inner_w - 1), first_row + row.min(inner_h - 1)))
    }

    fn put(&mut self, col: u16, row: u16, fg: Color, text: &str) -> std::io::Result<()> {
        self.out.queue(cursor::MoveTo(col, row))?;
        self.out.queue(style::SetForegroundColor(fg))?;
        self.out.queue(Print(text))?;
        Ok(())
    }

    fn put_world(
        &mut self,
        frame: &FrameSnapshot,
        x: f32,
        y: f32,
        fg: Color,
        text: &str,
    ) -> std::io::Result<()> {
        match self.cell(frame, x, y) {
            Some((col, row)) => {
                let half = text.chars().count() as u16 / 2;
                let col = col.saturating_sub(half).max(1);
                self.put(col, row, fg, text)
            }
            None => Ok(()),
        }
    }

    // ── Border ────────────────────────────────────────────────────────────────

    fn draw_border(&mut self) -> std::io::Result<()> {
        let w = self.cols as usize;
        let bottom = self.rows.saturating_sub(BOTTOM_ROWS);
        let inner = "─".repeat(w.saturating_sub(2));
        self.put(0, BORDER_TOP, C_BORDER, &format!("┌{}┐", inner))?;
        self.put(0, bottom, C_BORDER, &format!("└{}┘", inner))?;
        for row in BORDER_TOP + 1..bottom {
            self.put(0, row, C_BORDER, "│")?;
            self.put(self.cols.saturating_sub(1), row, C_BORDER, "│")?;
        }
        Ok(())
    }

    fn draw_danger_line(&mut self, frame: &FrameSnapshot) -> std::io::Result<()> {
        if let Some((_, row)) = self.cell(frame, 0.0, frame.danger_line) {
            let line = "┄".repeat(self.cols.saturating_sub(2) as usize);
            self.put(1, row, C_DANGER, &line)?;
        }
        Ok(())
    }

    // ── HUD (rows 0 and 1) ────────────────────────────────────────────────────

    fn draw_hud(&mut self, hud: &Hud) -> std::io::Result<()> {
        self.put(
            1,
            0,
            C_HUD_SCORE,
            &format!("Score:{:>6}  Hi:{:>6}", hud.score, hud.highscore),
        )?;

        let wave = format!("[ WAVE {}/{} ]", hud.wave, hud.total_waves);
        let wx = (self.cols / 2).saturating_sub(wave.chars().count() as u16 / 2);
        self.put(wx, 0, C_HUD_WAVE, &wave)?;

        let lives = format!("Lives:{}", "♥".repeat(hud.lives as usize));
        let lx = self.cols.saturating_sub(lives.chars().count() as u16 + 1);
        self.put(lx, 0, C_HUD_LIVES, &lives)?;

        if let Some(combo) = hud.combo {
            let badge = format!("COMBO {} x{}", combo.count, combo.multiplier);
            self.put(1, 1, C_COMBO, &badge)?;
        }

        if let Some(powerup) = hud.powerup {
            let filled = (powerup.remaining_fraction * 5.0).ceil() as usize;
            let tag = format!(
                "[{} {} {}{}]",
                powerup.icon,
                powerup.name,
                "█".repeat(filled.min(5)),
                "░".repeat(5 - filled.min(5)),
            );
            let px = (self.cols / 2).saturating_sub(tag.chars().count() as u16 / 2);
            let fg = color(powerup.kind.color());
            self.put(px, 1, fg, &tag)?;
        }

        let filled = ((hud.special_fraction() * SPECIAL_BAR_CELLS as f32) as usize)
            .min(SPECIAL_BAR_CELLS);
        let bar = if hud.special_ready() {
            "SPECIAL READY!".to_string()
        } else {
            format!(
                "SPECIAL [{}{}]",
                "#".repeat(filled),
                "-".repeat(SPECIAL_BAR_CELLS - filled)
            )
        };
        let sx = self.cols.saturating_sub(bar.chars().count() as u16 + 1);
        let fg = if hud.special_ready() {
            C_SPECIAL
        } else {
            C_HINT
        };
        self.put(sx, 1, fg, &bar)
    }

    // ── Entities ──────────────────────────────────────────────────────────────

    fn draw_entities(&mut self, frame: &FrameSnapshot) -> std::io::Result<()> {
        for p in &frame.particles {
            let glyph = if p.size > 2.0 { "•" } else { "·" };
            self.put_world(frame, p.x, p.y, color(p.color), glyph)?;
        }
        for enemy in &frame.enemies {
            let fg = color(enemy.kind.stats().color);
            self.put_world(frame, enemy.x, enemy.y, fg, enemy_glyph(enemy.kind))?;
        }
        for drop in &frame.mud {
            self.put_world(frame, drop.x, drop.y, color(C_MUD), "●")?;
        }
        for powerup in &frame.powerups {
            let icon = powerup.kind.icon().to_string();
            self.put_world(frame, powerup.x, powerup.y, color(powerup.kind.color()), &icon)?;
        }
        for bullet in &frame.bullets {
            self.put_world(frame, bullet.x, bullet.y, color(C_BULLET), "│")?;
        }
        let player = &frame.player;
        self.put_world(frame, player.x, player.y, color(C_PLAYER), "/▲\\")
    }

    // ── Touch bar (last row) ──────────────────────────────────────────────────

    fn draw_touch_bar(&mut self, special_ready: bool) -> std::io::Result<()> {
        let row = self.rows.saturating_sub(1);
        let segment = (self.cols / TouchButton::ALL.len() as u16).max(1);
        for (i, button) in TouchButton::ALL.iter().enumerate() {
            let label = format!("[ {} ]", button.label());
            let start = segment * i as u16;
            let col = start + (segment / 2).saturating_sub(label.chars().count() as u16 / 2);
            let fg = match button {
                TouchButton::Special if special_ready => C_SPECIAL,
                _ => C_HINT,
            };
            self.put(col, row, fg, &label)?;
        }
        Ok(())
    }

    // ── Overlays ──────────────────────────────────────────────────────────────

    /// Print `lines` centred as a block around the middle of the screen.
    fn draw_centered(&mut self, lines: &[(String, Color)]) -> std::io::Result<()> {
        let cx = self.cols / 2;
        let start_row = (self.rows / 2).saturating_sub(lines.len() as u16 / 2);
        for (i, (text, fg)) in lines.iter().enumerate() {
            let col = cx.saturating_sub(text.chars().count() as u16 / 2);
            self.put(col, start_row + i as u16, *fg, text)?;
        }
        Ok(())
    }

    fn draw_overlay(&mut self, overlay: &Overlay) -> std::io::Result<()> {
        let lines = match overlay {
            Overlay::Start { highscore } => {
                let mut lines = vec![(
                    "★  SPACE  GROOMERS  ★".to_string(),
                    Color::Cyan,
                )];
                if *highscore > 0 {
                    lines.push((format!("Best Score: {}", highscore), Color::Yellow));
                }
                lines.push((String::new(), C_HINT));
                lines.push((
                    "Groom the swarm before it reaches the line!".to_string(),
                    Color::White,
                ));
                lines.push((
                    "← → / A D : Move   SPACE : Shoot   SHIFT/CTRL : Special".to_string(),
                    C_HINT,
                ));
                lines.push(("ENTER - Start  Q - Quit".to_string(), Color::White));
                lines
            }
            Overlay::WaveIntro { wave, bonus } => {
                let mut lines = vec![(format!("W A V E  {}", wave), Color::Cyan)];
                if let Some(bonus) = bonus {
                    lines.push((format!("PERFECT WAVE  +{}", bonus), Color::Yellow));
                }
                lines
            }
            Overlay::GameOver(summary) => summary_lines("GAME  OVER", Color::Red, summary),
            Overlay::Victory(summary) => summary_lines("V I C T O R Y", Color::Green, summary),
        };
        self.draw_centered(&lines)
    }
}

fn summary_lines(title: &str, title_color: Color, summary: &Summary) -> Vec<(String, Color)> {
    let mut lines = vec![
        ("╔════════════════════╗".to_string(), title_color),
        (format!("║{:^20}║", title), title_color),
        ("╚════════════════════╝".to_string(), title_color),
        (format!("Final Score: {:>6}", summary.score), Color::Yellow),
    ];
    if summary.new_best {
        lines.push((format!("★ NEW BEST: {:>6} ★", summary.highscore), Color::Yellow));
    } else {
        lines.push((format!("Best Score:  {:>6}", summary.highscore), C_HINT));
    }
    for (kind, count) in &summary.kills {
        lines.push((
            format!("{} {:<8}{:>4}", enemy_glyph(*kind), kind.name(), count),
            color(kind.stats().color),
        ));
    }
    lines.push(("R - Play Again  Q - Quit".to_string(), Color::White));
    lines
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    /// Render one complete frame.
    fn present(&mut self, frame: &FrameSnapshot) -> std::io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;

        self.draw_hud(&frame.hud)?;
        self.draw_border()?;
        self.draw_danger_line(frame)?;
        self.draw_entities(frame)?;
        self.draw_touch_bar(frame.hud.special_ready())?;
        if let Some(overlay) = &frame.overlay {
            self.draw_overlay(overlay)?;
        }

        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.rows.saturating_sub(1)))?;
        self.out.flush()?;
        Ok(())
    }
}
