use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use thiserror::Error;

use crate::agent::Role;
use crate::geometry::Vec2;
use crate::sim::{Frame, Renderer};

const BACKGROUND: Rgb<u8> = Rgb([25, 25, 30]);
const GOAL: Rgb<u8> = Rgb([240, 60, 60]);
const HEADING: Rgb<u8> = Rgb([200, 200, 200]);

fn role_colour(role: Role) -> Rgb<u8> {
    match role {
        Role::Wanderer => Rgb([0, 200, 0]),
        Role::Avoider => Rgb([0, 220, 120]),
        Role::Seeker => Rgb([80, 160, 255]),
        Role::Leader => Rgb([250, 210, 70]),
        Role::Follower => Rgb([80, 210, 255]),
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create frame directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write frame {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Draws the coverage heatmap (when tracked), the goal and every agent.
#[derive(Debug, Clone)]
pub struct PngRenderer {
    dir: PathBuf,
    /// Only every `every`-th tick is written.
    every: u64,
    show_headings: bool,
    written: usize,
}

impl PngRenderer {
    pub fn new(dir: impl AsRef<Path>, every: u64) -> Result<Self, RenderError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| RenderError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(PngRenderer {
            dir,
            every: every.max(1),
            show_headings: false,
            written: 0,
        })
    }

    pub fn with_headings(mut self, show: bool) -> Self {
        self.show_headings = show;
        self
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }

    pub fn draw(&self, frame: &Frame<'_>) -> RgbImage {
        let width = frame.world.width.ceil() as u32;
        let height = frame.world.height.ceil() as u32;
        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

        if let Some(grid) = frame.coverage {
            for (x, y, pixel) in img.enumerate_pixels_mut() {
                let cell = grid.cell_of(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let intensity = (grid.normalized_intensity(cell) * 255.0) as u8;
                *pixel = Rgb([intensity, intensity, intensity]);
            }
        }

        let radius = frame.world.agent_radius;
        if frame.agents.iter().any(|a| a.role == Role::Seeker) {
            fill_disc(&mut img, frame.goal, 8.0, GOAL);
        }
        for agent in frame.agents {
            fill_disc(&mut img, agent.position, radius, role_colour(agent.role));
            if self.show_headings {
                let tip = agent.position + agent.direction() * (radius * 2.0);
                draw_line(&mut img, agent.position, tip, HEADING);
            }
        }
        img
    }
}

impl Renderer for PngRenderer {
    type Error = RenderError;

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if frame.tick % self.every != 0 {
            return Ok(());
        }
        let path = self.dir.join(format!("frame_{:0>8}.png", frame.tick));
        self.draw(frame)
            .save(&path)
            .map_err(|source| RenderError::Write { path, source })?;
        self.written += 1;
        Ok(())
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, colour: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, colour);
    }
}

fn fill_disc(img: &mut RgbImage, centre: Vec2, radius: f32, colour: Rgb<u8>) {
    let r = radius.ceil() as i64;
    let (cx, cy) = (centre.x.round() as i64, centre.y.round() as i64);
    let limit = radius * radius;
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= limit {
                put(img, cx + dx, cy + dy, colour);
            }
        }
    }
}

fn draw_line(img: &mut RgbImage, from: Vec2, to: Vec2, colour: Rgb<u8>) {
    let steps = (to - from).norm().ceil().max(1.0) as usize;
    for i in 0..=steps {
        let p = from + (to - from) * (i as f32 / steps as f32);
        put(img, p.x.round() as i64, p.y.round() as i64, colour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::bounds::World;
    use crate::coverage::{Cell, CoverageGrid};

    fn renderer() -> PngRenderer {
        PngRenderer {
            dir: PathBuf::new(),
            every: 1,
            show_headings: false,
            written: 0,
        }
    }

    #[test]
    fn agents_are_drawn_in_role_colour() {
        let world = World::new(60.0, 40.0, 3.0).unwrap();
        let agents = [Agent::new(0, Vec2::new(20.0, 20.0), 0.0, 1.0, Role::Leader)];
        let frame = Frame {
            tick: 0,
            world: &world,
            agents: &agents,
            goal: world.center(),
            leader: Some(agents[0].position),
            coverage: None,
        };
        let img = renderer().draw(&frame);
        assert_eq!(img.dimensions(), (60, 40));
        assert_eq!(*img.get_pixel(20, 20), role_colour(Role::Leader));
        assert_eq!(*img.get_pixel(1, 1), BACKGROUND);
    }

    #[test]
    fn heading_marker_points_along_direction() {
        let world = World::new(60.0, 40.0, 3.0).unwrap();
        let agents = [Agent::new(0, Vec2::new(20.0, 20.0), 0.0, 1.0, Role::Wanderer)];
        let frame = Frame {
            tick: 0,
            world: &world,
            agents: &agents,
            goal: world.center(),
            leader: None,
            coverage: None,
        };
        let img = renderer().with_headings(true).draw(&frame);
        assert_eq!(*img.get_pixel(25, 20), HEADING);
        assert_eq!(*img.get_pixel(15, 20), BACKGROUND);
    }

    #[test]
    fn heatmap_brightest_where_visited_most() {
        let world = World::new(40.0, 40.0, 2.0).unwrap();
        let mut grid = CoverageGrid::new(40.0, 40.0, 10.0).unwrap();
        grid.increment(Cell { col: 3, row: 3 });
        grid.increment(Cell { col: 3, row: 3 });
        grid.increment(Cell { col: 0, row: 0 });
        let frame = Frame {
            tick: 0,
            world: &world,
            agents: &[],
            goal: world.center(),
            leader: None,
            coverage: Some(&grid),
        };
        let img = renderer().draw(&frame);
        assert_eq!(*img.get_pixel(35, 35), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(5, 5), Rgb([127, 127, 127]));
        assert_eq!(*img.get_pixel(15, 35), Rgb([0, 0, 0]));
    }
}
