//! Enclosure detection for a closed loop of cells.
//!
//! Both sides of every loop edge are flood filled with their own color. A
//! color that never reaches the outermost row or column is enclosed.

use super::state::{Direction, GridPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Open,
    Boundary,
    /// Left of the travel direction
    Left,
    /// Right of the travel direction
    Right,
}

pub struct Enclosure {
    length: u32,
    width: u32,
    table: Vec<Mark>,
    boundary: Vec<GridPos>,
}

impl Enclosure {
    pub fn new(boundary: &[GridPos], length: u32, width: u32) -> Self {
        let mut enclosure = Self {
            length,
            width,
            table: vec![Mark::Open; (length * width) as usize],
            boundary: boundary.to_vec(),
        };
        for pos in boundary {
            if let Some(idx) = enclosure.pos_to_index(pos) {
                enclosure.table[idx] = Mark::Boundary;
            }
        }
        enclosure
    }

    fn pos_to_index(&self, pos: &GridPos) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.length && (pos.y as u32) < self.width {
            Some((pos.x as u32 * self.width + pos.y as u32) as usize)
        } else {
            None
        }
    }

    fn index_to_pos(&self, idx: usize) -> GridPos {
        GridPos::new((idx as u32 / self.width) as i32, (idx as u32 % self.width) as i32)
    }

    fn on_border(&self, idx: usize) -> bool {
        let pos = self.index_to_pos(idx);
        pos.x == 0
            || pos.y == 0
            || pos.x as u32 == self.length - 1
            || pos.y as u32 == self.width - 1
    }

    /// Colors every open cell 4-connected to `start`.
    fn flood_fill(&mut self, start: GridPos, mark: Mark) {
        let Some(idx) = self.pos_to_index(&start) else {
            return;
        };
        if self.table[idx] != Mark::Open {
            return;
        }

        self.table[idx] = mark;
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            for dir in Direction::ALL {
                let next = pos.moved(dir);
                if let Some(n) = self.pos_to_index(&next) {
                    if self.table[n] == Mark::Open {
                        self.table[n] = mark;
                        stack.push(next);
                    }
                }
            }
        }
    }

    fn is_enclosed(&self, mark: Mark) -> bool {
        !self
            .table
            .iter()
            .enumerate()
            .any(|(idx, m)| *m == mark && self.on_border(idx))
    }

    /// Cells of every side region that does not touch the grid border,
    /// in row-major order. Loop cells themselves are never included.
    pub fn calc(mut self) -> Vec<GridPos> {
        let n = self.boundary.len();
        for i in 0..n {
            let current = self.boundary[i];
            let previous = self.boundary[(i + n - 1) % n];
            let Some(travel) = Direction::between(previous, current) else {
                continue;
            };

            self.flood_fill(current.moved(travel.turned_left()), Mark::Left);
            self.flood_fill(current.moved(travel.turned_right()), Mark::Right);
        }

        let accepted: Vec<Mark> = [Mark::Left, Mark::Right]
            .into_iter()
            .filter(|mark| self.is_enclosed(*mark))
            .collect();

        self.table
            .iter()
            .enumerate()
            .filter(|(_, m)| accepted.contains(m))
            .map(|(idx, _)| self.index_to_pos(idx))
            .collect()
    }
}

/// Convenience wrapper over [`Enclosure::calc`].
pub fn enclosed_cells(boundary: &[GridPos], length: u32, width: u32) -> Vec<GridPos> {
    Enclosure::new(boundary, length, width).calc()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(top: i32, left: i32, bottom: i32, right: i32) -> Vec<GridPos> {
        let mut cells = Vec::new();
        for y in left..=right {
            cells.push(GridPos::new(top, y));
        }
        for x in top + 1..=bottom {
            cells.push(GridPos::new(x, right));
        }
        for y in (left..right).rev() {
            cells.push(GridPos::new(bottom, y));
        }
        for x in (top + 1..bottom).rev() {
            cells.push(GridPos::new(x, left));
        }
        cells
    }

    #[test]
    fn test_interior_rectangle_returns_exact_interior() {
        let boundary = ring(2, 2, 6, 7);
        let mut result = enclosed_cells(&boundary, 10, 10);
        result.sort();

        let mut expected = Vec::new();
        for x in 3..6 {
            for y in 3..7 {
                expected.push(GridPos::new(x, y));
            }
        }
        assert_eq!(result, expected);
        assert!(result.iter().all(|c| !boundary.contains(c)));
    }

    #[test]
    fn test_direction_of_travel_does_not_matter() {
        let mut boundary = ring(1, 1, 3, 3);
        boundary.reverse();
        assert_eq!(enclosed_cells(&boundary, 5, 5), vec![GridPos::new(2, 2)]);
    }

    #[test]
    fn test_loop_on_border_still_encloses_interior() {
        let boundary = ring(0, 0, 2, 2);
        assert_eq!(enclosed_cells(&boundary, 6, 6), vec![GridPos::new(1, 1)]);
    }

    #[test]
    fn test_region_touching_border_is_rejected() {
        // Open square around the corner: the inside reaches row 0.
        let boundary = vec![
            GridPos::new(0, 2),
            GridPos::new(1, 2),
            GridPos::new(2, 2),
            GridPos::new(2, 1),
            GridPos::new(2, 0),
        ];
        assert!(enclosed_cells(&boundary, 6, 6).is_empty());
    }

    #[test]
    fn test_loop_without_interior() {
        let boundary = vec![
            GridPos::new(1, 1),
            GridPos::new(1, 2),
            GridPos::new(2, 2),
            GridPos::new(2, 1),
        ];
        assert!(enclosed_cells(&boundary, 5, 5).is_empty());
    }

    #[test]
    fn test_loop_hugging_whole_grid() {
        // Interior cells of a 4x4 grid are enclosed by its outer ring.
        let boundary = ring(0, 0, 3, 3);
        let mut result = enclosed_cells(&boundary, 4, 4);
        result.sort();
        assert_eq!(
            result,
            vec![
                GridPos::new(1, 1),
                GridPos::new(1, 2),
                GridPos::new(2, 1),
                GridPos::new(2, 2),
            ]
        );
    }
}
