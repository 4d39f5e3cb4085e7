//! Gann Square expansion
//!
//! A 7x7 spiral of the 49 draw numbers (1 at the center, winding clockwise
//! outward) plus two pure coordinate-expansion helpers. The prediction API
//! consumes these as plain functions; nothing here touches the store.

use crate::domain::DrawRecord;

const GRID_SIZE: u8 = 7;

/// Rows top to bottom; `SQUARE[y - 1][x - 1]` is the position at (x, y).
const SQUARE: [[u8; GRID_SIZE as usize]; GRID_SIZE as usize] = [
    [31, 32, 33, 34, 35, 36, 37],
    [30, 13, 14, 15, 16, 17, 38],
    [29, 12, 3, 4, 5, 18, 39],
    [28, 11, 2, 1, 6, 19, 40],
    [27, 10, 9, 8, 7, 20, 41],
    [26, 25, 24, 23, 22, 21, 42],
    [49, 48, 47, 46, 45, 44, 43],
];

/// (x, y) cell of a position, 1-based from the top-left.
fn coordinates(position: u8) -> Option<(u8, u8)> {
    for (row, numbers) in SQUARE.iter().enumerate() {
        for (col, &n) in numbers.iter().enumerate() {
            if n == position {
                return Some((col as u8 + 1, row as u8 + 1));
            }
        }
    }
    None
}

fn position_at(x: u8, y: u8) -> Option<u8> {
    if !(1..=GRID_SIZE).contains(&x) || !(1..=GRID_SIZE).contains(&y) {
        return None;
    }
    Some(SQUARE[y as usize - 1][x as usize - 1])
}

/// Line-up expansion: whenever two or more seed numbers share a column the
/// whole column joins the result, likewise for rows. Seeds that line up
/// nowhere contribute nothing; numbers outside the square are ignored.
pub fn lineup_expansion(seed: &[u8]) -> Vec<u8> {
    let coords: Vec<(u8, u8)> = seed.iter().filter_map(|&n| coordinates(n)).collect();

    let mut x_counts = [0u8; GRID_SIZE as usize + 1];
    let mut y_counts = [0u8; GRID_SIZE as usize + 1];
    for &(x, y) in &coords {
        x_counts[x as usize] += 1;
        y_counts[y as usize] += 1;
    }

    let mut expanded: Vec<u8> = Vec::new();
    for x in 1..=GRID_SIZE {
        if x_counts[x as usize] >= 2 {
            for y in 1..=GRID_SIZE {
                if let Some(p) = position_at(x, y) {
                    expanded.push(p);
                }
            }
        }
    }
    for y in 1..=GRID_SIZE {
        if y_counts[y as usize] >= 2 {
            for x in 1..=GRID_SIZE {
                if let Some(p) = position_at(x, y) {
                    expanded.push(p);
                }
            }
        }
    }

    expanded.sort_unstable();
    expanded.dedup();
    expanded
}

/// Radiate expansion: the full row, column and both diagonals through the
/// position's cell. Unknown positions expand to nothing.
pub fn radiate_expansion(position: u8) -> Vec<u8> {
    let Some((cx, cy)) = coordinates(position) else {
        return Vec::new();
    };
    let (cx, cy) = (i16::from(cx), i16::from(cy));

    let mut expanded: Vec<u8> = Vec::new();
    for i in 1..=i16::from(GRID_SIZE) {
        // Row and column.
        push_cell(&mut expanded, cx, i);
        push_cell(&mut expanded, i, cy);
        // Both diagonals, offset by distance from the center cell.
        let offset = i - cx;
        push_cell(&mut expanded, i, cy + offset);
        push_cell(&mut expanded, i, cy - offset);
    }

    expanded.sort_unstable();
    expanded.dedup();
    expanded
}

fn push_cell(out: &mut Vec<u8>, x: i16, y: i16) {
    if (1..=i16::from(GRID_SIZE)).contains(&x) && (1..=i16::from(GRID_SIZE)).contains(&y) {
        if let Some(p) = position_at(x as u8, y as u8) {
            out.push(p);
        }
    }
}

/// Rank expanded numbers by how often they appeared in past draws (main
/// numbers and extras both count). Most popular first, ties ascending.
pub fn rank_by_popularity(expanded: &[u8], history: &[DrawRecord]) -> Vec<(u8, u32)> {
    let mut ranked: Vec<(u8, u32)> = expanded
        .iter()
        .map(|&n| {
            let count = history
                .iter()
                .map(|draw| {
                    let mains = draw.numbers.iter().filter(|&&m| m == n).count() as u32;
                    mains + u32::from(draw.extra_number == n)
                })
                .sum();
            (n, count)
        })
        .collect();
    ranked.sort_unstable();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_holds_each_position_once() {
        let mut seen = [false; 50];
        for row in &SQUARE {
            for &n in row {
                assert!((1..=49).contains(&n));
                assert!(!seen[n as usize], "position {n} appears twice");
                seen[n as usize] = true;
            }
        }
    }

    #[test]
    fn test_coordinates_round_trip() {
        for position in 1..=49u8 {
            let (x, y) = coordinates(position).unwrap();
            assert_eq!(position_at(x, y), Some(position));
        }
        assert_eq!(coordinates(0), None);
        assert_eq!(coordinates(50), None);
    }

    #[test]
    fn test_lineup_expands_shared_rows() {
        // 3 and 4 sit on the same row of the square; the whole row joins.
        let expanded = lineup_expansion(&[3, 4]);
        assert_eq!(expanded, vec![3, 4, 5, 12, 18, 29, 39]);
    }

    #[test]
    fn test_lineup_expands_shared_columns() {
        // 15 (x=4,y=2) and 8 (x=4,y=5) share a column.
        let expanded = lineup_expansion(&[15, 8]);
        assert_eq!(expanded, vec![1, 4, 8, 15, 23, 34, 46]);
    }

    #[test]
    fn test_lineup_without_alignment_is_empty() {
        // 31 (1,1) and 7 (5,5) share no row or column.
        assert!(lineup_expansion(&[31, 7]).is_empty());
        assert!(lineup_expansion(&[]).is_empty());
        assert!(lineup_expansion(&[99]).is_empty());
    }

    #[test]
    fn test_radiate_from_center_covers_cross_and_diagonals() {
        let expanded = radiate_expansion(1);
        let mut expected = vec![
            28, 11, 2, 1, 6, 19, 40, // row
            34, 15, 4, 8, 23, 46, // column
            31, 13, 3, 7, 21, 43, // main diagonal
            49, 25, 9, 5, 17, 37, // anti-diagonal
        ];
        expected.sort_unstable();
        expected.dedup();
        assert_eq!(expanded, expected);
    }

    #[test]
    fn test_radiate_from_corner_stays_in_bounds() {
        let expanded = radiate_expansion(31);
        assert!(!expanded.is_empty());
        assert!(expanded.iter().all(|&n| (1..=49).contains(&n)));
        assert_eq!(radiate_expansion(0), Vec::<u8>::new());
    }

    #[test]
    fn test_popularity_ranking_orders_by_frequency_then_number() {
        let history = vec![
            DrawRecord {
                draw_date: "2024-01-02".parse().unwrap(),
                numbers: vec![3, 4, 5, 10, 11, 12],
                extra_number: 4,
                draw_no: String::new(),
            },
            DrawRecord {
                draw_date: "2024-01-05".parse().unwrap(),
                numbers: vec![4, 20, 21, 22, 23, 24],
                extra_number: 3,
                draw_no: String::new(),
            },
        ];
        let ranked = rank_by_popularity(&[3, 4, 5, 39], &history);
        // 4 appears three times (twice main, once extra), 3 twice, 5 once.
        assert_eq!(ranked[0], (4, 3));
        assert_eq!(ranked[1], (3, 2));
        assert_eq!(ranked[2], (5, 1));
        assert_eq!(ranked[3], (39, 0));
    }
}
