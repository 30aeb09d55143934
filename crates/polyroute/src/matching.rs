//! Perfect matching on a complete weighted graph.
//!
//! Purpose
//! - Pair up the odd-degree vertices of a mesh at minimum total path length.
//!
//! Why this design
//! - Edmonds' weighted blossom algorithm in its dense `O(n^3)` form. Vertices
//!   and blossoms share one index space (`1..=n` vertices, `n+1..` blossoms,
//!   `0` is "none") so every link is a plain array lookup.
//! - Costs are flipped to `top - w` and quantized to positive integers: on a
//!   complete graph with positive weights a maximum-weight matching is always
//!   perfect, and integer duals keep the tightness tests exact.
//!
//! Weights must be finite and non-negative.

use std::collections::VecDeque;

use thiserror::Error;

/// Largest quantized weight; leaves headroom for dual sums in `i64`.
const QUANTUM_RANGE: f64 = (1u64 << 40) as f64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchingError {
    #[error("weight matrix is not square (row {row} has {len} entries, expected {expected})")]
    NotSquare { row: usize, len: usize, expected: usize },
    #[error("perfect matching needs an even vertex count, got {0}")]
    OddCount(usize),
    #[error("weight ({i}, {j}) = {w} is negative or not finite")]
    InvalidWeight { i: usize, j: usize, w: f64 },
}

fn validate(weights: &[Vec<f64>]) -> Result<usize, MatchingError> {
    let n = weights.len();
    for (row, r) in weights.iter().enumerate() {
        if r.len() != n {
            return Err(MatchingError::NotSquare {
                row,
                len: r.len(),
                expected: n,
            });
        }
        for (col, &w) in r.iter().enumerate() {
            if row != col && (!w.is_finite() || w < 0.0) {
                return Err(MatchingError::InvalidWeight { i: row, j: col, w });
            }
        }
    }
    if n % 2 == 1 {
        return Err(MatchingError::OddCount(n));
    }
    Ok(n)
}

/// Total weight of a matching.
pub fn matching_weight(weights: &[Vec<f64>], pairs: &[(usize, usize)]) -> f64 {
    pairs.iter().map(|&(i, j)| weights[i][j]).sum()
}

fn off_diagonal(weights: &[Vec<f64>]) -> impl Iterator<Item = f64> + '_ {
    weights
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.iter().enumerate().filter(move |(j, _)| *j != i))
        .map(|(_, &w)| w)
}

/// Minimum-weight perfect matching; pairs are returned with `i < j`, sorted.
pub fn min_weight_perfect_matching(
    weights: &[Vec<f64>],
) -> Result<Vec<(usize, usize)>, MatchingError> {
    let n = validate(weights)?;
    if n == 0 {
        return Ok(Vec::new());
    }
    let top = off_diagonal(weights).fold(0.0_f64, f64::max);
    let low = off_diagonal(weights).fold(top, f64::min);
    let range = top - low;
    let scale = if range > 0.0 { QUANTUM_RANGE / range } else { 1.0 };
    let mut solver = Blossom::new(n);
    for i in 0..n {
        for j in 0..n {
            if i != j {
                // strictly positive so the matching is perfect
                let w = ((top - weights[i][j]) * scale).round() as i64 + 1;
                solver.set_weight(i + 1, j + 1, w);
            }
        }
    }
    solver.solve();
    let mut pairs: Vec<(usize, usize)> = (1..=n)
        .filter(|&u| solver.mate[u] > u)
        .map(|u| (u - 1, solver.mate[u] - 1))
        .collect();
    pairs.sort_unstable();
    Ok(pairs)
}

/// Maximum-weight perfect matching, via `W - w` on the minimum solver.
pub fn max_weight_perfect_matching(
    weights: &[Vec<f64>],
) -> Result<Vec<(usize, usize)>, MatchingError> {
    validate(weights)?;
    let top = off_diagonal(weights).fold(0.0_f64, f64::max);
    let flipped: Vec<Vec<f64>> = weights
        .iter()
        .enumerate()
        .map(|(i, r)| {
            r.iter()
                .enumerate()
                .map(|(j, &w)| if i == j { 0.0 } else { top - w })
                .collect()
        })
        .collect();
    min_weight_perfect_matching(&flipped)
}

#[derive(Clone, Copy, Debug, Default)]
struct Arc {
    u: usize,
    v: usize,
    w: i64,
}

const UNLABELED: i8 = -1;
const OUTER: i8 = 0;
const INNER: i8 = 1;

/// Dense maximum-weight matching over positive integer weights.
struct Blossom {
    n: usize,
    n_x: usize,
    g: Vec<Vec<Arc>>,
    dual: Vec<i64>,
    mate: Vec<usize>,
    slack: Vec<usize>,
    top: Vec<usize>, // outermost blossom containing each index
    parent: Vec<usize>,
    flower_from: Vec<Vec<usize>>,
    label: Vec<i8>,
    seen: Vec<usize>,
    stamp: usize,
    flower: Vec<Vec<usize>>,
    queue: VecDeque<usize>,
}

impl Blossom {
    fn new(n: usize) -> Self {
        let m = 2 * n + 1;
        let mut g = vec![vec![Arc::default(); m]; m];
        for (u, row) in g.iter_mut().enumerate().take(n + 1).skip(1) {
            for (v, arc) in row.iter_mut().enumerate().take(n + 1).skip(1) {
                *arc = Arc { u, v, w: 0 };
            }
        }
        let mut flower_from = vec![vec![0; n + 1]; m];
        for (u, row) in flower_from.iter_mut().enumerate().take(n + 1).skip(1) {
            row[u] = u;
        }
        Self {
            n,
            n_x: n,
            g,
            dual: vec![0; m],
            mate: vec![0; m],
            slack: vec![0; m],
            top: (0..m).map(|x| if x <= n { x } else { 0 }).collect(),
            parent: vec![0; m],
            flower_from,
            label: vec![UNLABELED; m],
            seen: vec![0; m],
            stamp: 0,
            flower: vec![Vec::new(); m],
            queue: VecDeque::new(),
        }
    }

    fn set_weight(&mut self, u: usize, v: usize, w: i64) {
        self.g[u][v].w = w;
    }

    #[inline]
    fn delta(&self, e: Arc) -> i64 {
        self.dual[e.u] + self.dual[e.v] - 2 * e.w
    }

    fn update_slack(&mut self, u: usize, x: usize) {
        let s = self.slack[x];
        if s == 0 || self.delta(self.g[u][x]) < self.delta(self.g[s][x]) {
            self.slack[x] = u;
        }
    }

    fn set_slack(&mut self, x: usize) {
        self.slack[x] = 0;
        for u in 1..=self.n {
            if self.g[u][x].w > 0 && self.top[u] != x && self.label[self.top[u]] == OUTER {
                self.update_slack(u, x);
            }
        }
    }

    fn push(&mut self, x: usize) {
        if x <= self.n {
            self.queue.push_back(x);
        } else {
            for i in 0..self.flower[x].len() {
                let y = self.flower[x][i];
                self.push(y);
            }
        }
    }

    fn set_top(&mut self, x: usize, b: usize) {
        self.top[x] = b;
        if x > self.n {
            for i in 0..self.flower[x].len() {
                let y = self.flower[x][i];
                self.set_top(y, b);
            }
        }
    }

    /// Even position of `xr` in blossom `b`, flipping the cycle if needed.
    fn even_position(&mut self, b: usize, xr: usize) -> usize {
        let pos = self.flower[b].iter().position(|&x| x == xr).unwrap_or(0);
        if pos % 2 == 1 {
            self.flower[b][1..].reverse();
            self.flower[b].len() - pos
        } else {
            pos
        }
    }

    fn set_match(&mut self, u: usize, v: usize) {
        self.mate[u] = self.g[u][v].v;
        if u > self.n {
            let e = self.g[u][v];
            let xr = self.flower_from[u][e.u];
            let pr = self.even_position(u, xr);
            for i in 0..pr {
                let (a, b) = (self.flower[u][i], self.flower[u][i ^ 1]);
                self.set_match(a, b);
            }
            self.set_match(xr, v);
            self.flower[u].rotate_left(pr);
        }
    }

    fn augment(&mut self, mut u: usize, mut v: usize) {
        loop {
            let xnv = self.top[self.mate[u]];
            self.set_match(u, v);
            if xnv == 0 {
                return;
            }
            let next = self.top[self.parent[xnv]];
            self.set_match(xnv, next);
            u = next;
            v = xnv;
        }
    }

    fn lca(&mut self, mut u: usize, mut v: usize) -> usize {
        self.stamp += 1;
        while u != 0 || v != 0 {
            if u != 0 {
                if self.seen[u] == self.stamp {
                    return u;
                }
                self.seen[u] = self.stamp;
                u = self.top[self.mate[u]];
                if u != 0 {
                    u = self.top[self.parent[u]];
                }
            }
            std::mem::swap(&mut u, &mut v);
        }
        0
    }

    fn add_blossom(&mut self, u: usize, lca: usize, v: usize) {
        let mut b = self.n + 1;
        while b <= self.n_x && self.top[b] != 0 {
            b += 1;
        }
        if b > self.n_x {
            self.n_x += 1;
        }
        self.dual[b] = 0;
        self.label[b] = OUTER;
        self.mate[b] = self.mate[lca];
        self.flower[b].clear();
        self.flower[b].push(lca);
        for (start, flip) in [(u, true), (v, false)] {
            let mut x = start;
            while x != lca {
                let y = self.top[self.mate[x]];
                self.flower[b].push(x);
                self.flower[b].push(y);
                self.push(y);
                x = self.top[self.parent[y]];
            }
            if flip {
                self.flower[b][1..].reverse();
            }
        }
        self.set_top(b, b);
        for x in 1..=self.n_x {
            self.g[b][x].w = 0;
            self.g[x][b].w = 0;
        }
        for x in 1..=self.n {
            self.flower_from[b][x] = 0;
        }
        for i in 0..self.flower[b].len() {
            let xs = self.flower[b][i];
            for x in 1..=self.n_x {
                if self.g[b][x].w == 0 || self.delta(self.g[xs][x]) < self.delta(self.g[b][x]) {
                    self.g[b][x] = self.g[xs][x];
                    self.g[x][b] = self.g[x][xs];
                }
            }
            for x in 1..=self.n {
                if self.flower_from[xs][x] != 0 {
                    self.flower_from[b][x] = xs;
                }
            }
        }
        self.set_slack(b);
    }

    /// Dissolve an inner blossom whose dual reached zero.
    fn expand_blossom(&mut self, b: usize) {
        for i in 0..self.flower[b].len() {
            let y = self.flower[b][i];
            self.set_top(y, y);
        }
        let xr = self.flower_from[b][self.g[b][self.parent[b]].u];
        let pr = self.even_position(b, xr);
        for i in (0..pr).step_by(2) {
            let (xs, xns) = (self.flower[b][i], self.flower[b][i + 1]);
            self.parent[xs] = self.g[xns][xs].u;
            self.label[xs] = INNER;
            self.label[xns] = OUTER;
            self.slack[xs] = 0;
            self.set_slack(xns);
            self.push(xns);
        }
        self.label[xr] = INNER;
        self.parent[xr] = self.parent[b];
        for i in (pr + 1)..self.flower[b].len() {
            let xs = self.flower[b][i];
            self.label[xs] = UNLABELED;
            self.set_slack(xs);
        }
        self.top[b] = 0;
    }

    /// Handle a tight edge; true when it completed an augmentation.
    fn on_tight(&mut self, e: Arc) -> bool {
        let (u, v) = (self.top[e.u], self.top[e.v]);
        if self.label[v] == UNLABELED {
            self.parent[v] = e.u;
            self.label[v] = INNER;
            let nu = self.top[self.mate[v]];
            self.slack[v] = 0;
            self.slack[nu] = 0;
            self.label[nu] = OUTER;
            self.push(nu);
        } else if self.label[v] == OUTER {
            let lca = self.lca(u, v);
            if lca == 0 {
                self.augment(u, v);
                self.augment(v, u);
                return true;
            }
            self.add_blossom(u, lca, v);
        }
        false
    }

    /// One augmentation phase; false when no augmenting path remains.
    fn phase(&mut self) -> bool {
        for x in 1..=self.n_x {
            self.label[x] = UNLABELED;
            self.slack[x] = 0;
        }
        self.queue.clear();
        for x in 1..=self.n_x {
            if self.top[x] == x && self.mate[x] == 0 {
                self.parent[x] = 0;
                self.label[x] = OUTER;
                self.push(x);
            }
        }
        if self.queue.is_empty() {
            return false;
        }
        loop {
            while let Some(u) = self.queue.pop_front() {
                if self.label[self.top[u]] == INNER {
                    continue;
                }
                for v in 1..=self.n {
                    if self.g[u][v].w > 0 && self.top[u] != self.top[v] {
                        if self.delta(self.g[u][v]) == 0 {
                            if self.on_tight(self.g[u][v]) {
                                return true;
                            }
                        } else {
                            self.update_slack(u, self.top[v]);
                        }
                    }
                }
            }

            let mut d = i64::MAX;
            for b in (self.n + 1)..=self.n_x {
                if self.top[b] == b && self.label[b] == INNER {
                    d = d.min(self.dual[b] / 2);
                }
            }
            for x in 1..=self.n_x {
                let s = self.slack[x];
                if self.top[x] == x && s != 0 {
                    let gap = self.delta(self.g[s][x]);
                    match self.label[x] {
                        UNLABELED => d = d.min(gap),
                        OUTER => d = d.min(gap / 2),
                        _ => {}
                    }
                }
            }
            for u in 1..=self.n {
                match self.label[self.top[u]] {
                    OUTER => {
                        if self.dual[u] <= d {
                            return false;
                        }
                        self.dual[u] -= d;
                    }
                    INNER => self.dual[u] += d,
                    _ => {}
                }
            }
            for b in (self.n + 1)..=self.n_x {
                if self.top[b] == b {
                    match self.label[b] {
                        OUTER => self.dual[b] += 2 * d,
                        INNER => self.dual[b] -= 2 * d,
                        _ => {}
                    }
                }
            }

            self.queue.clear();
            let mut x = 1;
            while x <= self.n_x {
                let s = self.slack[x];
                if self.top[x] == x
                    && s != 0
                    && self.top[s] != x
                    && self.delta(self.g[s][x]) == 0
                    && self.on_tight(self.g[s][x])
                {
                    return true;
                }
                x += 1;
            }
            for b in (self.n + 1)..=self.n_x {
                if self.top[b] == b && self.label[b] == INNER && self.dual[b] == 0 {
                    self.expand_blossom(b);
                }
            }
        }
    }

    fn solve(&mut self) {
        let w_max = (1..=self.n)
            .flat_map(|u| (1..=self.n).map(move |v| (u, v)))
            .map(|(u, v)| self.g[u][v].w)
            .max()
            .unwrap_or(0);
        for u in 1..=self.n {
            self.dual[u] = w_max;
        }
        while self.phase() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Bitmask DP over subsets; exponential, used as an oracle.
    fn exact(weights: &[Vec<f64>]) -> Vec<(usize, usize)> {
        let n = weights.len();
        if n == 0 {
            return Vec::new();
        }
        let full = (1usize << n) - 1;
        // best[mask]: cheapest way to match the vertices outside `mask`
        let mut best = vec![f64::INFINITY; full + 1];
        // partner of the lowest free vertex
        let mut choice = vec![0u8; full + 1];
        best[full] = 0.0;
        for mask in (0..full).rev() {
            if mask.count_ones() % 2 == 1 {
                continue;
            }
            let i = (!mask).trailing_zeros() as usize;
            for j in (i + 1)..n {
                if mask & (1 << j) != 0 {
                    continue;
                }
                let cost = weights[i][j] + best[mask | (1 << i) | (1 << j)];
                if cost < best[mask] {
                    best[mask] = cost;
                    choice[mask] = j as u8;
                }
            }
        }
        let mut pairs = Vec::with_capacity(n / 2);
        let mut mask = 0usize;
        while mask != full {
            let i = (!mask).trailing_zeros() as usize;
            let j = usize::from(choice[mask]);
            pairs.push((i, j));
            mask |= (1 << i) | (1 << j);
        }
        pairs
    }

    fn euclidean(n: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let pts: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect();
        pts.iter()
            .map(|a| pts.iter().map(|b| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()).collect())
            .collect()
    }

    fn assert_perfect(n: usize, pairs: &[(usize, usize)]) {
        let mut seen = vec![false; n];
        for &(i, j) in pairs {
            assert!(i < j && !seen[i] && !seen[j]);
            seen[i] = true;
            seen[j] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    fn four() -> Vec<Vec<f64>> {
        // w01=1 w23=1 w02=5 w13=5 w03=2 w12=2
        vec![
            vec![0.0, 1.0, 5.0, 2.0],
            vec![1.0, 0.0, 2.0, 5.0],
            vec![5.0, 2.0, 0.0, 1.0],
            vec![2.0, 5.0, 1.0, 0.0],
        ]
    }

    #[test]
    fn min_matching_picks_cheapest_pairs() {
        let w = four();
        let m = min_weight_perfect_matching(&w).unwrap();
        assert_eq!(m, vec![(0, 1), (2, 3)]);
        assert!((matching_weight(&w, &m) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn max_matching_picks_heaviest_pairs() {
        let w = four();
        let m = max_weight_perfect_matching(&w).unwrap();
        assert_eq!(m, vec![(0, 2), (1, 3)]);
        assert!((matching_weight(&w, &m) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_input() {
        let odd = vec![vec![0.0; 3]; 3];
        assert_eq!(
            min_weight_perfect_matching(&odd),
            Err(MatchingError::OddCount(3))
        );
        let mut neg = four();
        neg[0][1] = -1.0;
        assert!(matches!(
            min_weight_perfect_matching(&neg),
            Err(MatchingError::InvalidWeight { i: 0, j: 1, .. })
        ));
        let ragged = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(matches!(
            min_weight_perfect_matching(&ragged),
            Err(MatchingError::NotSquare { row: 1, .. })
        ));
    }

    #[test]
    fn empty_input_is_empty_matching() {
        assert!(min_weight_perfect_matching(&[]).unwrap().is_empty());
    }

    #[test]
    fn equal_weights_still_give_perfect_matching() {
        let w = vec![vec![3.0; 6]; 6];
        let m = min_weight_perfect_matching(&w).unwrap();
        assert_perfect(6, &m);
    }

    #[test]
    fn points_on_a_line_pair_with_neighbours() {
        let n = 24;
        let w: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        let m = min_weight_perfect_matching(&w).unwrap();
        assert_perfect(n, &m);
        assert!((matching_weight(&w, &m) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn squared_distances_on_six_points() {
        let pts = [0.0, 0.3, 1.7, 2.0, 5.5, 9.0];
        let w: Vec<Vec<f64>> = pts
            .iter()
            .map(|a| pts.iter().map(|b| (a - b) * (a - b)).collect())
            .collect();
        let m = min_weight_perfect_matching(&w).unwrap();
        assert_eq!(m, vec![(0, 1), (2, 3), (4, 5)]);
    }

    #[test]
    fn blossom_equals_subset_dp_on_small_instances() {
        for seed in 0..40 {
            let n = 2 + 2 * (seed as usize % 6);
            let w = euclidean(n, seed);
            let m = min_weight_perfect_matching(&w).unwrap();
            assert_perfect(n, &m);
            let best = matching_weight(&w, &exact(&w));
            assert!((matching_weight(&w, &m) - best).abs() <= 1e-9 * (1.0 + best), "seed {seed}");
        }
    }

    #[test]
    fn blossom_equals_subset_dp_above_twenty_points() {
        for seed in 100..103 {
            let w = euclidean(22, seed);
            let m = min_weight_perfect_matching(&w).unwrap();
            assert_perfect(22, &m);
            let best = matching_weight(&w, &exact(&w));
            assert!((matching_weight(&w, &m) - best).abs() <= 1e-9 * (1.0 + best), "seed {seed}");
        }
    }

    #[test]
    fn large_instance_is_perfect() {
        let w = euclidean(120, 9);
        let m = min_weight_perfect_matching(&w).unwrap();
        assert_perfect(120, &m);
        let max = max_weight_perfect_matching(&w).unwrap();
        assert_perfect(120, &max);
        assert!(matching_weight(&w, &m) < matching_weight(&w, &max));
    }
}
