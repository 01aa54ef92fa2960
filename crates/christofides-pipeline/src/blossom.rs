//! Maximum-weight matching in general graphs (Edmonds' blossom algorithm).
//!
//! Primal-dual method following Galil, "Efficient Algorithms for Finding
//! Maximum Matching in Graphs" (ACM Computing Surveys, 1986), in the
//! `O(n³)` form popularised by Joris van Rantwijk's `mwmatching`.
//!
//! # Conventions
//!
//! - Vertices are `0..n`. Non-trivial blossoms get ids `n..2n`, recycled
//!   when a blossom is expanded.
//! - Edge `k` has endpoints `2k` and `2k + 1`; `endpoint[p]` is the vertex
//!   an endpoint belongs to and `p ^ 1` is the opposite end.
//! - Vertex duals and slacks are stored doubled (`2u`), blossom duals are
//!   stored as-is (`z`).
//! - Labels follow Galil: outer (S) and inner (T). Labels live on
//!   top-level blossoms; a vertex inside an inner blossom carries its own
//!   label once it is reachable from outside.
//!
//! With `max_cardinality` set, only maximum-cardinality matchings are
//! considered, which on a complete graph with an even vertex count means
//! a perfect matching.

use log::trace;

use crate::types::InvariantViolation;

type Step<T = ()> = Result<T, InvariantViolation>;

fn inconsistent(detail: &str) -> InvariantViolation {
    InvariantViolation::BlossomState(detail.to_owned())
}

fn require<T>(value: Option<T>, detail: &str) -> Step<T> {
    value.ok_or_else(|| inconsistent(detail))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Free,
    Outer,
    Inner,
}

/// Outcome of the dual adjustment at the end of a substage.
#[derive(Debug, Clone, Copy)]
enum Delta {
    /// No further improvement is possible.
    Optimum,
    /// Edge between an outer vertex and a free vertex became tight.
    Grow(usize),
    /// Edge between two outer blossoms became tight.
    Merge(usize),
    /// An inner blossom's dual reached zero.
    Expand(usize),
}

/// Walk around a blossom's cycle of sub-blossoms from child `start` to
/// the base (child 0).
///
/// Odd start positions go forward and even ones backward, so the path to
/// the base is always of even length and alternates correctly.
#[derive(Debug, Clone, Copy)]
struct Walk {
    len: usize,
    forward: bool,
}

impl Walk {
    const fn new(start: usize, len: usize) -> Self {
        Self {
            len,
            forward: start % 2 == 1,
        }
    }

    const fn step(self, j: usize) -> usize {
        if self.forward {
            (j + 1) % self.len
        } else {
            (j + self.len - 1) % self.len
        }
    }

    /// Slot in the blossom's endpoint list of the edge just crossed to
    /// arrive at child `j`.
    const fn edge_slot(self, j: usize) -> usize {
        if self.forward {
            j
        } else {
            (j + self.len - 1) % self.len
        }
    }

    /// Endpoint orientation flip for backward walks.
    const fn flip(self) -> usize {
        if self.forward { 0 } else { 1 }
    }
}

struct Matcher {
    vertex_count: usize,
    edges: Vec<(usize, usize, f64)>,
    max_cardinality: bool,

    endpoint: Vec<usize>,
    neighbor_ends: Vec<Vec<usize>>,

    /// Remote endpoint of the matched edge, per vertex.
    mate: Vec<Option<usize>>,
    label: Vec<Label>,
    breadcrumb: Vec<bool>,
    /// Remote endpoint of the edge through which the blossom (or inner
    /// vertex) got its label.
    label_end: Vec<Option<usize>>,
    in_blossom: Vec<usize>,
    blossom_parent: Vec<Option<usize>>,
    /// Sub-blossoms in cycle order, starting with the base.
    blossom_children: Vec<Vec<usize>>,
    blossom_base: Vec<Option<usize>>,
    /// `blossom_endps[b][i]` is the endpoint of child `i` on the edge to
    /// child `i + 1`.
    blossom_endps: Vec<Vec<usize>>,
    /// Least-slack edge to an outer blossom (for free vertices) or to a
    /// different outer blossom (for outer blossoms).
    best_edge: Vec<Option<usize>>,
    blossom_best_edges: Vec<Option<Vec<usize>>>,
    unused_blossoms: Vec<usize>,
    dual: Vec<f64>,
    allowed: Vec<bool>,
    queue: Vec<usize>,

    augmentations: usize,
    blossoms_formed: usize,
}

impl Matcher {
    fn new(edges: &[(usize, usize, f64)], max_cardinality: bool) -> Self {
        let vertex_count = edges
            .iter()
            .map(|&(i, j, _)| i.max(j) + 1)
            .max()
            .unwrap_or(0);
        let blossom_slots = 2 * vertex_count;
        let max_weight = edges.iter().map(|e| e.2).fold(0.0_f64, f64::max);

        let endpoint = (0..2 * edges.len())
            .map(|p| {
                let (i, j, _) = edges[p / 2];
                if p % 2 == 0 { i } else { j }
            })
            .collect();
        let mut neighbor_ends = vec![Vec::new(); vertex_count];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            neighbor_ends[i].push(2 * k + 1);
            neighbor_ends[j].push(2 * k);
        }

        let mut blossom_base: Vec<Option<usize>> = (0..vertex_count).map(Some).collect();
        blossom_base.resize(blossom_slots, None);
        let mut dual = vec![max_weight; vertex_count];
        dual.resize(blossom_slots, 0.0);

        Self {
            vertex_count,
            edges: edges.to_vec(),
            max_cardinality,
            endpoint,
            neighbor_ends,
            mate: vec![None; vertex_count],
            label: vec![Label::Free; blossom_slots],
            breadcrumb: vec![false; blossom_slots],
            label_end: vec![None; blossom_slots],
            in_blossom: (0..vertex_count).collect(),
            blossom_parent: vec![None; blossom_slots],
            blossom_children: vec![Vec::new(); blossom_slots],
            blossom_base,
            blossom_endps: vec![Vec::new(); blossom_slots],
            best_edge: vec![None; blossom_slots],
            blossom_best_edges: vec![None; blossom_slots],
            unused_blossoms: (vertex_count..blossom_slots).collect(),
            dual,
            allowed: vec![false; edges.len()],
            queue: Vec::new(),
            augmentations: 0,
            blossoms_formed: 0,
        }
    }

    /// Twice the slack of edge `k`. Not valid for edges inside a blossom.
    fn slack(&self, k: usize) -> f64 {
        let (i, j, weight) = self.edges[k];
        2.0f64.mul_add(-weight, self.dual[i] + self.dual[j])
    }

    fn leaves(&self, b: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_leaves(b, &mut out);
        out
    }

    fn collect_leaves(&self, b: usize, out: &mut Vec<usize>) {
        if b < self.vertex_count {
            out.push(b);
        } else {
            for &child in &self.blossom_children[b] {
                self.collect_leaves(child, out);
            }
        }
    }

    fn position_in(&self, b: usize, child: usize) -> Step<usize> {
        require(
            self.blossom_children[b].iter().position(|&c| c == child),
            "sub-blossom missing from its parent",
        )
    }

    /// Label the top-level blossom containing `w` and record that it was
    /// reached through remote endpoint `p`.
    fn assign_label(&mut self, w: usize, label: Label, p: Option<usize>) -> Step {
        let b = self.in_blossom[w];
        debug_assert!(self.label[w] == Label::Free && self.label[b] == Label::Free);
        self.label[w] = label;
        self.label[b] = label;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = None;
        self.best_edge[b] = None;

        match label {
            Label::Outer => {
                let leaves = self.leaves(b);
                self.queue.extend(leaves);
            }
            Label::Inner => {
                // Only the base of an inner blossom has an external mate;
                // that mate becomes outer.
                let base = require(self.blossom_base[b], "labelled blossom has no base")?;
                let mate = require(self.mate[base], "inner blossom base is single")?;
                self.assign_label(self.endpoint[mate], Label::Outer, Some(mate ^ 1))?;
            }
            Label::Free => {}
        }
        Ok(())
    }

    /// Trace back from outer vertices `v` and `w`. Returns the base of a
    /// new blossom, or `None` if the two paths end at different single
    /// vertices (an augmenting path).
    fn scan_blossom(&mut self, v: usize, w: usize) -> Step<Option<usize>> {
        let mut path = Vec::new();
        let mut base = None;
        let mut v = Some(v);
        let mut w = Some(w);

        while let Some(current) = v {
            let b = self.in_blossom[current];
            if self.breadcrumb[b] {
                base = self.blossom_base[b];
                break;
            }
            debug_assert_eq!(self.label[b], Label::Outer);
            path.push(b);
            self.breadcrumb[b] = true;

            let next = match self.label_end[b] {
                // Base of b is single; this path ends here.
                None => None,
                Some(p) => {
                    let t = self.in_blossom[self.endpoint[p]];
                    debug_assert_eq!(self.label[t], Label::Inner);
                    let q = require(self.label_end[t], "inner blossom has no label edge")?;
                    Some(self.endpoint[q])
                }
            };

            // Alternate between the two paths.
            if w.is_some() {
                v = w;
                w = next;
            } else {
                v = next;
            }
        }

        for b in path {
            self.breadcrumb[b] = false;
        }
        Ok(base)
    }

    /// Shrink the odd cycle through edge `k` and `base` into a new outer
    /// blossom.
    fn add_blossom(&mut self, base: usize, k: usize) -> Step {
        let (v, w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];

        let b = require(self.unused_blossoms.pop(), "out of blossom ids")?;
        self.blossoms_formed += 1;
        self.blossom_base[b] = Some(base);
        self.blossom_parent[b] = None;
        self.blossom_parent[bb] = Some(b);

        let mut children = Vec::new();
        let mut endps = Vec::new();
        while bv != bb {
            self.blossom_parent[bv] = Some(b);
            children.push(bv);
            let p = require(self.label_end[bv], "blossom path has no label edge")?;
            endps.push(p);
            bv = self.in_blossom[self.endpoint[p]];
        }
        children.push(bb);
        children.reverse();
        endps.reverse();
        endps.push(2 * k);
        while bw != bb {
            self.blossom_parent[bw] = Some(b);
            children.push(bw);
            let p = require(self.label_end[bw], "blossom path has no label edge")?;
            endps.push(p ^ 1);
            bw = self.in_blossom[self.endpoint[p]];
        }
        self.blossom_children[b] = children;
        self.blossom_endps[b] = endps;

        debug_assert_eq!(self.label[bb], Label::Outer);
        self.label[b] = Label::Outer;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0.0;

        for leaf in self.leaves(b) {
            // Inner vertices become outer as part of the new blossom.
            if self.label[self.in_blossom[leaf]] == Label::Inner {
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        // Least-slack edges from the new blossom to each neighbouring
        // outer blossom.
        let mut best_to: Vec<Option<usize>> = vec![None; 2 * self.vertex_count];
        for child in self.blossom_children[b].clone() {
            let candidates: Vec<usize> = match self.blossom_best_edges[child].take() {
                Some(list) => list,
                None => self
                    .leaves(child)
                    .into_iter()
                    .flat_map(|leaf| self.neighbor_ends[leaf].iter().map(|p| p / 2))
                    .collect(),
            };
            for k in candidates {
                let (i, j, _) = self.edges[k];
                let far = if self.in_blossom[j] == b { i } else { j };
                let bj = self.in_blossom[far];
                if bj != b
                    && self.label[bj] == Label::Outer
                    && best_to[bj].is_none_or(|cur| self.slack(k) < self.slack(cur))
                {
                    best_to[bj] = Some(k);
                }
            }
            self.best_edge[child] = None;
        }

        let list: Vec<usize> = best_to.into_iter().flatten().collect();
        self.best_edge[b] = list.iter().copied().fold(None, |best, k| match best {
            Some(cur) if self.slack(cur) <= self.slack(k) => Some(cur),
            _ => Some(k),
        });
        self.blossom_best_edges[b] = Some(list);
        Ok(())
    }

    /// Dissolve top-level blossom `b` into its sub-blossoms.
    ///
    /// At the end of a stage, zero-dual sub-blossoms are expanded
    /// recursively. During a stage, an inner blossom's children are
    /// relabelled so the alternating tree stays valid.
    fn expand_blossom(&mut self, b: usize, end_of_stage: bool) -> Step {
        for s in self.blossom_children[b].clone() {
            self.blossom_parent[s] = None;
            if s < self.vertex_count {
                self.in_blossom[s] = s;
            } else if end_of_stage && self.dual[s] == 0.0 {
                self.expand_blossom(s, end_of_stage)?;
            } else {
                for leaf in self.leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        if !end_of_stage && self.label[b] == Label::Inner {
            self.relabel_expanded_inner(b)?;
        }

        self.label[b] = Label::Free;
        self.label_end[b] = None;
        self.blossom_children[b] = Vec::new();
        self.blossom_endps[b] = Vec::new();
        self.blossom_base[b] = None;
        self.blossom_best_edges[b] = None;
        self.best_edge[b] = None;
        self.unused_blossoms.push(b);
        Ok(())
    }

    fn relabel_expanded_inner(&mut self, b: usize) -> Step {
        // Start at the child through which b was labelled and walk to
        // the base, relabelling alternately inner and outer.
        let entry = require(self.label_end[b], "inner blossom has no label edge")?;
        let entry_child = self.in_blossom[self.endpoint[entry ^ 1]];
        let start = self.position_in(b, entry_child)?;
        let walk = Walk::new(start, self.blossom_children[b].len());
        let flip = walk.flip();

        let mut j = start;
        let mut p = entry;
        while j != 0 {
            let q = self.blossom_endps[b][walk.edge_slot(j)];
            self.label[self.endpoint[p ^ 1]] = Label::Free;
            self.label[self.endpoint[q ^ flip ^ 1]] = Label::Free;
            self.assign_label(self.endpoint[p ^ 1], Label::Inner, Some(p))?;

            self.allowed[q / 2] = true;
            j = walk.step(j);
            p = self.blossom_endps[b][walk.edge_slot(j)] ^ flip;
            self.allowed[p / 2] = true;
            j = walk.step(j);
        }

        // The base child becomes inner without stepping through to its
        // mate, which is already labelled.
        let bv = self.blossom_children[b][j];
        let head = self.endpoint[p ^ 1];
        self.label[head] = Label::Inner;
        self.label[bv] = Label::Inner;
        self.label_end[head] = Some(p);
        self.label_end[bv] = Some(p);
        self.best_edge[bv] = None;

        // The remaining children are inner only if reachable from an
        // outer vertex outside the old blossom.
        j = walk.step(j);
        while self.blossom_children[b][j] != entry_child {
            let bv = self.blossom_children[b][j];
            if self.label[bv] != Label::Outer {
                let reached = self
                    .leaves(bv)
                    .into_iter()
                    .find(|&leaf| self.label[leaf] != Label::Free);
                if let Some(v) = reached {
                    debug_assert_eq!(self.label[v], Label::Inner);
                    debug_assert_eq!(self.in_blossom[v], bv);
                    self.label[v] = Label::Free;
                    let base = require(self.blossom_base[bv], "sub-blossom has no base")?;
                    let mate = require(self.mate[base], "sub-blossom base is single")?;
                    self.label[self.endpoint[mate]] = Label::Free;
                    let through = self.label_end[v];
                    self.assign_label(v, Label::Inner, through)?;
                }
            }
            j = walk.step(j);
        }
        Ok(())
    }

    /// Flip matched and unmatched edges along the alternating path inside
    /// blossom `b` from vertex `v` to the base, making `v` the new base.
    fn augment_blossom(&mut self, b: usize, v: usize) -> Step {
        let mut t = v;
        loop {
            match self.blossom_parent[t] {
                Some(parent) if parent == b => break,
                Some(parent) => t = parent,
                None => return Err(inconsistent("vertex is not inside the blossom")),
            }
        }
        if t >= self.vertex_count {
            self.augment_blossom(t, v)?;
        }

        let start = self.position_in(b, t)?;
        let walk = Walk::new(start, self.blossom_children[b].len());
        let flip = walk.flip();
        let mut j = start;
        while j != 0 {
            j = walk.step(j);
            let child = self.blossom_children[b][j];
            let p = self.blossom_endps[b][walk.edge_slot(j)] ^ flip;
            if child >= self.vertex_count {
                self.augment_blossom(child, self.endpoint[p])?;
            }
            j = walk.step(j);
            let child = self.blossom_children[b][j];
            if child >= self.vertex_count {
                self.augment_blossom(child, self.endpoint[p ^ 1])?;
            }
            self.mate[self.endpoint[p]] = Some(p ^ 1);
            self.mate[self.endpoint[p ^ 1]] = Some(p);
        }

        self.blossom_children[b].rotate_left(start);
        self.blossom_endps[b].rotate_left(start);
        let first = self.blossom_children[b][0];
        self.blossom_base[b] = self.blossom_base[first];
        debug_assert_eq!(self.blossom_base[b], Some(v));
        Ok(())
    }

    /// Augment along the path through edge `k`, which joins two outer
    /// blossoms rooted at different single vertices.
    fn augment_matching(&mut self, k: usize) -> Step {
        let (v, w, _) = self.edges[k];
        for (mut s, mut p) in [(v, 2 * k + 1), (w, 2 * k)] {
            loop {
                let bs = self.in_blossom[s];
                debug_assert_eq!(self.label[bs], Label::Outer);
                if bs >= self.vertex_count {
                    self.augment_blossom(bs, s)?;
                }
                self.mate[s] = Some(p);

                let Some(back) = self.label_end[bs] else {
                    // Reached a single vertex.
                    break;
                };
                let t = self.endpoint[back];
                let bt = self.in_blossom[t];
                debug_assert_eq!(self.label[bt], Label::Inner);
                let q = require(self.label_end[bt], "inner blossom has no label edge")?;
                s = self.endpoint[q];
                let j = self.endpoint[q ^ 1];
                debug_assert_eq!(self.blossom_base[bt], Some(t));
                if bt >= self.vertex_count {
                    self.augment_blossom(bt, j)?;
                }
                self.mate[j] = Some(q);
                p = q ^ 1;
            }
        }
        self.augmentations += 1;
        Ok(())
    }

    fn begin_stage(&mut self) -> Step {
        let n = self.vertex_count;
        self.label.fill(Label::Free);
        self.best_edge.fill(None);
        for slot in &mut self.blossom_best_edges[n..] {
            *slot = None;
        }
        self.allowed.fill(false);
        self.queue.clear();

        for v in 0..n {
            if self.mate[v].is_none() && self.label[self.in_blossom[v]] == Label::Free {
                self.assign_label(v, Label::Outer, None)?;
            }
        }
        Ok(())
    }

    /// Grow the alternating forest from queued outer vertices. Returns
    /// `true` once the matching has been augmented.
    fn scan_queue(&mut self) -> Step<bool> {
        while let Some(v) = self.queue.pop() {
            debug_assert_eq!(self.label[self.in_blossom[v]], Label::Outer);
            for idx in 0..self.neighbor_ends[v].len() {
                let p = self.neighbor_ends[v][idx];
                let k = p / 2;
                let w = self.endpoint[p];
                if self.in_blossom[v] == self.in_blossom[w] {
                    continue;
                }

                let mut kslack = 0.0;
                if !self.allowed[k] {
                    kslack = self.slack(k);
                    if kslack <= 0.0 {
                        self.allowed[k] = true;
                    }
                }

                let bw = self.in_blossom[w];
                if self.allowed[k] {
                    match self.label[bw] {
                        Label::Free => self.assign_label(w, Label::Inner, Some(p ^ 1))?,
                        Label::Outer => {
                            if let Some(base) = self.scan_blossom(v, w)? {
                                self.add_blossom(base, k)?;
                            } else {
                                self.augment_matching(k)?;
                                return Ok(true);
                            }
                        }
                        Label::Inner => {
                            // w sits inside an inner blossom and was not yet
                            // reached from outside; remember how for expansion.
                            if self.label[w] == Label::Free {
                                self.label[w] = Label::Inner;
                                self.label_end[w] = Some(p ^ 1);
                            }
                        }
                    }
                } else if self.label[bw] == Label::Outer {
                    let b = self.in_blossom[v];
                    if self.best_edge[b].is_none_or(|e| kslack < self.slack(e)) {
                        self.best_edge[b] = Some(k);
                    }
                } else if self.label[w] == Label::Free
                    && self.best_edge[w].is_none_or(|e| kslack < self.slack(e))
                {
                    self.best_edge[w] = Some(k);
                }
            }
        }
        Ok(false)
    }

    fn min_vertex_dual(&self) -> f64 {
        self.dual[..self.vertex_count]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Pick the smallest dual adjustment that keeps every slack
    /// non-negative, and what it unlocks.
    fn next_delta(&self) -> (f64, Delta) {
        let n = self.vertex_count;
        let mut best: Option<(f64, Delta)> = None;
        let mut consider = |d: f64, kind: Delta| {
            if best.is_none_or(|(current, _)| d < current) {
                best = Some((d, kind));
            }
        };

        if !self.max_cardinality {
            consider(self.min_vertex_dual(), Delta::Optimum);
        }

        for v in 0..n {
            if self.label[self.in_blossom[v]] == Label::Free
                && let Some(k) = self.best_edge[v]
            {
                consider(self.slack(k), Delta::Grow(k));
            }
        }

        for b in 0..2 * n {
            if self.blossom_parent[b].is_none()
                && self.label[b] == Label::Outer
                && let Some(k) = self.best_edge[b]
            {
                consider(self.slack(k) / 2.0, Delta::Merge(k));
            }
        }

        for b in n..2 * n {
            if self.blossom_base[b].is_some()
                && self.blossom_parent[b].is_none()
                && self.label[b] == Label::Inner
            {
                consider(self.dual[b], Delta::Expand(b));
            }
        }

        best.unwrap_or_else(|| {
            // Maximum cardinality reached. A final adjustment keeps the
            // duals verifiable.
            debug_assert!(self.max_cardinality);
            (self.min_vertex_dual().max(0.0), Delta::Optimum)
        })
    }

    fn apply_delta(&mut self, delta: f64) {
        let n = self.vertex_count;
        for v in 0..n {
            match self.label[self.in_blossom[v]] {
                Label::Outer => self.dual[v] -= delta,
                Label::Inner => self.dual[v] += delta,
                Label::Free => {}
            }
        }
        for b in n..2 * n {
            if self.blossom_base[b].is_some() && self.blossom_parent[b].is_none() {
                match self.label[b] {
                    Label::Outer => self.dual[b] += delta,
                    Label::Inner => self.dual[b] -= delta,
                    Label::Free => {}
                }
            }
        }
    }

    /// Run one stage. Returns `true` if the matching grew.
    fn run_stage(&mut self) -> Step<bool> {
        self.begin_stage()?;
        loop {
            if self.scan_queue()? {
                return Ok(true);
            }

            let (delta, kind) = self.next_delta();
            self.apply_delta(delta);

            match kind {
                Delta::Optimum => return Ok(false),
                Delta::Grow(k) => {
                    self.allowed[k] = true;
                    let (i, j, _) = self.edges[k];
                    let outer = if self.label[self.in_blossom[i]] == Label::Free {
                        j
                    } else {
                        i
                    };
                    debug_assert_eq!(self.label[self.in_blossom[outer]], Label::Outer);
                    self.queue.push(outer);
                }
                Delta::Merge(k) => {
                    self.allowed[k] = true;
                    let (i, _, _) = self.edges[k];
                    debug_assert_eq!(self.label[self.in_blossom[i]], Label::Outer);
                    self.queue.push(i);
                }
                Delta::Expand(b) => self.expand_blossom(b, false)?,
            }
        }
    }

    fn solve(mut self) -> Step<Vec<Option<usize>>> {
        let n = self.vertex_count;
        let mut stages = 0;
        for _ in 0..n {
            stages += 1;
            if !self.run_stage()? {
                break;
            }

            // Outer blossoms whose dual dropped to zero are dissolved
            // before the next stage.
            for b in n..2 * n {
                if self.blossom_parent[b].is_none()
                    && self.blossom_base[b].is_some()
                    && self.label[b] == Label::Outer
                    && self.dual[b] == 0.0
                {
                    self.expand_blossom(b, true)?;
                }
            }
        }

        trace!(
            "blossom matching: {n} vertices, {} edges, {stages} stages, {} augmentations, {} blossoms",
            self.edges.len(),
            self.augmentations,
            self.blossoms_formed,
        );

        Ok(self
            .mate
            .iter()
            .map(|m| m.map(|p| self.endpoint[p]))
            .collect())
    }
}

/// Compute a maximum-weight matching of the graph given as
/// `(i, j, weight)` triples.
///
/// Vertices are `0..=max index`; each pair may appear at most once and no
/// edge may be a self-loop. With `max_cardinality`, only matchings of
/// maximum size are considered and weight is maximised among those.
///
/// Returns `mate`, with `mate[v] == Some(u)` iff `v` is matched to `u`.
///
/// # Errors
///
/// Returns [`InvariantViolation::BlossomState`] if an edge is a self-loop
/// or the algorithm's own bookkeeping becomes inconsistent.
pub(crate) fn max_weight_matching(
    edges: &[(usize, usize, f64)],
    max_cardinality: bool,
) -> Result<Vec<Option<usize>>, InvariantViolation> {
    if let Some(&(v, _, _)) = edges.iter().find(|&&(i, j, _)| i == j) {
        return Err(inconsistent(&format!("self-loop on vertex {v}")));
    }
    Matcher::new(edges, max_cardinality).solve()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn solve(edges: &[(usize, usize, i32)], max_cardinality: bool) -> Vec<Option<usize>> {
        let edges: Vec<_> = edges
            .iter()
            .map(|&(i, j, w)| (i, j, f64::from(w)))
            .collect();
        max_weight_matching(&edges, max_cardinality).unwrap()
    }

    fn mates(expected: &[i32]) -> Vec<Option<usize>> {
        expected
            .iter()
            .map(|&m| usize::try_from(m).ok())
            .collect()
    }

    #[test]
    fn no_edges() {
        assert!(solve(&[], false).is_empty());
    }

    #[test]
    fn single_edge() {
        assert_eq!(solve(&[(0, 1, 1)], false), mates(&[1, 0]));
    }

    #[test]
    fn heavier_edge_wins() {
        assert_eq!(
            solve(&[(1, 2, 10), (2, 3, 11)], false),
            mates(&[-1, -1, 3, 2])
        );
    }

    #[test]
    fn max_cardinality_beats_weight() {
        let edges = [(1, 2, 5), (2, 3, 11), (3, 4, 5)];
        assert_eq!(solve(&edges, false), mates(&[-1, -1, 3, 2, -1]));
        assert_eq!(solve(&edges, true), mates(&[-1, 2, 1, 4, 3]));
    }

    #[test]
    fn negative_weights() {
        let edges = [(1, 2, 2), (1, 3, -2), (2, 3, 1), (2, 4, -1), (3, 4, -6)];
        assert_eq!(solve(&edges, false), mates(&[-1, 2, 1, -1, -1]));
        assert_eq!(solve(&edges, true), mates(&[-1, 3, 4, 1, 2]));
    }

    #[test]
    fn outer_blossom_augmentation() {
        assert_eq!(
            solve(&[(1, 2, 8), (1, 3, 9), (2, 3, 10), (3, 4, 7)], false),
            mates(&[-1, 2, 1, 4, 3])
        );
        assert_eq!(
            solve(
                &[(1, 2, 8), (1, 3, 9), (2, 3, 10), (3, 4, 7), (1, 6, 5), (4, 5, 6)],
                false
            ),
            mates(&[-1, 6, 3, 2, 5, 4, 1])
        );
    }

    #[test]
    fn outer_blossom_relabelled_inner() {
        assert_eq!(
            solve(
                &[(1, 2, 9), (1, 3, 8), (2, 3, 10), (1, 4, 5), (4, 5, 4), (1, 6, 3)],
                false
            ),
            mates(&[-1, 6, 3, 2, 5, 4, 1])
        );
        assert_eq!(
            solve(
                &[(1, 2, 9), (1, 3, 8), (2, 3, 10), (1, 4, 5), (4, 5, 3), (3, 6, 4)],
                false
            ),
            mates(&[-1, 2, 1, 6, 5, 4, 3])
        );
    }

    #[test]
    fn nested_outer_blossom() {
        assert_eq!(
            solve(
                &[
                    (1, 2, 9),
                    (1, 3, 9),
                    (2, 3, 10),
                    (2, 4, 8),
                    (3, 5, 8),
                    (4, 5, 10),
                    (5, 6, 6)
                ],
                false
            ),
            mates(&[-1, 3, 4, 1, 2, 6, 5])
        );
    }

    #[test]
    fn nested_blossom_expanded_recursively() {
        assert_eq!(
            solve(
                &[
                    (1, 2, 8),
                    (1, 3, 8),
                    (2, 3, 10),
                    (2, 4, 12),
                    (3, 5, 12),
                    (4, 5, 14),
                    (4, 6, 12),
                    (5, 7, 12),
                    (6, 7, 14),
                    (7, 8, 12)
                ],
                false
            ),
            mates(&[-1, 2, 1, 5, 6, 3, 4, 8, 7])
        );
    }

    #[test]
    fn inner_blossom_expanded() {
        assert_eq!(
            solve(
                &[
                    (1, 2, 23),
                    (1, 5, 22),
                    (1, 6, 15),
                    (2, 3, 25),
                    (3, 4, 22),
                    (4, 5, 25),
                    (4, 8, 14),
                    (5, 7, 13)
                ],
                false
            ),
            mates(&[-1, 6, 3, 2, 8, 7, 1, 5, 4])
        );
    }

    #[test]
    fn inner_blossom_relabelled_two_ways() {
        assert_eq!(
            solve(
                &[
                    (1, 2, 45),
                    (1, 5, 45),
                    (2, 3, 50),
                    (3, 4, 45),
                    (4, 5, 50),
                    (1, 6, 30),
                    (3, 9, 35),
                    (4, 8, 35),
                    (5, 7, 26),
                    (9, 10, 5)
                ],
                false
            ),
            mates(&[-1, 6, 3, 2, 8, 7, 1, 5, 4, 10, 9])
        );
    }

    #[test]
    fn nested_inner_blossom_on_augmenting_path() {
        assert_eq!(
            solve(
                &[
                    (1, 2, 45),
                    (1, 7, 45),
                    (2, 3, 50),
                    (3, 4, 45),
                    (4, 5, 95),
                    (4, 6, 94),
                    (5, 6, 94),
                    (6, 7, 50),
                    (1, 8, 30),
                    (3, 11, 35),
                    (5, 9, 36),
                    (7, 10, 26),
                    (11, 12, 5)
                ],
                false
            ),
            mates(&[-1, 8, 3, 2, 6, 9, 4, 10, 1, 5, 7, 12, 11])
        );
    }

    #[test]
    fn nested_outer_blossom_relabelled_and_expanded() {
        assert_eq!(
            solve(
                &[
                    (1, 2, 40),
                    (1, 3, 40),
                    (2, 3, 60),
                    (2, 4, 55),
                    (3, 5, 55),
                    (4, 5, 50),
                    (1, 8, 15),
                    (5, 7, 30),
                    (7, 6, 10),
                    (8, 10, 10),
                    (4, 9, 30)
                ],
                false
            ),
            mates(&[-1, 2, 1, 5, 9, 3, 7, 6, 10, 4, 8])
        );
    }

    #[test]
    fn fractional_weights_on_complete_graph() {
        // Unit square corners, negated distances: the cheapest perfect
        // matching pairs opposite sides, never the diagonals.
        let d = std::f64::consts::SQRT_2;
        let edges = [
            (0, 1, -1.0),
            (0, 2, -d),
            (0, 3, -1.0),
            (1, 2, -1.0),
            (1, 3, -d),
            (2, 3, -1.0),
        ];
        let mate = max_weight_matching(&edges, true).unwrap();
        assert!(mate.iter().all(Option::is_some));
        assert_ne!(mate[0], Some(2));
        assert_ne!(mate[1], Some(3));
    }

    #[test]
    fn self_loop_is_rejected() {
        let err = max_weight_matching(&[(2, 2, 1.0)], true).unwrap_err();
        assert!(matches!(err, InvariantViolation::BlossomState(_)));
    }
}
