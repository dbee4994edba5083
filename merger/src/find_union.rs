/// Weighted, path-compressed disjoint sets over the twin-closed contig
/// id space. The single backing vector stores, for a root, the negated
/// size of its component, and for any other node the index of its
/// parent. This keeps `size` a single find plus a negation, which the
/// partitioner reads in its inner loop to cut off saturated components.
#[derive(Debug, Clone, Default)]
pub struct FindUnion {
    /// `values[i] < 0` iff i is a root; then `-values[i]` is the size of
    /// the component rooted at i. Otherwise `values[i]` is the parent.
    values: Vec<i64>,
}

impl FindUnion {
    /// Create a forest of `size` singleton components.
    pub fn new(size: usize) -> Self {
        Self {
            values: vec![-1; size],
        }
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// The representative of the component `index` resides in.
    /// Compresses the path from `index` to the root.
    pub fn find(&mut self, index: usize) -> usize {
        let mut root = index;
        while self.values[root] >= 0 {
            root = self.values[root] as usize;
        }
        let mut node = index;
        while node != root {
            let next = self.values[node] as usize;
            self.values[node] = root as i64;
            node = next;
        }
        root
    }
    /// Unite the components of `node1` and `node2`, attaching the
    /// smaller tree below the root of the larger.
    pub fn unite(&mut self, node1: usize, node2: usize) {
        let root1 = self.find(node1);
        let root2 = self.find(node2);
        if root1 == root2 {
            return;
        }
        // More negative means larger.
        let (large, small) = if self.values[root1] <= self.values[root2] {
            (root1, root2)
        } else {
            (root2, root1)
        };
        self.values[large] += self.values[small];
        self.values[small] = large as i64;
    }
    /// Whether the two nodes reside in the same component.
    pub fn same(&mut self, node1: usize, node2: usize) -> bool {
        self.find(node1) == self.find(node2)
    }
    /// Size of the component `index` resides in.
    pub fn size(&mut self, index: usize) -> usize {
        let root = self.find(index);
        debug_assert!(self.values[root] < 0);
        (-self.values[root]) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn findunion_init() {
        FindUnion::new(0);
        FindUnion::new(10);
    }

    #[test]
    fn find() {
        let mut fu = FindUnion::new(10);
        fu.unite(0, 1);
        assert_eq!(fu.find(0), fu.find(1));
        fu.unite(2, 3);
        assert_eq!(fu.find(2), fu.find(3));
    }

    #[test]
    fn find_transitive() {
        let mut fu = FindUnion::new(10);
        fu.unite(0, 1);
        fu.unite(1, 2);
        assert_eq!(fu.find(0), fu.find(2));
        fu.unite(4, 5);
        fu.unite(5, 0);
        assert_eq!(fu.find(4), fu.find(2));
    }

    #[test]
    fn roots_are_fixed_points() {
        let mut fu = FindUnion::new(10);
        fu.unite(0, 1);
        fu.unite(0, 2);
        fu.unite(4, 3);
        fu.unite(3, 2);
        for i in 0..10 {
            let root = fu.find(i);
            assert_eq!(fu.find(root), root);
        }
    }

    #[test]
    fn same() {
        let mut fu = FindUnion::new(10);
        fu.unite(0, 1);
        assert!(fu.same(0, 1));
        fu.unite(2, 3);
        assert!(fu.same(2, 3));
        assert!(!fu.same(0, 8));
    }

    #[test]
    fn size() {
        let mut fu = FindUnion::new(10);
        for i in 0..10 {
            assert_eq!(fu.size(i), 1);
        }
        fu.unite(0, 1);
        assert_eq!(fu.size(0), 2);
        assert_eq!(fu.size(1), 2);
        assert_eq!(fu.size(3), 1);
    }

    #[test]
    fn size_after_chain() {
        let mut fu = FindUnion::new(10);
        for i in 0..9 {
            fu.unite(i, i + 1);
        }
        for i in 0..10 {
            assert_eq!(fu.size(i), 10);
        }
    }

    #[test]
    fn all_connected() {
        let mut fu = FindUnion::new(10);
        for i in 0..10 {
            for j in (0..10).rev() {
                fu.unite(i, j);
                fu.unite((i * 3) % 10, (j * 7) % 10);
            }
        }
        let root = fu.find(0);
        assert!((0..10).all(|e| fu.find(e) == root));
        assert_eq!(fu.size(root), 10);
    }
}
