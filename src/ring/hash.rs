use std::collections::HashMap;

/// Injected hash function mapping bytes onto the 32-bit ring.
pub type HashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Consistent-hash ring with virtual nodes.
///
/// `ring` is kept sorted ascending; `owners` maps each virtual-node hash back
/// to the real peer it stands for. Mutation is not synchronized here; the
/// transport guards the ring with its own lock.
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    ring: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring with `replicas` virtual nodes per peer.
    /// `hash` defaults to CRC32 (IEEE) when `None`.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(|| Box::new(crc32fast::hash)),
            replicas,
            ring: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Adds real peers, projecting each onto the ring `replicas` times.
    ///
    /// Virtual node `i` of peer `p` hashes the decimal index concatenated
    /// with the peer name, so `("0" + p)`, `("1" + p)`, ...
    pub fn add<I>(&mut self, peers: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for peer in peers {
            let peer = peer.into();
            for i in 0..self.replicas {
                let h = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.ring.push(h);
                self.owners.insert(h, peer.clone());
            }
        }
        self.ring.sort_unstable();
    }

    /// Removes a peer's virtual nodes from the ring.
    ///
    /// Each virtual-node hash is located by binary search; if two peers'
    /// virtual nodes ever collide on the same hash, the wrong slot may be
    /// elided. Collisions are rare enough on 32 bits that this matches the
    /// ring's probabilistic tolerance.
    pub fn remove(&mut self, peer: &str) {
        for i in 0..self.replicas {
            let h = (self.hash)(format!("{}{}", i, peer).as_bytes());
            if let Ok(idx) = self.ring.binary_search(&h) {
                self.ring.remove(idx);
                self.owners.remove(&h);
            }
        }
    }

    /// Returns the peer owning `key`, or `None` on an empty ring.
    ///
    /// Ownership is the first virtual node clockwise from the key's hash,
    /// wrapping back to the lowest hash past the top of the circle.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }

        let h = (self.hash)(key.as_bytes());
        let idx = self.ring.partition_point(|&node| node < h) % self.ring.len();
        self.owners.get(&self.ring[idx]).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}
