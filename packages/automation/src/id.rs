use crc32fast::Hasher;

/// Generate a stable scope ID for an automation using CRC32
pub fn scope_id(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("automation://") {
        buff = format!("automation://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential key generator for nodes within one editing scope
///
/// Keys are opaque identity tokens carried alongside a node's value.
/// They stay with the node across reorders and re-renders, and are
/// never written into the serialized configuration.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    seed: String, // Scope ID (CRC32)
    count: u32,   // Sequential counter
}

impl KeyGenerator {
    pub fn new(scope: &str) -> Self {
        Self {
            seed: scope_id(scope),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Mint the next key
    pub fn next_key(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get the scope seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}
