//! MD5 checksum utility for drift detection.

use md5::{Digest, Md5};

/// Compute the MD5 checksum of a string as lowercase hex
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}
