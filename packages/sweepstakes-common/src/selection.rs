use sha2::{Digest, Sha256};

/// Derive the 32-byte randomness for a winner draw from an operator seed.
///
/// Domain-separated by draw id, cycle, and population size so the same seed
/// maps to different randomness on every draw and every mini-draw cycle:
/// `randomness = sha256( seed || draw_id_be || cycle_be || total_entries_be )`
pub fn derive_randomness(seed: &[u8], draw_id: u64, cycle: u64, total_entries: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(draw_id.to_be_bytes());
    hasher.update(cycle.to_be_bytes());
    hasher.update(total_entries.to_be_bytes());
    hasher.finalize().into()
}

/// Map 32 bytes of randomness to a 0-indexed ticket in `[0, total_entries)`.
///
/// Uses the first 16 bytes as a big-endian u128 reduced modulo the
/// population size. `total_entries` must be non-zero.
pub fn winning_ticket(randomness: &[u8; 32], total_entries: u64) -> u64 {
    let mut ticket_bytes = [0u8; 16];
    ticket_bytes.copy_from_slice(&randomness[0..16]);
    let ticket_raw = u128::from_be_bytes(ticket_bytes);
    (ticket_raw % total_entries as u128) as u64
}

/// Locate the owner of a 0-indexed ticket by walking ticket counts in
/// insertion order.
///
/// Each holder owns the next `weights[i]` tickets of the virtual sequence,
/// so selection probability is exactly proportional to ticket count.
/// Returns the owning holder's index, or None when the ticket lies beyond
/// the population.
pub fn locate_ticket(weights: &[u64], ticket: u64) -> Option<usize> {
    let mut consumed: u64 = 0;
    for (idx, weight) in weights.iter().enumerate() {
        consumed += weight;
        if ticket < consumed {
            return Some(idx);
        }
    }
    None
}
